// Treat values within this distance of zero as zero when filtering dust
pub const BALANCE_EPSILON: f64 = 1e-12;

pub fn is_non_zero(value: f64) -> bool {
    value.abs() > BALANCE_EPSILON
}

/*----- */
// Binance Simple Earn
/*----- */
// Flexible earn positions show up as "LD" + asset (e.g. LDUSDT). Real tickers
// that happen to start with LD must be left untouched.
const LD_PREFIX: &str = "LD";
const LD_TICKERS: [&str; 1] = ["LDO"];

pub fn strip_earn_prefix(asset: &str) -> &str {
    if LD_TICKERS.contains(&asset) {
        return asset;
    }

    match asset.strip_prefix(LD_PREFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => asset,
    }
}
