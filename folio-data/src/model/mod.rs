pub mod balance;
pub mod market;
pub mod portfolio;
pub mod price;
