pub mod client;
pub mod clock;
pub mod http_parser;
pub mod request_builder;
pub mod rest_request;
