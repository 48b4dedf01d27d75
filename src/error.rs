use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum FeedError {
    #[display("request to {feed} failed")]
    Request { feed: String },
    #[display("{feed} responded with HTTP {status}")]
    Status { feed: String, status: u16 },
    #[display("failed to parse response from {feed}")]
    ResponseParse { feed: String },
}

/// A price sample that cannot enter a series. Never fatal: the sample is
/// dropped and the caller decides whether to log it.
#[derive(Debug, Display, Error)]
pub enum SampleError {
    #[display("invalid sample for {symbol}: price {price}")]
    InvalidSample { symbol: String, price: f64 },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    #[display("missing API credentials for {executor}")]
    MissingCredentials { executor: String },
    #[display("invalid order: {reason}")]
    InvalidOrder { reason: String },
    #[display("order request to {executor} failed")]
    Request { executor: String },
    #[display("order rejected by {executor} with HTTP {status}")]
    Rejected { executor: String, status: u16 },
    #[display("failed to parse order response from {executor}")]
    ResponseParse { executor: String },
}
