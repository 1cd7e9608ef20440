use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("No data found: {0}")]
    NoData(String),
}
