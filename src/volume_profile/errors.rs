use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VolumeProfileError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
