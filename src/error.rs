use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Must give sample_rate frequency to convert analog filter to digital")]
    MissingSampleRate,

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Filter design failed: {0}")]
    FilterDesign(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
