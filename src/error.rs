use thiserror::Error;

/// Errors that can occur while fitting diameter distributions.
#[derive(Error, Debug)]
pub enum DistFitError {
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Convergence error: {0}")]
    Convergence(String),

    #[error("Unsupported distribution '{0}'")]
    UnsupportedDistribution(String),

    #[error("Data unavailable: {0}")]
    DataAvailability(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<calamine::XlsxError> for DistFitError {
    fn from(e: calamine::XlsxError) -> Self {
        DistFitError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for DistFitError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        DistFitError::Excel(e.to_string())
    }
}
