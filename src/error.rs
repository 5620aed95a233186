use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xlsx")]
    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DashError>;
