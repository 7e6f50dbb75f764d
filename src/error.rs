use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid DOCX: {0}")]
    InvalidDocx(String),

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),
}
