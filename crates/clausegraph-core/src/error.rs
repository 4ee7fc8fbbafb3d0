use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClauseGraphError {
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Invalid edge type: {0}")]
    InvalidEdgeType(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Analyzer error: {0}")]
    Analyzer(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClauseGraphError {
    /// Graph construction failures that must stop assembly outright.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::DuplicateNode(_) | Self::UnknownNode(_) | Self::InvalidEdgeType(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClauseGraphError>;
