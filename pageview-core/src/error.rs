use thiserror::Error;

/// Errors surfaced by the viewport controller and its configuration layer.
///
/// Page-field parse failures and wheel noise are recovered where they occur
/// and never show up here.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to decode document: {0}")]
    Load(String),

    #[error("document has no pages")]
    EmptyDocument,

    #[error("no document is ready")]
    NotReady,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
