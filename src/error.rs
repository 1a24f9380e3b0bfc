use thiserror::Error;

/// Errors surfaced by a cleaning run.
///
/// Only decoding and serialization can fail; the tree passes themselves are
/// total over any parsed document.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("no document content was supplied")]
    NoInput,

    #[error("document could not be read as text: {0}")]
    Parse(String),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CleanError>;
