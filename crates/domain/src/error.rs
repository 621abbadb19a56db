/// Shared error type used across all Threadline crates.
///
/// The transformation pipeline itself is total and never returns an error;
/// `Result` only appears at the record-ingestion boundary where raw JSON rows
/// from the chat storage service are turned into [`crate::record::StoredMessage`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record: {0}")]
    Record(String),
}

pub type Result<T> = std::result::Result<T, Error>;
