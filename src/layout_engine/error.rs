use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// The open-panel selector held a value no panel answers to. This is
    /// treated as corrupted session state, never mapped to a default layout.
    #[error("Unexpected openPanel value: {0:?}")]
    UnexpectedPanel(String),
    #[error("Unexpected webcams placement: {0:?}")]
    UnexpectedPlacement(String),
    #[error("Storage I/O failed: {0}")]
    StorageIo(#[from] std::io::Error),
    #[error("Storage file could not be encoded: {0}")]
    StorageEncode(#[from] ron::Error),
    #[error("Storage file could not be decoded: {0}")]
    StorageDecode(#[from] ron::error::SpannedError),
    #[error("Stored value could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}
