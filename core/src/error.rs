use crate::semantic::EmbedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgoraError {
    /// Startup data could not be read or failed validation. Fatal.
    #[error("load error: {0}")]
    Load(String),
    /// A flat corpus index fell outside the store. Indicates misaligned score vectors.
    #[error("corpus index {index} out of range (len {len})")]
    OutOfRange { index: i64, len: usize },
    #[error("invalid query: query is empty")]
    InvalidQuery,
    #[error(transparent)]
    Embed(#[from] EmbedError),
}

impl AgoraError {
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// True for errors a caller can recover from by asking again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidQuery | Self::Embed(_))
    }
}
