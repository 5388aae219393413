use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("model not available: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedderInfo {
    pub name: String,
    pub dimension: usize,
}

/// String to fixed-dimension vector. Must be deterministic for a given model.
pub trait Embedder: Send + Sync {
    fn info(&self) -> EmbedderInfo;
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
    fn dimension(&self) -> usize {
        self.info().dimension
    }
}
