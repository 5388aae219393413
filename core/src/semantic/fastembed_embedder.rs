//! Sentence embeddings from all-MiniLM-L6-v2 via ONNX Runtime.
//!
//! Requires the `fastembed` feature. The model is fetched into the fastembed
//! cache on first use.

use super::embedder::{EmbedError, Embedder, EmbedderInfo};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

const MINILM_NAME: &str = "all-MiniLM-L6-v2";
const MINILM_DIM: usize = 384;

pub struct FastEmbedEmbedder {
    model: TextEmbedding,
}

impl FastEmbedEmbedder {
    /// Load all-MiniLM-L6-v2. Call once at startup.
    pub fn all_minilm_l6_v2() -> Result<Self, EmbedError> {
        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        let model = TextEmbedding::try_new(options).map_err(|e| EmbedError::ModelNotFound(format!("{MINILM_NAME}: {e}")))?;
        tracing::info!(model = MINILM_NAME, "sentence encoder loaded");
        Ok(Self { model })
    }
}

impl Embedder for FastEmbedEmbedder {
    fn info(&self) -> EmbedderInfo {
        EmbedderInfo { name: format!("fastembed-{MINILM_NAME}"), dimension: MINILM_DIM }
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| EmbedError::InferenceFailed("model returned no embedding".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbedError::InferenceFailed(e.to_string()))
    }
}
