//! Dense-embedding similarity.
//!
//! An [`Embedder`] turns text into a fixed-length vector; [`SemanticIndex`]
//! embeds the corpus once and scores queries by cosine similarity.
//!
//! - [`HashEmbedder`]: FNV-1a feature hashing, deterministic, no model files.
//! - `FastEmbedEmbedder`: all-MiniLM-L6-v2 via ONNX Runtime (feature `fastembed`).

mod embedder;
mod hash_embedder;
mod index;

#[cfg(feature = "fastembed")]
mod fastembed_embedder;

pub use embedder::{EmbedError, Embedder, EmbedderInfo};
pub use hash_embedder::HashEmbedder;
pub use index::{cosine, SemanticIndex};

#[cfg(feature = "fastembed")]
pub use fastembed_embedder::FastEmbedEmbedder;

use std::sync::Arc;

/// Embedder by name: `hash` (or `hash:<dim>`), or `minilm` when built with `fastembed`.
pub fn build_embedder(name: &str) -> Result<Arc<dyn Embedder>, EmbedError> {
    match name.trim().to_lowercase().as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::default())),
        other if other.starts_with("hash:") => {
            let dim: usize = other["hash:".len()..]
                .parse()
                .ok()
                .filter(|d| *d > 0)
                .ok_or_else(|| EmbedError::ModelNotFound(format!("bad hash dimension in `{name}`")))?;
            Ok(Arc::new(HashEmbedder::new(dim)))
        }
        #[cfg(feature = "fastembed")]
        "minilm" | "all-minilm-l6-v2" => Ok(Arc::new(FastEmbedEmbedder::all_minilm_l6_v2()?)),
        #[cfg(not(feature = "fastembed"))]
        "minilm" | "all-minilm-l6-v2" => Err(EmbedError::ModelNotFound(
            "sentence encoder support not compiled in (enable the `fastembed` feature)".into(),
        )),
        _ => Err(EmbedError::ModelNotFound(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedder_by_name() {
        assert_eq!(build_embedder("hash").unwrap().dimension(), 256);
        assert_eq!(build_embedder("hash:64").unwrap().dimension(), 64);
        assert!(build_embedder("hash:0").is_err());
        assert!(build_embedder("word2vec").is_err());
    }

    #[cfg(not(feature = "fastembed"))]
    #[test]
    fn minilm_needs_the_feature() {
        assert!(matches!(build_embedder("minilm"), Err(EmbedError::ModelNotFound(_))));
    }
}
