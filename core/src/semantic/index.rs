use super::embedder::{EmbedError, Embedder};
use std::sync::Arc;

pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

/// One embedding per corpus document, in corpus order.
pub struct SemanticIndex {
    embedder: Arc<dyn Embedder>,
    embeddings: Vec<Vec<f32>>,
}

impl SemanticIndex {
    pub fn build<S: AsRef<str>>(corpus: &[S], embedder: Arc<dyn Embedder>) -> Result<Self, EmbedError> {
        let info = embedder.info();
        let texts: Vec<&str> = corpus.iter().map(|s| s.as_ref()).collect();
        let embeddings = if texts.is_empty() { Vec::new() } else { embedder.embed_batch(&texts)? };
        if embeddings.len() != texts.len() {
            return Err(EmbedError::InferenceFailed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|v| v.len() != info.dimension) {
            return Err(EmbedError::DimensionMismatch { expected: info.dimension, actual: bad.len() });
        }
        tracing::info!(num_docs = embeddings.len(), embedder = %info.name, dimension = info.dimension, "semantic index built");
        Ok(Self { embedder, embeddings })
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Cosine similarity of `query` against every document, in corpus order.
    pub fn score(&self, query: &str) -> Result<Vec<f32>, EmbedError> {
        let q = self.embedder.embed(query)?;
        let dimension = self.embedder.dimension();
        if q.len() != dimension {
            return Err(EmbedError::DimensionMismatch { expected: dimension, actual: q.len() });
        }
        Ok(self.embeddings.iter().map(|d| cosine(&q, d)).collect())
    }
}

impl std::fmt::Debug for SemanticIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticIndex")
            .field("embedder", &self.embedder.info().name)
            .field("len", &self.embeddings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{EmbedderInfo, HashEmbedder};

    struct Fixed(Vec<Vec<f32>>);

    impl Embedder for Fixed {
        fn info(&self) -> EmbedderInfo {
            EmbedderInfo { name: "fixed".into(), dimension: 2 }
        }
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            let i: usize = text.parse().map_err(|_| EmbedError::InferenceFailed(text.into()))?;
            Ok(self.0[i].clone())
        }
    }

    #[test]
    fn cosine_handles_zero_and_opposite() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn scores_in_corpus_order() {
        let emb = Arc::new(Fixed(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]));
        let idx = SemanticIndex::build(&["0", "1"], emb).unwrap();
        let s = idx.score("2").unwrap();
        assert_eq!(s.len(), 2);
        assert!((s[0] - s[1]).abs() < 1e-6);
        assert!((s[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let emb = Arc::new(Fixed(vec![vec![1.0, 0.0, 0.0]]));
        assert!(matches!(
            SemanticIndex::build(&["0"], emb),
            Err(EmbedError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn hash_index_prefers_related_text() {
        let corpus = ["Citizens assembly on climate policy", "Community garden cooperative"];
        let idx = SemanticIndex::build(&corpus, Arc::new(HashEmbedder::default())).unwrap();
        let s = idx.score("how does a citizen assembly work").unwrap();
        assert!(s[0] > s[1]);
    }
}
