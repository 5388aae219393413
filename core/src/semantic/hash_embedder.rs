//! FNV-1a feature-hashing embedder.
use super::embedder::{EmbedError, Embedder, EmbedderInfo};
use crate::tokenizer::Tokenizer;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Hashes character n-grams and stemmed word terms into signed buckets.
/// Stands in for a sentence encoder when no model is installed.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    ngram_range: (usize, usize),
    tokenizer: Tokenizer,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "dimension must be > 0");
        Self { dimension, ngram_range: (3, 4), tokenizer: Tokenizer::default() }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

impl HashEmbedder {
    fn add(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let h = fnv1a(feature.as_bytes());
        let bucket = (h as usize) % self.dimension;
        let sign = if (h >> 32) & 1 == 0 { 1.0f32 } else { -1.0f32 };
        vector[bucket] += sign * weight;
    }
}

impl Embedder for HashEmbedder {
    fn info(&self) -> EmbedderInfo {
        EmbedderInfo { name: format!("fnv1a-hash-{}", self.dimension), dimension: self.dimension }
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vector = vec![0.0f32; self.dimension];
        let terms = self.tokenizer.terms(text);
        for term in &terms {
            // word features carry more signal than single n-grams
            self.add(&mut vector, &format!("w:{term}"), 2.0);
            let chars: Vec<char> = format!(" {term} ").chars().collect();
            for n in self.ngram_range.0..=self.ngram_range.1 {
                if n > chars.len() { continue; }
                for window in chars.windows(n) {
                    let ngram: String = window.iter().collect();
                    self.add(&mut vector, &ngram, 1.0);
                }
            }
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}
