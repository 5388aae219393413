//! Sparse TF-IDF vector space over the flattened corpus.

use crate::index::{DocId, InvertedIndex, Posting, TermId};
use crate::tokenizer::Tokenizer;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalConfig {
    pub tokenizer: Tokenizer,
    /// Use `1 + ln(tf)` instead of the raw count.
    pub sublinear_tf: bool,
    /// Use smoothed IDF `ln((1 + n) / (1 + df)) + 1` instead of `ln(n / df) + 1`.
    pub smooth_idf: bool,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self { tokenizer: Tokenizer::default(), sublinear_tf: false, smooth_idf: true }
    }
}

impl LexicalConfig {
    /// Plain TF-IDF vectorizer defaults: every `\w\w+` token counts, raw tf,
    /// smoothed idf. Scores match a stock vectorizer fitted on the same corpus.
    pub fn vectorizer() -> Self {
        Self { tokenizer: Tokenizer::vectorizer(), ..Self::default() }
    }
}

#[derive(Debug, Clone)]
pub struct LexicalIndex {
    config: LexicalConfig,
    index: InvertedIndex,
}

impl LexicalIndex {
    /// Fit the vocabulary and document vectors. Term ids are assigned in
    /// first-seen corpus order, so identical input gives an identical space.
    pub fn build<S: AsRef<str>>(corpus: &[S], config: LexicalConfig) -> Self {
        let mut index = InvertedIndex::new();
        let mut postings_raw: Vec<Vec<(DocId, u32)>> = Vec::new();

        for (doc_id, text) in corpus.iter().enumerate() {
            let mut tf_counts: BTreeMap<TermId, u32> = BTreeMap::new();
            for term in config.tokenizer.terms(text.as_ref()) {
                let next = index.dictionary.len() as TermId;
                let tid = *index.dictionary.entry(term).or_insert(next);
                if tid == next {
                    index.df.push(0);
                    postings_raw.push(Vec::new());
                }
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            for (tid, tf_raw) in tf_counts {
                index.df[tid as usize] += 1;
                postings_raw[tid as usize].push((doc_id as DocId, tf_raw));
            }
        }
        index.num_docs = corpus.len() as u32;
        index.idf = index.df.iter().map(|&df| idf(index.num_docs, df, config.smooth_idf)).collect();

        // First pass: raw tf-idf and squared norms
        let mut doc_norms = vec![0.0f32; corpus.len()];
        let mut weighted: Vec<Vec<(DocId, f32)>> = Vec::with_capacity(postings_raw.len());
        for (tid, plist) in postings_raw.into_iter().enumerate() {
            let idf_t = index.idf[tid];
            let row: Vec<(DocId, f32)> = plist
                .into_iter()
                .map(|(doc_id, tf_raw)| {
                    let w = tf_weight(tf_raw, config.sublinear_tf) * idf_t;
                    doc_norms[doc_id as usize] += w * w;
                    (doc_id, w)
                })
                .collect();
            weighted.push(row);
        }
        for dn in doc_norms.iter_mut() {
            *dn = dn.sqrt();
            if *dn == 0.0 { *dn = 1.0; }
        }

        // Second pass: normalize
        index.postings = weighted
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(doc_id, w)| Posting { doc_id, weight: w / doc_norms[doc_id as usize] })
                    .collect()
            })
            .collect();

        tracing::info!(num_docs = index.num_docs, num_terms = index.vocabulary_len(), "lexical index built");
        Self { config, index }
    }

    pub fn len(&self) -> usize {
        self.index.num_docs as usize
    }

    pub fn is_empty(&self) -> bool {
        self.index.num_docs == 0
    }

    pub fn vocabulary_len(&self) -> usize {
        self.index.vocabulary_len()
    }

    /// L2-normalized query weights under the fitted vocabulary. Unknown terms are dropped.
    pub fn vectorize(&self, text: &str) -> BTreeMap<TermId, f32> {
        let mut tf_q: BTreeMap<TermId, u32> = BTreeMap::new();
        for term in self.config.tokenizer.terms(text) {
            if let Some(tid) = self.index.term_id(&term) {
                *tf_q.entry(tid).or_insert(0) += 1;
            }
        }
        let mut weights: BTreeMap<TermId, f32> = tf_q
            .into_iter()
            .map(|(tid, tf_raw)| (tid, tf_weight(tf_raw, self.config.sublinear_tf) * self.index.idf[tid as usize]))
            .collect();
        let norm = weights.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for w in weights.values_mut() { *w /= norm; }
        }
        weights
    }

    /// Cosine similarity of `query` against every document, in corpus order.
    /// Empty or fully out-of-vocabulary queries score all zeros.
    pub fn score(&self, query: &str) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.len()];
        for (tid, q_w) in self.vectorize(query) {
            for p in self.index.postings(tid) {
                scores[p.doc_id as usize] += p.weight * q_w; // both sides normalized
            }
        }
        for s in scores.iter_mut() {
            *s = s.clamp(0.0, 1.0);
        }
        scores
    }
}

fn tf_weight(tf_raw: u32, sublinear: bool) -> f32 {
    if tf_raw == 0 {
        0.0
    } else if sublinear {
        1.0 + (tf_raw as f32).ln()
    } else {
        tf_raw as f32
    }
}

fn idf(n: u32, df: u32, smooth: bool) -> f32 {
    let df = df as f32;
    let n = n as f32;
    if smooth {
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    } else {
        (n / df.max(1.0)).ln() + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "Participatory budgeting in Porto Alegre",
            "Citizen assembly on climate",
            "Deliberative polling method",
            "Participatory budgeting project organization",
        ]
    }

    #[test]
    fn scores_align_with_corpus() {
        let idx = LexicalIndex::build(&corpus(), LexicalConfig::default());
        let s = idx.score("participatory budgeting");
        assert_eq!(s.len(), 4);
        assert!(s[0] > 0.0 && s[3] > 0.0);
        assert_eq!(s[1], 0.0);
        assert!(s.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn identical_text_scores_one() {
        let idx = LexicalIndex::build(&corpus(), LexicalConfig::default());
        let s = idx.score("Citizen assembly on climate");
        assert!((s[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn out_of_vocabulary_is_all_zero() {
        let idx = LexicalIndex::build(&corpus(), LexicalConfig::default());
        assert!(idx.score("zebra quantum").iter().all(|&v| v == 0.0));
        assert!(idx.score("").iter().all(|&v| v == 0.0));
        assert!(idx.vectorize("the of and").is_empty());
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let idx = LexicalIndex::build(&corpus(), LexicalConfig::default());
        // "porto" appears once, "participatory" twice
        let s = idx.score("participatory porto");
        assert!(s[0] > s[3]);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let a = LexicalIndex::build(&corpus(), LexicalConfig::default());
        let b = LexicalIndex::build(&corpus(), LexicalConfig::default());
        assert_eq!(a.vocabulary_len(), b.vocabulary_len());
        assert_eq!(a.score("citizen budgeting"), b.score("citizen budgeting"));
    }

    #[test]
    fn vectorizer_preset_matches_hand_computed_cosine() {
        let corpus = ["What is a citizens assembly", "What is participatory budgeting"];
        let idx = LexicalIndex::build(&corpus, LexicalConfig::vectorizer());
        // idf: "what"/"is" = 1, the rest ln(3/2) + 1; "a" is too short to count
        let rare = (1.5f32).ln() + 1.0;
        let doc_norm = (2.0 + 2.0 * rare * rare).sqrt();
        let query_norm = (2.0 + rare * rare).sqrt();
        let s = idx.score("what is budgeting");
        assert!((s[0] - 2.0 / (doc_norm * query_norm)).abs() < 1e-4, "{s:?}");
        assert!((s[1] - (2.0 + rare * rare) / (doc_norm * query_norm)).abs() < 1e-4, "{s:?}");
        assert!((s[1] - 0.81734).abs() < 1e-3);

        // the default tokenizer drops "what" and "is", so only doc 1 matches
        let stemmed = LexicalIndex::build(&corpus, LexicalConfig::default());
        assert_eq!(stemmed.score("what is budgeting")[0], 0.0);
    }

    #[test]
    fn unsmoothed_idf_still_weights_common_terms() {
        let config = LexicalConfig { smooth_idf: false, sublinear_tf: true, ..Default::default() };
        let idx = LexicalIndex::build(&["alpha beta", "alpha gamma"], config);
        let s = idx.score("alpha");
        assert!(s[0] > 0.0 && s[1] > 0.0);
    }
}
