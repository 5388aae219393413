//! Weighted combination of lexical and semantic scores into an answer.

use crate::bundle::IndexBundle;
use crate::error::AgoraError;
use crate::store::{Category, Document, DocumentStore};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankConfig {
    pub semantic_weight: f32,
    pub lexical_weight: f32,
    /// Minimum combined score for any primary answer. Inclusive.
    pub primary_threshold: f32,
    /// Minimum combined score for a suggestion. Inclusive.
    pub suggestion_threshold: f32,
    pub suggestion_count: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.7,
            lexical_weight: 0.3,
            primary_threshold: 0.5,
            suggestion_threshold: 0.5,
            suggestion_count: 3,
        }
    }
}

impl RankConfig {
    /// Weights are applied as given; they need not sum to one.
    pub fn combine(&self, lexical: f32, semantic: f32) -> f32 {
        self.semantic_weight * semantic + self.lexical_weight * lexical
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate<'a> {
    pub document: &'a Document,
    pub corpus_index: usize,
    pub lexical_score: f32,
    pub semantic_score: f32,
    pub combined_score: f32,
}

impl ScoredCandidate<'_> {
    pub fn category(&self) -> Category {
        self.document.category
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult<'a> {
    pub primary: Option<ScoredCandidate<'a>>,
    pub suggestions: Vec<ScoredCandidate<'a>>,
}

impl QueryResult<'_> {
    pub fn is_answered(&self) -> bool {
        self.primary.is_some()
    }
}

/// Score `query` against every document and pick a primary answer plus
/// same-category suggestions.
pub fn rank<'a>(bundle: &'a IndexBundle, query: &str, config: &RankConfig) -> Result<QueryResult<'a>, AgoraError> {
    if query.trim().is_empty() {
        return Err(AgoraError::InvalidQuery);
    }
    let lexical = bundle.lexical().score(query);
    let semantic = bundle.semantic().score(query)?;
    rank_scores(bundle.store(), &lexical, &semantic, config)
}

/// Ranking over precomputed score vectors. Index `i` of both vectors must
/// refer to corpus document `i`.
pub fn rank_scores<'a>(
    store: &'a DocumentStore,
    lexical: &[f32],
    semantic: &[f32],
    config: &RankConfig,
) -> Result<QueryResult<'a>, AgoraError> {
    let n = store.len();
    for len in [lexical.len(), semantic.len()] {
        if len != n {
            return Err(AgoraError::OutOfRange { index: len as i64, len: n });
        }
    }
    let combined: Vec<f32> = lexical
        .iter()
        .zip(semantic)
        .map(|(&l, &s)| config.combine(l, s))
        .collect();

    // Strict `>` keeps the first occurrence on ties.
    let mut best: Option<(usize, f32)> = None;
    for (i, &c) in combined.iter().enumerate() {
        if c.is_nan() { continue; }
        if best.map_or(true, |(_, b)| c > b) {
            best = Some((i, c));
        }
    }
    let (top, top_score) = match best {
        Some((i, c)) if c >= config.primary_threshold => (i, c),
        other => {
            tracing::debug!(best = ?other.map(|(_, c)| c), threshold = config.primary_threshold, "no confident match");
            return Ok(QueryResult::default());
        }
    };

    let candidate = |i: usize| -> Result<ScoredCandidate<'a>, AgoraError> {
        Ok(ScoredCandidate {
            document: store.resolve(i as i64)?,
            corpus_index: i,
            lexical_score: lexical[i],
            semantic_score: semantic[i],
            combined_score: combined[i],
        })
    };
    let primary = candidate(top)?;
    let locked = primary.category();

    let mut pool: Vec<usize> = Vec::new();
    for (i, &c) in combined.iter().enumerate() {
        if i == top || c.is_nan() || c < config.suggestion_threshold { continue; }
        if store.category_of(i as i64)? == locked {
            pool.push(i);
        }
    }
    pool.sort_by(|&a, &b| {
        combined[b]
            .partial_cmp(&combined[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    pool.truncate(config.suggestion_count);
    let suggestions = pool.into_iter().map(candidate).collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(index = top, score = top_score, category = %locked, suggestions = suggestions.len(), "ranked");
    Ok(QueryResult { primary: Some(primary), suggestions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Collections, Record};

    fn recs(prefix: &str, n: usize) -> Vec<Record> {
        (0..n).map(|i| Record::new(format!("{prefix} {i}"), "", format!("https://x/{prefix}/{i}"))).collect()
    }

    /// 3 cases (0-2), 2 methods (3-4), 2 organizations (5-6).
    fn store() -> DocumentStore {
        DocumentStore::load(Collections { cases: recs("case", 3), methods: recs("method", 2), organizations: recs("org", 2) })
            .unwrap()
    }

    #[test]
    fn combined_is_weighted_sum() {
        let s = store();
        let lex = [0.1, 0.2, 0.3, 0.4, 0.9, 0.0, 0.5];
        let sem = [0.3, 0.1, 0.2, 0.7, 0.9, 0.6, 0.4];
        let cfg = RankConfig { semantic_weight: 0.8, lexical_weight: 0.5, suggestion_threshold: 0.0, ..Default::default() };
        let r = rank_scores(&s, &lex, &sem, &cfg).unwrap();
        let p = r.primary.unwrap();
        assert_eq!(p.corpus_index, 4);
        assert_eq!(p.combined_score, 0.8 * sem[4] + 0.5 * lex[4]);
        for c in &r.suggestions {
            assert_eq!(c.combined_score, 0.8 * sem[c.corpus_index] + 0.5 * lex[c.corpus_index]);
        }
    }

    #[test]
    fn peak_at_method_locks_category() {
        let s = store();
        let lex = [0.2, 0.1, 0.0, 0.5, 0.6, 0.0, 0.0];
        let sem = [0.3, 0.2, 0.1, 0.7, 0.9, 0.8, 0.1];
        let r = rank_scores(&s, &lex, &sem, &RankConfig::default()).unwrap();
        let p = r.primary.as_ref().unwrap();
        assert_eq!(p.corpus_index, 4);
        assert!((p.combined_score - 0.81).abs() < 1e-6);
        assert_eq!(p.document.category, Category::Method);
        assert_eq!(p.document.title, "method 1");
        // index 5 clears the suggestion threshold but is an organization
        assert_eq!(r.suggestions.len(), 1);
        assert_eq!(r.suggestions[0].corpus_index, 3);
    }

    #[test]
    fn below_threshold_has_no_answer() {
        let s = store();
        let lex = [0.1; 7];
        let sem = [0.4; 7];
        let r = rank_scores(&s, &lex, &sem, &RankConfig::default()).unwrap();
        assert!(r.primary.is_none());
        assert!(r.suggestions.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let s = store();
        let mut sem = [0.0; 7];
        sem[2] = 0.5;
        let cfg = RankConfig { semantic_weight: 1.0, lexical_weight: 0.0, ..Default::default() };
        let r = rank_scores(&s, &[0.0; 7], &sem, &cfg).unwrap();
        assert_eq!(r.primary.unwrap().corpus_index, 2);
    }

    #[test]
    fn ties_pick_lowest_index() {
        let s = store();
        let sem = [0.6, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9];
        let cfg = RankConfig { semantic_weight: 1.0, lexical_weight: 0.0, ..Default::default() };
        let r = rank_scores(&s, &[0.0; 7], &sem, &cfg).unwrap();
        assert_eq!(r.primary.as_ref().unwrap().corpus_index, 1);
        let idx: Vec<usize> = r.suggestions.iter().map(|c| c.corpus_index).collect();
        assert_eq!(idx, vec![2, 0]);
    }

    #[test]
    fn suggestions_bounded_sorted_and_same_category() {
        let cases = recs("case", 6);
        let s = DocumentStore::load(Collections { cases, methods: recs("method", 1), ..Default::default() }).unwrap();
        let sem = [0.6, 0.95, 0.7, 0.8, 0.55, 0.9, 0.99];
        let cfg = RankConfig { semantic_weight: 1.0, lexical_weight: 0.0, suggestion_count: 3, ..Default::default() };
        let r = rank_scores(&s, &[0.0; 7], &sem, &cfg).unwrap();
        // method at 6 wins; no other methods exist
        assert_eq!(r.primary.as_ref().unwrap().corpus_index, 6);
        assert!(r.suggestions.is_empty());

        let mut sem2 = sem;
        sem2[6] = 0.1;
        let r = rank_scores(&s, &[0.0; 7], &sem2, &cfg).unwrap();
        assert_eq!(r.primary.as_ref().unwrap().corpus_index, 1);
        let idx: Vec<usize> = r.suggestions.iter().map(|c| c.corpus_index).collect();
        assert_eq!(idx, vec![5, 3, 2]);
        assert!(r.suggestions.windows(2).all(|w| w[0].combined_score >= w[1].combined_score));
    }

    #[test]
    fn suggestion_threshold_filters_without_padding() {
        let s = store();
        let sem = [0.9, 0.45, 0.2, 0.0, 0.0, 0.0, 0.0];
        let cfg = RankConfig { semantic_weight: 1.0, lexical_weight: 0.0, ..Default::default() };
        let r = rank_scores(&s, &[0.0; 7], &sem, &cfg).unwrap();
        assert!(r.suggestions.is_empty());
        let cfg = RankConfig { suggestion_threshold: 0.4, ..cfg };
        let r = rank_scores(&s, &[0.0; 7], &sem, &cfg).unwrap();
        assert_eq!(r.suggestions.len(), 1);
    }

    #[test]
    fn misaligned_scores_are_out_of_range() {
        let s = store();
        assert!(matches!(
            rank_scores(&s, &[0.0; 6], &[0.0; 7], &RankConfig::default()),
            Err(AgoraError::OutOfRange { .. })
        ));
    }
}
