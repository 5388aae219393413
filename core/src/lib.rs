//! Hybrid lexical + semantic question answering over three fixed collections
//! of civic-participation records: cases, methods and organizations.
//!
//! Build an [`IndexBundle`] once with [`build_indices`], then call [`rank`]
//! per query.

pub mod bundle;
pub mod dataset;
pub mod error;
pub mod index;
pub mod lexical;
pub mod ranker;
pub mod semantic;
pub mod store;
pub mod tokenizer;

pub use bundle::{build_indices, IndexBundle};
pub use error::AgoraError;
pub use index::{DocId, InvertedIndex, Posting, TermId};
pub use lexical::{LexicalConfig, LexicalIndex};
pub use ranker::{rank, rank_scores, QueryResult, RankConfig, ScoredCandidate};
pub use store::{Category, Collections, Document, DocumentStore, Record};

/// Shown by front ends when no document clears the primary threshold.
pub const NO_ANSWER: &str = "I'm sorry, I couldn't find a relevant answer.";
