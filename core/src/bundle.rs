use crate::error::AgoraError;
use crate::lexical::{LexicalConfig, LexicalIndex};
use crate::ranker::{self, QueryResult, RankConfig};
use crate::semantic::{Embedder, SemanticIndex};
use crate::store::{Collections, DocumentStore, Record};
use std::sync::Arc;

/// Document store plus both indices. Built once at startup, read-only afterwards.
#[derive(Debug)]
pub struct IndexBundle {
    store: DocumentStore,
    lexical: LexicalIndex,
    semantic: SemanticIndex,
}

impl IndexBundle {
    pub fn build(
        collections: Collections,
        embedder: Arc<dyn Embedder>,
        lexical_config: &LexicalConfig,
    ) -> Result<Self, AgoraError> {
        let store = DocumentStore::load(collections)?;
        let lexical = LexicalIndex::build(store.corpus(), *lexical_config);
        let semantic = SemanticIndex::build(store.corpus(), embedder)?;
        Ok(Self { store, lexical, semantic })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn semantic(&self) -> &SemanticIndex {
        &self.semantic
    }

    pub fn rank(&self, query: &str, config: &RankConfig) -> Result<QueryResult<'_>, AgoraError> {
        ranker::rank(self, query, config)
    }
}

pub fn build_indices(
    cases: Vec<Record>,
    methods: Vec<Record>,
    organizations: Vec<Record>,
    embedder: Arc<dyn Embedder>,
    lexical_config: &LexicalConfig,
) -> Result<IndexBundle, AgoraError> {
    IndexBundle::build(Collections { cases, methods, organizations }, embedder, lexical_config)
}
