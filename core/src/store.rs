use crate::error::AgoraError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Case,
    Method,
    Organization,
}

impl Category {
    /// Corpus order: cases, then methods, then organizations.
    pub const ALL: [Category; 3] = [Category::Case, Category::Method, Category::Organization];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Case => "Case",
            Category::Method => "Method",
            Category::Organization => "Organization",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input row, as read from a dataset file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
}

impl Record {
    pub fn new(title: impl Into<String>, description: impl Into<String>, url: impl Into<String>) -> Self {
        Self { title: title.into(), description: Some(description.into()), url: url.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub url: String,
    pub corpus_index: usize,
}

impl Document {
    /// `title + " " + description`, the text both indices are built over.
    pub fn corpus_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    pub fn answer_line(&self) -> String {
        format!("{}: {} - {} [Link: {}]", self.category, self.title, self.description, self.url)
    }

    pub fn suggestion_line(&self) -> String {
        format!("[{}] {} - {}", self.category, self.title, self.url)
    }
}

/// The three raw datasets handed to [`DocumentStore::load`].
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub cases: Vec<Record>,
    pub methods: Vec<Record>,
    pub organizations: Vec<Record>,
}

impl Collections {
    pub fn get(&self, category: Category) -> &[Record] {
        match category {
            Category::Case => &self.cases,
            Category::Method => &self.methods,
            Category::Organization => &self.organizations,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    cases: Vec<Document>,
    methods: Vec<Document>,
    organizations: Vec<Document>,
    corpus: Vec<String>,
}

impl DocumentStore {
    pub fn load(collections: Collections) -> Result<Self, AgoraError> {
        let mut next_index = 0usize;
        let mut segments: [Vec<Document>; 3] = Default::default();
        for (slot, category) in Category::ALL.into_iter().enumerate() {
            let records = collections.get(category);
            let mut docs = Vec::with_capacity(records.len());
            for (row, rec) in records.iter().enumerate() {
                if rec.title.trim().is_empty() {
                    return Err(AgoraError::load(format!("{category} row {row}: empty title")));
                }
                if rec.url.trim().is_empty() {
                    return Err(AgoraError::load(format!("{category} row {row}: empty url")));
                }
                docs.push(Document {
                    category,
                    title: rec.title.clone(),
                    description: rec.description.clone().unwrap_or_default(),
                    url: rec.url.clone(),
                    corpus_index: next_index,
                });
                next_index += 1;
            }
            segments[slot] = docs;
        }
        let [cases, methods, organizations] = segments;
        let corpus = cases
            .iter()
            .chain(methods.iter())
            .chain(organizations.iter())
            .map(Document::corpus_text)
            .collect();
        tracing::info!(
            cases = cases.len(),
            methods = methods.len(),
            organizations = organizations.len(),
            "document store loaded"
        );
        Ok(Self { cases, methods, organizations, corpus })
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Flattened corpus text in corpus order.
    pub fn corpus(&self) -> &[String] {
        &self.corpus
    }

    pub fn collection(&self, category: Category) -> &[Document] {
        match category {
            Category::Case => &self.cases,
            Category::Method => &self.methods,
            Category::Organization => &self.organizations,
        }
    }

    /// Maps a flat corpus index to its category and offset within that collection.
    /// The only place the segment arithmetic lives.
    fn locate(&self, flat_index: i64) -> Result<(Category, usize), AgoraError> {
        let len = self.len();
        if flat_index < 0 || flat_index as u64 >= len as u64 {
            return Err(AgoraError::OutOfRange { index: flat_index, len });
        }
        let i = flat_index as usize;
        let n_cases = self.cases.len();
        let n_methods = self.methods.len();
        if i < n_cases {
            Ok((Category::Case, i))
        } else if i < n_cases + n_methods {
            Ok((Category::Method, i - n_cases))
        } else {
            Ok((Category::Organization, i - n_cases - n_methods))
        }
    }

    pub fn resolve(&self, flat_index: i64) -> Result<&Document, AgoraError> {
        let (category, offset) = self.locate(flat_index)?;
        Ok(&self.collection(category)[offset])
    }

    pub fn category_of(&self, flat_index: i64) -> Result<Category, AgoraError> {
        self.locate(flat_index).map(|(category, _)| category)
    }
}
