//! Frequently asked questions.
//!
//! A [`FaqCatalog`] is a list of reference questions with their answers. The
//! [`SemanticMatcher`] embeds every reference question once and answers a
//! free-text query with the closest entry, if it is close enough.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::embedding::{DocumentEmbedding, EmbeddingProvider, document_similarity};
use crate::error::CatalogError;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// The catalog compiled into the binary.
pub const BUNDLED_CATALOG: &str = include_str!("../data/faq.toml");

/// One question and its canonical answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "entry")]
    entries: Vec<FaqEntry>,
}

/// Validated list of FAQ entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqCatalog {
    entries: Vec<FaqEntry>,
}

impl FaqCatalog {
    /// Build from entries. Rejects an empty list and blank fields.
    pub fn new(entries: Vec<FaqEntry>) -> CatalogResult<Self> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, entry) in entries.iter().enumerate() {
            if entry.question.trim().is_empty() {
                return Err(CatalogError::BlankField { index, field: "question" });
            }
            if entry.answer.trim().is_empty() {
                return Err(CatalogError::BlankField { index, field: "answer" });
            }
        }
        Ok(Self { entries })
    }

    /// Parse a TOML catalog made of `[[entry]]` tables.
    pub fn from_toml(text: &str) -> CatalogResult<Self> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| CatalogError::Parse {
            message: e.to_string(),
        })?;
        Self::new(file.entries)
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn bundled() -> CatalogResult<Self> {
        Self::from_toml(BUNDLED_CATALOG)
    }

    /// `path` if given, else the bundled catalog.
    pub fn load_or_bundled(path: Option<&Path>) -> CatalogResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Matcher ─────────────────────────────────────────────────────────────

struct IndexedEntry {
    embedding: DocumentEmbedding,
    entry: FaqEntry,
}

/// Closest-question lookup over a pre-embedded catalog.
pub struct SemanticMatcher {
    provider: Arc<dyn EmbeddingProvider>,
    entries: Vec<IndexedEntry>,
    threshold: f32,
}

/// Best catalog entry for a query, whatever its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaqMatch<'a> {
    pub index: usize,
    pub score: f32,
    pub entry: &'a FaqEntry,
}

impl SemanticMatcher {
    /// Embed every reference question of `catalog`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, catalog: FaqCatalog, threshold: f32) -> Self {
        let entries: Vec<IndexedEntry> = catalog
            .entries
            .into_par_iter()
            .map(|entry| IndexedEntry {
                embedding: provider.embed_document(&entry.question),
                entry,
            })
            .collect();
        tracing::info!(entries = entries.len(), threshold, "FAQ catalog indexed");
        Self {
            provider,
            entries,
            threshold,
        }
    }

    /// Highest-scoring entry. Ties keep the earliest entry.
    pub fn best_match(&self, query: &str) -> Option<FaqMatch<'_>> {
        let doc = self.provider.embed_document(query);
        let mut best: Option<FaqMatch<'_>> = None;
        for (index, indexed) in self.entries.iter().enumerate() {
            let score = document_similarity(self.provider.as_ref(), &doc, &indexed.embedding);
            if best.is_none_or(|b| score > b.score) {
                best = Some(FaqMatch {
                    index,
                    score,
                    entry: &indexed.entry,
                });
            }
        }
        best
    }

    /// Canonical answer of the closest question, if its similarity is strictly
    /// above the threshold.
    pub fn answer(&self, query: &str) -> Option<&str> {
        let best = self.best_match(query)?;
        tracing::debug!(
            query,
            score = best.score,
            question = %best.entry.question,
            "FAQ best match"
        );
        (best.score > self.threshold).then_some(best.entry.answer.as_str())
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.entry.question.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SemanticMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticMatcher")
            .field("entries", &self.entries.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}
