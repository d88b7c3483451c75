//! Word-vector table provider.
//!
//! Loads static word vectors in the fastText `.vec` text format: an optional
//! `<count> <dim>` header, then one `<word> <f32> <f32> ...` line per word.
//! Lookup is case-insensitive, with an accent-folded second chance so that
//! `electricite` finds `électricité`. Unknown words embed as zeros unless
//! hashed out-of-vocabulary vectors are enabled.

use std::collections::HashMap;
use std::path::Path;

use rayon::prelude::*;

use crate::error::EmbeddingError;

use super::hashed::HashedVectors;
use super::tokenize::{fold, tokenize};
use super::{DocumentEmbedding, EmbeddingProvider, PartOfSpeech, Token, mean};

/// Result type for embedding table construction.
pub type EmbeddingResult<T> = std::result::Result<T, EmbeddingError>;

/// [`EmbeddingProvider`] backed by an in-memory word-vector table.
pub struct LexiconEmbeddings {
    dim: usize,
    /// Lower-cased word → vector.
    vectors: HashMap<String, Vec<f32>>,
    /// Accent-folded word → lower-cased key in `vectors`.
    folded: HashMap<String, String>,
    oov: Option<HashedVectors>,
}

impl LexiconEmbeddings {
    /// Build a table from `(word, vector)` pairs. The first occurrence of a
    /// word wins, matching frequency-sorted vector files.
    pub fn from_entries<W, I>(dim: usize, entries: I) -> EmbeddingResult<Self>
    where
        W: AsRef<str>,
        I: IntoIterator<Item = (W, Vec<f32>)>,
    {
        let mut vectors = HashMap::new();
        let mut folded = HashMap::new();
        for (word, vector) in entries {
            if vector.len() != dim {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
            let key = word.as_ref().to_lowercase();
            folded.entry(fold(&key)).or_insert_with(|| key.clone());
            vectors.entry(key).or_insert(vector);
        }
        if vectors.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        Ok(Self {
            dim,
            vectors,
            folded,
            oov: None,
        })
    }

    /// A provider with no table at all: every word gets a hashed vector.
    ///
    /// Similarity then degrades to exact (accent-insensitive) word overlap.
    pub fn hashed_only(dim: usize) -> Self {
        Self {
            dim,
            vectors: HashMap::new(),
            folded: HashMap::new(),
            oov: Some(HashedVectors::new(dim)),
        }
    }

    /// Enable or disable hashed vectors for unknown words.
    pub fn with_hashed_oov(mut self, enabled: bool) -> Self {
        self.oov = enabled.then(|| HashedVectors::new(self.dim));
        self
    }

    /// Load a `.vec` file from disk.
    pub fn load(path: &Path) -> EmbeddingResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EmbeddingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::parse(&text)?;
        tracing::info!(
            path = %path.display(),
            words = table.len(),
            dim = table.dim,
            "loaded word vectors"
        );
        Ok(table)
    }

    /// Parse `.vec` text. Lines are parsed in parallel.
    pub fn parse(text: &str) -> EmbeddingResult<Self> {
        let mut lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end()))
            .filter(|(_, l)| !l.is_empty())
            .collect();

        let header_dim = lines.first().and_then(|(_, l)| parse_header(l));
        if header_dim.is_some() {
            lines.remove(0);
        }

        let parsed: Vec<(String, Vec<f32>)> = lines
            .par_iter()
            .map(|&(line, content)| parse_line(line, content))
            .collect::<EmbeddingResult<_>>()?;

        let dim = match (header_dim, parsed.first()) {
            (Some(d), _) => d,
            (None, Some((_, v))) => v.len(),
            (None, None) => return Err(EmbeddingError::Empty),
        };
        Self::from_entries(dim, parsed)
    }

    /// Number of words in the table.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table holds no words.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The stored vector for a word, if any (no hashed fallback).
    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        let lower = word.to_lowercase();
        if let Some(v) = self.vectors.get(&lower) {
            return Some(v.as_slice());
        }
        let key = self.folded.get(&fold(&lower))?;
        self.vectors.get(key).map(Vec::as_slice)
    }

    fn token_vector(&self, text: &str, pos: PartOfSpeech) -> Vec<f32> {
        if let Some(v) = self.vector(text) {
            return v.to_vec();
        }
        match (&self.oov, pos) {
            (Some(hashed), PartOfSpeech::Word | PartOfSpeech::Num) => hashed.vector(text),
            _ => vec![0.0; self.dim],
        }
    }
}

impl EmbeddingProvider for LexiconEmbeddings {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed_document(&self, text: &str) -> DocumentEmbedding {
        let tokens: Vec<Token> = tokenize(text)
            .into_iter()
            .map(|raw| Token {
                vector: self.token_vector(&raw.text, raw.pos),
                text: raw.text,
                is_stop: raw.is_stop,
                pos: raw.pos,
            })
            .collect();
        let vector = mean(tokens.iter().map(|t| t.vector.as_slice()))
            .unwrap_or_else(|| vec![0.0; self.dim]);
        DocumentEmbedding { tokens, vector }
    }
}

impl std::fmt::Debug for LexiconEmbeddings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexiconEmbeddings")
            .field("dim", &self.dim)
            .field("words", &self.vectors.len())
            .field("hashed_oov", &self.oov.is_some())
            .finish()
    }
}

/// `<count> <dim>` header line.
fn parse_header(line: &str) -> Option<usize> {
    let mut parts = line.split_whitespace();
    let _count: usize = parts.next()?.parse().ok()?;
    let dim: usize = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some(dim)
}

fn parse_line(line: usize, content: &str) -> EmbeddingResult<(String, Vec<f32>)> {
    let mut parts = content.split_whitespace();
    let word = parts.next().ok_or_else(|| EmbeddingError::Parse {
        line,
        message: "missing word".into(),
    })?;
    let vector = parts
        .map(|x| {
            x.parse::<f32>().map_err(|e| EmbeddingError::Parse {
                line,
                message: format!("invalid component \"{x}\": {e}"),
            })
        })
        .collect::<EmbeddingResult<Vec<f32>>>()?;
    if vector.is_empty() {
        return Err(EmbeddingError::Parse {
            line,
            message: format!("word \"{word}\" has no components"),
        });
    }
    Ok((word.to_string(), vector))
}
