//! Word-embedding similarity.
//!
//! The questionnaire and the FAQ matcher only rely on the contract of
//! [`EmbeddingProvider`]: tokenize a text, attach a fixed-dimension vector to
//! every token and to the whole document, and compare two vectors with the
//! cosine. This module provides:
//!
//! - [`EmbeddingProvider`]: the provider contract
//! - [`sentence_vector`] / [`document_similarity`]: content-word averaging
//!   with a whole-document fallback for degenerate inputs
//! - [`lexicon::LexiconEmbeddings`]: a provider backed by a word-vector table
//! - [`hashed::HashedVectors`]: deterministic vectors for unknown words

pub mod hashed;
pub mod lexicon;
pub mod tokenize;

use serde::{Deserialize, Serialize};

/// Coarse part-of-speech tag attached to every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    /// Alphabetic word.
    Word,
    /// Digit run.
    Num,
    /// Punctuation or any other symbol.
    Punct,
}

/// A single embedded token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Surface text as it appears in the input.
    pub text: String,
    /// Whether the token is a French function word.
    pub is_stop: bool,
    /// Coarse tag.
    pub pos: PartOfSpeech,
    /// Fixed-dimension vector; all zeros when the word is unknown.
    pub vector: Vec<f32>,
}

impl Token {
    /// Content tokens take part in sentence averaging.
    pub fn is_content(&self) -> bool {
        !self.is_stop && self.pos != PartOfSpeech::Punct
    }
}

/// An embedded text: its tokens and the document-level vector.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEmbedding {
    pub tokens: Vec<Token>,
    /// Mean of every token vector (stop words included).
    pub vector: Vec<f32>,
}

/// Supplier of token vectors and document similarity.
///
/// Implementations must be stateless after construction: one provider is
/// shared by every concurrent conversation.
pub trait EmbeddingProvider: Send + Sync {
    /// Dimension of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Tokenize and embed a text.
    fn embed_document(&self, text: &str) -> DocumentEmbedding;

    /// Cosine similarity in `[-1.0, 1.0]`.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine(a, b)
    }

    /// Similarity of the document vectors of two texts.
    fn similarity_of_texts(&self, a: &str, b: &str) -> f32 {
        let a = self.embed_document(a);
        let b = self.embed_document(b);
        self.similarity(&a.vector, &b.vector)
    }
}

/// Cosine similarity of two equal-length vectors.
///
/// Returns `0.0` when either vector has zero norm or the lengths differ.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&av, &bv) in a.iter().zip(b.iter()) {
        let (av, bv) = (av as f64, bv as f64);
        dot += av * bv;
        norm_a += av * av;
        norm_b += bv * bv;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0) as f32
}

/// Scale a vector to unit length. `None` when it is all zeros.
pub fn normalize(mut v: Vec<f32>) -> Option<Vec<f32>> {
    let norm = v.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    for x in &mut v {
        *x = (*x as f64 / norm) as f32;
    }
    Some(v)
}

/// Mean of a set of equal-length vectors. `None` for an empty set.
pub fn mean<'a>(vectors: impl IntoIterator<Item = &'a [f32]>) -> Option<Vec<f32>> {
    let mut acc: Option<Vec<f32>> = None;
    let mut count = 0usize;
    for v in vectors {
        let sum = acc.get_or_insert_with(|| vec![0.0; v.len()]);
        for (s, &x) in sum.iter_mut().zip(v.iter()) {
            *s += x;
        }
        count += 1;
    }
    let mut sum = acc?;
    for s in &mut sum {
        *s /= count as f32;
    }
    Some(sum)
}

/// Reduce a document to one unit vector by averaging its content tokens.
///
/// Returns `None` when there is no content token or the average is all zeros
/// (only unknown words, only stop words).
pub fn sentence_vector(doc: &DocumentEmbedding) -> Option<Vec<f32>> {
    let avg = mean(
        doc.tokens
            .iter()
            .filter(|t| t.is_content())
            .map(|t| t.vector.as_slice()),
    )?;
    normalize(avg)
}

/// Similarity of two embedded documents.
///
/// Compares the averaged content vectors; if either is degenerate, falls back
/// to the provider's whole-document similarity.
pub fn document_similarity(
    provider: &dyn EmbeddingProvider,
    a: &DocumentEmbedding,
    b: &DocumentEmbedding,
) -> f32 {
    match (sentence_vector(a), sentence_vector(b)) {
        (Some(va), Some(vb)) => cosine(&va, &vb),
        _ => provider.similarity(&a.vector, &b.vector),
    }
}

/// Similarity of two raw texts, see [`document_similarity`].
pub fn text_similarity(provider: &dyn EmbeddingProvider, a: &str, b: &str) -> f32 {
    let a = provider.embed_document(a);
    let b = provider.embed_document(b);
    document_similarity(provider, &a, &b)
}

/// Similarity of one token against an embedded label.
pub fn token_similarity(
    provider: &dyn EmbeddingProvider,
    token: &Token,
    label: &DocumentEmbedding,
) -> f32 {
    match sentence_vector(label) {
        Some(v) => cosine(&token.vector, &v),
        None => provider.similarity(&token.vector, &label.vector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::lexicon::LexiconEmbeddings;

    fn provider() -> LexiconEmbeddings {
        LexiconEmbeddings::from_entries(
            3,
            [
                ("voiture", vec![1.0, 0.0, 0.0]),
                ("auto", vec![0.9, 0.1, 0.0]),
                ("vélo", vec![0.0, 1.0, 0.0]),
                // Stop word, but still part of the document vector.
                ("tout", vec![0.0, 0.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn cosine_of_identical_and_orthogonal() {
        assert!((cosine(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_degenerate_inputs_are_zero() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn sentence_vector_skips_stop_words_and_punctuation() {
        let p = provider();
        let doc = p.embed_document("la voiture, tout !");
        let v = sentence_vector(&doc).unwrap();
        assert!((v[0] - 1.0).abs() < 1e-6);
        assert!(v[2].abs() < 1e-6);
    }

    #[test]
    fn sentence_vector_is_none_for_unknown_words() {
        let p = provider();
        assert!(sentence_vector(&p.embed_document("xyzzy plugh")).is_none());
        assert!(sentence_vector(&p.embed_document("")).is_none());
    }

    #[test]
    fn document_similarity_falls_back_to_whole_document() {
        let p = provider();
        // Only a stop word on each side: content averaging is degenerate,
        // the document vectors still compare.
        let s = text_similarity(&p, "tout", "tout");
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn related_words_are_similar() {
        let p = provider();
        assert!(text_similarity(&p, "ma voiture", "mon auto") > 0.9);
        assert!(text_similarity(&p, "ma voiture", "mon vélo") < 0.1);
    }

    #[test]
    fn token_similarity_against_label() {
        let p = provider();
        let doc = p.embed_document("auto");
        let label = p.embed_document("voiture");
        assert!(token_similarity(&p, &doc.tokens[0], &label) > 0.9);
    }
}
