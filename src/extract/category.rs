//! Category slot extractors: heating sources and diet.
//!
//! Each word of the message is compared with a small label vocabulary. An
//! accent- and case-insensitive exact match wins outright; otherwise the most
//! similar label is kept if its similarity is strictly above the category
//! threshold.

use std::collections::{BTreeSet, HashSet};

use crate::embedding::tokenize::fold;
use crate::embedding::{DocumentEmbedding, PartOfSpeech, Token, token_similarity};
use crate::emission::{DietCategory, HeatingMix, HeatingSource};

use super::Extractors;

/// Words ignored by the heating extractor on top of stop words.
const HEATING_IGNORED: &[&str] = &["chauffe"];

/// Informal spellings of "végé".
const INFORMAL_VEGETARIAN: &[&str] = &["vege", "végé", "vége", "vegé"];

/// Diet vocabulary. `Normal` and `Everything` both mean an omnivorous diet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DietLabel {
    Vegetarian,
    Vegan,
    Normal,
    Everything,
}

impl DietLabel {
    pub const ALL: [Self; 4] = [Self::Vegetarian, Self::Vegan, Self::Normal, Self::Everything];

    pub fn label(self) -> &'static str {
        match self {
            Self::Vegetarian => "végétarien",
            Self::Vegan => "végan",
            Self::Normal => "normal",
            Self::Everything => "tout",
        }
    }
}

/// Best label for one token: exact folded match first, then highest
/// similarity above `threshold`. Ties keep the first label.
fn best_label<L: Copy>(
    ex: &Extractors,
    token: &Token,
    labels: &[(L, DocumentEmbedding)],
    label_text: impl Fn(L) -> &'static str,
    threshold: f32,
) -> Option<L> {
    let folded = fold(&token.text);
    if let Some((label, _)) = labels.iter().find(|(l, _)| fold(label_text(*l)) == folded) {
        return Some(*label);
    }
    let mut best: Option<L> = None;
    let mut best_score = threshold;
    for (label, embedding) in labels {
        let score = token_similarity(ex.provider(), token, embedding);
        if score > best_score {
            best = Some(*label);
            best_score = score;
        }
    }
    best
}

impl Extractors {
    /// Heating sources mentioned in the message. `None` when none is found.
    pub fn heating_sources(&self, text: &str) -> Option<HeatingMix> {
        let doc = self.provider().embed_document(text);
        let mut found = BTreeSet::new();
        for token in &doc.tokens {
            if token.is_stop
                || token.pos == PartOfSpeech::Punct
                || HEATING_IGNORED.contains(&token.text.to_lowercase().as_str())
            {
                continue;
            }
            if let Some(source) = best_label(
                self,
                token,
                &self.heating_labels,
                HeatingSource::label,
                self.thresholds.category,
            ) {
                tracing::trace!(word = %token.text, %source, "heating source matched");
                found.insert(source);
            }
        }
        HeatingMix::new(found)
    }

    /// Diet category.
    ///
    /// Any omnivorous signal ("normal", "tout") wins over vegetarian or vegan
    /// ones, and a message with no diet signal at all counts as omnivorous,
    /// so this extractor always yields a value.
    pub fn diet(&self, text: &str) -> Option<DietCategory> {
        let doc = self.provider().embed_document(text);
        let mut labels = HashSet::new();
        for token in &doc.tokens {
            if token.pos == PartOfSpeech::Punct {
                continue;
            }
            if INFORMAL_VEGETARIAN.contains(&token.text.to_lowercase().as_str()) {
                labels.insert(DietLabel::Vegetarian);
            }
            if let Some(label) = best_label(
                self,
                token,
                &self.diet_labels,
                DietLabel::label,
                self.thresholds.category,
            ) {
                labels.insert(label);
            }
        }
        Some(classify_diet(&labels))
    }
}

fn classify_diet(labels: &HashSet<DietLabel>) -> DietCategory {
    let omnivore = labels.contains(&DietLabel::Normal) || labels.contains(&DietLabel::Everything);
    let vegetarian = labels.contains(&DietLabel::Vegetarian);
    let vegan = labels.contains(&DietLabel::Vegan);
    if omnivore || (!vegetarian && !vegan) {
        DietCategory::Normal
    } else if vegetarian {
        DietCategory::Vegetarian
    } else {
        DietCategory::Vegan
    }
}
