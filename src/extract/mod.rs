//! Slot extraction: free French text → typed questionnaire answers.
//!
//! One extractor per [`Slot`]. Quantities ([`quantity`]) are read with regular
//! expressions; categories ([`category`]) are matched word by word against a
//! fixed label vocabulary with embedding similarity. Extractors are total:
//! `None` means the text carried no usable signal and the question is asked
//! again.

pub mod category;
pub mod quantity;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::embedding::{DocumentEmbedding, EmbeddingProvider};
use crate::emission::{DietCategory, HeatingMix, HeatingSource};

use category::DietLabel;

/// One questionnaire slot, in asking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    CarUsage,
    FlatSurface,
    HeatingSources,
    ScreenTime,
    Diet,
    ClothesCount,
}

impl Slot {
    /// The fixed asking order.
    pub const ORDER: [Self; 6] = [
        Self::CarUsage,
        Self::FlatSurface,
        Self::HeatingSources,
        Self::ScreenTime,
        Self::Diet,
        Self::ClothesCount,
    ];

    /// Position in [`Slot::ORDER`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::CarUsage => "car_usage",
            Self::FlatSurface => "flat_surface",
            Self::HeatingSources => "heating_sources",
            Self::ScreenTime => "screen_time",
            Self::Diet => "diet",
            Self::ClothesCount => "clothes_count",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ORDER
            .into_iter()
            .find(|slot| slot.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ORDER.iter().map(|s| s.name()).collect();
                format!("unknown slot \"{s}\" (expected one of: {})", names.join(", "))
            })
    }
}

/// A typed answer for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slot", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    /// Kilometres driven per week, already multiplied by occupancy.
    CarUsage(u32),
    /// Home surface in m².
    FlatSurface(u32),
    HeatingSources(HeatingMix),
    /// Screen hours per week, at most 168.
    ScreenTime(u32),
    Diet(DietCategory),
    /// New garments bought per month.
    ClothesCount(u32),
}

impl SlotValue {
    pub fn slot(&self) -> Slot {
        match self {
            Self::CarUsage(_) => Slot::CarUsage,
            Self::FlatSurface(_) => Slot::FlatSurface,
            Self::HeatingSources(_) => Slot::HeatingSources,
            Self::ScreenTime(_) => Slot::ScreenTime,
            Self::Diet(_) => Slot::Diet,
            Self::ClothesCount(_) => Slot::ClothesCount,
        }
    }
}

impl std::fmt::Display for SlotValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CarUsage(km) => write!(f, "{km} km/semaine"),
            Self::FlatSurface(m2) => write!(f, "{m2} m²"),
            Self::HeatingSources(mix) => write!(f, "{mix}"),
            Self::ScreenTime(h) => write!(f, "{h} h/semaine"),
            Self::Diet(diet) => write!(f, "{diet}"),
            Self::ClothesCount(n) => write!(f, "{n} vêtements/mois"),
        }
    }
}

/// Reference phrase for "I don't use a car".
pub const CAR_NEGATION_PHRASE: &str = "je ne prends pas la voiture";

/// The extractor set, bound to one embedding provider.
///
/// Label embeddings are computed once here; the set is immutable afterwards
/// and can be shared between threads.
pub struct Extractors {
    provider: Arc<dyn EmbeddingProvider>,
    thresholds: Thresholds,
    car_negation: DocumentEmbedding,
    heating_labels: Vec<(HeatingSource, DocumentEmbedding)>,
    diet_labels: Vec<(DietLabel, DocumentEmbedding)>,
}

impl Extractors {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, thresholds: Thresholds) -> Self {
        let car_negation = provider.embed_document(CAR_NEGATION_PHRASE);
        let heating_labels = HeatingSource::ALL
            .into_iter()
            .map(|s| (s, provider.embed_document(s.label())))
            .collect();
        let diet_labels = DietLabel::ALL
            .into_iter()
            .map(|l| (l, provider.embed_document(l.label())))
            .collect();
        Self {
            provider,
            thresholds,
            car_negation,
            heating_labels,
            diet_labels,
        }
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Run the extractor bound to `slot`.
    pub fn extract(&self, slot: Slot, text: &str) -> Option<SlotValue> {
        let value = match slot {
            Slot::CarUsage => self.car_usage(text).map(SlotValue::CarUsage),
            Slot::FlatSurface => quantity::flat_surface(text).map(SlotValue::FlatSurface),
            Slot::HeatingSources => self.heating_sources(text).map(SlotValue::HeatingSources),
            Slot::ScreenTime => quantity::screen_time(text).map(SlotValue::ScreenTime),
            Slot::Diet => self.diet(text).map(SlotValue::Diet),
            Slot::ClothesCount => quantity::clothes_count(text).map(SlotValue::ClothesCount),
        };
        tracing::debug!(slot = %slot, text, value = ?value, "slot extraction");
        value
    }
}

impl std::fmt::Debug for Extractors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractors")
            .field("dimension", &self.provider.dimension())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::extractors;
    use super::*;
    use crate::emission::HeatingSource;

    #[test]
    fn order_matches_index() {
        for (i, slot) in Slot::ORDER.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn slot_parses_from_name() {
        assert_eq!("screen-time".parse::<Slot>().unwrap(), Slot::ScreenTime);
        assert_eq!("DIET".parse::<Slot>().unwrap(), Slot::Diet);
        assert!("weather".parse::<Slot>().is_err());
    }

    #[test]
    fn dispatch_tags_value_with_its_slot() {
        let ex = extractors();
        for slot in Slot::ORDER {
            if let Some(value) = ex.extract(slot, "42") {
                assert_eq!(value.slot(), slot);
            }
        }
    }

    #[test]
    fn dispatch_reaches_each_extractor() {
        let ex = extractors();
        assert_eq!(ex.extract(Slot::CarUsage, "30"), Some(SlotValue::CarUsage(30)));
        assert_eq!(ex.extract(Slot::FlatSurface, "45 m2"), Some(SlotValue::FlatSurface(45)));
        assert!(matches!(
            ex.extract(Slot::HeatingSources, "au gaz"),
            Some(SlotValue::HeatingSources(mix)) if mix.sources().contains(&HeatingSource::Gaz)
        ));
        assert_eq!(ex.extract(Slot::ScreenTime, "20h"), Some(SlotValue::ScreenTime(20)));
        assert_eq!(
            ex.extract(Slot::Diet, "végan"),
            Some(SlotValue::Diet(DietCategory::Vegan))
        );
        assert_eq!(ex.extract(Slot::ClothesCount, "3"), Some(SlotValue::ClothesCount(3)));
    }

    #[test]
    fn slot_value_serializes_tagged() {
        let json = serde_json::to_string(&SlotValue::ScreenTime(12)).unwrap();
        assert_eq!(json, r#"{"slot":"screen_time","value":12}"#);
    }
}
