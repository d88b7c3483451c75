//! Numeric slot extractors: distances, surfaces, durations and counts.
//!
//! A message that is only a number is taken as-is. Otherwise the first (or
//! every, for surfaces and counts) number followed by the expected unit is
//! read. Thousands may be written with spaces (`1 151 m²`); decimals are
//! dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::embedding::document_similarity;
use crate::embedding::tokenize::is_numeric;

use super::Extractors;

// ── Regex patterns ──────────────────────────────────────────────────────

static RE_DISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d\s]*?)\s*(?:[,.]\d+\s*)?(?:km|kilom[eè]tres?)").unwrap()
});

static RE_PASSENGERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+(?:passagers?|personnes?)").unwrap());

static RE_OTHER_PASSENGERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+autres?(?:\s+(?:passagers?|personnes?))?").unwrap()
});

static RE_SURFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d\s]*?)\s*(?:[,.]\d+\s*)?(?:m|mètre|metre)").unwrap()
});

static RE_HOURS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s?h").unwrap());

static RE_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+)\b").unwrap());

/// Hours in a week; larger screen times are discarded.
pub const MAX_SCREEN_HOURS: u32 = 7 * 24;

/// Parse digits that may contain whitespace group separators.
fn parse_grouped(digits: &str) -> Option<u32> {
    let compact: String = digits.chars().filter(|c| !c.is_whitespace()).collect();
    compact.parse().ok()
}

fn parse_plain(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

impl Extractors {
    /// Weekly kilometres by car, multiplied by the number of travellers.
    ///
    /// A message close to "je ne prends pas la voiture" yields 0.
    pub fn car_usage(&self, text: &str) -> Option<u32> {
        if is_numeric(text) {
            return parse_plain(text);
        }

        let doc = self.provider().embed_document(text);
        let negation = document_similarity(self.provider(), &doc, &self.car_negation);
        if negation > self.thresholds.car_negation {
            tracing::debug!(negation, "car usage: no car");
            return Some(0);
        }

        let km = RE_DISTANCE
            .captures(text)
            .and_then(|c| parse_grouped(&c[1]))?;
        km.checked_mul(occupancy(text))
    }
}

/// Number of people sharing the car: "3 personnes" counts 3, "4 autres"
/// counts 5, otherwise 1.
fn occupancy(text: &str) -> u32 {
    if let Some(n) = RE_PASSENGERS
        .captures(text)
        .and_then(|c| parse_plain(&c[1]))
    {
        return n;
    }
    if let Some(n) = RE_OTHER_PASSENGERS
        .captures(text)
        .and_then(|c| parse_plain(&c[1]))
    {
        return n.saturating_add(1);
    }
    1
}

/// Home surface in m². Every `<n> m` mention is summed, so rooms may be
/// listed one by one.
pub fn flat_surface(text: &str) -> Option<u32> {
    if is_numeric(text) {
        return parse_plain(text);
    }
    let mut total: Option<u32> = None;
    for caps in RE_SURFACE.captures_iter(text) {
        let Some(area) = parse_grouped(&caps[1]) else {
            continue;
        };
        total = Some(total.unwrap_or(0).checked_add(area)?);
    }
    total
}

/// Weekly screen hours, rejected above [`MAX_SCREEN_HOURS`].
pub fn screen_time(text: &str) -> Option<u32> {
    let hours = if is_numeric(text) {
        parse_plain(text)
    } else {
        RE_HOURS.captures(text).and_then(|c| parse_plain(&c[1]))
    }?;
    if hours > MAX_SCREEN_HOURS {
        tracing::debug!(hours, "screen time: implausible value discarded");
        return None;
    }
    Some(hours)
}

/// Garments bought per month. Several numbers ("entre 8 et 15") are averaged
/// and rounded half up.
pub fn clothes_count(text: &str) -> Option<u32> {
    if is_numeric(text) {
        return parse_plain(text);
    }
    let values: Vec<u64> = RE_COUNT
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .collect();
    if values.is_empty() {
        return None;
    }
    let count = values.len() as u64;
    let sum: u64 = values.iter().fold(0u64, |acc, &v| acc.saturating_add(v));
    let rounded = (sum.saturating_mul(2).saturating_add(count)) / (2 * count);
    u32::try_from(rounded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::extractors;

    #[test]
    fn car_usage_numeric() {
        assert_eq!(extractors().car_usage("120"), Some(120));
    }

    #[test]
    fn car_usage_with_passengers() {
        let ex = extractors();
        assert_eq!(
            ex.car_usage("12km par semaine, on est avec 3 personnes"),
            Some(36)
        );
        assert_eq!(
            ex.car_usage("J'utilise la voiture 12km par semaine, on est avec 3 personnes"),
            Some(36)
        );
    }

    #[test]
    fn car_usage_with_other_passengers() {
        assert_eq!(
            extractors().car_usage("5km par semaine en moyenne, avec 4 autres collègues"),
            Some(25)
        );
    }

    #[test]
    fn car_usage_negation() {
        let ex = extractors();
        assert_eq!(ex.car_usage("je ne prends jamais ma voiture"), Some(0));
        assert_eq!(ex.car_usage("Je ne prends pas la voiture."), Some(0));
    }

    #[test]
    fn car_usage_units_and_grouping() {
        let ex = extractors();
        assert_eq!(ex.car_usage("environ 1 200 kilomètres"), Some(1200));
        assert_eq!(ex.car_usage("42,5 KM"), Some(42));
        assert_eq!(ex.car_usage("150 kilometre seul"), Some(150));
    }

    #[test]
    fn car_usage_without_distance_is_unset() {
        let ex = extractors();
        assert_eq!(ex.car_usage("ça dépend des semaines"), None);
        assert_eq!(ex.car_usage(""), None);
    }

    #[test]
    fn car_usage_overflow_is_unset() {
        assert_eq!(
            extractors().car_usage("4000000000 km avec 3 personnes"),
            None
        );
    }

    #[test]
    fn flat_surface_numeric_and_units() {
        assert_eq!(flat_surface("80"), Some(80));
        assert_eq!(flat_surface("un appartement de 45m²"), Some(45));
        assert_eq!(flat_surface("60 mètres carrés"), Some(60));
    }

    #[test]
    fn flat_surface_with_grouping_and_decimals() {
        assert_eq!(flat_surface("J'ai 1 151,7 m²"), Some(1151));
    }

    #[test]
    fn flat_surface_sums_rooms() {
        assert_eq!(
            flat_surface("une chambre de 12 m2, un salon de 30 m2 et une cuisine de 8.5m2"),
            Some(50)
        );
    }

    #[test]
    fn flat_surface_without_unit_is_unset() {
        assert_eq!(flat_surface("une maison"), None);
        assert_eq!(flat_surface("grande"), None);
    }

    #[test]
    fn screen_time_parsing() {
        assert_eq!(screen_time("35"), Some(35));
        assert_eq!(screen_time("environ 20h par semaine"), Some(20));
        assert_eq!(screen_time("10 heures"), Some(10));
        assert_eq!(screen_time("beaucoup"), None);
    }

    #[test]
    fn screen_time_rejects_more_than_a_week() {
        assert_eq!(screen_time("168"), Some(168));
        assert_eq!(screen_time("169"), None);
        assert_eq!(screen_time("200 h"), None);
    }

    #[test]
    fn clothes_count_average_of_range() {
        assert_eq!(clothes_count("Environ entre 15 et 8 vêtements"), Some(12));
        assert_eq!(clothes_count("entre 2 et 4"), Some(3));
    }

    #[test]
    fn clothes_count_single_and_numeric() {
        assert_eq!(clothes_count("2"), Some(2));
        assert_eq!(clothes_count("à peu près 3 vetements"), Some(3));
    }

    #[test]
    fn clothes_count_without_number_is_unset() {
        assert_eq!(clothes_count("Je suis pauvre"), None);
    }

    #[test]
    fn numbers_glued_to_words_are_not_counts() {
        assert_eq!(clothes_count("un t-shirt tous les 2mois"), None);
    }
}
