//! Emission factors and the annual footprint calculation.
//!
//! Every function here is pure. Component functions work on single slot
//! values; [`Footprint::compute`] takes a [`CompleteAnswers`], which can only
//! be built once every slot is filled, so a total is never computed from a
//! partial questionnaire.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Grams of CO2 per kilometre driven.
pub const CAR_G_PER_KM: f64 = 55.0;
/// Heating intensity multiplier applied to `m² × coefficient`.
pub const HEATING_FACTOR: f64 = 100.0;
/// Grams of CO2 per hour of screen use.
pub const SCREEN_G_PER_HOUR: f64 = 40.0;
/// Grams of CO2 per new garment.
pub const CLOTHES_G_PER_ITEM: f64 = 15_000.0;

pub const WEEKS_PER_YEAR: f64 = 52.0;
pub const DAYS_PER_YEAR: f64 = 365.25;
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Average French footprint in kg CO2/year over the covered categories:
/// car 1972, energy 1696, clothing 763, technology 1180, meat/fish 1144,
/// milk/eggs 408.
pub const FRENCH_AVERAGE_KG: i64 = 1972 + 1696 + 763 + 1180 + 1144 + 408;

// ── Heating ─────────────────────────────────────────────────────────────

/// A home heating energy source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingSource {
    Fioul,
    Gaz,
    Electricite,
    Radiateur,
    Biomethane,
    Bois,
}

impl HeatingSource {
    /// Every source, in label-matching order.
    pub const ALL: [Self; 6] = [
        Self::Fioul,
        Self::Gaz,
        Self::Electricite,
        Self::Radiateur,
        Self::Biomethane,
        Self::Bois,
    ];

    /// French label the extractor compares words against.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fioul => "fioul",
            Self::Gaz => "gaz",
            Self::Electricite => "électricité",
            Self::Radiateur => "radiateur",
            Self::Biomethane => "biométhane",
            Self::Bois => "bois",
        }
    }

    /// Emission coefficient, g CO2 per kWh-equivalent.
    pub fn coefficient(self) -> u32 {
        match self {
            Self::Fioul => 264,
            Self::Gaz => 208,
            Self::Electricite | Self::Radiateur => 79,
            Self::Biomethane => 14,
            Self::Bois => 0,
        }
    }
}

impl std::fmt::Display for HeatingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-empty set of heating sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeSet<HeatingSource>", into = "BTreeSet<HeatingSource>")]
pub struct HeatingMix(BTreeSet<HeatingSource>);

impl HeatingMix {
    /// `None` for an empty set.
    pub fn new(sources: BTreeSet<HeatingSource>) -> Option<Self> {
        (!sources.is_empty()).then_some(Self(sources))
    }

    pub fn sources(&self) -> &BTreeSet<HeatingSource> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeSet<HeatingSource>> for HeatingMix {
    type Error = &'static str;

    fn try_from(sources: BTreeSet<HeatingSource>) -> Result<Self, Self::Error> {
        Self::new(sources).ok_or("heating mix must contain at least one source")
    }
}

impl From<HeatingMix> for BTreeSet<HeatingSource> {
    fn from(mix: HeatingMix) -> Self {
        mix.0
    }
}

impl std::fmt::Display for HeatingMix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(|s| s.label()).collect();
        f.write_str(&labels.join(", "))
    }
}

// ── Diet ────────────────────────────────────────────────────────────────

/// Eating habit category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietCategory {
    Normal,
    Vegetarian,
    Vegan,
}

impl DietCategory {
    /// Annual food footprint in kg CO2.
    pub fn annual_kg(self) -> u64 {
        match self {
            Self::Normal => 1144 + 408,
            Self::Vegetarian => 408,
            Self::Vegan => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Vegetarian => "végétarien",
            Self::Vegan => "végan",
        }
    }
}

impl std::fmt::Display for DietCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Component formulas ──────────────────────────────────────────────────

/// Car emission in g CO2 per week.
pub fn car_emission(km_per_week: u32) -> f64 {
    km_per_week as f64 * CAR_G_PER_KM
}

/// Heating emission in g CO2 per year. The surface is split evenly across
/// the sources.
pub fn heating_emission(mix: &HeatingMix, surface_m2: u32) -> u64 {
    let share = surface_m2 as f64 / mix.len() as f64;
    let total: f64 = mix
        .sources()
        .iter()
        .map(|s| share * HEATING_FACTOR * s.coefficient() as f64)
        .sum();
    total.round() as u64
}

/// Screen emission in g CO2 per day, from weekly hours.
pub fn screen_emission(hours_per_week: u32) -> f64 {
    hours_per_week as f64 / 7.0 * SCREEN_G_PER_HOUR
}

/// Food emission in g CO2 per year.
pub fn meal_emission(diet: DietCategory) -> u64 {
    diet.annual_kg() * 1000
}

/// Clothing emission in g CO2 per month.
pub fn clothes_emission(per_month: u32) -> f64 {
    per_month as f64 * CLOTHES_G_PER_ITEM
}

// ── Footprint ───────────────────────────────────────────────────────────

/// Every questionnaire answer, all present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteAnswers {
    pub car_km_per_week: u32,
    pub flat_surface_m2: u32,
    pub heating: HeatingMix,
    pub screen_hours_per_week: u32,
    pub diet: DietCategory,
    pub clothes_per_month: u32,
}

/// Annual footprint breakdown, in grams of CO2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Footprint {
    pub car_g: f64,
    pub heating_g: f64,
    pub screen_g: f64,
    pub meal_g: f64,
    pub clothes_g: f64,
    pub total_g: u64,
}

impl Footprint {
    pub fn compute(answers: &CompleteAnswers) -> Self {
        let car_g = car_emission(answers.car_km_per_week) * WEEKS_PER_YEAR;
        let heating_g = heating_emission(&answers.heating, answers.flat_surface_m2) as f64;
        let screen_g = screen_emission(answers.screen_hours_per_week) * DAYS_PER_YEAR;
        let meal_g = meal_emission(answers.diet) as f64;
        let clothes_g = clothes_emission(answers.clothes_per_month) * MONTHS_PER_YEAR;
        let total_g = (car_g + heating_g + screen_g + meal_g + clothes_g).round() as u64;
        Self {
            car_g,
            heating_g,
            screen_g,
            meal_g,
            clothes_g,
            total_g,
        }
    }

    /// Total in kg CO2/year, rounded.
    pub fn total_kg(&self) -> i64 {
        (self.total_g as f64 / 1000.0).round() as i64
    }

    /// Signed difference with [`FRENCH_AVERAGE_KG`].
    pub fn delta_kg(&self) -> i64 {
        self.total_kg() - FRENCH_AVERAGE_KG
    }

    /// The closing message of the questionnaire.
    pub fn report(&self) -> String {
        let delta = self.delta_kg();
        let direction = if delta > 0 { "de plus" } else { "de moins" };
        format!(
            "Votre empreinte carbone moyenne est de {}kg de CO2 par an, soit {}kg {} que la moyenne française.",
            self.total_kg(),
            delta.abs(),
            direction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mix(sources: &[HeatingSource]) -> HeatingMix {
        HeatingMix::new(sources.iter().copied().collect()).unwrap()
    }

    fn answers() -> CompleteAnswers {
        CompleteAnswers {
            car_km_per_week: 100,
            flat_surface_m2: 50,
            heating: mix(&[HeatingSource::Gaz]),
            screen_hours_per_week: 14,
            diet: DietCategory::Vegetarian,
            clothes_per_month: 2,
        }
    }

    #[test]
    fn coefficients_match_table() {
        let coeffs: Vec<u32> = HeatingSource::ALL.iter().map(|s| s.coefficient()).collect();
        assert_eq!(coeffs, [264, 208, 79, 79, 14, 0]);
    }

    #[test]
    fn empty_heating_mix_is_rejected() {
        assert!(HeatingMix::new(BTreeSet::new()).is_none());
    }

    #[test]
    fn heating_splits_surface_across_sources() {
        let m = mix(&[HeatingSource::Fioul, HeatingSource::Bois]);
        assert_eq!(heating_emission(&m, 100), 1_320_000);
        assert_eq!(heating_emission(&mix(&[HeatingSource::Gaz]), 50), 1_040_000);
    }

    #[test]
    fn heating_rounds_to_nearest_gram() {
        // 1 m² over 3 sources: 1/3 * 100 * (264 + 208 + 14) = 16200
        let m = mix(&[
            HeatingSource::Fioul,
            HeatingSource::Gaz,
            HeatingSource::Biomethane,
        ]);
        assert_eq!(heating_emission(&m, 1), 16_200);
    }

    #[test]
    fn screen_emission_is_daily_from_weekly_hours() {
        assert!((screen_emission(14) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn meal_table() {
        assert_eq!(meal_emission(DietCategory::Normal), 1_552_000);
        assert_eq!(meal_emission(DietCategory::Vegetarian), 408_000);
        assert_eq!(meal_emission(DietCategory::Vegan), 0);
    }

    #[test]
    fn total_sums_annualized_components() {
        let fp = Footprint::compute(&answers());
        // 286000 + 1040000 + 29220 + 408000 + 360000
        assert_eq!(fp.total_g, 2_123_220);
        assert_eq!(fp.total_kg(), 2123);
        assert_eq!(fp.delta_kg(), 2123 - 7163);
    }

    #[test]
    fn report_mentions_delta_direction() {
        let fp = Footprint::compute(&answers());
        assert_eq!(
            fp.report(),
            "Votre empreinte carbone moyenne est de 2123kg de CO2 par an, soit 5040kg de moins que la moyenne française."
        );

        let heavy = CompleteAnswers {
            car_km_per_week: 2000,
            diet: DietCategory::Normal,
            ..answers()
        };
        assert!(Footprint::compute(&heavy).report().contains("de plus"));
    }

    #[test]
    fn total_is_monotonic_in_each_quantity() {
        let base = answers();
        let total = |a: &CompleteAnswers| Footprint::compute(a).total_g;
        for step in [0u32, 1, 7, 50] {
            let bumped = [
                CompleteAnswers { car_km_per_week: base.car_km_per_week + step, ..base.clone() },
                CompleteAnswers { flat_surface_m2: base.flat_surface_m2 + step, ..base.clone() },
                CompleteAnswers {
                    screen_hours_per_week: base.screen_hours_per_week + step,
                    ..base.clone()
                },
                CompleteAnswers { clothes_per_month: base.clothes_per_month + step, ..base.clone() },
            ];
            for b in &bumped {
                assert!(total(b) >= total(&base));
            }
        }
    }

    #[test]
    fn french_average_baseline() {
        assert_eq!(FRENCH_AVERAGE_KG, 7163);
    }

    #[test]
    fn heating_mix_serde_rejects_empty() {
        let ok: HeatingMix = serde_json::from_str(r#"["gaz","bois"]"#).unwrap();
        assert_eq!(ok.len(), 2);
        assert!(serde_json::from_str::<HeatingMix>("[]").is_err());
    }
}
