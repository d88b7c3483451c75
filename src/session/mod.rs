//! Per-user questionnaire state.
//!
//! A [`Session`] walks the six [`Slot`]s in fixed order. Each inbound message
//! is handed to the extractor of the first unset slot; a miss leaves the slot
//! unset so the same question is asked again. Once every slot is filled the
//! next prompt is the footprint report.

pub mod store;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::emission::{CompleteAnswers, DietCategory, Footprint, HeatingMix};
use crate::extract::{Extractors, Slot, SlotValue};

/// Opaque user identifier supplied by the transport.
pub type UserId = String;

// ── Questions ───────────────────────────────────────────────────────────

/// One entry of the question table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionDefinition {
    pub slot: Slot,
    pub prompt: &'static str,
}

/// The question table, in asking order.
pub static QUESTIONS: [QuestionDefinition; 6] = [
    QuestionDefinition {
        slot: Slot::CarUsage,
        prompt: "Combien de kilomètres parcourez-vous en voiture par semaine ?",
    },
    QuestionDefinition {
        slot: Slot::FlatSurface,
        prompt: "Quelle est la surface en m² de votre habitat ?",
    },
    QuestionDefinition {
        slot: Slot::HeatingSources,
        prompt: "Quel type de chauffage utilisez-vous ? (fioul, électricité, bois...)",
    },
    QuestionDefinition {
        slot: Slot::ScreenTime,
        prompt: "Combien d'heures en moyenne passez-vous sur un écran chaque semaine ? \
                 (ordinateur, smartphone, télévision)",
    },
    QuestionDefinition {
        slot: Slot::Diet,
        prompt: "Quel est votre régime alimentaire ? (Végan, végétarien, mange de tout)",
    },
    QuestionDefinition {
        slot: Slot::ClothesCount,
        prompt: "Combien de vêtements neufs achetez-vous chaque mois ?",
    },
];

/// Question for `slot`.
pub fn question(slot: Slot) -> &'static QuestionDefinition {
    &QUESTIONS[slot.index()]
}

// ── Answers ─────────────────────────────────────────────────────────────

/// The six slot values; `None` means not answered yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
    pub car_usage: Option<u32>,
    pub flat_surface: Option<u32>,
    pub heating_sources: Option<HeatingMix>,
    pub screen_time: Option<u32>,
    pub diet: Option<DietCategory>,
    pub clothes_count: Option<u32>,
}

impl Answers {
    pub fn is_set(&self, slot: Slot) -> bool {
        match slot {
            Slot::CarUsage => self.car_usage.is_some(),
            Slot::FlatSurface => self.flat_surface.is_some(),
            Slot::HeatingSources => self.heating_sources.is_some(),
            Slot::ScreenTime => self.screen_time.is_some(),
            Slot::Diet => self.diet.is_some(),
            Slot::ClothesCount => self.clothes_count.is_some(),
        }
    }

    /// Store a value in the slot it is tagged with.
    pub fn set(&mut self, value: SlotValue) {
        match value {
            SlotValue::CarUsage(km) => self.car_usage = Some(km),
            SlotValue::FlatSurface(m2) => self.flat_surface = Some(m2),
            SlotValue::HeatingSources(mix) => self.heating_sources = Some(mix),
            SlotValue::ScreenTime(h) => self.screen_time = Some(h),
            SlotValue::Diet(diet) => self.diet = Some(diet),
            SlotValue::ClothesCount(n) => self.clothes_count = Some(n),
        }
    }

    /// First unset slot in asking order.
    pub fn first_unset(&self) -> Option<Slot> {
        Slot::ORDER.into_iter().find(|slot| !self.is_set(*slot))
    }

    /// All answers, if every slot is set.
    pub fn complete(&self) -> Option<CompleteAnswers> {
        Some(CompleteAnswers {
            car_km_per_week: self.car_usage?,
            flat_surface_m2: self.flat_surface?,
            heating: self.heating_sources.clone()?,
            screen_hours_per_week: self.screen_time?,
            diet: self.diet?,
            clothes_per_month: self.clothes_count?,
        })
    }
}

// ── Session ─────────────────────────────────────────────────────────────

/// Where a session stands. Derived from the answers, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    NotStarted,
    InProgress,
    Completed,
}

/// What the questionnaire does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ask(Slot),
    Done,
}

/// One user's questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    answers: Answers,
    started: bool,
    /// Unix seconds of the last inbound message.
    pub last_activity: u64,
}

impl Session {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            answers: Answers::default(),
            started: false,
            last_activity: now_secs(),
        }
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Clear every answer and (re)start the questionnaire.
    pub fn start(&mut self) {
        self.answers = Answers::default();
        self.started = true;
        tracing::info!(user = %self.user_id, "questionnaire started");
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.answers.first_unset().is_none() {
            Lifecycle::Completed
        } else if self.started {
            Lifecycle::InProgress
        } else {
            Lifecycle::NotStarted
        }
    }

    pub fn active_slot(&self) -> Option<Slot> {
        self.answers.first_unset()
    }

    pub fn step(&self) -> Step {
        self.active_slot().map_or(Step::Done, Step::Ask)
    }

    /// Prompt for the active slot, or the report once every slot is filled.
    pub fn next_prompt(&self) -> String {
        match self.step() {
            Step::Ask(slot) => question(slot).prompt.to_string(),
            Step::Done => match self.footprint() {
                Some(footprint) => footprint.report(),
                // Unreachable: `Done` implies every slot is set.
                None => QUESTIONS[0].prompt.to_string(),
            },
        }
    }

    /// Feed one message to the active slot's extractor.
    ///
    /// Does nothing unless the questionnaire is in progress. Blank messages
    /// are ignored. Returns the value stored, if any.
    pub fn submit(&mut self, text: &str, extractors: &Extractors) -> Option<SlotValue> {
        if self.lifecycle() != Lifecycle::InProgress || text.trim().is_empty() {
            return None;
        }
        let slot = self.active_slot()?;
        let value = extractors.extract(slot, text)?;
        self.answers.set(value.clone());
        if self.lifecycle() == Lifecycle::Completed {
            tracing::info!(user = %self.user_id, "questionnaire completed");
        }
        Some(value)
    }

    /// Annual footprint, once every slot is set.
    pub fn footprint(&self) -> Option<Footprint> {
        self.answers.complete().map(|a| Footprint::compute(&a))
    }

    pub fn touch(&mut self) {
        self.last_activity = now_secs();
    }

    /// Seconds since the last inbound message.
    pub fn idle_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_activity)
    }

    /// Serializable view for transports.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user_id: self.user_id.clone(),
            state: self.lifecycle(),
            active_slot: self.active_slot(),
            answers: self.answers.clone(),
            footprint: self.footprint(),
            last_activity: self.last_activity,
        }
    }
}

/// A session as exposed by the HTTP transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub user_id: UserId,
    pub state: Lifecycle,
    pub active_slot: Option<Slot>,
    pub answers: Answers,
    pub footprint: Option<Footprint>,
    pub last_activity: u64,
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
