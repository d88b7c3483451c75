//! Bot configuration.
//!
//! Read from a TOML file, then overridden by a few environment variables.
//! Every key is optional; a missing file yields [`BotConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::CarbonPaths;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Similarity thresholds. Empirically tuned; a score must be strictly greater
/// than the threshold to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Whole-message similarity to "je ne prends pas la voiture".
    pub car_negation: f32,
    /// Word-to-label similarity for heating sources and diet labels.
    pub category: f32,
    /// Query-to-reference-question similarity in the FAQ matcher.
    pub faq: f32,
}

impl Thresholds {
    pub const CAR_NEGATION: f32 = 0.8;
    pub const CATEGORY: f32 = 0.55;
    pub const FAQ: f32 = 0.7;

    fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("car_negation", self.car_negation),
            ("category", self.category),
            ("faq", self.faq),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            car_negation: Self::CAR_NEGATION,
            category: Self::CATEGORY,
            faq: Self::FAQ,
        }
    }
}

/// External question-answering service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Wolfram|Alpha application id. `None` disables the fallback.
    pub app_id: Option<String>,
    /// Short answers endpoint.
    pub base_url: String,
    /// LibreTranslate-compatible server used to translate to and from English.
    pub translate_url: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            base_url: "https://api.wolframalpha.com/v1/result".into(),
            translate_url: None,
            timeout_secs: 10,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Word-vector file (fastText `.vec`).
    pub embeddings_path: Option<PathBuf>,
    /// Give unknown words deterministic hashed vectors.
    pub hashed_oov: bool,
    /// Vector dimension used when no word-vector file is configured.
    pub hashed_dimension: usize,
    /// FAQ catalog TOML. `None` uses the bundled catalog.
    pub faq_path: Option<PathBuf>,
    pub thresholds: Thresholds,
    pub fallback: FallbackConfig,
    /// Messages that (re)start the questionnaire, compared case-insensitively.
    pub start_keywords: Vec<String>,
    /// Sessions idle for longer than this are evicted.
    pub session_idle_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            embeddings_path: None,
            hashed_oov: true,
            hashed_dimension: 300,
            faq_path: None,
            thresholds: Thresholds::default(),
            fallback: FallbackConfig::default(),
            start_keywords: vec![
                "/start".into(),
                "commencer".into(),
                "bilan".into(),
                "bilan carbone".into(),
            ],
            session_idle_secs: 3600,
        }
    }
}

impl BotConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.thresholds.validate()?;
        Ok(config)
    }

    /// Read a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Resolve the configuration: explicit path, else the XDG config file if
    /// present, else defaults. Environment overrides are applied last.
    pub fn discover(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match CarbonPaths::resolve() {
                Ok(paths) if paths.config_file().is_file() => {
                    tracing::debug!(path = %paths.config_file().display(), "using XDG config");
                    Self::load(&paths.config_file())?
                }
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `WOLFRAMALPHA_API_KEY` and `CARBONSCORE_EMBEDDINGS` overrides.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("WOLFRAMALPHA_API_KEY").filter(|k| !k.is_empty()) {
            self.fallback.app_id = Some(key);
        }
        if let Some(path) = var("CARBONSCORE_EMBEDDINGS").filter(|p| !p.is_empty()) {
            self.embeddings_path = Some(PathBuf::from(path));
        }
    }

    /// Whether a message is a questionnaire start keyword.
    pub fn is_start_keyword(&self, text: &str) -> bool {
        let text = text.trim().to_lowercase();
        self.start_keywords
            .iter()
            .any(|k| k.trim().to_lowercase() == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_tuned_thresholds() {
        let config = BotConfig::default();
        assert_eq!(config.thresholds.car_negation, 0.8);
        assert_eq!(config.thresholds.category, 0.55);
        assert_eq!(config.thresholds.faq, 0.7);
        assert!(config.hashed_oov);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = BotConfig::from_toml(
            r#"
            session_idle_secs = 60

            [thresholds]
            faq = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.session_idle_secs, 60);
        assert_eq!(config.thresholds.faq, 0.5);
        assert_eq!(config.thresholds.category, 0.55);
        assert_eq!(config.fallback.timeout_secs, 10);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = BotConfig::from_toml("[thresholds]\ncategory = 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ThresholdOutOfRange { name: "category", .. }
        ));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        assert!(matches!(
            BotConfig::from_toml("hashed_oov = maybe"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides() {
        let mut config = BotConfig::default();
        config.apply_env(|key| match key {
            "WOLFRAMALPHA_API_KEY" => Some("XYZ".into()),
            "CARBONSCORE_EMBEDDINGS" => Some("/tmp/fr.vec".into()),
            _ => None,
        });
        assert_eq!(config.fallback.app_id.as_deref(), Some("XYZ"));
        assert_eq!(config.embeddings_path, Some(PathBuf::from("/tmp/fr.vec")));
    }

    #[test]
    fn start_keywords_are_case_insensitive() {
        let config = BotConfig::default();
        assert!(config.is_start_keyword("  Bilan Carbone "));
        assert!(config.is_start_keyword("/start"));
        assert!(!config.is_start_keyword("bonjour"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = BotConfig::load(Path::new("/nonexistent/carbonscore.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
