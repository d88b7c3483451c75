//! External question answering for messages the FAQ cannot handle.
//!
//! [`WolframClient`] calls the Wolfram|Alpha short answers API. That service
//! only understands English, so when a translation endpoint is configured the
//! question is translated from French first and the answer translated back.

use std::time::Duration;

use serde::Deserialize;

use crate::config::FallbackConfig;
use crate::error::FallbackError;

pub type FallbackResult<T> = std::result::Result<T, FallbackError>;

/// Reply sent when no answer could be obtained.
pub const NO_ANSWER: &str = "Je ne sais pas répondre à ce message";

/// Answers a French question with a French text.
pub trait FallbackAnswerer: Send + Sync {
    fn ask(&self, question: &str) -> FallbackResult<String>;
}

/// Wolfram|Alpha short answers client.
#[derive(Debug, Clone)]
pub struct WolframClient {
    app_id: Option<String>,
    base_url: String,
    translate_url: Option<String>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl WolframClient {
    pub fn new(config: &FallbackConfig) -> Self {
        Self {
            app_id: config.app_id.clone().filter(|id| !id.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            translate_url: config
                .translate_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Whether an application id is configured.
    pub fn is_enabled(&self) -> bool {
        self.app_id.is_some()
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new().timeout(self.timeout).build()
    }

    fn translate(&self, text: &str, source: &str, target: &str) -> FallbackResult<String> {
        let Some(base) = &self.translate_url else {
            return Ok(text.to_string());
        };
        let url = format!("{base}/translate");
        let body = serde_json::json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });
        let resp = self
            .agent()
            .post(&url)
            .send_json(body)
            .map_err(|e: ureq::Error| FallbackError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;
        let parsed: TranslateResponse = resp.into_json().map_err(|e| FallbackError::Response {
            url: url.clone(),
            message: e.to_string(),
        })?;
        Ok(parsed.translated_text)
    }

    fn short_answer(&self, app_id: &str, question: &str) -> FallbackResult<String> {
        let url = self.base_url.clone();
        let result = self
            .agent()
            .get(&url)
            .query("appid", app_id)
            .query("i", question)
            .call();
        match result {
            Ok(resp) => {
                let text = resp.into_string().map_err(|e| FallbackError::Response {
                    url: url.clone(),
                    message: e.to_string(),
                })?;
                let text = text.trim();
                if text.is_empty() {
                    return Err(FallbackError::NoAnswer);
                }
                Ok(text.to_string())
            }
            // 501: the input was not understood or has no short answer.
            Err(ureq::Error::Status(501, _)) => Err(FallbackError::NoAnswer),
            Err(ureq::Error::Status(code, _)) => Err(FallbackError::Request {
                url,
                message: format!("HTTP {code}"),
            }),
            Err(ureq::Error::Transport(t)) => Err(FallbackError::Request {
                url,
                message: t.to_string(),
            }),
        }
    }
}

impl FallbackAnswerer for WolframClient {
    fn ask(&self, question: &str) -> FallbackResult<String> {
        let app_id = self.app_id.as_deref().ok_or(FallbackError::Disabled)?;
        let english = self.translate(question, "fr", "en")?;
        tracing::debug!(question, english = %english, "asking Wolfram|Alpha");
        let answer = self.short_answer(app_id, &english)?;
        self.translate(&answer, "en", "fr")
    }
}
