//! Message routing.
//!
//! The [`Assistant`] is what a transport talks to. A user whose questionnaire
//! is running gets the next question (or the final report); anyone else gets
//! an FAQ answer, then the fallback service's answer, then a fixed apology.

use std::sync::Arc;

use crate::config::BotConfig;
use crate::embedding::EmbeddingProvider;
use crate::embedding::lexicon::LexiconEmbeddings;
use crate::error::{CarbonResult, FallbackError};
use crate::extract::Extractors;
use crate::faq::{FaqCatalog, SemanticMatcher};
use crate::fallback::{FallbackAnswerer, NO_ANSWER, WolframClient};
use crate::paths::CarbonPaths;
use crate::session::store::{MemorySessionStore, SessionStore, evict_idle_now, lock};
use crate::session::{Lifecycle, Session, SessionSnapshot};

/// First line sent when the questionnaire starts.
pub const WELCOME: &str =
    "Bonjour ! Je vais vous poser six questions pour estimer votre empreinte carbone annuelle.";

pub struct Assistant {
    config: BotConfig,
    store: Arc<dyn SessionStore>,
    extractors: Extractors,
    matcher: SemanticMatcher,
    fallback: Option<Box<dyn FallbackAnswerer>>,
}

impl Assistant {
    /// Assemble an assistant with an in-memory session store and no fallback.
    pub fn new(config: BotConfig, extractors: Extractors, matcher: SemanticMatcher) -> Self {
        Self {
            config,
            store: Arc::new(MemorySessionStore::new()),
            extractors,
            matcher,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn FallbackAnswerer>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    /// Load word vectors and the FAQ catalog as configured.
    pub fn from_config(config: &BotConfig) -> CarbonResult<Self> {
        let provider = load_provider(config)?;
        let extractors = Extractors::new(Arc::clone(&provider), config.thresholds);
        let catalog = FaqCatalog::load_or_bundled(config.faq_path.as_deref())?;
        let matcher = SemanticMatcher::new(provider, catalog, config.thresholds.faq);

        let mut assistant = Self::new(config.clone(), extractors, matcher);
        let client = WolframClient::new(&config.fallback);
        if client.is_enabled() {
            assistant = assistant.with_fallback(Box::new(client));
        } else {
            tracing::info!("no Wolfram|Alpha app id configured, fallback disabled");
        }
        Ok(assistant)
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn extractors(&self) -> &Extractors {
        &self.extractors
    }

    pub fn matcher(&self) -> &SemanticMatcher {
        &self.matcher
    }

    /// (Re)start the questionnaire for `user`. Returns the welcome line and
    /// the first question.
    pub fn start_session(&self, user: &str) -> String {
        let handle = self.store.get_or_create(user);
        let mut session = lock(&handle);
        session.touch();
        restart(&mut session)
    }

    /// Handle one inbound message and return the reply.
    pub fn handle_message(&self, user: &str, text: &str) -> String {
        let handle = self.store.get_or_create(user);
        let mut session = lock(&handle);
        session.touch();
        if self.config.is_start_keyword(text) {
            return restart(&mut session);
        }
        if session.lifecycle() == Lifecycle::InProgress {
            let slot = session.active_slot();
            let value = session.submit(text, &self.extractors);
            let reply = session.next_prompt();
            tracing::info!(
                user,
                slot = ?slot,
                accepted = value.is_some(),
                state = ?session.lifecycle(),
                "questionnaire turn"
            );
            return reply;
        }
        drop(session);

        self.answer(text)
    }

    /// Free question outside the questionnaire: FAQ first, then fallback.
    pub fn answer(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return NO_ANSWER.to_string();
        }
        if let Some(answer) = self.matcher.answer(text) {
            return answer.to_string();
        }
        let Some(fallback) = &self.fallback else {
            return NO_ANSWER.to_string();
        };
        match fallback.ask(text) {
            Ok(answer) => answer,
            Err(FallbackError::NoAnswer) => {
                tracing::debug!(question = text, "fallback has no answer");
                NO_ANSWER.to_string()
            }
            Err(e) => {
                tracing::warn!(question = text, error = %e, "fallback service failed");
                NO_ANSWER.to_string()
            }
        }
    }

    pub fn session_snapshot(&self, user: &str) -> Option<SessionSnapshot> {
        self.store.get(user).map(|h| lock(&h).snapshot())
    }

    /// Drop sessions idle for longer than `session_idle_secs`.
    pub fn evict_idle(&self) -> usize {
        evict_idle_now(self.store.as_ref(), self.config.session_idle_secs)
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("extractors", &self.extractors)
            .field("matcher", &self.matcher)
            .field("fallback", &self.fallback.is_some())
            .field("sessions", &self.store.len())
            .finish()
    }
}

fn restart(session: &mut Session) -> String {
    session.start();
    tracing::info!(user = %session.user_id, "questionnaire started");
    format!("{WELCOME}\n{}", session.next_prompt())
}

/// Configured vector file, else the XDG data file if present, else hashed
/// vectors only.
fn load_provider(config: &BotConfig) -> CarbonResult<Arc<dyn EmbeddingProvider>> {
    let path = config.embeddings_path.clone().or_else(|| {
        CarbonPaths::resolve()
            .ok()
            .map(|p| p.default_embeddings())
            .filter(|p| p.is_file())
    });
    let provider = match path {
        Some(path) => LexiconEmbeddings::load(&path)?.with_hashed_oov(config.hashed_oov),
        None => {
            tracing::warn!(
                dim = config.hashed_dimension,
                "no word vectors configured, similarity limited to exact words"
            );
            LexiconEmbeddings::hashed_only(config.hashed_dimension)
        }
    };
    Ok(Arc::new(provider))
}
