// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # carbonscore
//!
//! A French conversational assistant that estimates a person's yearly carbon
//! footprint by asking six questions, and answers ecology questions in
//! between.
//!
//! ## Architecture
//!
//! - **Embeddings** (`embedding`): tokenizer, stop words, word-vector table and
//!   cosine similarity behind the [`embedding::EmbeddingProvider`] trait
//! - **Slot extraction** (`extract`): regex extractors for quantities,
//!   similarity extractors for heating sources and diet
//! - **Questionnaire** (`session`): per-user state machine over the six slots,
//!   with a concurrent session store
//! - **Emissions** (`emission`): pure footprint formulas and the final report
//! - **FAQ** (`faq`) and **fallback** (`fallback`): answers outside the
//!   questionnaire
//! - **Assistant** (`assistant`): the two entry points a transport calls
//!
//! ## Library usage
//!
//! ```no_run
//! use carbonscore::assistant::Assistant;
//! use carbonscore::config::BotConfig;
//!
//! let assistant = Assistant::from_config(&BotConfig::default()).unwrap();
//! println!("{}", assistant.start_session("alice"));
//! println!("{}", assistant.handle_message("alice", "environ 120 km"));
//! ```

pub mod assistant;
pub mod config;
pub mod embedding;
pub mod emission;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod faq;
pub mod paths;
pub mod session;
