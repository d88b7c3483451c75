//! Rich diagnostic error types for carbonscore.
//!
//! Extractors never fail: a missing signal is an unset slot, not an error.
//! Errors only arise while loading resources (configuration, word vectors,
//! the FAQ catalog) and when talking to the external fallback service.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum CarbonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fallback(#[from] FallbackError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] crate::paths::PathError),
}

// ---------------------------------------------------------------------------
// Embedding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EmbeddingError {
    #[error("failed to read word vectors from \"{path}\"")]
    #[diagnostic(
        code(carbonscore::embedding::io),
        help("Check that the embeddings file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed word vector on line {line}: {message}")]
    #[diagnostic(
        code(carbonscore::embedding::parse),
        help(
            "Each line must be a word followed by whitespace-separated floats \
             (fastText `.vec` text format). An optional `<count> <dim>` header \
             line is accepted."
        )
    )]
    Parse { line: usize, message: String },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    #[diagnostic(
        code(carbonscore::embedding::dim_mismatch),
        help("All vectors in one table must share the same dimension.")
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("word vector table is empty")]
    #[diagnostic(
        code(carbonscore::embedding::empty),
        help("Provide at least one word vector, or enable hashed out-of-vocabulary vectors.")
    )]
    Empty,
}

// ---------------------------------------------------------------------------
// FAQ catalog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("failed to read FAQ catalog from \"{path}\"")]
    #[diagnostic(
        code(carbonscore::catalog::io),
        help("Check the `faq_path` setting, or remove it to use the bundled catalog.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid FAQ catalog: {message}")]
    #[diagnostic(
        code(carbonscore::catalog::parse),
        help("The catalog is a TOML file made of `[[entry]]` tables with `question` and `answer` keys.")
    )]
    Parse { message: String },

    #[error("FAQ catalog contains no entries")]
    #[diagnostic(
        code(carbonscore::catalog::empty),
        help("Add at least one `[[entry]]` with a question and its answer.")
    )]
    Empty,

    #[error("FAQ entry {index} has an empty {field}")]
    #[diagnostic(
        code(carbonscore::catalog::blank_field),
        help("Every entry needs a non-blank question and answer.")
    )]
    BlankField { index: usize, field: &'static str },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read configuration from \"{path}\"")]
    #[diagnostic(
        code(carbonscore::config::io),
        help("Check that the file exists and is readable, or omit --config to use defaults.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(carbonscore::config::parse),
        help("The configuration file must be valid TOML; see README.md for the accepted keys.")
    )]
    Parse { message: String },

    #[error("threshold `{name}` must lie in [-1, 1], got {value}")]
    #[diagnostic(
        code(carbonscore::config::threshold),
        help("Similarity thresholds are cosine values.")
    )]
    ThresholdOutOfRange { name: &'static str, value: f32 },
}

// ---------------------------------------------------------------------------
// Fallback service errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FallbackError {
    #[error("no fallback service configured")]
    #[diagnostic(
        code(carbonscore::fallback::disabled),
        help("Set `fallback.app_id` in the configuration or the WOLFRAMALPHA_API_KEY variable.")
    )]
    Disabled,

    #[error("the answering service has no answer for this question")]
    #[diagnostic(code(carbonscore::fallback::no_answer))]
    NoAnswer,

    #[error("request to {url} failed: {message}")]
    #[diagnostic(
        code(carbonscore::fallback::request),
        help("Check network connectivity and the configured service URLs.")
    )]
    Request { url: String, message: String },

    #[error("unexpected response from {url}: {message}")]
    #[diagnostic(
        code(carbonscore::fallback::response),
        help("The service returned a payload that could not be read.")
    )]
    Response { url: String, message: String },
}

/// Convenience result type.
pub type CarbonResult<T> = std::result::Result<T, CarbonError>;
