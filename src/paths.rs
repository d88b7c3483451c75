//! XDG-compliant path resolution for carbonscore.
//!
//! Only two locations matter: where the configuration file lives and where
//! user-supplied data (word vectors, a custom FAQ catalog) is looked up by
//! default.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(carbonscore::paths::no_home),
        help("Set the HOME environment variable or pass --config explicitly.")
    )]
    NoHome,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// XDG directories for carbonscore.
#[derive(Debug, Clone)]
pub struct CarbonPaths {
    /// `$XDG_CONFIG_HOME/carbonscore/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/carbonscore/`
    pub data_dir: PathBuf,
}

impl CarbonPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("carbonscore");

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join("carbonscore");

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Path to the global config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Default location of a word-vector table, used when the config names none.
    pub fn default_embeddings(&self) -> PathBuf {
        self.data_dir.join("vectors.vec")
    }
}
