//! Error types for configuration loading.

use std::path::PathBuf;

/// Errors from reading, parsing or validating configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The TOML document is malformed or has unexpected keys.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Rendering the effective configuration failed.
    #[error("config render error: {0}")]
    Render(#[from] toml::ser::Error),
    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}
