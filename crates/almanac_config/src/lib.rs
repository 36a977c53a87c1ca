//! Configuration for the almanac engine.
//!
//! Every section has a default, so an empty TOML document is a valid
//! configuration. Values are checked once by [`AlmanacConfig::validate`]
//! before any fetch or sweep starts.

pub mod error;
pub mod retry;
pub mod sweep;

use std::path::Path;

use almanac_core::GeoLocation;
use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use retry::RetryPolicy;
pub use sweep::{
    AspectSettings, BodySelection, DetectorToggles, SweepSettings, VisibilitySettings,
};

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlmanacConfig {
    pub observer: GeoLocation,
    pub retry: RetryPolicy,
    pub sweep: SweepSettings,
    pub detectors: DetectorToggles,
    pub bodies: BodySelection,
    pub aspects: AspectSettings,
    pub visibility: VisibilitySettings,
}

impl AlmanacConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.observer.validate().map_err(ConfigError::Invalid)?;
        self.retry.validate().map_err(ConfigError::Invalid)?;
        sweep::validate_sweep(&self.sweep).map_err(ConfigError::Invalid)?;
        sweep::validate_aspects(&self.aspects).map_err(ConfigError::Invalid)?;
        sweep::validate_visibility(&self.visibility).map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let c = AlmanacConfig::from_toml_str("").unwrap();
        assert_eq!(c, AlmanacConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let c = AlmanacConfig::from_toml_str(
            r#"
            [retry]
            max_attempts = 2

            [detectors]
            patterns = true
            "#,
        )
        .unwrap();
        assert_eq!(c.retry.max_attempts, 2);
        assert_eq!(c.retry.initial_delay_ms, 1000);
        assert!(c.detectors.patterns);
        assert!(c.detectors.twilight);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(matches!(
            AlmanacConfig::from_toml_str("[retry]\nmax_tries = 3\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            AlmanacConfig::from_toml_str("[retry]\nmax_attempts = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AlmanacConfig::from_toml_str("[observer]\nlatitude_deg = 100.0\nlongitude_deg = 0.0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn typed_map_keys() {
        let c = AlmanacConfig::from_toml_str(
            r#"
            [aspects.orbs]
            trine = 3.0

            [visibility.thresholds_deg]
            Mercury = 12.0
            "#,
        )
        .unwrap();
        assert!((c.aspects.orb_for(almanac_core::AspectKind::Trine) - 3.0).abs() < 1e-12);
        assert!((c.visibility.threshold_for(almanac_core::Body::Mercury) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn render_roundtrip() {
        let c = AlmanacConfig::default();
        let text = c.to_toml_string().unwrap();
        let back = AlmanacConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("almanac.toml");
        std::fs::write(&path, "[sweep]\nmargin_minutes = 5\n").unwrap();
        let c = AlmanacConfig::load(&path).unwrap();
        assert_eq!(c.sweep.margin_minutes, 5);
    }

    #[test]
    fn load_missing_file() {
        let err = AlmanacConfig::load(Path::new("/nonexistent/almanac.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
