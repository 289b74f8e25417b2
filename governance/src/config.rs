//! Engine configuration with TOML file support.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use umbra_utils::LogFormat;

/// Configuration for a [`GovernanceEngine`](crate::GovernanceEngine).
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default, so an
/// empty file is a valid configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Maximum proposal title length, in characters.
    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,

    /// Maximum proposal description length, in characters.
    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,

    /// Length of the reveal window when a proposal does not set its own
    /// reveal deadline.
    #[serde(default = "default_reveal_window_secs")]
    pub reveal_window_secs: u64,

    /// Move new proposals straight into the commit phase.
    #[serde(default = "default_true")]
    pub auto_activate: bool,

    /// The proposer must meet the proposal's own token requirement.
    #[serde(default = "default_true")]
    pub require_proposer_eligibility: bool,

    /// Reject proof-less reveals on zero-knowledge and threshold-reveal proposals.
    #[serde(default)]
    pub require_proofs_in_private_modes: bool,

    /// How often the deadline scheduler sweeps proposals.
    #[serde(default = "default_scheduler_interval_secs")]
    pub scheduler_interval_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_max_title_len() -> usize {
    120
}

fn default_max_description_len() -> usize {
    2000
}

fn default_reveal_window_secs() -> u64 {
    86_400
}

fn default_true() -> bool {
    true
}

fn default_scheduler_interval_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self = toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber with this config's format and
    /// level. `RUST_LOG` still wins when set.
    pub fn init_logging(&self) -> Result<(), GovernanceError> {
        umbra_utils::init_logging(self.log_format, &self.log_level).map_err(GovernanceError::Config)
    }

    fn validate(&self) -> Result<(), GovernanceError> {
        if self.max_title_len == 0 {
            return Err(GovernanceError::Config("max_title_len must be > 0".into()));
        }
        if self.reveal_window_secs == 0 {
            return Err(GovernanceError::Config("reveal_window_secs must be > 0".into()));
        }
        if self.scheduler_interval_secs == 0 {
            return Err(GovernanceError::Config(
                "scheduler_interval_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            max_title_len: default_max_title_len(),
            max_description_len: default_max_description_len(),
            reveal_window_secs: default_reveal_window_secs(),
            auto_activate: default_true(),
            require_proposer_eligibility: default_true(),
            require_proofs_in_private_modes: false,
            scheduler_interval_secs: default_scheduler_interval_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = GovernanceConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = GovernanceConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.reveal_window_secs, config.reveal_window_secs);
        assert_eq!(parsed.max_title_len, config.max_title_len);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = GovernanceConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.max_title_len, 120);
        assert_eq!(config.reveal_window_secs, 86_400);
        assert!(config.auto_activate);
        assert!(!config.require_proofs_in_private_modes);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            reveal_window_secs = 3600
            auto_activate = false
            log_format = "json"
        "#;
        let config = GovernanceConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.reveal_window_secs, 3600);
        assert!(!config.auto_activate);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn zero_reveal_window_is_rejected() {
        let err = GovernanceConfig::from_toml_str("reveal_window_secs = 0").unwrap_err();
        assert!(matches!(err, GovernanceError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_description_len = 500").unwrap();
        let config = GovernanceConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.max_description_len, 500);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = GovernanceConfig::from_toml_file("/nonexistent/umbra.toml").unwrap_err();
        assert!(matches!(err, GovernanceError::Config(_)));
    }
}
