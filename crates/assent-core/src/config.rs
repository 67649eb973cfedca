//! Engine configuration, loadable from TOML.

use std::path::Path;

use serde::Deserialize;

use assent_contracts::{AssentError, AssentResult};

/// Tunable parameters of the decision engine.
///
/// Defaults match the documented values; every field can be overridden from
/// a TOML document. Out-of-range values are rejected at load time, never at
/// decision time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum total score a candidate must reach to match at all.
    pub minimum_match_threshold: f64,
    /// Scores in `[minimum_match_threshold, reuse_threshold)` request
    /// explicit reconsent when `require_reconsent` is set.
    pub reuse_threshold: f64,
    /// Hard expiry cap, in hours, applied by the emergency override.
    pub emergency_cap_hours: i64,
    /// Largest consent tree accepted, in total provision nodes.
    pub max_provision_nodes: usize,
    /// Deepest consent tree accepted, in nesting levels.
    pub max_provision_depth: usize,
    /// Reject unsuffixed timestamps when parsing on behalf of hosts.
    pub strict_timestamp_parsing: bool,
    /// Emit `pending` for matches below the reuse threshold instead of
    /// proceeding. Off by default; hosts without a reconsent flow leave it
    /// off and never see `pending`.
    pub require_reconsent: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minimum_match_threshold: 0.7,
            reuse_threshold: 0.8,
            emergency_cap_hours: 24,
            max_provision_nodes: 256,
            max_provision_depth: 16,
            strict_timestamp_parsing: true,
            require_reconsent: false,
        }
    }
}

impl EngineConfig {
    /// Parse `s` as TOML and validate the resulting configuration.
    pub fn from_toml_str(s: &str) -> AssentResult<Self> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| AssentError::Config {
            reason: format!("failed to parse engine config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as engine configuration.
    pub fn from_file(path: &Path) -> AssentResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AssentError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check the documented ranges.
    pub fn validate(&self) -> AssentResult<()> {
        if !(0.0..=1.0).contains(&self.minimum_match_threshold) {
            return Err(AssentError::Config {
                reason: format!(
                    "minimum_match_threshold {} outside [0.0, 1.0]",
                    self.minimum_match_threshold
                ),
            });
        }
        if !(self.minimum_match_threshold..=1.0).contains(&self.reuse_threshold) {
            return Err(AssentError::Config {
                reason: format!(
                    "reuse_threshold {} outside [{}, 1.0]",
                    self.reuse_threshold, self.minimum_match_threshold
                ),
            });
        }
        if self.emergency_cap_hours < 1 {
            return Err(AssentError::Config {
                reason: format!("emergency_cap_hours {} must be >= 1", self.emergency_cap_hours),
            });
        }
        if self.max_provision_nodes == 0 || self.max_provision_depth == 0 {
            return Err(AssentError::Config {
                reason: "provision bounds must be positive".to_string(),
            });
        }
        Ok(())
    }
}
