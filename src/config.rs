//! # Configuration
//!
//! Runtime settings for the vault: the application identifier that
//! domain-separates every derived key, and the cost of the password stretch.
//!
//! ```text
//! VaultConfig
//!   ├── app_id    "app.example"   (folded into the master-seed salt)
//!   └── stretch   StretchParams   (Argon2id cost)
//!         ├── iterations    time cost
//!         ├── memory_kib    memory cost in KiB
//!         └── parallelism   lanes
//! ```
//!
//! Environment overrides (see [`VaultConfig::from_env`]):
//!
//! | Variable | Field |
//! |----------|-------|
//! | `VAULT_APP_ID` | `app_id` |
//! | `VAULT_KDF_ITERATIONS` | `stretch.iterations` |
//! | `VAULT_KDF_MEMORY_KIB` | `stretch.memory_kib` |
//! | `VAULT_KDF_PARALLELISM` | `stretch.parallelism` |

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Application identifier used when none is configured
pub const DEFAULT_APP_ID: &str = "vault-core";

/// Argon2id cost parameters for the master-seed stretch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StretchParams {
    /// Number of passes over memory (time cost)
    pub iterations: u32,
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl StretchParams {
    /// Cheap parameters for tests and demos.
    ///
    /// Never use these for real credentials.
    pub const fn testing() -> Self {
        Self {
            iterations: 1,
            memory_kib: 64,
            parallelism: 1,
        }
    }

    /// Check the parameters against Argon2's limits
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be at least 1".into()));
        }
        if self.parallelism == 0 {
            return Err(Error::InvalidConfig("parallelism must be at least 1".into()));
        }
        if self.parallelism > argon2::Params::MAX_P_COST {
            return Err(Error::InvalidConfig(format!(
                "parallelism must be at most {}",
                argon2::Params::MAX_P_COST
            )));
        }
        let min_memory = self
            .parallelism
            .checked_mul(8)
            .ok_or_else(|| Error::InvalidConfig("parallelism out of range".into()))?;
        if self.memory_kib < min_memory {
            return Err(Error::InvalidConfig(format!(
                "memory_kib must be at least {} for {} lanes",
                min_memory, self.parallelism
            )));
        }
        Ok(())
    }
}

impl Default for StretchParams {
    /// 19 MiB, 2 passes, 1 lane (OWASP Argon2id baseline)
    fn default() -> Self {
        Self {
            iterations: 2,
            memory_kib: 19 * 1024,
            parallelism: 1,
        }
    }
}

/// Configuration for the vault and identity manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Application-level domain separator; not a secret
    pub app_id: String,
    /// Password stretch cost
    #[serde(default)]
    pub stretch: StretchParams,
}

impl VaultConfig {
    /// Create a configuration for the given application id with default cost
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            stretch: StretchParams::default(),
        }
    }

    /// Replace the stretch parameters
    pub fn with_stretch(mut self, stretch: StretchParams) -> Self {
        self.stretch = stretch;
        self
    }

    /// Build from defaults plus `VAULT_*` environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(app_id) = std::env::var("VAULT_APP_ID") {
            config.app_id = app_id;
        }
        if let Some(v) = env_u32("VAULT_KDF_ITERATIONS")? {
            config.stretch.iterations = v;
        }
        if let Some(v) = env_u32("VAULT_KDF_MEMORY_KIB")? {
            config.stretch.memory_kib = v;
        }
        if let Some(v) = env_u32("VAULT_KDF_PARALLELISM")? {
            config.stretch.parallelism = v;
        }

        config.validate()?;
        tracing::debug!(app_id = %config.app_id, stretch = ?config.stretch, "Loaded vault config from environment");
        Ok(config)
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(Error::InvalidConfig("app_id must not be empty".into()));
        }
        self.stretch.validate()
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::new(DEFAULT_APP_ID)
    }
}

fn env_u32(name: &str) -> Result<Option<u32>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = VaultConfig::default();
        assert_eq!(config.app_id, DEFAULT_APP_ID);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_params_are_valid() {
        assert!(StretchParams::testing().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_app_id() {
        let config = VaultConfig::new("  ");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_too_little_memory() {
        let params = StretchParams {
            iterations: 1,
            memory_kib: 8,
            parallelism: 4,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_huge_parallelism() {
        let params = StretchParams {
            iterations: 1,
            memory_kib: 64,
            parallelism: u32::MAX,
        };
        assert!(matches!(params.validate(), Err(Error::InvalidConfig(_))));

        let params = StretchParams {
            parallelism: argon2::Params::MAX_P_COST + 1,
            ..params
        };
        assert!(matches!(params.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_config_json_defaults_stretch() {
        let config: VaultConfig = serde_json::from_str(r#"{"app_id":"app.x"}"#).unwrap();
        assert_eq!(config.app_id, "app.x");
        assert_eq!(config.stretch, StretchParams::default());
    }
}
