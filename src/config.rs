use std::collections::HashSet;
use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::{ChallengeMode, GroupSelector};

const DEFAULT_CONFIG_PATH: &str = "config/pseudonym.toml";
const CONFIG_PATH_VAR: &str = "PSEUDONYM_CONFIG_PATH";

/// Settings for a pseudonym system deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Group every party works in, e.g. `"p256"` or `"schnorr:256"`.
    pub group: GroupSelector,
    /// Challenge delivery for standalone Schnorr proofs.
    pub challenge_mode: ChallengeMode,
    /// Length of issued session keys in bytes.
    pub session_key_bytes: usize,
    /// Organizations that hold issuer keys.
    pub organizations: Vec<String>,
    /// One-time keys accepted for pseudonym registration.
    pub registration_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group: GroupSelector::P256,
            challenge_mode: ChallengeMode::Sigma,
            session_key_bytes: 32,
            organizations: vec!["org1".to_string(), "org2".to_string()],
            registration_keys: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from defaults, a TOML file and the environment.
    ///
    /// The file is read from `PSEUDONYM_CONFIG_PATH`, falling back to
    /// `config/pseudonym.toml`; a missing file is not an error. Priority:
    /// environment variables (`PSEUDONYM_*`) > TOML file > defaults.
    #[allow(clippy::result_large_err)]
    pub fn load() -> figment::error::Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::figment(path).extract()
    }

    pub fn figment(path: impl Into<PathBuf>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.into()))
            .merge(Env::prefixed("PSEUDONYM_").ignore(&["CONFIG_PATH"]))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.organizations.is_empty() {
            return Err("at least one organization is required".to_string());
        }
        if self.session_key_bytes == 0 {
            return Err("session_key_bytes must be greater than 0".to_string());
        }

        let mut seen = HashSet::new();
        for organization in &self.organizations {
            if organization.trim().is_empty() {
                return Err("organization names must not be empty".to_string());
            }
            if !seen.insert(organization.as_str()) {
                return Err(format!("organization '{organization}' is listed twice"));
            }
        }
        Ok(())
    }
}
