//! Persistence key layout for the mission engine.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CURRENCY_KEY, DEFAULT_DAILY_RESET_KEY, DEFAULT_KEY_PREFIX, DEFAULT_UNLOCK_PREFIX,
    DEFAULT_WEEKLY_RESET_KEY,
};
use crate::error::ConfigError;

/// Key names used against the shared key-value store.
///
/// The store is shared with unrelated subsystems, so every key the engine touches
/// is configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default = "MissionConfig::default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "MissionConfig::default_daily_reset_key")]
    pub daily_reset_key: String,
    #[serde(default = "MissionConfig::default_weekly_reset_key")]
    pub weekly_reset_key: String,
    #[serde(default = "MissionConfig::default_currency_key")]
    pub currency_key: String,
    #[serde(default = "MissionConfig::default_unlock_prefix")]
    pub unlock_prefix: String,
}

impl MissionConfig {
    fn default_key_prefix() -> String {
        DEFAULT_KEY_PREFIX.to_string()
    }

    fn default_daily_reset_key() -> String {
        DEFAULT_DAILY_RESET_KEY.to_string()
    }

    fn default_weekly_reset_key() -> String {
        DEFAULT_WEEKLY_RESET_KEY.to_string()
    }

    fn default_currency_key() -> String {
        DEFAULT_CURRENCY_KEY.to_string()
    }

    fn default_unlock_prefix() -> String {
        DEFAULT_UNLOCK_PREFIX.to_string()
    }

    /// Parse a config from JSON, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the resulting config is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that every key is present, that the scalar keys do not collide and
    /// that no key falls inside the mission or unlock namespace.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("key_prefix", &self.key_prefix),
            ("daily_reset_key", &self.daily_reset_key),
            ("weekly_reset_key", &self.weekly_reset_key),
            ("currency_key", &self.currency_key),
            ("unlock_prefix", &self.unlock_prefix),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyKey { field });
            }
        }

        let scalars = [
            ("daily_reset_key", &self.daily_reset_key),
            ("weekly_reset_key", &self.weekly_reset_key),
            ("currency_key", &self.currency_key),
        ];
        for (i, &(first, a)) in scalars.iter().enumerate() {
            for &(second, b) in &scalars[i + 1..] {
                if a == b {
                    return Err(ConfigError::KeyCollision {
                        first,
                        second,
                        key: a.clone(),
                    });
                }
            }
        }

        // Mission records and unlock flags share one namespace with the scalars.
        let prefixes = [
            ("key_prefix", &self.key_prefix),
            ("unlock_prefix", &self.unlock_prefix),
        ];
        let [(mission_field, mission), (unlock_field, unlock)] = prefixes;
        if mission.starts_with(unlock.as_str()) || unlock.starts_with(mission.as_str()) {
            return Err(ConfigError::OverlappingKeys {
                field: mission_field,
                key: mission.clone(),
                prefix_field: unlock_field,
                prefix: unlock.clone(),
            });
        }
        for (field, key) in scalars {
            for (prefix_field, prefix) in prefixes {
                if key.starts_with(prefix.as_str()) {
                    return Err(ConfigError::OverlappingKeys {
                        field,
                        key: key.clone(),
                        prefix_field,
                        prefix: prefix.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Storage key for a mission record.
    #[must_use]
    pub fn mission_key(&self, mission_id: &str) -> String {
        format!("{}{mission_id}", self.key_prefix)
    }

    /// Storage key for an unlock flag.
    #[must_use]
    pub fn unlock_key(&self, item_id: &str) -> String {
        format!("{}{item_id}", self.unlock_prefix)
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            key_prefix: Self::default_key_prefix(),
            daily_reset_key: Self::default_daily_reset_key(),
            weekly_reset_key: Self::default_weekly_reset_key(),
            currency_key: Self::default_currency_key(),
            unlock_prefix: Self::default_unlock_prefix(),
        }
    }
}
