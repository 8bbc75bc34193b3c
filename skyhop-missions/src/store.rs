//! Durable mission progress records.
use chrono::NaiveDate;

use crate::config::MissionConfig;
use crate::constants::RESET_DATE_FORMAT;
use crate::error::{IntegrityIssue, MissionError};
use crate::progress::MissionProgress;
use crate::registry::MissionTemplate;
use crate::storage::KeyValueStore;

/// Reads and writes mission records through a [`KeyValueStore`], repairing
/// anything that does not satisfy the progress invariants.
#[derive(Debug, Clone)]
pub struct MissionStore<S> {
    storage: S,
    config: MissionConfig,
}

impl<S: KeyValueStore> MissionStore<S> {
    pub const fn new(storage: S, config: MissionConfig) -> Self {
        Self { storage, config }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn config(&self) -> &MissionConfig {
        &self.config
    }

    /// Load the record for `template`, or zero defaults when it is absent, unreadable
    /// or corrupt. Never fails.
    #[must_use]
    pub fn load(&self, template: &MissionTemplate) -> MissionProgress {
        let key = self.config.mission_key(&template.id);
        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return MissionProgress::default(),
            Err(err) => {
                log::warn!("failed to read `{key}`, using defaults: {err}");
                return MissionProgress::default();
            }
        };

        match serde_json::from_str::<MissionProgress>(&raw) {
            Ok(progress) => repair(template, progress),
            Err(err) => {
                IntegrityIssue::PersistenceCorruption {
                    key,
                    detail: err.to_string(),
                }
                .report();
                MissionProgress::default()
            }
        }
    }

    /// Persist the record for `mission_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn save(&self, mission_id: &str, progress: &MissionProgress) -> Result<(), MissionError> {
        let key = self.config.mission_key(mission_id);
        let json = serde_json::to_string(progress).map_err(|source| MissionError::Encode {
            key: key.clone(),
            source,
        })?;
        self.storage
            .set(&key, &json)
            .map_err(|err| MissionError::storage(&key, err))
    }

    /// Read a `YYYY-MM-DD` reset marker. Missing, unreadable or malformed values
    /// all read as `None`.
    #[must_use]
    pub fn load_reset_date(&self, key: &str) -> Option<NaiveDate> {
        let raw = match self.storage.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                log::warn!("failed to read reset marker `{key}`: {err}");
                return None;
            }
        };
        match NaiveDate::parse_from_str(raw.trim(), RESET_DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                IntegrityIssue::MalformedResetDate {
                    key: key.to_string(),
                    value: raw,
                }
                .report();
                None
            }
        }
    }

    /// Write a reset marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    pub fn save_reset_date(&self, key: &str, date: NaiveDate) -> Result<(), MissionError> {
        let value = date.format(RESET_DATE_FORMAT).to_string();
        self.storage
            .set(key, &value)
            .map_err(|err| MissionError::storage(key, err))
    }
}

/// Bring a decoded record back inside the progress invariants.
fn repair(template: &MissionTemplate, mut progress: MissionProgress) -> MissionProgress {
    let stored = progress.current_progress;
    let clamped = stored.clamp(0, template.target);
    if clamped != stored {
        IntegrityIssue::OutOfRangeProgress {
            id: template.id.clone(),
            stored,
            target: template.target,
        }
        .report();
        progress.current_progress = clamped;
    }

    // A claim is never rolled back: the reward was already granted.
    if progress.is_claimed && progress.current_progress < template.target {
        IntegrityIssue::ClaimWithoutCompletion {
            id: template.id.clone(),
            stored: progress.current_progress,
            target: template.target,
        }
        .report();
        progress.current_progress = template.target;
    }

    progress.is_completed = progress.current_progress >= template.target;
    progress.next_reset_at = None;
    progress
}
