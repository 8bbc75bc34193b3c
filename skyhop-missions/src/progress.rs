//! Mutable per-mission progress and the combined mission snapshot.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::registry::{MissionCategory, MissionTemplate};

/// Progress toward one mission. Persisted as
/// `{"currentProgress": i, "isCompleted": b, "isClaimed": b}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionProgress {
    pub current_progress: i64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_claimed: bool,
    /// Next boundary crossing for daily/weekly missions; recomputed from the clock.
    #[serde(skip)]
    pub next_reset_at: Option<NaiveDateTime>,
}

impl MissionProgress {
    /// Keep the cached completion flag in step with `current_progress`.
    ///
    /// Returns `true` when the mission just became complete.
    pub fn refresh_completion(&mut self, target: i64) -> bool {
        let was_completed = self.is_completed;
        self.is_completed = self.current_progress >= target;
        !was_completed && self.is_completed
    }

    /// Not completed and not claimed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_completed && !self.is_claimed
    }

    #[must_use]
    pub const fn is_claimable(&self) -> bool {
        self.is_completed && !self.is_claimed
    }

    /// Wipe progress for a new reset cycle.
    pub fn reset(&mut self, next_reset_at: Option<NaiveDateTime>) {
        self.current_progress = 0;
        self.is_completed = false;
        self.is_claimed = false;
        self.next_reset_at = next_reset_at;
    }

    #[must_use]
    pub const fn state(&self) -> MissionState {
        if self.is_claimed {
            MissionState::Claimed
        } else if self.is_completed {
            MissionState::Completed
        } else if self.current_progress > 0 {
            MissionState::InProgress
        } else {
            MissionState::NotStarted
        }
    }
}

/// Lifecycle position of a mission within its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionState {
    NotStarted,
    InProgress,
    Completed,
    Claimed,
}

/// Template plus progress, as handed to listeners and the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mission {
    pub template: MissionTemplate,
    pub progress: MissionProgress,
}

impl Mission {
    #[must_use]
    pub fn new(template: &MissionTemplate, progress: &MissionProgress) -> Self {
        Self {
            template: template.clone(),
            progress: progress.clone(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.template.id
    }

    #[must_use]
    pub const fn category(&self) -> MissionCategory {
        self.template.category
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.progress.is_completed
    }

    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.progress.is_claimed
    }

    /// Completed and waiting to be claimed.
    #[must_use]
    pub const fn is_claimable(&self) -> bool {
        self.progress.is_claimable()
    }

    /// Fraction of the target reached, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        let target = self.template.target.max(1) as f64;
        (self.progress.current_progress as f64 / target).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_camel_case_fields_and_skips_reset_time() {
        let progress = MissionProgress {
            current_progress: 3,
            is_completed: false,
            is_claimed: false,
            next_reset_at: chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        };
        let json = serde_json::to_string(&progress).unwrap();
        assert_eq!(
            json,
            r#"{"currentProgress":3,"isCompleted":false,"isClaimed":false}"#
        );
    }

    #[test]
    fn completion_transition_fires_once() {
        let mut progress = MissionProgress {
            current_progress: 5,
            ..MissionProgress::default()
        };
        assert!(progress.refresh_completion(5));
        assert!(!progress.refresh_completion(5));
        assert_eq!(progress.state(), MissionState::Completed);
    }

    #[test]
    fn fraction_is_clamped_to_unit_range() {
        let template = MissionTemplate::new(
            "play_4",
            "Play 4",
            "Play four games",
            crate::registry::ObjectiveType::PlayGames,
            4,
            crate::registry::RewardSpec::Currency { amount: 10 },
            MissionCategory::Total,
        );
        let at = |current_progress| {
            Mission::new(
                &template,
                &MissionProgress {
                    current_progress,
                    ..MissionProgress::default()
                },
            )
            .fraction()
        };
        assert!((at(1) - 0.25).abs() < f64::EPSILON);
        assert!((at(9) - 1.0).abs() < f64::EPSILON);
        assert!(at(-3).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_returns_to_not_started() {
        let mut progress = MissionProgress {
            current_progress: 9,
            is_completed: true,
            is_claimed: true,
            next_reset_at: None,
        };
        progress.reset(None);
        assert_eq!(progress.state(), MissionState::NotStarted);
        assert!(progress.is_active());
    }
}
