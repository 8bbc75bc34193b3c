//! Daily and weekly reset boundaries.
//!
//! A daily boundary is local midnight. A weekly boundary is local midnight at the
//! start of an ISO week (Monday). The decision is a pure comparison between "now"
//! and the persisted date of the previous reset, so running the scheduler twice at
//! the same instant resets nothing the second time.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::clock::Clock;
use crate::config::MissionConfig;
use crate::constants::DAYS_PER_WEEK;
use crate::engine::MissionEngine;
use crate::registry::MissionCategory;
use crate::storage::KeyValueStore;

/// What a scheduler pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetOutcome {
    pub daily: bool,
    pub weekly: bool,
    pub missions_reset: usize,
}

impl ResetOutcome {
    #[must_use]
    pub const fn any(&self) -> bool {
        self.daily || self.weekly
    }

    const fn fired(&self, category: MissionCategory) -> bool {
        match category {
            MissionCategory::Daily => self.daily,
            MissionCategory::Weekly => self.weekly,
            MissionCategory::Total => false,
        }
    }
}

/// Boundary rules plus the keys of the two reset markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetScheduler {
    daily_key: String,
    weekly_key: String,
}

impl ResetScheduler {
    #[must_use]
    pub fn new(config: &MissionConfig) -> Self {
        Self {
            daily_key: config.daily_reset_key.clone(),
            weekly_key: config.weekly_reset_key.clone(),
        }
    }

    #[must_use]
    pub fn daily_key(&self) -> &str {
        &self.daily_key
    }

    #[must_use]
    pub fn weekly_key(&self) -> &str {
        &self.weekly_key
    }

    /// A missing marker means the reset never happened.
    #[must_use]
    pub fn daily_reset_due(last: Option<NaiveDate>, now: NaiveDateTime) -> bool {
        last.is_none_or(|last| now.date() > last)
    }

    /// Compares `(iso_year, iso_week)` so that week 1 of a new year is later than
    /// week 52 of the previous one.
    #[must_use]
    pub fn weekly_reset_due(last: Option<NaiveDate>, now: NaiveDateTime) -> bool {
        last.is_none_or(|last| week_key(now.date()) > week_key(last))
    }

    /// Next local midnight strictly after `now`.
    #[must_use]
    pub fn next_daily_reset(now: NaiveDateTime) -> NaiveDateTime {
        start_of(now.date() + Duration::days(1))
    }

    /// Next Monday midnight strictly after `now`.
    #[must_use]
    pub fn next_weekly_reset(now: NaiveDateTime) -> NaiveDateTime {
        let since_monday = i64::from(now.date().weekday().num_days_from_monday());
        start_of(now.date() + Duration::days(DAYS_PER_WEEK - since_monday))
    }

    /// Next boundary for `category`, or `None` for permanent missions.
    #[must_use]
    pub fn next_reset_at(category: MissionCategory, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match category {
            MissionCategory::Total => None,
            MissionCategory::Daily => Some(Self::next_daily_reset(now)),
            MissionCategory::Weekly => Some(Self::next_weekly_reset(now)),
        }
    }
}

fn week_key(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

impl<S, C> MissionEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Apply every due daily/weekly reset and refresh `next_reset_at` on all
    /// periodic missions.
    ///
    /// Completed but unclaimed missions in a reset category lose their reward.
    pub fn run_resets(&mut self) -> ResetOutcome {
        let now = self.clock.now();
        let last_daily = self.store.load_reset_date(self.scheduler.daily_key());
        let last_weekly = self.store.load_reset_date(self.scheduler.weekly_key());

        let mut outcome = ResetOutcome {
            daily: ResetScheduler::daily_reset_due(last_daily, now),
            weekly: ResetScheduler::weekly_reset_due(last_weekly, now),
            missions_reset: 0,
        };

        for index in 0..self.progress.len() {
            let category = self.registry.templates()[index].category;
            let next = ResetScheduler::next_reset_at(category, now);
            if outcome.fired(category) {
                if self.progress[index].is_claimable() {
                    log::info!(
                        "mission `{}` forfeited its unclaimed reward at the {category} reset",
                        self.registry.templates()[index].id
                    );
                }
                self.progress[index].reset(next);
                self.persist(index);
                outcome.missions_reset += 1;
            } else {
                self.progress[index].next_reset_at = next;
            }
        }

        let today = now.date();
        if outcome.daily {
            self.save_marker(self.scheduler.daily_key(), today);
        }
        if outcome.weekly {
            self.save_marker(self.scheduler.weekly_key(), today);
        }
        if outcome.any() {
            log::info!(
                "mission reset at {now}: daily={} weekly={} ({} missions)",
                outcome.daily,
                outcome.weekly,
                outcome.missions_reset
            );
        }
        outcome
    }

    /// Run the scheduler if any periodic mission has passed its boundary since the
    /// last pass. Keeps a long-running session from reporting into a stale cycle.
    pub(crate) fn refresh_if_due(&mut self) {
        let now = self.clock.now();
        let stale = self
            .progress
            .iter()
            .filter_map(|progress| progress.next_reset_at)
            .any(|boundary| boundary <= now);
        if stale {
            self.run_resets();
        }
    }

    /// Time left until `category` next resets; `None` for permanent missions.
    #[must_use]
    pub fn time_until_reset(&self, category: MissionCategory) -> Option<Duration> {
        let now = self.clock.now();
        ResetScheduler::next_reset_at(category, now).map(|boundary| boundary - now)
    }

    fn save_marker(&self, key: &str, date: NaiveDate) {
        if let Err(err) = self.store.save_reset_date(key, date) {
            log::warn!("failed to record reset marker `{key}`: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_due_only_after_calendar_day_changes() {
        let last = Some(day(2024, 5, 10));
        assert!(!ResetScheduler::daily_reset_due(last, at(2024, 5, 10, 23)));
        assert!(ResetScheduler::daily_reset_due(last, at(2024, 5, 11, 0)));
        assert!(ResetScheduler::daily_reset_due(None, at(2024, 5, 10, 1)));
        // Clock moved backwards: nothing to do.
        assert!(!ResetScheduler::daily_reset_due(last, at(2024, 5, 9, 12)));
    }

    #[test]
    fn weekly_due_on_monday_boundary() {
        // 2024-05-12 is a Sunday, 2024-05-13 a Monday.
        let last = Some(day(2024, 5, 6));
        assert!(!ResetScheduler::weekly_reset_due(last, at(2024, 5, 12, 23)));
        assert!(ResetScheduler::weekly_reset_due(last, at(2024, 5, 13, 0)));
    }

    #[test]
    fn weekly_due_across_year_wrap() {
        // ISO week 52 of 2024 ends on Sunday 2024-12-29; 2024-12-30 opens week 1 of 2025.
        let last = Some(day(2024, 12, 23));
        assert!(ResetScheduler::weekly_reset_due(last, at(2024, 12, 30, 8)));
        // 2021-01-03 still belongs to ISO week 53 of 2020.
        let last = Some(day(2020, 12, 28));
        assert!(!ResetScheduler::weekly_reset_due(last, at(2021, 1, 3, 8)));
        assert!(ResetScheduler::weekly_reset_due(last, at(2021, 1, 4, 8)));
    }

    #[test]
    fn next_boundaries_are_strictly_in_the_future() {
        let midnight = at(2024, 5, 13, 0);
        assert_eq!(ResetScheduler::next_daily_reset(midnight), at(2024, 5, 14, 0));
        // Monday midnight rolls to the following Monday.
        assert_eq!(ResetScheduler::next_weekly_reset(midnight), at(2024, 5, 20, 0));
        assert_eq!(
            ResetScheduler::next_weekly_reset(at(2024, 5, 19, 23)),
            at(2024, 5, 20, 0)
        );
        assert_eq!(
            ResetScheduler::next_reset_at(MissionCategory::Total, midnight),
            None
        );
    }
}
