//! Gameplay entry points that move mission progress forward.
use crate::clock::Clock;
use crate::engine::MissionEngine;
use crate::events::MissionEvent;
use crate::registry::ObjectiveType;
use crate::storage::KeyValueStore;

/// Progress after adding `amount`. Non-positive amounts change nothing.
const fn accumulate(current: i64, amount: i64) -> i64 {
    if amount <= 0 {
        current
    } else {
        current.saturating_add(amount)
    }
}

/// Progress after observing `value`: a running maximum.
const fn watermark(current: i64, value: i64) -> i64 {
    if value > current { value } else { current }
}

/// Update rule used by [`MissionEngine::report_increment`].
///
/// Score-like objectives keep their best value even through the increment entry
/// point; everything else counts.
#[must_use]
pub const fn increment_rule(objective: ObjectiveType, current: i64, amount: i64) -> i64 {
    if objective.is_watermark() {
        watermark(current, amount)
    } else {
        accumulate(current, amount)
    }
}

impl<S, C> MissionEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Report `amount` units of `objective` (games played, coins collected, ...).
    ///
    /// Watermark objectives (score, survival time, high score) treat `amount` as an
    /// observed value and only ever raise progress to it. Returns how many missions
    /// changed.
    pub fn report_increment(&mut self, objective: ObjectiveType, amount: i64) -> usize {
        self.apply_report(objective, |current| increment_rule(objective, current, amount))
    }

    /// `report_increment(objective, 1)`.
    pub fn report_one(&mut self, objective: ObjectiveType) -> usize {
        self.report_increment(objective, 1)
    }

    /// Report a fluctuating quantity such as the live score; only the high-water
    /// mark is recorded. Returns how many missions changed.
    pub fn report_value(&mut self, objective: ObjectiveType, value: i64) -> usize {
        self.apply_report(objective, |current| watermark(current, value))
    }

    fn apply_report<F>(&mut self, objective: ObjectiveType, rule: F) -> usize
    where
        F: Fn(i64) -> i64,
    {
        self.refresh_if_due();

        let mut changed = 0;
        for index in 0..self.progress.len() {
            let template = &self.registry.templates()[index];
            let progress = &mut self.progress[index];
            if template.objective != objective || !progress.is_active() {
                continue;
            }

            let next = rule(progress.current_progress).min(template.target);
            if next <= progress.current_progress {
                continue;
            }
            progress.current_progress = next;
            let completed = progress.refresh_completion(template.target);
            log::debug!(
                "mission `{}` progress {next}/{}{}",
                template.id,
                template.target,
                if completed { " (completed)" } else { "" }
            );

            changed += 1;
            self.persist(index);
            let mission = self.mission_at(index);
            if completed {
                self.events.emit(&MissionEvent::Completed(mission.clone()));
            }
            self.events.emit(&MissionEvent::Progress(mission));
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_objectives_accumulate() {
        assert_eq!(increment_rule(ObjectiveType::PlayGames, 3, 2), 5);
        assert_eq!(increment_rule(ObjectiveType::CollectCurrency, 3, 0), 3);
        assert_eq!(increment_rule(ObjectiveType::AvoidObstacles, 3, -4), 3);
        assert_eq!(increment_rule(ObjectiveType::UsePlanet, i64::MAX, 1), i64::MAX);
    }

    #[test]
    fn score_objectives_keep_the_best_value() {
        assert_eq!(increment_rule(ObjectiveType::ReachScore, 30, 20), 30);
        assert_eq!(increment_rule(ObjectiveType::ReachScore, 30, 45), 45);
        assert_eq!(increment_rule(ObjectiveType::SurviveTime, 10, 10), 10);
        assert_eq!(increment_rule(ObjectiveType::ReachHighScore, 0, 7), 7);
    }
}
