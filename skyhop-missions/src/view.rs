//! Read-side projections consumed by the mission screens.
use std::cmp::Reverse;

use crate::clock::Clock;
use crate::engine::MissionEngine;
use crate::progress::Mission;
use crate::registry::{MissionCategory, MissionTemplate};
use crate::storage::KeyValueStore;

/// Drop claimed missions and sort the rest for display: daily, weekly, then
/// permanent; claimable before in-progress; higher priority first. Equal keys keep
/// their input order.
#[must_use]
pub fn active_set<I>(missions: I) -> Vec<Mission>
where
    I: IntoIterator<Item = Mission>,
{
    let mut active: Vec<Mission> = missions
        .into_iter()
        .filter(|mission| !mission.is_claimed())
        .collect();
    active.sort_by_key(|mission| {
        (
            mission.category().rank(),
            !mission.is_completed(),
            Reverse(mission.template.priority),
        )
    });
    active
}

impl<S, C> MissionEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Every mission in catalog order, claimed ones included.
    #[must_use]
    pub fn all_missions(&self) -> Vec<Mission> {
        (0..self.progress.len())
            .map(|index| self.mission_at(index))
            .collect()
    }

    #[must_use]
    pub fn mission(&self, mission_id: &str) -> Option<Mission> {
        self.registry
            .position(mission_id)
            .map(|index| self.mission_at(index))
    }

    /// Unclaimed missions in display order. Recomputed on every call.
    #[must_use]
    pub fn active_missions(&self) -> Vec<Mission> {
        active_set(self.all_missions())
    }

    #[must_use]
    pub fn active_missions_by_category(&self, category: MissionCategory) -> Vec<Mission> {
        active_set(
            self.all_missions()
                .into_iter()
                .filter(|mission| mission.category() == category),
        )
    }

    #[must_use]
    pub fn templates_by_category(&self, category: MissionCategory) -> Vec<&MissionTemplate> {
        self.registry.templates_by_category(category)
    }

    /// Completed missions waiting to be claimed, for the menu badge.
    #[must_use]
    pub fn claimable_count(&self) -> usize {
        self.progress
            .iter()
            .filter(|progress| progress.is_claimable())
            .count()
    }
}
