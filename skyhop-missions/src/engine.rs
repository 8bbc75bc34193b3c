//! The mission service object.
//!
//! One `MissionEngine` is built at startup and handed by reference to gameplay and
//! UI code. It owns the catalog, the in-memory progress table, the store and the
//! event bus; the reporter, scheduler, reward and view operations live in their own
//! modules as further `impl` blocks on this type.

use crate::clock::{Clock, SystemClock};
use crate::config::MissionConfig;
use crate::error::ConfigError;
use crate::events::{EventBus, MissionEvent, Subscription};
use crate::progress::{Mission, MissionProgress};
use crate::registry::MissionRegistry;
use crate::rewards::RewardApplier;
use crate::schedule::ResetScheduler;
use crate::storage::KeyValueStore;
use crate::store::MissionStore;

/// Mission tracking service.
pub struct MissionEngine<S, C = SystemClock> {
    pub(crate) registry: MissionRegistry,
    pub(crate) store: MissionStore<S>,
    pub(crate) clock: C,
    pub(crate) scheduler: ResetScheduler,
    pub(crate) rewards: RewardApplier,
    pub(crate) events: EventBus,
    /// Indexed like `registry.templates()`.
    pub(crate) progress: Vec<MissionProgress>,
}

impl<S, C> std::fmt::Debug for MissionEngine<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissionEngine")
            .field("missions", &self.registry.len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<S, C> MissionEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Build the engine, restore every mission record and apply any due resets.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(
        config: MissionConfig,
        registry: MissionRegistry,
        storage: S,
        clock: C,
        rewards: RewardApplier,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, registry, storage, clock, rewards))
    }

    /// Build an engine over the built-in catalog with default key names.
    pub fn with_defaults(storage: S, clock: C, rewards: RewardApplier) -> Self {
        Self::assemble(
            MissionConfig::default(),
            MissionRegistry::builtin(),
            storage,
            clock,
            rewards,
        )
    }

    fn assemble(
        config: MissionConfig,
        registry: MissionRegistry,
        storage: S,
        clock: C,
        rewards: RewardApplier,
    ) -> Self {
        let scheduler = ResetScheduler::new(&config);
        let store = MissionStore::new(storage, config);
        let progress = registry
            .templates()
            .iter()
            .map(|template| store.load(template))
            .collect();

        let mut engine = Self {
            registry,
            store,
            clock,
            scheduler,
            rewards,
            events: EventBus::new(),
            progress,
        };
        let outcome = engine.run_resets();
        log::debug!(
            "mission engine ready: {} missions, {outcome:?}",
            engine.progress.len()
        );
        engine
    }

    #[must_use]
    pub const fn registry(&self) -> &MissionRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn store(&self) -> &MissionStore<S> {
        &self.store
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub const fn rewards(&self) -> &RewardApplier {
        &self.rewards
    }

    /// Channel carrying progress and completion notifications.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Shorthand for `events().subscribe(..)`.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&MissionEvent) + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Wipe every mission, permanent ones included. Used by the settings screen's
    /// "reset progress" action.
    pub fn reset_all_progress(&mut self) {
        let now = self.clock.now();
        for index in 0..self.progress.len() {
            let category = self.registry.templates()[index].category;
            self.progress[index].reset(ResetScheduler::next_reset_at(category, now));
            self.persist(index);
        }
        log::info!("reset progress for all {} missions", self.progress.len());
    }

    pub(crate) fn mission_at(&self, index: usize) -> Mission {
        Mission::new(&self.registry.templates()[index], &self.progress[index])
    }

    /// Write one record; failures are logged and the in-memory state stays
    /// authoritative.
    pub(crate) fn persist(&self, index: usize) {
        let id = &self.registry.templates()[index].id;
        if let Err(err) = self.store.save(id, &self.progress[index]) {
            log::warn!("failed to persist mission `{id}`: {err}");
        }
    }
}
