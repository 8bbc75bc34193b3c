//! Skyhop Mission Engine
//!
//! Platform-agnostic mission and progress tracking for the Skyhop arcade game.
//! This crate owns the mission catalog, progress accumulation, daily/weekly resets
//! and exactly-once reward claiming. Rendering, the shop and the platform's save
//! system are reached only through the collaborator traits defined here.

pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod progress;
pub mod registry;
pub mod reporter;
pub mod rewards;
pub mod schedule;
pub mod storage;
pub mod store;
pub mod view;
pub mod wallet;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MissionConfig;
pub use engine::MissionEngine;
pub use error::{ConfigError, IntegrityIssue, MissionError, RegistryError};
pub use events::{EventBus, MissionEvent, Subscription, SubscriptionId};
pub use progress::{Mission, MissionProgress, MissionState};
pub use registry::{
    MissionCategory, MissionRegistry, MissionTemplate, ObjectiveType, ParseKindError, RewardSpec,
};
pub use reporter::increment_rule;
pub use rewards::{ClaimRejection, RewardApplier};
pub use schedule::{ResetOutcome, ResetScheduler};
pub use storage::{KeyValueStore, MemoryStore};
pub use store::MissionStore;
pub use view::active_set;
pub use wallet::{CurrencyLedger, MemoryWallet, StoredWallet, UnlockStore};
