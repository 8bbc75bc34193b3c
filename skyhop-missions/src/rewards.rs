//! Exactly-once reward claiming.
use thiserror::Error;

use crate::clock::Clock;
use crate::engine::MissionEngine;
use crate::registry::RewardSpec;
use crate::storage::KeyValueStore;
use crate::wallet::{CurrencyLedger, UnlockStore};

/// Why a claim was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimRejection {
    #[error("unknown mission `{0}`")]
    UnknownMission(String),
    #[error("mission `{0}` is not completed")]
    NotCompleted(String),
    #[error("mission `{0}` was already claimed")]
    AlreadyClaimed(String),
    #[error("reward for `{id}` could not be granted: {reason}")]
    GrantFailed { id: String, reason: String },
}

/// Routes rewards to the currency ledger or the unlock store.
pub struct RewardApplier {
    ledger: Box<dyn CurrencyLedger>,
    unlocks: Box<dyn UnlockStore>,
}

impl std::fmt::Debug for RewardApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardApplier")
            .field("balance", &self.ledger.balance())
            .finish_non_exhaustive()
    }
}

impl RewardApplier {
    pub fn new<L, U>(ledger: L, unlocks: U) -> Self
    where
        L: CurrencyLedger + 'static,
        U: UnlockStore + 'static,
    {
        Self {
            ledger: Box::new(ledger),
            unlocks: Box::new(unlocks),
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &dyn CurrencyLedger {
        self.ledger.as_ref()
    }

    #[must_use]
    pub fn unlocks(&self) -> &dyn UnlockStore {
        self.unlocks.as_ref()
    }

    /// Hand `reward` to the matching collaborator.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error if the grant could not be recorded.
    pub fn grant(&self, reward: &RewardSpec) -> anyhow::Result<()> {
        match reward {
            RewardSpec::Currency { amount } => self.ledger.add_currency(*amount),
            RewardSpec::UnlockItem { item_id } => self.unlocks.set_unlocked(item_id),
        }
    }
}

impl<S, C> MissionEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Claim a completed mission's reward. Returns `false`, with no side effects,
    /// when the mission is unknown, incomplete or already claimed.
    pub fn claim_reward(&mut self, mission_id: &str) -> bool {
        match self.try_claim_reward(mission_id) {
            Ok(_) => true,
            Err(rejection) => {
                log::debug!("claim refused: {rejection}");
                false
            }
        }
    }

    /// Like [`claim_reward`](Self::claim_reward) but reports why a claim failed.
    ///
    /// # Errors
    ///
    /// Returns a [`ClaimRejection`] when nothing was granted.
    pub fn try_claim_reward(&mut self, mission_id: &str) -> Result<RewardSpec, ClaimRejection> {
        self.refresh_if_due();

        let index = self
            .registry
            .position(mission_id)
            .ok_or_else(|| ClaimRejection::UnknownMission(mission_id.to_string()))?;
        let progress = &self.progress[index];
        if progress.is_claimed {
            return Err(ClaimRejection::AlreadyClaimed(mission_id.to_string()));
        }
        if !progress.is_completed {
            return Err(ClaimRejection::NotCompleted(mission_id.to_string()));
        }

        let reward = self.registry.templates()[index].reward.clone();
        self.rewards
            .grant(&reward)
            .map_err(|err| ClaimRejection::GrantFailed {
                id: mission_id.to_string(),
                reason: format!("{err:#}"),
            })?;

        self.progress[index].is_claimed = true;
        self.persist(index);
        log::info!("claimed `{mission_id}`: {}", reward.description());
        Ok(reward)
    }
}
