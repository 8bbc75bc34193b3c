//! Currency and unlock collaborators that receive claimed rewards.
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use anyhow::Context;

use crate::config::MissionConfig;
use crate::storage::KeyValueStore;

/// Soft-currency balance owned by the shop subsystem.
pub trait CurrencyLedger {
    /// Credit `amount` coins.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance cannot be updated.
    fn add_currency(&self, amount: i64) -> anyhow::Result<()>;

    fn balance(&self) -> i64;
}

/// Boolean unlock flags keyed by item id.
pub trait UnlockStore {
    /// Mark `item_id` as unlocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be written.
    fn set_unlocked(&self, item_id: &str) -> anyhow::Result<()>;

    fn is_unlocked(&self, item_id: &str) -> bool;
}

#[derive(Debug, Default)]
struct WalletState {
    balance: i64,
    unlocked: BTreeSet<String>,
}

/// In-memory ledger and unlock set. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryWallet {
    state: Rc<RefCell<WalletState>>,
}

impl MemoryWallet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unlocked_items(&self) -> Vec<String> {
        self.state.borrow().unlocked.iter().cloned().collect()
    }
}

impl CurrencyLedger for MemoryWallet {
    fn add_currency(&self, amount: i64) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.balance = state
            .balance
            .checked_add(amount)
            .context("currency balance overflow")?;
        Ok(())
    }

    fn balance(&self) -> i64 {
        self.state.borrow().balance
    }
}

impl UnlockStore for MemoryWallet {
    fn set_unlocked(&self, item_id: &str) -> anyhow::Result<()> {
        self.state.borrow_mut().unlocked.insert(item_id.to_string());
        Ok(())
    }

    fn is_unlocked(&self, item_id: &str) -> bool {
        self.state.borrow().unlocked.contains(item_id)
    }
}

/// Ledger and unlock flags kept in the shared key-value store, next to the mission
/// records.
#[derive(Debug, Clone)]
pub struct StoredWallet<S> {
    storage: S,
    config: MissionConfig,
}

impl<S: KeyValueStore> StoredWallet<S> {
    pub fn new(storage: S, config: &MissionConfig) -> Self {
        Self {
            storage,
            config: config.clone(),
        }
    }
}

impl<S: KeyValueStore> CurrencyLedger for StoredWallet<S> {
    fn add_currency(&self, amount: i64) -> anyhow::Result<()> {
        let next = self
            .balance()
            .checked_add(amount)
            .context("currency balance overflow")?;
        self.storage
            .set(&self.config.currency_key, &next.to_string())
            .with_context(|| format!("writing `{}`", self.config.currency_key))
    }

    fn balance(&self) -> i64 {
        match self.storage.get(&self.config.currency_key) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("currency balance `{raw}` is not a number, reading as 0");
                0
            }),
            Ok(None) => 0,
            Err(err) => {
                log::warn!("failed to read currency balance: {err}");
                0
            }
        }
    }
}

impl<S: KeyValueStore> UnlockStore for StoredWallet<S> {
    fn set_unlocked(&self, item_id: &str) -> anyhow::Result<()> {
        let key = self.config.unlock_key(item_id);
        self.storage
            .set(&key, "1")
            .with_context(|| format!("writing `{key}`"))
    }

    fn is_unlocked(&self, item_id: &str) -> bool {
        matches!(
            self.storage.get(&self.config.unlock_key(item_id)),
            Ok(Some(flag)) if flag == "1"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn memory_wallet_tracks_balance_and_unlocks() {
        let wallet = MemoryWallet::new();
        let handle = wallet.clone();
        wallet.add_currency(100).unwrap();
        wallet.add_currency(25).unwrap();
        wallet.set_unlocked("planet_mars").unwrap();
        assert_eq!(handle.balance(), 125);
        assert!(handle.is_unlocked("planet_mars"));
        assert!(!handle.is_unlocked("planet_venus"));
        assert!(wallet.add_currency(i64::MAX).is_err());
        assert_eq!(handle.balance(), 125);
    }

    #[test]
    fn stored_wallet_writes_shared_keys() {
        let storage = MemoryStore::new();
        let wallet = StoredWallet::new(storage.clone(), &MissionConfig::default());
        wallet.add_currency(40).unwrap();
        wallet.add_currency(2).unwrap();
        wallet.set_unlocked("skin_comet").unwrap();

        assert_eq!(storage.get("currency.balance").unwrap().as_deref(), Some("42"));
        assert_eq!(storage.get("unlock.skin_comet").unwrap().as_deref(), Some("1"));
        assert_eq!(wallet.balance(), 42);
        assert!(wallet.is_unlocked("skin_comet"));
    }

    #[test]
    fn stored_wallet_reads_garbage_balance_as_zero() {
        let storage = MemoryStore::from_entries([("currency.balance", "lots")]);
        let wallet = StoredWallet::new(storage, &MissionConfig::default());
        assert_eq!(wallet.balance(), 0);
    }
}
