//! Thread-safe handle over a [`DropEngine`].
//!
//! Each operation holds the lock for its whole duration, so concurrent
//! callers observe the engine one operation at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use drop_primitives::Hash256;

use crate::config::DropConfig;
use crate::engine::DropEngine;
use crate::errors::{ConfigError, DropError};
use crate::types::{Amount, Authorization, IdRange, Phase, TokenId, WalletId};

#[derive(Clone, Debug)]
pub struct SharedDrop {
    inner: Arc<Mutex<DropEngine>>,
}

impl SharedDrop {
    pub fn new(config: DropConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_engine(DropEngine::new(config)?))
    }

    #[must_use]
    pub fn from_engine(engine: DropEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    // Engine mutators validate before writing, so a poisoned lock still
    // guards a consistent engine.
    fn lock(&self) -> MutexGuard<'_, DropEngine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn claim(
        &self,
        caller: WalletId,
        quantity: u64,
        authorization: &Authorization,
        payment: Amount,
    ) -> Result<IdRange, DropError> {
        self.lock().claim(caller, quantity, authorization, payment)
    }

    pub fn change_phase(&self, caller: &WalletId, phase: Phase) -> Result<(), DropError> {
        self.lock().change_phase(caller, phase)
    }

    pub fn reveal(&self, caller: &WalletId, base: impl Into<String>) -> Result<(), DropError> {
        self.lock().reveal(caller, base)
    }

    pub fn set_allowlist_root(&self, caller: &WalletId, root: Hash256) -> Result<(), DropError> {
        self.lock().set_allowlist_root(caller, root)
    }

    pub fn withdraw(&self, caller: &WalletId) -> Result<Amount, DropError> {
        self.lock().withdraw(caller)
    }

    pub fn transfer(&self, caller: &WalletId, to: WalletId, id: TokenId) -> Result<(), DropError> {
        self.lock().transfer(caller, to, id)
    }

    pub fn token_uri(&self, id: TokenId) -> Result<String, DropError> {
        self.lock().token_uri(id)
    }

    #[must_use]
    pub fn minted_count(&self) -> u64 {
        self.lock().minted_count()
    }

    #[must_use]
    pub fn caller_nonce(&self, wallet: &WalletId) -> u64 {
        self.lock().caller_nonce(wallet)
    }

    /// Run `f` against a consistent view of the engine.
    pub fn read<R>(&self, f: impl FnOnce(&DropEngine) -> R) -> R {
        f(&self.lock())
    }
}
