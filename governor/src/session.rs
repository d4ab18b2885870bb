//! Governance context: everything a session needs, passed explicitly.
//!
//! A context is created unsealed. [`GovernanceContext::initialize`] pins the
//! session time and seals it; that can happen once per context. Checkpoints
//! use the pinned time so two runs of the same session hash identically.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::machine::RuntimeFsm;
use crate::error::{CheckpointError, ContextError};
use crate::io::checkpoint::{CheckpointReceipt, checkpoint_state, load_checkpoint};
use crate::io::config::{GovernorConfig, load_config};
use crate::io::store::StateStore;

#[derive(Debug)]
pub struct GovernanceContext {
    config: GovernorConfig,
    store: StateStore,
    pinned_time: Option<String>,
}

impl GovernanceContext {
    pub fn new(config: GovernorConfig, store: StateStore) -> Self {
        Self {
            config,
            store,
            pinned_time: None,
        }
    }

    /// Load the config at `config_path` and open its store.
    pub fn from_config_path(config_path: &Path) -> Result<Self> {
        let config = load_config(config_path)
            .with_context(|| format!("load config {}", config_path.display()))?;
        let storage = config.storage_path(config_path);
        let store = StateStore::open(&storage)
            .with_context(|| format!("open state store {}", storage.display()))?;
        debug!(config = %config_path.display(), storage = %storage.display(), "context ready");
        Ok(Self::new(config, store))
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn is_sealed(&self) -> bool {
        self.pinned_time.is_some()
    }

    pub fn pinned_time(&self) -> Option<&str> {
        self.pinned_time.as_deref()
    }

    /// Pin the session time and seal the context. Fails if already sealed.
    pub fn initialize(&mut self, pinned_time: &str) -> Result<(), ContextError> {
        if let Some(existing) = &self.pinned_time {
            return Err(ContextError::AlreadyInitialized {
                pinned_time: existing.clone(),
            });
        }
        if pinned_time.trim().is_empty() {
            return Err(ContextError::EmptyPinnedTime);
        }
        info!(pinned_time, "governance context sealed");
        self.pinned_time = Some(pinned_time.to_string());
        Ok(())
    }

    /// Fresh machine configured from this context.
    pub fn start_session(&self) -> RuntimeFsm {
        RuntimeFsm::with_strict_mode(self.config.strict_mode)
    }

    /// Checkpoint `fsm` under `name` using the pinned time.
    pub fn checkpoint(&self, fsm: &RuntimeFsm, name: &str) -> Result<CheckpointReceipt> {
        let pinned = self.pinned_time.as_deref().ok_or(ContextError::NotInitialized)?;
        let receipt = checkpoint_state(fsm, &self.store, name, pinned)?;
        Ok(receipt)
    }

    /// Restore checkpoint `name`, verifying it against `receipt_hash`.
    pub fn resume(&self, name: &str, receipt_hash: &str) -> Result<RuntimeFsm, CheckpointError> {
        load_checkpoint(&self.store, name, receipt_hash, self.config.strict_mode)
    }
}
