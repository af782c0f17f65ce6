//! Shared helpers for integration tests.

#![allow(dead_code)]

use vaultlist_core::testing::{TestVault, encrypted_item};
use vaultlist_core::{EncryptedItem, ItemSummary, PrepareConfig, VaultListDirector};

/// Route `tracing` output to the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn encrypt_all(items: &[ItemSummary]) -> Vec<EncryptedItem> {
    items.iter().map(encrypted_item).collect()
}

pub fn director(vault: &TestVault) -> VaultListDirector {
    VaultListDirector::new(vault.capabilities(), PrepareConfig::default())
}
