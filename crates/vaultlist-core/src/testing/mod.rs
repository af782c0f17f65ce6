//! Test doubles and fixtures for list preparation.
//!
//! This module provides:
//!
//! - **Doubles**: in-memory implementations of every capability trait, each
//!   reconfigurable after construction
//! - **Fixtures**: constructors for items, folders and collections
//!
//! # Usage
//!
//! ```ignore
//! use vaultlist_core::testing::{TestVault, encrypted_item, login_summary};
//!
//! #[tokio::test]
//! async fn test_trash_count() {
//!     let vault = TestVault::new();
//!     vault.decryption.fail_batch(1);
//!     let director = VaultListDirector::new(vault.capabilities(), PrepareConfig::default());
//!     // ...
//!     assert!(vault.errors.errors().is_empty());
//! }
//! ```

pub mod doubles;
pub mod fixtures;

pub use doubles::{
    FixedClock, InMemoryDecryption, RecordingErrorReporter, StaticAccount, StaticDomains,
    StaticPolicy, TOTP_PERIOD, TestVault,
};
pub use fixtures::{
    TEST_TOTP_SEED, card_summary, collection, corrupt_item, encrypted_item, folder,
    login_summary, login_with_uri, totp_login_summary,
};
