//! Streaming preparation of list data.
//!
//! This module provides:
//! - [`BatchDecryptor`]: bounded-batch decryption with per-batch failure
//!   isolation
//! - [`CipherFilterChain`]: ownership, policy, lifecycle and group filters
//! - [`TotpResolver`]: lazy one-time codes with cached entitlement lookups
//! - [`PreparedDataAccumulator`]: the per-pass aggregate and its frozen
//!   [`PreparedData`] snapshot
//! - [`VaultListPreparator`]: the passes that tie them together
//!
//! # Example
//!
//! ```ignore
//! use vaultlist_core::prepare::VaultListPreparator;
//! use vaultlist_core::{PrepareConfig, VaultFilter, VaultScope};
//!
//! let preparator = VaultListPreparator::new(capabilities, PrepareConfig::default());
//! let filter = VaultFilter::new(VaultScope::All);
//! if let Some(data) = preparator.prepare_data(&ciphers, &collections, &folders, &filter).await {
//!     println!("{} items in trash", data.deleted_count);
//! }
//! ```

pub mod accumulator;
pub mod batch;
pub mod filter;
pub mod preparator;
pub mod totp;

pub use accumulator::{PreparedData, PreparedDataAccumulator};
pub use batch::BatchDecryptor;
pub use filter::{CipherFilterChain, FilterVerdict, ListMode, RejectReason, retain_encrypted_for_search};
pub use preparator::VaultListPreparator;
pub use totp::TotpResolver;
