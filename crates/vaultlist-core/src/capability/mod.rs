//! Narrow interfaces to the services list preparation depends on.
//!
//! Each concern is its own trait so a caller (or a test) can substitute one
//! without touching the others. They are bundled in [`Capabilities`] and
//! shared through `Arc`, which keeps the preparation futures `Send`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vaultlist_core::capability::Capabilities;
//!
//! let capabilities = Capabilities::new(
//!     Arc::new(my_decryption),
//!     Arc::new(my_policies),
//!     Arc::new(my_account),
//!     Arc::new(my_settings),
//! );
//! ```

mod error;

pub use error::{CapabilityError, VaultListError};

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::error;

use crate::model::{
    Collection, CollectionView, EncryptedItem, Folder, FolderView, ItemKind, ItemSummary, TotpCode,
};

/// Decrypts vault data and derives one-time codes.
#[async_trait]
pub trait VaultDecryption: Send + Sync {
    /// Decrypt a batch of items.
    ///
    /// A per-item failure is not an error: the item comes back with
    /// `decryption_failure` set. An `Err` means the whole batch failed.
    async fn decrypt_batch(
        &self,
        items: &[EncryptedItem],
    ) -> Result<Vec<ItemSummary>, CapabilityError>;

    /// Generate the code for `item`'s TOTP seed at time `at`.
    async fn generate_totp(
        &self,
        item: &ItemSummary,
        at: DateTime<Utc>,
    ) -> Result<TotpCode, CapabilityError>;

    async fn decrypt_folders(&self, folders: &[Folder]) -> Result<Vec<FolderView>, CapabilityError>;

    async fn decrypt_collections(
        &self,
        collections: &[Collection],
    ) -> Result<Vec<CollectionView>, CapabilityError>;
}

/// Organization policies that affect which items are listed.
#[async_trait]
pub trait PolicyProvider: Send + Sync {
    /// Organizations with an active restrict-item-types policy.
    async fn restricted_item_type_organizations(&self)
    -> Result<BTreeSet<String>, CapabilityError>;

    /// Whether `item` may be shown given the restricting organizations.
    fn passes_restrict_item_types_policy(
        &self,
        item: &ItemSummary,
        restricted_organizations: &BTreeSet<String>,
    ) -> bool {
        passes_restrict_item_types_policy(item, restricted_organizations)
    }
}

/// Restrict-item-types rule: cards are hidden when their owner restricts them.
///
/// A personal card is hidden as soon as any organization the user belongs to
/// restricts cards.
pub fn passes_restrict_item_types_policy(
    item: &ItemSummary,
    restricted_organizations: &BTreeSet<String>,
) -> bool {
    if restricted_organizations.is_empty() || item.kind() != ItemKind::Card {
        return true;
    }
    match item.organization_id.as_deref() {
        None => false,
        Some(org) => !restricted_organizations.contains(org),
    }
}

/// Entitlements of the active account.
#[async_trait]
pub trait AccountState: Send + Sync {
    async fn has_premium(&self) -> Result<bool, CapabilityError>;

    /// Whether the user has a master password (SSO users may not).
    async fn has_master_password(&self) -> Result<bool, CapabilityError>;
}

/// Source of equivalent-domain sets (regional variants of one site).
#[async_trait]
pub trait EquivalentDomainsProvider: Send + Sync {
    async fn fetch_equivalent_domains(&self) -> Result<Vec<BTreeSet<String>>, CapabilityError>;
}

/// Sink for recovered failures. Must not fail.
pub trait ErrorReporter: Send + Sync {
    fn log(&self, error: &VaultListError);
}

/// Reports errors through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn log(&self, err: &VaultListError) {
        let source = std::error::Error::source(err).map(ToString::to_string);
        error!(error = %err, source = ?source, "vault list error");
    }
}

/// Current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Every collaborator a preparation pass needs.
#[derive(Clone)]
pub struct Capabilities {
    pub decryption: Arc<dyn VaultDecryption>,
    pub policy: Arc<dyn PolicyProvider>,
    pub account: Arc<dyn AccountState>,
    pub equivalent_domains: Arc<dyn EquivalentDomainsProvider>,
    pub error_reporter: Arc<dyn ErrorReporter>,
    pub clock: Arc<dyn Clock>,
}

impl Capabilities {
    /// Bundle the given services with [`TracingErrorReporter`] and
    /// [`SystemClock`].
    pub fn new(
        decryption: Arc<dyn VaultDecryption>,
        policy: Arc<dyn PolicyProvider>,
        account: Arc<dyn AccountState>,
        equivalent_domains: Arc<dyn EquivalentDomainsProvider>,
    ) -> Self {
        Self {
            decryption,
            policy,
            account,
            equivalent_domains,
            error_reporter: Arc::new(TracingErrorReporter),
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_error_reporter(mut self, error_reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = error_reporter;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}
