//! In-memory capability implementations.
//!
//! Every double uses interior mutability so a test can reconfigure it (fail
//! the next lookup, change an entitlement) after handing it to
//! [`Capabilities`] behind an `Arc`.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::capability::{
    AccountState, Capabilities, CapabilityError, Clock, EquivalentDomainsProvider, ErrorReporter,
    PolicyProvider, VaultDecryption, VaultListError,
};
use crate::model::{
    Collection, CollectionView, EncryptedItem, Folder, FolderView, ItemKind, ItemSummary,
    ItemType, LoginView, TotpCode,
};

/// TOTP period used by [`InMemoryDecryption`].
pub const TOTP_PERIOD: u32 = 30;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct DecryptionState {
    batch_sizes: Vec<usize>,
    failing_batches: BTreeSet<usize>,
    failing_totp: BTreeSet<String>,
    fail_trees: bool,
}

/// "Decrypts" items whose payload is the JSON of an [`ItemSummary`].
///
/// A payload that doesn't parse comes back as a per-item decryption failure.
#[derive(Debug, Default)]
pub struct InMemoryDecryption {
    state: Mutex<DecryptionState>,
}

impl InMemoryDecryption {
    /// Sizes of every batch requested so far, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        lock(&self.state).batch_sizes.clone()
    }

    /// Fail the `index`th batch call (0-based).
    pub fn fail_batch(&self, index: usize) {
        lock(&self.state).failing_batches.insert(index);
    }

    /// Fail code generation for the item with this id.
    pub fn fail_totp_for(&self, item_id: &str) {
        lock(&self.state).failing_totp.insert(item_id.to_string());
    }

    /// Fail folder and collection decryption.
    pub fn fail_trees(&self) {
        lock(&self.state).fail_trees = true;
    }
}

fn failed_summary(item: &EncryptedItem) -> ItemSummary {
    let item_type = match item.kind {
        ItemKind::Login => ItemType::Login(LoginView::default()),
        ItemKind::Card => ItemType::Card,
        ItemKind::Identity => ItemType::Identity,
        ItemKind::SecureNote => ItemType::SecureNote,
        ItemKind::SshKey => ItemType::SshKey,
    };
    let mut summary = ItemSummary::new("", "", item_type);
    summary.id.clone_from(&item.id);
    summary.organization_id.clone_from(&item.organization_id);
    summary.folder_id.clone_from(&item.folder_id);
    summary.collection_ids.clone_from(&item.collection_ids);
    summary.deleted_date = item.deleted_date;
    summary.archived_date = item.archived_date;
    summary.decryption_failure = true;
    summary
}

#[async_trait]
impl VaultDecryption for InMemoryDecryption {
    async fn decrypt_batch(
        &self,
        items: &[EncryptedItem],
    ) -> Result<Vec<ItemSummary>, CapabilityError> {
        let mut state = lock(&self.state);
        let index = state.batch_sizes.len();
        state.batch_sizes.push(items.len());
        if state.failing_batches.contains(&index) {
            return Err(CapabilityError::Decryption(format!("batch {index} rejected")));
        }

        Ok(items
            .iter()
            .map(|item| {
                serde_json::from_str::<ItemSummary>(&item.payload)
                    .unwrap_or_else(|_| failed_summary(item))
            })
            .collect())
    }

    async fn generate_totp(
        &self,
        item: &ItemSummary,
        at: DateTime<Utc>,
    ) -> Result<TotpCode, CapabilityError> {
        let id = item.id.as_deref().unwrap_or_default();
        if lock(&self.state).failing_totp.contains(id) {
            return Err(CapabilityError::Totp(format!("invalid seed for {id}")));
        }
        let step = at.timestamp() / i64::from(TOTP_PERIOD);
        Ok(TotpCode {
            code: format!("{:06}", step.rem_euclid(1_000_000)),
            generated_at: at,
            period: TOTP_PERIOD,
        })
    }

    async fn decrypt_folders(&self, folders: &[Folder]) -> Result<Vec<FolderView>, CapabilityError> {
        if lock(&self.state).fail_trees {
            return Err(CapabilityError::Decryption("folder names".into()));
        }
        Ok(folders
            .iter()
            .map(|folder| FolderView {
                id: folder.id.clone(),
                name: folder.name.clone(),
            })
            .collect())
    }

    async fn decrypt_collections(
        &self,
        collections: &[Collection],
    ) -> Result<Vec<CollectionView>, CapabilityError> {
        if lock(&self.state).fail_trees {
            return Err(CapabilityError::Decryption("collection names".into()));
        }
        Ok(collections
            .iter()
            .map(|collection| CollectionView {
                id: collection.id.clone(),
                name: collection.name.clone(),
                organization_id: collection.organization_id.clone(),
            })
            .collect())
    }
}

/// Account entitlements with lookup counting. Premium and master password
/// both default to `true`.
#[derive(Debug)]
pub struct StaticAccount {
    premium: AtomicBool,
    master_password: AtomicBool,
    fail: AtomicBool,
    premium_lookups: AtomicUsize,
}

impl Default for StaticAccount {
    fn default() -> Self {
        Self {
            premium: AtomicBool::new(true),
            master_password: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            premium_lookups: AtomicUsize::new(0),
        }
    }
}

impl StaticAccount {
    pub fn set_premium(&self, premium: bool) {
        self.premium.store(premium, Ordering::SeqCst);
    }

    pub fn set_master_password(&self, has_master_password: bool) {
        self.master_password.store(has_master_password, Ordering::SeqCst);
    }

    /// Make every later lookup fail.
    pub fn fail_lookups(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn premium_lookups(&self) -> usize {
        self.premium_lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CapabilityError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(CapabilityError::Lookup("account state unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AccountState for StaticAccount {
    async fn has_premium(&self) -> Result<bool, CapabilityError> {
        self.premium_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.premium.load(Ordering::SeqCst))
    }

    async fn has_master_password(&self) -> Result<bool, CapabilityError> {
        self.check()?;
        Ok(self.master_password.load(Ordering::SeqCst))
    }
}

/// Restrict-item-types policy with a fixed set of organizations.
#[derive(Debug, Default)]
pub struct StaticPolicy {
    restricted: Mutex<BTreeSet<String>>,
    fail: AtomicBool,
}

impl StaticPolicy {
    pub fn set_restricted<I, S>(&self, organization_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *lock(&self.restricted) = organization_ids.into_iter().map(Into::into).collect();
    }

    pub fn fail_lookups(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PolicyProvider for StaticPolicy {
    async fn restricted_item_type_organizations(
        &self,
    ) -> Result<BTreeSet<String>, CapabilityError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CapabilityError::Lookup("policies unavailable".into()));
        }
        Ok(lock(&self.restricted).clone())
    }
}

/// Equivalent-domain sets held in memory.
#[derive(Debug, Default)]
pub struct StaticDomains {
    sets: Mutex<Vec<BTreeSet<String>>>,
    fail: AtomicBool,
}

impl StaticDomains {
    pub fn add_equivalent_set(&self, domains: &[&str]) {
        let set = domains.iter().map(|d| (*d).to_string()).collect();
        lock(&self.sets).push(set);
    }

    pub fn fail_lookups(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EquivalentDomainsProvider for StaticDomains {
    async fn fetch_equivalent_domains(&self) -> Result<Vec<BTreeSet<String>>, CapabilityError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CapabilityError::Lookup("settings unavailable".into()));
        }
        Ok(lock(&self.sets).clone())
    }
}

/// Keeps every reported error for later assertions.
#[derive(Debug, Default)]
pub struct RecordingErrorReporter {
    errors: Mutex<Vec<VaultListError>>,
}

impl RecordingErrorReporter {
    pub fn errors(&self) -> Vec<VaultListError> {
        lock(&self.errors).clone()
    }
}

impl ErrorReporter for RecordingErrorReporter {
    fn log(&self, error: &VaultListError) {
        lock(&self.errors).push(error.clone());
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    /// 2024-01-01T00:00:00Z.
    fn default() -> Self {
        Self(Utc.timestamp_opt(1_704_067_200, 0).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A full set of doubles, shared with the [`Capabilities`] it hands out.
#[derive(Debug, Default, Clone)]
pub struct TestVault {
    pub decryption: Arc<InMemoryDecryption>,
    pub account: Arc<StaticAccount>,
    pub policy: Arc<StaticPolicy>,
    pub domains: Arc<StaticDomains>,
    pub errors: Arc<RecordingErrorReporter>,
    pub clock: FixedClock,
}

impl TestVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(
            self.decryption.clone(),
            self.policy.clone(),
            self.account.clone(),
            self.domains.clone(),
        )
        .with_error_reporter(self.errors.clone())
        .with_clock(Arc::new(self.clock))
    }
}
