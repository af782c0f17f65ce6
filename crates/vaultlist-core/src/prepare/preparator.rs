//! One streaming pass per list flavor.
//!
//! Every pass has the same shape: decrypt in batches, run each item through
//! the [`CipherFilterChain`], fold the survivors into a
//! [`PreparedDataAccumulator`], then freeze it. The passes differ in the list
//! mode and in which accumulator mutators they call.

use std::collections::BTreeSet;

use tracing::{debug, instrument, warn};

use super::accumulator::{PreparedData, PreparedDataAccumulator};
use super::batch::BatchDecryptor;
use super::filter::{CipherFilterChain, FilterVerdict, ListMode, RejectReason, retain_encrypted_for_search};
use crate::autofill::{AutofillMode, AutofillRanker, route_combined_multiple};
use crate::capability::{Capabilities, VaultListError};
use crate::config::PrepareConfig;
use crate::matching::{UriMatcher, matches_search_query};
use crate::model::{Collection, EncryptedItem, Folder, ItemSummary, VaultFilter, VaultListGroup};

/// Runs preparation passes against a set of capabilities.
#[derive(Debug, Clone)]
pub struct VaultListPreparator {
    capabilities: Capabilities,
    config: PrepareConfig,
}

impl VaultListPreparator {
    pub fn new(capabilities: Capabilities, config: PrepareConfig) -> Self {
        Self {
            capabilities,
            config,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Prepare the main vault list: counts per type, folder and collection,
    /// favorites, items without a folder, trash and archive counts.
    ///
    /// Returns `None` when there are no items.
    #[instrument(level = "debug", skip_all, fields(item_count = ciphers.len()))]
    pub async fn prepare_data(
        &self,
        ciphers: &[EncryptedItem],
        collections: &[Collection],
        folders: &[Folder],
        filter: &VaultFilter,
    ) -> Option<PreparedData> {
        if ciphers.is_empty() {
            return None;
        }

        let mut acc = PreparedDataAccumulator::new(&self.capabilities);
        acc.prepare_folders(folders, &filter.scope);
        acc.prepare_collections(collections, &filter.scope);
        let restricted = self.restricted_organizations(&mut acc).await;
        let chain = self.chain(filter, &restricted, ListMode::Main);

        let mut retained = 0usize;
        let mut batches = BatchDecryptor::new(&self.capabilities, ciphers, self.config.batch_size);
        while let Some(batch) = batches.next_batch().await {
            for item in batch {
                if record_decryption_failure(&chain, &mut acc, &item) {
                    continue;
                }
                match chain.evaluate(&item) {
                    FilterVerdict::Retain => {
                        retained += 1;
                        if filter.options.add_totp_group {
                            acc.increment_totp_count(&item).await;
                        }
                        acc.add_folder_item(&item);
                        acc.add_favorite_item(&item);
                        acc.add_no_folder_item(&item);
                        acc.increment_type_count(&item);
                        acc.increment_collection_count(&item);
                    }
                    FilterVerdict::Reject(RejectReason::Deleted) => acc.increment_deleted_count(),
                    FilterVerdict::Reject(RejectReason::Archived) => acc.increment_archived_count(),
                    FilterVerdict::Reject(_) => {}
                }
            }
        }

        let data = acc.build();
        debug!(
            retained,
            deleted = data.deleted_count,
            archived = data.archived_count,
            failures = data.cipher_decryption_failure_ids.len(),
            "Prepared main list data"
        );
        Some(data)
    }

    /// Prepare the contents of `filter.group`.
    ///
    /// Folder and collection counts are kept for every live item (not just
    /// group members) so nested subfolders and subcollections can show theirs.
    /// Returns `None` when there are no items or no group.
    #[instrument(level = "debug", skip_all, fields(item_count = ciphers.len(), group = ?filter.group))]
    pub async fn prepare_group_data(
        &self,
        ciphers: &[EncryptedItem],
        collections: &[Collection],
        folders: &[Folder],
        filter: &VaultFilter,
    ) -> Option<PreparedData> {
        let group = filter.group.as_ref()?;
        if ciphers.is_empty() {
            return None;
        }

        let mut acc = PreparedDataAccumulator::new(&self.capabilities);
        acc.prepare_folders(folders, &filter.scope);
        acc.prepare_collections(collections, &filter.scope);
        let restricted = self.restricted_organizations(&mut acc).await;
        let chain = self.chain(filter, &restricted, ListMode::Group(group.clone()));

        let mut batches = BatchDecryptor::new(&self.capabilities, ciphers, self.config.batch_size);
        while let Some(batch) = batches.next_batch().await {
            for item in batch {
                if record_decryption_failure(&chain, &mut acc, &item) {
                    continue;
                }
                let verdict = chain.evaluate(&item);
                if matches!(
                    verdict,
                    FilterVerdict::Retain | FilterVerdict::Reject(RejectReason::NotInGroup)
                ) {
                    count_towards_containers(&mut acc, group, &item);
                }
                if verdict.is_retained() {
                    acc.add_group_item(group, &item).await;
                }
            }
        }

        let data = acc.build();
        debug!(group_items = data.group_items.len(), "Prepared group data");
        Some(data)
    }

    /// Prepare search results for `filter.search_text`, optionally within
    /// `filter.group`.
    ///
    /// Deleted and out-of-group items are skipped before decryption.
    /// Returns `None` when there are no items or the search text is blank.
    #[instrument(level = "debug", skip_all, fields(item_count = ciphers.len(), group = ?filter.group))]
    pub async fn prepare_search_data(
        &self,
        ciphers: &[EncryptedItem],
        filter: &VaultFilter,
    ) -> Option<PreparedData> {
        let query = filter.trimmed_search_text()?;
        if ciphers.is_empty() {
            return None;
        }
        let group = filter.group.as_ref();

        let mut acc = PreparedDataAccumulator::new(&self.capabilities);
        let restricted = self.restricted_organizations(&mut acc).await;
        let chain = self.chain(filter, &restricted, ListMode::Search(group.cloned()));

        let mut batches = BatchDecryptor::new(&self.capabilities, ciphers, self.config.batch_size)
            .with_pre_filter(move |item| retain_encrypted_for_search(item, group));
        while let Some(batch) = batches.next_batch().await {
            for item in batch {
                if record_decryption_failure(&chain, &mut acc, &item) {
                    continue;
                }
                if chain.evaluate(&item).is_retained() {
                    let result = matches_search_query(&item, query);
                    acc.add_search_result_item(result, &item, group).await;
                }
            }
        }

        let data = acc.build();
        debug!(
            exact = data.exact_match_items.len(),
            fuzzy = data.fuzzy_match_items.len(),
            "Prepared search data"
        );
        Some(data)
    }

    /// Prepare search results laid out for the passkey and password autofill
    /// sections.
    ///
    /// Items are chosen by `filter.search_text` instead of a target URI, then
    /// routed as in [`AutofillMode::CombinedMultiple`]: passkeys only for ids
    /// in `platform_credential_ids`, passwords by search strength. With
    /// archiving on, archived items are left out even within the archive group.
    /// Returns `None` when there are no items or the search text is blank.
    #[instrument(level = "debug", skip_all, fields(item_count = ciphers.len(), group = ?filter.group))]
    pub async fn prepare_search_autofill_data(
        &self,
        ciphers: &[EncryptedItem],
        filter: &VaultFilter,
        platform_credential_ids: Option<&BTreeSet<String>>,
    ) -> Option<PreparedData> {
        let query = filter.trimmed_search_text()?;
        if ciphers.is_empty() {
            return None;
        }
        let group = filter.group.as_ref();

        let mut acc = PreparedDataAccumulator::new(&self.capabilities);
        let restricted = self.restricted_organizations(&mut acc).await;
        let chain = self.chain(filter, &restricted, ListMode::Search(group.cloned()));

        let mut batches = BatchDecryptor::new(&self.capabilities, ciphers, self.config.batch_size)
            .with_pre_filter(move |item| retain_encrypted_for_search(item, group));
        while let Some(batch) = batches.next_batch().await {
            for item in batch {
                if record_decryption_failure(&chain, &mut acc, &item) {
                    continue;
                }
                let archived = self.config.archive_items_enabled && item.is_archived();
                if archived || !chain.evaluate(&item).is_retained() {
                    continue;
                }
                let result = matches_search_query(&item, query);
                if result.is_match() {
                    route_combined_multiple(&mut acc, &item, result, platform_credential_ids);
                }
            }
        }

        let data = acc.build();
        debug!(
            exact = data.exact_match_items.len(),
            fuzzy = data.fuzzy_match_items.len(),
            platform_credentials = data.platform_credential_items.len(),
            "Prepared autofill search data"
        );
        Some(data)
    }

    /// Prepare autofill candidates for `filter.uri`.
    ///
    /// Returns `None` when there are no items or no target URI.
    #[instrument(level = "debug", skip_all, fields(item_count = ciphers.len(), mode = ?mode))]
    pub async fn prepare_autofill_data(
        &self,
        ciphers: &[EncryptedItem],
        filter: &VaultFilter,
        mode: &AutofillMode,
    ) -> Option<PreparedData> {
        let uri = filter.uri.as_deref().filter(|uri| !uri.is_empty())?;
        if ciphers.is_empty() {
            return None;
        }

        let equivalent_domains = self.equivalent_domains().await;
        let matcher = UriMatcher::new(uri, &equivalent_domains, self.config.default_uri_match_type);
        let ranker = AutofillRanker::new(matcher, mode.clone());

        let mut acc = PreparedDataAccumulator::new(&self.capabilities);
        let restricted = self.restricted_organizations(&mut acc).await;
        let chain = self.chain(filter, &restricted, ListMode::Autofill);

        let mut batches = BatchDecryptor::new(&self.capabilities, ciphers, self.config.batch_size);
        while let Some(batch) = batches.next_batch().await {
            for item in batch {
                if record_decryption_failure(&chain, &mut acc, &item) {
                    continue;
                }
                if chain.evaluate(&item).is_retained() {
                    ranker.rank(&mut acc, &item);
                }
            }
        }

        let data = acc.build();
        debug!(
            exact = data.exact_match_items.len(),
            fuzzy = data.fuzzy_match_items.len(),
            platform_credentials = data.platform_credential_items.len(),
            "Prepared autofill data"
        );
        Some(data)
    }

    fn chain<'a>(
        &'a self,
        filter: &'a VaultFilter,
        restricted: &'a BTreeSet<String>,
        mode: ListMode,
    ) -> CipherFilterChain<'a> {
        CipherFilterChain::new(
            &filter.scope,
            self.capabilities.policy.as_ref(),
            restricted,
            mode,
            self.config.archive_items_enabled,
        )
    }

    /// Look up restricting organizations and record them on the accumulator.
    /// A failed lookup applies no restriction.
    async fn restricted_organizations(
        &self,
        acc: &mut PreparedDataAccumulator,
    ) -> BTreeSet<String> {
        let restricted = match self
            .capabilities
            .policy
            .restricted_item_type_organizations()
            .await
        {
            Ok(restricted) => restricted,
            Err(source) => {
                warn!(error = %source, "Restricted item types lookup failed");
                self.capabilities
                    .error_reporter
                    .log(&VaultListError::PolicyLookup(source));
                BTreeSet::new()
            }
        };
        acc.prepare_restricted_organizations(restricted.clone());
        restricted
    }

    async fn equivalent_domains(&self) -> Vec<BTreeSet<String>> {
        match self
            .capabilities
            .equivalent_domains
            .fetch_equivalent_domains()
            .await
        {
            Ok(sets) => sets,
            Err(source) => {
                warn!(error = %source, "Equivalent domains lookup failed");
                self.capabilities
                    .error_reporter
                    .log(&VaultListError::EquivalentDomainsLookup(source));
                Vec::new()
            }
        }
    }
}

/// Record an item that failed to decrypt, if its owner is in scope.
///
/// Returns `true` for failed items, which take no further part in the pass.
fn record_decryption_failure(
    chain: &CipherFilterChain<'_>,
    acc: &mut PreparedDataAccumulator,
    item: &ItemSummary,
) -> bool {
    if !item.decryption_failure {
        return false;
    }
    if chain.passes_ownership(item) {
        acc.add_decryption_failure(item);
    }
    true
}

fn count_towards_containers(
    acc: &mut PreparedDataAccumulator,
    group: &VaultListGroup,
    item: &ItemSummary,
) {
    match group {
        VaultListGroup::Folder { .. } => acc.add_folder_item(item),
        VaultListGroup::Collection { .. } => acc.increment_collection_count(item),
        _ => {}
    }
}
