//! The mutable aggregate a preparation pass folds items into.
//!
//! Mutators are called item by item in whatever combination the pass needs;
//! [`PreparedDataAccumulator::build`] freezes the result into a
//! [`PreparedData`] snapshot for section assembly or autofill ranking.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::trace;

use super::totp::TotpResolver;
use crate::capability::Capabilities;
use crate::matching::MatchResult;
use crate::model::{
    Collection, Folder, GroupMembership, ItemKind, ItemSummary, ListItem, VaultListGroup,
    VaultScope,
};

/// Frozen aggregates of one preparation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedData {
    pub deleted_count: usize,
    pub archived_count: usize,
    pub count_per_type: BTreeMap<ItemKind, usize>,
    pub folders: Vec<Folder>,
    pub folder_counts: BTreeMap<String, usize>,
    pub collections: Vec<Collection>,
    pub collection_counts: BTreeMap<String, usize>,
    pub favorites: Vec<ListItem>,
    pub no_folder_items: Vec<ListItem>,
    pub group_items: Vec<ListItem>,
    pub totp_count: usize,
    pub cipher_decryption_failure_ids: Vec<String>,
    pub restricted_organization_ids: BTreeSet<String>,
    pub exact_match_items: Vec<ListItem>,
    pub fuzzy_match_items: Vec<ListItem>,
    /// Logins offered through their platform credential (passkey).
    pub platform_credential_items: Vec<ListItem>,
}

impl PreparedData {
    /// Count for one item kind, 0 when none were seen.
    pub fn type_count(&self, kind: ItemKind) -> usize {
        self.count_per_type.get(&kind).copied().unwrap_or(0)
    }

    pub fn folder_count(&self, folder_id: &str) -> usize {
        self.folder_counts.get(folder_id).copied().unwrap_or(0)
    }

    pub fn collection_count(&self, collection_id: &str) -> usize {
        self.collection_counts.get(collection_id).copied().unwrap_or(0)
    }
}

/// Id-deduplicating list builder.
#[derive(Debug, Default)]
struct UniqueItems {
    items: Vec<ListItem>,
    seen: HashSet<String>,
}

impl UniqueItems {
    fn push(&mut self, item: ListItem) {
        if self.seen.insert(item.id.clone()) {
            self.items.push(item);
        }
    }
}

/// Builds a [`PreparedData`] one item at a time.
pub struct PreparedDataAccumulator {
    data: PreparedData,
    totp: TotpResolver,
    known_folders: HashMap<String, Folder>,
    folders_seeded: bool,
    favorites: UniqueItems,
    no_folder_items: UniqueItems,
    group_items: UniqueItems,
    exact_match_items: UniqueItems,
    fuzzy_match_items: UniqueItems,
    platform_credential_items: UniqueItems,
}

impl PreparedDataAccumulator {
    pub fn new(capabilities: &Capabilities) -> Self {
        Self {
            data: PreparedData::default(),
            totp: TotpResolver::new(capabilities),
            known_folders: HashMap::new(),
            folders_seeded: false,
            favorites: UniqueItems::default(),
            no_folder_items: UniqueItems::default(),
            group_items: UniqueItems::default(),
            exact_match_items: UniqueItems::default(),
            fuzzy_match_items: UniqueItems::default(),
            platform_credential_items: UniqueItems::default(),
        }
    }

    /// Register the input folders. With scope `All` every folder is listed up
    /// front; otherwise folders appear as items reference them.
    pub fn prepare_folders(&mut self, folders: &[Folder], scope: &VaultScope) {
        self.known_folders = folders
            .iter()
            .filter_map(|folder| Some((folder.id.clone()?, folder.clone())))
            .collect();
        self.folders_seeded = *scope == VaultScope::All;
        if self.folders_seeded {
            self.data.folders = folders.to_vec();
        }
    }

    /// Keep the collections visible in `scope`: all of them, one
    /// organization's, or none for personal items.
    pub fn prepare_collections(&mut self, collections: &[Collection], scope: &VaultScope) {
        self.data.collections = match scope {
            VaultScope::All => collections.to_vec(),
            VaultScope::Organization(org) => collections
                .iter()
                .filter(|collection| collection.organization_id == *org)
                .cloned()
                .collect(),
            VaultScope::Mine => Vec::new(),
        };
    }

    pub fn prepare_restricted_organizations(&mut self, organization_ids: BTreeSet<String>) {
        self.data.restricted_organization_ids = organization_ids;
    }

    pub fn add_decryption_failure(&mut self, item: &ItemSummary) {
        if item.decryption_failure
            && let Some(id) = &item.id
        {
            self.data.cipher_decryption_failure_ids.push(id.clone());
        }
    }

    pub fn add_favorite_item(&mut self, item: &ItemSummary) {
        if item.favorite
            && let Some(list_item) = ListItem::from_item(item.clone())
        {
            self.favorites.push(list_item);
        }
    }

    /// Count the item towards its folder. Folders missing from the input are
    /// ignored.
    pub fn add_folder_item(&mut self, item: &ItemSummary) {
        let Some(folder_id) = item.folder_id.as_deref() else {
            return;
        };
        let Some(folder) = self.known_folders.get(folder_id) else {
            trace!(folder_id, "Item references an unknown folder");
            return;
        };
        *self.data.folder_counts.entry(folder_id.to_owned()).or_default() += 1;
        if !self.folders_seeded
            && !self
                .data
                .folders
                .iter()
                .any(|f| f.id.as_deref() == Some(folder_id))
        {
            self.data.folders.push(folder.clone());
        }
    }

    pub fn add_no_folder_item(&mut self, item: &ItemSummary) {
        if item.folder_id.is_none()
            && let Some(list_item) = ListItem::from_item(item.clone())
        {
            self.no_folder_items.push(list_item);
        }
    }

    pub fn increment_type_count(&mut self, item: &ItemSummary) {
        *self.data.count_per_type.entry(item.kind()).or_default() += 1;
    }

    pub fn increment_deleted_count(&mut self) {
        self.data.deleted_count += 1;
    }

    pub fn increment_archived_count(&mut self) {
        self.data.archived_count += 1;
    }

    /// Count the item towards each prepared collection it belongs to.
    pub fn increment_collection_count(&mut self, item: &ItemSummary) {
        if item.collection_ids.is_empty() {
            return;
        }
        for collection in &self.data.collections {
            if let Some(id) = &collection.id
                && item.collection_ids.contains(id)
            {
                *self.data.collection_counts.entry(id.clone()).or_default() += 1;
            }
        }
    }

    pub async fn increment_totp_count(&mut self, item: &ItemSummary) {
        if self.totp.eligible_for_totp(item).await {
            self.data.totp_count += 1;
        }
    }

    /// Add the item to the group list if it belongs to `group`.
    ///
    /// Deleted items only go to the trash. TOTP group items carry a freshly
    /// generated code and are dropped if that fails.
    pub async fn add_group_item(&mut self, group: &VaultListGroup, item: &ItemSummary) {
        if item.is_deleted() {
            if *group == VaultListGroup::Trash
                && let Some(list_item) = ListItem::from_item(item.clone())
            {
                self.group_items.push(list_item);
            }
            return;
        }

        match group {
            VaultListGroup::Totp => {
                if self.totp.eligible_for_totp(item).await
                    && let Some(model) = self.totp.resolve(item).await
                {
                    self.group_items.push(ListItem::totp(model));
                }
            }
            VaultListGroup::Trash => {}
            _ => {
                if item.belongs_to_group(group)
                    && let Some(list_item) = ListItem::from_item(item.clone())
                {
                    self.group_items.push(list_item);
                }
            }
        }
    }

    /// Route a matched item to the exact or fuzzy list.
    pub fn add_match_item(&mut self, result: MatchResult, item: &ItemSummary) {
        let target = match result {
            MatchResult::Exact => &mut self.exact_match_items,
            MatchResult::Fuzzy => &mut self.fuzzy_match_items,
            MatchResult::None => return,
        };
        if let Some(list_item) = ListItem::from_item(item.clone()) {
            target.push(list_item);
        }
    }

    /// Route a search hit to the exact or fuzzy list. Within the TOTP group
    /// the hit is stored with its current code.
    pub async fn add_search_result_item(
        &mut self,
        result: MatchResult,
        item: &ItemSummary,
        group: Option<&VaultListGroup>,
    ) {
        if result == MatchResult::None {
            return;
        }
        let list_item = if group == Some(&VaultListGroup::Totp) {
            if !self.totp.eligible_for_totp(item).await {
                return;
            }
            self.totp.resolve(item).await.map(ListItem::totp)
        } else {
            ListItem::from_item(item.clone())
        };
        let Some(list_item) = list_item else {
            return;
        };
        match result {
            MatchResult::Exact => self.exact_match_items.push(list_item),
            MatchResult::Fuzzy => self.fuzzy_match_items.push(list_item),
            MatchResult::None => {}
        }
    }

    pub fn add_platform_credential_item(&mut self, item: &ItemSummary) {
        if let Some(list_item) = ListItem::from_item(item.clone()) {
            self.platform_credential_items.push(list_item);
        }
    }

    /// Freeze the aggregates.
    pub fn build(self) -> PreparedData {
        PreparedData {
            favorites: self.favorites.items,
            no_folder_items: self.no_folder_items.items,
            group_items: self.group_items.items,
            exact_match_items: self.exact_match_items.items,
            fuzzy_match_items: self.fuzzy_match_items.items,
            platform_credential_items: self.platform_credential_items.items,
            ..self.data
        }
    }
}
