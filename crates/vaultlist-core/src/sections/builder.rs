//! Turns [`PreparedData`] into ordered display sections.
//!
//! Each `add_*` method appends at most one section (the folders method may
//! append a second, inline "No Folder" section). Callers choose the order by
//! the order of their calls; see [`VaultListDirector`](crate::VaultListDirector)
//! for the standard ones.

use tracing::{debug, instrument, warn};

use super::sort::{natural_cmp, sort_by_name};
use super::tree::{DELIMITER, Tree, TreeNode, as_nested_nodes};
use crate::capability::{Capabilities, CapabilityError, VaultListError};
use crate::config::PrepareConfig;
use crate::model::{ItemKind, ListItem, ListSection, TreeNodeModel, VaultListData, VaultListGroup};
use crate::prepare::PreparedData;

/// Stable ids of the sections and fixed rows this builder emits.
pub mod ids {
    pub const AUTOFILL_COMBINED: &str = "AutofillCombined";
    pub const AUTOFILL_PASSKEYS: &str = "AutofillPasskeys";
    pub const AUTOFILL_PASSWORDS: &str = "AutofillPasswords";
    pub const COLLECTIONS: &str = "Collections";
    pub const FAVORITES: &str = "Favorites";
    pub const FOLDERS: &str = "Folders";
    pub const ITEMS: &str = "Items";
    pub const NO_FOLDER: &str = "NoFolder";
    pub const NO_FOLDER_ITEM: &str = "NoFolderFolderItem";
    pub const SEARCH_RESULTS: &str = "SearchResults";
    pub const TOTP: &str = "TOTP";
    pub const TRASH: &str = "Trash";
    pub const TYPES: &str = "Types";

    pub const TYPES_LOGINS: &str = "Types.Logins";
    pub const TYPES_CARDS: &str = "Types.Cards";
    pub const TYPES_IDENTITIES: &str = "Types.Identities";
    pub const TYPES_SECURE_NOTES: &str = "Types.SecureNotes";
    pub const TYPES_SSH_KEYS: &str = "Types.SSHKeys";
    pub const TYPES_VERIFICATION_CODES: &str = "Types.VerificationCodes";
}

/// Accumulates sections for one list.
pub struct VaultListSectionsBuilder<'a> {
    capabilities: &'a Capabilities,
    no_folder_threshold: usize,
    data: PreparedData,
    output: VaultListData,
}

impl<'a> VaultListSectionsBuilder<'a> {
    pub fn new(capabilities: &'a Capabilities, config: &PrepareConfig, data: PreparedData) -> Self {
        Self {
            capabilities,
            no_folder_threshold: config.no_folder_threshold,
            data,
            output: VaultListData::default(),
        }
    }

    pub fn prepared_data(&self) -> &PreparedData {
        &self.data
    }

    /// Exact matches, then fuzzy matches.
    pub fn add_autofill_passwords_section(&mut self) {
        let items = self.ranked_matches();
        if !items.is_empty() {
            self.push(ids::AUTOFILL_PASSWORDS, "", items);
        }
    }

    /// A passkey section followed by a password section.
    pub fn add_autofill_combined_multiple_sections(&mut self) {
        let passkeys = sort_by_name(self.data.platform_credential_items.clone());
        if !passkeys.is_empty() {
            self.push(ids::AUTOFILL_PASSKEYS, "Passkeys", passkeys);
        }
        let passwords = self.ranked_matches();
        if !passwords.is_empty() {
            self.push(ids::AUTOFILL_PASSWORDS, "Passwords", passwords);
        }
    }

    /// Passkeys and passwords in a single section, passkeys first.
    pub fn add_autofill_combined_single_section(&mut self) {
        let mut items = sort_by_name(self.data.platform_credential_items.clone());
        items.extend(self.ranked_matches());
        if !items.is_empty() {
            self.push(ids::AUTOFILL_COMBINED, "", items);
        }
    }

    pub fn add_cipher_decryption_failure_ids(&mut self) {
        self.output
            .cipher_decryption_failure_ids
            .clone_from(&self.data.cipher_decryption_failure_ids);
    }

    /// Collections at the root, or the children of `nested_collection_id`.
    #[instrument(level = "debug", skip(self))]
    pub async fn add_collections_section(&mut self, nested_collection_id: Option<&str>) {
        if self.data.collections.is_empty() {
            return;
        }

        let views = match self
            .capabilities
            .decryption
            .decrypt_collections(&self.data.collections)
            .await
        {
            Ok(views) => views,
            Err(source) => {
                self.report_tree_failure("collection", source);
                return;
            }
        };
        let tree = sorted_tree(views);
        let Some(nodes) = nodes_at(&tree, nested_collection_id) else {
            debug!("Nested collection not found");
            return;
        };

        let items: Vec<ListItem> = nodes
            .iter()
            .filter_map(|node| {
                let Some(id) = node.node.id.clone() else {
                    self.report_missing_id("collection");
                    return None;
                };
                let count = self.data.collection_count(&id);
                let group = VaultListGroup::Collection {
                    id: id.clone(),
                    name: node.name.clone(),
                    organization_id: node.node.organization_id.clone(),
                };
                Some(ListItem::group(id, group, count))
            })
            .collect();

        if !items.is_empty() {
            self.push(ids::COLLECTIONS, "Collections", items);
        }
    }

    pub fn add_favorites_section(&mut self) {
        if !self.data.favorites.is_empty() {
            let items = sort_by_name(self.data.favorites.clone());
            self.push(ids::FAVORITES, "Favorites", items);
        }
    }

    /// Folders at the root, or the children of `nested_folder_id`.
    ///
    /// Items without a folder are listed inline in their own section when
    /// there are no collections and fewer than the configured threshold;
    /// otherwise they collapse into a "No Folder" row of the folders section.
    #[instrument(level = "debug", skip(self))]
    pub async fn add_folders_section(&mut self, nested_folder_id: Option<&str>) {
        let views = if self.data.folders.is_empty() {
            Vec::new()
        } else {
            match self
                .capabilities
                .decryption
                .decrypt_folders(&self.data.folders)
                .await
            {
                Ok(views) => views,
                Err(source) => {
                    self.report_tree_failure("folder", source);
                    return;
                }
            }
        };
        let tree = sorted_tree(views);
        let Some(nodes) = nodes_at(&tree, nested_folder_id) else {
            debug!("Nested folder not found");
            return;
        };

        let mut items: Vec<ListItem> = nodes
            .iter()
            .filter_map(|node| {
                let Some(id) = node.node.id.clone() else {
                    self.report_missing_id("folder");
                    return None;
                };
                let count = self.data.folder_count(&id);
                let group = VaultListGroup::Folder {
                    id: id.clone(),
                    name: node.name.clone(),
                };
                Some(ListItem::group(id, group, count))
            })
            .collect();

        let no_folder_count = self.data.no_folder_items.len();
        let inline_no_folder =
            self.data.collections.is_empty() && no_folder_count < self.no_folder_threshold;
        if !inline_no_folder && no_folder_count > 0 {
            items.push(ListItem::group(
                ids::NO_FOLDER_ITEM,
                VaultListGroup::NoFolder,
                no_folder_count,
            ));
        }

        if !items.is_empty() {
            self.push(ids::FOLDERS, "Folders", items);
        }

        if inline_no_folder && no_folder_count > 0 {
            let items = sort_by_name(self.data.no_folder_items.clone());
            self.push(ids::NO_FOLDER, "No Folder", items);
        }
    }

    pub fn add_group_section(&mut self) {
        if !self.data.group_items.is_empty() {
            let items = sort_by_name(self.data.group_items.clone());
            self.push(ids::ITEMS, "Items", items);
        }
    }

    /// Exact search hits, then fuzzy ones.
    pub fn add_search_results_section(&mut self) {
        let items = self.ranked_matches();
        if !items.is_empty() {
            self.push(ids::SEARCH_RESULTS, "", items);
        }
    }

    pub fn add_totp_section(&mut self) {
        if self.data.totp_count > 0 {
            let item = ListItem::group(
                ids::TYPES_VERIFICATION_CODES,
                VaultListGroup::Totp,
                self.data.totp_count,
            );
            self.push(ids::TOTP, "TOTP", vec![item]);
        }
    }

    pub fn add_trash_section(&mut self) {
        let item = ListItem::group(ids::TRASH, VaultListGroup::Trash, self.data.deleted_count);
        self.push(ids::TRASH, "Trash", vec![item]);
    }

    /// One row per item kind in fixed order. The card row is hidden when a
    /// restrict-item-types policy applies and there are no cards left.
    pub fn add_types_section(&mut self) {
        let card_count = self.data.type_count(ItemKind::Card);
        let show_cards = self.data.restricted_organization_ids.is_empty() || card_count != 0;

        let mut items = Vec::with_capacity(ItemKind::ALL.len());
        for kind in ItemKind::ALL {
            if kind == ItemKind::Card && !show_cards {
                continue;
            }
            let (id, group) = match kind {
                ItemKind::Login => (ids::TYPES_LOGINS, VaultListGroup::Login),
                ItemKind::Card => (ids::TYPES_CARDS, VaultListGroup::Card),
                ItemKind::Identity => (ids::TYPES_IDENTITIES, VaultListGroup::Identity),
                ItemKind::SecureNote => (ids::TYPES_SECURE_NOTES, VaultListGroup::SecureNote),
                ItemKind::SshKey => (ids::TYPES_SSH_KEYS, VaultListGroup::SshKey),
            };
            items.push(ListItem::group(id, group, self.data.type_count(kind)));
        }

        self.push(ids::TYPES, "Types", items);
    }

    pub fn build(self) -> VaultListData {
        self.output
    }

    fn ranked_matches(&self) -> Vec<ListItem> {
        let mut items = sort_by_name(self.data.exact_match_items.clone());
        items.extend(sort_by_name(self.data.fuzzy_match_items.clone()));
        items
    }

    fn push(&mut self, id: &str, name: &str, items: Vec<ListItem>) {
        self.output.sections.push(ListSection::new(id, name, items));
    }

    fn report_tree_failure(&self, kind: &'static str, source: CapabilityError) {
        warn!(kind, error = %source, "Skipping section, tree failed to decrypt");
        self.capabilities
            .error_reporter
            .log(&VaultListError::TreeDecryption { kind, source });
    }

    fn report_missing_id(&self, kind: &'static str) {
        self.capabilities
            .error_reporter
            .log(&VaultListError::MissingIdentifier { kind });
    }
}

fn sorted_tree<T: TreeNodeModel>(mut views: Vec<T>) -> Tree<T> {
    views.sort_by(|a, b| natural_cmp(a.name(), b.name()));
    as_nested_nodes(&views, DELIMITER)
}

fn nodes_at<'t, T: TreeNodeModel>(tree: &'t Tree<T>, nested_id: Option<&str>) -> Option<&'t [TreeNode<T>]> {
    match nested_id {
        Some(id) => tree.get_tree_node(id).map(|node| node.children.as_slice()),
        None => Some(tree.root_nodes.as_slice()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collection, Folder, ListItemKind};
    use crate::testing::{TestVault, card_summary, collection, folder, login_summary};

    fn items(count: usize) -> Vec<ListItem> {
        (0..count)
            .filter_map(|i| ListItem::from_item(login_summary(&format!("id-{i}"), &format!("Item {i}"))))
            .collect()
    }

    fn row_ids(section: &ListSection) -> Vec<&str> {
        section.items.iter().map(|item| item.id.as_str()).collect()
    }

    fn builder(capabilities: &Capabilities, data: PreparedData) -> VaultListSectionsBuilder<'_> {
        VaultListSectionsBuilder::new(capabilities, &PrepareConfig::default(), data)
    }

    #[tokio::test]
    async fn test_no_folder_items_collapse_at_threshold() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            no_folder_items: items(101),
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data);
        b.add_folders_section(None).await;
        let list = b.build();

        assert_eq!(list.sections.len(), 1);
        let folders = &list.sections[0];
        assert_eq!(folders.id, ids::FOLDERS);
        assert_eq!(folders.items.len(), 1);
        assert_eq!(folders.items[0].id, ids::NO_FOLDER_ITEM);
        assert_eq!(folders.items[0].group_count(), Some(101));
    }

    #[tokio::test]
    async fn test_few_no_folder_items_listed_inline() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            folders: vec![folder("f1", "Work")],
            folder_counts: [("f1".to_string(), 2)].into(),
            no_folder_items: items(3),
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data);
        b.add_folders_section(None).await;
        let list = b.build();

        assert_eq!(list.sections.len(), 2);
        assert_eq!(row_ids(&list.sections[0]), vec!["f1"]);
        assert_eq!(list.sections[0].items[0].group_count(), Some(2));
        assert_eq!(list.sections[1].id, ids::NO_FOLDER);
        assert_eq!(row_ids(&list.sections[1]), vec!["id-0", "id-1", "id-2"]);
    }

    #[tokio::test]
    async fn test_collections_force_no_folder_row() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            collections: vec![collection("c1", "Shared", "org")],
            no_folder_items: items(2),
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data);
        b.add_folders_section(None).await;
        let list = b.build();

        assert_eq!(list.sections.len(), 1);
        assert_eq!(row_ids(&list.sections[0]), vec![ids::NO_FOLDER_ITEM]);
    }

    #[tokio::test]
    async fn test_nested_folder_lists_children() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            folders: vec![
                folder("f2", "Work/Clients"),
                folder("f1", "Work"),
                folder("f3", "Work/Archive"),
                folder("f4", "Home"),
            ],
            folder_counts: [("f2".to_string(), 4)].into(),
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data.clone());
        b.add_folders_section(Some("f1")).await;
        let list = b.build();
        assert_eq!(row_ids(&list.sections[0]), vec!["f3", "f2"]);
        assert_eq!(list.sections[0].items[1].group_count(), Some(4));
        assert_eq!(list.sections[0].items[1].name(), "Clients");

        let mut b = builder(&capabilities, data.clone());
        b.add_folders_section(None).await;
        let list = b.build();
        assert_eq!(row_ids(&list.sections[0]), vec!["f4", "f1"]);

        let mut b = builder(&capabilities, data);
        b.add_folders_section(Some("nope")).await;
        let list = b.build();
        assert!(list.sections.is_empty());
    }

    #[tokio::test]
    async fn test_folder_without_id_is_reported() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            folders: vec![
                Folder {
                    id: None,
                    name: "Orphan".into(),
                },
                folder("f1", "Work"),
            ],
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data);
        b.add_folders_section(None).await;
        let list = b.build();

        assert_eq!(row_ids(&list.sections[0]), vec!["f1"]);
        assert_eq!(
            vault.errors.errors(),
            vec![VaultListError::MissingIdentifier { kind: "folder" }]
        );
    }

    #[tokio::test]
    async fn test_collection_without_id_is_reported() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            collections: vec![
                Collection {
                    id: None,
                    name: "Orphan".into(),
                    organization_id: "org".into(),
                },
                collection("c1", "Team", "org"),
            ],
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data);
        b.add_collections_section(None).await;
        let list = b.build();

        assert_eq!(row_ids(&list.sections[0]), vec!["c1"]);
        assert_eq!(
            vault.errors.errors(),
            vec![VaultListError::MissingIdentifier { kind: "collection" }]
        );
    }

    #[tokio::test]
    async fn test_tree_failure_skips_section() {
        let vault = TestVault::new();
        vault.decryption.fail_trees();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            folders: vec![folder("f1", "Work")],
            collections: vec![collection("c1", "Shared", "org")],
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data);
        b.add_folders_section(None).await;
        b.add_collections_section(None).await;
        let list = b.build();

        assert!(list.sections.is_empty());
        let errors = vault.errors.errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], VaultListError::TreeDecryption { kind: "folder", .. }));
        assert!(matches!(errors[1], VaultListError::TreeDecryption { kind: "collection", .. }));
    }

    #[tokio::test]
    async fn test_collections_section_counts() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            collections: vec![collection("c2", "Team/Ops", "org"), collection("c1", "Team", "org")],
            collection_counts: [("c1".to_string(), 3), ("c2".to_string(), 1)].into(),
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data);
        b.add_collections_section(None).await;
        let list = b.build();

        let section = &list.sections[0];
        assert_eq!(section.id, ids::COLLECTIONS);
        assert_eq!(row_ids(section), vec!["c1"]);
        assert_eq!(section.items[0].group_count(), Some(3));
        assert!(matches!(
            &section.items[0].kind,
            ListItemKind::Group(VaultListGroup::Collection { organization_id, .. }, 3) if organization_id == "org"
        ));
    }

    #[tokio::test]
    async fn test_types_section_hides_restricted_cards() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let restricted = PreparedData {
            restricted_organization_ids: ["org".to_string()].into(),
            ..PreparedData::default()
        };
        let mut b = builder(&capabilities, restricted);
        b.add_types_section();
        let list = b.build();
        assert_eq!(
            row_ids(&list.sections[0]),
            vec![
                ids::TYPES_LOGINS,
                ids::TYPES_IDENTITIES,
                ids::TYPES_SECURE_NOTES,
                ids::TYPES_SSH_KEYS
            ]
        );

        let with_cards = PreparedData {
            restricted_organization_ids: ["org".to_string()].into(),
            count_per_type: [(ItemKind::Card, 2)].into(),
            ..PreparedData::default()
        };
        let mut b = builder(&capabilities, with_cards);
        b.add_types_section();
        let list = b.build();
        assert_eq!(list.sections[0].items[1].id, ids::TYPES_CARDS);
        assert_eq!(list.sections[0].items[1].group_count(), Some(2));
    }

    #[tokio::test]
    async fn test_trash_always_totp_only_when_counted() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let mut b = builder(&capabilities, PreparedData::default());
        b.add_totp_section();
        b.add_trash_section();
        let list = b.build();

        assert_eq!(list.sections.len(), 1);
        assert_eq!(list.sections[0].id, ids::TRASH);
        assert_eq!(list.sections[0].items[0].group_count(), Some(0));

        let data = PreparedData {
            totp_count: 2,
            ..PreparedData::default()
        };
        let mut b = builder(&capabilities, data);
        b.add_totp_section();
        let list = b.build();
        assert_eq!(row_ids(&list.sections[0]), vec![ids::TYPES_VERIFICATION_CODES]);
        assert_eq!(list.sections[0].items[0].group_count(), Some(2));
    }

    #[tokio::test]
    async fn test_favorites_and_group_sorted() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let named = |id: &str, name: &str| ListItem::from_item(card_summary(id, name));
        let data = PreparedData {
            favorites: [named("1", "beta"), named("2", "Alpha")].into_iter().flatten().collect(),
            group_items: [named("3", "Item 10"), named("4", "Item 9")].into_iter().flatten().collect(),
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data);
        b.add_favorites_section();
        b.add_group_section();
        let list = b.build();

        assert_eq!(row_ids(&list.sections[0]), vec!["2", "1"]);
        assert_eq!(list.sections[1].id, ids::ITEMS);
        assert_eq!(row_ids(&list.sections[1]), vec!["4", "3"]);
    }

    #[tokio::test]
    async fn test_empty_sections_are_omitted() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let mut b = builder(&capabilities, PreparedData::default());
        b.add_favorites_section();
        b.add_group_section();
        b.add_folders_section(None).await;
        b.add_collections_section(None).await;
        b.add_search_results_section();
        b.add_autofill_passwords_section();
        b.add_autofill_combined_multiple_sections();
        b.add_autofill_combined_single_section();
        let list = b.build();

        assert!(list.sections.is_empty());
    }

    #[tokio::test]
    async fn test_autofill_layouts() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let named = |id: &str, name: &str| ListItem::from_item(login_summary(id, name));
        let data = PreparedData {
            exact_match_items: [named("e", "Exact")].into_iter().flatten().collect(),
            fuzzy_match_items: [named("f", "Another")].into_iter().flatten().collect(),
            platform_credential_items: [named("p", "Passkey")].into_iter().flatten().collect(),
            ..PreparedData::default()
        };

        let mut b = builder(&capabilities, data.clone());
        b.add_autofill_combined_multiple_sections();
        let list = b.build();
        assert_eq!(list.sections.len(), 2);
        assert_eq!(list.sections[0].id, ids::AUTOFILL_PASSKEYS);
        assert_eq!(row_ids(&list.sections[1]), vec!["e", "f"]);

        let mut b = builder(&capabilities, data.clone());
        b.add_autofill_combined_single_section();
        let list = b.build();
        assert_eq!(row_ids(&list.sections[0]), vec!["p", "e", "f"]);

        let mut b = builder(&capabilities, data);
        b.add_autofill_passwords_section();
        let list = b.build();
        assert_eq!(list.sections[0].id, ids::AUTOFILL_PASSWORDS);
        assert_eq!(row_ids(&list.sections[0]), vec!["e", "f"]);
    }

    #[tokio::test]
    async fn test_decryption_failure_ids_copied() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let data = PreparedData {
            cipher_decryption_failure_ids: vec!["x".into()],
            ..PreparedData::default()
        };
        let mut b = builder(&capabilities, data);
        b.add_cipher_decryption_failure_ids();
        let list = b.build();
        assert_eq!(list.cipher_decryption_failure_ids, vec!["x"]);
        assert!(list.sections.is_empty());
    }
}
