//! Standard list recipes.
//!
//! [`VaultListDirector`] runs one preparation pass and feeds the result to a
//! [`VaultListSectionsBuilder`] in a fixed order per list flavor. A pass with
//! nothing to prepare yields an empty [`VaultListData`].
//!
//! # Example
//!
//! ```ignore
//! use vaultlist_core::{PrepareConfig, VaultFilter, VaultListDirector, VaultScope};
//!
//! let director = VaultListDirector::new(capabilities, PrepareConfig::default());
//! let list = director
//!     .build_main_list(&ciphers, &collections, &folders, &VaultFilter::new(VaultScope::All))
//!     .await;
//! for section in &list.sections {
//!     println!("{}: {} rows", section.id, section.items.len());
//! }
//! ```

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::autofill::AutofillMode;
use crate::capability::Capabilities;
use crate::config::PrepareConfig;
use crate::model::{Collection, EncryptedItem, Folder, VaultFilter, VaultListData, VaultListGroup};
use crate::prepare::{PreparedData, VaultListPreparator};
use crate::sections::VaultListSectionsBuilder;

/// Builds complete vault lists.
#[derive(Debug, Clone)]
pub struct VaultListDirector {
    preparator: VaultListPreparator,
}

impl VaultListDirector {
    pub fn new(capabilities: Capabilities, config: PrepareConfig) -> Self {
        Self {
            preparator: VaultListPreparator::new(capabilities, config),
        }
    }

    pub fn preparator(&self) -> &VaultListPreparator {
        &self.preparator
    }

    /// The vault home list: TOTP, favorites, types, folders, collections,
    /// then trash.
    #[instrument(level = "debug", skip_all)]
    pub async fn build_main_list(
        &self,
        ciphers: &[EncryptedItem],
        collections: &[Collection],
        folders: &[Folder],
        filter: &VaultFilter,
    ) -> VaultListData {
        let Some(data) = self
            .preparator
            .prepare_data(ciphers, collections, folders, filter)
            .await
        else {
            return VaultListData::default();
        };

        let mut builder = self.builder(data);
        if filter.options.add_totp_group {
            builder.add_totp_section();
        }
        builder.add_favorites_section();
        builder.add_types_section();
        builder.add_folders_section(None).await;
        builder.add_collections_section(None).await;
        builder.add_cipher_decryption_failure_ids();
        if filter.options.add_trash_group {
            builder.add_trash_section();
        }
        finish(builder)
    }

    /// The contents of `filter.group`. Folder and collection groups list
    /// their subfolders or subcollections above the items.
    #[instrument(level = "debug", skip_all, fields(group = ?filter.group))]
    pub async fn build_group_list(
        &self,
        ciphers: &[EncryptedItem],
        collections: &[Collection],
        folders: &[Folder],
        filter: &VaultFilter,
    ) -> VaultListData {
        let Some(data) = self
            .preparator
            .prepare_group_data(ciphers, collections, folders, filter)
            .await
        else {
            return VaultListData::default();
        };

        let mut builder = self.builder(data);
        match &filter.group {
            Some(VaultListGroup::Folder { id, .. }) => {
                builder.add_folders_section(Some(id.as_str())).await;
            }
            Some(VaultListGroup::Collection { id, .. }) => {
                builder.add_collections_section(Some(id.as_str())).await;
            }
            _ => {}
        }
        builder.add_group_section();
        finish(builder)
    }

    /// Search results for `filter.search_text`, exact hits first.
    #[instrument(level = "debug", skip_all)]
    pub async fn build_search_list(
        &self,
        ciphers: &[EncryptedItem],
        filter: &VaultFilter,
    ) -> VaultListData {
        let Some(data) = self.preparator.prepare_search_data(ciphers, filter).await else {
            return VaultListData::default();
        };

        let mut builder = self.builder(data);
        builder.add_search_results_section();
        finish(builder)
    }

    /// Autofill candidates for `filter.uri`, laid out for `mode`.
    #[instrument(level = "debug", skip_all, fields(mode = ?mode))]
    pub async fn build_autofill_list(
        &self,
        ciphers: &[EncryptedItem],
        filter: &VaultFilter,
        mode: &AutofillMode,
    ) -> VaultListData {
        let Some(data) = self
            .preparator
            .prepare_autofill_data(ciphers, filter, mode)
            .await
        else {
            return VaultListData::default();
        };

        let mut builder = self.builder(data);
        match mode {
            AutofillMode::Passwords => builder.add_autofill_passwords_section(),
            AutofillMode::CombinedMultiple { .. } => {
                builder.add_autofill_combined_multiple_sections();
            }
            AutofillMode::CombinedSingle => builder.add_autofill_combined_single_section(),
        }
        finish(builder)
    }

    /// Search results for `filter.search_text`, split into passkey and
    /// password sections the way [`AutofillMode::CombinedMultiple`] lays out
    /// autofill candidates.
    #[instrument(level = "debug", skip_all)]
    pub async fn build_search_autofill_list(
        &self,
        ciphers: &[EncryptedItem],
        filter: &VaultFilter,
        platform_credential_ids: Option<&BTreeSet<String>>,
    ) -> VaultListData {
        let Some(data) = self
            .preparator
            .prepare_search_autofill_data(ciphers, filter, platform_credential_ids)
            .await
        else {
            return VaultListData::default();
        };

        let mut builder = self.builder(data);
        builder.add_autofill_combined_multiple_sections();
        finish(builder)
    }

    fn builder(&self, data: PreparedData) -> VaultListSectionsBuilder<'_> {
        VaultListSectionsBuilder::new(self.preparator.capabilities(), self.preparator.config(), data)
    }
}

fn finish(builder: VaultListSectionsBuilder<'_>) -> VaultListData {
    let list = builder.build();
    debug!(sections = list.sections.len(), "Built vault list");
    list
}
