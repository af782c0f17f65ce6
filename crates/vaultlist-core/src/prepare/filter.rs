//! The per-item filter chain.
//!
//! Predicates run in a fixed order and stop at the first rejection:
//!
//! 1. ownership (the filter's [`VaultScope`])
//! 2. restrict-item-types policy
//! 3. lifecycle (deleted / archived), depending on the [`ListMode`]
//! 4. group membership, for group and grouped-search lists
//!
//! The rejection reason is returned so the caller can still count what it
//! dropped (deleted items feed the trash count, for example).

use std::collections::BTreeSet;

use crate::capability::PolicyProvider;
use crate::model::{EncryptedItem, GroupMembership, ItemSummary, VaultListGroup, VaultScope};

/// Which kind of list a pass builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMode {
    /// The top-level vault list.
    Main,
    /// The contents of one group.
    Group(VaultListGroup),
    /// Search results, optionally within one group.
    Search(Option<VaultListGroup>),
    /// Credential autofill.
    Autofill,
}

/// Why the chain dropped an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    Ownership,
    RestrictedItemType,
    Deleted,
    Archived,
    NotInGroup,
}

/// Outcome of running the chain on one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterVerdict {
    Retain,
    Reject(RejectReason),
}

impl FilterVerdict {
    pub fn is_retained(self) -> bool {
        self == FilterVerdict::Retain
    }
}

/// Ordered predicates for one pass.
pub struct CipherFilterChain<'a> {
    scope: &'a VaultScope,
    policy: &'a dyn PolicyProvider,
    restricted_organizations: &'a BTreeSet<String>,
    mode: ListMode,
    archive_items_enabled: bool,
}

impl<'a> CipherFilterChain<'a> {
    pub fn new(
        scope: &'a VaultScope,
        policy: &'a dyn PolicyProvider,
        restricted_organizations: &'a BTreeSet<String>,
        mode: ListMode,
        archive_items_enabled: bool,
    ) -> Self {
        Self {
            scope,
            policy,
            restricted_organizations,
            mode,
            archive_items_enabled,
        }
    }

    pub fn mode(&self) -> &ListMode {
        &self.mode
    }

    /// Whether the item's owner is in scope.
    pub fn passes_ownership(&self, item: &ItemSummary) -> bool {
        self.scope.admits(item.organization_id.as_deref())
    }

    pub fn evaluate(&self, item: &ItemSummary) -> FilterVerdict {
        if !self.passes_ownership(item) {
            return FilterVerdict::Reject(RejectReason::Ownership);
        }
        if !self
            .policy
            .passes_restrict_item_types_policy(item, self.restricted_organizations)
        {
            return FilterVerdict::Reject(RejectReason::RestrictedItemType);
        }
        if let Some(reason) = self.lifecycle_rejection(item) {
            return FilterVerdict::Reject(reason);
        }
        match self.required_group() {
            Some(group) if !item.belongs_to_group(group) => {
                FilterVerdict::Reject(RejectReason::NotInGroup)
            }
            _ => FilterVerdict::Retain,
        }
    }

    fn required_group(&self) -> Option<&VaultListGroup> {
        match &self.mode {
            ListMode::Group(group) => Some(group),
            ListMode::Search(group) => group.as_ref(),
            ListMode::Main | ListMode::Autofill => None,
        }
    }

    fn lifecycle_rejection(&self, item: &ItemSummary) -> Option<RejectReason> {
        let archived = self.archive_items_enabled && item.is_archived();
        match &self.mode {
            ListMode::Main | ListMode::Autofill => {
                if item.is_deleted() {
                    Some(RejectReason::Deleted)
                } else if archived {
                    Some(RejectReason::Archived)
                } else {
                    None
                }
            }
            ListMode::Group(group) => {
                let in_trash = *group == VaultListGroup::Trash;
                if item.is_deleted() && !in_trash {
                    Some(RejectReason::Deleted)
                } else if archived && !in_trash && *group != VaultListGroup::Archive {
                    Some(RejectReason::Archived)
                } else {
                    None
                }
            }
            ListMode::Search(group) => {
                if item.is_deleted() && group.as_ref() != Some(&VaultListGroup::Trash) {
                    Some(RejectReason::Deleted)
                } else if archived && group.as_ref() != Some(&VaultListGroup::Archive) {
                    Some(RejectReason::Archived)
                } else {
                    None
                }
            }
        }
    }
}

/// Cheap check on encrypted metadata used to skip search candidates before
/// decryption: deleted items only survive in the trash, and a group search
/// only decrypts members of the group.
pub fn retain_encrypted_for_search(item: &EncryptedItem, group: Option<&VaultListGroup>) -> bool {
    if item.is_deleted() && group != Some(&VaultListGroup::Trash) {
        return false;
    }
    group.is_none_or(|group| item.belongs_to_group(group))
}
