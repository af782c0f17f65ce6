//! What the caller asks a list pass to show.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named bucket of items in the display list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "group")]
pub enum VaultListGroup {
    Login,
    Card,
    Identity,
    SecureNote,
    SshKey,
    /// Logins with a TOTP seed the user is entitled to use.
    Totp,
    NoFolder,
    Trash,
    Archive,
    Folder {
        id: String,
        name: String,
    },
    Collection {
        id: String,
        name: String,
        organization_id: String,
    },
}

impl VaultListGroup {
    /// Folder id when this is a folder group.
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            VaultListGroup::Folder { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Collection id when this is a collection group.
    pub fn collection_id(&self) -> Option<&str> {
        match self {
            VaultListGroup::Collection { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, VaultListGroup::Folder { .. })
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, VaultListGroup::Collection { .. })
    }

    /// Display name of the group.
    pub fn name(&self) -> &str {
        match self {
            VaultListGroup::Login => "Login",
            VaultListGroup::Card => "Card",
            VaultListGroup::Identity => "Identity",
            VaultListGroup::SecureNote => "Secure note",
            VaultListGroup::SshKey => "SSH key",
            VaultListGroup::Totp => "Verification codes",
            VaultListGroup::NoFolder => "No Folder",
            VaultListGroup::Trash => "Trash",
            VaultListGroup::Archive => "Archive",
            VaultListGroup::Folder { name, .. } | VaultListGroup::Collection { name, .. } => name,
        }
    }
}

impl fmt::Display for VaultListGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whose items a pass considers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultScope {
    /// Personal and organization items.
    #[default]
    All,
    /// Personal items only.
    Mine,
    /// Items owned by one organization.
    Organization(String),
}

impl VaultScope {
    /// Whether an item owned by `organization_id` passes this scope.
    pub fn admits(&self, organization_id: Option<&str>) -> bool {
        match self {
            VaultScope::All => true,
            VaultScope::Mine => organization_id.is_none(),
            VaultScope::Organization(id) => organization_id == Some(id.as_str()),
        }
    }
}

/// Extra groups the main list may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub add_totp_group: bool,
    pub add_trash_group: bool,
}

/// Everything a list pass is filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VaultFilter {
    pub scope: VaultScope,
    pub group: Option<VaultListGroup>,
    pub search_text: Option<String>,
    /// Target URI for autofill passes.
    pub uri: Option<String>,
    pub options: FilterOptions,
}

impl VaultFilter {
    pub fn new(scope: VaultScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: VaultListGroup) -> Self {
        self.group = Some(group);
        self
    }

    #[must_use]
    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    /// Search text with surrounding whitespace removed, `None` when blank.
    pub fn trimmed_search_text(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
