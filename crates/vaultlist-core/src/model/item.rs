//! Vault items, both as delivered encrypted and as decrypted list summaries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filter::VaultListGroup;

/// The kind of a vault item, without any per-kind payload.
///
/// Used as the key for per-type counts and for group membership checks on
/// encrypted items whose payload is not yet available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Login,
    Card,
    Identity,
    SecureNote,
    SshKey,
}

impl ItemKind {
    /// All kinds in the order the types section lists them.
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Login,
        ItemKind::Card,
        ItemKind::Identity,
        ItemKind::SecureNote,
        ItemKind::SshKey,
    ];
}

/// How a login URI is compared against the URI being autofilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UriMatchType {
    /// Registrable base domain, with equivalent-domain expansion.
    #[default]
    Domain,
    /// Host and port.
    Host,
    /// The target starts with the stored URI.
    StartsWith,
    /// Exact string equality.
    Exact,
    /// The stored URI is a case-insensitive regular expression.
    RegularExpression,
    /// Never offered for autofill.
    Never,
}

/// Error returned when parsing an unknown URI match type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUriMatchTypeError(String);

impl fmt::Display for ParseUriMatchTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown URI match type: {}", self.0)
    }
}

impl std::error::Error for ParseUriMatchTypeError {}

impl FromStr for UriMatchType {
    type Err = ParseUriMatchTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(UriMatchType::Domain),
            "host" => Ok(UriMatchType::Host),
            "starts_with" => Ok(UriMatchType::StartsWith),
            "exact" => Ok(UriMatchType::Exact),
            "regular_expression" => Ok(UriMatchType::RegularExpression),
            "never" => Ok(UriMatchType::Never),
            _ => Err(ParseUriMatchTypeError(s.to_owned())),
        }
    }
}

/// Whether the user must re-enter their master password before using an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepromptType {
    #[default]
    None,
    Password,
}

/// A URI stored on a login, with an optional per-URI match type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginUri {
    pub uri: Option<String>,
    /// `None` falls back to the account's default match type.
    pub match_type: Option<UriMatchType>,
}

impl LoginUri {
    pub fn new(uri: impl Into<String>, match_type: Option<UriMatchType>) -> Self {
        Self {
            uri: Some(uri.into()),
            match_type,
        }
    }
}

/// The login-specific part of a decrypted item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginView {
    pub username: Option<String>,
    pub has_password: bool,
    /// The TOTP seed (`otpauth://` URI or bare secret), if any.
    pub totp: Option<String>,
    pub uris: Vec<LoginUri>,
    /// The login carries a platform (passkey) credential.
    pub has_platform_credential: bool,
}

/// The type of a decrypted item with its per-type payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Login(LoginView),
    Card,
    Identity,
    SecureNote,
    SshKey,
}

impl ItemType {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemType::Login(_) => ItemKind::Login,
            ItemType::Card => ItemKind::Card,
            ItemType::Identity => ItemKind::Identity,
            ItemType::SecureNote => ItemKind::SecureNote,
            ItemType::SshKey => ItemKind::SshKey,
        }
    }
}

/// Metadata shared by encrypted and decrypted items that group membership
/// is decided on.
///
/// Sync delivers ownership, placement and lifecycle fields in the clear, so
/// membership can be checked before spending a decryption on an item.
pub trait GroupMembership {
    fn kind(&self) -> ItemKind;
    fn has_totp_seed(&self) -> bool;
    fn folder_id(&self) -> Option<&str>;
    fn collection_ids(&self) -> &[String];
    fn is_deleted(&self) -> bool;
    fn is_archived(&self) -> bool;

    /// Whether the item belongs to `group`.
    ///
    /// Lifecycle is only considered for the `Trash` and `Archive` groups; the
    /// caller decides whether hidden items are eligible for other groups.
    fn belongs_to_group(&self, group: &VaultListGroup) -> bool {
        match group {
            VaultListGroup::Login => self.kind() == ItemKind::Login,
            VaultListGroup::Card => self.kind() == ItemKind::Card,
            VaultListGroup::Identity => self.kind() == ItemKind::Identity,
            VaultListGroup::SecureNote => self.kind() == ItemKind::SecureNote,
            VaultListGroup::SshKey => self.kind() == ItemKind::SshKey,
            VaultListGroup::Totp => self.kind() == ItemKind::Login && self.has_totp_seed(),
            VaultListGroup::NoFolder => self.folder_id().is_none(),
            VaultListGroup::Folder { id, .. } => self.folder_id() == Some(id.as_str()),
            VaultListGroup::Collection { id, .. } => self.collection_ids().iter().any(|c| c == id),
            VaultListGroup::Trash => self.is_deleted(),
            VaultListGroup::Archive => self.is_archived(),
        }
    }
}

/// An encrypted vault item as delivered by sync.
///
/// Only `payload` is ciphertext; everything else is the plaintext metadata
/// the server stores alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedItem {
    pub id: Option<String>,
    pub kind: ItemKind,
    pub organization_id: Option<String>,
    pub folder_id: Option<String>,
    #[serde(default)]
    pub collection_ids: Vec<String>,
    #[serde(default)]
    pub has_totp: bool,
    pub deleted_date: Option<DateTime<Utc>>,
    pub archived_date: Option<DateTime<Utc>>,
    pub payload: String,
}

impl GroupMembership for EncryptedItem {
    fn kind(&self) -> ItemKind {
        self.kind
    }

    fn has_totp_seed(&self) -> bool {
        self.has_totp
    }

    fn folder_id(&self) -> Option<&str> {
        self.folder_id.as_deref()
    }

    fn collection_ids(&self) -> &[String] {
        &self.collection_ids
    }

    fn is_deleted(&self) -> bool {
        self.deleted_date.is_some()
    }

    fn is_archived(&self) -> bool {
        self.archived_date.is_some()
    }
}

/// A decrypted, display-ready vault item.
///
/// This is the list projection of a cipher: enough to render a row, count it,
/// match it against a URI and generate its TOTP code, but not the full item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: Option<String>,
    pub name: String,
    /// Secondary line shown under the name (username, card brand, ...).
    #[serde(default)]
    pub subtitle: String,
    pub item_type: ItemType,
    pub organization_id: Option<String>,
    /// The owning organization lets non-premium members use TOTP.
    #[serde(default)]
    pub organization_use_totp: bool,
    pub folder_id: Option<String>,
    #[serde(default)]
    pub collection_ids: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub reprompt: RepromptType,
    pub deleted_date: Option<DateTime<Utc>>,
    pub archived_date: Option<DateTime<Utc>>,
    /// Set by the decryption capability when the item could not be decrypted;
    /// the remaining fields are placeholders in that case.
    #[serde(default)]
    pub decryption_failure: bool,
}

impl ItemSummary {
    /// Create a personal, non-deleted item with no folder or collections.
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            subtitle: String::new(),
            item_type,
            organization_id: None,
            organization_use_totp: false,
            folder_id: None,
            collection_ids: Vec::new(),
            favorite: false,
            reprompt: RepromptType::None,
            deleted_date: None,
            archived_date: None,
            decryption_failure: false,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.item_type.kind()
    }

    pub fn login(&self) -> Option<&LoginView> {
        match &self.item_type {
            ItemType::Login(login) => Some(login),
            _ => None,
        }
    }

    pub fn totp_seed(&self) -> Option<&str> {
        self.login().and_then(|login| login.totp.as_deref())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_date.is_some()
    }

    pub fn is_archived(&self) -> bool {
        self.archived_date.is_some()
    }

    /// Whether the item can fill a classic username/password form.
    pub fn can_be_used_in_basic_login_autofill(&self) -> bool {
        self.login().is_some_and(|login| {
            login.username.as_deref().is_some_and(|u| !u.is_empty())
                || login.has_password
                || login.totp.is_some()
        })
    }

    pub fn has_platform_credential(&self) -> bool {
        self.login().is_some_and(|login| login.has_platform_credential)
    }

    #[must_use]
    pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    #[must_use]
    pub fn with_collections<I, S>(mut self, collection_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collection_ids = collection_ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    #[must_use]
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    #[must_use]
    pub fn with_deleted_date(mut self, date: DateTime<Utc>) -> Self {
        self.deleted_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_archived_date(mut self, date: DateTime<Utc>) -> Self {
        self.archived_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }
}

impl GroupMembership for ItemSummary {
    fn kind(&self) -> ItemKind {
        self.item_type.kind()
    }

    fn has_totp_seed(&self) -> bool {
        self.totp_seed().is_some()
    }

    fn folder_id(&self) -> Option<&str> {
        self.folder_id.as_deref()
    }

    fn collection_ids(&self) -> &[String] {
        &self.collection_ids
    }

    fn is_deleted(&self) -> bool {
        self.deleted_date.is_some()
    }

    fn is_archived(&self) -> bool {
        self.archived_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(totp: Option<&str>) -> ItemType {
        ItemType::Login(LoginView {
            totp: totp.map(str::to_string),
            ..LoginView::default()
        })
    }

    #[test]
    fn test_belongs_to_type_groups() {
        let card = ItemSummary::new("1", "Visa", ItemType::Card);
        assert!(card.belongs_to_group(&VaultListGroup::Card));
        assert!(!card.belongs_to_group(&VaultListGroup::Login));
        assert!(!card.belongs_to_group(&VaultListGroup::Totp));
    }

    #[test]
    fn test_belongs_to_totp_requires_seed() {
        let with_seed = ItemSummary::new("1", "a", login(Some("JBSWY3DPEHPK3PXP")));
        let without_seed = ItemSummary::new("2", "b", login(None));
        assert!(with_seed.belongs_to_group(&VaultListGroup::Totp));
        assert!(!without_seed.belongs_to_group(&VaultListGroup::Totp));
    }

    #[test]
    fn test_belongs_to_folder_and_no_folder() {
        let item = ItemSummary::new("1", "a", ItemType::SecureNote).with_folder("f1");
        let folder = VaultListGroup::Folder {
            id: "f1".into(),
            name: "Work".into(),
        };
        let other = VaultListGroup::Folder {
            id: "f2".into(),
            name: "Home".into(),
        };
        assert!(item.belongs_to_group(&folder));
        assert!(!item.belongs_to_group(&other));
        assert!(!item.belongs_to_group(&VaultListGroup::NoFolder));
    }

    #[test]
    fn test_belongs_to_collection() {
        let item = ItemSummary::new("1", "a", ItemType::Identity).with_collections(["c1", "c2"]);
        let group = VaultListGroup::Collection {
            id: "c2".into(),
            name: "Shared".into(),
            organization_id: "org".into(),
        };
        assert!(item.belongs_to_group(&group));
    }

    #[test]
    fn test_belongs_to_trash_and_archive() {
        let deleted = ItemSummary::new("1", "a", ItemType::Card).with_deleted_date(Utc::now());
        let archived = ItemSummary::new("2", "b", ItemType::Card).with_archived_date(Utc::now());
        assert!(deleted.belongs_to_group(&VaultListGroup::Trash));
        assert!(!archived.belongs_to_group(&VaultListGroup::Trash));
        assert!(archived.belongs_to_group(&VaultListGroup::Archive));
    }

    #[test]
    fn test_basic_login_autofill_needs_a_fillable_field() {
        let empty = ItemSummary::new("1", "a", login(None));
        let with_username = ItemSummary::new(
            "2",
            "b",
            ItemType::Login(LoginView {
                username: Some("user".into()),
                ..LoginView::default()
            }),
        );
        assert!(!empty.can_be_used_in_basic_login_autofill());
        assert!(with_username.can_be_used_in_basic_login_autofill());
        assert!(!ItemSummary::new("3", "c", ItemType::Card).can_be_used_in_basic_login_autofill());
    }

    #[test]
    fn test_uri_match_type_from_str() {
        assert_eq!("host".parse::<UriMatchType>(), Ok(UriMatchType::Host));
        assert_eq!(
            "regular_expression".parse::<UriMatchType>(),
            Ok(UriMatchType::RegularExpression)
        );
        assert!("fuzzy".parse::<UriMatchType>().is_err());
    }
}
