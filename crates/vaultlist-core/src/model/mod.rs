//! Data model shared by every stage of list preparation.
//!
//! Inputs arrive as [`EncryptedItem`], [`Folder`] and [`Collection`] values
//! with a [`VaultFilter`]; decryption yields [`ItemSummary`] values; the final
//! output is a [`VaultListData`] of [`ListSection`]s.

pub mod container;
pub mod filter;
pub mod item;
pub mod list;

pub use container::{Collection, CollectionView, Folder, FolderView, TreeNodeModel};
pub use filter::{FilterOptions, VaultFilter, VaultListGroup, VaultScope};
pub use item::{
    EncryptedItem, GroupMembership, ItemKind, ItemSummary, ItemType, LoginUri, LoginView,
    ParseUriMatchTypeError, RepromptType, UriMatchType,
};
pub use list::{ListItem, ListItemKind, ListSection, TotpCode, TotpModel, VaultListData};
