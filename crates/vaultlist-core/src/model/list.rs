//! Display output: sections of list items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filter::VaultListGroup;
use super::item::ItemSummary;

/// A generated one-time code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpCode {
    pub code: String,
    pub generated_at: DateTime<Utc>,
    /// Validity period in seconds.
    pub period: u32,
}

/// A login paired with its current one-time code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpModel {
    pub id: String,
    pub item: ItemSummary,
    /// The item has password reprompt on and the user has a master password
    /// to reprompt with.
    pub requires_master_password: bool,
    pub code: TotpCode,
}

/// What a list row shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListItemKind {
    Item(Box<ItemSummary>),
    /// A group row with the number of items in it.
    Group(VaultListGroup, usize),
    Totp { name: String, model: Box<TotpModel> },
}

/// A row in a list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub kind: ListItemKind,
}

impl ListItem {
    /// Wrap an item; items without an id can't be shown.
    pub fn from_item(item: ItemSummary) -> Option<Self> {
        let id = item.id.clone()?;
        Some(Self {
            id,
            kind: ListItemKind::Item(Box::new(item)),
        })
    }

    pub fn group(id: impl Into<String>, group: VaultListGroup, count: usize) -> Self {
        Self {
            id: id.into(),
            kind: ListItemKind::Group(group, count),
        }
    }

    pub fn totp(model: TotpModel) -> Self {
        Self {
            id: model.id.clone(),
            kind: ListItemKind::Totp {
                name: model.item.name.clone(),
                model: Box::new(model),
            },
        }
    }

    /// Name shown for the row.
    pub fn name(&self) -> &str {
        match &self.kind {
            ListItemKind::Item(item) => &item.name,
            ListItemKind::Group(group, _) => group.name(),
            ListItemKind::Totp { name, .. } => name,
        }
    }

    /// Count carried by a group row.
    pub fn group_count(&self) -> Option<usize> {
        match &self.kind {
            ListItemKind::Group(_, count) => Some(*count),
            _ => None,
        }
    }
}

/// A named, ordered run of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    pub id: String,
    pub name: String,
    pub items: Vec<ListItem>,
}

impl ListSection {
    pub fn new(id: impl Into<String>, name: impl Into<String>, items: Vec<ListItem>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items,
        }
    }
}

/// The result of building a display list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VaultListData {
    pub sections: Vec<ListSection>,
    /// Ids of items that could not be decrypted.
    pub cipher_decryption_failure_ids: Vec<String>,
}

impl VaultListData {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.cipher_decryption_failure_ids.is_empty()
    }

    /// Look up a section by id.
    pub fn section(&self, id: &str) -> Option<&ListSection> {
        self.sections.iter().find(|section| section.id == id)
    }
}
