//! Folders and collections, encrypted and decrypted.

use serde::{Deserialize, Serialize};

/// A folder as delivered by sync; `name` is ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Option<String>,
    pub name: String,
}

/// A collection as delivered by sync; `name` is ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Option<String>,
    pub name: String,
    pub organization_id: String,
}

/// A decrypted folder. Nested folders use `/` in the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderView {
    pub id: Option<String>,
    pub name: String,
}

impl FolderView {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
        }
    }
}

/// A decrypted collection. Nested collections use `/` in the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionView {
    pub id: Option<String>,
    pub name: String,
    pub organization_id: String,
}

impl CollectionView {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        organization_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            organization_id: organization_id.into(),
        }
    }
}

/// A value that can be arranged into a `/`-delimited tree.
pub trait TreeNodeModel: Clone {
    fn id(&self) -> Option<&str>;
    fn name(&self) -> &str;
}

impl TreeNodeModel for FolderView {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TreeNodeModel for CollectionView {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
