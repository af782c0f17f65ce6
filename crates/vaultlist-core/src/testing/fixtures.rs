//! Item, folder and collection constructors for tests.

use crate::model::{
    Collection, EncryptedItem, Folder, ItemKind, ItemSummary, ItemType, LoginUri, LoginView,
    UriMatchType,
};

/// Seed used by [`totp_login_summary`].
pub const TEST_TOTP_SEED: &str = "JBSWY3DPEHPK3PXP";

/// A login with a username and password and no URIs.
pub fn login_summary(id: &str, name: &str) -> ItemSummary {
    ItemSummary::new(
        id,
        name,
        ItemType::Login(LoginView {
            username: Some("user@example.com".into()),
            has_password: true,
            ..LoginView::default()
        }),
    )
}

/// A fillable login with one URI.
pub fn login_with_uri(
    id: &str,
    name: &str,
    uri: &str,
    match_type: Option<UriMatchType>,
) -> ItemSummary {
    let mut item = login_summary(id, name);
    if let ItemType::Login(login) = &mut item.item_type {
        login.uris.push(LoginUri::new(uri, match_type));
    }
    item
}

/// A login carrying [`TEST_TOTP_SEED`].
pub fn totp_login_summary(id: &str, name: &str) -> ItemSummary {
    let mut item = login_summary(id, name);
    if let ItemType::Login(login) = &mut item.item_type {
        login.totp = Some(TEST_TOTP_SEED.into());
    }
    item
}

pub fn card_summary(id: &str, name: &str) -> ItemSummary {
    ItemSummary::new(id, name, ItemType::Card)
}

/// Wrap `summary` the way sync delivers it: plaintext metadata plus a
/// payload [`InMemoryDecryption`](super::InMemoryDecryption) can read back.
pub fn encrypted_item(summary: &ItemSummary) -> EncryptedItem {
    EncryptedItem {
        id: summary.id.clone(),
        kind: summary.kind(),
        organization_id: summary.organization_id.clone(),
        folder_id: summary.folder_id.clone(),
        collection_ids: summary.collection_ids.clone(),
        has_totp: summary.totp_seed().is_some(),
        deleted_date: summary.deleted_date,
        archived_date: summary.archived_date,
        payload: serde_json::to_string(summary).expect("Failed to serialize item summary"),
    }
}

/// An item whose payload can't be decrypted.
pub fn corrupt_item(id: &str, kind: ItemKind) -> EncryptedItem {
    EncryptedItem {
        id: Some(id.into()),
        kind,
        organization_id: None,
        folder_id: None,
        collection_ids: Vec::new(),
        has_totp: false,
        deleted_date: None,
        archived_date: None,
        payload: "2.corrupted|payload".into(),
    }
}

pub fn folder(id: &str, name: &str) -> Folder {
    Folder {
        id: Some(id.into()),
        name: name.into(),
    }
}

pub fn collection(id: &str, name: &str, organization_id: &str) -> Collection {
    Collection {
        id: Some(id.into()),
        name: name.into(),
        organization_id: organization_id.into(),
    }
}
