//! Errors raised by collaborators and the errors this crate reports.

use thiserror::Error;

/// Error returned by an external capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The decryption service could not decrypt the input.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// A one-time code could not be generated from the item's seed.
    #[error("TOTP generation failed: {0}")]
    Totp(String),

    /// A state, policy or settings lookup failed.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// The capability is not available in this context (locked account,
    /// missing service).
    #[error("capability unavailable: {0}")]
    Unavailable(String),
}

/// A recovered failure during list preparation.
///
/// None of these abort a pass. They are handed to the
/// [`ErrorReporter`](super::ErrorReporter) and the pass continues with
/// less data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultListError {
    /// A whole batch failed to decrypt and was skipped.
    #[error("failed to decrypt batch {batch_index} ({item_count} items)")]
    BatchDecryption {
        batch_index: usize,
        item_count: usize,
        #[source]
        source: CapabilityError,
    },

    /// A login's one-time code could not be generated.
    #[error("Unable to create TOTP code for cipher id {item_id}")]
    TotpGeneration {
        item_id: String,
        #[source]
        source: CapabilityError,
    },

    /// An upstream folder or collection had no id.
    ///
    /// This is a data error: the node is left out of the rendered tree.
    #[error("{kind} without an id can't be listed")]
    MissingIdentifier { kind: &'static str },

    /// Restrict-item-types policy lookup failed; no restriction was applied.
    #[error("failed to look up restricted item types")]
    PolicyLookup(#[source] CapabilityError),

    /// An account entitlement (premium, master password) lookup failed.
    #[error("failed to look up account {entitlement}")]
    EntitlementLookup {
        entitlement: &'static str,
        #[source]
        source: CapabilityError,
    },

    /// Equivalent domains could not be fetched; matching used none.
    #[error("failed to fetch equivalent domains")]
    EquivalentDomainsLookup(#[source] CapabilityError),

    /// Folder or collection names could not be decrypted; the section was
    /// skipped.
    #[error("failed to decrypt {kind} tree")]
    TreeDecryption {
        kind: &'static str,
        #[source]
        source: CapabilityError,
    },
}
