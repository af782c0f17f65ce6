//! Vault list preparation for password manager clients.
//!
//! Turns encrypted vault items into display-ready sections (favorites, types,
//! folders, collections, trash), search results and ranked autofill
//! candidates. Decryption, policies, account state and equivalent domains are
//! supplied through the traits in [`capability`].

pub mod autofill;
pub mod capability;
pub mod config;
pub mod director;
pub mod error;
pub mod matching;
pub mod model;
pub mod prepare;
pub mod sections;
pub mod testing;

// Re-export commonly used types at crate root
pub use autofill::{AutofillMode, RankedAutofillResult};
pub use capability::Capabilities;
pub use config::PrepareConfig;
pub use director::VaultListDirector;
pub use model::{
    EncryptedItem, FilterOptions, ItemSummary, VaultFilter, VaultListData, VaultListGroup,
    VaultScope,
};
pub use prepare::{PreparedData, VaultListPreparator};
