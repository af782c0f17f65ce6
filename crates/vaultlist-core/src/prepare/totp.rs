//! Lazy TOTP code resolution with per-pass entitlement caching.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::capability::{
    AccountState, Capabilities, Clock, ErrorReporter, VaultDecryption, VaultListError,
};
use crate::model::{ItemSummary, RepromptType, TotpModel};

/// Resolves one-time codes for list items.
///
/// The premium and master-password lookups are made at most once per
/// resolver; create a new resolver for each pass.
pub struct TotpResolver {
    account: Arc<dyn AccountState>,
    decryption: Arc<dyn VaultDecryption>,
    clock: Arc<dyn Clock>,
    error_reporter: Arc<dyn ErrorReporter>,
    has_premium: Option<bool>,
    has_master_password: Option<bool>,
}

impl TotpResolver {
    pub fn new(capabilities: &Capabilities) -> Self {
        Self {
            account: Arc::clone(&capabilities.account),
            decryption: Arc::clone(&capabilities.decryption),
            clock: Arc::clone(&capabilities.clock),
            error_reporter: Arc::clone(&capabilities.error_reporter),
            has_premium: None,
            has_master_password: None,
        }
    }

    /// Whether the item has a seed the user may use: premium accounts can use
    /// any seed, others only seeds of organizations that enable TOTP.
    pub async fn eligible_for_totp(&mut self, item: &ItemSummary) -> bool {
        if item.totp_seed().is_none() {
            return false;
        }
        item.organization_use_totp || self.has_premium().await
    }

    /// Generate the item's current code.
    ///
    /// Returns `None` for items without an id or seed, and when generation
    /// fails (the failure is reported). Eligibility is the caller's concern.
    pub async fn resolve(&mut self, item: &ItemSummary) -> Option<TotpModel> {
        let id = item.id.as_deref()?;
        item.totp_seed()?;

        let code = match self.decryption.generate_totp(item, self.clock.now()).await {
            Ok(code) => code,
            Err(source) => {
                warn!(item_id = id, error = %source, "TOTP generation failed");
                self.error_reporter.log(&VaultListError::TotpGeneration {
                    item_id: id.to_owned(),
                    source,
                });
                return None;
            }
        };

        let requires_master_password =
            item.reprompt == RepromptType::Password && self.has_master_password().await;

        Some(TotpModel {
            id: id.to_owned(),
            item: item.clone(),
            requires_master_password,
            code,
        })
    }

    async fn has_premium(&mut self) -> bool {
        if let Some(cached) = self.has_premium {
            return cached;
        }
        let premium = match self.account.has_premium().await {
            Ok(premium) => premium,
            Err(source) => {
                self.error_reporter.log(&VaultListError::EntitlementLookup {
                    entitlement: "premium",
                    source,
                });
                false
            }
        };
        debug!(premium, "Resolved premium access");
        self.has_premium = Some(premium);
        premium
    }

    async fn has_master_password(&mut self) -> bool {
        if let Some(cached) = self.has_master_password {
            return cached;
        }
        let has_password = match self.account.has_master_password().await {
            Ok(has_password) => has_password,
            Err(source) => {
                self.error_reporter.log(&VaultListError::EntitlementLookup {
                    entitlement: "master password",
                    source,
                });
                false
            }
        };
        self.has_master_password = Some(has_password);
        has_password
    }
}
