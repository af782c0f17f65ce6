//! Ranking of login items for credential autofill.
//!
//! The ranker decides, item by item, where a retained login goes in the
//! prepared data; [`RankedAutofillResult`] then orders the finished lists.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::matching::{MatchResult, UriMatcher};
use crate::model::{ItemSummary, ListItem};
use crate::prepare::{PreparedData, PreparedDataAccumulator};
use crate::sections::sort::sort_by_name;

/// What the autofill surface is asking for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutofillMode {
    /// Passwords only.
    #[default]
    Passwords,
    /// Passkeys and passwords in separate sections. Platform credentials are
    /// only offered for items whose id is in `platform_credential_ids`.
    CombinedMultiple {
        platform_credential_ids: Option<BTreeSet<String>>,
    },
    /// Passkeys and passwords in one section.
    CombinedSingle,
}

/// Routes matching logins into the accumulator.
#[derive(Debug, Clone)]
pub struct AutofillRanker {
    matcher: UriMatcher,
    mode: AutofillMode,
}

impl AutofillRanker {
    pub fn new(matcher: UriMatcher, mode: AutofillMode) -> Self {
        Self { matcher, mode }
    }

    pub fn matcher(&self) -> &UriMatcher {
        &self.matcher
    }

    pub fn mode(&self) -> &AutofillMode {
        &self.mode
    }

    /// Match `item` against the target and record it according to the mode.
    pub fn rank(&self, acc: &mut PreparedDataAccumulator, item: &ItemSummary) -> MatchResult {
        if item.login().is_none() || item.is_deleted() {
            return MatchResult::None;
        }

        match &self.mode {
            AutofillMode::Passwords => {
                if !item.can_be_used_in_basic_login_autofill() {
                    return MatchResult::None;
                }
                let result = self.matcher.match_item(item);
                acc.add_match_item(result, item);
                result
            }
            AutofillMode::CombinedMultiple {
                platform_credential_ids,
            } => {
                let result = self.matcher.match_item(item);
                if result.is_match() {
                    route_combined_multiple(acc, item, result, platform_credential_ids.as_ref());
                }
                result
            }
            AutofillMode::CombinedSingle => {
                let result = self.matcher.match_item(item);
                if !result.is_match() {
                    return result;
                }
                if item.has_platform_credential() {
                    acc.add_platform_credential_item(item);
                } else {
                    acc.add_match_item(result, item);
                }
                trace!(item_id = ?item.id, ?result, "Ranked combined autofill item");
                result
            }
        }
    }
}

/// Record a matching login for the passkey and password sections.
///
/// The item is offered as a passkey when it carries a platform credential
/// whose id is in `platform_credential_ids`, and as a password when it can be
/// used for basic login autofill. `result` decides exact or fuzzy placement.
pub fn route_combined_multiple(
    acc: &mut PreparedDataAccumulator,
    item: &ItemSummary,
    result: MatchResult,
    platform_credential_ids: Option<&BTreeSet<String>>,
) {
    let offered = platform_credential_ids
        .is_some_and(|ids| item.id.as_ref().is_some_and(|id| ids.contains(id)));
    if item.has_platform_credential() && offered {
        acc.add_platform_credential_item(item);
    }
    if item.can_be_used_in_basic_login_autofill() {
        acc.add_match_item(result, item);
    }
}

/// Autofill candidates, each list ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedAutofillResult {
    pub exact: Vec<ListItem>,
    pub fuzzy: Vec<ListItem>,
    pub platform_credential_items: Vec<ListItem>,
}

impl RankedAutofillResult {
    pub fn from_prepared(data: &PreparedData) -> Self {
        Self {
            exact: sort_by_name(data.exact_match_items.clone()),
            fuzzy: sort_by_name(data.fuzzy_match_items.clone()),
            platform_credential_items: sort_by_name(data.platform_credential_items.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.fuzzy.is_empty() && self.platform_credential_items.is_empty()
    }

    /// Password candidates, exact matches first.
    pub fn password_items(&self) -> impl Iterator<Item = &ListItem> {
        self.exact.iter().chain(&self.fuzzy)
    }
}
