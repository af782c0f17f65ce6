//! URI and text matching.
//!
//! - [`uri`]: tiered URI comparison for autofill
//! - [`domain`]: registrable base domains from public suffix rules
//! - [`search`]: free-text search over item summaries

pub mod domain;
pub mod search;
pub mod uri;

pub use domain::{DomainParts, SuffixRules, load_suffix_rules};
pub use search::{fold_for_search, matches_search_query};
pub use uri::{IOS_APP_SCHEME, MatchResult, MatchingDomains, UriMatcher, match_uri};
