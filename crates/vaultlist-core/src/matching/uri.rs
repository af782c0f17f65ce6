//! Tiered URI matching for autofill.
//!
//! A login URI is compared against the target URI according to its
//! [`UriMatchType`], producing a [`MatchResult`]. Domain matching is the only
//! tier that can produce [`MatchResult::Fuzzy`] and the only one that uses
//! equivalent domains, so those are computed once per target in
//! [`MatchingDomains`] and reused for every candidate.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use vaultlist_core::matching::{MatchResult, UriMatcher};
//! use vaultlist_core::model::UriMatchType;
//!
//! let equivalents: Vec<BTreeSet<String>> =
//!     vec![BTreeSet::from(["google.com".to_string(), "youtube.com".to_string()])];
//! let matcher = UriMatcher::new("https://google.com", &equivalents, UriMatchType::Domain);
//!
//! assert_eq!(matcher.match_uri(Some("https://youtube.com"), None), MatchResult::Exact);
//! ```

use std::collections::BTreeSet;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::domain::base_domain_of_url;
use crate::model::{ItemSummary, UriMatchType};

/// Scheme used by iOS apps to identify themselves to autofill.
pub const IOS_APP_SCHEME: &str = "iosapp://";

/// How well a candidate matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Exact,
    Fuzzy,
    None,
}

impl MatchResult {
    pub fn is_match(self) -> bool {
        self != MatchResult::None
    }
}

/// Domains a target URI matches under [`UriMatchType::Domain`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchingDomains {
    /// Candidate base domains (or full app URIs) that match exactly.
    pub matching: BTreeSet<String>,
    /// Candidate base domains that match with lower confidence.
    pub fuzzy: BTreeSet<String>,
}

impl MatchingDomains {
    /// Compute the domain sets for `target`.
    ///
    /// For a regular URI, `matching` holds its base domain plus every domain
    /// sharing an equivalence set with it. For an `iosapp://` target,
    /// `matching` holds the full target and `fuzzy` the base domain of the
    /// scheme-stripped form.
    pub fn for_target(target: &str, equivalent_sets: &[BTreeSet<String>]) -> Self {
        let mut domains = MatchingDomains::default();
        if target.is_empty() {
            return domains;
        }

        if let Some(app_id) = target.strip_prefix(IOS_APP_SCHEME) {
            domains.matching.insert(target.to_owned());
            if let Some(base) = parse_uri(app_id).as_ref().and_then(base_domain_of_url) {
                domains.fuzzy.insert(base);
            }
            return domains;
        }

        let Some(base) = parse_uri(target).as_ref().and_then(base_domain_of_url) else {
            return domains;
        };
        for set in equivalent_sets.iter().filter(|set| set.contains(&base)) {
            domains.matching.extend(set.iter().cloned());
        }
        domains.matching.insert(base);
        domains
    }
}

/// Parse a URI, assuming `http://` when it has no scheme.
pub(crate) fn parse_uri(uri: &str) -> Option<Url> {
    if uri.contains("://") {
        Url::parse(uri).ok()
    } else {
        Url::parse(&format!("http://{uri}")).ok()
    }
}

/// A target URI prepared for matching many candidates.
#[derive(Debug, Clone)]
pub struct UriMatcher {
    target: String,
    domains: MatchingDomains,
    default_match_type: UriMatchType,
}

impl UriMatcher {
    pub fn new(
        target: impl Into<String>,
        equivalent_sets: &[BTreeSet<String>],
        default_match_type: UriMatchType,
    ) -> Self {
        let target = target.into();
        let domains = MatchingDomains::for_target(&target, equivalent_sets);
        Self::with_domains(target, domains, default_match_type)
    }

    /// Build a matcher from precomputed domain sets.
    pub fn with_domains(
        target: impl Into<String>,
        domains: MatchingDomains,
        default_match_type: UriMatchType,
    ) -> Self {
        Self {
            target: target.into(),
            domains,
            default_match_type,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn domains(&self) -> &MatchingDomains {
        &self.domains
    }

    /// Match one candidate URI. `None` match type uses the default.
    pub fn match_uri(&self, candidate: Option<&str>, match_type: Option<UriMatchType>) -> MatchResult {
        let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
            return MatchResult::None;
        };
        if self.target.is_empty() {
            return MatchResult::None;
        }

        match match_type.unwrap_or(self.default_match_type) {
            UriMatchType::Domain => self.match_domain(candidate),
            UriMatchType::Host => match_host(candidate, &self.target),
            UriMatchType::StartsWith => exact_if(self.target.starts_with(candidate)),
            UriMatchType::Exact => exact_if(candidate == self.target),
            UriMatchType::RegularExpression => match_regex(candidate, &self.target),
            UriMatchType::Never => MatchResult::None,
        }
    }

    /// Best match over an item's login URIs.
    ///
    /// The first exact URI wins; otherwise the item is fuzzy if any URI is.
    /// Non-login and deleted items never match.
    pub fn match_item(&self, item: &ItemSummary) -> MatchResult {
        if item.is_deleted() {
            return MatchResult::None;
        }
        let Some(login) = item.login() else {
            return MatchResult::None;
        };

        let mut result = MatchResult::None;
        for login_uri in &login.uris {
            match self.match_uri(login_uri.uri.as_deref(), login_uri.match_type) {
                MatchResult::Exact => return MatchResult::Exact,
                MatchResult::Fuzzy => result = MatchResult::Fuzzy,
                MatchResult::None => {}
            }
        }
        result
    }

    fn match_domain(&self, candidate: &str) -> MatchResult {
        if candidate.starts_with(IOS_APP_SCHEME) && self.domains.matching.contains(candidate) {
            return MatchResult::Exact;
        }
        let Some(base) = parse_uri(candidate).as_ref().and_then(base_domain_of_url) else {
            return MatchResult::None;
        };
        if self.domains.matching.contains(&base) {
            MatchResult::Exact
        } else if self.domains.fuzzy.contains(&base) {
            MatchResult::Fuzzy
        } else {
            MatchResult::None
        }
    }
}

/// One-shot match of `candidate` against `target`.
///
/// An absent `match_type` falls back to [`UriMatchType::default`], which is
/// domain matching. To honor an account's configured default instead, build a
/// [`UriMatcher`] with that default; it is also cheaper when matching many
/// candidates against one target.
pub fn match_uri(
    candidate: Option<&str>,
    target: &str,
    match_type: Option<UriMatchType>,
    equivalent_sets: &[BTreeSet<String>],
) -> MatchResult {
    UriMatcher::new(target, equivalent_sets, UriMatchType::default())
        .match_uri(candidate, match_type)
}

fn exact_if(condition: bool) -> MatchResult {
    if condition {
        MatchResult::Exact
    } else {
        MatchResult::None
    }
}

fn match_host(candidate: &str, target: &str) -> MatchResult {
    let (Some(candidate), Some(target)) = (parse_uri(candidate), parse_uri(target)) else {
        return MatchResult::None;
    };
    let host_key = |url: &Url| {
        url.host_str()
            .map(|host| (host.to_lowercase(), url.port_or_known_default()))
    };
    match (host_key(&candidate), host_key(&target)) {
        (Some(a), Some(b)) => exact_if(a == b),
        _ => MatchResult::None,
    }
}

fn match_regex(pattern: &str, target: &str) -> MatchResult {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => exact_if(regex.is_match(target)),
        Err(err) => {
            debug!(pattern, error = %err, "Invalid URI match pattern");
            MatchResult::None
        }
    }
}
