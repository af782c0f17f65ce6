//! Registrable base domains from public suffix rules.
//!
//! A host like `sub.example.co.uk` splits into a top-level domain (`co.uk`),
//! a second-level domain (`example`) and a subdomain (`sub`); its base domain
//! is `example.co.uk`.
//!
//! The rule set starts out as a compact list embedded in the crate and can be
//! swapped for the full public suffix list with [`load_suffix_rules`].
//!
//! Rule kinds:
//! - normal (`co.uk`): the rule is the top-level domain
//! - wildcard (`*.compute.amazonaws.com`): one more label belongs to the
//!   top-level domain
//! - exception (`!city.kobe.jp`): the rule itself is the top-level domain and
//!   wins over a wildcard of the same length
//!
//! When no rule matches, the last label is the top-level domain.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::debug;
use url::Url;

const EMBEDDED_RULES: &str = include_str!("public_suffix_list.dat");

static ACTIVE_RULES: LazyLock<RwLock<Arc<SuffixRules>>> =
    LazyLock::new(|| RwLock::new(Arc::new(SuffixRules::parse(EMBEDDED_RULES))));

/// Parsed public suffix rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixRules {
    exceptions: HashSet<String>,
    normals: HashSet<String>,
    wildcards: HashSet<String>,
}

/// A host split around its top-level domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    pub top_level_domain: String,
    pub second_level_domain: String,
    pub sub_domain: String,
}

impl DomainParts {
    /// The registrable domain: second-level plus top-level.
    pub fn domain(&self) -> String {
        format!("{}.{}", self.second_level_domain, self.top_level_domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RuleKind {
    Normal,
    Wildcard,
    Exception,
}

impl SuffixRules {
    /// Parse rules in public suffix list format. Comments and blank lines are
    /// skipped; only the first whitespace-separated token of a line counts.
    pub fn parse(data: &str) -> Self {
        let mut rules = SuffixRules::default();

        for line in data.lines() {
            let Some(rule) = line.split_whitespace().next() else {
                continue;
            };
            if rule.starts_with("//") {
                continue;
            }
            let rule = rule.to_lowercase();
            if let Some(rest) = rule.strip_prefix("*.") {
                rules.wildcards.insert(rest.to_owned());
            } else if let Some(rest) = rule.strip_prefix('!') {
                rules.exceptions.insert(rest.to_owned());
            } else {
                rules.normals.insert(rule);
            }
        }

        rules
    }

    /// The compact rule set shipped with the crate.
    pub fn embedded() -> Self {
        Self::parse(EMBEDDED_RULES)
    }

    pub fn len(&self) -> usize {
        self.exceptions.len() + self.normals.len() + self.wildcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split `host` around its top-level domain.
    ///
    /// Returns `None` when the host is itself a public suffix (nothing is left
    /// for a second-level domain).
    pub fn parse_host(&self, host: &str) -> Option<DomainParts> {
        let host = host.trim_end_matches('.').to_lowercase();
        if host.is_empty() {
            return None;
        }
        let labels: Vec<&str> = host.split('.').collect();
        let label_count = labels.len();

        // (labels in the top-level domain, rule kind) of the best match
        let mut best: Option<(usize, RuleKind)> = None;
        for start in (0..label_count).rev() {
            let suffix = labels[start..].join(".");
            let suffix_len = label_count - start;
            let mut consider = |len: usize, kind: RuleKind| {
                if best.is_none_or(|current| (len, kind) > current) {
                    best = Some((len, kind));
                }
            };
            if self.exceptions.contains(&suffix) {
                consider(suffix_len, RuleKind::Exception);
            }
            if self.normals.contains(&suffix) {
                consider(suffix_len, RuleKind::Normal);
            }
            if self.wildcards.contains(&suffix) {
                consider(suffix_len + 1, RuleKind::Wildcard);
            }
        }

        let tld_len = best.map_or(1, |(len, _)| len);
        if tld_len >= label_count {
            return None;
        }

        let second_level_index = label_count - tld_len - 1;
        Some(DomainParts {
            top_level_domain: labels[second_level_index + 1..].join("."),
            second_level_domain: labels[second_level_index].to_owned(),
            sub_domain: labels[..second_level_index].join("."),
        })
    }

    /// Base domain of a host. IP literals and single-label hosts (such as
    /// `localhost`) are their own base domain.
    pub fn base_domain(&self, host: &str) -> Option<String> {
        let host = host.trim_end_matches('.').to_lowercase();
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if bare.parse::<IpAddr>().is_ok() || (!host.is_empty() && !host.contains('.')) {
            return Some(host);
        }
        self.parse_host(&host).map(|parts| parts.domain())
    }
}

/// Replace the active rule set with rules parsed from `data`.
///
/// Returns the number of rules loaded.
pub fn load_suffix_rules(data: &str) -> usize {
    let rules = SuffixRules::parse(data);
    let count = rules.len();
    *ACTIVE_RULES.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(rules);
    debug!(rules = count, "Loaded public suffix rules");
    count
}

/// Restore the embedded rule set.
pub fn reset_suffix_rules() {
    *ACTIVE_RULES.write().unwrap_or_else(PoisonError::into_inner) =
        Arc::new(SuffixRules::embedded());
}

/// The rule set currently in use.
pub fn active_rules() -> Arc<SuffixRules> {
    Arc::clone(&ACTIVE_RULES.read().unwrap_or_else(PoisonError::into_inner))
}

/// Base domain of a parsed URL's host.
pub fn base_domain_of_url(url: &Url) -> Option<String> {
    url.host_str().and_then(|host| active_rules().base_domain(host))
}

/// Split a parsed URL's host into domain parts.
pub fn parse_url(url: &Url) -> Option<DomainParts> {
    url.host_str().and_then(|host| active_rules().parse_host(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> SuffixRules {
        SuffixRules::embedded()
    }

    #[test]
    fn test_parse_skips_comments_and_whitespace() {
        let rules = SuffixRules::parse("// comment\n\ncom  \n  \n*.kobe.jp\n!city.kobe.jp\n");
        assert_eq!(rules.len(), 3);
        assert!(rules.normals.contains("com"));
        assert!(rules.wildcards.contains("kobe.jp"));
        assert!(rules.exceptions.contains("city.kobe.jp"));
    }

    #[test]
    fn test_normal_rules() {
        let rules = rules();
        assert_eq!(rules.base_domain("example.com").as_deref(), Some("example.com"));
        assert_eq!(rules.base_domain("sub.example.com").as_deref(), Some("example.com"));
        assert_eq!(rules.base_domain("example.co.uk").as_deref(), Some("example.co.uk"));
        assert_eq!(rules.base_domain("a.b.example.co.uk").as_deref(), Some("example.co.uk"));
    }

    #[test]
    fn test_wildcard_rules() {
        let rules = rules();
        assert_eq!(
            rules
                .base_domain("foo.sub.example.compute.amazonaws.com")
                .as_deref(),
            Some("sub.example.compute.amazonaws.com")
        );
        assert_eq!(rules.parse_host("compute.amazonaws.com"), None);
    }

    #[test]
    fn test_exception_rules() {
        let rules = rules();
        let parts = rules.parse_host("sub.example.city.kobe.jp").unwrap();
        assert_eq!(parts.top_level_domain, "city.kobe.jp");
        assert_eq!(parts.second_level_domain, "example");
        assert_eq!(parts.sub_domain, "sub");
        assert_eq!(rules.parse_host("city.kobe.jp"), None);
    }

    #[test]
    fn test_host_that_is_a_suffix_has_no_base_domain() {
        let rules = rules();
        assert_eq!(rules.base_domain("co.uk"), None);
        assert_eq!(rules.base_domain("github.io"), None);
    }

    #[test]
    fn test_unknown_tld_uses_last_label() {
        let rules = rules();
        assert_eq!(
            rules.base_domain("sub.example.notarealtld").as_deref(),
            Some("example.notarealtld")
        );
    }

    #[test]
    fn test_ip_and_single_label_hosts() {
        let rules = rules();
        assert_eq!(rules.base_domain("192.168.1.10").as_deref(), Some("192.168.1.10"));
        assert_eq!(rules.base_domain("[::1]").as_deref(), Some("[::1]"));
        assert_eq!(rules.base_domain("localhost").as_deref(), Some("localhost"));
    }

    #[test]
    fn test_case_and_trailing_dot() {
        let rules = rules();
        assert_eq!(rules.base_domain("WWW.Example.COM.").as_deref(), Some("example.com"));
    }

    #[test]
    fn test_base_domain_of_url() {
        let url = Url::parse("https://accounts.google.com/signin").unwrap();
        assert_eq!(base_domain_of_url(&url).as_deref(), Some("google.com"));

        let app = Url::parse("iosapp://example.com").unwrap();
        assert_eq!(base_domain_of_url(&app).as_deref(), Some("example.com"));
    }
}
