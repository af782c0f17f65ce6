//! URI matching through the public API.

use std::collections::BTreeSet;

use vaultlist_core::matching::{MatchResult, MatchingDomains, UriMatcher, match_uri};
use vaultlist_core::model::UriMatchType;

fn set(domains: &[&str]) -> BTreeSet<String> {
    domains.iter().map(|d| (*d).to_string()).collect()
}

#[test]
fn test_domain_matching_with_equivalents() {
    let sets = [set(&["google.com", "youtube.com"])];
    let matcher = UriMatcher::new("https://google.com", &sets, UriMatchType::Domain);

    assert_eq!(matcher.match_uri(Some("http://google.com"), None), MatchResult::Exact);
    assert_eq!(matcher.match_uri(Some("https://accounts.google.com"), None), MatchResult::Exact);
    assert_eq!(matcher.match_uri(Some("https://youtube.com/watch"), None), MatchResult::Exact);
    assert_eq!(matcher.match_uri(Some("https://google.net"), None), MatchResult::None);
}

#[test]
fn test_app_scheme_target_gives_fuzzy_web_match() {
    let domains = MatchingDomains {
        matching: BTreeSet::new(),
        fuzzy: set(&["example.com"]),
    };
    let matcher = UriMatcher::with_domains("iosapp://example.com", domains, UriMatchType::Domain);

    assert_eq!(
        matcher.match_uri(Some("https://example.com"), Some(UriMatchType::Domain)),
        MatchResult::Fuzzy
    );
}

#[test]
fn test_host_matching_compares_ports() {
    let target = "https://sub.domain.com:4000";
    assert_eq!(
        match_uri(Some("https://sub.domain.com:5000"), target, Some(UriMatchType::Host), &[]),
        MatchResult::None
    );
    assert_eq!(
        match_uri(Some("http://sub.domain.com:4000"), target, Some(UriMatchType::Host), &[]),
        MatchResult::Exact
    );
}

#[test]
fn test_regular_expression_matching() {
    let pattern = Some(r"^https://[a-z]+\.wikipedia\.org/w/index\.php");
    let regex = Some(UriMatchType::RegularExpression);

    assert_eq!(
        match_uri(
            pattern,
            "https://en.wikipedia.org/w/index.php?title=Special:UserLogin",
            regex,
            &[]
        ),
        MatchResult::Exact
    );
    assert_eq!(match_uri(pattern, "https://malicious-site.com", regex, &[]), MatchResult::None);
}

#[test]
fn test_multi_part_suffixes() {
    let matcher = UriMatcher::new("https://shop.example.co.uk", &[], UriMatchType::Domain);

    assert_eq!(matcher.match_uri(Some("https://example.co.uk"), None), MatchResult::Exact);
    assert_eq!(matcher.match_uri(Some("https://other.co.uk"), None), MatchResult::None);
}

#[test]
fn test_match_type_parsing() {
    assert_eq!("starts_with".parse::<UriMatchType>(), Ok(UriMatchType::StartsWith));
    assert_eq!("regular_expression".parse::<UriMatchType>(), Ok(UriMatchType::RegularExpression));
    assert!("fuzzy".parse::<UriMatchType>().is_err());
}
