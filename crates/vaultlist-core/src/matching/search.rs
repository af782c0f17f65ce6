//! Free-text search over item summaries.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::uri::MatchResult;
use crate::model::ItemSummary;

/// Queries at least this long may match the start of an item id.
const MIN_ID_QUERY_LEN: usize = 8;

/// Lowercase `text` and strip diacritics.
pub fn fold_for_search(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// How well `item` matches `query`.
///
/// A name hit is exact. An id prefix (for long enough queries), a subtitle
/// hit or a login URI hit is fuzzy.
pub fn matches_search_query(item: &ItemSummary, query: &str) -> MatchResult {
    let query = fold_for_search(query.trim());
    if query.is_empty() {
        return MatchResult::None;
    }

    if fold_for_search(&item.name).contains(&query) {
        return MatchResult::Exact;
    }

    let id_hit = query.chars().count() >= MIN_ID_QUERY_LEN
        && item
            .id
            .as_deref()
            .is_some_and(|id| id.to_lowercase().starts_with(&query));
    if id_hit || fold_for_search(&item.subtitle).contains(&query) {
        return MatchResult::Fuzzy;
    }

    let uri_hit = item.login().is_some_and(|login| {
        login
            .uris
            .iter()
            .filter_map(|u| u.uri.as_deref())
            .any(|uri| fold_for_search(uri).contains(&query))
    });
    if uri_hit {
        MatchResult::Fuzzy
    } else {
        MatchResult::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemType, LoginUri, LoginView};

    #[test]
    fn test_fold_strips_case_and_diacritics() {
        assert_eq!(fold_for_search("Crème Brûlée"), "creme brulee");
        assert_eq!(fold_for_search("ÅNGSTRÖM"), "angstrom");
    }

    #[test]
    fn test_name_match_is_exact() {
        let item = ItemSummary::new("1", "Café Bank", ItemType::SecureNote);
        assert_eq!(matches_search_query(&item, "cafe"), MatchResult::Exact);
        assert_eq!(matches_search_query(&item, "  BANK "), MatchResult::Exact);
    }

    #[test]
    fn test_id_prefix_needs_long_query() {
        let item = ItemSummary::new("0f3a9c1e-aaaa", "Note", ItemType::SecureNote);
        assert_eq!(matches_search_query(&item, "0f3a9c1e"), MatchResult::Fuzzy);
        assert_eq!(matches_search_query(&item, "0f3a"), MatchResult::None);
    }

    #[test]
    fn test_subtitle_and_uri_are_fuzzy() {
        let item = ItemSummary::new(
            "1",
            "Mail",
            ItemType::Login(LoginView {
                username: Some("jane".into()),
                uris: vec![LoginUri::new("https://mail.example.com", None)],
                ..LoginView::default()
            }),
        )
        .with_subtitle("jane@example.com");
        assert_eq!(matches_search_query(&item, "jane"), MatchResult::Fuzzy);
        assert_eq!(matches_search_query(&item, "mail.example"), MatchResult::Fuzzy);
        assert_eq!(matches_search_query(&item, "bank"), MatchResult::None);
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let item = ItemSummary::new("1", "Anything", ItemType::Card);
        assert_eq!(matches_search_query(&item, "   "), MatchResult::None);
    }
}
