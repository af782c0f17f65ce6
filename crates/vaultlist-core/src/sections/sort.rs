//! Natural name ordering.
//!
//! Names compare case- and diacritic-insensitively with runs of digits
//! compared by value, so `Item 2` sorts before `Item 10`. Names that compare
//! equal fall back to their raw text, and list items finally to their id, so
//! the order is total and stable across runs.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use crate::matching::fold_for_search;
use crate::model::ListItem;

/// Compare two names in natural order.
///
/// ```
/// use std::cmp::Ordering;
///
/// use vaultlist_core::sections::natural_cmp;
///
/// assert_eq!(natural_cmp("Item 2", "item 10"), Ordering::Less);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let folded_a = fold_for_search(a);
    let folded_b = fold_for_search(b);
    compare_folded(&folded_a, &folded_b).then_with(|| a.cmp(b))
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let ordering = compare_numbers(&take_digits(&mut a), &take_digits(&mut b));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

/// Compare digit runs by value without parsing, so arbitrarily long runs
/// don't overflow.
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Sort list items by name in natural order, ties broken by id.
pub fn sort_by_name(mut items: Vec<ListItem>) -> Vec<ListItem> {
    items.sort_by(|a, b| natural_cmp(a.name(), b.name()).then_with(|| a.id.cmp(&b.id)));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|s| (*s).to_string()).collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(sorted(&["Item 10", "Item 2", "Item 1"]), vec!["Item 1", "Item 2", "Item 10"]);
    }

    #[test]
    fn test_case_and_diacritics_ignored() {
        assert_eq!(sorted(&["beta", "Alpha", "Émile", "delta"]), vec!["Alpha", "beta", "delta", "Émile"]);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(natural_cmp("file007", "file7"), Ordering::Greater);
        assert_eq!(natural_cmp("file007", "file8"), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("Bank", "Bank account"), Ordering::Less);
    }

    #[test]
    fn test_equal_names_fall_back_to_id() {
        use crate::model::{ItemSummary, ItemType};

        let items = vec![
            ListItem::from_item(ItemSummary::new("b", "Same", ItemType::Card)).unwrap(),
            ListItem::from_item(ItemSummary::new("a", "Same", ItemType::Card)).unwrap(),
        ];
        let ids: Vec<String> = sort_by_name(items).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
