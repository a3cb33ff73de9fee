//! Numeric-prefix ordering shared by scripts and version folders.
//!
//! Items with a numeric key sort by that key, ties by name. Items without a
//! key sort after every keyed item, by name. The order is total, which the
//! standard library's sorts require.

use std::cmp::Ordering;

/// Compare two items by an optional numeric key, falling back to their names.
pub fn compare_by_key<T, K, N>(a: &T, b: &T, key: K, name: N) -> Ordering
where
    K: Fn(&T) -> Option<u64>,
    N: Fn(&T) -> &str,
{
    match (key(a), key(b)) {
        (Some(ka), Some(kb)) => ka.cmp(&kb).then_with(|| name(a).cmp(name(b))),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => name(a).cmp(name(b)),
    }
}

/// Sort `items` in place with [`compare_by_key`].
pub fn sort_by_key<T, K, N>(items: &mut [T], key: K, name: N)
where
    K: Fn(&T) -> Option<u64>,
    N: Fn(&T) -> &str,
{
    items.sort_by(|a, b| compare_by_key(a, b, &key, &name));
}

/// Parse the text before the first `_` as an unsigned integer.
///
/// Returns `None` for names without an underscore or with a non-numeric
/// prefix, so `"0101_init.sql"` yields 101 and `"init.sql"` yields nothing.
pub fn numeric_prefix(name: &str) -> Option<u64> {
    let (prefix, _) = name.split_once('_')?;
    parse_digits(prefix)
}

/// Parse a string made only of ASCII digits.
pub fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut items: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        sort_by_key(&mut items, |s| numeric_prefix(s), |s| s.as_str());
        items
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert_eq!(
            sorted(&["1_x.sql", "10_x.sql", "2_x.sql"]),
            vec!["1_x.sql", "2_x.sql", "10_x.sql"]
        );
    }

    #[test]
    fn test_equal_prefix_breaks_ties_by_name() {
        assert_eq!(
            sorted(&["01_b.sql", "1_a.sql", "0001_a.sql"]),
            vec!["0001_a.sql", "01_b.sql", "1_a.sql"]
        );
    }

    #[test]
    fn test_unnumbered_after_numbered() {
        assert_eq!(
            sorted(&["zeta.sql", "_init.sql", "3_c.sql", "abc_1.sql"]),
            vec!["3_c.sql", "_init.sql", "abc_1.sql", "zeta.sql"]
        );
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(numeric_prefix("0101_SYS_init.sql"), Some(101));
        assert_eq!(numeric_prefix("init.sql"), None);
        assert_eq!(numeric_prefix("_init.sql"), None);
        assert_eq!(numeric_prefix("+1_init.sql"), None);
        assert_eq!(numeric_prefix("1a_init.sql"), None);
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("007"), Some(7));
        assert_eq!(parse_digits(""), None);
        assert_eq!(parse_digits("-1"), None);
        assert_eq!(parse_digits("99999999999999999999999"), None);
    }
}
