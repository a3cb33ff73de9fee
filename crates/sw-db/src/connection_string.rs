//! Postgres connection-string rewriting.
//!
//! `tokio_postgres::Config` parses both the `key=value` and the URL form but
//! cannot render a config back into a string. URLs are rewritten through
//! [`url::Url`]; `key=value` strings are rewritten pair by pair with every
//! other value preserved as written.

use crate::error::{DbError, DbResult};
use url::Url;

/// Return `connection_string` with its target database replaced by `database`.
pub fn replace_database(connection_string: &str, database: &str) -> DbResult<String> {
    let trimmed = connection_string.trim();
    if is_url(trimmed) {
        replace_in_url(trimmed, database)
    } else {
        replace_in_key_value(trimmed, database)
    }
}

fn is_url(s: &str) -> bool {
    s.starts_with("postgres://") || s.starts_with("postgresql://")
}

/// Point the path at `database` and drop any `dbname` query parameter,
/// which would otherwise override the path.
fn replace_in_url(connection_string: &str, database: &str) -> DbResult<String> {
    let mut url = Url::parse(connection_string)
        .map_err(|e| DbError::InvalidConnectionString(format!("{}: {}", e, connection_string)))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "dbname")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_path(&format!("/{}", database));
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept.iter());
    }
    Ok(url.to_string())
}

/// A `key=value` pair with the value exactly as written (quotes included).
struct Pair<'a> {
    key: &'a str,
    raw_value: String,
}

fn replace_in_key_value(s: &str, database: &str) -> DbResult<String> {
    let mut pairs = parse_pairs(s)?;
    let quoted = quote_value(database);

    match pairs.iter_mut().find(|p| p.key == "dbname") {
        Some(pair) => pair.raw_value = quoted,
        None => pairs.push(Pair {
            key: "dbname",
            raw_value: quoted,
        }),
    }

    Ok(pairs
        .iter()
        .map(|p| format!("{}={}", p.key, p.raw_value))
        .collect::<Vec<_>>()
        .join(" "))
}

fn parse_pairs(s: &str) -> DbResult<Vec<Pair<'_>>> {
    let invalid = || DbError::InvalidConnectionString(s.to_string());
    let mut pairs = Vec::new();
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(invalid)?;
        let key = rest[..eq].trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(invalid());
        }
        rest = rest[eq + 1..].trim_start();

        let value_len = if rest.starts_with('\'') {
            quoted_len(rest).ok_or_else(invalid)?
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        pairs.push(Pair {
            key,
            raw_value: rest[..value_len].to_string(),
        });
        rest = rest[value_len..].trim_start();
    }

    Ok(pairs)
}

/// Length of a single-quoted value including both quotes.
fn quoted_len(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '\'' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

#[cfg(test)]
#[path = "connection_string_test.rs"]
mod tests;
