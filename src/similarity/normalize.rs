//! Text, path and schema-name normalization.
//!
//! All functions are pure and total: empty input yields empty output.

use regex::Regex;
use std::sync::LazyLock;

/// Canonical placeholder substituted for every path parameter.
pub const PATH_PARAM: &str = "{param}";

/// Characters outside `[a-z0-9\s]` after lowercasing.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9\s]").unwrap_or_else(|_| unreachable!("static regex"))
});

/// `{token}`, `:token` and `[token]` path parameters.
static PATH_PARAMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[^}/]*\}|:[A-Za-z0-9_\-]+|\[[^\]/]*\]")
        .unwrap_or_else(|_| unreachable!("static regex"))
});

/// Conventional data-transfer suffixes, end anchored and case sensitive.
static SCHEMA_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:DTO|Dto|Model|Entity|Request|Response|VM|ViewModel)$")
        .unwrap_or_else(|_| unreachable!("static regex"))
});

/// Lowercases and replaces punctuation with spaces.
///
/// ```rust
/// use apidedup::similarity::normalize_text;
///
/// assert_eq!(normalize_text("Pet-Store API!"), "pet store api ");
/// ```
#[must_use]
pub fn normalize_text(s: &str) -> String {
    NON_WORD.replace_all(&s.to_lowercase(), " ").into_owned()
}

/// Splits normalized text into its non-empty words, in order and with
/// repeats.
#[must_use]
pub fn words(s: &str) -> Vec<String> {
    normalize_text(s)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Canonicalizes a path template.
///
/// ```rust
/// use apidedup::similarity::normalize_path;
///
/// assert_eq!(normalize_path("/Users/:userId/"), "/users/{param}");
/// assert_eq!(normalize_path("/users/[id]"), "/users/{param}");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let replaced = PATH_PARAMS.replace_all(path.trim(), PATH_PARAM);
    replaced.to_lowercase().trim_end_matches('/').to_string()
}

/// Strips a conventional suffix from a schema name and lowercases it.
///
/// ```rust
/// use apidedup::similarity::normalize_schema_name;
///
/// assert_eq!(normalize_schema_name("PetDTO"), "pet");
/// assert_eq!(normalize_schema_name("UserViewModel"), "user");
/// assert_eq!(normalize_schema_name("petdto"), "petdto");
/// ```
#[must_use]
pub fn normalize_schema_name(name: &str) -> String {
    SCHEMA_SUFFIX.replace(name.trim(), "").to_lowercase()
}
