//! Text sanitization for PCI database strings
//!
//! Vendor names become a lowercase DNS-label-like word, product names become
//! an uppercase underscore-delimited token. Every function here is total: any
//! input, including the empty string, produces a (possibly empty) output.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("non-alphanumeric pattern is valid"));

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("bracket pattern is valid"));

// ASCII whitespace only: tab, newline, form feed, carriage return, space
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\n\x0C\r ]+").expect("whitespace pattern is valid"));

static NON_PRODUCT_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_.]+").expect("product filter pattern is valid"));

/// Remove every character outside `[A-Za-z0-9]`
pub fn strip(s: &str) -> String {
    NON_ALPHANUMERIC.replace_all(s, "").into_owned()
}

/// Extract the short vendor alias from a bracketed segment.
///
/// `"Advanced Micro Devices, Inc. [AMD/ATI]"` yields `"AMD"`: the text inside
/// the first complete `[...]`, cut at the first `/`, then stripped.
///
/// Returns `None` only when there is no complete non-empty bracket pair. An
/// alias with nothing alphanumeric before the slash is `Some("")`.
pub fn extract_vendor_alias(vendor_name: &str) -> Option<String> {
    let inner = BRACKETED.captures(vendor_name)?.get(1)?.as_str();
    let pre_slash = inner.split('/').next().unwrap_or_default();
    Some(strip(pre_slash))
}

/// Derive the lowercase vendor label used in front of `.com`.
///
/// Prefers the bracketed alias. A `[` without a closing `]` counts as no
/// alias, and the first whitespace delimited word is used instead. The label
/// may be empty.
pub fn vendor_label(vendor_name: &str) -> String {
    let alias = if vendor_name.contains('[') {
        extract_vendor_alias(vendor_name)
    } else {
        None
    };
    let base = alias
        .unwrap_or_else(|| strip(vendor_name.split_whitespace().next().unwrap_or_default()));

    base.replace(' ', "").to_ascii_lowercase()
}

/// Stage 1: trim leading and trailing whitespace
pub fn trim_stage(s: &str) -> String {
    s.trim().to_string()
}

/// Stage 2: uppercase
///
/// ASCII-only: non-ASCII letters are discarded by [`filter_stage`] regardless.
pub fn uppercase_stage(s: &str) -> String {
    s.to_ascii_uppercase()
}

/// Stage 3: every `/` and `.` becomes `_`
pub fn substitute_stage(s: &str) -> String {
    s.replace(|c: char| c == '/' || c == '.', "_")
}

/// Stage 4: each run of whitespace becomes a single `_`
pub fn collapse_whitespace_stage(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, "_").into_owned()
}

/// Stage 5: drop everything outside `[A-Za-z0-9_.]`
pub fn filter_stage(s: &str) -> String {
    NON_PRODUCT_CHAR.replace_all(s, "").into_owned()
}

/// Turn a product name into an uppercase resource-name segment.
///
/// Stage order is fixed; reordering changes the output for names mixing
/// slashes, dots and whitespace.
pub fn sanitize_product(product_name: &str) -> String {
    const STAGES: [fn(&str) -> String; 5] = [
        trim_stage,
        uppercase_stage,
        substitute_stage,
        collapse_whitespace_stage,
        filter_stage,
    ];

    STAGES
        .iter()
        .fold(product_name.to_string(), |acc, stage| stage(&acc))
}
