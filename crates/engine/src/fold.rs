//! Case-insensitive identity for product labels and keys.
//!
//! Matching folds case; storage keeps whatever casing arrived first.

/// True when `a` and `b` are the same string under simple case folding.
pub fn same(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.to_lowercase() == b.to_lowercase()
}

/// True when `items` holds a case-insensitive match for `needle`.
pub fn contains(items: &[String], needle: &str) -> bool {
    items.iter().any(|item| same(item, needle))
}

/// True when the two lists share at least one case-insensitive match.
pub fn overlaps(left: &[String], right: &[String]) -> bool {
    left.iter().any(|l| contains(right, l))
}

/// Push `value` unless a case-insensitive match is already present.
/// Returns true when the list grew.
pub fn push_unique(items: &mut Vec<String>, value: &str) -> bool {
    if contains(items, value) {
        return false;
    }
    items.push(value.to_string());
    true
}

/// Drop later case-insensitive duplicates, keeping the first occurrence.
pub fn dedup(items: &mut Vec<String>) {
    let mut kept: Vec<String> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if !contains(&kept, &item) {
            kept.push(item);
        }
    }
    *items = kept;
}
