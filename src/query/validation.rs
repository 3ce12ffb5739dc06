//! Leaf validators: identifier check, safe integer coercion, enum and string sanitizing.

use crate::query::PageRequest;
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_PAGE: u32 = 1;
pub const MAX_PAGE: u32 = 10_000;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

const MAX_SANITIZED_LEN: usize = 1000;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("static identifier pattern"))
}

/// True when `s` is safe to splice into SQL as a table or column name.
pub fn is_valid_identifier(s: &str) -> bool {
    identifier_re().is_match(s)
}

/// Parse a leading integer the way `parseInt` does: optional sign, then digits; anything after is ignored.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    // Saturate instead of failing on absurdly long digit runs.
    let n = rest[..digits_end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * n)
}

/// Coerce an untrusted value to an integer: malformed input yields `default`, out-of-range input is clamped.
pub fn parse_int_safe(value: Option<&str>, default: i64, min: Option<i64>, max: Option<i64>) -> i64 {
    let mut n = match value.and_then(parse_leading_int) {
        Some(n) => n,
        None => return default,
    };
    if let Some(min) = min {
        n = n.max(min);
    }
    if let Some(max) = max {
        n = n.min(max);
    }
    n
}

/// Page/pageSize are always coerced, never rejected.
pub fn validate_pagination(page: Option<&str>, page_size: Option<&str>) -> PageRequest {
    let page = parse_int_safe(page, DEFAULT_PAGE as i64, Some(1), Some(MAX_PAGE as i64));
    let page_size = parse_int_safe(
        page_size,
        DEFAULT_PAGE_SIZE as i64,
        Some(1),
        Some(MAX_PAGE_SIZE as i64),
    );
    PageRequest {
        page: page as u32,
        page_size: page_size as u32,
    }
}

/// Return `value` when it is one of `allowed`, otherwise `default`.
pub fn validate_enum<'a, T: PartialEq + ?Sized>(value: &'a T, allowed: &[&'a T], default: Option<&'a T>) -> Option<&'a T> {
    if allowed.iter().any(|a| *a == value) {
        Some(value)
    } else {
        default
    }
}

/// Trim, drop angle brackets, cap the length.
pub fn sanitize_string(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_SANITIZED_LEN)
        .collect()
}
