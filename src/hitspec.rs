// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Hit-count spec evaluation: a small, pure predicate language used by
//! breakpoints to decide, given the post-increment hit counter, whether this
//! particular hit should actually fire.
//!
//! Grammar (whitespace is never tolerated — any spec with leading, trailing,
//! or embedded whitespace around its number is treated as malformed and
//! evaluates to `false`):
//!
//! - empty or absent: always true
//! - `==N`: true exactly when the counter equals `N`
//! - `>=N`: true once the counter reaches `N` and for every hit after
//! - `multiple-of(N)`: true when the counter is a nonzero multiple of `N`

/// Evaluate a hit-count spec against the post-increment hit counter.
///
/// A malformed spec (bad prefix, non-digit body, or embedded whitespace)
/// evaluates to `false` rather than erroring — hit-spec checks run on the hot
/// dispatch path and must never abort evaluation of a breakpoint.
pub fn hit_spec_ok(spec: Option<&str>, hits: u64) -> bool {
    let spec = match spec {
        None => return true,
        Some(s) => s,
    };
    if spec.is_empty() {
        return true;
    }
    if spec.trim() != spec {
        return false;
    }

    if let Some(rest) = spec.strip_prefix("==") {
        return parse_u64(rest).map(|n| hits == n).unwrap_or(false);
    }
    if let Some(rest) = spec.strip_prefix(">=") {
        return parse_u64(rest).map(|n| hits >= n).unwrap_or(false);
    }
    if let Some(rest) = spec.strip_prefix("multiple-of(") {
        if let Some(inner) = rest.strip_suffix(')') {
            if let Some(n) = parse_u64(inner) {
                return n != 0 && hits != 0 && hits % n == 0;
            }
        }
        return false;
    }
    false
}

fn parse_u64(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
