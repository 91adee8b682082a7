// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tcl `string match`-style glob matching, used for the Method breakpoint's
//! `object_pattern`.
//!
//! Supports `*` (any run of characters), `?` (any single character), and
//! `[...]` character classes, including `[!...]`/`[^...]` negation and
//! `a-z` ranges. No crate in the retrieval pack offers this surface (see
//! `DESIGN.md`), so it's implemented directly, the same way `hitspec.rs`
//! implements its own small predicate language rather than reaching for a
//! parser combinator crate for four branches.

pub fn glob_match(name: &str, pattern: &str) -> bool {
    let name: Vec<char> = name.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    match_from(&name, 0, &pattern, 0)
}

fn match_from(name: &[char], mut ni: usize, pattern: &[char], mut pi: usize) -> bool {
    while pi < pattern.len() {
        match pattern[pi] {
            '*' => {
                // collapse consecutive '*'
                while pi < pattern.len() && pattern[pi] == '*' {
                    pi += 1;
                }
                if pi == pattern.len() {
                    return true;
                }
                for start in ni..=name.len() {
                    if match_from(name, start, pattern, pi) {
                        return true;
                    }
                }
                return false;
            }
            '?' => {
                if ni >= name.len() {
                    return false;
                }
                ni += 1;
                pi += 1;
            }
            '[' => {
                let Some((matched, next_pi)) = match_class(name, ni, pattern, pi) else {
                    return false;
                };
                if !matched {
                    return false;
                }
                ni += 1;
                pi = next_pi;
            }
            '\\' if pi + 1 < pattern.len() => {
                if ni >= name.len() || name[ni] != pattern[pi + 1] {
                    return false;
                }
                ni += 1;
                pi += 2;
            }
            literal => {
                if ni >= name.len() || name[ni] != literal {
                    return false;
                }
                ni += 1;
                pi += 1;
            }
        }
    }
    ni == name.len()
}

/// Matches a single `[...]` class against `name[ni]`, returning
/// `(did_match, index_just_past_the_closing_bracket)`. Returns `None` if the
/// class itself is malformed (unterminated).
fn match_class(name: &[char], ni: usize, pattern: &[char], pi: usize) -> Option<(bool, usize)> {
    debug_assert_eq!(pattern[pi], '[');
    let mut i = pi + 1;
    let negate = i < pattern.len() && (pattern[i] == '!' || pattern[i] == '^');
    if negate {
        i += 1;
    }
    let class_start = i;
    // Find the closing bracket; a ']' as the first class character is literal.
    if i < pattern.len() && pattern[i] == ']' {
        i += 1;
    }
    while i < pattern.len() && pattern[i] != ']' {
        i += 1;
    }
    if i >= pattern.len() {
        return None;
    }
    let class_end = i; // index of ']'
    let next_pi = i + 1;

    if ni >= name.len() {
        return Some((false, next_pi));
    }
    let c = name[ni];
    let mut in_class = false;
    let mut j = class_start;
    while j < class_end {
        if j + 2 < class_end && pattern[j + 1] == '-' {
            let (lo, hi) = (pattern[j], pattern[j + 2]);
            if lo <= c && c <= hi {
                in_class = true;
            }
            j += 3;
        } else {
            if pattern[j] == c {
                in_class = true;
            }
            j += 1;
        }
    }
    Some((in_class != negate, next_pi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal() {
        assert!(glob_match("foo", "foo"));
        assert!(!glob_match("foo", "bar"));
    }

    #[test]
    fn star_and_question() {
        assert!(glob_match("FooBar", "Foo*"));
        assert!(glob_match("FooBar", "*Bar"));
        assert!(glob_match("FooBar", "*"));
        assert!(glob_match("Foo", "Fo?"));
        assert!(!glob_match("Foo", "Fo??"));
        assert!(glob_match("", "*"));
        assert!(!glob_match("x", ""));
    }

    #[test]
    fn character_classes() {
        assert!(glob_match("widget1", "widget[0-9]"));
        assert!(!glob_match("widgetA", "widget[0-9]"));
        assert!(glob_match("widgetA", "widget[!0-9]"));
        assert!(glob_match("cat", "[cb]at"));
        assert!(!glob_match("dat", "[cb]at"));
    }

    #[test]
    fn namespaced_object_patterns() {
        assert!(glob_match("::app::Widget1", "::app::Widget*"));
        assert!(!glob_match("::other::Widget1", "::app::Widget*"));
    }
}