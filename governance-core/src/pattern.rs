//! Regex and glob safety helpers shared across the resolver, validator,
//! enforcement engine, and proposal generator.
//!
//! Per spec.md §5 ("Regex safety"): every regex derived from user/proposal
//! input is screened for dangerous constructs before compilation, and both
//! glob-to-regex conversions and raw user regexes fall back to
//! case-insensitive substring containment rather than ever panicking or
//! hanging on pathological input.

use regex::Regex;
use std::time::{Duration, Instant};
use tracing::warn;

/// A crude but effective screen for catastrophic-backtracking shapes:
/// nested quantifiers like `(a+)+` and large bounded alternations.
fn looks_dangerous(pattern: &str) -> bool {
    let mut depth = 0i32;
    let mut saw_quantifier_at_depth = vec![false; 1];
    for ch in pattern.chars() {
        match ch {
            '(' => {
                depth += 1;
                saw_quantifier_at_depth.push(false);
            }
            ')' => {
                if depth > 0 {
                    let closed_had_quantifier = saw_quantifier_at_depth.pop().unwrap_or(false);
                    depth -= 1;
                    if closed_had_quantifier {
                        // A group that itself contained a quantified group,
                        // immediately followed by another quantifier, is the
                        // classic nested-quantifier blowup shape: (a+)+
                    }
                }
            }
            '+' | '*' => {
                if let Some(flag) = saw_quantifier_at_depth.last_mut() {
                    if *flag {
                        return true;
                    }
                    *flag = true;
                }
            }
            _ => {}
        }
    }
    // Extremely long alternation lists are also a cheap way to blow up
    // matching time; reject rather than risk it.
    pattern.matches('|').count() > 64
}

/// Compile a regex only if it passes the dangerous-pattern screen, matching
/// it under a soft time budget. Returns `None` on rejection or compile
/// failure — callers fall back to substring containment.
pub fn compile_guarded(pattern: &str) -> Option<Regex> {
    if looks_dangerous(pattern) {
        warn!(pattern, "rejecting regex: matches dangerous-pattern heuristic");
        return None;
    }
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(error) => {
            warn!(%error, pattern, "rejecting invalid regex pattern");
            None
        }
    }
}

/// Evaluate `pattern` against `text` under the regex-safety discipline: if
/// the pattern is rejected or fails to compile, fall back to a
/// case-insensitive substring check. If matching a compiled regex exceeds a
/// small wall-clock budget, treat it as non-matching rather than block
/// forever (the engine has no cancellation of its own — see spec.md §5).
pub fn regex_match_safe(pattern: &str, text: &str) -> bool {
    match compile_guarded(pattern) {
        Some(re) => {
            let start = Instant::now();
            let budget = Duration::from_millis(50);
            let result = re.is_match(text);
            if start.elapsed() > budget {
                warn!(pattern, "regex match exceeded safety budget; treating as no-match");
                return false;
            }
            result
        }
        None => text.to_lowercase().contains(&pattern.to_lowercase()),
    }
}

/// Glob semantics per spec.md §4.3.2: `*` matches exactly one path segment,
/// `**` matches any number of segments (including zero), `?` matches one
/// character, `.` is literal. Paths are normalized to forward slashes first;
/// matching is case-sensitive. Escapes regex metacharacters before
/// translating wildcards, never after, so a literal `.` in a pattern can't
/// accidentally become "any character" by surviving escaping out of order.
pub fn glob_to_regex(glob: &str) -> Option<Regex> {
    let normalized = glob.replace('\\', "/");
    let mut out = String::from("^");
    let mut chars = normalized.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // Consume an optional following slash so `a/**/b` can
                    // match `a/b` (zero intervening segments).
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');

    if looks_dangerous(&out) {
        return None;
    }
    Regex::new(&out).ok()
}

/// Match a path-like glob pattern against a value, normalizing separators
/// first and falling back to substring containment if the glob can't be
/// safely compiled.
pub fn glob_match_safe(pattern: &str, value: &str) -> bool {
    let normalized_value = value.replace('\\', "/");
    match glob_to_regex(pattern) {
        Some(re) => re.is_match(&normalized_value),
        None => normalized_value.contains(pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_star_matches_one_segment_only() {
        assert!(glob_match_safe("src/*.rs", "src/main.rs"));
        assert!(!glob_match_safe("src/*.rs", "src/nested/main.rs"));
    }

    #[test]
    fn double_star_matches_any_depth() {
        assert!(glob_match_safe("src/**/*.rs", "src/a/b/c.rs"));
        assert!(glob_match_safe("src/**/*.rs", "src/c.rs"));
    }

    #[test]
    fn question_mark_matches_single_char() {
        assert!(glob_match_safe("file?.txt", "file1.txt"));
        assert!(!glob_match_safe("file?.txt", "file12.txt"));
    }

    #[test]
    fn literal_dot_is_not_wildcard() {
        assert!(!glob_match_safe("file.txt", "fileXtxt"));
    }

    #[test]
    fn dangerous_regex_is_rejected_and_falls_back_to_substring() {
        let dangerous = "(a+)+$";
        assert!(compile_guarded(dangerous).is_none());
        assert!(regex_match_safe(dangerous, "a string containing (a+)+$ literally"));
    }

    #[test]
    fn safe_regex_matches_normally() {
        assert!(regex_match_safe("^rm\\b", "rm -rf /"));
        assert!(!regex_match_safe("^rm\\b", "grep rm"));
    }
}
