//! Raw pattern families used for both structured extraction and the
//! confidence score's "non-empty raw-pattern group" signal (spec.md §4.4).
//!
//! These are fixed, hand-authored regexes run *against* untrusted proposal
//! text — not regexes compiled *from* it — so they sit outside the
//! dangerous-pattern guard in `governance_core::pattern`, the same way the
//! teacher's own `command_safety` heuristics apply fixed detector regexes to
//! arbitrary shell input without routing through the user-regex guard.

use once_cell::sync::Lazy;
use regex::Regex;

/// `use X tool`, `execute X`, `call X` — tokens resembling tool names.
pub static TOOL_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:use|execute|call|invoke|run)\s+(?:the\s+)?([a-zA-Z][\w-]*)\s*(?:tool)?\b").unwrap()
});

/// Path-shaped fragments: optional leading `./` or `/`, segments, and a
/// common source-file extension.
pub static FILE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b((?:\.{1,2}/|/)?[\w.-]+(?:/[\w.-]+)*\.(?:rs|ts|tsx|js|jsx|py|go|java|rb|c|cc|cpp|h|hpp|json|toml|ya?ml|md|txt|sh))\b",
    )
    .unwrap()
});

/// Obligation/prohibition/quantitative/confirmation vocabulary — presence of
/// any is a raw behavioral signal even before structured extraction.
pub static BEHAVIOR_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(must not|never|always|require[sd]?|forbid(?:den)?|prohibit(?:ed)?|allow(?:ed)?|deny|denied|limit|maximum|timeout|rate|quota|confirm(?:ation)?|approv(?:al|e))\b",
    )
    .unwrap()
});

pub fn tool_mentions(text: &str) -> Vec<String> {
    TOOL_MENTION
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

pub fn file_fragments(text: &str) -> Vec<String> {
    FILE_FRAGMENT
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

pub fn behavior_words(text: &str) -> Vec<String> {
    BEHAVIOR_WORD
        .captures_iter(text)
        .map(|c| c[1].to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_mentions_extracts_the_tool_name() {
        let text = "You may use the search tool but never call rm.";
        let mentions = tool_mentions(text);
        assert!(mentions.iter().any(|m| m.eq_ignore_ascii_case("search")));
        assert!(mentions.iter().any(|m| m.eq_ignore_ascii_case("rm")));
    }

    #[test]
    fn file_fragments_extracts_source_paths() {
        let text = "Only touch ./src/main.rs and config/app.toml.";
        let frags = file_fragments(text);
        assert!(frags.contains(&"./src/main.rs".to_string()));
        assert!(frags.contains(&"config/app.toml".to_string()));
    }

    #[test]
    fn behavior_words_detects_obligation_vocabulary() {
        let text = "You must not delete files and should always confirm first.";
        let words = behavior_words(text);
        assert!(words.iter().any(|w| w == "must not"));
        assert!(words.iter().any(|w| w == "always"));
        assert!(words.iter().any(|w| w == "confirm"));
    }
}
