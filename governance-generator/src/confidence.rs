//! Confidence scoring for a parsed proposal (spec.md §4.4). Advisory only —
//! downstream validation is the authoritative gate, not this number.

const EXPLICIT_KEYWORDS: [&str; 6] = ["constraint", "rule", "policy", "restrict", "limit", "require"];

pub fn score(
    text: &str,
    constraint_count: usize,
    tool_signal: bool,
    file_signal: bool,
    behavior_signal: bool,
) -> f64 {
    let mut confidence = (0.15 * constraint_count as f64).min(0.45);

    for signal in [tool_signal, file_signal, behavior_signal] {
        if signal {
            confidence += 0.1;
        }
    }

    let len = text.len();
    for threshold in [100, 300, 500] {
        if len >= threshold {
            confidence += 0.05;
        }
    }

    let lower = text.to_lowercase();
    let keyword_matches = EXPLICIT_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count();
    confidence += (0.05 * keyword_matches as f64).min(0.1);

    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_signals_yield_zero_confidence() {
        assert_eq!(score("short", 0, false, false, false), 0.0);
    }

    #[test]
    fn score_is_clamped_to_one() {
        let long_text = "a".repeat(600);
        let confidence = score(&long_text, 10, true, true, true);
        assert!(confidence <= 1.0);
    }

    #[test]
    fn constraint_count_is_capped_at_0_45() {
        assert_eq!(score("x", 100, false, false, false), 0.45);
    }
}
