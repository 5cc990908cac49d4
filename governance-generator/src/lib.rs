//! Heuristic extraction of structured constraint suggestions from free-text
//! protocol proposals, and assembly of those suggestions into protocols
//! (spec.md §4.4).

pub mod builder;
pub mod confidence;
pub mod extract;
pub mod parser;
pub mod patterns;
pub mod suggestion;

pub use builder::{create_protocol_from_proposal, merge_protocols, CreateProtocolOptions};
pub use parser::{parse_proposal, ParsedProposal};
pub use suggestion::{dedup_constraints, SuggestedConstraint};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use governance_core::ConstraintRule;

    #[test]
    fn end_to_end_proposal_becomes_a_protocol_with_matching_constraints() {
        let text = "Only use search and read_file tools. Don't touch ./secrets/keys.pem. \
                     Require confirmation before any destructive action. Max 5 iterations.";
        let parsed = parse_proposal(text);
        assert!(parsed.is_valid);
        assert!(!parsed.suggested_constraints.is_empty());

        let protocol = create_protocol_from_proposal(
            "generated-protocol",
            &parsed,
            CreateProtocolOptions::default(),
            Utc::now(),
        );
        assert_eq!(protocol.constraints.len(), parsed.suggested_constraints.len());
        assert!(protocol
            .constraints
            .iter()
            .any(|c| matches!(c.rule, ConstraintRule::ToolRestriction { .. })));
    }

    #[test]
    fn merging_generated_protocols_unions_their_constraints() {
        let first = create_protocol_from_proposal(
            "p1",
            &parse_proposal("Only use search."),
            CreateProtocolOptions {
                priority: Some(1),
                ..Default::default()
            },
            Utc::now(),
        );
        let second = create_protocol_from_proposal(
            "p2",
            &parse_proposal("Don't touch ./secrets/keys.pem."),
            CreateProtocolOptions {
                priority: Some(2),
                ..Default::default()
            },
            Utc::now(),
        );
        let merged = merge_protocols(&[first, second], "merged", "Merged", Utc::now());
        assert_eq!(merged.priority, 2);
        assert_eq!(merged.extends, vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(merged.constraints.len(), 2);
    }
}
