//! Pre/post-execution constraint evaluation and continuous monitoring
//! (spec.md §4.3). Built on top of `governance-resolver`'s effective
//! constraints and `governance-core`'s data model.

pub mod applicability;
pub mod blocking;
pub mod engine;
pub mod evaluators;

pub use applicability::subject_for;
pub use blocking::should_block_execution;
pub use engine::EnforcementEngine;
pub use evaluators::{evaluate, EvalOutcome};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use governance_core::{
        ActionType, Clock, ConstraintRule, ContextMatcher, EnforcementConfig, EnforcementMode,
        ExecutionContext, FixedClock, InMemoryRegistry, OnViolation, Protocol, ProtocolConstraint,
        ProtocolRegistry, Severity,
    };
    use std::sync::Arc;

    fn strict_protocol(id: &str, priority: i64, constraints: Vec<ProtocolConstraint>) -> Protocol {
        Protocol {
            id: id.to_string(),
            version: "1.0.0".to_string(),
            name: None,
            description: None,
            priority,
            constraints,
            enforcement: EnforcementConfig {
                mode: EnforcementMode::Strict,
                on_violation: OnViolation::Block,
                ..EnforcementConfig::default()
            },
            applicable_contexts: ContextMatcher::default(),
            extends: Vec::new(),
            requires: Vec::new(),
            conflicts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn tool_call_ctx(name: &str, worker_id: &str, timestamp: chrono::DateTime<Utc>) -> ExecutionContext {
        ExecutionContext {
            action_type: ActionType::ToolCall,
            action_name: name.to_string(),
            action_params: None,
            target_files: None,
            source_files: None,
            output_content: None,
            target_host: None,
            command: None,
            command_args: None,
            git_operation: None,
            feature_id: None,
            worker_id: Some(worker_id.to_string()),
            project_dir: None,
            timestamp,
            sequence_number: None,
        }
    }

    /// S1: deny beats allow, and a strict-mode protocol blocks the action.
    #[test]
    fn scenario_s1_deny_beats_allow_and_blocks_under_strict_mode() {
        let registry = InMemoryRegistry::new();
        let constraint = ProtocolConstraint {
            id: "c1".to_string(),
            rule: ConstraintRule::ToolRestriction {
                allowed_tools: vec!["rm".to_string(), "ls".to_string()],
                denied_tools: vec!["rm".to_string()],
                tool_patterns: vec![],
                require_approval: vec![],
            },
            severity: Severity::Error,
            message: "rm is denied".to_string(),
            enabled: true,
        };
        let protocol = strict_protocol("p1", 10, vec![constraint]);
        registry.upsert_protocol(protocol);
        registry.activate("p1");

        let clock = Arc::new(FixedClock::new(Utc::now()));
        let engine = EnforcementEngine::new(clock);

        let ctx = tool_call_ctx("rm", "worker-1", Utc::now());
        let result = engine.validate_pre_execution(&ctx, &registry);

        assert!(!result.allowed);
        assert!(result.should_block);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].constraint_id, "c1");
    }

    /// S3: a fifth recorded action within the rate window, then a sixth
    /// pre-execution check, trips rateLimitPerMinute=5.
    #[test]
    fn scenario_s3_rate_limit_trips_on_sixth_call_within_a_minute() {
        let registry = InMemoryRegistry::new();
        let constraint = ProtocolConstraint {
            id: "rate1".to_string(),
            rule: ConstraintRule::Temporal {
                rate_limit_per_minute: Some(5),
                rate_limit_per_hour: None,
                cooldown_seconds: None,
                valid_from: None,
                valid_until: None,
                allowed_hours: vec![],
                allowed_days: vec![],
            },
            severity: Severity::Error,
            message: "rate limited".to_string(),
            enabled: true,
        };
        let protocol = strict_protocol("rl", 0, vec![constraint]);
        registry.upsert_protocol(protocol);
        registry.activate("rl");

        let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(base));
        let engine = EnforcementEngine::new(clock.clone());

        engine.start_monitoring("feat", "worker-1");
        for i in 0..5 {
            let ctx = tool_call_ctx("search", "worker-1", base + chrono::Duration::seconds(i));
            engine.record_action(&ctx);
        }

        let sixth_ctx = tool_call_ctx("search", "worker-1", base + chrono::Duration::seconds(5));
        let result = engine.validate_pre_execution(&sixth_ctx, &registry);

        assert!(!result.allowed);
        assert_eq!(result.violations[0].constraint_id, "rate1");
        assert!(result.violations[0].message.contains("rateLimitPerMinute"));
    }

    /// S5: 15 consecutive tool uses of the same name trip the stuck-worker
    /// alert on `checkMonitoringAlerts`.
    #[test]
    fn scenario_s5_stuck_worker_alert_after_fifteen_repeats() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let engine = EnforcementEngine::new(clock);
        engine.start_monitoring("feat", "worker-1");

        for i in 0..15 {
            let ctx = tool_call_ctx("grep", "worker-1", Utc::now() + chrono::Duration::seconds(i));
            engine.record_action(&ctx);
        }

        let alerts = engine.check_monitoring_alerts("worker-1");
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("stuck"));
        assert!(alerts[0].message.contains("grep"));
    }

    #[test]
    fn unapplicable_protocol_is_skipped_via_context_matcher() {
        let registry = InMemoryRegistry::new();
        let mut protocol = strict_protocol(
            "scoped",
            0,
            vec![ProtocolConstraint {
                id: "c1".to_string(),
                rule: ConstraintRule::ToolRestriction {
                    allowed_tools: vec![],
                    denied_tools: vec!["bash".to_string()],
                    tool_patterns: vec![],
                    require_approval: vec![],
                },
                severity: Severity::Error,
                message: "no bash".to_string(),
                enabled: true,
            }],
        );
        protocol.applicable_contexts.worker_id = Some(governance_core::MatchPatterns {
            include: vec!["other-worker".to_string()],
            exclude: vec![],
        });
        registry.upsert_protocol(protocol);
        registry.activate("scoped");

        let clock = Arc::new(FixedClock::new(Utc::now()));
        let engine = EnforcementEngine::new(clock);
        let ctx = tool_call_ctx("bash", "worker-1", Utc::now());
        let result = engine.validate_pre_execution(&ctx, &registry);

        assert!(result.allowed);
        assert!(result.applied_protocols.is_empty());
    }

    #[test]
    fn post_execution_flags_touched_prohibited_path() {
        let registry = InMemoryRegistry::new();
        let protocol = strict_protocol(
            "files",
            0,
            vec![ProtocolConstraint {
                id: "fa1".to_string(),
                rule: ConstraintRule::FileAccess {
                    allowed_paths: vec![],
                    denied_paths: vec!["/etc/**".to_string()],
                    read_only: vec![],
                    write_only: vec![],
                    allowed_extensions: vec![],
                    denied_extensions: vec![],
                    max_file_size: None,
                },
                severity: Severity::Error,
                message: "no touching /etc".to_string(),
                enabled: true,
            }],
        );
        registry.upsert_protocol(protocol);
        registry.activate("files");

        let clock = Arc::new(FixedClock::new(Utc::now()));
        let engine = EnforcementEngine::new(clock);
        let ctx = tool_call_ctx("edit_file", "worker-1", Utc::now());
        let outcome = governance_core::ExecutionOutcome {
            success: true,
            output: None,
            side_effects: Some(governance_core::SideEffects {
                files_modified: vec!["/etc/passwd".to_string()],
                ..Default::default()
            }),
            error: None,
        };

        let result = engine.verify_post_execution(&ctx, &outcome, &registry);
        assert!(!result.allowed);
        assert!(result.violations[0].message.starts_with("[POST-EXECUTION]"));
    }
}
