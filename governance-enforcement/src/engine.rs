//! `EnforcementEngine`: pre/post-execution validation plus the
//! continuous-monitoring lifecycle (spec.md §4.3). Monitoring state is
//! exclusively owned here, keyed by `workerId`, one entry per worker
//! behind `DashMap`'s own per-shard locking — the concurrency model the
//! teacher's command cache uses for its own per-key state, generalized
//! from a single global lock to one lock per worker (spec.md §5).

use crate::applicability::subject_for;
use crate::blocking::should_block_execution;
use crate::evaluators::evaluate;
use chrono::Utc;
use dashmap::DashMap;
use governance_core::{
    ActionType, Clock, ExecutionContext, ExecutionOutcome, MonitoringAlert, MonitoringState,
    AlertSeverity, EnforcementResult, ProtocolRegistry, Severity, SharedClock, SuggestedAction,
    Violation,
};
use governance_resolver::Resolver;
use std::time::Instant;

pub struct EnforcementEngine {
    clock: SharedClock,
    resolver: Resolver,
    monitoring: DashMap<String, MonitoringState>,
}

impl EnforcementEngine {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            resolver: Resolver::new(),
            monitoring: DashMap::new(),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    // ---- Monitoring lifecycle (spec.md §4.3.3) ----

    pub fn start_monitoring(&self, feature_id: &str, worker_id: &str) {
        tracing::debug!(feature_id, worker_id, "starting monitoring");
        self.monitoring
            .insert(worker_id.to_string(), MonitoringState::new(worker_id, self.clock.now_utc()));
    }

    pub fn stop_monitoring(&self, worker_id: &str) -> Option<MonitoringState> {
        self.monitoring.remove(worker_id).map(|(_, state)| state)
    }

    pub fn record_action(&self, ctx: &ExecutionContext) {
        let Some(worker_id) = &ctx.worker_id else {
            return;
        };
        let mut state = self
            .monitoring
            .entry(worker_id.clone())
            .or_insert_with(|| MonitoringState::new(worker_id.clone(), self.clock.now_utc()));
        let target_files = ctx.target_files.clone().unwrap_or_default();
        state.record_action(ctx.action_type, &ctx.action_name, &target_files, self.clock.now_ms(), self.clock.now_utc());
    }

    pub fn check_monitoring_alerts(&self, worker_id: &str) -> Vec<MonitoringAlert> {
        let Some(mut state) = self.monitoring.get_mut(worker_id) else {
            return Vec::new();
        };
        if let Some((tool, count)) = state.stuck_tool() {
            let alert = MonitoringAlert {
                id: format!("{worker_id}-stuck-{}", state.next_alert_seq()),
                worker_id: worker_id.to_string(),
                severity: AlertSeverity::Warning,
                message: format!("Worker appears stuck: tool '{tool}' used {count} times in recent actions"),
                created_at: self.clock.now_utc(),
                acknowledged: false,
            };
            state.push_alert(alert);
        }
        state.active_alerts.iter().cloned().collect()
    }

    pub fn acknowledge_alert(&self, worker_id: &str, alert_id: &str) -> bool {
        self.monitoring
            .get_mut(worker_id)
            .map(|mut state| state.acknowledge_alert(alert_id))
            .unwrap_or(false)
    }

    // ---- Pre/post execution (spec.md §4.3.1, §4.3.6) ----

    pub fn validate_pre_execution(&self, ctx: &ExecutionContext, registry: &dyn ProtocolRegistry) -> EnforcementResult {
        let start = Instant::now();
        let subject = subject_for(ctx);

        let mut active = registry.get_active_protocols();
        active.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut applied_protocols = Vec::new();
        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        for protocol in &active {
            if !protocol.enforcement.pre_execution_validation {
                continue;
            }
            if !protocol.applicable_contexts.applies(&subject) {
                continue;
            }
            applied_protocols.push(protocol.id.clone());

            let effective = self.resolver.get_effective_constraints(&protocol.id, registry);
            for constraint in effective.constraints.values() {
                if !constraint.enabled {
                    continue;
                }
                let mut monitoring_entry = ctx.worker_id.as_ref().map(|id| self.monitoring.entry(id.clone()).or_insert_with(|| MonitoringState::new(id.clone(), self.clock.now_utc())));
                let outcome = evaluate(
                    &constraint.rule,
                    ctx,
                    monitoring_entry.as_deref_mut(),
                    self.clock.as_ref(),
                );

                if !outcome.passed {
                    let record = Violation {
                        protocol_id: protocol.id.clone(),
                        constraint_id: constraint.id.clone(),
                        severity: constraint.severity,
                        message: outcome.message.clone().unwrap_or_default(),
                        context: outcome.context.clone(),
                        remediation: outcome.remediation.clone(),
                    };
                    if constraint.severity == Severity::Error {
                        violations.push(record);
                    } else {
                        warnings.push(record);
                    }
                } else if let Some(message) = &outcome.message {
                    warnings.push(Violation {
                        protocol_id: protocol.id.clone(),
                        constraint_id: constraint.id.clone(),
                        severity: constraint.severity,
                        message: message.clone(),
                        context: outcome.context.clone(),
                        remediation: outcome.remediation.clone(),
                    });
                }
            }
        }

        let should_block = should_block_execution(&violations, &active);
        let suggested_action = if violations.is_empty() {
            SuggestedAction::Proceed
        } else if should_block && violations.iter().any(|v| v.severity == Severity::Error) {
            SuggestedAction::Abort
        } else if should_block {
            SuggestedAction::Retry
        } else {
            SuggestedAction::Proceed
        };

        for violation in &violations {
            registry.record_violation(governance_core::ViolationRecord {
                protocol_id: violation.protocol_id.clone(),
                constraint_id: violation.constraint_id.clone(),
                feature_id: ctx.feature_id.clone(),
                worker_id: ctx.worker_id.clone(),
                severity: violation.severity,
                message: violation.message.clone(),
                context: violation.context.clone(),
            });
        }

        EnforcementResult {
            allowed: !should_block,
            violations,
            warnings,
            applied_protocols,
            evaluation_time_ms: start.elapsed().as_millis() as u64,
            should_block,
            suggested_action,
        }
    }

    pub fn verify_post_execution(
        &self,
        ctx: &ExecutionContext,
        outcome: &ExecutionOutcome,
        registry: &dyn ProtocolRegistry,
    ) -> EnforcementResult {
        let start = Instant::now();
        let subject = subject_for(ctx);
        let side_effects = outcome.side_effects.clone().unwrap_or_default();

        let mut touched_files: Vec<String> = Vec::new();
        touched_files.extend(side_effects.files_modified.iter().cloned());
        touched_files.extend(side_effects.files_created.iter().cloned());
        touched_files.extend(side_effects.files_deleted.iter().cloned());

        let mut file_ctx = ctx.clone();
        file_ctx.target_files = Some(touched_files);
        file_ctx.source_files = Some(Vec::new());

        let mut output_ctx = ctx.clone();
        output_ctx.action_type = ActionType::Output;
        output_ctx.output_content = outcome.output.clone();

        let active = registry.get_active_protocols();
        let mut applied_protocols = Vec::new();
        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        for protocol in &active {
            if !protocol.enforcement.post_execution_validation {
                continue;
            }
            if !protocol.applicable_contexts.applies(&subject) {
                continue;
            }
            applied_protocols.push(protocol.id.clone());

            let effective = self.resolver.get_effective_constraints(&protocol.id, registry);
            for constraint in effective.constraints.values() {
                if !constraint.enabled {
                    continue;
                }
                if matches!(&constraint.rule, governance_core::ConstraintRule::SideEffect { .. }) {
                    let network_violation = side_effects
                        .network_requests
                        .iter()
                        .any(|req| !evaluate_network_ok(&constraint.rule, &req.host));
                    let git_violation = side_effects
                        .git_changes
                        .iter()
                        .any(|change| !evaluate_git_ok(&constraint.rule, &change.operation));
                    if network_violation || git_violation {
                        push_post_violation(
                            &mut violations,
                            &mut warnings,
                            protocol.id.clone(),
                            constraint.id.clone(),
                            constraint.severity,
                            "[POST-EXECUTION] recorded network or git side effect violates side_effect constraint".to_string(),
                        );
                    }
                    continue;
                }

                let eval_ctx = match &constraint.rule {
                    governance_core::ConstraintRule::FileAccess { .. } => &file_ctx,
                    governance_core::ConstraintRule::OutputFormat { .. } => &output_ctx,
                    _ => continue,
                };

                let result = evaluate(&constraint.rule, eval_ctx, None, self.clock.as_ref());
                if !result.passed {
                    let message = format!("[POST-EXECUTION] {}", result.message.unwrap_or_default());
                    push_post_violation(&mut violations, &mut warnings, protocol.id.clone(), constraint.id.clone(), constraint.severity, message);
                }
            }
        }

        let should_block = violations.iter().any(|v| v.severity == Severity::Error);
        let suggested_action = if violations.is_empty() {
            SuggestedAction::Proceed
        } else {
            SuggestedAction::Escalate
        };

        for violation in &violations {
            registry.record_violation(governance_core::ViolationRecord {
                protocol_id: violation.protocol_id.clone(),
                constraint_id: violation.constraint_id.clone(),
                feature_id: ctx.feature_id.clone(),
                worker_id: ctx.worker_id.clone(),
                severity: violation.severity,
                message: violation.message.clone(),
                context: violation.context.clone(),
            });
        }

        EnforcementResult {
            allowed: !should_block,
            violations,
            warnings,
            applied_protocols,
            evaluation_time_ms: start.elapsed().as_millis() as u64,
            should_block,
            suggested_action,
        }
    }
}

fn push_post_violation(
    violations: &mut Vec<Violation>,
    warnings: &mut Vec<Violation>,
    protocol_id: String,
    constraint_id: String,
    severity: Severity,
    message: String,
) {
    let violation = Violation {
        protocol_id,
        constraint_id,
        severity,
        message,
        context: Some(serde_json::json!({"phase": "post-execution"})),
        remediation: None,
    };
    if severity == Severity::Error {
        violations.push(violation);
    } else {
        warnings.push(violation);
    }
}

fn evaluate_network_ok(rule: &governance_core::ConstraintRule, host: &str) -> bool {
    let governance_core::ConstraintRule::SideEffect {
        allow_network,
        allowed_hosts,
        denied_hosts,
        ..
    } = rule
    else {
        return true;
    };
    if *allow_network == Some(false) {
        return false;
    }
    if denied_hosts.iter().any(|h| h == host) {
        return false;
    }
    if !allowed_hosts.is_empty() && !allowed_hosts.iter().any(|h| h == host) {
        return false;
    }
    true
}

fn evaluate_git_ok(rule: &governance_core::ConstraintRule, operation: &str) -> bool {
    let governance_core::ConstraintRule::SideEffect {
        allow_git_operations,
        allowed_git_ops,
        denied_git_ops,
        ..
    } = rule
    else {
        return true;
    };
    if *allow_git_operations == Some(false) {
        return false;
    }
    if denied_git_ops.iter().any(|d| operation.starts_with(d.as_str())) {
        return false;
    }
    if !allowed_git_ops.is_empty() && !allowed_git_ops.iter().any(|a| operation.starts_with(a.as_str())) {
        return false;
    }
    true
}
