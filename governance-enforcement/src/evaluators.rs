//! The seven constraint evaluators (spec.md §4.3.2). Each is a pure
//! function of `(rule, ctx)` — any irrelevant rule-type/action-type
//! combination returns `passed = true`. `MonitoringState` is threaded in
//! only where a rule type needs it (behavioral iteration counts, temporal
//! rate limits).

use governance_core::{ActionType, Clock, ConstraintRule, ExecutionContext, MonitoringState};

/// Result of evaluating one constraint rule against one context. A
/// `passed = true` result can still carry a `message` — this is how
/// `tool_restriction`'s `requireApproval` surfaces a warning-shaped pass
/// (spec.md §9's open question: downstream code must treat this as a
/// signal to enter an approval flow, not as a failure).
#[derive(Debug, Clone, Default)]
pub struct EvalOutcome {
    pub passed: bool,
    pub message: Option<String>,
    pub context: Option<serde_json::Value>,
    pub remediation: Option<String>,
}

impl EvalOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    pub fn pass_with_warning(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn fail_with_remediation(message: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: Some(message.into()),
            remediation: Some(remediation.into()),
            ..Default::default()
        }
    }
}

fn eval_tool_restriction(
    allowed_tools: &[String],
    denied_tools: &[String],
    tool_patterns: &[String],
    require_approval: &[String],
    ctx: &ExecutionContext,
) -> EvalOutcome {
    if ctx.action_type != ActionType::ToolCall {
        return EvalOutcome::pass();
    }
    let name = ctx.action_name.as_str();

    // Deny beats allow (invariant 2, spec.md §8).
    if denied_tools.iter().any(|t| t == name) {
        return EvalOutcome::fail(format!("tool '{name}' is explicitly denied"));
    }
    if tool_patterns
        .iter()
        .any(|pattern| governance_core::regex_match_safe(pattern, name))
    {
        return EvalOutcome::fail(format!("tool '{name}' matches a denied pattern"));
    }
    if !allowed_tools.is_empty() && !allowed_tools.iter().any(|t| t == name) {
        return EvalOutcome::fail(format!("tool '{name}' is not in the allowed list"));
    }
    if require_approval.iter().any(|t| t == name) {
        return EvalOutcome::pass_with_warning(format!("tool '{name}' requires approval before use"));
    }
    EvalOutcome::pass()
}

fn eval_file_access(
    allowed_paths: &[String],
    denied_paths: &[String],
    read_only: &[String],
    allowed_extensions: &[String],
    denied_extensions: &[String],
    ctx: &ExecutionContext,
) -> EvalOutcome {
    let files = ctx.all_files();
    if files.is_empty() {
        return EvalOutcome::pass();
    }

    for file in &files {
        if denied_paths.iter().any(|p| governance_core::glob_match_safe(p, file)) {
            return EvalOutcome::fail(format!("'{file}' matches a denied path pattern"));
        }
        if !allowed_paths.is_empty() && !allowed_paths.iter().any(|p| governance_core::glob_match_safe(p, file)) {
            return EvalOutcome::fail(format!("'{file}' is not covered by any allowed path pattern"));
        }
        if let Some(ext) = file.rsplit('.').next() {
            let ext = format!(".{ext}");
            if !allowed_extensions.is_empty() && !allowed_extensions.iter().any(|e| e == &ext) {
                return EvalOutcome::fail(format!("'{file}' has an extension not in allowedExtensions"));
            }
            if denied_extensions.iter().any(|e| e == &ext) {
                return EvalOutcome::fail(format!("'{file}' has a denied extension"));
            }
        }
        let is_write = ctx.action_name.contains("write") || ctx.action_name.contains("edit");
        if is_write && read_only.iter().any(|p| governance_core::glob_match_safe(p, file)) {
            return EvalOutcome::fail(format!("'{file}' is read-only for action '{}'", ctx.action_name));
        }
    }

    EvalOutcome::pass()
}

fn eval_output_format(
    max_length: Option<usize>,
    forbidden_patterns: &[String],
    required_patterns: &[String],
    format: Option<governance_core::constraint::OutputFormatKind>,
    ctx: &ExecutionContext,
) -> EvalOutcome {
    if ctx.action_type != ActionType::Output {
        return EvalOutcome::pass();
    }
    let Some(content) = &ctx.output_content else {
        return EvalOutcome::pass();
    };

    if let Some(max) = max_length {
        if content.len() > max {
            return EvalOutcome::fail(format!("output length {} exceeds maxLength {max}", content.len()));
        }
    }
    for pattern in forbidden_patterns {
        if governance_core::regex_match_safe(pattern, content) {
            return EvalOutcome::fail(format!("output matches forbidden pattern '{pattern}'"));
        }
    }
    for pattern in required_patterns {
        if !governance_core::regex_match_safe(pattern, content) {
            return EvalOutcome::fail(format!("output is missing required pattern '{pattern}'"));
        }
    }
    if format == Some(governance_core::constraint::OutputFormatKind::Json)
        && serde_json::from_str::<serde_json::Value>(content).is_err()
    {
        return EvalOutcome::fail("output is not valid JSON despite format = json");
    }

    EvalOutcome::pass()
}

fn eval_behavioral(
    prohibited_actions: &[String],
    max_iterations: Option<u64>,
    ctx: &ExecutionContext,
    monitoring: Option<&MonitoringState>,
) -> EvalOutcome {
    if prohibited_actions.iter().any(|a| a == &ctx.action_name) {
        return EvalOutcome::fail(format!("action '{}' is prohibited", ctx.action_name));
    }
    if let (Some(max), Some(state)) = (max_iterations, monitoring) {
        if state.iteration_count >= max {
            return EvalOutcome::fail(format!(
                "iteration count {} has reached maxIterations {max}",
                state.iteration_count
            ));
        }
    }
    EvalOutcome::pass()
}

#[allow(clippy::too_many_arguments)]
fn eval_temporal(
    valid_from: Option<chrono::DateTime<chrono::Utc>>,
    valid_until: Option<chrono::DateTime<chrono::Utc>>,
    allowed_hours: &[u32],
    allowed_days: &[u32],
    rate_limit_per_minute: Option<u32>,
    rate_limit_per_hour: Option<u32>,
    ctx: &ExecutionContext,
    monitoring: Option<&mut MonitoringState>,
    clock: &dyn Clock,
) -> EvalOutcome {
    if let Some(from) = valid_from {
        if ctx.timestamp < from {
            return EvalOutcome::fail("action timestamp is before validFrom");
        }
    }
    if let Some(until) = valid_until {
        if ctx.timestamp > until {
            return EvalOutcome::fail("action timestamp is after validUntil");
        }
    }

    if !allowed_hours.is_empty() || !allowed_days.is_empty() {
        let (hour, weekday) = clock.local_hour_and_weekday();
        if !allowed_hours.is_empty() && !allowed_hours.contains(&hour) {
            return EvalOutcome::fail(format!("current hour {hour} is outside allowedHours"));
        }
        if !allowed_days.is_empty() && !allowed_days.contains(&weekday) {
            return EvalOutcome::fail(format!("current weekday {weekday} is outside allowedDays"));
        }
    }

    if let (Some(state), true) = (monitoring, rate_limit_per_minute.is_some() || rate_limit_per_hour.is_some()) {
        let (recent_minute, recent_hour) = state.rate_window(ctx.action_type, clock.now_ms());
        if let Some(limit) = rate_limit_per_minute {
            if recent_minute as u32 >= limit {
                return EvalOutcome::fail(format!("rateLimitPerMinute {limit} reached ({recent_minute} in the last minute)"));
            }
        }
        if let Some(limit) = rate_limit_per_hour {
            if recent_hour as u32 >= limit {
                return EvalOutcome::fail(format!("rateLimitPerHour {limit} reached ({recent_hour} in the last hour)"));
            }
        }
    }

    EvalOutcome::pass()
}

/// Resource evaluation is reserved for the runtime environment (spec.md
/// §4.3.2, §9 open question); in-engine it is a pass-through.
fn eval_resource() -> EvalOutcome {
    EvalOutcome::pass()
}

fn eval_side_effect(
    allow_network: Option<bool>,
    allowed_hosts: &[String],
    denied_hosts: &[String],
    allow_shell_commands: Option<bool>,
    allowed_commands: &[String],
    denied_commands: &[String],
    allow_git_operations: Option<bool>,
    allowed_git_ops: &[String],
    denied_git_ops: &[String],
    ctx: &ExecutionContext,
) -> EvalOutcome {
    match ctx.action_type {
        ActionType::Network => {
            if allow_network == Some(false) {
                return EvalOutcome::fail("network access is disabled for this protocol");
            }
            let Some(host) = &ctx.target_host else {
                return EvalOutcome::pass();
            };
            if denied_hosts.iter().any(|h| h == host) {
                return EvalOutcome::fail(format!("host '{host}' is denied"));
            }
            if !allowed_hosts.is_empty() && !allowed_hosts.iter().any(|h| h == host) {
                return EvalOutcome::fail(format!("host '{host}' is not in allowedHosts"));
            }
            EvalOutcome::pass()
        }
        ActionType::ShellCommand => {
            if allow_shell_commands == Some(false) {
                return EvalOutcome::fail("shell command execution is disabled for this protocol");
            }
            let Some(command) = &ctx.command else {
                return EvalOutcome::pass();
            };
            if denied_commands.iter().any(|d| command.starts_with(d.as_str()) || command.contains(d.as_str())) {
                return EvalOutcome::fail(format!("command '{command}' matches a denied command"));
            }
            if !allowed_commands.is_empty() && !allowed_commands.iter().any(|a| command.starts_with(a.as_str())) {
                return EvalOutcome::fail(format!("command '{command}' does not start with an allowed prefix"));
            }
            EvalOutcome::pass()
        }
        ActionType::GitOperation => {
            if allow_git_operations == Some(false) {
                return EvalOutcome::fail("git operations are disabled for this protocol");
            }
            let Some(op) = &ctx.git_operation else {
                return EvalOutcome::pass();
            };
            if denied_git_ops.iter().any(|d| op.starts_with(d.as_str()) || op.contains(d.as_str())) {
                return EvalOutcome::fail(format!("git operation '{op}' matches a denied operation"));
            }
            if !allowed_git_ops.is_empty() && !allowed_git_ops.iter().any(|a| op.starts_with(a.as_str())) {
                return EvalOutcome::fail(format!("git operation '{op}' does not start with an allowed prefix"));
            }
            EvalOutcome::pass()
        }
        _ => EvalOutcome::pass(),
    }
}

/// Dispatch a rule to its evaluator. `ConstraintRule` is an exhaustive
/// tagged union, so there is no runtime "unknown discriminant" branch to
/// reach in-process — an unrecognized `type` tag fails to deserialize
/// before it ever reaches this function, which is the closed-enum
/// equivalent of spec.md §4.3.2's fail-closed requirement.
pub fn evaluate(
    rule: &ConstraintRule,
    ctx: &ExecutionContext,
    monitoring: Option<&mut MonitoringState>,
    clock: &dyn Clock,
) -> EvalOutcome {
    match rule {
        ConstraintRule::ToolRestriction {
            allowed_tools,
            denied_tools,
            tool_patterns,
            require_approval,
        } => eval_tool_restriction(allowed_tools, denied_tools, tool_patterns, require_approval, ctx),
        ConstraintRule::FileAccess {
            allowed_paths,
            denied_paths,
            read_only,
            allowed_extensions,
            denied_extensions,
            ..
        } => eval_file_access(allowed_paths, denied_paths, read_only, allowed_extensions, denied_extensions, ctx),
        ConstraintRule::OutputFormat {
            max_length,
            forbidden_patterns,
            required_patterns,
            format,
            ..
        } => eval_output_format(*max_length, forbidden_patterns, required_patterns, *format, ctx),
        ConstraintRule::Behavioral {
            prohibited_actions,
            max_iterations,
            ..
        } => eval_behavioral(prohibited_actions, *max_iterations, ctx, monitoring.map(|m| &*m)),
        ConstraintRule::Temporal {
            rate_limit_per_minute,
            rate_limit_per_hour,
            valid_from,
            valid_until,
            allowed_hours,
            allowed_days,
            ..
        } => eval_temporal(
            *valid_from,
            *valid_until,
            allowed_hours,
            allowed_days,
            *rate_limit_per_minute,
            *rate_limit_per_hour,
            ctx,
            monitoring,
            clock,
        ),
        ConstraintRule::Resource { .. } => eval_resource(),
        ConstraintRule::SideEffect {
            allow_network,
            allowed_hosts,
            denied_hosts,
            allow_shell_commands,
            allowed_commands,
            denied_commands,
            allow_git_operations,
            allowed_git_ops,
            denied_git_ops,
        } => eval_side_effect(
            *allow_network,
            allowed_hosts,
            denied_hosts,
            *allow_shell_commands,
            allowed_commands,
            denied_commands,
            *allow_git_operations,
            allowed_git_ops,
            denied_git_ops,
            ctx,
        ),
    }
}
