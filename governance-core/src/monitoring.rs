//! `MonitoringState` and the bounded collections it maintains per worker.
//! Ownership is exclusive to the Enforcement Engine (spec.md §3, §5); this
//! module only defines the shape, not who holds the lock around it.

use crate::execution_context::ActionType;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

pub const MAX_TOOL_SEQUENCE: usize = 100;
pub const MAX_FILE_SEQUENCE: usize = 100;
pub const MAX_OBSERVED_PATTERNS: usize = 100;
pub const MAX_ACTIVE_ALERTS: usize = 50;
/// Events older than this are dropped from a rate-limit window on every
/// check, per spec.md §5 ("trimmed to events within 60 minutes").
pub const OPERATION_COUNT_RETENTION_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringAlert {
    pub id: String,
    pub worker_id: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub acknowledged: bool,
}

/// A distinct behavioral pattern observed during monitoring (e.g.
/// `repeated_tool_usage`), deduplicated by `pattern_type` with up to 5
/// retained examples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedPattern {
    pub pattern_type: String,
    pub examples: Vec<String>,
    pub occurrences: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl ObservedPattern {
    pub const MAX_EXAMPLES: usize = 5;

    fn record(&mut self, example: String, now: DateTime<Utc>) {
        self.occurrences += 1;
        self.last_seen = now;
        if !self.examples.contains(&example) && self.examples.len() < Self::MAX_EXAMPLES {
            self.examples.push(example);
        }
    }
}

/// Per-worker monitoring state, held for the lifetime of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringState {
    pub worker_id: String,
    pub started_at: DateTime<Utc>,
    pub operation_counts: HashMap<ActionType, VecDeque<i64>>,
    pub iteration_count: u64,
    pub tool_usage_sequence: VecDeque<String>,
    pub file_access_sequence: VecDeque<String>,
    pub active_alerts: VecDeque<MonitoringAlert>,
    pub observed_patterns: IndexMap<String, ObservedPattern>,
    next_alert_seq: u64,
}

impl MonitoringState {
    pub fn new(worker_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            worker_id: worker_id.into(),
            started_at,
            operation_counts: HashMap::new(),
            iteration_count: 0,
            tool_usage_sequence: VecDeque::new(),
            file_access_sequence: VecDeque::new(),
            active_alerts: VecDeque::new(),
            observed_patterns: IndexMap::new(),
            next_alert_seq: 0,
        }
    }

    /// Monotonic per-worker counter for callers that need a unique alert id
    /// that survives eviction (`active_alerts.len()` doesn't: it's capped at
    /// `MAX_ACTIVE_ALERTS`).
    pub fn next_alert_seq(&mut self) -> u64 {
        let seq = self.next_alert_seq;
        self.next_alert_seq += 1;
        seq
    }

    fn push_bounded(deque: &mut VecDeque<String>, value: String, cap: usize) {
        deque.push_back(value);
        while deque.len() > cap {
            deque.pop_front();
        }
    }

    /// Append a recorded action to all relevant sequences and counters, and
    /// run pattern detection. `now_ms`/`now` come from the injected clock.
    pub fn record_action(
        &mut self,
        action_type: ActionType,
        action_name: &str,
        target_files: &[String],
        now_ms: i64,
        now: DateTime<Utc>,
    ) {
        self.operation_counts
            .entry(action_type)
            .or_default()
            .push_back(now_ms);

        if action_type == ActionType::ToolCall {
            Self::push_bounded(
                &mut self.tool_usage_sequence,
                action_name.to_string(),
                MAX_TOOL_SEQUENCE,
            );
        }

        for file in target_files {
            Self::push_bounded(&mut self.file_access_sequence, file.clone(), MAX_FILE_SEQUENCE);
        }

        self.iteration_count += 1;

        self.detect_patterns(now);
    }

    /// Tally the last 10 tools (repeated_tool_usage, threshold 5) and the
    /// last 20 files (repeated_file_access, threshold 3).
    fn detect_patterns(&mut self, now: DateTime<Utc>) {
        let recent_tools: Vec<&String> = self
            .tool_usage_sequence
            .iter()
            .rev()
            .take(10)
            .collect();
        let mut tool_tally: HashMap<&str, u32> = HashMap::new();
        for t in &recent_tools {
            *tool_tally.entry(t.as_str()).or_insert(0) += 1;
        }
        for (tool, count) in tool_tally {
            if count >= 5 {
                self.record_pattern("repeated_tool_usage", tool, now);
            }
        }

        let recent_files: Vec<&String> = self
            .file_access_sequence
            .iter()
            .rev()
            .take(20)
            .collect();
        let mut file_tally: HashMap<&str, u32> = HashMap::new();
        for f in &recent_files {
            *file_tally.entry(f.as_str()).or_insert(0) += 1;
        }
        for (file, count) in file_tally {
            if count >= 3 {
                self.record_pattern("repeated_file_access", file, now);
            }
        }
    }

    fn record_pattern(&mut self, pattern_type: &str, example: &str, now: DateTime<Utc>) {
        if let Some(existing) = self.observed_patterns.get_mut(pattern_type) {
            existing.record(example.to_string(), now);
            return;
        }

        if self.observed_patterns.len() >= MAX_OBSERVED_PATTERNS {
            self.evict_oldest_pattern();
        }

        self.observed_patterns.insert(
            pattern_type.to_string(),
            ObservedPattern {
                pattern_type: pattern_type.to_string(),
                examples: vec![example.to_string()],
                occurrences: 1,
                first_seen: now,
                last_seen: now,
            },
        );
    }

    fn evict_oldest_pattern(&mut self) {
        if let Some(oldest_key) = self
            .observed_patterns
            .iter()
            .min_by_key(|(_, p)| p.last_seen)
            .map(|(k, _)| k.clone())
        {
            self.observed_patterns.shift_remove(&oldest_key);
        }
    }

    /// Drop events older than [`OPERATION_COUNT_RETENTION_MS`] and return
    /// counts of events in the last minute and last hour, for a given
    /// action type, relative to `now_ms`.
    pub fn rate_window(&mut self, action_type: ActionType, now_ms: i64) -> (usize, usize) {
        let entry = self.operation_counts.entry(action_type).or_default();
        entry.retain(|&ts| now_ms - ts <= OPERATION_COUNT_RETENTION_MS);

        let recent_minute = entry.iter().filter(|&&ts| now_ms - ts <= 60_000).count();
        let recent_hour = entry.iter().filter(|&&ts| now_ms - ts <= 3_600_000).count();

        // Per spec.md §4.3.5: after computing the windows, replace the
        // stored sequence with just the hour-bounded slice to bound memory.
        let hour_bounded: VecDeque<i64> = entry
            .iter()
            .copied()
            .filter(|&ts| now_ms - ts <= 3_600_000)
            .collect();
        *entry = hour_bounded;

        (recent_minute, recent_hour)
    }

    /// Stuck-worker check: a tool appearing >= 15 times in the last 20
    /// recorded tool uses.
    pub fn stuck_tool(&self) -> Option<(String, usize)> {
        let recent: Vec<&String> = self.tool_usage_sequence.iter().rev().take(20).collect();
        let mut tally: HashMap<&str, usize> = HashMap::new();
        for t in &recent {
            *tally.entry(t.as_str()).or_insert(0) += 1;
        }
        tally
            .into_iter()
            .find(|(_, count)| *count >= 15)
            .map(|(tool, count)| (tool.to_string(), count))
    }

    /// Push an alert, evicting the oldest unacknowledged alert on overflow
    /// (or the oldest overall if all are acknowledged), per spec.md §4.3.3.
    pub fn push_alert(&mut self, alert: MonitoringAlert) {
        self.active_alerts.push_back(alert);
        if self.active_alerts.len() > MAX_ACTIVE_ALERTS {
            self.evict_alert();
        }
    }

    fn evict_alert(&mut self) {
        if let Some(pos) = self.active_alerts.iter().position(|a| !a.acknowledged) {
            self.active_alerts.remove(pos);
        } else {
            self.active_alerts.pop_front();
        }
    }

    pub fn acknowledge_alert(&mut self, alert_id: &str) -> bool {
        if let Some(alert) = self.active_alerts.iter_mut().find(|a| a.id == alert_id) {
            alert.acknowledged = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn tool_sequence_is_bounded_at_100() {
        let mut state = MonitoringState::new("w1", now());
        for i in 0..150 {
            state.record_action(ActionType::ToolCall, &format!("tool-{i}"), &[], i as i64, now());
        }
        assert_eq!(state.tool_usage_sequence.len(), MAX_TOOL_SEQUENCE);
        assert_eq!(state.tool_usage_sequence.front().unwrap(), "tool-50");
    }

    #[test]
    fn repeated_tool_usage_pattern_detected_at_threshold() {
        let mut state = MonitoringState::new("w1", now());
        for i in 0..5 {
            state.record_action(ActionType::ToolCall, "bash", &[], i, now());
        }
        assert!(state.observed_patterns.contains_key("repeated_tool_usage"));
    }

    #[test]
    fn stuck_worker_detected_at_15_of_last_20() {
        let mut state = MonitoringState::new("w1", now());
        for i in 0..15 {
            state.record_action(ActionType::ToolCall, "bash", &[], i, now());
        }
        assert_eq!(state.stuck_tool(), Some(("bash".to_string(), 15)));
    }

    #[test]
    fn observed_patterns_evict_oldest_by_last_seen() {
        let mut state = MonitoringState::new("w1", now());
        let base = now();
        for i in 0..MAX_OBSERVED_PATTERNS {
            state.record_pattern(&format!("pattern-{i}"), "ex", base + chrono::Duration::seconds(i as i64));
        }
        assert_eq!(state.observed_patterns.len(), MAX_OBSERVED_PATTERNS);
        state.record_pattern(
            "pattern-new",
            "ex",
            base + chrono::Duration::seconds(MAX_OBSERVED_PATTERNS as i64),
        );
        assert_eq!(state.observed_patterns.len(), MAX_OBSERVED_PATTERNS);
        assert!(!state.observed_patterns.contains_key("pattern-0"));
        assert!(state.observed_patterns.contains_key("pattern-new"));
    }

    #[test]
    fn alert_overflow_evicts_oldest_unacknowledged_first() {
        let mut state = MonitoringState::new("w1", now());
        for i in 0..MAX_ACTIVE_ALERTS {
            state.push_alert(MonitoringAlert {
                id: format!("a{i}"),
                worker_id: "w1".into(),
                severity: AlertSeverity::Warning,
                message: "stuck".into(),
                created_at: now(),
                acknowledged: i == 0, // acknowledge the very first one
            });
        }
        state.push_alert(MonitoringAlert {
            id: "overflow".into(),
            worker_id: "w1".into(),
            severity: AlertSeverity::Warning,
            message: "stuck".into(),
            created_at: now(),
            acknowledged: false,
        });
        assert_eq!(state.active_alerts.len(), MAX_ACTIVE_ALERTS);
        // a0 was acknowledged, so a1 (oldest unacknowledged) should be evicted.
        assert!(state.active_alerts.iter().any(|a| a.id == "a0"));
        assert!(!state.active_alerts.iter().any(|a| a.id == "a1"));
    }

    #[test]
    fn rate_window_drops_events_older_than_an_hour() {
        let mut state = MonitoringState::new("w1", now());
        state
            .operation_counts
            .entry(ActionType::ToolCall)
            .or_default()
            .extend([0, 100, 3_600_001]);
        let (_minute, hour) = state.rate_window(ActionType::ToolCall, 3_600_001);
        assert_eq!(hour, 2);
        assert_eq!(
            state.operation_counts.get(&ActionType::ToolCall).unwrap().len(),
            2
        );
    }
}
