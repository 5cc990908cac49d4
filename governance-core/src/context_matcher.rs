//! `ContextMatcher` — the include/exclude pattern bag that determines
//! whether a protocol applies to a given `ExecutionContext`.

use crate::pattern::glob_match_safe;
use serde::{Deserialize, Serialize};

/// An optional include/exclude pattern list over one axis of a context
/// (feature id, project dir, a file path, worker id, ...). Absent = no
/// restriction on that axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPatterns {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl MatchPatterns {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// True if any exclude pattern matches `value`.
    fn excluded(&self, value: &str) -> bool {
        self.exclude.iter().any(|p| glob_match_safe(p, value))
    }

    /// True if the include list is non-empty and at least one entry matches.
    fn included(&self, value: &str) -> bool {
        !self.include.is_empty() && self.include.iter().any(|p| glob_match_safe(p, value))
    }
}

/// Bag of optional pattern lists over the axes a protocol's applicability
/// can be scoped by. A matcher with every field `None` applies universally
/// (invariant 7 in spec.md §8).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextMatcher {
    #[serde(default)]
    pub feature_id: Option<MatchPatterns>,
    #[serde(default)]
    pub project_dir: Option<MatchPatterns>,
    #[serde(default)]
    pub target_files: Option<MatchPatterns>,
    #[serde(default)]
    pub source_files: Option<MatchPatterns>,
    #[serde(default)]
    pub worker_id: Option<MatchPatterns>,
    #[serde(default)]
    pub task_description: Option<MatchPatterns>,
    #[serde(default)]
    pub environments: Option<MatchPatterns>,
    #[serde(default)]
    pub branches: Option<MatchPatterns>,
}

/// Values pulled from an `ExecutionContext` for matching purposes, so the
/// matcher doesn't need to depend on the full execution-context type.
#[derive(Debug, Clone, Default)]
pub struct MatchSubject<'a> {
    pub feature_id: Option<&'a str>,
    pub project_dir: Option<&'a str>,
    pub target_files: &'a [String],
    pub source_files: &'a [String],
    pub worker_id: Option<&'a str>,
    pub task_description: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub branch: Option<&'a str>,
}

impl ContextMatcher {
    /// True if this matcher has no axes configured at all.
    pub fn is_universal(&self) -> bool {
        [
            &self.feature_id,
            &self.project_dir,
            &self.target_files,
            &self.source_files,
            &self.worker_id,
            &self.task_description,
            &self.environments,
            &self.branches,
        ]
        .iter()
        .all(|axis| axis.is_none())
    }

    /// Per spec.md §4.3.5: a protocol applies when (1) no configured exclude
    /// pattern matches, and (2) if any positive pattern list is non-empty,
    /// at least one positive match exists across all positive lists.
    pub fn applies(&self, subject: &MatchSubject<'_>) -> bool {
        if self.is_universal() {
            return true;
        }

        let axes: Vec<(&Option<MatchPatterns>, Vec<&str>)> = vec![
            (&self.feature_id, subject.feature_id.into_iter().collect()),
            (&self.project_dir, subject.project_dir.into_iter().collect()),
            (
                &self.target_files,
                subject.target_files.iter().map(String::as_str).collect(),
            ),
            (
                &self.source_files,
                subject.source_files.iter().map(String::as_str).collect(),
            ),
            (&self.worker_id, subject.worker_id.into_iter().collect()),
            (
                &self.task_description,
                subject.task_description.into_iter().collect(),
            ),
            (&self.environments, subject.environment.into_iter().collect()),
            (&self.branches, subject.branch.into_iter().collect()),
        ];

        // (1) No exclude pattern on any configured axis may match.
        for (patterns, values) in &axes {
            if let Some(patterns) = patterns {
                if values.iter().any(|v| patterns.excluded(v)) {
                    return false;
                }
            }
        }

        // (2) If any axis has a non-empty include list, at least one
        // positive match must exist somewhere across all positive lists.
        let has_positive_lists = axes
            .iter()
            .any(|(p, _)| p.as_ref().is_some_and(|p| !p.include.is_empty()));

        if !has_positive_lists {
            return true;
        }

        axes.iter().any(|(patterns, values)| {
            patterns
                .as_ref()
                .is_some_and(|p| values.iter().any(|v| p.included(v)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_matcher_applies_to_everything() {
        let m = ContextMatcher::default();
        assert!(m.applies(&MatchSubject::default()));
    }

    #[test]
    fn exclude_wins_over_absence_of_include() {
        let mut m = ContextMatcher::default();
        m.feature_id = Some(MatchPatterns {
            include: vec![],
            exclude: vec!["billing".into()],
        });
        let subject = MatchSubject {
            feature_id: Some("billing"),
            ..Default::default()
        };
        assert!(!m.applies(&subject));
    }

    #[test]
    fn include_requires_a_positive_match() {
        let mut m = ContextMatcher::default();
        m.worker_id = Some(MatchPatterns {
            include: vec!["agent-*".into()],
            exclude: vec![],
        });
        let matching = MatchSubject {
            worker_id: Some("agent-7"),
            ..Default::default()
        };
        let non_matching = MatchSubject {
            worker_id: Some("intern-1"),
            ..Default::default()
        };
        assert!(m.applies(&matching));
        assert!(!m.applies(&non_matching));
    }
}
