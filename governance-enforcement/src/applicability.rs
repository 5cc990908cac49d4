//! Builds a `MatchSubject` from an `ExecutionContext` so applicability
//! checks (spec.md §4.3.5) can reuse `ContextMatcher::applies` as-is.

use governance_core::{ExecutionContext, MatchSubject};

pub fn subject_for(ctx: &ExecutionContext) -> MatchSubject<'_> {
    MatchSubject {
        feature_id: ctx.feature_id.as_deref(),
        project_dir: ctx.project_dir.as_deref(),
        target_files: ctx.target_files.as_deref().unwrap_or(&[]),
        source_files: ctx.source_files.as_deref().unwrap_or(&[]),
        worker_id: ctx.worker_id.as_deref(),
        task_description: None,
        // `ExecutionContext` carries no environment/branch fields in the
        // data model — protocols scoped only by those axes degrade to
        // never matching through this path.
        environment: None,
        branch: None,
    }
}
