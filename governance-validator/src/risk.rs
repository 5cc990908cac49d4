//! Risk scoring (spec.md §4.2.2): nine weighted categories, each scored
//! independently in `[0,100]`, combined into an overall score and mapped
//! to a qualitative level.

use governance_core::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    ToolAccess,
    FileAccess,
    SideEffects,
    Enforcement,
    Behavioral,
    Temporal,
    Resource,
    Complexity,
    Conflict,
}

impl RiskCategory {
    pub fn weight(self) -> f64 {
        match self {
            Self::ToolAccess => 0.20,
            Self::FileAccess => 0.20,
            Self::SideEffects => 0.15,
            Self::Enforcement => 0.15,
            Self::Behavioral => 0.10,
            Self::Temporal => 0.05,
            Self::Resource => 0.05,
            Self::Complexity => 0.05,
            Self::Conflict => 0.05,
        }
    }

    pub const ALL: [RiskCategory; 9] = [
        Self::ToolAccess,
        Self::FileAccess,
        Self::SideEffects,
        Self::Enforcement,
        Self::Behavioral,
        Self::Temporal,
        Self::Resource,
        Self::Complexity,
        Self::Conflict,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub score: u8,
    pub weight: f64,
    pub description: String,
    pub details: Vec<String>,
    #[serde(default)]
    pub mitigations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    Minimal,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=100 => Self::Critical,
            60..=79 => Self::High,
            40..=59 => Self::Medium,
            20..=39 => Self::Low,
            _ => Self::Minimal,
        }
    }
}

/// Points a single issue at the given severity contributes to its
/// category's raw score, before clamping to 100.
pub fn issue_weight(severity: Severity) -> u32 {
    match severity {
        Severity::Error => 22,
        Severity::Warning => 12,
        Severity::Info => 5,
    }
}

/// Builder used by each category's scorer: starts from structural signal
/// points, adds weighted issue counts, then clamps to `[0,100]`.
#[derive(Debug, Default)]
pub struct RawScore {
    pub points: u32,
    pub details: Vec<String>,
}

impl RawScore {
    pub fn add(&mut self, points: u32, detail: impl Into<String>) -> &mut Self {
        self.points += points;
        self.details.push(detail.into());
        self
    }

    pub fn add_issue(&mut self, severity: Severity, detail: impl Into<String>) -> &mut Self {
        self.add(issue_weight(severity), detail)
    }

    pub fn finish(self, category: RiskCategory, mitigations: Vec<String>) -> RiskFactor {
        let score = self.points.min(100) as u8;
        RiskFactor {
            category,
            score,
            weight: category.weight(),
            description: format!("{} contributed {} signal(s)", category_label(category), self.details.len()),
            details: self.details,
            mitigations,
        }
    }
}

fn category_label(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::ToolAccess => "tool access",
        RiskCategory::FileAccess => "file access",
        RiskCategory::SideEffects => "side effects",
        RiskCategory::Enforcement => "enforcement",
        RiskCategory::Behavioral => "behavioral",
        RiskCategory::Temporal => "temporal",
        RiskCategory::Resource => "resource",
        RiskCategory::Complexity => "complexity",
        RiskCategory::Conflict => "conflict",
    }
}

/// Weighted sum of category scores, rounded to an integer in `[0,100]`.
pub fn overall_score(factors: &[RiskFactor]) -> u8 {
    let sum: f64 = factors.iter().map(|f| f.score as f64 * f.weight).sum();
    sum.round().clamp(0.0, 100.0) as u8
}
