//! Generated plan schema
//!
//! Deserialization is strict: a payload missing any field is rejected as a
//! whole rather than producing a partially filled plan.

use serde::{Deserialize, Serialize};

/// Title used when the model leaves `project_title` blank
pub const UNTITLED_PROJECT: &str = "Untitled Project";

/// A complete project plan as produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub project_title: String,
    pub executive_summary: String,
    pub risk_assessment: RiskAssessment,
    pub phases: Vec<Phase>,
}

impl GeneratedPlan {
    /// Title to store the plan under
    pub fn title(&self) -> &str {
        let title = self.project_title.trim();
        if title.is_empty() { UNTITLED_PROJECT } else { title }
    }

    pub fn task_count(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub message: String,
    pub mitigation: String,
}

/// Overall project risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

/// One stage of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// Free-form, e.g. "1 Week"
    pub duration: String,
    pub color: PhaseColor,
    pub description: String,
    pub tasks: Vec<Task>,
    pub ai_insight: String,
}

/// Display color tag for a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseColor {
    #[serde(alias = "Blue", alias = "BLUE")]
    Blue,
    #[serde(alias = "Purple", alias = "PURPLE")]
    Purple,
    #[serde(alias = "Green", alias = "GREEN")]
    Green,
    #[serde(alias = "Orange", alias = "ORANGE")]
    Orange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// Free-form, e.g. "Pending"
    pub status: String,
    /// Free-form, e.g. "Task A"
    pub dependencies: String,
}
