//! Data model for the request/response chain and the final summary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The structured work request seeding a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSpec {
    /// Project name; becomes the summary's project name.
    pub name: String,
    /// Free-form requirement details.
    #[serde(default)]
    pub details: String,
}

impl RequirementSpec {
    /// Creates a new requirement.
    #[must_use]
    pub fn new(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: details.into(),
        }
    }
}

/// One unit of work inside a task list or section plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    /// Short task title.
    pub title: String,
    /// Free-form task description.
    #[serde(default)]
    pub description: String,
}

impl TaskItem {
    /// Creates a new task item.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// The President's breakdown of a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    /// Project name, carried through from the requirement.
    pub name: String,
    /// Ordered tasks derived from the requirement.
    pub tasks: Vec<TaskItem>,
}

impl TaskList {
    /// Creates a new task list.
    #[must_use]
    pub fn new(name: impl Into<String>, tasks: Vec<TaskItem>) -> Self {
        Self {
            name: name.into(),
            tasks,
        }
    }
}

/// One independently processable unit produced by the Manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTask {
    /// The section's name; identifies the unit in summaries and errors.
    pub section: String,
    /// What this section is meant to achieve.
    #[serde(default)]
    pub objective: String,
    /// The tasks assigned to this section.
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
}

impl SectionTask {
    /// Creates a new section task.
    #[must_use]
    pub fn new(section: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            objective: objective.into(),
            tasks: Vec::new(),
        }
    }

    /// Adds a task to the section.
    #[must_use]
    pub fn with_task(mut self, task: TaskItem) -> Self {
        self.tasks.push(task);
        self
    }
}

/// The Manager's fan-out plan: one entry per section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTaskPlans {
    /// The sections to process, in order.
    pub sections: Vec<SectionTask>,
}

impl SectionTaskPlans {
    /// Creates a new plan.
    #[must_use]
    pub fn new(sections: Vec<SectionTask>) -> Self {
        Self { sections }
    }
}

/// A Section agent's implementation plan for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationSpec {
    /// The owning section's name.
    pub section: String,
    /// Files the implementation should produce.
    pub files: Vec<String>,
    /// Free-form implementation notes.
    #[serde(default)]
    pub notes: String,
}

impl ImplementationSpec {
    /// Creates a new implementation spec.
    #[must_use]
    pub fn new(section: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            section: section.into(),
            files,
            notes: String::new(),
        }
    }
}

/// A Worker agent's finished output for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultArtifact {
    /// The owning section's name.
    pub section: String,
    /// Artifact name to artifact content.
    pub artifacts: HashMap<String, String>,
}

impl ResultArtifact {
    /// Creates a new result for `section`.
    #[must_use]
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            artifacts: HashMap::new(),
        }
    }

    /// Adds one artifact.
    #[must_use]
    pub fn with_artifact(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.artifacts.insert(name.into(), content.into());
        self
    }
}

/// The accumulated outcome of one pipeline run.
///
/// Created at orchestration start, mutated monotonically during the
/// fan-out loop, returned once at the end. The `success` flag starts
/// true and is cleared the first time any unit fails; it is never reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// The project name.
    pub project: String,
    /// Per-unit results, in completion order.
    pub results: Vec<ResultArtifact>,
    /// Aggregate artifact mapping; a later unit's artifact overwrites an
    /// earlier one on key collision.
    pub artifacts: HashMap<String, String>,
    /// Whether every unit completed.
    pub success: bool,
}

impl ProjectSummary {
    /// Creates an empty summary for `project`.
    #[must_use]
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            results: Vec::new(),
            artifacts: HashMap::new(),
            success: true,
        }
    }

    /// Appends a unit result and merges its artifacts into the
    /// aggregate mapping, later unit winning on key collision.
    pub fn record_result(&mut self, result: ResultArtifact) {
        for (name, content) in &result.artifacts {
            self.artifacts.insert(name.clone(), content.clone());
        }
        self.results.push(result);
    }

    /// Clears the success flag; it stays cleared for the life of the
    /// summary.
    pub fn mark_failed(&mut self) {
        self.success = false;
    }
}
