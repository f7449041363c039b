//! Pipeline orchestration.
//!
//! The orchestrator owns one typed agent per pipeline position and
//! drives the fixed sequence President → Manager → Section (per unit) →
//! Worker (per unit). The first two positions are single-shot: a failure
//! there aborts the run, since nothing downstream can proceed without a
//! task list. The fan-out positions are independent per unit: one unit's
//! failure is published, flagged on the summary, and the loop continues.

mod model;


pub use model::{
    ImplementationSpec, ProjectSummary, RequirementSpec, ResultArtifact,
    SectionTask, SectionTaskPlans, TaskItem, TaskList,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::agent::{Agent, AgentConfig, GenerativeBackend};
use crate::bus::{EventBus, Notification};
use crate::cancellation::CancelToken;
use crate::errors::{AgentError, PipelineError};

/// The orchestrator's publishing identity for unit-failure notifications.
pub const ORCHESTRATOR_IDENTITY: &str = "orchestrator";

/// Configuration for the four pipeline roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// The President role: requirement → task list.
    pub president: AgentConfig,
    /// The Manager role: task list → section plans.
    pub manager: AgentConfig,
    /// The Section role: section task → implementation spec.
    pub section: AgentConfig,
    /// The Worker role: implementation spec → result artifact.
    pub worker: AgentConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            president: AgentConfig::new(
                "president",
                "Breaks a requirement down into an ordered task list.",
                "You are the president of a software organization. Break the \
                 given requirement into an ordered list of tasks. Reply with \
                 JSON only: {\"name\": string, \"tasks\": [{\"title\": string, \
                 \"description\": string}]}.",
                "gpt-4o-mini",
            ),
            manager: AgentConfig::new(
                "manager",
                "Groups tasks into independent section plans.",
                "You are an engineering manager. Group the given tasks into \
                 independent sections that can be built separately. Reply \
                 with JSON only: {\"sections\": [{\"section\": string, \
                 \"objective\": string, \"tasks\": [{\"title\": string, \
                 \"description\": string}]}]}.",
                "gpt-4o-mini",
            ),
            section: AgentConfig::new(
                "section",
                "Turns one section plan into an implementation spec.",
                "You are a section lead. Turn the given section plan into a \
                 concrete implementation spec. Reply with JSON only: \
                 {\"section\": string, \"files\": [string], \"notes\": string}.",
                "gpt-4o-mini",
            ),
            worker: AgentConfig::new(
                "worker",
                "Produces the artifacts for one implementation spec.",
                "You are a worker. Produce the artifacts described by the \
                 given implementation spec. Reply with JSON only: \
                 {\"section\": string, \"artifacts\": {string: string}}.",
                "gpt-4o-mini",
            ),
        }
    }
}

/// Sequences the four pipeline roles into one project run and aggregates
/// outcomes into a [`ProjectSummary`].
#[derive(Debug)]
pub struct Orchestrator {
    bus: Arc<EventBus>,
    president: Agent<RequirementSpec, TaskList>,
    manager: Agent<TaskList, SectionTaskPlans>,
    section: Agent<SectionTask, ImplementationSpec>,
    worker: Agent<ImplementationSpec, ResultArtifact>,
}

impl Orchestrator {
    /// Creates an orchestrator with one agent per pipeline position, all
    /// bound to `bus` and sharing the same optional backend.
    #[must_use]
    pub fn new(
        bus: Arc<EventBus>,
        config: PipelineConfig,
        backend: Option<Arc<dyn GenerativeBackend>>,
    ) -> Self {
        Self {
            president: Agent::new(config.president, bus.clone(), backend.clone()),
            manager: Agent::new(config.manager, bus.clone(), backend.clone()),
            section: Agent::new(config.section, bus.clone(), backend.clone()),
            worker: Agent::new(config.worker, bus.clone(), backend),
            bus,
        }
    }

    /// Returns the President agent.
    #[must_use]
    pub fn president(&self) -> &Agent<RequirementSpec, TaskList> {
        &self.president
    }

    /// Returns the Manager agent.
    #[must_use]
    pub fn manager(&self) -> &Agent<TaskList, SectionTaskPlans> {
        &self.manager
    }

    /// Returns the Section agent.
    #[must_use]
    pub fn section(&self) -> &Agent<SectionTask, ImplementationSpec> {
        &self.section
    }

    /// Returns the Worker agent.
    #[must_use]
    pub fn worker(&self) -> &Agent<ImplementationSpec, ResultArtifact> {
        &self.worker
    }

    /// Runs the full pipeline for `requirement`.
    ///
    /// President and Manager failures abort the run. A Section or Worker
    /// failure clears the summary's success flag, publishes an ERROR
    /// notification naming the failed unit, and the loop continues with
    /// the next unit. Cancellation always aborts, from any position.
    pub async fn run(
        &self,
        requirement: RequirementSpec,
        cancel: &CancelToken,
    ) -> Result<ProjectSummary, PipelineError> {
        let mut summary = ProjectSummary::new(&requirement.name);

        let task_list = self
            .president
            .process(requirement, cancel)
            .await
            .map_err(|e| PipelineError::fatal(self.president.role(), e))?;

        let plans = self
            .manager
            .process(task_list, cancel)
            .await
            .map_err(|e| PipelineError::fatal(self.manager.role(), e))?;

        for unit in plans.sections {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled {
                    reason: cancel.reason_or_default(),
                });
            }

            let section_name = unit.section.clone();

            let implementation = match self.section.process(unit, cancel).await {
                Ok(spec) => spec,
                Err(error) => {
                    self.record_unit_failure(&mut summary, &section_name, &error, cancel)?;
                    continue;
                }
            };

            match self.worker.process(implementation, cancel).await {
                Ok(result) => summary.record_result(result),
                Err(error) => {
                    self.record_unit_failure(&mut summary, &section_name, &error, cancel)?;
                }
            }
        }

        Ok(summary)
    }

    /// Applies the publish-and-continue policy for one failed unit.
    ///
    /// Cancellation is never folded into per-unit recovery; it aborts
    /// the run.
    fn record_unit_failure(
        &self,
        summary: &mut ProjectSummary,
        section: &str,
        error: &AgentError,
        cancel: &CancelToken,
    ) -> Result<(), PipelineError> {
        if error.is_cancelled() {
            return Err(PipelineError::Cancelled {
                reason: cancel.reason_or_default(),
            });
        }

        warn!(section, %error, "unit failed; continuing with remaining units");

        let notification = Notification::error(
            ORCHESTRATOR_IDENTITY,
            serde_json::json!({
                "section": section,
                "reason": error.to_string(),
            }),
        );
        if let Err(bus_error) = self.bus.send_with(&notification, Some(cancel)) {
            warn!(section, error = %bus_error, "unit-failure notification not delivered");
        }

        summary.mark_failed();
        Ok(())
    }
}
