//! Request-lifecycle controller: the single owner of submission state.
//!
//! State lives in one `watch` channel. Presentation reads projections or
//! subscribes; only `submit`, `reset` and the request task write to it.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{anyhow, Result};
use shared::{
    domain::LearningPlan,
    error::{RequestError, ValidationError},
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    draft::InputDraft,
    export::{write_export, write_summary_export},
    plan_client::PlanService,
    validation::validate,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPhase {
    Idle,
    Submitting,
    Succeeded(LearningPlan),
    Failed(RequestError),
}

impl SubmissionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Submitting => "submitting",
            SubmissionPhase::Succeeded(_) => "succeeded",
            SubmissionPhase::Failed(_) => "failed",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionPhase::Submitting)
    }
}

/// Everything presentation may read, published as one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub phase: SubmissionPhase,
    pub validation: Option<ValidationError>,
    /// Bumped on every accepted submission and every reset; a request task
    /// only resolves the generation it was started for.
    pub generation: u64,
}

impl Default for ControllerSnapshot {
    fn default() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            validation: None,
            generation: 0,
        }
    }
}

impl ControllerSnapshot {
    pub fn plan(&self) -> Option<&LearningPlan> {
        match &self.phase {
            SubmissionPhase::Succeeded(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match &self.phase {
            SubmissionPhase::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn validation_message(&self) -> Option<String> {
        self.validation.as_ref().map(ToString::to_string)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Input accepted, request in flight.
    Started,
    /// A request is already in flight; nothing changed.
    Ignored,
    Rejected(ValidationError),
    /// The draft was never checked (or could not be read).
    NotChecked,
}

struct Shared {
    state: watch::Sender<ControllerSnapshot>,
}

impl Shared {
    fn resolve(&self, generation: u64, outcome: Result<LearningPlan, RequestError>) {
        let applied = self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation || !snapshot.phase.is_submitting() {
                return false;
            }
            snapshot.phase = match outcome {
                Ok(plan) => SubmissionPhase::Succeeded(plan),
                Err(err) => SubmissionPhase::Failed(err),
            };
            true
        });

        if applied {
            let phase = self.state.borrow().phase.name();
            info!(generation, phase, "plan request resolved");
        } else {
            debug!(generation, "discarding resolution of a superseded request");
        }
    }
}

pub struct LifecycleController {
    service: Arc<dyn PlanService>,
    shared: Arc<Shared>,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl LifecycleController {
    pub fn new(service: Arc<dyn PlanService>) -> Self {
        let (state, _) = watch::channel(ControllerSnapshot::default());
        Self {
            service,
            shared: Arc::new(Shared { state }),
            inflight: Mutex::new(None),
        }
    }

    /// Validates `raw` and, if it is acceptable, starts the plan request.
    ///
    /// Must be called from within a Tokio runtime. A call while a request is
    /// in flight is ignored outright, it is not queued.
    pub fn submit(&self, raw: &str) -> SubmitOutcome {
        if self.shared.state.borrow().phase.is_submitting() {
            debug!("submit ignored: a request is already in flight");
            return SubmitOutcome::Ignored;
        }

        let record = match validate(raw) {
            Ok(record) => record,
            Err(err) => {
                let exposed = err.clone();
                self.shared.state.send_if_modified(move |snapshot| {
                    if snapshot.phase.is_submitting() || snapshot.validation.as_ref() == Some(&exposed) {
                        return false;
                    }
                    snapshot.validation = Some(exposed);
                    true
                });
                debug!(error = %err, "submission rejected by validation");
                return SubmitOutcome::Rejected(err);
            }
        };

        // Held across the transition and the spawn so a concurrent reset
        // either sees the new handle or runs before the transition.
        let mut inflight = self.lock_inflight();
        let mut generation = 0;
        let started = self.shared.state.send_if_modified(|snapshot| {
            if snapshot.phase.is_submitting() {
                return false;
            }
            snapshot.generation += 1;
            generation = snapshot.generation;
            snapshot.phase = SubmissionPhase::Submitting;
            snapshot.validation = None;
            true
        });
        if !started {
            return SubmitOutcome::Ignored;
        }

        info!(
            generation,
            student_id = %record.student_id().map(|id| id.to_string()).unwrap_or_default(),
            "submitting assessment record"
        );

        let shared = Arc::clone(&self.shared);
        let service = Arc::clone(&self.service);
        let handle = tokio::spawn(async move {
            let outcome = service.request_plan(&record).await;
            if let Err(err) = &outcome {
                warn!(generation, error = %err, "plan request failed");
            }
            shared.resolve(generation, outcome);
        });
        if let Some(previous) = inflight.replace(handle) {
            previous.abort();
        }

        SubmitOutcome::Started
    }

    /// Submits a draft, refusing drafts that were never checked.
    pub fn submit_draft(&self, draft: &InputDraft) -> SubmitOutcome {
        if !draft.is_checked() {
            return SubmitOutcome::NotChecked;
        }
        self.submit(draft.text())
    }

    /// Back to a blank `Idle`. Cancels a request that is still in flight.
    pub fn reset(&self) {
        let mut inflight = self.lock_inflight();
        if let Some(handle) = inflight.take() {
            if !handle.is_finished() {
                info!("cancelling in-flight plan request");
            }
            handle.abort();
        }

        self.shared.state.send_if_modified(|snapshot| {
            if snapshot.phase == SubmissionPhase::Idle && snapshot.validation.is_none() {
                return false;
            }
            snapshot.generation += 1;
            snapshot.phase = SubmissionPhase::Idle;
            snapshot.validation = None;
            true
        });
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.shared.state.borrow().phase.clone()
    }

    pub fn validation_message(&self) -> Option<String> {
        self.shared.state.borrow().validation_message()
    }

    pub fn plan(&self) -> Option<LearningPlan> {
        self.shared.state.borrow().plan().cloned()
    }

    pub fn error(&self) -> Option<RequestError> {
        self.shared.state.borrow().error().cloned()
    }

    pub fn error_message(&self) -> Option<String> {
        self.shared.state.borrow().error_message()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.shared.state.subscribe()
    }

    /// Waits until no request is in flight and returns the state at that point.
    pub async fn wait_settled(&self) -> ControllerSnapshot {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|snapshot| !snapshot.phase.is_submitting()).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }

    /// Writes the held plan, or the completion summary of a `no_plan`
    /// answer, to `dir`. A read of existing state only.
    pub fn export_plan(&self, dir: &Path) -> Result<PathBuf> {
        let snapshot = self.snapshot();
        match &snapshot.phase {
            SubmissionPhase::Succeeded(plan) => write_export(plan, dir),
            SubmissionPhase::Failed(RequestError::NoPlan { document, .. }) => {
                write_summary_export(document, dir)
            }
            _ => Err(anyhow!("no learning plan to export")),
        }
    }

    fn lock_inflight(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_inflight().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
