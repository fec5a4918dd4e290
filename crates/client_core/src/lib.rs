//! Client core for the learning-plan service: input validation, the plan
//! request client and the lifecycle controller that sequences them.

pub mod controller;
pub mod draft;
pub mod export;
pub mod plan_client;
pub mod sample;
pub mod validation;

pub use controller::{ControllerSnapshot, LifecycleController, SubmissionPhase, SubmitOutcome};
pub use draft::{CheckState, InputDraft, InputSource};
pub use export::{export_file_name, render_export, write_export, write_summary_export};
pub use plan_client::{HttpPlanClient, PlanClientOptions, PlanService};
pub use sample::{sample_record, sample_text};
pub use validation::{score_advisories, validate, ScoreAdvisory};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
