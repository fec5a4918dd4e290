use std::{
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    sample_text, score_advisories, HttpPlanClient, InputDraft, LifecycleController,
    SubmissionPhase, SubmitOutcome,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod events;
mod progress;
mod render;

use config::{load_settings, normalize_service_url, Settings};
use events::{FailureCategory, FailureReport};

#[derive(Parser, Debug)]
#[command(name = "planner", about = "Submit FLN assessment records and fetch learning plans")]
struct Cli {
    /// Base URL of the plan service.
    #[arg(long, global = true)]
    service_url: Option<String>,
    /// Deadline in seconds for one plan request.
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an assessment record without sending it.
    Validate {
        /// Read the record from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Send an assessment record and show the returned learning plan.
    Submit {
        #[arg(long, conflicts_with = "sample")]
        file: Option<PathBuf>,
        /// Use the built-in sample record.
        #[arg(long)]
        sample: bool,
        /// Save the plan as learning_plan_<studentId>.json.
        #[arg(long)]
        export: bool,
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Print the built-in sample record.
    Sample,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(url) = &cli.service_url {
        settings.service_url = normalize_service_url(url);
    }
    if let Some(timeout) = cli.timeout {
        settings.request_timeout_secs = timeout;
    }

    match cli.command {
        Command::Validate { file } => run_validate(file.as_deref()),
        Command::Submit {
            file,
            sample,
            export,
            export_dir,
        } => {
            if let Some(dir) = export_dir {
                settings.export_dir = dir;
            }
            run_submit(&settings, file.as_deref(), sample, export).await
        }
        Command::Sample => {
            println!("{}", sample_text());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_draft(file: Option<&Path>, sample: bool) -> Result<InputDraft> {
    let mut draft = InputDraft::new();
    if sample {
        draft.load_sample();
    } else if let Some(path) = file {
        draft.load_file(path)?;
    } else {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read record from stdin")?;
        draft.paste(text);
        draft.validate();
    }
    Ok(draft)
}

fn report_draft(draft: &InputDraft) {
    if let Some(message) = draft.message() {
        eprintln!("{message}");
    }
    if let Some(record) = draft.record() {
        for advisory in score_advisories(record) {
            warn!("{advisory}");
        }
    }
}

fn run_validate(file: Option<&Path>) -> Result<ExitCode> {
    let draft = read_draft(file, false)?;
    report_draft(&draft);
    Ok(if draft.record().is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

async fn run_submit(
    settings: &Settings,
    file: Option<&Path>,
    sample: bool,
    export: bool,
) -> Result<ExitCode> {
    let draft = read_draft(file, sample)?;
    report_draft(&draft);

    let client = HttpPlanClient::new(&settings.service_url, settings.plan_client_options())?;
    info!(endpoint = %client.endpoint(), "using plan service");
    let controller = LifecycleController::new(Arc::new(client));

    match controller.submit_draft(&draft) {
        SubmitOutcome::Started => {}
        SubmitOutcome::Rejected(_) | SubmitOutcome::NotChecked | SubmitOutcome::Ignored => {
            return Ok(ExitCode::from(2));
        }
    }

    let settled = progress::follow_submission(&controller, progress::STEP_INTERVAL).await;
    match &settled.phase {
        SubmissionPhase::Succeeded(plan) => {
            println!("{}", render::render_plan(plan));
            if export {
                let path = controller.export_plan(&settings.export_dir)?;
                eprintln!("Exported plan to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        SubmissionPhase::Failed(err) => {
            let report = FailureReport::from_request_error(err);
            if report.category() == FailureCategory::Completed {
                println!("{}", report.message());
                eprintln!("{}", report.hint());
                if export {
                    let path = controller.export_plan(&settings.export_dir)?;
                    eprintln!("Exported completion summary to {}", path.display());
                }
                return Ok(ExitCode::SUCCESS);
            }
            eprintln!("Error: {}", report.message());
            eprintln!("{}", report.hint());
            if report.is_retryable() {
                eprintln!("Nothing was retried; run the command again to make a fresh attempt.");
            }
            Ok(ExitCode::FAILURE)
        }
        SubmissionPhase::Idle | SubmissionPhase::Submitting => {
            eprintln!("Submission cancelled.");
            Ok(ExitCode::from(130))
        }
    }
}
