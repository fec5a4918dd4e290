use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use shared::domain::{LearningPlan, Scalar, STUDENT_ID_FIELD};

/// `learning_plan_<studentId>.json`, or `learning_plan_student.json` without an id.
pub fn export_file_name(plan: &LearningPlan) -> String {
    file_name_for(plan.student_id.as_ref())
}

fn file_name_for(student_id: Option<&Scalar>) -> String {
    let id = student_id
        .map(|id| sanitize_file_component(&id.to_string()))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "student".to_string());
    format!("learning_plan_{id}.json")
}

fn sanitize_file_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The plan as pretty-printed JSON, every field the service sent included.
pub fn render_export(plan: &LearningPlan) -> Result<String> {
    serde_json::to_string_pretty(plan).context("failed to serialize learning plan")
}

pub fn write_export(plan: &LearningPlan, dir: &Path) -> Result<PathBuf> {
    let contents = render_export(plan)?;
    write_document(dir, &export_file_name(plan), &contents)
}

/// Writes a completion summary (`status: no_plan`) exactly as the service sent it.
pub fn write_summary_export(document: &Map<String, Value>, dir: &Path) -> Result<PathBuf> {
    let student_id = document.get(STUDENT_ID_FIELD).and_then(Scalar::from_value);
    let contents =
        serde_json::to_string_pretty(document).context("failed to serialize completion summary")?;
    write_document(dir, &file_name_for(student_id.as_ref()), &contents)
}

fn write_document(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory '{}'", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, contents)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(path)
}
