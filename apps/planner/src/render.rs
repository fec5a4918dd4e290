use std::fmt::Write as _;

use shared::domain::{LearningPlan, Scalar};

fn placement(class: Option<&Scalar>, level: Option<&str>, stage: &str) -> String {
    let mut parts = Vec::new();
    if let Some(class) = class {
        parts.push(format!("class {class}"));
    }
    if let Some(level) = level {
        parts.push(format!("level {level}"));
    }
    parts.push(format!("stage {stage}"));
    parts.join(", ")
}

pub fn render_plan(plan: &LearningPlan) -> String {
    let mut out = String::new();
    let student = plan
        .student_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown student".to_string());

    let _ = writeln!(out, "Learning plan for {student}");
    let _ = writeln!(
        out,
        "  Current: {}",
        placement(
            plan.current_class.as_ref(),
            Some(plan.current_level.as_str()),
            &plan.current_stage
        )
    );
    let _ = writeln!(
        out,
        "  Next:    {}",
        placement(
            plan.next_class.as_ref(),
            plan.next_level.as_deref(),
            &plan.next_stage
        )
    );

    let _ = writeln!(out, "\nAnalysis\n{}", plan.analysis.trim_end());
    let _ = writeln!(out, "\nPlan\n{}", plan.plan_description.trim_end());

    let _ = writeln!(out, "\nSuggested activities");
    if plan.suggested_activities.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (index, activity) in plan.suggested_activities.iter().enumerate() {
        let _ = writeln!(out, "  {}. {activity}", index + 1);
    }

    let _ = writeln!(out, "\nOutcomes not yet fulfilled");
    if plan.required_outcomes_not_fulfilled.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for outcome in &plan.required_outcomes_not_fulfilled {
        let _ = writeln!(out, "  - {outcome}");
    }

    if let Some(summary) = &plan.summary {
        let _ = writeln!(out, "\nSummary\n{}", summary.trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_every_section_in_order() {
        let plan: LearningPlan = serde_json::from_value(json!({
            "studentId": 1000002009.0,
            "current_class": 1,
            "current_level": "L2",
            "current_stage": "Exit",
            "next_level": "L3",
            "next_stage": "Entry",
            "analysis": "You have to do well in reading.\n",
            "plan_description": "Read every day.",
            "suggested_activities": ["Story circle", "Number walk"],
            "required_outcomes_not_fulfilled": []
        }))
        .expect("plan");

        let text = render_plan(&plan);
        assert!(text.starts_with("Learning plan for 1000002009\n"), "{text}");
        assert!(text.contains("  Current: class 1, level L2, stage Exit\n"));
        assert!(text.contains("  Next:    level L3, stage Entry\n"));
        assert!(text.contains("\nAnalysis\nYou have to do well in reading.\n"));
        assert!(text.contains("  1. Story circle\n  2. Number walk\n"));
        assert!(text.contains("Outcomes not yet fulfilled\n  (none)\n"));
        assert!(text.find("Analysis").unwrap() < text.find("Suggested activities").unwrap());
    }
}
