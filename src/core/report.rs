use crate::core::term::Term;
use crate::domain::model::{CourseId, TriggerId, TriggerOutcome};
use crate::utils::error::{Result, TriggerError};
use serde::Serialize;

/// 單一觸發器在報表中的一列
#[derive(Debug, Clone, Serialize)]
pub struct TriggerReport {
    pub trigger_id: TriggerId,
    pub field: Option<String>,
    pub boundary: Option<i64>,
    pub boundary_term: Option<String>,
    pub due_courses: Vec<CourseId>,
    pub skipped_terms: Vec<i64>,
    pub error: Option<String>,
}

impl TriggerReport {
    pub fn from_result(trigger_id: TriggerId, result: &Result<TriggerOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                trigger_id,
                field: Some(outcome.field.clone()),
                boundary: Some(outcome.selection.boundary),
                boundary_term: Term::decode(outcome.selection.boundary).map(|t| t.to_string()),
                due_courses: outcome.due_courses.clone(),
                skipped_terms: outcome.skipped_terms.clone(),
                error: None,
            },
            Err(e) => Self {
                trigger_id,
                field: None,
                boundary: None,
                boundary_term: None,
                due_courses: Vec::new(),
                skipped_terms: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

pub fn build_reports(results: &[(TriggerId, Result<TriggerOutcome>)]) -> Vec<TriggerReport> {
    results
        .iter()
        .map(|(trigger_id, result)| TriggerReport::from_result(*trigger_id, result))
        .collect()
}

pub fn render_text(reports: &[TriggerReport], include_courses: bool) -> String {
    let mut lines = Vec::new();
    for report in reports {
        match &report.error {
            Some(error) => lines.push(format!("trigger {}: error: {}", report.trigger_id, error)),
            None => {
                let boundary = match (&report.boundary_term, report.boundary) {
                    (Some(term), Some(code)) => format!("{} ({})", code, term),
                    (None, Some(code)) => code.to_string(),
                    _ => "-".to_string(),
                };
                lines.push(format!(
                    "trigger {}: field '{}', due below {}, {} course(s)",
                    report.trigger_id,
                    report.field.as_deref().unwrap_or("-"),
                    boundary,
                    report.due_courses.len()
                ));
                if include_courses && !report.due_courses.is_empty() {
                    let ids: Vec<String> =
                        report.due_courses.iter().map(|id| id.to_string()).collect();
                    lines.push(format!("  courses: {}", ids.join(",")));
                }
                if !report.skipped_terms.is_empty() {
                    lines.push(format!("  skipped invalid terms: {:?}", report.skipped_terms));
                }
            }
        }
    }
    lines.join("\n")
}

pub fn render_json(reports: &[TriggerReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

/// 每門到期課程一列: trigger_id,course_id,field,boundary
pub fn render_csv(reports: &[TriggerReport]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["trigger_id", "course_id", "field", "boundary"])?;

    for report in reports.iter().filter(|r| r.error.is_none()) {
        let field = report.field.clone().unwrap_or_default();
        let boundary = report.boundary.map(|b| b.to_string()).unwrap_or_default();
        for course_id in &report.due_courses {
            writer.write_record([
                report.trigger_id.to_string(),
                course_id.to_string(),
                field.clone(),
                boundary.clone(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TriggerError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| TriggerError::ConfigValidationError {
        field: "output".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DueSelection;

    fn results() -> Vec<(TriggerId, Result<TriggerOutcome>)> {
        vec![
            (
                1,
                Ok(TriggerOutcome {
                    trigger_id: 1,
                    field: "lectureterm".to_string(),
                    selection: DueSelection::new(3, 20241),
                    due_courses: vec![10, 12],
                    skipped_terms: vec![0],
                }),
            ),
            (
                2,
                Err(TriggerError::MissingField {
                    field: "gone".to_string(),
                }),
            ),
        ]
    }

    #[test]
    fn test_text_report() {
        let reports = build_reports(&results());
        let text = render_text(&reports, true);

        assert!(text.contains("trigger 1: field 'lectureterm', due below 20241 (Winter 2024/25), 2 course(s)"));
        assert!(text.contains("  courses: 10,12"));
        assert!(text.contains("  skipped invalid terms: [0]"));
        assert!(text.contains("trigger 2: error: The configured custom field 'gone' is missing"));
    }

    #[test]
    fn test_json_report() {
        let reports = build_reports(&results());
        let json: serde_json::Value = serde_json::from_str(&render_json(&reports).unwrap()).unwrap();

        assert_eq!(json[0]["boundary"], 20241);
        assert_eq!(json[0]["due_courses"], serde_json::json!([10, 12]));
        assert!(json[1]["error"].as_str().unwrap().contains("gone"));
    }

    #[test]
    fn test_csv_report() {
        let reports = build_reports(&results());
        let csv = render_csv(&reports).unwrap();

        assert_eq!(
            csv,
            "trigger_id,course_id,field,boundary\n1,10,lectureterm,20241\n1,12,lectureterm,20241\n"
        );
    }
}
