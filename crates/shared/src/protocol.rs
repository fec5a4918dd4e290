use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{LearningPlan, StudentRecord, NO_PLAN_STATUS},
    error::RequestError,
};

/// Path of the plan-generation endpoint, relative to the service base URL.
pub const GENERATE_PLAN_PATH: &str = "generate_plan";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePlanRequest {
    pub data: StudentRecord,
}

/// Body the service sends when it gives up on a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub error: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ServiceErrorBody {
    pub fn message(&self) -> String {
        match &self.error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Classifies a 2xx response body.
///
/// An `error` field wins over everything else; a `no_plan` status means the
/// learner has finished the last stage and only a summary comes back.
pub fn decode_plan_response(body: &[u8]) -> Result<LearningPlan, RequestError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| RequestError::MalformedResponse(format!("body is not JSON: {err}")))?;

    let Value::Object(fields) = &value else {
        return Err(RequestError::MalformedResponse(
            "body is not a JSON object".to_string(),
        ));
    };

    if fields.get("error").is_some_and(|error| !error.is_null()) {
        let body: ServiceErrorBody = serde_json::from_value(value)
            .map_err(|err| RequestError::MalformedResponse(err.to_string()))?;
        return Err(RequestError::ServiceError(body.message()));
    }

    if fields.get("status").and_then(Value::as_str) == Some(NO_PLAN_STATUS) {
        let summary = fields
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("the learner has completed the final stage")
            .to_string();
        return Err(RequestError::NoPlan {
            summary,
            document: fields.clone(),
        });
    }

    serde_json::from_value(value).map_err(|err| RequestError::MalformedResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn plan_body() -> Value {
        json!({
            "studentId": 1000001608,
            "current_class": "3",
            "current_level": "Foundation",
            "current_stage": "A",
            "next_level": "Foundation",
            "next_stage": "B",
            "analysis": "...",
            "plan_description": "...",
            "suggested_activities": ["..."],
            "required_outcomes_not_fulfilled": []
        })
    }

    #[test]
    fn decodes_plan_fields_verbatim() {
        let body = plan_body();
        let plan = decode_plan_response(body.to_string().as_bytes()).expect("plan");
        assert_eq!(plan.current_class, Some("3".into()));
        assert_eq!(plan.current_level, "Foundation");
        assert_eq!(plan.next_stage, "B");
        assert_eq!(plan.suggested_activities, vec!["...".to_string()]);
        assert!(plan.required_outcomes_not_fulfilled.is_empty());
        assert_eq!(serde_json::to_value(&plan).expect("encode"), body);
    }

    #[test]
    fn error_field_becomes_service_error() {
        let err = decode_plan_response(br#"{"error":"model unavailable"}"#).expect_err("error");
        assert_eq!(err, RequestError::ServiceError("model unavailable".into()));

        let err = decode_plan_response(br#"{"error":"No JSON block found","raw":"..."}"#)
            .expect_err("error");
        assert_eq!(err, RequestError::ServiceError("No JSON block found".into()));

        let err = decode_plan_response(br#"{"error":{"code":7}}"#).expect_err("error");
        assert_eq!(err, RequestError::ServiceError(r#"{"code":7}"#.into()));
    }

    #[test]
    fn no_plan_status_is_reported_with_summary() {
        let body = json!({"studentId": 1000002009, "status": "no_plan", "summary": "All stages complete"});
        let err = decode_plan_response(body.to_string().as_bytes()).expect_err("no plan");
        assert_eq!(err.to_string(), "No further plan: All stages complete");
        match err {
            RequestError::NoPlan { summary, document } => {
                assert_eq!(summary, "All stages complete");
                assert_eq!(Value::Object(document), body);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn null_error_field_is_not_a_failure() {
        let mut body = plan_body();
        body["error"] = Value::Null;
        let plan = decode_plan_response(body.to_string().as_bytes()).expect("plan");
        assert_eq!(plan.current_stage, "A");
        assert_eq!(plan.extra.get("error"), Some(&Value::Null));
    }

    #[test]
    fn non_plan_shapes_are_malformed() {
        let bodies: [&[u8]; 4] = [b"not json", b"[]", b"42", br#"{"analysis":"only"}"#];
        for body in bodies {
            let err = decode_plan_response(body).expect_err("malformed");
            assert!(
                matches!(err, RequestError::MalformedResponse(_)),
                "unexpected: {err:?}"
            );
        }
    }

    #[test]
    fn request_wraps_record_under_data() {
        let record: StudentRecord =
            serde_json::from_value(json!({"studentId": 1, "roName": "AGRA", "Overall": 3.0}))
                .expect("record");
        let body = serde_json::to_value(GeneratePlanRequest { data: record }).expect("encode");
        assert_eq!(
            body,
            json!({"data": {"studentId": 1, "roName": "AGRA", "Overall": 3.0}})
        );
    }
}
