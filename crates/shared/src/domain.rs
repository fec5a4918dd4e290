use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const STUDENT_ID_FIELD: &str = "studentId";
pub const RO_NAME_FIELD: &str = "roName";
pub const OVERALL_FIELD: &str = "Overall";

/// Keys every assessment record must carry, in the order they are reported.
pub const REQUIRED_FIELDS: [&str; 3] = [STUDENT_ID_FIELD, RO_NAME_FIELD, OVERALL_FIELD];

/// Numeric bookkeeping keys that are identifiers rather than scores.
pub const IDENTIFIER_FIELDS: [&str; 4] = [STUDENT_ID_FIELD, "id", "roID", "kvID"];

/// A string-or-number value carried through verbatim.
///
/// Identifiers and class labels come from spreadsheets, so the same field can
/// arrive as `"3"`, `3` or `1000002009.0` depending on the exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    Text(String),
}

impl Scalar {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => {
                if n.is_f64() {
                    if let Some(v) = n.as_f64() {
                        if v.fract() == 0.0 && v.abs() < 1e15 {
                            return write!(f, "{v:.0}");
                        }
                    }
                }
                write!(f, "{n}")
            }
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// One student's assessment row: field name to score or identifying string.
///
/// Key order is kept as supplied so the record goes over the wire exactly as
/// the operator entered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRecord(Map<String, Value>);

impl StudentRecord {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn student_id(&self) -> Option<Scalar> {
        self.get(STUDENT_ID_FIELD).and_then(Scalar::from_value)
    }

    pub fn ro_name(&self) -> Option<&str> {
        self.get(RO_NAME_FIELD).and_then(Value::as_str)
    }

    pub fn overall(&self) -> Option<f64> {
        self.get(OVERALL_FIELD).and_then(Value::as_f64)
    }

    /// Numeric fields that are scores, i.e. everything numeric except identifiers.
    pub fn scores(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().filter_map(|(key, value)| {
            if IDENTIFIER_FIELDS.contains(&key.as_str()) {
                return None;
            }
            value.as_f64().map(|score| (key.as_str(), score))
        })
    }
}

pub const NO_PLAN_STATUS: &str = "no_plan";

/// The plan document produced by the remote service.
///
/// Fields the service adds beyond the ones named here are kept in `extra` so
/// an exported plan matches what the service sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlan {
    #[serde(rename = "studentId", default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_class: Option<Scalar>,
    pub current_level: String,
    pub current_stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_class: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_level: Option<String>,
    pub next_stage: String,
    pub analysis: String,
    pub plan_description: String,
    pub suggested_activities: Vec<String>,
    pub required_outcomes_not_fulfilled: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LearningPlan {
    pub fn is_no_plan(&self) -> bool {
        self.status.as_deref() == Some(NO_PLAN_STATUS)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn integral_float_ids_display_without_fraction() {
        let id: Scalar = serde_json::from_value(json!(1000002009.0)).expect("scalar");
        assert_eq!(id.to_string(), "1000002009");

        let id: Scalar = serde_json::from_value(json!(1000001608)).expect("scalar");
        assert_eq!(id.to_string(), "1000001608");

        let id: Scalar = serde_json::from_value(json!(2.5)).expect("scalar");
        assert_eq!(id.to_string(), "2.5");

        assert_eq!(Scalar::from("S-42").to_string(), "S-42");
    }

    #[test]
    fn scores_skip_identifiers_and_text() {
        let record: StudentRecord = serde_json::from_value(json!({
            "roName": "AGRA",
            "id": 11420.0,
            "studentId": 1000002009.0,
            "roID": 101.0,
            "kvID": 1704.0,
            "IOE1": 2.0,
            "English": 3.5,
            "Overall": 2.0
        }))
        .expect("record");

        let scores: Vec<_> = record.scores().collect();
        assert_eq!(scores, vec![("IOE1", 2.0), ("English", 3.5), ("Overall", 2.0)]);
        assert_eq!(record.ro_name(), Some("AGRA"));
        assert_eq!(record.overall(), Some(2.0));
        assert_eq!(record.student_id().map(|id| id.to_string()).as_deref(), Some("1000002009"));
    }

    #[test]
    fn plan_keeps_unknown_fields() {
        let body = json!({
            "studentId": 7,
            "current_level": "L1",
            "current_stage": "Entry",
            "next_stage": "Exit",
            "analysis": "a",
            "plan_description": "p",
            "suggested_activities": [],
            "required_outcomes_not_fulfilled": ["o"],
            "confidence": 0.8
        });
        let plan: LearningPlan = serde_json::from_value(body.clone()).expect("plan");
        assert_eq!(plan.extra.get("confidence"), Some(&json!(0.8)));
        assert_eq!(serde_json::to_value(&plan).expect("encode"), body);
    }
}
