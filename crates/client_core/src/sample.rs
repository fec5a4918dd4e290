use serde_json::json;
use shared::domain::StudentRecord;

/// A complete FLN assessment row, handy for trying the service end to end.
pub fn sample_record() -> StudentRecord {
    let value = json!({
        "roName": "AGRA",
        "id": 11420.0,
        "studentId": 1000002009.0,
        "roID": 101.0,
        "kvID": 1704.0,
        "IOE1": 2.0,
        "IOE2": 2.0,
        "IWE1": 2.0,
        "IWE2": 2.0,
        "IWE3": 2.0,
        "IWE4": 2.0,
        "IRE1": 2.0,
        "IRE2": 2.0,
        "IRE3": 2.0,
        "IRE4": 2.0,
        "English": 2.0,
        "IHOE1": 2.0,
        "IHOE2": 2.0,
        "IHRE1": 2.0,
        "IHRE2": 2.0,
        "IHRE3": 2.0,
        "IHRE4": 2.0,
        "IHWE1": 2.0,
        "IHWE2": 2.0,
        "IHWE3": 2.0,
        "IHWE4": 2.0,
        "Hindi": 2.0,
        "INE1": 2.0,
        "INE2": 2.0,
        "INE3": 2.0,
        "INE4": 2.0,
        "INE5": 2.0,
        "INE6": 2.0,
        "INE7": 2.0,
        "Numeracy": 2.0,
        "Overall": 2.0
    });
    match value {
        serde_json::Value::Object(fields) => StudentRecord::from_fields(fields),
        _ => unreachable!("json! object literal"),
    }
}

/// The sample record as the pretty-printed text an operator would paste.
pub fn sample_text() -> String {
    serde_json::to_string_pretty(&sample_record()).unwrap_or_default()
}
