use chrono::{DateTime, Local, TimeZone};
use serde_json::{Map, Value};
use std::fmt::Display;

use crate::error::Result;
use crate::models::{IntakeRecord, LegacyPayload, NormalizedRow};
use crate::services::output_selection::{OutputSelector, SelectionReason};
use crate::text_processing::intake_normalization::{
    normalize_budget, normalize_email, normalize_phone, normalize_property_type,
};

/// Where in the webhook body the intake record was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    StructuredOutput { key: String, reason: SelectionReason },
    /// Top-level `caller` / `details` / `summary` sections
    Legacy,
    /// Nothing recognizable; the row is appended with empty fields
    Missing,
}

#[derive(Debug, Clone)]
pub struct ExtractedRecord {
    pub record: IntakeRecord,
    /// The JSON stored verbatim in the last column
    pub raw: Value,
    pub source: RecordSource,
}

/// Locate the intake record inside a webhook body
pub fn extract_record(body: &Value, selector: &OutputSelector) -> ExtractedRecord {
    if let Some(outputs) = body
        .pointer("/message/artifact/structuredOutputs")
        .and_then(Value::as_object)
    {
        if let Some(selected) = selector.select(outputs) {
            if selected.reason == SelectionReason::SortedFallback {
                tracing::warn!(
                    outputs = outputs.len(),
                    selected = selected.key,
                    preferred = ?selector.preferred(),
                    "No preferred structured output found, using smallest key"
                );
            }

            let raw = match selected.result {
                Some(Value::Null) | None => Value::Object(Map::new()),
                Some(result) => result.clone(),
            };

            return ExtractedRecord {
                record: IntakeRecord::from_result(&raw),
                raw,
                source: RecordSource::StructuredOutput {
                    key: selected.key.to_string(),
                    reason: selected.reason,
                },
            };
        }
    }

    if let Some(legacy) = LegacyPayload::from_body(body) {
        return ExtractedRecord {
            record: legacy.into(),
            raw: body.clone(),
            source: RecordSource::Legacy,
        };
    }

    tracing::warn!("Webhook body has no structured output or caller details");

    ExtractedRecord {
        record: IntakeRecord::default(),
        raw: Value::Object(Map::new()),
        source: RecordSource::Missing,
    }
}

/// Normalize a record into the ten sheet columns
///
/// Name, area, urgency and notes pass through untouched.
pub fn build_row(record: &IntakeRecord, raw_json: String, timestamp: String) -> NormalizedRow {
    NormalizedRow {
        timestamp,
        name: record.caller_name.clone(),
        phone: normalize_phone(&record.caller_phone),
        email: normalize_email(&record.caller_email),
        property_type: normalize_property_type(&record.property_type),
        area: record.area.clone(),
        budget: normalize_budget(&record.budget),
        urgency: record.urgency.clone(),
        notes: record.notes.clone(),
        raw_json,
    }
}

/// Format a creation time like "10/19/2026, 1:35:07 PM"
pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Turn a webhook body into a row stamped with the given time
pub fn normalize_payload(
    body: &Value,
    selector: &OutputSelector,
    timestamp: String,
) -> Result<NormalizedRow> {
    let extracted = extract_record(body, selector);
    tracing::debug!(source = ?extracted.source, "Extracted intake record");

    let raw_json = serde_json::to_string(&extracted.raw)?;
    Ok(build_row(&extracted.record, raw_json, timestamp))
}

/// Turn a webhook body into a row stamped with the current local time
pub fn process_payload(body: &Value, selector: &OutputSelector) -> Result<NormalizedRow> {
    normalize_payload(body, selector, format_timestamp(&Local::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    fn selector() -> OutputSelector {
        OutputSelector::new(vec!["lead_intake".to_string()])
    }

    fn webhook(result: Value) -> Value {
        json!({
            "message": {
                "type": "end-of-call-report",
                "artifact": {
                    "structuredOutputs": {
                        "0b6e5c1a": {"name": "lead_intake", "result": result}
                    }
                }
            }
        })
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_format_timestamp_afternoon() {
        assert_eq!(format_timestamp(&at(13, 5, 7)), "10/19/2026, 1:05:07 PM");
    }

    #[test]
    fn test_format_timestamp_midnight() {
        assert_eq!(format_timestamp(&at(0, 0, 0)), "10/19/2026, 12:00:00 AM");
    }

    #[test]
    fn test_extract_structured_output() {
        let body = webhook(json!({"caller_name": "Asha", "budget": "two million"}));
        let extracted = extract_record(&body, &selector());

        assert_eq!(extracted.record.caller_name, "Asha");
        assert_eq!(extracted.raw, json!({"caller_name": "Asha", "budget": "two million"}));
        assert_eq!(
            extracted.source,
            RecordSource::StructuredOutput {
                key: "0b6e5c1a".to_string(),
                reason: SelectionReason::Preferred
            }
        );
    }

    #[test]
    fn test_extract_null_result_is_empty_object() {
        let extracted = extract_record(&webhook(Value::Null), &selector());

        assert_eq!(extracted.record, IntakeRecord::default());
        assert_eq!(extracted.raw, json!({}));
    }

    #[test]
    fn test_extract_legacy_body() {
        let body = json!({
            "caller": {"name": "Ravi", "phone": "(555) 010-0199"},
            "details": {"budget": "five thousand"}
        });
        let extracted = extract_record(&body, &selector());

        assert_eq!(extracted.source, RecordSource::Legacy);
        assert_eq!(extracted.record.caller_name, "Ravi");
        assert_eq!(extracted.raw, body);
    }

    #[test]
    fn test_extract_missing() {
        let extracted = extract_record(&json!({"message": {"type": "status-update"}}), &selector());

        assert_eq!(extracted.source, RecordSource::Missing);
        assert_eq!(extracted.raw, json!({}));
    }

    #[test]
    fn test_empty_structured_outputs_is_missing() {
        let body = json!({"message": {"artifact": {"structuredOutputs": {}}}});
        assert_eq!(extract_record(&body, &selector()).source, RecordSource::Missing);
    }

    #[test]
    fn test_build_row_normalizes_and_passes_through() {
        let record = IntakeRecord {
            caller_name: "  Asha Rao ".to_string(),
            caller_phone: "+1 (555) 123-4567".to_string(),
            caller_email: "asha attherate gmail dot com".to_string(),
            property_type: "2 bhk".to_string(),
            area: "Whitefield, Bangalore".to_string(),
            budget: "1234567 dollars".to_string(),
            urgency: "ASAP".to_string(),
            notes: "Prefers east facing".to_string(),
        };

        let row = build_row(&record, "{}".to_string(), "ts".to_string());

        assert_eq!(row.timestamp, "ts");
        assert_eq!(row.name, "  Asha Rao ");
        assert_eq!(row.phone, "15551234567");
        assert_eq!(row.email, "asha@gmail.com");
        assert_eq!(row.property_type, "2BHK");
        assert_eq!(row.area, "Whitefield, Bangalore");
        assert_eq!(row.budget, "$1,234,567");
        assert_eq!(row.urgency, "ASAP");
        assert_eq!(row.notes, "Prefers east facing");
        assert_eq!(row.raw_json, "{}");
    }

    #[test]
    fn test_normalize_payload_raw_json_keeps_key_order() {
        let body = webhook(json!({"notes": "n", "caller_name": "Z", "area": "A"}));
        let row = normalize_payload(&body, &selector(), "ts".to_string()).unwrap();

        assert_eq!(row.raw_json, r#"{"notes":"n","caller_name":"Z","area":"A"}"#);
    }

    #[test]
    fn test_normalize_payload_empty_body() {
        let row = normalize_payload(&json!({}), &selector(), "ts".to_string()).unwrap();

        assert_eq!(row.fields()[1..9], ["", "", "", "", "", "", "", ""]);
        assert_eq!(row.raw_json, "{}");
    }

    #[test]
    fn test_process_payload_stamps_time() {
        let row = process_payload(&webhook(json!({})), &selector()).unwrap();
        assert!(row.timestamp.contains(", "));
        assert!(row.timestamp.ends_with("AM") || row.timestamp.ends_with("PM"));
    }
}
