use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Caller intake fields as produced by the voice assistant's structured output
///
/// Every field is optional; anything missing, `null` or non-scalar decodes to
/// an empty string. Numbers and booleans keep their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IntakeRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub caller_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub caller_phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub caller_email: String,
    #[serde(default, rename = "propertyType", deserialize_with = "lenient_string")]
    pub property_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub area: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub budget: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub urgency: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
}

impl IntakeRecord {
    /// Decode a structured-output result; non-objects yield an empty record
    pub fn from_result(result: &Value) -> Self {
        if !result.is_object() {
            return Self::default();
        }
        serde_json::from_value(result.clone()).unwrap_or_default()
    }
}

/// Earlier webhook format with caller details split across three sections
#[derive(Debug, Default, Deserialize)]
pub struct LegacyPayload {
    #[serde(default)]
    pub caller: Option<LegacyCaller>,
    #[serde(default)]
    pub details: Option<LegacyDetails>,
    #[serde(default)]
    pub summary: Option<LegacySummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacyCaller {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacyDetails {
    #[serde(default, rename = "propertyType", deserialize_with = "lenient_string")]
    pub property_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub area: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub budget: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub urgency: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacySummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
}

impl LegacyPayload {
    /// Parse the legacy sections out of a webhook body
    ///
    /// Returns `None` when none of the sections are present.
    pub fn from_body(body: &Value) -> Option<Self> {
        let payload: LegacyPayload = serde_json::from_value(body.clone()).ok()?;
        if payload.caller.is_none() && payload.details.is_none() && payload.summary.is_none() {
            return None;
        }
        Some(payload)
    }
}

impl From<LegacyPayload> for IntakeRecord {
    fn from(payload: LegacyPayload) -> Self {
        let caller = payload.caller.unwrap_or_default();
        let details = payload.details.unwrap_or_default();
        let summary = payload.summary.unwrap_or_default();

        IntakeRecord {
            caller_name: caller.name,
            caller_phone: caller.phone,
            caller_email: caller.email,
            property_type: details.property_type,
            area: details.area,
            budget: details.budget,
            urgency: details.urgency,
            notes: summary.notes,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}
