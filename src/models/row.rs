use serde::Serialize;

use crate::config::constants::ROW_WIDTH;

/// Spreadsheet column headers, in row order
pub const COLUMN_HEADERS: [&str; ROW_WIDTH] = [
    "Timestamp",
    "Name",
    "Phone",
    "Email",
    "Property Type",
    "Area",
    "Budget",
    "Urgency",
    "Notes",
    "Raw JSON",
];

/// A cleaned intake record ready to be appended to the sheet
///
/// Always ten string fields in a fixed order; an empty string means missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRow {
    pub timestamp: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub property_type: String,
    pub area: String,
    pub budget: String,
    pub urgency: String,
    pub notes: String,
    pub raw_json: String,
}

impl NormalizedRow {
    /// Borrow the fields in column order
    pub fn fields(&self) -> [&str; ROW_WIDTH] {
        [
            self.timestamp.as_str(),
            self.name.as_str(),
            self.phone.as_str(),
            self.email.as_str(),
            self.property_type.as_str(),
            self.area.as_str(),
            self.budget.as_str(),
            self.urgency.as_str(),
            self.notes.as_str(),
            self.raw_json.as_str(),
        ]
    }

    /// Owned cell values in column order, as sent to the sheet
    pub fn to_values(&self) -> Vec<String> {
        self.fields().iter().map(|f| f.to_string()).collect()
    }
}
