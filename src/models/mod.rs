pub mod requests;
pub mod responses;
pub mod row;

pub use requests::{IntakeRecord, LegacyPayload};
pub use responses::{HealthResponse, WebhookResponse};
pub use row::{NormalizedRow, COLUMN_HEADERS};
