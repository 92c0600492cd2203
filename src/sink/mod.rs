pub mod memory;
pub mod sheets;
pub mod token;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::NormalizedRow;

pub use memory::InMemorySink;
pub use sheets::GoogleSheetsSink;

/// Append-only, order-preserving destination for normalized rows
#[async_trait]
pub trait RowSink: Send + Sync {
    async fn append(&self, row: &NormalizedRow) -> Result<()>;

    /// Short label used in startup and access logs
    fn describe(&self) -> String;
}
