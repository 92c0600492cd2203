use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::RowSink;
use crate::error::{IntakeError, Result};
use crate::models::NormalizedRow;

/// Sink that keeps rows in memory, for tests and local runs
#[derive(Clone, Default)]
pub struct InMemorySink {
    rows: Arc<Mutex<Vec<NormalizedRow>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, in order
    pub fn rows(&self) -> Vec<NormalizedRow> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RowSink for InMemorySink {
    async fn append(&self, row: &NormalizedRow) -> Result<()> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|e| IntakeError::Unknown(format!("row store poisoned: {}", e)))?;
        rows.push(row.clone());

        tracing::debug!("Stored row {} in memory", rows.len());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
