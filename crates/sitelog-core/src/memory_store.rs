use std::sync::{Mutex, MutexGuard};

use sitelog_domain::{Record, Schema};
use tracing::debug;

use crate::storage::{ensure_record_width, ensure_row_index, RecordStore};
use crate::CoreError;

/// Process-local record store. Nothing survives the process.
#[derive(Debug)]
pub struct MemoryRecordStore {
    schema: Schema,
    rows: Mutex<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(schema: Schema, records: Vec<Record>) -> Self {
        Self {
            schema,
            rows: Mutex::new(records),
        }
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<Record>>, CoreError> {
        self.rows
            .lock()
            .map_err(|_| CoreError::StoreIo("memory store lock poisoned".into()))
    }
}

impl RecordStore for MemoryRecordStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn append(&self, record: &Record) -> Result<(), CoreError> {
        ensure_record_width(&self.schema, record)?;
        let mut rows = self.rows()?;
        rows.push(record.clone());
        debug!(row = rows.len() - 1, "appended record to memory store");
        Ok(())
    }

    fn update(&self, index: usize, record: &Record) -> Result<(), CoreError> {
        ensure_record_width(&self.schema, record)?;
        let mut rows = self.rows()?;
        ensure_row_index(index, rows.len())?;
        rows[index] = record.clone();
        Ok(())
    }

    fn delete(&self, index: usize) -> Result<(), CoreError> {
        let mut rows = self.rows()?;
        ensure_row_index(index, rows.len())?;
        rows.remove(index);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Record>, CoreError> {
        Ok(self.rows()?.clone())
    }

    fn len(&self) -> Result<usize, CoreError> {
        Ok(self.rows()?.len())
    }
}
