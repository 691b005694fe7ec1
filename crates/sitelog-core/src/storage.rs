use sitelog_domain::{Record, Schema};

use crate::{CoreError, RecordFilter};

/// Abstraction over persistence backends holding committed records.
///
/// Rows are identified by their position in storage order. Positions shift
/// after a delete, so callers re-resolve indices after every mutation.
pub trait RecordStore: Send + Sync {
    /// Schema whose keys name the stored columns.
    fn schema(&self) -> &Schema;
    fn append(&self, record: &Record) -> Result<(), CoreError>;
    fn update(&self, index: usize, record: &Record) -> Result<(), CoreError>;
    fn delete(&self, index: usize) -> Result<(), CoreError>;
    fn list(&self) -> Result<Vec<Record>, CoreError>;

    fn len(&self) -> Result<usize, CoreError> {
        Ok(self.list()?.len())
    }

    /// Records matching `filter`, in storage order.
    fn filter(&self, filter: &RecordFilter) -> Result<Vec<Record>, CoreError> {
        Ok(self
            .filter_indexed(filter)?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Like [`RecordStore::filter`], paired with each record's current row index.
    fn filter_indexed(&self, filter: &RecordFilter) -> Result<Vec<(usize, Record)>, CoreError> {
        let schema = self.schema();
        Ok(self
            .list()?
            .into_iter()
            .enumerate()
            .filter(|(_, record)| filter.matches(schema, record))
            .collect())
    }
}

/// Rejects records whose width differs from the schema.
pub fn ensure_record_width(schema: &Schema, record: &Record) -> Result<(), CoreError> {
    if record.len() != schema.len() {
        return Err(CoreError::InvalidOperation(format!(
            "record has {} values but the schema has {} columns",
            record.len(),
            schema.len()
        )));
    }
    Ok(())
}

/// Validates a row position against the current row count.
pub fn ensure_row_index(index: usize, len: usize) -> Result<(), CoreError> {
    if index >= len {
        return Err(CoreError::RowIndexOutOfRange { index, len });
    }
    Ok(())
}
