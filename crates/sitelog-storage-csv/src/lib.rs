use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use sitelog_core::{
    storage::{ensure_record_width, ensure_row_index},
    CoreError, RecordStore,
};
use sitelog_domain::{Record, Schema};
use tracing::{debug, warn};

/// Written once at the start of a new table so spreadsheet tools pick UTF-8.
const BOM: &str = "\u{feff}";
const TMP_SUFFIX: &str = "tmp";

/// Record store backed by a single comma-separated file whose header row is
/// the schema keys.
///
/// Appends open the file, write one row and close it again. Updates and
/// deletes rewrite the whole table through a temporary file and a rename.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
    schema: Schema,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Vec<Record>, CoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        let data = data.strip_prefix(BOM).unwrap_or(&data);
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());

        let header = reader.headers().map_err(csv_error)?;
        if !header.iter().eq(self.schema.keys()) {
            warn!(
                path = %self.path.display(),
                "header does not match the schema keys, reading by position"
            );
        }

        let width = self.schema.len();
        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row.map_err(csv_error)?;
            let values = row.iter().map(str::to_string).collect::<Vec<_>>();
            rows.push(Record::new(values).conform(width));
        }
        Ok(rows)
    }

    fn write_rows(&self, rows: &[Record]) -> Result<(), CoreError> {
        let mut buffer = BOM.as_bytes().to_vec();
        {
            let mut writer = csv::Writer::from_writer(&mut buffer);
            writer
                .write_record(self.schema.keys())
                .map_err(csv_error)?;
            for row in rows {
                writer.write_record(&row.values).map_err(csv_error)?;
            }
            writer.flush()?;
        }
        write_atomic(&self.path, &buffer)?;
        debug!(path = %self.path.display(), rows = rows.len(), "rewrote csv table");
        Ok(())
    }

    fn needs_header(&self) -> bool {
        fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }
}

impl RecordStore for CsvRecordStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn append(&self, record: &Record) -> Result<(), CoreError> {
        ensure_record_width(&self.schema, record)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let new_table = self.needs_header();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if new_table {
            file.write_all(BOM.as_bytes())?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if new_table {
            writer
                .write_record(self.schema.keys())
                .map_err(csv_error)?;
        }
        writer.write_record(&record.values).map_err(csv_error)?;
        writer.flush()?;
        debug!(path = %self.path.display(), new_table, "appended csv row");
        Ok(())
    }

    fn update(&self, index: usize, record: &Record) -> Result<(), CoreError> {
        ensure_record_width(&self.schema, record)?;
        let mut rows = self.read_rows()?;
        ensure_row_index(index, rows.len())?;
        rows[index] = record.clone();
        self.write_rows(&rows)
    }

    fn delete(&self, index: usize) -> Result<(), CoreError> {
        let mut rows = self.read_rows()?;
        ensure_row_index(index, rows.len())?;
        rows.remove(index);
        self.write_rows(&rows)
    }

    fn list(&self) -> Result<Vec<Record>, CoreError> {
        self.read_rows()
    }
}

fn csv_error(err: csv::Error) -> CoreError {
    CoreError::StoreIo(err.to_string())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
