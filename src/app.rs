//! Application facade tying the default schema, the CSV store and the user
//! configuration together.

use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
};

use sitelog_config::{Config, ConfigManager, ReentryMode};
use sitelog_core::{
    Clock, CommitOutcome, CoreError, RecordFilter, RecordStore, ReentryPolicy, SystemClock,
    WizardSession,
};
use sitelog_domain::{site_visit_schema, AnswerValue, Record, Schema};
use sitelog_storage_csv::CsvRecordStore;
use tracing::{info, warn};

use crate::errors::{Result, SiteLogError};

/// Overrides the directory holding `config.json` (and the default table).
pub const HOME_ENV: &str = "SITELOG_HOME";
const HOME_DIR: &str = "sitelog";
const STORE_FILE: &str = "site_visits.csv";

/// Raw `key=value` input, keyed by field key.
pub type FieldValues = BTreeMap<String, String>;

pub struct SiteLog {
    config: Config,
    schema: Schema,
    store: CsvRecordStore,
    clock: Box<dyn Clock>,
}

impl SiteLog {
    /// Opens the log described by `config`. When no store path is configured
    /// the table lives in `home`, or in the documents directory without one.
    pub fn open(config: Config, home: Option<&Path>) -> Result<Self> {
        let schema = site_visit_schema()?;
        let path = match (&config.store_path, home) {
            (Some(path), _) => path.clone(),
            (None, Some(home)) => home.join(STORE_FILE),
            (None, None) => config.resolve_store_path(),
        };
        info!(path = %path.display(), "opening site visit log");
        Ok(Self {
            store: CsvRecordStore::new(path, schema.clone()),
            schema,
            config,
            clock: Box::new(SystemClock),
        })
    }

    /// Loads the configuration from `$SITELOG_HOME` or the platform config
    /// directory and opens the log it points at.
    pub fn from_env() -> Result<Self> {
        let home = env::var_os(HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let base = home.clone().unwrap_or_else(default_home);
        let config = ConfigManager::with_base_dir(base)?.load()?;
        Self::open(config, home.as_deref())
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &CsvRecordStore {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn reentry_policy(&self) -> ReentryPolicy {
        match self.config.reentry {
            ReentryMode::Blank => ReentryPolicy::BlankRestart,
            ReentryMode::CarryForward => ReentryPolicy::CarryForward,
        }
    }

    /// Every stored record with its row index.
    pub fn list(&self) -> Result<Vec<(usize, Record)>> {
        self.filter(&RecordFilter::new())
    }

    pub fn filter(&self, filter: &RecordFilter) -> Result<Vec<(usize, Record)>> {
        Ok(self.store.filter_indexed(filter)?)
    }

    pub fn last_record(&self) -> Result<Option<Record>> {
        Ok(self.store.list()?.pop())
    }

    /// Runs `values` through a fresh session and appends the result.
    pub fn add(&self, values: &FieldValues) -> Result<Record> {
        let mut session = WizardSession::new(&self.schema);
        self.fill(&mut session, values)?;
        let record = session.record();
        session.commit(&self.store)?;
        Ok(record)
    }

    /// Like [`SiteLog::add`], but starts from the last stored record with
    /// today's date and no memo.
    pub fn add_from_last(&self, values: &FieldValues) -> Result<Record> {
        let Some(previous) = self.last_record()? else {
            return self.add(values);
        };
        let mut session =
            WizardSession::from_template(&self.schema, &previous, self.clock.today());
        self.fill(&mut session, values)?;
        let record = session.record();
        session.commit(&self.store)?;
        Ok(record)
    }

    /// Applies `values` on top of row `row`. Fields not mentioned keep their
    /// stored value.
    pub fn edit(&self, row: usize, values: &FieldValues) -> Result<Record> {
        let existing = self.record_at(row)?;
        let mut session = WizardSession::edit(&self.schema, row, &existing);
        self.fill(&mut session, values)?;
        let record = session.record();
        match session.commit(&self.store)? {
            CommitOutcome::Updated(_) => Ok(record),
            CommitOutcome::Appended => Err(SiteLogError::Core(CoreError::InvalidOperation(
                format!("row {} disappeared while editing", row),
            ))),
        }
    }

    /// Removes row `row` and returns what it held.
    pub fn delete(&self, row: usize) -> Result<Record> {
        let existing = self.record_at(row)?;
        self.store.delete(row)?;
        info!(row, "deleted record");
        Ok(existing)
    }

    fn record_at(&self, row: usize) -> Result<Record> {
        let mut rows = self.store.list()?;
        let len = rows.len();
        if row >= len {
            return Err(CoreError::RowIndexOutOfRange { index: row, len }.into());
        }
        Ok(rows.swap_remove(row))
    }

    /// Drives `session` to its summary without interaction: supplied values
    /// are validated in field order, fields that already hold an answer are
    /// skipped, the rest are submitted empty so required ones are reported.
    fn fill(&self, session: &mut WizardSession<'_>, values: &FieldValues) -> Result<()> {
        if let Some(unknown) = values.keys().find(|key| self.schema.position(key).is_none()) {
            return Err(SiteLogError::Usage(format!("unknown field `{}`", unknown)));
        }

        while let Some(step) = session.current_step() {
            let key = step.field.key.clone();
            let kind = step.field.kind.clone();
            let answered = step.value.is_some();
            match values.get(&key) {
                Some(raw) => {
                    session.advance(AnswerValue::parse_for(&kind, raw))?;
                }
                None if answered => {
                    session.skip();
                }
                None => {
                    session.advance(None)?;
                }
            }
        }

        for key in values.keys() {
            let hidden = self
                .schema
                .position(key)
                .is_some_and(|index| !self.schema.is_visible(index, session.answers()));
            if hidden {
                warn!(%key, "value ignored, the field does not apply to this visit");
            }
        }
        Ok(())
    }
}

fn default_home() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HOME_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::tempdir;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
        }
    }

    fn values(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn open(dir: &Path) -> SiteLog {
        SiteLog::open(Config::default(), Some(dir))
            .unwrap()
            .with_clock(FixedClock)
    }

    const RIVERSIDE: &[(&str, &str)] = &[
        ("date", "2024-05-20"),
        ("name", "Riverside"),
        ("type", "아파트"),
        ("price", "42,000"),
        ("floor", "12"),
        ("comment", "south facing"),
    ];

    #[test]
    fn store_defaults_to_home_directory() {
        let dir = tempdir().unwrap();
        let app = open(dir.path());
        assert_eq!(app.store().path(), dir.path().join(STORE_FILE));
        assert_eq!(app.reentry_policy(), ReentryPolicy::CarryForward);
    }

    #[test]
    fn add_normalizes_and_appends() {
        let dir = tempdir().unwrap();
        let app = open(dir.path());
        let record = app.add(&values(RIVERSIDE)).unwrap();
        assert_eq!(record.get(app.schema(), "price"), Some("42000"));

        let rows = app.list().unwrap();
        assert_eq!(rows, vec![(0, record)]);
    }

    #[test]
    fn add_reports_missing_required_field_without_writing() {
        let dir = tempdir().unwrap();
        let app = open(dir.path());
        let err = app
            .add(&values(&[("date", "2024-05-20"), ("type", "아파트")]))
            .unwrap_err();
        assert!(matches!(
            err,
            SiteLogError::Core(CoreError::RequiredFieldMissing { ref key, .. }) if key == "name"
        ));
        assert!(app.list().unwrap().is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let app = open(dir.path());
        let err = app.add(&values(&[("colour", "blue")])).unwrap_err();
        assert!(matches!(err, SiteLogError::Usage(_)));
    }

    #[test]
    fn land_drops_floor_value() {
        let dir = tempdir().unwrap();
        let app = open(dir.path());
        let mut input = values(RIVERSIDE);
        input.insert("type".into(), "토지".into());
        input.insert("land_use".into(), "임야".into());
        let record = app.add(&input).unwrap();
        assert_eq!(record.get(app.schema(), "floor"), Some(""));
        assert_eq!(record.get(app.schema(), "land_use"), Some("임야"));
    }

    #[test]
    fn edit_keeps_unmentioned_fields() {
        let dir = tempdir().unwrap();
        let app = open(dir.path());
        app.add(&values(RIVERSIDE)).unwrap();
        let updated = app.edit(0, &values(&[("price", "39000")])).unwrap();
        assert_eq!(updated.get(app.schema(), "price"), Some("39000"));
        assert_eq!(updated.get(app.schema(), "name"), Some("Riverside"));
        assert_eq!(app.list().unwrap().len(), 1);

        let err = app.edit(3, &values(&[])).unwrap_err();
        assert!(matches!(
            err,
            SiteLogError::Core(CoreError::RowIndexOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn add_from_last_carries_answers_forward() {
        let dir = tempdir().unwrap();
        let app = open(dir.path());
        app.add(&values(RIVERSIDE)).unwrap();
        let record = app.add_from_last(&values(&[("price", "41000")])).unwrap();
        let schema = app.schema();
        assert_eq!(record.get(schema, "date"), Some("2024-06-01"));
        assert_eq!(record.get(schema, "name"), Some("Riverside"));
        assert_eq!(record.get(schema, "price"), Some("41000"));
        assert_eq!(record.get(schema, "comment"), Some(""));
        assert_eq!(app.list().unwrap().len(), 2);
    }

    #[test]
    fn delete_returns_removed_record() {
        let dir = tempdir().unwrap();
        let app = open(dir.path());
        let first = app.add(&values(RIVERSIDE)).unwrap();
        let removed = app.delete(0).unwrap();
        assert_eq!(removed, first);
        assert!(app.list().unwrap().is_empty());
        assert!(app.delete(0).is_err());
    }
}
