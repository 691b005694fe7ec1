use std::fs;

use sitelog_core::{CoreError, RecordFilter, RecordStore};
use sitelog_domain::{site_visit_schema, Record, Schema};
use sitelog_storage_csv::CsvRecordStore;
use tempfile::tempdir;

fn schema() -> Schema {
    site_visit_schema().expect("site visit schema")
}

fn visit(schema: &Schema, name: &str, kind: &str, price: &str) -> Record {
    let mut record = Record::blank(schema);
    let set = |record: &mut Record, key: &str, value: &str| {
        let index = schema.position(key).expect("known key");
        record.values[index] = value.to_string();
    };
    set(&mut record, "date", "2024-05-20");
    set(&mut record, "name", name);
    set(&mut record, "type", kind);
    set(&mut record, "price", price);
    record
}

#[test]
fn list_on_missing_file_is_empty() {
    let dir = tempdir().expect("tempdir");
    let store = CsvRecordStore::new(dir.path().join("absent.csv"), schema());
    assert!(store.list().expect("list").is_empty());
    assert_eq!(store.len().expect("len"), 0);
}

#[test]
fn append_writes_bom_and_single_header() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("site_visits.csv");
    let schema = schema();
    let store = CsvRecordStore::new(&path, schema.clone());

    store
        .append(&visit(&schema, "Riverside", "아파트", "42000"))
        .expect("first append");
    store
        .append(&visit(&schema, "Hill lot", "토지", "9000"))
        .expect("second append");

    let raw = fs::read_to_string(&path).expect("read csv");
    assert!(raw.starts_with('\u{feff}'));
    let header = schema.keys().collect::<Vec<_>>().join(",");
    assert_eq!(raw.matches(&header).count(), 1);
    assert_eq!(raw.lines().count(), 3);

    let rows = store.list().expect("list");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get(&schema, "name"), Some("Riverside"));
    assert_eq!(rows[1].get(&schema, "type"), Some("토지"));
}

#[test]
fn cells_with_commas_and_quotes_survive() {
    let dir = tempdir().expect("tempdir");
    let schema = schema();
    let store = CsvRecordStore::new(dir.path().join("visits.csv"), schema.clone());

    let mut record = visit(&schema, "Tower \"B\", east wing", "아파트", "12000");
    let comment = schema.position("comment").expect("comment column");
    record.values[comment] = "line one\nline two".to_string();
    store.append(&record).expect("append");

    let rows = store.list().expect("list");
    assert_eq!(rows, vec![record]);
}

#[test]
fn update_and_delete_are_positional() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("visits.csv");
    let schema = schema();
    let store = CsvRecordStore::new(&path, schema.clone());
    for name in ["A", "B", "C"] {
        store
            .append(&visit(&schema, name, "아파트", "1000"))
            .expect("append");
    }

    store
        .update(1, &visit(&schema, "B2", "상가", "2000"))
        .expect("update");
    let names = |store: &CsvRecordStore| {
        store
            .list()
            .expect("list")
            .iter()
            .map(|row| row.get(&schema, "name").unwrap_or_default().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&store), vec!["A", "B2", "C"]);

    store.delete(0).expect("delete");
    assert_eq!(names(&store), vec!["B2", "C"]);

    let raw = fs::read_to_string(&path).expect("read csv");
    assert!(raw.starts_with('\u{feff}'));
    assert!(!path.with_extension("csv.tmp").exists());

    let err = store.delete(2).expect_err("out of range");
    assert!(matches!(
        err,
        CoreError::RowIndexOutOfRange { index: 2, len: 2 }
    ));
    let err = store
        .update(5, &visit(&schema, "X", "아파트", "1"))
        .expect_err("out of range");
    assert!(matches!(err, CoreError::RowIndexOutOfRange { .. }));
}

#[test]
fn short_and_long_rows_are_conformed_to_schema_width() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("visits.csv");
    let schema = schema();
    let header = schema.keys().collect::<Vec<_>>().join(",");
    let padding = ",".repeat(schema.len());
    fs::write(
        &path,
        format!("\u{feff}{header}\n2024-01-01,Short\n2024-01-02,Long{padding},extra\n"),
    )
    .expect("seed csv");

    let store = CsvRecordStore::new(&path, schema.clone());
    let rows = store.list().expect("list");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.len() == schema.len()));
    assert_eq!(rows[0].get(&schema, "name"), Some("Short"));
    assert_eq!(rows[0].get(&schema, "comment"), Some(""));
}

#[test]
fn price_filter_keeps_rows_above_minimum() {
    let dir = tempdir().expect("tempdir");
    let schema = schema();
    let store = CsvRecordStore::new(dir.path().join("visits.csv"), schema.clone());
    for (name, price) in [("A", "5000"), ("B", "12000"), ("C", "8000"), ("D", "미정")] {
        store
            .append(&visit(&schema, name, "아파트", price))
            .expect("append");
    }

    let filter = RecordFilter::new().price_range(Some(6000.0), None);
    let matched = store.filter(&filter).expect("filter");
    let prices = matched
        .iter()
        .map(|row| row.get(&schema, "price").unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(prices, vec!["12000", "8000"]);
    assert_eq!(store.filter(&filter).expect("filter again"), matched);
}

#[test]
fn append_rejects_records_of_wrong_width() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("visits.csv");
    let store = CsvRecordStore::new(&path, schema());
    let err = store
        .append(&Record::new(vec!["2024-01-01".into()]))
        .expect_err("width mismatch");
    assert!(matches!(err, CoreError::InvalidOperation(_)));
    assert!(!path.exists());
}

#[test]
fn append_to_empty_file_writes_bom_once_before_header() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("visits.csv");
    fs::write(&path, "").expect("seed empty file");
    let schema = schema();
    let store = CsvRecordStore::new(&path, schema.clone());

    for name in ["A", "B"] {
        store
            .append(&visit(&schema, name, "빌라", "3000"))
            .expect("append");
    }

    let raw = fs::read_to_string(&path).expect("read csv");
    let header = schema.keys().collect::<Vec<_>>().join(",");
    assert!(raw.starts_with(&format!("\u{feff}{header}\n")));
    assert_eq!(raw.matches('\u{feff}').count(), 1);
    assert_eq!(store.len().expect("len"), 2);
}
