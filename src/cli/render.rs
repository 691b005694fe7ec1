//! Text and JSON views of the schema and stored records.

use serde::Serialize;
use sitelog_domain::{FieldSpec, Record, Schema, VisibilityRule};

use crate::errors::Result;

/// One line per field: key, label, kind, whether required and when asked.
pub fn schema_lines(schema: &Schema) -> Vec<String> {
    schema.fields().iter().map(field_line).collect()
}

fn field_line(field: &FieldSpec) -> String {
    let mut line = format!(
        "{:<10} {} ({}{})",
        field.key,
        field.label,
        field.kind,
        if field.required { ", required" } else { "" }
    );
    if !field.kind.options().is_empty() {
        line.push_str(&format!(" [{}]", field.kind.options().join(" | ")));
    }
    match &field.visibility {
        Some(VisibilityRule::ShownWhen { field, values }) => {
            line.push_str(&format!(" shown when {} is {}", field, values.join("/")));
        }
        Some(VisibilityRule::HiddenWhen { field, values }) => {
            line.push_str(&format!(" hidden when {} is {}", field, values.join("/")));
        }
        None => {}
    }
    line
}

/// `#row key=value ...` with blank cells left out. Values are printed
/// verbatim, so the line is for reading; use `--json` to re-parse rows.
pub fn record_line(schema: &Schema, row: usize, record: &Record) -> String {
    let cells = schema
        .keys()
        .zip(&record.values)
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>();
    format!("#{} {}", row, cells.join(" "))
}

#[derive(Debug, Serialize)]
struct RecordView<'a> {
    row: usize,
    values: Vec<(&'a str, &'a str)>,
}

pub fn records_json(schema: &Schema, rows: &[(usize, Record)]) -> Result<String> {
    let views = rows
        .iter()
        .map(|(row, record)| RecordView {
            row: *row,
            values: schema
                .keys()
                .zip(record.values.iter().map(String::as_str))
                .collect(),
        })
        .collect::<Vec<_>>();
    Ok(serde_json::to_string_pretty(&views)?)
}

pub fn schema_json(schema: &Schema) -> Result<String> {
    Ok(serde_json::to_string_pretty(schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitelog_domain::site_visit_schema;

    #[test]
    fn record_line_skips_blank_cells() {
        let schema = site_visit_schema().unwrap();
        let mut record = Record::blank(&schema);
        record.values[0] = "2024-05-20".into();
        record.values[1] = "Riverside".into();
        assert_eq!(
            record_line(&schema, 3, &record),
            "#3 date=2024-05-20 name=Riverside"
        );
    }

    #[test]
    fn record_line_prints_values_verbatim() {
        let schema = site_visit_schema().unwrap();
        let mut record = Record::blank(&schema);
        record.values[1] = "Tower A, east".into();
        assert_eq!(record_line(&schema, 0, &record), "#0 name=Tower A, east");
    }

    #[test]
    fn schema_lines_describe_visibility() {
        let schema = site_visit_schema().unwrap();
        let lines = schema_lines(&schema);
        assert_eq!(lines.len(), schema.len());
        let floor = lines
            .iter()
            .find(|line| line.starts_with("floor"))
            .unwrap();
        assert!(floor.ends_with("hidden when type is 토지"));
    }

    #[test]
    fn records_json_pairs_keys_with_cells() {
        let schema = site_visit_schema().unwrap();
        let record = Record::blank(&schema);
        let json = records_json(&schema, &[(0, record)]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["row"], 0);
        assert_eq!(parsed[0]["values"][0][0], "date");
    }
}
