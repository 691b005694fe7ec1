//! Persistable rows assembled from wizard answers.

use serde::{Deserialize, Serialize};

use crate::answer::{AnswerSet, AnswerValue};
use crate::schema::Schema;

/// One row of the record table: a cell per schema field, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub values: Vec<String>,
}

impl Record {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// A row of empty cells for `schema`.
    pub fn blank(schema: &Schema) -> Self {
        Self {
            values: vec![String::new(); schema.len()],
        }
    }

    /// Builds a row from collected answers. Fields without an answer, and
    /// fields hidden under the final answers, produce empty cells.
    pub fn assemble(schema: &Schema, answers: &AnswerSet) -> Self {
        let values = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(index, field)| {
                if !schema.is_visible(index, answers) {
                    return String::new();
                }
                answers
                    .get(&field.key)
                    .map(AnswerValue::to_cell)
                    .unwrap_or_default()
            })
            .collect();
        Self { values }
    }

    /// Parses the row back into typed answers. Empty cells are left out.
    pub fn to_answers(&self, schema: &Schema) -> AnswerSet {
        schema
            .fields()
            .iter()
            .zip(self.values.iter())
            .filter_map(|(field, cell)| {
                AnswerValue::parse_for(&field.kind, cell).map(|value| (field.key.clone(), value))
            })
            .collect()
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn get<'a>(&'a self, schema: &Schema, key: &str) -> Option<&'a str> {
        schema.position(key).and_then(|index| self.cell(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pads with empty cells or truncates so the row has exactly `width` cells.
    pub fn conform(mut self, width: usize) -> Self {
        self.values.resize(width, String::new());
        self
    }
}

impl From<Vec<String>> for Record {
    fn from(values: Vec<String>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, FieldSpec, VisibilityRule};
    use chrono::NaiveDate;

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("date", "Date", FieldKind::Date),
            FieldSpec::new(
                "type",
                "Type",
                FieldKind::SingleSelect(vec!["아파트".into(), "토지".into()]),
            ),
            FieldSpec::new("floor", "Floor", FieldKind::Number)
                .with_optional()
                .with_visibility(VisibilityRule::hidden_when("type", ["토지"])),
            FieldSpec::new("memo", "Memo", FieldKind::LongText).with_optional(),
        ])
        .unwrap()
    }

    #[test]
    fn assemble_fills_every_column() {
        let schema = schema();
        let answers: AnswerSet = [(
            "date",
            AnswerValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
        )]
        .into_iter()
        .collect();
        let record = Record::assemble(&schema, &answers);
        assert_eq!(record.values, vec!["2024-05-01", "", "", ""]);
    }

    #[test]
    fn assemble_blanks_hidden_fields() {
        let schema = schema();
        let mut answers = AnswerSet::new();
        answers.insert("type", AnswerValue::Choice("아파트".into()));
        answers.insert("floor", AnswerValue::Number(7.0));
        assert_eq!(Record::assemble(&schema, &answers).cell(2), Some("7"));

        answers.insert("type", AnswerValue::Choice("토지".into()));
        assert_eq!(Record::assemble(&schema, &answers).cell(2), Some(""));
    }

    #[test]
    fn to_answers_parses_typed_values() {
        let schema = schema();
        let record = Record::new(vec![
            "2024-05-01".into(),
            "아파트".into(),
            "12".into(),
            "".into(),
        ]);
        let answers = record.to_answers(&schema);
        assert_eq!(
            answers.get("date"),
            Some(&AnswerValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
        );
        assert_eq!(answers.get("floor"), Some(&AnswerValue::Number(12.0)));
        assert!(!answers.contains("memo"));
    }

    #[test]
    fn conform_pads_and_truncates() {
        let short = Record::new(vec!["a".into()]).conform(3);
        assert_eq!(short.values, vec!["a", "", ""]);
        let long = Record::new(vec!["a".into(), "b".into(), "c".into()]).conform(2);
        assert_eq!(long.values, vec!["a", "b"]);
    }
}
