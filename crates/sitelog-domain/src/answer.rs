//! Typed answers collected by a wizard session.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::field::FieldKind;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single committed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Choice(String),
    Date(NaiveDate),
}

impl AnswerValue {
    /// Renders the value the way it is written to a table cell.
    pub fn to_cell(&self) -> String {
        match self {
            AnswerValue::Text(text) | AnswerValue::Choice(text) => text.clone(),
            AnswerValue::Number(value) => format_number(*value),
            AnswerValue::Date(date) => date.format(DATE_FORMAT).to_string(),
        }
    }

    /// Numeric view of the value, parsing text when needed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(value) => Some(*value),
            AnswerValue::Text(text) | AnswerValue::Choice(text) => parse_number(text),
            AnswerValue::Date(_) => None,
        }
    }

    /// Date view of the value, parsing `YYYY-MM-DD` text when needed.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            AnswerValue::Date(date) => Some(*date),
            AnswerValue::Text(text) | AnswerValue::Choice(text) => parse_date(text),
            AnswerValue::Number(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text) | AnswerValue::Choice(text) => text.trim().is_empty(),
            AnswerValue::Number(_) | AnswerValue::Date(_) => false,
        }
    }

    /// Converts raw text (a CLI argument or a stored cell) into the value type
    /// expected by `kind`. Returns `None` for blank input. Text that does not
    /// parse as the expected number or date is kept as `Text` so validation
    /// can decide whether it is acceptable.
    pub fn parse_for(kind: &FieldKind, raw: &str) -> Option<AnswerValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let value = match kind {
            FieldKind::Text | FieldKind::LongText => AnswerValue::Text(raw.to_string()),
            FieldKind::Number => parse_number(trimmed)
                .map(AnswerValue::Number)
                .unwrap_or_else(|| AnswerValue::Text(trimmed.to_string())),
            FieldKind::SingleSelect(_) => AnswerValue::Choice(trimmed.to_string()),
            FieldKind::Date => parse_date(trimmed)
                .map(AnswerValue::Date)
                .unwrap_or_else(|| AnswerValue::Text(trimmed.to_string())),
        };
        Some(value)
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

/// Formats a number without a fractional part when it is integral.
pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Parses a numeric cell, tolerating thousands separators.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Answers committed so far in a session, keyed by field key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    /// Cell form of the answer for `key`, used by visibility rules.
    pub fn cell(&self, key: &str) -> Option<String> {
        self.values.get(key).map(AnswerValue::to_cell)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) -> Option<AnswerValue> {
        self.values.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<AnswerValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, AnswerValue)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (K, AnswerValue)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_render_without_decimals() {
        assert_eq!(AnswerValue::Number(5000.0).to_cell(), "5000");
        assert_eq!(AnswerValue::Number(12.5).to_cell(), "12.5");
        assert_eq!(AnswerValue::Number(-3.0).to_cell(), "-3");
    }

    #[test]
    fn dates_render_as_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(AnswerValue::Date(date).to_cell(), "2024-03-09");
    }

    #[test]
    fn parse_for_keeps_unparsable_input_as_text() {
        assert_eq!(
            AnswerValue::parse_for(&FieldKind::Number, "1,200"),
            Some(AnswerValue::Number(1200.0))
        );
        assert_eq!(
            AnswerValue::parse_for(&FieldKind::Number, "lots"),
            Some(AnswerValue::Text("lots".into()))
        );
        assert_eq!(AnswerValue::parse_for(&FieldKind::Date, "  "), None);
        assert_eq!(
            AnswerValue::parse_for(&FieldKind::Date, "2024-01-31"),
            Some(AnswerValue::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()))
        );
    }

    #[test]
    fn answer_set_exposes_cell_form() {
        let answers: AnswerSet = [("floor", AnswerValue::Number(3.0))].into_iter().collect();
        assert_eq!(answers.cell("floor").as_deref(), Some("3"));
        assert_eq!(answers.cell("missing"), None);
    }
}
