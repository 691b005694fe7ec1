//! Row predicates used to narrow the record list.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sitelog_domain::{parse_number, FieldRole, Record, Schema, DATE_FORMAT};
use tracing::warn;

use crate::CoreError;

/// Conjunction of optional predicates over record columns. Inactive predicates
/// match every row; predicates whose column is missing from the schema are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// Inclusive lower bound on the visit-date column.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the visit-date column.
    pub date_to: Option<NaiveDate>,
    /// Accepted values of the category column. Empty means any.
    pub categories: BTreeSet<String>,
    /// Case-insensitive substring matched against name or address.
    pub text: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.categories.insert(value.into());
        self
    }

    pub fn text(mut self, query: impl Into<String>) -> Self {
        self.text = Some(query.into());
        self
    }

    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.categories.is_empty()
            && self.text_query().is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
    }

    pub fn matches(&self, schema: &Schema, record: &Record) -> bool {
        self.matches_date(schema, record)
            && self.matches_category(schema, record)
            && self.matches_text(schema, record)
            && self.matches_price(schema, record)
    }

    fn text_query(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase)
    }

    fn matches_date(&self, schema: &Schema, record: &Record) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(cell) = role_cell(schema, record, FieldRole::VisitDate) else {
            return true;
        };
        // ISO dates order lexicographically; undated rows never fall in a range.
        if cell.trim().is_empty() {
            return false;
        }
        let after_start = self
            .date_from
            .map_or(true, |from| cell >= from.format(DATE_FORMAT).to_string().as_str());
        let before_end = self
            .date_to
            .map_or(true, |to| cell <= to.format(DATE_FORMAT).to_string().as_str());
        after_start && before_end
    }

    fn matches_category(&self, schema: &Schema, record: &Record) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        match role_cell(schema, record, FieldRole::Category) {
            Some(cell) => self.categories.contains(cell),
            None => true,
        }
    }

    fn matches_text(&self, schema: &Schema, record: &Record) -> bool {
        let Some(query) = self.text_query() else {
            return true;
        };
        let name = role_cell(schema, record, FieldRole::Name);
        let address = role_cell(schema, record, FieldRole::Address);
        if name.is_none() && address.is_none() {
            return true;
        }
        [name, address]
            .into_iter()
            .flatten()
            .any(|cell| cell.to_lowercase().contains(&query))
    }

    fn matches_price(&self, schema: &Schema, record: &Record) -> bool {
        if self.price_min.is_none() && self.price_max.is_none() {
            return true;
        }
        let Some(index) = schema.role_position(FieldRole::Price) else {
            return true;
        };
        let column = schema
            .field(index)
            .map(|field| field.key.as_str())
            .unwrap_or_default();
        let cell = record.cell(index).unwrap_or_default();
        match parse_price(column, cell) {
            Ok(price) => {
                self.price_min.map_or(true, |min| price >= min)
                    && self.price_max.map_or(true, |max| price <= max)
            }
            Err(err) => {
                warn!(%err, "excluding row from price range");
                false
            }
        }
    }
}

fn role_cell<'a>(schema: &Schema, record: &'a Record, role: FieldRole) -> Option<&'a str> {
    schema
        .role_position(role)
        .map(|index| record.cell(index).unwrap_or_default())
}

fn parse_price(column: &str, cell: &str) -> Result<f64, CoreError> {
    parse_number(cell).ok_or_else(|| CoreError::MalformedNumericField {
        column: column.to_string(),
        value: cell.to_string(),
    })
}
