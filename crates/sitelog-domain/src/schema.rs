//! Ordered field schema and the visibility evaluation built on it.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::answer::AnswerSet;
use crate::field::{FieldKind, FieldRole, FieldSpec};

/// Reasons a field list cannot be used as a wizard schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    EmptyKey { index: usize },
    DuplicateKey(String),
    /// A visibility rule points at a field that does not precede it.
    ForwardReference { field: String, depends_on: String },
    EmptyOptions(String),
    DuplicateRole(FieldRole),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::EmptyKey { index } => write!(f, "field #{} has an empty key", index),
            SchemaError::DuplicateKey(key) => write!(f, "duplicate field key `{}`", key),
            SchemaError::ForwardReference { field, depends_on } => write!(
                f,
                "field `{}` depends on `{}`, which does not precede it",
                field, depends_on
            ),
            SchemaError::EmptyOptions(key) => {
                write!(f, "select field `{}` has no options", key)
            }
            SchemaError::DuplicateRole(role) => {
                write!(f, "role `{}` is assigned to more than one field", role)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Validated, immutable sequence of fields in wizard order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        check_fields(&fields)?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names, in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.key.as_str())
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.key == key)
    }

    /// Column position of the field tagged with `role`.
    pub fn role_position(&self, role: FieldRole) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.role == Some(role))
    }

    /// Whether the field at `index` is shown for the given answers.
    pub fn is_visible(&self, index: usize, answers: &AnswerSet) -> bool {
        let Some(field) = self.fields.get(index) else {
            return false;
        };
        match &field.visibility {
            None => true,
            Some(rule) => {
                let current = answers.cell(rule.depends_on());
                rule.allows(current.as_deref())
            }
        }
    }

    /// Indices of the currently visible fields in ascending order. The
    /// iterator is evaluated lazily against the borrowed answers, so call it
    /// again after any answer changes.
    pub fn visible_indices<'a>(&'a self, answers: &'a AnswerSet) -> VisibleIndices<'a> {
        VisibleIndices {
            schema: self,
            answers,
            next: 0,
        }
    }
}

fn check_fields(fields: &[FieldSpec]) -> Result<(), SchemaError> {
    let mut seen_keys: HashSet<&str> = HashSet::new();
    let mut seen_roles: HashSet<FieldRole> = HashSet::new();
    for (index, field) in fields.iter().enumerate() {
        if field.key.trim().is_empty() {
            return Err(SchemaError::EmptyKey { index });
        }
        if let FieldKind::SingleSelect(options) = &field.kind {
            if options.is_empty() {
                return Err(SchemaError::EmptyOptions(field.key.clone()));
            }
        }
        if let Some(rule) = &field.visibility {
            // Only keys already seen are earlier in the order.
            if !seen_keys.contains(rule.depends_on()) {
                return Err(SchemaError::ForwardReference {
                    field: field.key.clone(),
                    depends_on: rule.depends_on().to_string(),
                });
            }
        }
        if let Some(role) = field.role {
            if !seen_roles.insert(role) {
                return Err(SchemaError::DuplicateRole(role));
            }
        }
        if !seen_keys.insert(field.key.as_str()) {
            return Err(SchemaError::DuplicateKey(field.key.clone()));
        }
    }
    Ok(())
}

impl TryFrom<Vec<FieldSpec>> for Schema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        Schema::new(fields)
    }
}

impl From<Schema> for Vec<FieldSpec> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

/// Iterator returned by [`Schema::visible_indices`].
#[derive(Debug, Clone)]
pub struct VisibleIndices<'a> {
    schema: &'a Schema,
    answers: &'a AnswerSet,
    next: usize,
}

impl Iterator for VisibleIndices<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.next < self.schema.len() {
            let index = self.next;
            self.next += 1;
            if self.schema.is_visible(index, self.answers) {
                return Some(index);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.schema.len().saturating_sub(self.next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerValue;
    use crate::field::VisibilityRule;

    fn property_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("date", "Date", FieldKind::Date),
            FieldSpec::new("name", "Name", FieldKind::Text),
            FieldSpec::new(
                "type",
                "Type",
                FieldKind::SingleSelect(vec!["아파트".into(), "토지".into()]),
            ),
            FieldSpec::new("floor", "Floor", FieldKind::Number)
                .with_optional()
                .with_visibility(VisibilityRule::hidden_when("type", ["토지"])),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_forward_references() {
        let err = Schema::new(vec![
            FieldSpec::new("floor", "Floor", FieldKind::Number)
                .with_visibility(VisibilityRule::hidden_when("type", ["토지"])),
            FieldSpec::new("type", "Type", FieldKind::Text),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::ForwardReference {
                field: "floor".into(),
                depends_on: "type".into()
            }
        );
    }

    #[test]
    fn rejects_self_references() {
        let err = Schema::new(vec![FieldSpec::new("type", "Type", FieldKind::Text)
            .with_visibility(VisibilityRule::shown_when("type", ["x"]))])
        .unwrap_err();
        assert!(matches!(err, SchemaError::ForwardReference { .. }));
    }

    #[test]
    fn rejects_duplicate_keys_and_empty_options() {
        let dup = Schema::new(vec![
            FieldSpec::new("name", "Name", FieldKind::Text),
            FieldSpec::new("name", "Other", FieldKind::Text),
        ]);
        assert_eq!(dup.unwrap_err(), SchemaError::DuplicateKey("name".into()));

        let empty = Schema::new(vec![FieldSpec::new(
            "type",
            "Type",
            FieldKind::SingleSelect(Vec::new()),
        )]);
        assert_eq!(empty.unwrap_err(), SchemaError::EmptyOptions("type".into()));
    }

    #[test]
    fn floor_hides_for_land_and_returns_for_apartments() {
        let schema = property_schema();
        let mut answers = AnswerSet::new();
        assert_eq!(
            schema.visible_indices(&answers).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );

        answers.insert("type", AnswerValue::Choice("토지".into()));
        assert_eq!(
            schema.visible_indices(&answers).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        answers.insert("type", AnswerValue::Choice("아파트".into()));
        assert_eq!(
            schema.visible_indices(&answers).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn visible_indices_are_restartable_and_increasing() {
        let schema = property_schema();
        let answers: AnswerSet = [("type", AnswerValue::Choice("토지".into()))]
            .into_iter()
            .collect();
        let first: Vec<_> = schema.visible_indices(&answers).collect();
        let second: Vec<_> = schema.visible_indices(&answers).collect();
        assert_eq!(first, second);
        assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn out_of_range_index_is_not_visible() {
        let schema = property_schema();
        assert!(!schema.is_visible(10, &AnswerSet::new()));
    }

    #[test]
    fn schema_deserialization_validates() {
        let json = r#"[
            {"key": "a", "label": "A", "kind": {"type": "text"},
             "visibility": {"hidden_when": {"field": "b", "values": ["x"]}}},
            {"key": "b", "label": "B", "kind": {"type": "text"}}
        ]"#;
        let parsed: Result<Schema, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }
}
