//! Declarative descriptions of wizard questions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported data kinds for wizard fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Number,
    SingleSelect(Vec<String>),
    Date,
}

impl FieldKind {
    /// Allowed values for select fields; empty for every other kind.
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::SingleSelect(options) => options,
            _ => &[],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldKind::Text => "text",
            FieldKind::LongText => "long text",
            FieldKind::Number => "number",
            FieldKind::SingleSelect(_) => "select",
            FieldKind::Date => "date",
        };
        f.write_str(label)
    }
}

/// Conditional visibility keyed on the answer of an earlier field.
///
/// Values are compared against the cell form of the referenced answer, so a
/// rule on a select field lists option labels and a rule on a number field
/// lists rendered numbers (`"3"`, not `"3.0"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityRule {
    /// Visible only while `field` holds one of `values`.
    ShownWhen { field: String, values: Vec<String> },
    /// Visible unless `field` holds one of `values`. An unanswered field never
    /// hides anything.
    HiddenWhen { field: String, values: Vec<String> },
}

impl VisibilityRule {
    pub fn shown_when<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VisibilityRule::ShownWhen {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn hidden_when<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VisibilityRule::HiddenWhen {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Key of the field this rule depends on.
    pub fn depends_on(&self) -> &str {
        match self {
            VisibilityRule::ShownWhen { field, .. } | VisibilityRule::HiddenWhen { field, .. } => {
                field
            }
        }
    }

    /// Evaluates the rule against the referenced field's current cell value.
    pub fn allows(&self, current: Option<&str>) -> bool {
        match self {
            VisibilityRule::ShownWhen { values, .. } => {
                current.is_some_and(|value| values.iter().any(|candidate| candidate == value))
            }
            VisibilityRule::HiddenWhen { values, .. } => {
                !current.is_some_and(|value| values.iter().any(|candidate| candidate == value))
            }
        }
    }
}

/// Semantic tags for the columns that filtering and carry-forward rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    VisitDate,
    Name,
    Address,
    Category,
    Price,
    Commentary,
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldRole::VisitDate => "visit date",
            FieldRole::Name => "name",
            FieldRole::Address => "address",
            FieldRole::Category => "category",
            FieldRole::Price => "price",
            FieldRole::Commentary => "commentary",
        };
        f.write_str(label)
    }
}

/// Static description of a single wizard question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default = "FieldSpec::default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<FieldRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: Self::default_required(),
            visibility: None,
            role: None,
            help: None,
        }
    }

    fn default_required() -> bool {
        true
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_visibility(mut self, rule: VisibilityRule) -> Self {
        self.visibility = Some(rule);
        self
    }

    pub fn with_role(mut self, role: FieldRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}
