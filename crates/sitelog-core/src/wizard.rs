//! Multi-step record entry.
//!
//! A [`WizardSession`] walks the fields of a [`Schema`] in order, skipping the
//! ones hidden by earlier answers. The cursor stores an absolute schema index;
//! navigation always resolves to the nearest visible neighbour, and every
//! transition re-settles the cursor so it never rests on a hidden field.
//! Once every visible field has been passed the session sits in
//! [`WizardState::Summary`] until it is committed or restarted.

use std::fmt;

use chrono::NaiveDate;
use sitelog_domain::{
    AnswerSet, AnswerValue, FieldKind, FieldRole, FieldSpec, Record, Schema, VisibleIndices,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::storage::RecordStore;
use crate::time::Clock;
use crate::validation::{validate, ValidationError};
use crate::CoreError;

/// Position of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// Asking for the field at this absolute schema index.
    Collecting(usize),
    /// Every visible field has been traversed.
    Summary,
}

/// Marks a session whose commit overwrites an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditContext {
    pub target_row: usize,
}

/// What a navigation request did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    Moved(usize),
    EnteredSummary,
    /// The request was valid but there was nowhere to go.
    Stayed,
    /// Not applicable in the current state.
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Appended,
    Updated(usize),
}

/// How a session continues after a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReentryPolicy {
    /// Start over with no answers.
    BlankRestart,
    /// Keep the committed answers as the next entry's starting point, with
    /// today's date and no commentary.
    #[default]
    CarryForward,
}

/// Data needed to render the current question.
#[derive(Debug, Clone, Copy)]
pub struct StepView<'a> {
    pub field: &'a FieldSpec,
    /// Absolute index in the schema.
    pub index: usize,
    /// 1-based position among the currently visible fields.
    pub position: usize,
    pub total: usize,
    pub value: Option<&'a AnswerValue>,
}

/// One line of the review shown before committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub key: String,
    pub label: String,
    pub value: Option<String>,
}

impl fmt::Display for SummaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {}", self.label, value),
            None => write!(f, "{}: [unfilled]", self.label),
        }
    }
}

/// State of one in-progress entry.
#[derive(Debug, Clone)]
pub struct WizardSession<'a> {
    schema: &'a Schema,
    id: Uuid,
    answers: AnswerSet,
    state: WizardState,
    edit: Option<EditContext>,
}

impl<'a> WizardSession<'a> {
    /// Fresh entry with no answers.
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_answers(schema, AnswerSet::new(), None)
    }

    /// Loads an existing row for editing; committing overwrites `row`.
    pub fn edit(schema: &'a Schema, row: usize, record: &Record) -> Self {
        Self::with_answers(
            schema,
            record.to_answers(schema),
            Some(EditContext { target_row: row }),
        )
    }

    /// New entry pre-filled from a previous record.
    pub fn from_template(schema: &'a Schema, record: &Record, today: NaiveDate) -> Self {
        let mut session = Self::new(schema);
        session.carry_forward(record, today);
        session
    }

    fn with_answers(schema: &'a Schema, answers: AnswerSet, edit: Option<EditContext>) -> Self {
        let mut session = Self {
            schema,
            id: Uuid::new_v4(),
            answers,
            state: WizardState::Collecting(0),
            edit,
        };
        session.settle();
        debug!(session = %session.id, state = ?session.state, "wizard session started");
        session
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn is_summary(&self) -> bool {
        self.state == WizardState::Summary
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn edit_context(&self) -> Option<EditContext> {
        self.edit
    }

    pub fn visible_indices(&self) -> VisibleIndices<'_> {
        self.schema.visible_indices(&self.answers)
    }

    /// The question at the cursor, or `None` in the summary phase.
    pub fn current_step(&self) -> Option<StepView<'_>> {
        let WizardState::Collecting(index) = self.state else {
            return None;
        };
        let field = self.schema.field(index)?;
        let mut position = 0;
        let mut total = 0;
        for visible in self.visible_indices() {
            total += 1;
            if visible <= index {
                position = total;
            }
        }
        Some(StepView {
            field,
            index,
            position,
            total,
            value: self.answers.get(&field.key),
        })
    }

    /// Validates and stores the answer for the current field, then moves to
    /// the next visible field. A rejected answer leaves the session unchanged.
    pub fn advance(&mut self, value: Option<AnswerValue>) -> Result<WizardEvent, ValidationError> {
        let WizardState::Collecting(index) = self.state else {
            return Ok(WizardEvent::NoOp);
        };
        let Some(field) = self.schema.field(index) else {
            return Ok(WizardEvent::NoOp);
        };

        let normalized = match validate(field, value.as_ref()) {
            Ok(normalized) => normalized,
            Err(err) => {
                warn!(session = %self.id, key = %field.key, %err, "answer rejected");
                return Err(err);
            }
        };
        match normalized {
            Some(value) => {
                self.answers.insert(field.key.clone(), value);
            }
            None => {
                self.answers.remove(&field.key);
            }
        }
        Ok(self.move_after(index))
    }

    /// Moves past the current field without validating or storing anything.
    pub fn skip(&mut self) -> WizardEvent {
        match self.state {
            WizardState::Collecting(index) => self.move_after(index),
            WizardState::Summary => WizardEvent::NoOp,
        }
    }

    /// Returns to the previous visible field. Stored answers are kept.
    pub fn back(&mut self) -> WizardEvent {
        let WizardState::Collecting(index) = self.state else {
            return WizardEvent::NoOp;
        };
        let previous = self.visible_indices().take_while(|&i| i < index).last();
        match previous {
            Some(previous) => self.move_to(WizardState::Collecting(previous)),
            None => WizardEvent::Stayed,
        }
    }

    /// Moves straight to `index`, which must be currently visible.
    pub fn jump_to(&mut self, index: usize) -> Result<WizardEvent, CoreError> {
        if self.is_summary() {
            return Ok(WizardEvent::NoOp);
        }
        if !self.schema.is_visible(index, &self.answers) {
            return Err(CoreError::InvalidOperation(format!(
                "step {} is not currently visible",
                index
            )));
        }
        Ok(self.move_to(WizardState::Collecting(index)))
    }

    /// Discards all answers and any edit target and starts again.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.edit = None;
        self.state = WizardState::Collecting(0);
        self.settle();
        debug!(session = %self.id, "wizard reset");
    }

    /// Keeps the answers but turns an edit back into a new entry.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Restarts from `record`'s values: the visit date becomes `today` and the
    /// commentary is cleared. Without a visit-date role every date field is
    /// stamped instead.
    pub fn carry_forward(&mut self, record: &Record, today: NaiveDate) {
        let mut answers = record.to_answers(self.schema);
        let visit_date = self.schema.role_position(FieldRole::VisitDate);
        for (index, field) in self.schema.fields().iter().enumerate() {
            let is_visit_date = match visit_date {
                Some(position) => position == index,
                None => field.kind == FieldKind::Date,
            };
            if is_visit_date {
                answers.insert(field.key.clone(), AnswerValue::Date(today));
            }
            if field.role == Some(FieldRole::Commentary) {
                answers.remove(&field.key);
            }
        }
        self.answers = answers;
        self.edit = None;
        self.state = WizardState::Collecting(0);
        self.settle();
        debug!(session = %self.id, "wizard restarted from previous record");
    }

    /// Assembles the record as it would be committed now.
    pub fn record(&self) -> Record {
        Record::assemble(self.schema, &self.answers)
    }

    pub fn summary(&self) -> Vec<SummaryEntry> {
        self.schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.schema.is_visible(*index, &self.answers))
            .map(|(_, field)| SummaryEntry {
                key: field.key.clone(),
                label: field.label.clone(),
                value: self.answers.get(&field.key).map(AnswerValue::to_cell),
            })
            .collect()
    }

    /// Writes the assembled record: overwrites the edit target when the store
    /// still has that row, appends otherwise. Only valid in the summary phase.
    /// On failure the session is left untouched.
    pub fn commit(&mut self, store: &dyn RecordStore) -> Result<CommitOutcome, CoreError> {
        if !self.is_summary() {
            return Err(CoreError::InvalidOperation(
                "commit is only available from the summary".into(),
            ));
        }
        let record = self.record();
        let outcome = match self.edit {
            Some(EditContext { target_row }) if target_row < store.len()? => {
                store.update(target_row, &record)?;
                CommitOutcome::Updated(target_row)
            }
            Some(EditContext { target_row }) => {
                warn!(
                    session = %self.id,
                    row = target_row,
                    "edit target no longer exists, appending instead"
                );
                store.append(&record)?;
                CommitOutcome::Appended
            }
            None => {
                store.append(&record)?;
                CommitOutcome::Appended
            }
        };
        self.edit = None;
        info!(session = %self.id, outcome = ?outcome, "record committed");
        Ok(outcome)
    }

    /// Commits, then re-enters the wizard according to `policy`.
    pub fn commit_and_continue(
        &mut self,
        store: &dyn RecordStore,
        policy: ReentryPolicy,
        clock: &dyn Clock,
    ) -> Result<CommitOutcome, CoreError> {
        let record = self.record();
        let outcome = self.commit(store)?;
        match policy {
            ReentryPolicy::BlankRestart => self.reset(),
            ReentryPolicy::CarryForward => self.carry_forward(&record, clock.today()),
        }
        Ok(outcome)
    }

    fn move_after(&mut self, index: usize) -> WizardEvent {
        let next = self.visible_indices().find(|&i| i > index);
        match next {
            Some(next) => self.move_to(WizardState::Collecting(next)),
            None => self.move_to(WizardState::Summary),
        }
    }

    fn move_to(&mut self, target: WizardState) -> WizardEvent {
        let from = self.state;
        self.state = target;
        self.settle();
        debug!(session = %self.id, ?from, to = ?self.state, "wizard moved");
        match self.state {
            WizardState::Collecting(index) => WizardEvent::Moved(index),
            WizardState::Summary => WizardEvent::EnteredSummary,
        }
    }

    /// Relocates a cursor resting on a hidden or out-of-range field to the
    /// nearest visible field at or after it.
    fn settle(&mut self) {
        if let WizardState::Collecting(index) = self.state {
            if !self.schema.is_visible(index, &self.answers) {
                let nearest = self.visible_indices().find(|&i| i >= index);
                self.state = nearest.map_or(WizardState::Summary, WizardState::Collecting);
            }
        }
    }
}
