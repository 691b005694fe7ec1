//! Line-oriented wizard: one question per line of input.
//!
//! At a question an empty line keeps the value shown in brackets, or leaves
//! the field blank when there is none (rejected for required fields).
//! `:clear` drops the current value. `:back`, `:skip`, `:reset` and `:quit`
//! navigate. At the summary `y` saves, `n` starts over and `q` quits.

use std::io::{BufRead, Write};

use sitelog_core::{CommitOutcome, StepView, WizardSession};
use sitelog_domain::AnswerValue;
use tracing::debug;

use crate::app::SiteLog;
use crate::cli::output::{render, MessageKind};
use crate::errors::Result;

/// What the user asked for at a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(String),
    Clear,
    Back,
    Skip,
    Reset,
    Quit,
}

fn classify(line: &str) -> Input {
    match line.trim() {
        ":clear" => Input::Clear,
        ":back" | ":b" => Input::Back,
        ":skip" | ":s" => Input::Skip,
        ":reset" => Input::Reset,
        ":quit" | ":q" => Input::Quit,
        _ => Input::Answer(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Runs entries until the input ends or the user quits. Returns how many
/// records were saved.
pub fn run_entry<R: BufRead, W: Write>(
    app: &SiteLog,
    mut input: R,
    out: &mut W,
    from_last: bool,
) -> Result<usize> {
    let mut session = match app.last_record()? {
        Some(previous) if from_last => {
            WizardSession::from_template(app.schema(), &previous, app.clock().today())
        }
        _ => WizardSession::new(app.schema()),
    };
    debug!(session = %session.session_id(), "interactive entry started");

    let mut saved = 0;
    let mut line = String::new();
    loop {
        match session.current_step() {
            Some(step) => writeln!(out, "{}", render(MessageKind::Prompt, question(&step)))?,
            None => {
                writeln!(out, "{}", render(MessageKind::Section, "Summary"))?;
                for entry in session.summary() {
                    writeln!(out, "  {}", entry)?;
                }
                writeln!(
                    out,
                    "{}",
                    render(MessageKind::Prompt, "Save this visit? [y]es / [n]o / [q]uit")
                )?;
            }
        }
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let command = classify(&line);

        if session.is_summary() {
            match command {
                Input::Answer(answer) if is_yes(&answer) => {
                    let outcome = session.commit_and_continue(
                        app.store(),
                        app.reentry_policy(),
                        app.clock(),
                    )?;
                    saved += 1;
                    let message = match outcome {
                        CommitOutcome::Appended => "Visit saved.".to_string(),
                        CommitOutcome::Updated(row) => format!("Row {} updated.", row),
                    };
                    writeln!(out, "{}", render(MessageKind::Success, message))?;
                }
                Input::Answer(answer) if is_no(&answer) => session.reset(),
                Input::Reset => session.reset(),
                Input::Answer(answer) if answer.trim() == "q" => break,
                Input::Quit => break,
                _ => {
                    writeln!(out, "{}", render(MessageKind::Warning, "Answer y, n or q."))?;
                }
            }
            continue;
        }

        match command {
            Input::Answer(raw) => {
                let (value, answered) = match session.current_step() {
                    Some(step) => (
                        AnswerValue::parse_for(&step.field.kind, &raw),
                        step.value.is_some(),
                    ),
                    None => (None, false),
                };
                if value.is_none() && answered {
                    session.skip();
                } else if let Err(err) = session.advance(value) {
                    writeln!(out, "{}", render(MessageKind::Warning, err))?;
                }
            }
            Input::Clear => {
                if let Err(err) = session.advance(None) {
                    writeln!(out, "{}", render(MessageKind::Warning, err))?;
                }
            }
            Input::Back => {
                session.back();
            }
            Input::Skip => {
                session.skip();
            }
            Input::Reset => session.reset(),
            Input::Quit => break,
        }
    }

    if !session.answers().is_empty() && !session.is_summary() {
        writeln!(out, "{}", render(MessageKind::Info, "Unsaved answers discarded."))?;
    }
    Ok(saved)
}

fn question(step: &StepView<'_>) -> String {
    let field = step.field;
    let mut text = format!("[{}/{}] {}", step.position, step.total, field.label);
    if !field.kind.options().is_empty() {
        text.push_str(&format!(" ({})", field.kind.options().join(" / ")));
    }
    if !field.required {
        text.push_str(" (optional)");
    }
    if let Some(value) = step.value {
        text.push_str(&format!(" [{}]", value));
    }
    if let Some(help) = &field.help {
        text.push_str(&format!(" - {}", help));
    }
    text
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn is_no(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "n" | "no")
}
