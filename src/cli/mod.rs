//! Script-style command line on top of [`SiteLog`].

pub mod args;
pub mod entry;
pub mod output;
pub mod render;

use std::io;

use sitelog_core::RecordStore;
use sitelog_domain::Record;

pub use args::{parse, Command, USAGE};

use crate::app::SiteLog;
use crate::errors::Result;

/// Executes one parsed command against `app`.
pub fn run_command(app: &SiteLog, command: Command) -> Result<()> {
    let schema = app.schema();
    match command {
        Command::Schema { json: true } => println!("{}", render::schema_json(schema)?),
        Command::Schema { json: false } => {
            for line in render::schema_lines(schema) {
                println!("{}", line);
            }
        }
        Command::List { json } => print_rows(app, app.list()?, json)?,
        Command::Filter { filter, json } => print_rows(app, app.filter(&filter)?, json)?,
        Command::Add { values, from_last } => {
            let record = if from_last {
                app.add_from_last(&values)?
            } else {
                app.add(&values)?
            };
            let row = app.store().len()?.saturating_sub(1);
            output::success(render::record_line(schema, row, &record));
        }
        Command::Edit { row, values } => {
            let record = app.edit(row, &values)?;
            output::success(render::record_line(schema, row, &record));
        }
        Command::Delete { row } => {
            let record = app.delete(row)?;
            output::info(format!("Deleted {}", render::record_line(schema, row, &record)));
        }
        Command::Enter { from_last } => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            let saved = entry::run_entry(app, stdin.lock(), &mut stdout, from_last)?;
            output::info(format!("{} visit(s) saved.", saved));
        }
        Command::Help => println!("{}", USAGE),
    }
    Ok(())
}

fn print_rows(app: &SiteLog, rows: Vec<(usize, Record)>, json: bool) -> Result<()> {
    if json {
        println!("{}", render::records_json(app.schema(), &rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        output::info("No visits recorded.");
        return Ok(());
    }
    for (row, record) in &rows {
        println!("{}", render::record_line(app.schema(), *row, record));
    }
    Ok(())
}
