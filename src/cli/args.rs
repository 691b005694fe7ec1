//! Command-line parsing for `sitelog_cli`.

use sitelog_core::RecordFilter;
use sitelog_domain::{parse_date, parse_number};

use crate::app::FieldValues;
use crate::errors::{Result, SiteLogError};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Schema { json: bool },
    List { json: bool },
    Filter { filter: RecordFilter, json: bool },
    Add { values: FieldValues, from_last: bool },
    Edit { row: usize, values: FieldValues },
    Delete { row: usize },
    /// Interactive entry reading answers from stdin.
    Enter { from_last: bool },
    Help,
}

pub const USAGE: &str = "Usage: sitelog_cli <command>\n\
Commands:\n  \
schema [--json]\n  \
list [--json]\n  \
filter [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--type T]... [--query Q] [--min N] [--max N] [--json]\n  \
add [--from-last] key=value...\n  \
edit <row> key=value...\n  \
delete <row>\n  \
enter [--from-last]\n  \
help";

pub fn parse(args: &[String]) -> Result<Command> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "schema" => Ok(Command::Schema {
            json: only_flag(rest, "--json")?,
        }),
        "list" => Ok(Command::List {
            json: only_flag(rest, "--json")?,
        }),
        "filter" => parse_filter(rest),
        "add" => {
            let from_last = rest.first().is_some_and(|arg| arg == "--from-last");
            let pairs = if from_last { &rest[1..] } else { rest };
            Ok(Command::Add {
                values: parse_pairs(pairs)?,
                from_last,
            })
        }
        "edit" => {
            let (row, pairs) = rest
                .split_first()
                .ok_or_else(|| usage("edit needs a row number"))?;
            Ok(Command::Edit {
                row: parse_row(row)?,
                values: parse_pairs(pairs)?,
            })
        }
        "delete" => match rest {
            [row] => Ok(Command::Delete {
                row: parse_row(row)?,
            }),
            _ => Err(usage("delete takes exactly one row number")),
        },
        "enter" => Ok(Command::Enter {
            from_last: only_flag(rest, "--from-last")?,
        }),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(usage(format!("unknown command `{}`", other))),
    }
}

fn usage(message: impl Into<String>) -> SiteLogError {
    SiteLogError::Usage(message.into())
}

/// Accepts no arguments or exactly `flag`.
fn only_flag(rest: &[String], flag: &str) -> Result<bool> {
    match rest {
        [] => Ok(false),
        [arg] if arg == flag => Ok(true),
        _ => Err(usage(format!("unexpected arguments: {}", rest.join(" ")))),
    }
}

fn parse_row(raw: &str) -> Result<usize> {
    raw.parse()
        .map_err(|_| usage(format!("`{}` is not a row number", raw)))
}

fn parse_pairs(pairs: &[String]) -> Result<FieldValues> {
    let mut values = FieldValues::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| usage(format!("expected key=value, got `{}`", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(usage(format!("missing field name in `{}`", pair)));
        }
        values.insert(key.to_string(), value.to_string());
    }
    Ok(values)
}

fn parse_filter(rest: &[String]) -> Result<Command> {
    let mut filter = RecordFilter::new();
    let mut json = false;
    let mut args = rest.iter();
    while let Some(flag) = args.next() {
        if flag == "--json" {
            json = true;
            continue;
        }
        let value = args
            .next()
            .ok_or_else(|| usage(format!("{} needs a value", flag)))?;
        match flag.as_str() {
            "--from" => filter.date_from = Some(date_arg(value)?),
            "--to" => filter.date_to = Some(date_arg(value)?),
            "--type" => filter = filter.category(value.trim()),
            "--query" => filter = filter.text(value.as_str()),
            "--min" => filter.price_min = Some(number_arg(value)?),
            "--max" => filter.price_max = Some(number_arg(value)?),
            other => return Err(usage(format!("unknown filter option `{}`", other))),
        }
    }
    Ok(Command::Filter { filter, json })
}

fn date_arg(raw: &str) -> Result<chrono::NaiveDate> {
    parse_date(raw).ok_or_else(|| usage(format!("`{}` is not a YYYY-MM-DD date", raw)))
}

fn number_arg(raw: &str) -> Result<f64> {
    parse_number(raw).ok_or_else(|| usage(format!("`{}` is not a number", raw)))
}
