use std::{env, process};

use sitelog::{
    cli::{
        self,
        output::{self, OutputPreferences},
    },
    init_with_filter, SiteLog, SiteLogError,
};

fn main() {
    if let Err(err) = run() {
        output::error(&err);
        if matches!(err, SiteLogError::Usage(_)) {
            eprintln!("{}", cli::USAGE);
        }
        process::exit(1);
    }
}

fn run() -> Result<(), SiteLogError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = cli::parse(&args)?;

    let app = SiteLog::from_env()?;
    init_with_filter(&app.config().log_filter);
    output::set_preferences(OutputPreferences {
        plain: app.config().plain_output,
    });

    cli::run_command(&app, command)
}
