use anyhow::Result;
use clap::Parser;

mod args;
mod cli;
mod error;
mod fetch;
mod locator;
mod logging;
mod options;
mod output;
mod platform;
mod runner;
mod util;
mod workflow;

use cli::{Command, RootArgs};

fn main() {
    let cli = RootArgs::parse();
    logging::init_tracing(cli.log_json, cli.verbose);

    if let Err(err) = run(cli.command) {
        output::report_failure(&err);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => workflow::run_run(args),
        Command::Plan(args) => workflow::run_plan(args),
    }
}
