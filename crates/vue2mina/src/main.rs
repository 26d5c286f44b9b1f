//! vue2mina: convert Vue single-file components into WeChat mini-program pages.

mod cli;
mod config;
mod logging;
mod orchestrator;
mod output;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::Args;
use miette::Result;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Err(message) = args.validate() {
        Args::command().error(ErrorKind::ValueValidation, message).exit();
    }

    logging::init(args.verbose);

    let summary = orchestrator::run(&args)?;
    let line = summary.line();
    if args.stdout {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
