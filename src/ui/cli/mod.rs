// Mon Oct 19 2026 - Alex

pub mod args;
pub mod handler;

pub use args::{Args, Command, CompareArgs, ValidateArgs};
pub use handler::{CommandHandler, EXIT_CLEAN, EXIT_FATAL, EXIT_FINDINGS};

use clap::Parser;

pub fn parse_args() -> Args {
    Args::parse()
}

pub fn run() -> anyhow::Result<i32> {
    let args = parse_args();
    let handler = CommandHandler::new();
    handler.execute(args)
}
