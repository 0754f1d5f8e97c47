// Mon Oct 19 2026 - Alex

use colored::Colorize;
use fwcheck::ui::cli::{self, EXIT_FATAL};

fn main() {
    let code = match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}
