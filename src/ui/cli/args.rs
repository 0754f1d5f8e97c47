// Mon Oct 19 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fwcheck")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Validates and compares fixed-width fiscal interchange files", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// JSON config file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub json: bool,

    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the cross-record rules over one file.
    Validate(ValidateArgs),
    /// Compare a candidate file against a reference file.
    Compare(CompareArgs),
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Layout rows as a JSON array.
    #[arg(short = 'L', long)]
    pub layout: PathBuf,

    pub file: PathBuf,

    #[arg(long)]
    pub max_findings: Option<usize>,

    /// Findings printed in the text summary.
    #[arg(long, default_value = "50")]
    pub show: usize,
}

#[derive(Parser, Debug)]
pub struct CompareArgs {
    #[arg(short = 'L', long)]
    pub layout: PathBuf,

    pub reference: PathBuf,

    pub candidate: PathBuf,

    /// Record type mapping, candidate=reference (e.g. 51=50).
    #[arg(long = "remap")]
    pub remap: Vec<String>,

    #[arg(long = "exclude-type")]
    pub exclude_type: Vec<String>,

    #[arg(long = "ignore-field")]
    pub ignore_field: Vec<String>,

    #[arg(long, default_value = "20")]
    pub show: usize,
}

impl ValidateArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.layout.exists() {
            return Err(format!("Layout file does not exist: {:?}", self.layout));
        }
        if self.max_findings == Some(0) {
            return Err("--max-findings must be at least 1".to_string());
        }
        Ok(())
    }
}

impl CompareArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.layout.exists() {
            return Err(format!("Layout file does not exist: {:?}", self.layout));
        }
        for code in &self.exclude_type {
            if code.chars().count() != 2 {
                return Err(format!("Record type must be 2 characters: {}", code));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare() {
        let args = Args::try_parse_from([
            "fwcheck", "--json", "compare", "-L", "rows.json", "ref.txt", "cand.txt", "--remap", "51=50",
            "--exclude-type", "77", "--ignore-field", "NFE01-NUM-NF",
        ])
        .unwrap();
        assert!(args.json);
        match args.command {
            Command::Compare(c) => {
                assert_eq!(c.remap, vec!["51=50".to_string()]);
                assert_eq!(c.exclude_type, vec!["77".to_string()]);
                assert_eq!(c.candidate, PathBuf::from("cand.txt"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_validate() {
        let args = Args::try_parse_from(["fwcheck", "validate", "--layout", "rows.json", "in.txt", "--max-findings", "10"]).unwrap();
        assert_eq!(args.log_level, "info");
        match args.command {
            Command::Validate(v) => assert_eq!(v.max_findings, Some(10)),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
