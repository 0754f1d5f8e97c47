// Mon Oct 19 2026 - Alex

use super::args::{Args, Command, CompareArgs, ValidateArgs};
use crate::config::Config;
use crate::diff::ComparisonEngine;
use crate::layout::{InMemoryMappingCache, LayoutRow, TypedLayoutSet, TypedLayoutSetBuilder};
use crate::reader::LineReader;
use crate::ui::display::DisplayRenderer;
use crate::utils::LoggingUtils;
use crate::validation::ValidationEngine;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

/// Process exit status: clean run.
pub const EXIT_CLEAN: i32 = 0;
/// Process exit status: the run produced findings.
pub const EXIT_FINDINGS: i32 = 1;
/// Process exit status: fatal error.
pub const EXIT_FATAL: i32 = 2;

pub struct CommandHandler {
    cache: InMemoryMappingCache,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            cache: InMemoryMappingCache::default(),
        }
    }

    /// Runs a command and returns the process exit status.
    pub fn execute(&self, args: Args) -> anyhow::Result<i32> {
        LoggingUtils::init_logger(LoggingUtils::level_from_str(&args.log_level));
        if args.no_color {
            colored::control::set_override(false);
        }

        let config = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        match args.command {
            Command::Validate(validate_args) => self.handle_validate(validate_args, config, args.json),
            Command::Compare(compare_args) => self.handle_compare(compare_args, config, args.json),
        }
    }

    fn load_layout(&self, path: &Path) -> anyhow::Result<TypedLayoutSet> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read layout file {:?}", path))?;
        let rows: Vec<LayoutRow> = serde_json::from_str(&text)
            .with_context(|| format!("Layout file {:?} is not a JSON array of rows", path))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "layout".to_string());
        let set = TypedLayoutSetBuilder::new(&name)
            .rows(rows)
            .build_cached(&self.cache)?;
        log::info!("Layout '{}': {} record type(s)", name, set.record_types().count());
        Ok(set)
    }

    fn handle_validate(&self, args: ValidateArgs, mut config: Config, json: bool) -> anyhow::Result<i32> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        if let Some(max) = args.max_findings {
            config = config.with_max_findings(max);
        }

        let layouts = self.load_layout(&args.layout)?;
        let engine = ValidationEngine::from_config(layouts, &config)?;

        let reader = match LineReader::open(&args.file, &config.encodings) {
            Ok(reader) => Some(reader),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        };
        let result = match &reader {
            Some(reader) => engine.validate_reader(reader),
            None => engine.validate_path(&args.file),
        };

        if json {
            println!("{}", result.to_json()?);
        } else {
            println!("{}", format!("File: {}", args.file.display()).cyan());
            let raw = reader.as_ref().map(LineReader::raw_map).transpose()?.unwrap_or_default();
            DisplayRenderer::new(args.show).print_validation(&result, &raw);
        }

        Ok(match reader {
            None => EXIT_FATAL,
            Some(_) if result.is_clean() => EXIT_CLEAN,
            Some(_) => EXIT_FINDINGS,
        })
    }

    fn handle_compare(&self, args: CompareArgs, mut config: Config, json: bool) -> anyhow::Result<i32> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        for entry in &args.remap {
            config.comparison.remap.parse_entry(entry)?;
        }
        for code in &args.exclude_type {
            config.comparison.excluded_types.insert(code.clone());
        }
        for field in &args.ignore_field {
            config.comparison.ignored_fields.insert(field.clone());
        }
        config.validate()?;

        let layouts = self.load_layout(&args.layout)?;
        let engine = ComparisonEngine::from_config(layouts, &config)?;
        let result = engine.compare_paths(&args.reference, &args.candidate)?;

        if json {
            println!("{}", result.to_json()?);
        } else {
            println!(
                "{}",
                format!("Reference: {}\nCandidate: {}", args.reference.display(), args.candidate.display()).cyan()
            );
            DisplayRenderer::new(args.show).print_comparison(&result);
        }

        Ok(if result.is_identical() { EXIT_CLEAN } else { EXIT_FINDINGS })
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
