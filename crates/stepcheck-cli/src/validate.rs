//! # Validate Subcommand
//!
//! Validates `step.yml` files against the bundled step schema (or a schema
//! given with `--schema`) and prints each file's errors and warnings.
//!
//! The schema and rules are loaded once; a file that cannot be read or
//! parsed is reported and skipped, and the remaining files are still
//! checked. Any such failure makes the run exit with [`EXIT_FAILURE`],
//! which takes precedence over [`EXIT_INVALID`].

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use stepcheck_schema::{Issue, RuleSet, RulesConfig, StepValidator, ValidationReport};

use crate::{EXIT_FAILURE, EXIT_INVALID, EXIT_OK};

/// Arguments for the `stepcheck validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Validate against this JSON schema instead of the bundled step schema.
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// YAML file with additional warning patterns.
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Treat every finding as an error unless a rules file demotes it.
    #[arg(long)]
    pub no_default_rules: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Step descriptors to validate.
    #[arg(value_name = "STEP_YML", required = true)]
    pub paths: Vec<PathBuf>,
}

/// How results are printed.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per finding.
    Text,
    /// A JSON array with one object per file.
    Json,
}

/// Result of checking one file.
#[derive(Debug, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    /// No errors; warnings allowed. False when the file could not be checked.
    pub valid: bool,
    pub warnings: Vec<Issue>,
    pub errors: Vec<Issue>,
    /// Why the file could not be checked at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl FileResult {
    fn checked(path: &Path, report: ValidationReport) -> Self {
        Self {
            path: path.to_path_buf(),
            valid: report.is_valid(),
            warnings: report.warnings,
            errors: report.errors,
            failure: None,
        }
    }

    fn failed(path: &Path, error: &anyhow::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            valid: false,
            warnings: Vec::new(),
            errors: Vec::new(),
            failure: Some(format!("{error:#}")),
        }
    }
}

/// Execute the validate subcommand against stdout.
///
/// Returns exit code: 0 when every file passed, 1 when any file has errors,
/// 2 when any file could not be checked.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    validate_to(args, &mut stdout.lock())
}

/// Execute the validate subcommand, writing the report to `out`.
///
/// # Errors
///
/// Fails before any file is checked if the schema or the rules cannot be
/// loaded.
pub fn validate_to(args: &ValidateArgs, out: &mut impl Write) -> Result<u8> {
    let validator = load_validator(args)?;
    tracing::info!(
        rules = validator.rules().len(),
        files = args.paths.len(),
        "validating step descriptors"
    );

    let results: Vec<FileResult> = args
        .paths
        .iter()
        .map(|path| match check_file(&validator, path) {
            Ok(report) => FileResult::checked(path, report),
            Err(e) => {
                tracing::error!(path = %path.display(), "{e:#}");
                FileResult::failed(path, &e)
            }
        })
        .collect();

    match args.format {
        OutputFormat::Text => write_text(&results, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &results)?;
            writeln!(out)?;
        }
    }

    Ok(exit_code(&results))
}

fn load_validator(args: &ValidateArgs) -> Result<StepValidator> {
    let validator = match &args.schema {
        Some(path) => {
            let text = read(path, "schema")?;
            StepValidator::new(&text)
                .with_context(|| format!("failed to compile schema {}", path.display()))?
        }
        None => StepValidator::bundled().context("failed to compile bundled step schema")?,
    };
    Ok(validator.with_rules(load_rules(args)?))
}

fn load_rules(args: &ValidateArgs) -> Result<RuleSet> {
    let Some(path) = &args.rules else {
        if args.no_default_rules {
            return Ok(RuleSet::empty());
        }
        return RuleSet::step_defaults().context("failed to build default warning rules");
    };

    let text = read(path, "rules file")?;
    let mut config = RulesConfig::from_yaml_str(&text)
        .with_context(|| format!("failed to parse rules file {}", path.display()))?;
    if args.no_default_rules {
        config.include_defaults = false;
    }
    config
        .into_rule_set()
        .with_context(|| format!("invalid rules file {}", path.display()))
}

fn check_file(validator: &StepValidator, path: &Path) -> Result<ValidationReport> {
    let text = read(path, "step descriptor")?;
    let report = validator
        .validate_str(&text)
        .with_context(|| format!("failed to validate {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "checked"
    );
    Ok(report)
}

fn read(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} {}", path.display()))
}

fn write_text(results: &[FileResult], out: &mut impl Write) -> Result<()> {
    for result in results {
        let path = result.path.display();
        if let Some(failure) = &result.failure {
            writeln!(out, "{path}: FAILED: {failure}")?;
            continue;
        }
        if result.errors.is_empty() && result.warnings.is_empty() {
            writeln!(out, "{path}: ok")?;
            continue;
        }
        writeln!(
            out,
            "{path}: {} error(s), {} warning(s)",
            result.errors.len(),
            result.warnings.len()
        )?;
        for issue in &result.errors {
            writeln!(out, "  error: {issue}")?;
        }
        for issue in &result.warnings {
            writeln!(out, "  warning: {issue}")?;
        }
    }
    Ok(())
}

fn exit_code(results: &[FileResult]) -> u8 {
    if results.iter().any(|r| r.failure.is_some()) {
        EXIT_FAILURE
    } else if results.iter().any(|r| !r.valid) {
        EXIT_INVALID
    } else {
        EXIT_OK
    }
}
