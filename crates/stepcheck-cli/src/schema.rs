//! # Schema Subcommand
//!
//! Prints the step schema bundled into the binary, so authors can feed it to
//! editors and other JSON Schema tooling.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use stepcheck_schema::STEP_SCHEMA;

/// Arguments for the `stepcheck schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Print the schema on a single line.
    #[arg(long)]
    pub compact: bool,
}

/// Execute the schema subcommand against stdout.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    write_schema(args, &mut stdout.lock())
}

/// Write the bundled schema to `out`.
pub fn write_schema(args: &SchemaArgs, out: &mut impl Write) -> Result<u8> {
    if args.compact {
        let schema: serde_json::Value =
            serde_json::from_str(STEP_SCHEMA).context("bundled step schema is not JSON")?;
        writeln!(out, "{}", serde_json::to_string(&schema)?)?;
    } else {
        write!(out, "{STEP_SCHEMA}")?;
    }
    Ok(crate::EXIT_OK)
}
