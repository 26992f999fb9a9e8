//! # stepcheck-cli — Step Descriptor Checker
//!
//! Provides the `stepcheck` command-line interface on top of
//! `stepcheck-schema`.
//!
//! ## Subcommands
//!
//! - `stepcheck validate` — Validate one or more `step.yml` files.
//! - `stepcheck schema` — Print the bundled step schema.
//!
//! ```bash
//! stepcheck validate step.yml
//! stepcheck validate --no-default-rules --format json steps/*/step.yml
//! stepcheck validate --schema custom.schema.json --rules rules.yml step.yml
//! ```
//!
//! ## Exit codes
//!
//! | code | meaning |
//! |------|---------|
//! | 0 | every file passed (warnings allowed) |
//! | 1 | at least one file has errors |
//! | 2 | a file, schema or rules file could not be processed |

pub mod schema;
pub mod validate;

/// Every file passed.
pub const EXIT_OK: u8 = 0;
/// At least one file has blocking findings.
pub const EXIT_INVALID: u8 = 1;
/// Something could not be read, parsed or compiled.
pub const EXIT_FAILURE: u8 = 2;
