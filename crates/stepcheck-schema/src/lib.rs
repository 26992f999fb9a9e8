//! # stepcheck-schema — Step Descriptor Validation
//!
//! Validates step descriptors (`step.yml`) against a JSON Schema and splits
//! the findings into blocking errors and tolerated warnings.
//!
//! ## Pipeline
//!
//! 1. [`normalize`] turns a parsed YAML value into a string-keyed JSON tree.
//! 2. [`SchemaCompiler`] / [`compile`] build an immutable [`Validator`].
//! 3. [`Validator::validate`] returns the root of a [`FailureNode`] tree.
//! 4. [`flatten`] reduces the tree to its leaf [`Issue`]s.
//! 5. [`classify`] routes each issue through an ordered [`RuleSet`].
//!
//! [`validate_document`] runs all five steps; [`StepValidator`] keeps the
//! compiled schema around for repeated use.
//!
//! ## Issue format
//!
//! Every issue renders as `I[<instance pointer>] S[<schema pointer>] <message>`,
//! e.g. `I[#/timeout] S[#/properties/timeout/exclusiveMinimum] must be > 0/1 but found 0`.
//! Classification rules are regular expressions over exactly this string,
//! so the format is a stable interface.

pub mod classify;
pub mod engine;
pub mod error;
pub mod failure;
pub mod issue;
pub mod normalize;
pub mod pointer;
pub mod step;
pub mod validate;

pub use classify::{
    classify, Classification, ClassificationRule, RuleSet, RulesConfig, Severity,
    DEFAULT_WARNING_PATTERNS,
};
pub use engine::{compile, SchemaCompiler, ValidationOutcome, Validator, DEFAULT_RESOURCE};
pub use error::{CompileError, InfrastructureError, NormalizationError, RuleError};
pub use failure::FailureNode;
pub use issue::{flatten, render_issues, Issue};
pub use normalize::{normalize, ToValueTree};
pub use step::{STEP_SCHEMA, STEP_SCHEMA_RESOURCE};
pub use validate::{validate_document, StepValidator, ValidationReport};
