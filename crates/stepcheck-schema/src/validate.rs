//! # Validation Facade
//!
//! One call from document text to a classified report:
//!
//! ```text
//! deserialize (YAML) → normalize → compile schema → validate → flatten → classify
//! ```
//!
//! Anything that goes wrong before validation proper is an
//! [`InfrastructureError`]: the tooling could not form an opinion about the
//! document. Schema violations are never errors at this level; they come
//! back inside the [`ValidationReport`] as warnings or errors.
//!
//! [`validate_document`] compiles the schema on every call. Callers that
//! validate many documents hold a [`StepValidator`] instead, which compiles
//! once and is safe to share across threads.

use serde::Serialize;

use crate::classify::{classify, Classification, RuleSet};
use crate::engine::{compile, SchemaCompiler, ValidationOutcome, Validator};
use crate::error::{CompileError, InfrastructureError};
use crate::issue::{flatten, Issue};
use crate::normalize::ToValueTree;
use crate::step::{STEP_SCHEMA, STEP_SCHEMA_RESOURCE};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Classified findings for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Tolerated findings, in failure-tree order.
    pub warnings: Vec<Issue>,
    /// Blocking findings, in failure-tree order.
    pub errors: Vec<Issue>,
}

impl ValidationReport {
    /// True when nothing blocks the document. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when at least one finding was demoted to a warning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl From<Classification> for ValidationReport {
    fn from(classification: Classification) -> Self {
        Self {
            warnings: classification.warnings,
            errors: classification.errors,
        }
    }
}

// ---------------------------------------------------------------------------
// One-shot validation
// ---------------------------------------------------------------------------

/// Validate YAML `document_text` against `schema_text` and classify the
/// findings with `rules`.
///
/// # Errors
///
/// - [`InfrastructureError::Deserialize`] if the document is not YAML.
/// - [`InfrastructureError::Normalize`] if it holds a non-string map key.
/// - [`InfrastructureError::Compile`] if the schema does not compile.
pub fn validate_document(
    schema_text: &str,
    document_text: &str,
    rules: &RuleSet,
) -> Result<ValidationReport, InfrastructureError> {
    let raw: serde_yaml::Value = serde_yaml::from_str(document_text)?;
    let tree = raw.to_value_tree()?;
    let validator = compile(schema_text)?;
    Ok(report(&validator, &tree, rules))
}

fn report(validator: &Validator, tree: &serde_json::Value, rules: &RuleSet) -> ValidationReport {
    match validator.validate(tree) {
        ValidationOutcome::Valid => ValidationReport::default(),
        ValidationOutcome::Invalid(root) => {
            let issues = flatten(&root);
            tracing::trace!(tree = %root.render_tree(), "validation failed");
            classify(issues, rules).into()
        }
    }
}

// ---------------------------------------------------------------------------
// StepValidator
// ---------------------------------------------------------------------------

/// A compiled schema paired with the rules that classify its findings.
///
/// Compiles once; every `validate_*` call only allocates its own value tree.
#[derive(Debug, Clone)]
pub struct StepValidator {
    validator: Validator,
    rules: RuleSet,
}

impl StepValidator {
    /// Compile `schema_text`. No warning rules are installed, so every
    /// finding is an error until [`with_rules`](Self::with_rules) is called.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if the schema does not compile.
    pub fn new(schema_text: &str) -> Result<Self, CompileError> {
        Ok(Self {
            validator: compile(schema_text)?,
            rules: RuleSet::empty(),
        })
    }

    /// Compile the bundled step schema. Like [`new`](Self::new) this starts
    /// with no warning rules; pair it with [`RuleSet::step_defaults`] for
    /// the standard warning/error split.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] only if the bundled schema is broken.
    pub fn bundled() -> Result<Self, CompileError> {
        let mut compiler = SchemaCompiler::new();
        compiler.add_resource(STEP_SCHEMA_RESOURCE, STEP_SCHEMA)?;
        Ok(Self {
            validator: compiler.compile(STEP_SCHEMA_RESOURCE)?,
            rules: RuleSet::empty(),
        })
    }

    /// Replace the classification rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Rules that decide which findings are warnings.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The compiled schema.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// [`InfrastructureError::Deserialize`] or
    /// [`InfrastructureError::Normalize`]; compilation already happened.
    pub fn validate_str(
        &self,
        document_text: &str,
    ) -> Result<ValidationReport, InfrastructureError> {
        let raw: serde_yaml::Value = serde_yaml::from_str(document_text)?;
        self.validate_value(&raw)
    }

    /// Validate an already-parsed document.
    ///
    /// # Errors
    ///
    /// [`InfrastructureError::Normalize`] if the document holds a non-string
    /// map key or a non-finite number.
    pub fn validate_value<T>(&self, document: &T) -> Result<ValidationReport, InfrastructureError>
    where
        T: ToValueTree + ?Sized,
    {
        let tree = document.to_value_tree()?;
        Ok(report(&self.validator, &tree, &self.rules))
    }
}
