//! # Error Types
//!
//! Failures that stop the pipeline before a document can be judged. Content
//! findings are never errors at this level: they travel as
//! [`Issue`](crate::Issue) values inside a
//! [`ValidationReport`](crate::ValidationReport).

use thiserror::Error;

/// The parsed document cannot be turned into a schema-comparable value tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    /// A mapping key is not a string (e.g. `1: foo` or `true: bar` in YAML).
    #[error("failed to convert map key {key} at {path} to string")]
    NonStringKey {
        /// Instance pointer of the mapping that holds the key.
        path: String,
        /// Rendering of the offending key.
        key: String,
    },

    /// A float that JSON cannot represent (NaN or an infinity).
    #[error("number {value} at {path} cannot be represented in JSON")]
    UnrepresentableNumber {
        /// Instance pointer of the value.
        path: String,
        /// Rendering of the value.
        value: String,
    },
}

/// A schema document could not be compiled into a [`Validator`](crate::Validator).
#[derive(Error, Debug)]
pub enum CompileError {
    /// The schema text is not valid JSON.
    #[error("schema {resource} is not valid JSON: {reason}")]
    InvalidJson {
        /// Resource name the text was registered under.
        resource: String,
        /// Parser message.
        reason: String,
    },

    /// `compile` was asked for a resource that was never added.
    #[error("schema resource not found: {0}")]
    UnknownResource(String),

    /// The schema does not conform to the JSON Schema meta-schema.
    #[error("schema {resource} violates the meta-schema: {reason}")]
    MetaSchema {
        /// Resource name.
        resource: String,
        /// First meta-schema violation.
        reason: String,
    },

    /// `$schema` names a draft the evaluator does not implement.
    #[error("schema {resource} uses unsupported draft {specification:?}")]
    UnsupportedDraft {
        /// Resource name.
        resource: String,
        /// The `$schema` value.
        specification: String,
    },

    /// A `pattern` or `patternProperties` key is not a valid regular expression.
    #[error("schema {resource} has an invalid regular expression {pattern:?} at {pointer}")]
    InvalidPattern {
        /// Resource name.
        resource: String,
        /// Schema pointer of the keyword.
        pointer: String,
        /// The pattern source.
        pattern: String,
    },

    /// A `$ref` points at a location that does not exist in the document.
    #[error("schema {resource} has an unresolved reference {reference:?}")]
    UnresolvedReference {
        /// Resource name.
        resource: String,
        /// The reference that could not be resolved.
        reference: String,
    },

    /// A `$ref` points outside the document.
    #[error("schema {resource} references {reference:?} outside the document: {reason}")]
    ExternalReference {
        /// Resource name.
        resource: String,
        /// The resolved URI of the reference.
        reference: String,
        /// Why the retrieval was refused.
        reason: String,
    },
}

/// A classification rule could not be built.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The pattern is not a valid regular expression.
    #[error("invalid warning pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// The rules file could not be parsed.
    #[error("invalid rules configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// The tooling could not form an opinion about the document.
///
/// Distinct from a document being invalid: these abort the call and are
/// surfaced verbatim to the caller.
#[derive(Error, Debug)]
pub enum InfrastructureError {
    /// The document text is not valid YAML.
    #[error("failed to parse document: {0}")]
    Deserialize(#[from] serde_yaml::Error),

    /// The parsed document contains values the schema evaluator cannot accept.
    #[error(transparent)]
    Normalize(#[from] NormalizationError),

    /// The schema could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),
}
