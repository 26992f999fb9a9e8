//! # Schema Compiler and Validator
//!
//! Compiles a JSON Schema document with the `jsonschema` crate and adapts
//! its errors into the [`FailureNode`] causation tree the flattener and the
//! classification rules are written against.
//!
//! ## Compilation
//!
//! [`SchemaCompiler`] holds named schema resources. Compiling a resource:
//!
//! 1. detects the draft from `$schema` (draft-07 when absent); an unknown
//!    `$schema` is a [`CompileError::UnsupportedDraft`],
//! 2. checks the document against that draft's meta-schema,
//! 3. compiles every keyword, including `pattern` regexes and `format`
//!    assertions, and resolves every `$ref` inside the document.
//!
//! Nothing is fetched: a `$ref` that leaves the document fails with
//! [`CompileError::ExternalReference`]. A compiled [`Validator`] shares the
//! crate's validator behind an `Arc`, so cloning is cheap and one instance
//! can serve any number of threads.
//!
//! ## Failure tree
//!
//! Every error the crate reports becomes a leaf. Consecutive `required`
//! failures on the same object merge into one `missing properties` leaf, and
//! a `propertyNames` failure is a group holding the name's own failure.

mod location;
mod message;

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, ReferencingError, Retrieve, Uri, ValidationError};
use serde_json::Value;

use crate::error::CompileError;
use crate::failure::FailureNode;
use crate::issue::{flatten, Issue};
use crate::pointer::ROOT;

use self::location::{absolute_keyword_pointer, instance_pointer};

/// Resource name used by [`compile`] for a standalone schema text.
pub const DEFAULT_RESOURCE: &str = "schema.json";

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

/// Registry of named schema documents awaiting compilation.
#[derive(Debug, Default)]
pub struct SchemaCompiler {
    resources: HashMap<String, Value>,
}

impl SchemaCompiler {
    /// Create an empty compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` as JSON and register it under `name`.
    pub fn add_resource(
        &mut self,
        name: impl Into<String>,
        text: &str,
    ) -> Result<(), CompileError> {
        let name = name.into();
        let value: Value = serde_json::from_str(text).map_err(|e| CompileError::InvalidJson {
            resource: name.clone(),
            reason: e.to_string(),
        })?;
        self.resources.insert(name, value);
        Ok(())
    }

    /// Register an already-parsed schema document under `name`.
    pub fn add_value(&mut self, name: impl Into<String>, schema: Value) {
        self.resources.insert(name.into(), schema);
    }

    /// Compile the resource registered as `name`.
    pub fn compile(&self, name: &str) -> Result<Validator, CompileError> {
        let root = self
            .resources
            .get(name)
            .ok_or_else(|| CompileError::UnknownResource(name.to_string()))?;

        if !root.is_object() && !root.is_boolean() {
            return Err(CompileError::MetaSchema {
                resource: name.to_string(),
                reason: "schema must be an object or a boolean".to_string(),
            });
        }

        let mut options = jsonschema::options();
        options
            .with_retriever(DocumentOnly)
            .should_validate_formats(true);
        if root.get("$schema").is_none() {
            options.with_draft(Draft::Draft7);
        }
        let inner = options.build(root).map_err(|e| compile_error(name, &e))?;

        tracing::debug!(resource = name, draft = ?inner.draft(), "compiled schema");

        Ok(Validator {
            resource: name.to_string(),
            root: Arc::new(root.clone()),
            inner: Arc::new(inner),
        })
    }
}

/// Compile a standalone schema text registered as [`DEFAULT_RESOURCE`].
pub fn compile(schema_text: &str) -> Result<Validator, CompileError> {
    let mut compiler = SchemaCompiler::new();
    compiler.add_resource(DEFAULT_RESOURCE, schema_text)?;
    compiler.compile(DEFAULT_RESOURCE)
}

/// Refuses every retrieval; schemas are compiled from one document.
struct DocumentOnly;

impl Retrieve for DocumentOnly {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("{} is outside the schema document", uri.as_str()).into())
    }
}

fn compile_error(resource: &str, error: &ValidationError<'_>) -> CompileError {
    let resource = resource.to_string();
    match &error.kind {
        ValidationErrorKind::Referencing(cause) => reference_error(resource, cause),
        ValidationErrorKind::Format { format } if format == "regex" => {
            // Raised by the meta-schema check (instance path set) or by the
            // keyword compiler (schema path set).
            let location = if error.instance_path.as_str().is_empty() {
                &error.schema_path
            } else {
                &error.instance_path
            };
            CompileError::InvalidPattern {
                resource,
                pointer: instance_pointer(location),
                pattern: error.instance.as_str().unwrap_or_default().to_string(),
            }
        }
        _ => CompileError::MetaSchema {
            resource,
            reason: format!("{error} at {}", instance_pointer(&error.instance_path)),
        },
    }
}

fn reference_error(resource: String, error: &ReferencingError) -> CompileError {
    match error {
        ReferencingError::UnknownSpecification { specification } => {
            CompileError::UnsupportedDraft {
                resource,
                specification: specification.clone(),
            }
        }
        ReferencingError::Unretrievable { uri, source } => CompileError::ExternalReference {
            resource,
            reference: uri.clone(),
            reason: source.to_string(),
        },
        ReferencingError::PointerToNowhere { pointer } => CompileError::UnresolvedReference {
            resource,
            reference: format!("{ROOT}{pointer}"),
        },
        ReferencingError::NoSuchAnchor { anchor } | ReferencingError::InvalidAnchor { anchor } => {
            CompileError::UnresolvedReference {
                resource,
                reference: format!("{ROOT}{anchor}"),
            }
        }
        other => CompileError::UnresolvedReference {
            resource,
            reference: other.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// An immutable, compiled schema.
#[derive(Debug, Clone)]
pub struct Validator {
    resource: String,
    root: Arc<Value>,
    inner: Arc<jsonschema::Validator>,
}

impl Validator {
    /// Name the schema was compiled under.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The compiled schema document.
    pub fn schema(&self) -> &Value {
        &self.root
    }

    /// JSON Schema draft the document is evaluated under.
    pub fn draft(&self) -> Draft {
        self.inner.draft()
    }

    /// Validate a normalized value tree.
    ///
    /// A single failure is returned as the root node itself; several are
    /// collected under a group at `#`.
    pub fn validate(&self, tree: &Value) -> ValidationOutcome {
        let mut failures = self.failures(tree);

        if failures.len() > 1 {
            return ValidationOutcome::Invalid(FailureNode::group(
                ROOT,
                ROOT,
                format!(
                    "doesn't validate with {}",
                    message::quote(&format!("{}#", self.resource))
                ),
                failures,
            ));
        }
        match failures.pop() {
            Some(only) => ValidationOutcome::Invalid(only),
            None => ValidationOutcome::Valid,
        }
    }

    fn failures(&self, tree: &Value) -> Vec<FailureNode> {
        let mut nodes: Vec<FailureNode> = Vec::new();
        let mut missing: Option<MissingProperties> = None;

        for error in self.inner.iter_errors(tree) {
            let instance = instance_pointer(&error.instance_path);
            let schema = absolute_keyword_pointer(&self.root, &error.schema_path);

            if let ValidationErrorKind::Required { property } = &error.kind {
                let same_object = missing
                    .as_ref()
                    .is_some_and(|open| open.instance == instance && open.schema == schema);
                if !same_object {
                    nodes.extend(missing.take().map(MissingProperties::into_leaf));
                }
                missing
                    .get_or_insert_with(|| MissingProperties {
                        instance,
                        schema,
                        properties: Vec::new(),
                    })
                    .properties
                    .push(property.clone());
                continue;
            }
            nodes.extend(missing.take().map(MissingProperties::into_leaf));

            let text = message::render(&error.kind, &error.instance);
            let node = match &error.kind {
                ValidationErrorKind::PropertyNames { error: cause } => {
                    let leaf = FailureNode::leaf(
                        instance.clone(),
                        schema.clone(),
                        message::render(&cause.kind, &cause.instance),
                    );
                    FailureNode::group(instance, schema, text, vec![leaf])
                }
                _ => FailureNode::leaf(instance, schema, text),
            };
            nodes.push(node);
        }
        nodes.extend(missing.map(MissingProperties::into_leaf));
        nodes
    }
}

/// `required` failures collected for one object.
struct MissingProperties {
    instance: String,
    schema: String,
    properties: Vec<Value>,
}

impl MissingProperties {
    fn into_leaf(self) -> FailureNode {
        let names: Vec<String> = self
            .properties
            .iter()
            .map(|p| match p {
                Value::String(s) => message::quote(s),
                other => other.to_string(),
            })
            .collect();
        FailureNode::leaf(
            self.instance,
            self.schema,
            format!("missing properties: {}", names.join(", ")),
        )
    }
}

/// Result of running a [`Validator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The document satisfies the schema.
    Valid,
    /// The document violates the schema; the root of the causation tree.
    Invalid(FailureNode),
}

impl ValidationOutcome {
    /// True when the document satisfies the schema.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Root failure node, if any.
    pub fn failure(&self) -> Option<&FailureNode> {
        match self {
            Self::Valid => None,
            Self::Invalid(root) => Some(root),
        }
    }

    /// Flattened leaf issues; empty when valid.
    pub fn issues(&self) -> Vec<Issue> {
        self.failure().map(flatten).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL_SCHEMA: &str = r##"{
        "$schema": "http://json-schema.org/draft-07/schema#",
        "definitions": {"URL": {"type": "string", "pattern": "^https?://.+"}},
        "type": "object",
        "required": ["website"],
        "properties": {
            "website": {"$ref": "#/definitions/URL"},
            "timeout": {"type": "integer", "exclusiveMinimum": 0}
        }
    }"##;

    fn rendered(outcome: &ValidationOutcome) -> Vec<String> {
        outcome.issues().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_valid_document() {
        let validator = compile(URL_SCHEMA).unwrap();
        let outcome = validator.validate(&json!({"website": "https://example.com", "timeout": 5}));
        assert!(outcome.is_valid());
        assert!(outcome.failure().is_none());
        assert!(outcome.issues().is_empty());
    }

    #[test]
    fn test_single_failure_is_the_root() {
        let validator = compile(URL_SCHEMA).unwrap();
        let outcome = validator.validate(&json!({"website": "https://example.com", "timeout": 0}));
        let root = outcome.failure().unwrap();
        assert!(root.is_leaf());
        assert_eq!(
            root.to_owned(),
            FailureNode::leaf(
                "#/timeout",
                "#/properties/timeout/exclusiveMinimum",
                "must be > 0/1 but found 0"
            )
        );
    }

    #[test]
    fn test_several_failures_are_grouped_at_root() {
        let validator = compile(URL_SCHEMA).unwrap();
        let outcome = validator.validate(&json!({"timeout": 0}));
        let root = outcome.failure().unwrap();
        assert_eq!(root.instance_pointer(), "#");
        assert_eq!(root.schema_pointer(), "#");
        assert_eq!(root.message(), r##"doesn't validate with "schema.json#""##);
        assert_eq!(
            rendered(&outcome),
            [
                r#"I[#] S[#/required] missing properties: "website""#,
                "I[#/timeout] S[#/properties/timeout/exclusiveMinimum] must be > 0/1 but found 0",
            ]
        );
    }

    #[test]
    fn test_ref_failures_point_into_definitions() {
        let validator = compile(URL_SCHEMA).unwrap();
        let outcome = validator.validate(&json!({"website": "ftp://example.com"}));
        assert_eq!(
            rendered(&outcome),
            [r#"I[#/website] S[#/definitions/URL/pattern] does not match pattern "^https?://.+""#]
        );
    }

    #[test]
    fn test_missing_properties_are_merged() {
        let validator = compile(r#"{"required": ["a", "b", "c"]}"#).unwrap();
        let outcome = validator.validate(&json!({"b": 1}));
        assert_eq!(
            rendered(&outcome),
            [r#"I[#] S[#/required] missing properties: "a", "c""#]
        );
    }

    #[test]
    fn test_property_names_failure_is_a_group() {
        let validator = compile(r#"{"propertyNames": {"maxLength": 3}}"#).unwrap();
        let outcome = validator.validate(&json!({"ok": 1, "toolong": 2}));
        let root = outcome.failure().unwrap();
        assert!(!root.is_leaf());
        assert_eq!(root.message(), r#"invalid propertyName "toolong""#);
        assert_eq!(root.leaf_count(), 1);
        assert_eq!(
            rendered(&outcome),
            ["I[#] S[#/propertyNames/maxLength] length must be <= 3, but got 7"]
        );
    }

    #[test]
    fn test_named_resource_appears_in_root_message() {
        let mut compiler = SchemaCompiler::new();
        compiler.add_resource("step.json", URL_SCHEMA).unwrap();
        let validator = compiler.compile("step.json").unwrap();
        assert_eq!(validator.resource(), "step.json");
        let outcome = validator.validate(&json!({"timeout": -1}));
        assert_eq!(
            outcome.failure().unwrap().message(),
            r##"doesn't validate with "step.json#""##
        );
    }

    #[test]
    fn test_add_value() {
        let mut compiler = SchemaCompiler::new();
        compiler.add_value("inline", json!({"type": "string"}));
        let validator = compiler.compile("inline").unwrap();
        assert!(validator.validate(&json!("x")).is_valid());
        assert_eq!(validator.schema(), &json!({"type": "string"}));
    }

    #[test]
    fn test_draft_defaults_to_07() {
        assert_eq!(compile(r#"{"type": "string"}"#).unwrap().draft(), Draft::Draft7);
        let validator =
            compile(r#"{"$schema": "https://json-schema.org/draft/2020-12/schema"}"#).unwrap();
        assert_eq!(validator.draft(), Draft::Draft202012);
    }

    #[test]
    fn test_draft_04_exclusive_minimum() {
        let validator = compile(
            r#"{
                "$schema": "http://json-schema.org/draft-04/schema#",
                "properties": {"t": {"minimum": 0, "exclusiveMinimum": true}}
            }"#,
        )
        .unwrap();
        assert_eq!(validator.draft(), Draft::Draft4);
        let outcome = validator.validate(&json!({"t": 0}));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.issues()[0].instance_pointer, "#/t");
        assert!(validator.validate(&json!({"t": 1})).is_valid());
    }

    #[test]
    fn test_draft_2020_12_prefix_items() {
        let validator = compile(
            r#"{
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "prefixItems": [{"type": "string"}]
            }"#,
        )
        .unwrap();
        assert_eq!(
            rendered(&validator.validate(&json!([1]))),
            ["I[#/0] S[#/prefixItems/0/type] expected string, but got number"]
        );
        assert!(validator.validate(&json!(["a", 2])).is_valid());
    }

    #[test]
    fn test_format_is_asserted() {
        let validator = compile(r#"{"format": "email"}"#).unwrap();
        assert_eq!(
            rendered(&validator.validate(&json!("not an email"))),
            [r#"I[#] S[#/format] "not an email" is not valid "email""#]
        );
        assert!(validator.validate(&json!("dev@example.com")).is_valid());
    }

    #[test]
    fn test_unknown_draft_is_rejected() {
        let err = compile(r#"{"$schema": "https://example.com/my-meta-schema"}"#).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnsupportedDraft { ref specification, .. }
                if specification == "https://example.com/my-meta-schema"
        ));
    }

    #[test]
    fn test_invalid_json_is_a_compile_error() {
        let err = compile("{not json").unwrap_err();
        assert!(matches!(
            err,
            CompileError::InvalidJson { ref resource, .. } if resource == "schema.json"
        ));
    }

    #[test]
    fn test_unknown_resource() {
        let err = SchemaCompiler::new().compile("missing.json").unwrap_err();
        assert!(matches!(err, CompileError::UnknownResource(ref name) if name == "missing.json"));
    }

    #[test]
    fn test_meta_schema_violation() {
        let err = compile(r#"{"type": "no-such-type"}"#).unwrap_err();
        assert!(matches!(err, CompileError::MetaSchema { .. }));
        let err = compile("42").unwrap_err();
        assert!(matches!(err, CompileError::MetaSchema { .. }));
    }

    #[test]
    fn test_bad_regex_is_a_compile_error() {
        let err =
            compile(r#"{"properties": {"s": {"type": "string", "pattern": "(["}}}"#).unwrap_err();
        assert!(matches!(err, CompileError::InvalidPattern { ref pattern, .. } if pattern == "(["));
    }

    #[test]
    fn test_dangling_ref_is_a_compile_error() {
        let err =
            compile(r##"{"properties": {"w": {"$ref": "#/definitions/Nope"}}}"##).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnresolvedReference { ref reference, .. }
                if reference == "#/definitions/Nope"
        ));
    }

    #[test]
    fn test_external_ref_is_a_compile_error() {
        let err = compile(r#"{"properties": {"w": {"$ref": "https://example.com/other.json"}}}"#)
            .unwrap_err();
        assert!(matches!(err, CompileError::ExternalReference { .. }));
    }

    #[test]
    fn test_boolean_root_schemas() {
        assert!(compile("true").unwrap().validate(&json!({"a": 1})).is_valid());
        let outcome = compile("false").unwrap().validate(&json!({}));
        assert_eq!(outcome.issues()[0].to_string(), "I[#] S[#] always fail");
    }

    #[test]
    fn test_validator_does_not_change_between_calls() {
        let validator = compile(URL_SCHEMA).unwrap();
        let doc = json!({"website": "ftp://nope"});
        let first = validator.validate(&doc);
        let second = validator.validate(&doc);
        assert_eq!(first, second);
    }

    #[test]
    fn test_validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }

    #[test]
    fn test_shared_validator_across_threads() {
        let validator = compile(URL_SCHEMA).unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let validator = &validator;
                    scope.spawn(move || {
                        let doc = json!({"website": "https://example.com", "timeout": i});
                        validator.validate(&doc).is_valid()
                    })
                })
                .collect();
            let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert!(!results[0]);
            assert!(results[1..].iter().all(|ok| *ok));
        });
    }
}
