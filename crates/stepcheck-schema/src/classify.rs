//! # Severity Classification
//!
//! Splits flattened issues into warnings and errors with an ordered list of
//! regular expressions. Each issue is rendered to its canonical
//! `I[...] S[...] message` string and tested against the rules in
//! declaration order; the first match makes it a warning, no match leaves it
//! an error. Rules may overlap and only the first match counts, so a
//! [`RuleSet`] is an ordered list, never a set.
//!
//! The classifier knows nothing about schema semantics. The warning/error
//! boundary moves by editing rules, not code.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::issue::Issue;

/// Additional top-level properties (`is_requires_admin_user`, `host_os_tags`,
/// ...) are deprecated but tolerated.
pub const ADDITIONAL_PROPERTIES_NOT_ALLOWED_PATTERN: &str =
    r"^I\[#\] S\[#/additionalProperties\] additionalProperties .+ not allowed$";

/// `support_url` and `source_code_url` are required, but older steps lack them.
pub const MISSING_URL_PROPERTIES_PATTERN: &str = r#"^I\[#\] S\[#/required\] missing properties: "(support_url|source_code_url)"(, "(support_url|source_code_url)")?$"#;

/// Summaries longer than 100 characters or spanning several lines.
pub const SUMMARY_DOES_NOT_MATCH_PATTERN: &str = r#"^I\[#/summary\] S\[#/properties/summary/pattern\] does not match pattern "\^\.\{1,100\}\$"$"#;

/// `go` listed as a brew or apt-get dependency.
pub const DEPS_NOT_FAILED_PATTERN: &str = r"^I\[#/deps/(brew|apt_get)/\d+/(name|bin_name)\] S\[#/definitions/(BrewDepModel|AptGetDepModel)/properties/(name|bin_name)/not\] not failed$";

/// Input or output options without a summary.
pub const INPUT_OUTPUT_MISSING_SUMMARY_PATTERN: &str = r#"^I\[#/(inputs|outputs)/\d+/opts\] S\[#/definitions/EnvVarOpts/required\] missing properties: "summary"$"#;

/// Input or output options with an empty summary.
pub const INPUT_OUTPUT_EMPTY_SUMMARY_PATTERN: &str = r"^I\[#/(inputs|outputs)/\d+/opts/summary\] S\[#/definitions/EnvVarOpts/properties/summary/minLength\] length must be >= 1, but got 0$";

/// Input default values that are neither a string nor null.
pub const INPUT_VALUE_TYPE_PATTERN: &str = r"^I\[#/inputs/\d+/[^/\]]+\] S\[#/definitions/InputEnvVar/additionalProperties/type\] expected .+, but got .+$";

/// Value option lists with fewer than two entries.
pub const INPUT_VALUE_OPTIONS_MIN_ITEMS_PATTERN: &str = r"^I\[#/inputs/\d+/opts/value_options\] S\[#/definitions/EnvVarOpts/properties/value_options/minItems\] minimum 2 items allowed, but found \d+ items$";

/// Known soft constraints of the bundled step schema, in match order.
pub const DEFAULT_WARNING_PATTERNS: &[&str] = &[
    ADDITIONAL_PROPERTIES_NOT_ALLOWED_PATTERN,
    MISSING_URL_PROPERTIES_PATTERN,
    SUMMARY_DOES_NOT_MATCH_PATTERN,
    DEPS_NOT_FAILED_PATTERN,
    INPUT_OUTPUT_MISSING_SUMMARY_PATTERN,
    INPUT_OUTPUT_EMPTY_SUMMARY_PATTERN,
    INPUT_VALUE_TYPE_PATTERN,
    INPUT_VALUE_OPTIONS_MIN_ITEMS_PATTERN,
];

/// Severity assigned to an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; does not block publishing.
    Warning,
    /// Blocking.
    Error,
}

/// A pattern that demotes matching issues to warnings.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pattern: Regex,
}

impl ClassificationRule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if `source` is not a valid regex.
    pub fn new(source: &str) -> Result<Self, RuleError> {
        let pattern = Regex::new(source).map_err(|e| RuleError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// The pattern source text.
    pub fn source(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the rendered issue matches this rule anywhere.
    pub fn matches(&self, rendered: &str) -> bool {
        self.pattern.is_match(rendered)
    }
}

/// An immutable, ordered list of classification rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
}

impl RuleSet {
    /// Compile rules from pattern sources, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] for the first invalid pattern.
    pub fn new<I, S>(patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .map(|p| ClassificationRule::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// A rule set that classifies everything as an error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rules for the bundled step schema ([`DEFAULT_WARNING_PATTERNS`]).
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if the built-in table is broken.
    pub fn step_defaults() -> Result<Self, RuleError> {
        Self::new(DEFAULT_WARNING_PATTERNS)
    }

    /// Return a new rule set with `other`'s rules appended after this one's.
    pub fn extend(mut self, other: RuleSet) -> Self {
        self.rules.extend(other.rules);
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rules in match order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Severity of a single issue under these rules.
    pub fn severity_of(&self, issue: &Issue) -> Severity {
        let rendered = issue.to_string();
        if self.rules.iter().any(|rule| rule.matches(&rendered)) {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

/// Issues partitioned by severity. Each side keeps the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Issues matched by a rule.
    pub warnings: Vec<Issue>,
    /// Issues matched by no rule.
    pub errors: Vec<Issue>,
}

/// Stable partition of `issues` into warnings and errors.
pub fn classify(issues: Vec<Issue>, rules: &RuleSet) -> Classification {
    let mut classification = Classification::default();
    for issue in issues {
        match rules.severity_of(&issue) {
            Severity::Warning => classification.warnings.push(issue),
            Severity::Error => classification.errors.push(issue),
        }
    }
    tracing::debug!(
        rules = rules.len(),
        warnings = classification.warnings.len(),
        errors = classification.errors.len(),
        "classified validation issues"
    );
    classification
}

// ---------------------------------------------------------------------------
// Rules file
// ---------------------------------------------------------------------------

/// On-disk rules configuration.
///
/// ```yaml
/// include_defaults: false
/// warning_patterns:
///   - 'I\[#\] S\[#/required\] missing properties: .+'
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Prepend [`DEFAULT_WARNING_PATTERNS`] to the listed patterns.
    #[serde(default)]
    pub include_defaults: bool,
    /// Additional warning patterns, in match order.
    #[serde(default)]
    pub warning_patterns: Vec<String>,
}

impl RulesConfig {
    /// Parse a YAML rules file.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Config`] for malformed YAML or unknown keys.
    pub fn from_yaml_str(text: &str) -> Result<Self, RuleError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Compile into a [`RuleSet`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] for the first invalid pattern.
    pub fn into_rule_set(self) -> Result<RuleSet, RuleError> {
        let listed = RuleSet::new(&self.warning_patterns)?;
        if self.include_defaults {
            Ok(RuleSet::step_defaults()?.extend(listed))
        } else {
            Ok(listed)
        }
    }
}
