//! # Issue Flattening
//!
//! Turns a [`FailureNode`] tree into the ordered list of leaf findings that
//! callers report and diff across runs.
//!
//! Only leaves become issues. A group message such as `doesn't validate with ...` says
//! nothing actionable on its own, so groups contribute nothing and simply
//! recurse into their causes in order. A group with no reachable
//! leaf therefore yields no issue at all.

use std::fmt;

use serde::Serialize;

use crate::failure::FailureNode;

/// One flattened validation finding.
///
/// Renders as `I[<instance_pointer>] S[<schema_pointer>] <message>`; the
/// classifier matches its patterns against exactly that string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Issue {
    /// Location in the validated document.
    pub instance_pointer: String,
    /// Location of the schema keyword that produced the finding.
    pub schema_pointer: String,
    /// Human-readable explanation.
    pub message: String,
}

impl Issue {
    /// Build an issue from its three parts.
    pub fn new(
        instance_pointer: impl Into<String>,
        schema_pointer: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_pointer: instance_pointer.into(),
            schema_pointer: schema_pointer.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "I[{}] S[{}] {}",
            self.instance_pointer, self.schema_pointer, self.message
        )
    }
}

/// Collect the leaves of `root`, depth-first and left to right.
pub fn flatten(root: &FailureNode) -> Vec<Issue> {
    let mut issues = Vec::new();
    collect(root, &mut issues);
    issues
}

fn collect(node: &FailureNode, issues: &mut Vec<Issue>) {
    match node {
        FailureNode::Leaf {
            instance_pointer,
            schema_pointer,
            message,
        } => issues.push(Issue::new(
            instance_pointer.as_str(),
            schema_pointer.as_str(),
            message.as_str(),
        )),
        FailureNode::Group { children, .. } => {
            for child in children {
                collect(child, issues);
            }
        }
    }
}

/// Render a block of issues, one per line.
pub fn render_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
