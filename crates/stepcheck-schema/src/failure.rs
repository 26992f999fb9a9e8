//! # Failure Trees
//!
//! A failed validation produces a tree of causation rather than a flat list.
//! [`FailureNode::Group`] nodes only aggregate: the document root when
//! several keywords fail, or a `propertyNames` failure holding the offending
//! name's cause. The concrete findings are the [`FailureNode::Leaf`] nodes.

use std::fmt::Write as _;

/// One node of the causation tree produced by a failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureNode {
    /// A concrete, independently reportable finding.
    Leaf {
        /// Where in the document the finding applies, e.g. `#/inputs/0/opts`.
        instance_pointer: String,
        /// Which schema keyword fired, e.g. `#/definitions/EnvVarOpts/required`.
        schema_pointer: String,
        /// Human-readable explanation.
        message: String,
    },
    /// A composition failure that exists only to hold its causes.
    Group {
        /// Where in the document the composition was evaluated.
        instance_pointer: String,
        /// Schema pointer of the composition keyword.
        schema_pointer: String,
        /// Summary such as `doesn't validate with ...`. Never reported as an issue.
        message: String,
        /// Causes, in evaluation order.
        children: Vec<FailureNode>,
    },
}

impl FailureNode {
    /// Build a leaf node.
    pub fn leaf(
        instance_pointer: impl Into<String>,
        schema_pointer: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Leaf {
            instance_pointer: instance_pointer.into(),
            schema_pointer: schema_pointer.into(),
            message: message.into(),
        }
    }

    /// Build a grouping node.
    pub fn group(
        instance_pointer: impl Into<String>,
        schema_pointer: impl Into<String>,
        message: impl Into<String>,
        children: Vec<FailureNode>,
    ) -> Self {
        Self::Group {
            instance_pointer: instance_pointer.into(),
            schema_pointer: schema_pointer.into(),
            message: message.into(),
            children,
        }
    }

    /// Instance pointer of this node.
    pub fn instance_pointer(&self) -> &str {
        match self {
            Self::Leaf { instance_pointer, .. } | Self::Group { instance_pointer, .. } => {
                instance_pointer
            }
        }
    }

    /// Schema pointer of this node.
    pub fn schema_pointer(&self) -> &str {
        match self {
            Self::Leaf { schema_pointer, .. } | Self::Group { schema_pointer, .. } => {
                schema_pointer
            }
        }
    }

    /// Message of this node.
    pub fn message(&self) -> &str {
        match self {
            Self::Leaf { message, .. } | Self::Group { message, .. } => message,
        }
    }

    /// Child causes; empty for leaves.
    pub fn children(&self) -> &[FailureNode] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Group { children, .. } => children,
        }
    }

    /// True for nodes that represent a concrete finding.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Number of leaves reachable from this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Group { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Render the whole tree, group messages included, one node per line
    /// with two spaces of indentation per level.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = write!(
            out,
            "{:indent$}I[{}] S[{}] {}",
            "",
            self.instance_pointer(),
            self.schema_pointer(),
            self.message(),
            indent = depth * 2
        );
        for child in self.children() {
            child.render_into(out, depth + 1);
        }
    }
}
