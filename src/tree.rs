//! The shape-preserving error tree and its utilities
//!
//! Validation produces an [`ErrorTree`] mirroring the shape of the values
//! object: leaf errors for flat fields, subtrees for nested objects. Absence
//! of a key means the field is valid; a fully valid form is `None`, never an
//! empty tree.
//!
//! The utilities here are the ones a UI layer leans on:
//!
//! - [`ErrorTree::at_path`]: dotted-path lookup, total (never panics);
//! - [`clean_errors_deep`]: strip structural placeholders before display;
//! - [`merge_errors`]: combine rule-produced and schema-produced trees.
//!
//! # Examples
//!
//! ```
//! use formcheck::{ErrorNode, ErrorTree, FieldError};
//!
//! let mut address = ErrorTree::new();
//! address.insert_leaf("city", FieldError::new("This field is required."));
//!
//! let mut errors = ErrorTree::new();
//! errors.insert_tree("address", address);
//!
//! let leaf = errors.at_path("address.city").unwrap();
//! assert_eq!(leaf.message, "This field is required.");
//! assert!(errors.at_path("address.street").is_none());
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

/// One field's validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Human-readable, already-localized message.
    pub message: String,
    /// Optional machine-readable code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl FieldError {
    /// A plain message-only error.
    pub fn new(message: impl Into<String>) -> Self {
        FieldError {
            message: message.into(),
            code: None,
        }
    }

    /// Attach a machine-readable code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// A node in the error tree: either one field's error or a nested subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorNode {
    /// A flat field's error.
    Leaf(FieldError),
    /// Errors of a nested object, mirroring its shape.
    Tree(ErrorTree),
}

impl ErrorNode {
    /// The leaf error, if this node is one.
    pub fn as_leaf(&self) -> Option<&FieldError> {
        match self {
            ErrorNode::Leaf(error) => Some(error),
            ErrorNode::Tree(_) => None,
        }
    }

    /// The subtree, if this node is one.
    pub fn as_tree(&self) -> Option<&ErrorTree> {
        match self {
            ErrorNode::Leaf(_) => None,
            ErrorNode::Tree(tree) => Some(tree),
        }
    }
}

/// A mapping from field name to [`ErrorNode`], mirroring the values shape.
///
/// Iteration order is deterministic (sorted by field name), so folding
/// concurrent results into a tree gives the same output regardless of
/// completion timing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorTree {
    entries: BTreeMap<String, ErrorNode>,
}

impl ErrorTree {
    /// An empty tree.
    pub fn new() -> Self {
        ErrorTree::default()
    }

    /// Whether the tree has no entries at all (not even empty subtrees).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert a node for a field, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, node: ErrorNode) {
        self.entries.insert(name.into(), node);
    }

    /// Insert a leaf error for a flat field.
    pub fn insert_leaf(&mut self, name: impl Into<String>, error: FieldError) {
        self.insert(name, ErrorNode::Leaf(error));
    }

    /// Insert a subtree for a nested field.
    pub fn insert_tree(&mut self, name: impl Into<String>, tree: ErrorTree) {
        self.insert(name, ErrorNode::Tree(tree));
    }

    /// The node for a field at this level.
    pub fn get(&self, name: &str) -> Option<&ErrorNode> {
        self.entries.get(name)
    }

    /// Iterate entries at this level in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ErrorNode)> {
        self.entries.iter()
    }

    /// Look up a leaf error by dotted path.
    ///
    /// Returns `None` when any segment is absent or addresses through a leaf;
    /// never panics on missing paths.
    pub fn at_path(&self, path: &str) -> Option<&FieldError> {
        let mut current = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let node = current.entries.get(segment)?;
            if segments.peek().is_none() {
                return node.as_leaf();
            }
            current = node.as_tree()?;
        }
        None
    }

    /// Whether any leaf error exists anywhere in the tree.
    ///
    /// Empty subtree markers kept for shape preservation do not count.
    pub fn has_messages(&self) -> bool {
        self.entries.values().any(|node| match node {
            ErrorNode::Leaf(_) => true,
            ErrorNode::Tree(tree) => tree.has_messages(),
        })
    }

    /// `Some(self)` when the tree carries at least one leaf error, `None`
    /// otherwise: the "null, never an empty mapping" return contract of the
    /// form validators.
    pub fn into_option(self) -> Option<Self> {
        if self.has_messages() {
            Some(self)
        } else {
            None
        }
    }
}

impl IntoIterator for ErrorTree {
    type Item = (String, ErrorNode);
    type IntoIter = std::collections::btree_map::IntoIter<String, ErrorNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, ErrorNode)> for ErrorTree {
    fn from_iter<I: IntoIterator<Item = (String, ErrorNode)>>(iter: I) -> Self {
        ErrorTree {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Merge two independently produced error trees.
///
/// Null-propagating: both `None` gives `None`, one `None` gives the other.
/// Otherwise the result is the union of keys; for a key present in both, the
/// entry from `b` wins only when it is a leaf whose message differs from
/// `a`'s: a schema error may supersede a rule error for the same field when
/// they disagree, without churn when they agree.
///
/// # Examples
///
/// ```
/// use formcheck::{merge_errors, ErrorTree, FieldError};
///
/// assert_eq!(merge_errors(None, None), None);
///
/// let mut a = ErrorTree::new();
/// a.insert_leaf("email", FieldError::new("Invalid email format."));
/// let mut b = ErrorTree::new();
/// b.insert_leaf("email", FieldError::new("Email is taken."));
///
/// let merged = merge_errors(Some(a), Some(b)).unwrap();
/// assert_eq!(merged.at_path("email").unwrap().message, "Email is taken.");
/// ```
pub fn merge_errors(a: Option<ErrorTree>, b: Option<ErrorTree>) -> Option<ErrorTree> {
    match (a, b) {
        (None, None) => None,
        (Some(tree), None) | (None, Some(tree)) => Some(tree),
        (Some(mut merged), Some(other)) => {
            for (name, node) in other {
                match merged.entries.get(&name) {
                    None => {
                        merged.entries.insert(name, node);
                    }
                    Some(existing) => {
                        let existing_message = existing.as_leaf().map(|leaf| leaf.message.as_str());
                        if let ErrorNode::Leaf(leaf) = &node {
                            if existing_message != Some(leaf.message.as_str()) {
                                merged.entries.insert(name, node);
                            }
                        }
                    }
                }
            }
            Some(merged)
        }
    }
}

/// Recursively strip empty subtrees, returning `None` when nothing remains.
///
/// The nested validators keep empty-but-present subtree markers so dotted
/// paths stay addressable; this produces a display-ready copy without them.
pub fn clean_errors_deep(tree: &ErrorTree) -> Option<ErrorTree> {
    let mut cleaned = ErrorTree::new();
    for (name, node) in tree.iter() {
        match node {
            ErrorNode::Leaf(error) => cleaned.insert_leaf(name.clone(), error.clone()),
            ErrorNode::Tree(subtree) => {
                if let Some(kept) = clean_errors_deep(subtree) {
                    cleaned.insert_tree(name.clone(), kept);
                }
            }
        }
    }
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
