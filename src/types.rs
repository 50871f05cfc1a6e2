//! Core types for field masking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mask::descend;

/// Default query parameter selecting fields to keep.
pub const DEFAULT_FIELDS_NAME: &str = "fields";

/// Default query parameter selecting fields to drop.
pub const DEFAULT_EXCLUDES_NAME: &str = "excludes";

/// Separator between segments of a predicate path (`comments.author`).
pub const DOTTED_PATH_DELIMITER: char = '.';

/// Deepest nesting the parser builds. Segments past it are dropped, so the
/// last kept name selects its whole subtree.
pub const MAX_FIELD_DEPTH: usize = 64;

/// Parsed field mask: field name to nested mask.
///
/// An empty child means "leaf": the field is selected with no further
/// constraint on its contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldTree(BTreeMap<String, FieldTree>);

/// Shared empty tree returned when descending into an absent name.
pub(crate) static EMPTY_TREE: FieldTree = FieldTree(BTreeMap::new());

impl FieldTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldTree> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldTree)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the child for `name`, creating an empty one if missing.
    ///
    /// Existing children are kept, so `a/b,a/c` merges into one `a` entry.
    pub fn entry(&mut self, name: impl Into<String>) -> &mut FieldTree {
        self.0.entry(name.into()).or_default()
    }

    /// Insert a chain of nested names, merging with what is already there.
    pub fn insert_path<I, S>(&mut self, segments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = self;
        for segment in segments {
            node = node.entry(segment);
        }
    }
}

impl<S: Into<String>> FromIterator<(S, FieldTree)> for FieldTree {
    fn from_iter<T: IntoIterator<Item = (S, FieldTree)>>(iter: T) -> Self {
        FieldTree(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Per-node masking context handed to the pruner and the predicate registry.
///
/// Holds at most one non-empty tree: the request adapter rejects a request
/// carrying both, and the constructors here cannot produce one. Empty trees
/// stand for "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskContext {
    requested: FieldTree,
    excluded: FieldTree,
}

impl MaskContext {
    /// Context with no client hints: nothing is pruned, every loader runs.
    pub fn unmasked() -> Self {
        Self::default()
    }

    /// Keep only the fields in `tree`.
    pub fn including(tree: FieldTree) -> Self {
        Self {
            requested: tree,
            excluded: FieldTree::new(),
        }
    }

    /// Drop the fields in `tree`.
    pub fn excluding(tree: FieldTree) -> Self {
        Self {
            requested: FieldTree::new(),
            excluded: tree,
        }
    }

    pub fn requested(&self) -> &FieldTree {
        &self.requested
    }

    pub fn excluded(&self) -> &FieldTree {
        &self.excluded
    }

    /// True when neither tree carries a constraint.
    pub fn is_unmasked(&self) -> bool {
        self.requested.is_empty() && self.excluded.is_empty()
    }

    /// Resolve to `(tree, is_negated)`, or `None` when there is no mask.
    ///
    /// `collapse` on two empty trees yields `({}, true)`, which read literally
    /// would exclude everything; this is the guarded entry point.
    pub fn mask(&self) -> Option<(&FieldTree, bool)> {
        if self.is_unmasked() {
            return None;
        }
        Some(crate::mask::collapse(&self.requested, &self.excluded))
    }

    /// Context for the nested object stored under `name`.
    pub fn narrow(&self, name: &str) -> MaskContext {
        MaskContext {
            requested: descend(name, &self.requested).clone(),
            excluded: descend(name, &self.excluded).clone(),
        }
    }
}

/// Query parameter names used to read masks from a request.
///
/// Both names may be the same parameter. A non-empty value for it then
/// counts as both masks and the request is rejected as conflicting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    /// Parameter holding the include mask.
    pub fields_name: String,
    /// Parameter holding the exclude mask.
    pub excludes_name: String,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            fields_name: DEFAULT_FIELDS_NAME.to_string(),
            excludes_name: DEFAULT_EXCLUDES_NAME.to_string(),
        }
    }
}

impl MaskParams {
    /// Parameter names `fields` / `excludes`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the include parameter name.
    pub fn fields_name(mut self, name: impl Into<String>) -> Self {
        self.fields_name = name.into();
        self
    }

    /// Override the exclude parameter name.
    pub fn excludes_name(mut self, name: impl Into<String>) -> Self {
        self.excludes_name = name.into();
        self
    }
}
