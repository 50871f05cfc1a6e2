//! Mask resolution - membership tests against a parsed field mask.

use serde_json::{Map, Value};

use crate::types::{FieldTree, MaskContext, DOTTED_PATH_DELIMITER, EMPTY_TREE};

/// Pick the active mask out of an include tree and an exclude tree.
///
/// Returns `(includes, false)` when `includes` is non-empty, otherwise
/// `(excludes, true)`. Two empty trees give `({}, true)`; callers must treat
/// that as "no mask" before testing membership, since an empty negated tree
/// would otherwise drop every field. [`MaskContext::mask`] does this check.
pub fn collapse<'a>(includes: &'a FieldTree, excludes: &'a FieldTree) -> (&'a FieldTree, bool) {
    if !includes.is_empty() {
        (includes, false)
    } else {
        (excludes, true)
    }
}

/// Whether `name` survives `tree` at the current nesting level.
///
/// In inclusion mode a name survives iff it is a key of `tree`. In exclusion
/// mode a name survives iff it is not a key, or its child mask is non-empty:
/// `excludes=comments/body` keeps `comments` and drops `body` inside it.
pub fn includes_field(name: &str, tree: &FieldTree, is_negated: bool) -> bool {
    match tree.get(name) {
        None => is_negated,
        Some(child) => !is_negated || !child.is_empty(),
    }
}

/// The sub-mask for the nested object stored under `name`.
pub fn descend<'a>(name: &str, tree: &'a FieldTree) -> &'a FieldTree {
    tree.get(name).unwrap_or(&EMPTY_TREE)
}

/// Whether a dotted path such as `comments.author` is selected by `tree`.
///
/// Each segment must pass [`includes_field`] at its own level. A matched
/// leaf selects its whole subtree, so with `fields=comments` the path
/// `comments.author` is included, and with `excludes=comments` it is not.
pub fn includes_path(dotted_path: &str, tree: &FieldTree, is_negated: bool) -> bool {
    let mut node = tree;
    for segment in dotted_path
        .split(DOTTED_PATH_DELIMITER)
        .filter(|s| !s.is_empty())
    {
        if !includes_field(segment, node, is_negated) {
            return false;
        }
        match node.get(segment) {
            Some(child) if !child.is_empty() => node = child,
            // Unmentioned (exclusion mode) or a leaf (inclusion mode)
            _ => return true,
        }
    }
    true
}

/// Apply a mask directly to a JSON document.
///
/// Object keys are filtered with [`includes_field`] in their original order,
/// nested values are masked with [`descend`], and arrays are masked element
/// by element with the mask of the array itself.
pub fn apply_json_mask(value: &Value, tree: &FieldTree, is_negated: bool) -> Value {
    match value {
        Value::Object(map) => {
            let mut result = Map::new();
            for (key, child) in map {
                if !includes_field(key, tree, is_negated) {
                    continue;
                }
                let sub_tree = descend(key, tree);
                let masked = if sub_tree.is_empty() {
                    // Leaf selection keeps the whole value
                    child.clone()
                } else {
                    apply_json_mask(child, sub_tree, is_negated)
                };
                result.insert(key.clone(), masked);
            }
            Value::Object(result)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| apply_json_mask(item, tree, is_negated))
                .collect(),
        ),
        // Primitives pass through unchanged
        other => other.clone(),
    }
}

/// Mask a JSON document with a request context.
///
/// An unmasked context returns the document unchanged.
pub fn mask_json(value: &Value, ctx: &MaskContext) -> Value {
    match ctx.mask() {
        Some((tree, is_negated)) => apply_json_mask(value, tree, is_negated),
        None => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fields;
    use serde_json::json;

    // === Collapse ===

    #[test]
    fn collapse_prefers_includes() {
        let includes = parse_fields("a");
        let excludes = FieldTree::new();
        let (tree, negated) = collapse(&includes, &excludes);
        assert_eq!(tree, &includes);
        assert!(!negated);
    }

    #[test]
    fn collapse_falls_back_to_excludes() {
        let includes = FieldTree::new();
        let excludes = parse_fields("b");
        let (tree, negated) = collapse(&includes, &excludes);
        assert_eq!(tree, &excludes);
        assert!(negated);
    }

    #[test]
    fn collapse_both_empty_is_negated_empty() {
        let empty = FieldTree::new();
        let (tree, negated) = collapse(&empty, &empty);
        assert!(tree.is_empty());
        assert!(negated);
    }

    // === Field membership ===

    #[test]
    fn inclusion_membership() {
        let tree = parse_fields("title,author/username");
        assert!(includes_field("title", &tree, false));
        assert!(includes_field("author", &tree, false));
        assert!(!includes_field("body", &tree, false));
    }

    #[test]
    fn inclusion_empty_tree_includes_nothing() {
        assert!(!includes_field("anything", &FieldTree::new(), false));
    }

    #[test]
    fn negation_asymmetry() {
        let tree = parse_fields("comments/body");
        assert!(includes_field("comments", &tree, true));

        let tree = parse_fields("body");
        assert!(!includes_field("body", &tree, true));
        assert!(includes_field("title", &tree, true));
    }

    #[test]
    fn descend_returns_child_or_empty() {
        let tree = parse_fields("author/username");
        assert!(descend("author", &tree).contains("username"));
        assert!(descend("missing", &tree).is_empty());
    }

    // === Dotted paths ===

    #[test]
    fn dotted_path_inclusion() {
        let tree = parse_fields("title,author,comments/body");
        assert!(includes_path("author", &tree, false));
        assert!(includes_path("comments", &tree, false));
        assert!(!includes_path("comments.author", &tree, false));
        assert!(!includes_path("tags", &tree, false));
    }

    #[test]
    fn dotted_path_leaf_selects_subtree() {
        let tree = parse_fields("comments");
        assert!(includes_path("comments.author", &tree, false));

        assert!(!includes_path("comments.author", &tree, true));
    }

    #[test]
    fn dotted_path_exclusion() {
        let tree = parse_fields("comments/body");
        assert!(includes_path("comments", &tree, true));
        assert!(includes_path("comments.author", &tree, true));
        assert!(!includes_path("comments.body", &tree, true));
        assert!(includes_path("author", &tree, true));
    }

    // === JSON masking ===

    fn raw_data() -> Value {
        json!({
            "a": "test",
            "b": { "nested": "test" },
            "c": { "a": { "b": true } },
            "d": { "a": { "c": "value", "d": "value" } }
        })
    }

    #[test]
    fn json_mask_top_level_fields() {
        let tree = parse_fields("a,b");
        let masked = apply_json_mask(&raw_data(), &tree, false);
        assert_eq!(masked, json!({ "a": "test", "b": { "nested": "test" } }));
    }

    #[test]
    fn json_mask_deep_path() {
        let tree = parse_fields("d/a/d");
        let masked = apply_json_mask(&raw_data(), &tree, false);
        assert_eq!(masked, json!({ "d": { "a": { "d": "value" } } }));
    }

    #[test]
    fn json_mask_exclusion_keeps_siblings() {
        let tree = parse_fields("d/a/c,b");
        let masked = apply_json_mask(&raw_data(), &tree, true);
        assert_eq!(
            masked,
            json!({
                "a": "test",
                "c": { "a": { "b": true } },
                "d": { "a": { "d": "value" } }
            })
        );
    }

    #[test]
    fn json_mask_arrays_element_wise() {
        let data = json!([
            { "title": "one", "body": "x" },
            { "title": "two", "body": "y" }
        ]);
        let masked = apply_json_mask(&data, &parse_fields("title"), false);
        assert_eq!(masked, json!([{ "title": "one" }, { "title": "two" }]));
    }

    #[test]
    fn json_mask_preserves_document_order() {
        let data = json!({ "z": 1, "a": 2, "m": 3 });
        let masked = apply_json_mask(&data, &parse_fields("m,z"), false);
        let keys: Vec<&String> = masked.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "m"]);
    }

    #[test]
    fn mask_json_unmasked_is_identity() {
        let data = raw_data();
        assert_eq!(mask_json(&data, &MaskContext::unmasked()), data);
    }
}
