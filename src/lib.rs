//! Field Masks
//!
//! Partial responses driven by `fields=` / `excludes=` query parameters, and
//! data loading that only fetches what the mask asks for.
//!
//! A mask such as `title,author/username` is parsed into a [`FieldTree`].
//! Serializers prune their field lists against it, and a
//! [`PredicateRegistry`] decides which expensive loaders a request needs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fieldmask::{extract_mask, MaskParams, Schema};
//! use serde_json::json;
//!
//! let user = Arc::new(Schema::new().value("username").value("email"));
//! let ticket = Schema::new().value("title").value("body").object("author", user);
//!
//! let record = json!({
//!     "title": "Broken build",
//!     "body": "CI is red",
//!     "author": { "username": "ana", "email": "ana@example.org" }
//! });
//!
//! let ctx = extract_mask("fields=title,author/username", &MaskParams::default()).unwrap();
//! let output = ticket.serialize(&record, &ctx);
//!
//! assert_eq!(output, json!({ "title": "Broken build", "author": { "username": "ana" } }));
//! ```
//!
//! # Mask Semantics
//!
//! | Mask | Field | Kept? |
//! |------|-------|-------|
//! | `fields=a` | `a` | yes, whole value |
//! | `fields=a/b` | `a` | yes, only `b` inside |
//! | `fields=a` | `c` | no |
//! | `excludes=a` | `a` | no |
//! | `excludes=a/b` | `a` | yes, without `b` inside |
//! | `excludes=a` | `c` | yes |
//!
//! Supplying both parameters in one request is rejected with
//! [`MaskError::ConflictingMasks`]. Unknown field names match nothing.

mod error;
mod loader;
mod mask;
mod parser;
mod pruner;
mod registry;
mod request;
mod serializer;
mod types;

pub use error::{LoadError, MaskError};
pub use loader::{is_remote, load_json, load_json_auto, load_json_str, STDIN_SOURCE};
pub use mask::{apply_json_mask, collapse, descend, includes_field, includes_path, mask_json};
pub use parser::parse_fields;
pub use pruner::{prune_fields, FieldDescriptor, PrunedField};
pub use registry::{
    Loader, OptimizedView, PredicateEntry, PredicateRegistry, PredicateTable, RegistryBuilder,
};
pub use request::{extract_mask, extract_mask_from_pairs, mask_json_from_query};
pub use serializer::{Field, FieldKind, Schema};
pub use types::{
    FieldTree, MaskContext, MaskParams, DEFAULT_EXCLUDES_NAME, DEFAULT_FIELDS_NAME,
    DOTTED_PATH_DELIMITER, MAX_FIELD_DEPTH,
};

#[cfg(feature = "remote")]
pub use loader::load_json_url;
