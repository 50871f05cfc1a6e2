//! Mask-aware data loading.
//!
//! A view declares which loader fetches the data behind each dotted field
//! path. At request time only the loaders whose paths the mask wants are
//! applied to the collection handle, so the number of eager fetches follows
//! the requested fields rather than the full schema.
//!
//! ```
//! use fieldmask::{parse_fields, MaskContext, PredicateRegistry};
//!
//! let registry = PredicateRegistry::<Vec<&'static str>>::builder()
//!     .predicate(&["author"], |mut q| { q.push("author"); q })
//!     .predicate(&["comments"], |mut q| { q.push("comments"); q })
//!     .build();
//!
//! let ctx = MaskContext::including(parse_fields("title,author"));
//! assert_eq!(registry.apply(Vec::new(), &ctx), vec!["author"]);
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::mask::includes_path;
use crate::types::MaskContext;

/// Transforms a collection handle into one that also fetches related data.
pub type Loader<C> = Arc<dyn Fn(C) -> C + Send + Sync>;

/// One dotted path and the loader it gates.
pub struct PredicateEntry<C> {
    path: String,
    loader: Loader<C>,
}

impl<C> PredicateEntry<C> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run the loader on `collection`.
    pub fn invoke(&self, collection: C) -> C {
        (self.loader)(collection)
    }
}

impl<C> Clone for PredicateEntry<C> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<C> fmt::Debug for PredicateEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateEntry")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Immutable path → loader table for one view type.
pub struct PredicateRegistry<C> {
    entries: Vec<PredicateEntry<C>>,
}

impl<C> PredicateRegistry<C> {
    pub fn builder() -> RegistryBuilder<C> {
        RegistryBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[PredicateEntry<C>] {
        &self.entries
    }

    /// Registered paths in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path())
    }

    /// Entries whose loaders should run under `ctx`, in registration order.
    ///
    /// An unmasked context selects every entry.
    pub fn selected(&self, ctx: &MaskContext) -> Vec<&PredicateEntry<C>> {
        match ctx.mask() {
            None => self.entries.iter().collect(),
            Some((tree, is_negated)) => self
                .entries
                .iter()
                .filter(|entry| includes_path(&entry.path, tree, is_negated))
                .collect(),
        }
    }

    /// Thread `collection` through every selected loader, left to right.
    ///
    /// Loaders that are not selected are never called.
    pub fn apply(&self, collection: C, ctx: &MaskContext) -> C {
        let selected = self.selected(ctx);
        debug!(
            selected = selected.len(),
            registered = self.entries.len(),
            "applying data predicates"
        );

        selected.into_iter().fold(collection, |acc, entry| {
            debug!(path = entry.path(), "running loader");
            entry.invoke(acc)
        })
    }
}

impl<C> fmt::Debug for PredicateRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.paths()).finish()
    }
}

/// Explicit registration list for a [`PredicateRegistry`].
pub struct RegistryBuilder<C> {
    entries: Vec<PredicateEntry<C>>,
}

impl<C> Default for RegistryBuilder<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> RegistryBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `loader` under each of `paths`.
    ///
    /// Every path gets its own entry, so the loader runs once per selected
    /// path. Re-registering a path replaces its loader and keeps the entry's
    /// original position.
    pub fn predicate<F>(mut self, paths: &[&str], loader: F) -> Self
    where
        F: Fn(C) -> C + Send + Sync + 'static,
    {
        let loader: Loader<C> = Arc::new(loader);
        for path in paths {
            self.insert(path, Arc::clone(&loader));
        }
        self
    }

    fn insert(&mut self, path: &str, loader: Loader<C>) {
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(existing) => existing.loader = loader,
            None => self.entries.push(PredicateEntry {
                path: path.to_string(),
                loader,
            }),
        }
    }

    pub fn build(self) -> PredicateRegistry<C> {
        PredicateRegistry {
            entries: self.entries,
        }
    }
}

/// Lazily built, process-wide registry slot for one view type.
///
/// Meant to live in a `static`; the first caller of
/// [`get_or_init`](Self::get_or_init) builds the table and concurrent first
/// callers wait for that single build.
pub struct PredicateTable<C> {
    cell: OnceLock<PredicateRegistry<C>>,
}

impl<C> PredicateTable<C> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_init<F>(&self, build: F) -> &PredicateRegistry<C>
    where
        F: FnOnce() -> PredicateRegistry<C>,
    {
        self.cell.get_or_init(|| {
            let registry = build();
            debug!(paths = ?registry, "built predicate registry");
            registry
        })
    }

    /// The table, if it has been built.
    pub fn get(&self) -> Option<&PredicateRegistry<C>> {
        self.cell.get()
    }
}

impl<C> Default for PredicateTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A data view whose collection is augmented according to the request mask.
///
/// ```
/// use fieldmask::{MaskContext, OptimizedView, PredicateRegistry, PredicateTable};
///
/// struct TicketView;
///
/// impl OptimizedView for TicketView {
///     type Collection = Vec<&'static str>;
///
///     fn predicates() -> &'static PredicateRegistry<Self::Collection> {
///         static TABLE: PredicateTable<Vec<&'static str>> = PredicateTable::new();
///         TABLE.get_or_init(|| {
///             PredicateRegistry::builder()
///                 .predicate(&["author"], |mut q: Vec<&'static str>| {
///                     q.push("author");
///                     q
///                 })
///                 .build()
///         })
///     }
/// }
///
/// let loaded = TicketView::optimize(Vec::new(), &MaskContext::unmasked());
/// assert_eq!(loaded, vec!["author"]);
/// ```
pub trait OptimizedView {
    type Collection: 'static;

    /// The view's registry, built once on first use.
    fn predicates() -> &'static PredicateRegistry<Self::Collection>;

    /// Apply the loaders wanted under `ctx` to `collection`.
    fn optimize(collection: Self::Collection, ctx: &MaskContext) -> Self::Collection {
        Self::predicates().apply(collection, ctx)
    }
}
