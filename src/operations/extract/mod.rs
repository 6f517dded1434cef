//! Sub-shape extraction: removes a set of sub-shapes from a root shape and
//! rebuilds the minimal valid replacement topology bottom-up.
//!
//! The algorithm runs in phases inside [`Extractor::perform`]:
//!
//! 1. validate inputs (all failures reported before any derived state is
//!    touched, so a failed run is side-effect free),
//! 2. build the ancestor index (cached per root),
//! 3. propagate removal downward and mark ancestors modified,
//! 4. rebuild modified shapes kind-by-kind from edges up to compounds,
//!    deduplicating structurally identical new shapes,
//! 5. assemble the final result and classify every touched original
//!    sub-shape as removed, modified or new.

mod ancestors;
mod dedup;
mod history;
mod mark;
mod rebuild;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

pub use crate::error::{ExtractError, ExtractWarning};
use crate::topology::{Shape, ShapeId, ShapeKind, TopologyStore};

/// Removes a set of sub-shapes from a root shape.
///
/// The extractor owns all intermediate state of one extraction run. It is
/// not safe for concurrent use; independent extractions need independent
/// instances (the store's shapes may be shared between them read-only).
///
/// ```
/// use karst::{Extractor, TopologyStore};
/// use nalgebra::Point3;
///
/// let mut store = TopologyStore::new();
/// let v: Vec<_> = (0..4)
///     .map(|i| store.add_vertex(Point3::new(f64::from(i % 2), f64::from(i / 2), 0.0)))
///     .collect();
/// let edges = vec![
///     store.add_edge(v[0], v[1]),
///     store.add_edge(v[1], v[3]),
///     store.add_edge(v[3], v[2]),
///     store.add_edge(v[2], v[0]),
/// ];
/// let square = store.add_wire(edges.clone(), true);
///
/// let mut extractor = Extractor::new();
/// extractor.set_shape(square);
/// extractor.set_shapes_to_remove(vec![edges[1]]);
/// extractor.perform(&mut store)?;
///
/// let open_wire = extractor.result().expect("one wire survives");
/// assert_eq!(store.children(open_wire).len(), 3);
/// # Ok::<(), karst::ExtractError>(())
/// ```
#[derive(Debug, Default)]
pub struct Extractor {
    shape: Option<Shape>,
    to_remove: Vec<Shape>,
    /// Shape id -> direct parents, built once per root.
    ancestors: FxHashMap<ShapeId, Vec<Shape>>,
    /// Shapes that disappear entirely from the result.
    removed: FxHashSet<ShapeId>,
    /// Shape id -> replacement fragments (empty = effectively removed).
    modified: FxHashMap<ShapeId, Vec<Shape>>,
    /// Freshly built sub-shape id -> new parents built from it this run.
    new_ancestors: FxHashMap<ShapeId, Vec<Shape>>,
    result: Option<Shape>,
    removed_shapes: Vec<Shape>,
    modified_shapes: Vec<Shape>,
    new_shapes: Vec<Shape>,
    warning: Option<ExtractWarning>,
}

impl Extractor {
    /// Creates an extractor with no root shape installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the root shape. Clears the ancestor index and all derived
    /// state.
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = Some(shape);
        self.ancestors.clear();
        self.clear_derived();
    }

    /// Installs the list of sub-shapes to remove. Duplicates are tolerated
    /// (first occurrence wins during validation). The ancestor index is
    /// retained if already built for the current root.
    pub fn set_shapes_to_remove(&mut self, shapes: Vec<Shape>) {
        self.to_remove = shapes;
        self.clear_derived();
    }

    /// The installed root shape.
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    /// The installed removal list.
    #[must_use]
    pub fn shapes_to_remove(&self) -> &[Shape] {
        &self.to_remove
    }

    /// The replacement for the root, `None` if nothing survives or
    /// [`Extractor::perform`] has not succeeded.
    #[must_use]
    pub fn result(&self) -> Option<Shape> {
        self.result
    }

    /// Original sub-shapes that disappeared entirely.
    #[must_use]
    pub fn removed(&self) -> &[Shape] {
        &self.removed_shapes
    }

    /// Original sub-shapes replaced by rebuilt counterparts.
    #[must_use]
    pub fn modified(&self) -> &[Shape] {
        &self.modified_shapes
    }

    /// Shapes synthesized during the run beyond the primary replacements.
    #[must_use]
    pub fn new_shapes(&self) -> &[Shape] {
        &self.new_shapes
    }

    /// The warning raised by the last run, if any.
    #[must_use]
    pub fn warning(&self) -> Option<ExtractWarning> {
        self.warning
    }

    /// Runs the extraction.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractError`] when validation fails; in that case no
    /// derived state is produced. An empty removal list is not an error:
    /// the result equals the input and [`Extractor::warning`] reports
    /// [`ExtractWarning::EmptyRemovalSet`].
    pub fn perform(&mut self, store: &mut TopologyStore) -> Result<(), ExtractError> {
        self.clear_derived();

        let root = self.shape.ok_or(ExtractError::NullRoot)?;

        if self.to_remove.is_empty() {
            // Nothing to remove: the result is the unchanged input.
            self.warning = Some(ExtractWarning::EmptyRemovalSet);
            self.result = Some(root);
            return Ok(());
        }

        self.check_data(store, root)?;

        self.mark_shapes(store);
        debug!(
            removed = self.removed.len(),
            modified = self.modified.len(),
            "marked sub-shapes for rebuild"
        );

        for kind in ShapeKind::ALL {
            if kind == ShapeKind::Vertex {
                continue;
            }
            self.process_kind(store, kind);
        }

        self.result = self.make_result(store, root);
        self.make_history(store, root);
        debug!(
            removed = self.removed_shapes.len(),
            modified = self.modified_shapes.len(),
            new = self.new_shapes.len(),
            "extraction finished"
        );
        Ok(())
    }

    /// Clears everything recomputed by a run. The root shape, the removal
    /// list and the ancestor index survive.
    fn clear_derived(&mut self) {
        self.removed.clear();
        self.modified.clear();
        self.new_ancestors.clear();
        self.result = None;
        self.removed_shapes.clear();
        self.modified_shapes.clear();
        self.new_shapes.clear();
        self.warning = None;
    }

    /// Validates the removal list against the root and builds the ancestor
    /// index if necessary. Duplicates in the list are dropped, first
    /// occurrence wins.
    fn check_data(&mut self, store: &TopologyStore, root: Shape) -> Result<(), ExtractError> {
        let indices = store.sub_shapes(root);
        let mut fence = FxHashSet::default();
        let mut deduped = Vec::with_capacity(self.to_remove.len());

        for &sub in &self.to_remove {
            if !fence.insert(sub.id()) {
                continue;
            }
            if !indices.contains(&sub.id()) {
                return Err(ExtractError::NotASubShape);
            }
            if sub.is_same(root) {
                return Err(ExtractError::CannotRemoveRoot);
            }
            deduped.push(sub);
        }
        self.to_remove = deduped;

        if self.ancestors.is_empty() {
            self.build_ancestors(store, root);
        }

        // Seam and degenerate edges close parametric domains of their
        // faces; removing them in isolation is topologically invalid.
        for &sub in &self.to_remove {
            if store.kind(sub) != ShapeKind::Edge {
                continue;
            }
            let mut has_faces = false;
            for &wire in self.parents(sub) {
                if store.kind(wire) != ShapeKind::Wire {
                    continue;
                }
                for &face in self.parents(wire) {
                    if store.kind(face) == ShapeKind::Face {
                        if store.is_seam(sub, face) {
                            return Err(ExtractError::SeamEdgeRemoval);
                        }
                        has_faces = true;
                    }
                }
            }
            if has_faces && store.is_degenerate(sub) {
                return Err(ExtractError::DegenerateEdgeRemoval);
            }
        }
        Ok(())
    }

    /// The direct parents of a shape per the ancestor index.
    fn parents(&self, shape: Shape) -> &[Shape] {
        self.ancestors
            .get(&shape.id())
            .map_or(&[], Vec::as_slice)
    }

    /// Whether a shape is marked as removed.
    fn is_removed(&self, shape: Shape) -> bool {
        self.removed.contains(&shape.id())
    }

    /// Whether a shape is a key of the modified map.
    fn is_modified(&self, shape: Shape) -> bool {
        self.modified.contains_key(&shape.id())
    }

    /// Resolves the replacement fragments of a modified shape, chasing
    /// fragments that were themselves re-bound later in the run. When
    /// `kind` is given, it filters the top level only: the chase below a
    /// matching fragment is unfiltered.
    fn get_modified(
        &self,
        store: &TopologyStore,
        shape: Shape,
        kind: Option<ShapeKind>,
    ) -> Vec<Shape> {
        let mut out = Vec::new();
        if let Some(fragments) = self.modified.get(&shape.id()) {
            for &fragment in fragments {
                if kind.is_none_or(|k| store.kind(fragment) == k) {
                    if self.is_modified(fragment) {
                        self.collect_modified(store, fragment, &mut out);
                    } else {
                        out.push(fragment);
                    }
                }
            }
        }
        out
    }

    fn collect_modified(&self, store: &TopologyStore, shape: Shape, out: &mut Vec<Shape>) {
        if let Some(fragments) = self.modified.get(&shape.id()) {
            for &fragment in fragments {
                if self.is_modified(fragment) {
                    self.collect_modified(store, fragment, out);
                } else {
                    out.push(fragment);
                }
            }
        }
    }
}
