//! Ancestor index: shape id -> direct parent shapes, for a fixed root.

use rustc_hash::FxHashSet;

use super::Extractor;
use crate::topology::{Shape, ShapeId, ShapeKind, TopologyStore};

impl Extractor {
    /// Builds the ancestor index for `root` in one descent.
    ///
    /// Every shape is expanded exactly once (global fence); repeated
    /// children within one parent, e.g. a vertex shared by two edges of
    /// the same wire, are recorded once per parent (per-level fence).
    pub(super) fn build_ancestors(&mut self, store: &TopologyStore, root: Shape) {
        let mut expanded: FxHashSet<ShapeId> = FxHashSet::default();
        let mut stack = vec![root];

        while let Some(parent) = stack.pop() {
            if !expanded.insert(parent.id()) {
                continue;
            }
            if store.kind(parent) == ShapeKind::Vertex {
                // Vertices are the lowest kind, nothing below them.
                continue;
            }

            let mut fence = FxHashSet::default();
            for &child in store.children(parent) {
                if fence.insert(child.id()) {
                    self.ancestors
                        .entry(child.id())
                        .or_default()
                        .push(parent.forward());
                    stack.push(child);
                }
            }
        }
    }
}
