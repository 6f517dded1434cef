//! Result assembly and provenance history.
//!
//! After the rebuild passes, the root's replacement is a single fragment,
//! a compound of fragments, or nothing at all; and every original
//! sub-shape touched by the run is classified as removed, modified or
//! superseded by brand-new shapes.

use rustc_hash::FxHashSet;

use super::Extractor;
use crate::topology::{Shape, ShapeId, TopologyStore};

impl Extractor {
    /// Assembles the replacement for `shape` (the root): the shape itself
    /// if untouched, its sole fragment, or a compound of all fragments.
    /// `None` when nothing survives.
    pub(super) fn make_result(
        &mut self,
        store: &mut TopologyStore,
        shape: Shape,
    ) -> Option<Shape> {
        if self.is_removed(shape) {
            return None;
        }
        if !self.is_modified(shape) {
            return Some(shape);
        }

        let fragments = self.get_modified(store, shape, None);
        match fragments.as_slice() {
            [] => None,
            [single] => Some(single.oriented_in(shape)),
            _ => {
                let mut fence: FxHashSet<ShapeId> = FxHashSet::default();
                let mut children = Vec::with_capacity(fragments.len());
                for fragment in fragments {
                    let fragment = fragment.oriented_in(shape);
                    if fence.insert(fragment.id()) {
                        children.push(fragment);
                    }
                }
                Some(store.add_compound(children))
            }
        }
    }

    /// Classifies every touched original sub-shape, walking down from the
    /// root. Untouched shapes are kept as-is and not descended into.
    ///
    /// A modified shape counts as Modified only if it has a replacement of
    /// its own kind; the first such replacement is the successor, any
    /// further fragments are New. A modified shape with no same-kind
    /// replacement is Removed.
    pub(super) fn make_history(&mut self, store: &TopologyStore, root: Shape) {
        let mut fence: FxHashSet<ShapeId> = FxHashSet::default();
        let mut stack = vec![root];

        while let Some(shape) = stack.pop() {
            if !fence.insert(shape.id()) {
                continue;
            }

            let kept = if self.is_removed(shape) {
                self.removed_shapes.push(shape);
                false
            } else if self.is_modified(shape) {
                let replacements = self.get_modified(store, shape, Some(store.kind(shape)));
                if replacements.is_empty() {
                    self.removed_shapes.push(shape);
                } else {
                    self.new_shapes
                        .extend(replacements.iter().skip(1).copied());
                    self.modified_shapes.push(shape);
                }
                false
            } else {
                true
            };

            if !kept {
                // Children pushed in reverse to keep preorder.
                for &child in store.children(shape).iter().rev() {
                    stack.push(child);
                }
            }
        }
    }
}
