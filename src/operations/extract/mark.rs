//! Removal propagation: seed the removed set, close it downward, then
//! mark every surviving ancestor of a seed as modified.

use rustc_hash::FxHashSet;

use super::Extractor;
use crate::topology::{Shape, ShapeId, TopologyStore};

impl Extractor {
    /// Marks the removal seeds and propagates status through the DAG.
    pub(super) fn mark_shapes(&mut self, store: &TopologyStore) {
        let seeds = self.to_remove.clone();

        for &seed in &seeds {
            self.mark_removed(store, seed);
        }
        for &seed in &seeds {
            self.mark_ancestors_modified(seed);
        }
    }

    /// Marks `shape` removed, then walks its children: a child whose
    /// every parent is removed has no surviving use and is removed too.
    fn mark_removed(&mut self, store: &TopologyStore, shape: Shape) {
        let mut stack = vec![shape];

        while let Some(current) = stack.pop() {
            if !self.removed.insert(current.id()) {
                continue;
            }

            let mut fence: FxHashSet<ShapeId> = FxHashSet::default();
            for &child in store.children(current) {
                if fence.insert(child.id()) {
                    let orphaned = self
                        .parents(child)
                        .iter()
                        .all(|parent| self.removed.contains(&parent.id()));
                    if orphaned {
                        stack.push(child);
                    }
                }
            }
        }
    }

    /// Marks every ancestor of `shape` that is not itself removed as
    /// modified (with an empty replacement list until the rebuild pass
    /// fills it). Stops at ancestors already marked.
    fn mark_ancestors_modified(&mut self, shape: Shape) {
        let mut stack = vec![shape];

        while let Some(current) = stack.pop() {
            let parents: Vec<Shape> = self.parents(current).to_vec();
            for parent in parents {
                if !self.is_removed(parent) && !self.is_modified(parent) {
                    self.modified.insert(parent.id(), Vec::new());
                    stack.push(parent);
                }
            }
        }
    }
}
