//! Shape synthesis with structural deduplication.
//!
//! Two rebuilt shapes that need the exact same sub-shape set must come out
//! as one shared handle, not two copies. The cache is the new-shape
//! ancestor map: for every child added to a freshly built shape, remember
//! the built shape; a later request with the same children intersects
//! those lists to find the earlier result.

use rustc_hash::FxHashSet;

use super::Extractor;
use crate::topology::{Orientation, Shape, ShapeId, TopologyStore};

impl Extractor {
    /// Returns a shape of `original`'s kind containing exactly `children`,
    /// reusing a shape already built this run when one matches, otherwise
    /// building a new one from an empty copy of `original`.
    pub(super) fn make_shape(
        &mut self,
        store: &mut TopologyStore,
        original: Shape,
        children: &[Shape],
    ) -> Shape {
        if let Some(existing) = self.find_built_shape(store, original, children) {
            return existing;
        }

        let result = store.empty_copied(original);
        let mut fence: FxHashSet<ShapeId> = FxHashSet::default();
        for &child in children {
            if fence.insert(child.id()) {
                store.add(result, child);
                self.new_ancestors.entry(child.id()).or_default().push(result);
            }
        }
        result
    }

    /// Looks up a shape already synthesized this run whose children are
    /// exactly `children` (structurally) and whose kind matches
    /// `original`. The returned handle carries the orientation of the
    /// first candidate child composed with its orientation inside the
    /// found shape.
    fn find_built_shape(
        &self,
        store: &TopologyStore,
        original: Shape,
        children: &[Shape],
    ) -> Option<Shape> {
        let first = *children.first()?;
        let child_ids: FxHashSet<ShapeId> = children.iter().map(|c| c.id()).collect();

        // Intersect the new-parent lists of all distinct children.
        let mut candidates: Option<Vec<Shape>> = None;
        let mut seen: FxHashSet<ShapeId> = FxHashSet::default();
        for &child in children {
            if !seen.insert(child.id()) {
                continue;
            }
            let parents = self.new_ancestors.get(&child.id())?;
            candidates = Some(match candidates {
                None => parents.clone(),
                Some(previous) => previous
                    .into_iter()
                    .filter(|c| parents.iter().any(|p| p.is_same(*c)))
                    .collect(),
            });
            if candidates.as_ref().is_some_and(Vec::is_empty) {
                return None;
            }
        }

        let kind = store.kind(original);
        for candidate in candidates? {
            if store.kind(candidate) != kind {
                continue;
            }

            let mut orientation = Orientation::Forward;
            let mut found_first = false;
            let mut children_match = true;
            for &child in store.children(candidate) {
                if !child_ids.contains(&child.id()) {
                    // The candidate holds sub-shapes we were not given.
                    children_match = false;
                    break;
                }
                if !found_first && child.is_same(first) {
                    found_first = true;
                    orientation = first.orientation().compose(child.orientation());
                }
            }

            if children_match {
                return Some(candidate.with_orientation(orientation));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::topology::ShapeKind;

    fn p(x: f64) -> Point3 {
        Point3::new(x, 0.0, 0.0)
    }

    #[test]
    fn identical_child_sets_share_one_built_shape() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0));
        let v2 = store.add_vertex(p(1.0));
        let v3 = store.add_vertex(p(2.0));
        let e1 = store.add_edge(v1, v2);
        let e2 = store.add_edge(v2, v3);
        let w1 = store.add_wire(vec![e1, e2], false);
        let w2 = store.add_wire(vec![e1, e2], false);

        let mut extractor = Extractor::new();
        let built1 = extractor.make_shape(&mut store, w1, &[e1, e2]);
        let built2 = extractor.make_shape(&mut store, w2, &[e1, e2]);

        assert!(built1.is_same(built2));
        assert_eq!(store.kind(built1), ShapeKind::Wire);
        assert_eq!(store.children(built1).len(), 2);
    }

    #[test]
    fn different_child_sets_build_distinct_shapes() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0));
        let v2 = store.add_vertex(p(1.0));
        let v3 = store.add_vertex(p(2.0));
        let e1 = store.add_edge(v1, v2);
        let e2 = store.add_edge(v2, v3);
        let w = store.add_wire(vec![e1, e2], false);

        let mut extractor = Extractor::new();
        let built1 = extractor.make_shape(&mut store, w, &[e1, e2]);
        let built2 = extractor.make_shape(&mut store, w, &[e1]);

        assert!(!built1.is_same(built2));
        assert_eq!(store.children(built2).len(), 1);
    }

    #[test]
    fn kind_must_match_for_a_cache_hit() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0));
        let v2 = store.add_vertex(p(1.0));
        let e = store.add_edge(v1, v2);
        let w = store.add_wire(vec![e], false);
        let compound = store.add_compound(vec![e]);

        let mut extractor = Extractor::new();
        let built_wire = extractor.make_shape(&mut store, w, &[e]);
        let built_compound = extractor.make_shape(&mut store, compound, &[e]);

        assert!(!built_wire.is_same(built_compound));
        assert_eq!(store.kind(built_compound), ShapeKind::Compound);
    }

    #[test]
    fn cache_hit_composes_orientation_of_first_child() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0));
        let v2 = store.add_vertex(p(1.0));
        let e = store.add_edge(v1, v2);
        let w = store.add_wire(vec![e], false);

        let mut extractor = Extractor::new();
        let built = extractor.make_shape(&mut store, w, &[e]);
        assert_eq!(built.orientation(), Orientation::Forward);

        // Asking again with the edge reversed: same shape, orientation
        // composed from the reversed request and the stored occurrence.
        let again = extractor.make_shape(&mut store, w, &[e.reversed()]);
        assert!(again.is_same(built));
        assert_eq!(again.orientation(), Orientation::Reversed);
    }
}
