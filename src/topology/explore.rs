//! Read-only traversal and boundary queries over a [`TopologyStore`].
//!
//! These queries are the collaborator surface the extraction algorithms
//! consume: one-level iteration is [`TopologyStore::children`]; everything
//! deeper lives here.

use rustc_hash::FxHashSet;

use super::{Shape, ShapeId, ShapeKind, TopologyStore};

impl TopologyStore {
    /// Collects every sub-shape occurrence of `kind` within `root`,
    /// including `root` itself when it matches. Preorder, each distinct
    /// shape reported once (fence on structural identity).
    #[must_use]
    pub fn explore(&self, root: Shape, kind: ShapeKind) -> Vec<Shape> {
        let mut found = Vec::new();
        let mut fence = FxHashSet::default();
        let mut stack = vec![root];

        while let Some(shape) = stack.pop() {
            if !fence.insert(shape.id()) {
                continue;
            }
            if self.kind(shape) == kind {
                found.push(shape);
            }
            // Children pushed in reverse to keep preorder.
            for &child in self.children(shape).iter().rev() {
                stack.push(child);
            }
        }
        found
    }

    /// The structural-identity set of all sub-shapes of `root`, the root
    /// included.
    #[must_use]
    pub fn sub_shapes(&self, root: Shape) -> FxHashSet<ShapeId> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![root];

        while let Some(shape) = stack.pop() {
            if seen.insert(shape.id()) {
                stack.extend_from_slice(self.children(shape));
            }
        }
        seen
    }

    /// Accumulates the ids of every sub-shape of `kind` within `root` into
    /// `out`.
    pub fn collect_kind_into(&self, root: Shape, kind: ShapeKind, out: &mut FxHashSet<ShapeId>) {
        for shape in self.explore(root, kind) {
            out.insert(shape.id());
        }
    }

    /// The outer boundary of a face (its outer wire) or a solid (its outer
    /// shell): the first child by convention. `None` for an empty shape.
    #[must_use]
    pub fn outer_boundary(&self, face_or_solid: Shape) -> Option<Shape> {
        self.children(face_or_solid).first().copied()
    }

    /// Returns `true` if `edge` is a seam of `face`: the face references
    /// the edge more than once across its wires, closing a periodic
    /// parametric domain.
    #[must_use]
    pub fn is_seam(&self, edge: Shape, face: Shape) -> bool {
        let mut occurrences = 0;
        for &wire in self.children(face) {
            for &e in self.children(wire) {
                if e.is_same(edge) {
                    occurrences += 1;
                    if occurrences > 1 {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// The endpoint vertices of an edge: the first `Forward` child and the
    /// first `Reversed` child. Internal vertices are not endpoints.
    #[must_use]
    pub fn edge_vertices(&self, edge: Shape) -> (Option<Shape>, Option<Shape>) {
        let mut start = None;
        let mut end = None;
        for &v in self.children(edge) {
            match v.orientation() {
                super::Orientation::Forward if start.is_none() => start = Some(v),
                super::Orientation::Reversed if end.is_none() => end = Some(v),
                _ => {}
            }
        }
        (start, end)
    }

    /// A vertex shared by two edges, if any.
    #[must_use]
    pub fn common_vertex(&self, e1: Shape, e2: Shape) -> Option<Shape> {
        self.children(e1)
            .iter()
            .find(|v1| self.children(e2).iter().any(|v2| v1.is_same(*v2)))
            .copied()
    }

    /// The free endpoint vertices of an edge run: endpoint vertices used an
    /// odd number of times across the run. An empty result means the run
    /// closes on itself.
    #[must_use]
    pub fn wire_ends(&self, edges: &[Shape]) -> Vec<Shape> {
        let mut order: Vec<Shape> = Vec::new();
        let mut counts: Vec<(ShapeId, usize)> = Vec::new();

        for &edge in edges {
            let (start, end) = self.edge_vertices(edge);
            for v in [start, end].into_iter().flatten() {
                if let Some(entry) = counts.iter_mut().find(|(id, _)| *id == v.id()) {
                    entry.1 += 1;
                } else {
                    counts.push((v.id(), 1));
                    order.push(v);
                }
            }
        }

        order
            .into_iter()
            .filter(|v| {
                counts
                    .iter()
                    .any(|(id, n)| *id == v.id() && n % 2 == 1)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn p(x: f64) -> Point3 {
        Point3::new(x, 0.0, 0.0)
    }

    /// Open polyline v0 -e0- v1 -e1- v2 -e2- v3.
    fn polyline(store: &mut TopologyStore) -> (Vec<Shape>, Vec<Shape>) {
        let vs: Vec<Shape> = (0..4).map(|i| store.add_vertex(p(f64::from(i)))).collect();
        let es = vec![
            store.add_edge(vs[0], vs[1]),
            store.add_edge(vs[1], vs[2]),
            store.add_edge(vs[2], vs[3]),
        ];
        (vs, es)
    }

    // ── explore ──

    #[test]
    fn explore_reports_each_shared_shape_once() {
        let mut store = TopologyStore::new();
        let (vs, es) = polyline(&mut store);
        let wire = store.add_wire(es.clone(), false);

        let vertices = store.explore(wire, ShapeKind::Vertex);
        assert_eq!(vertices.len(), vs.len());

        let edges = store.explore(wire, ShapeKind::Edge);
        assert_eq!(edges.len(), 3);
        // Preorder: edges in wire order.
        for (found, original) in edges.iter().zip(&es) {
            assert!(found.is_same(*original));
        }
    }

    #[test]
    fn explore_includes_matching_root() {
        let mut store = TopologyStore::new();
        let (_, es) = polyline(&mut store);
        let wire = store.add_wire(es, false);

        let wires = store.explore(wire, ShapeKind::Wire);
        assert_eq!(wires.len(), 1);
        assert!(wires[0].is_same(wire));
    }

    // ── sub_shapes ──

    #[test]
    fn sub_shapes_contains_root_and_all_levels() {
        let mut store = TopologyStore::new();
        let (vs, es) = polyline(&mut store);
        let wire = store.add_wire(es.clone(), false);

        let all = store.sub_shapes(wire);
        assert!(all.contains(&wire.id()));
        assert!(es.iter().all(|e| all.contains(&e.id())));
        assert!(vs.iter().all(|v| all.contains(&v.id())));
        assert_eq!(all.len(), 1 + 3 + 4);
    }

    // ── seam detection ──

    #[test]
    fn edge_used_twice_by_a_face_is_a_seam() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0));
        let v2 = store.add_vertex(p(1.0));
        let seam = store.add_edge(v1, v2);
        let top = store.add_closed_edge(v1);
        let bottom = store.add_closed_edge(v2);

        // Cylinder-like face: the seam edge appears forward and reversed.
        let wire = store.add_wire(vec![top, seam, bottom, seam.reversed()], true);
        let face = store.add_face(wire, vec![]);

        assert!(store.is_seam(seam, face));
        assert!(!store.is_seam(top, face));
    }

    // ── edge vertices / wire ends ──

    #[test]
    fn wire_ends_of_open_run() {
        let mut store = TopologyStore::new();
        let (vs, es) = polyline(&mut store);

        let ends = store.wire_ends(&es);
        assert_eq!(ends.len(), 2);
        assert!(ends[0].is_same(vs[0]));
        assert!(ends[1].is_same(vs[3]));
    }

    #[test]
    fn wire_ends_of_closed_loop_is_empty() {
        let mut store = TopologyStore::new();
        let (vs, mut es) = polyline(&mut store);
        es.push(store.add_edge(vs[3], vs[0]));

        assert!(store.wire_ends(&es).is_empty());
    }

    #[test]
    fn common_vertex_of_adjacent_edges() {
        let mut store = TopologyStore::new();
        let (vs, es) = polyline(&mut store);

        let shared = store.common_vertex(es[0], es[1]);
        assert!(shared.is_some_and(|v| v.is_same(vs[1])));
        assert!(store.common_vertex(es[0], es[2]).is_none());
    }
}
