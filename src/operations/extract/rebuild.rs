//! Bottom-up reconstruction of modified shapes, one kind at a time.
//!
//! Each kind has its own rule for synthesizing replacements from the
//! surviving children; the per-kind passes run in ascending dimension
//! order so that a shape's children are already rebuilt when the shape
//! itself is processed.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::Extractor;
use crate::topology::{Orientation, Shape, ShapeId, ShapeKind, TopologyStore};

impl Extractor {
    /// Rebuilds every modified shape of `kind` under the root.
    pub(super) fn process_kind(&mut self, store: &mut TopologyStore, kind: ShapeKind) {
        let Some(root) = self.shape else { return };

        for shape in store.explore(root, kind) {
            if self.is_removed(shape) || !self.is_modified(shape) {
                continue;
            }
            trace!(?kind, "rebuilding modified shape");

            // Canonical orientation for processing.
            let shape = shape.forward();
            match kind {
                ShapeKind::Edge => self.process_edge(store, shape),
                ShapeKind::Wire => self.process_wire(store, shape),
                ShapeKind::Face | ShapeKind::Solid => self.process_face_or_solid(store, shape),
                ShapeKind::Shell | ShapeKind::CompSolid => {
                    self.process_shell_or_comp_solid(store, shape);
                }
                ShapeKind::Compound => self.process_compound(store, shape),
                ShapeKind::Vertex => {}
            }
        }

        if kind == ShapeKind::Face || kind == ShapeKind::Solid {
            // Clear edges duplicated between faces, or faces between solids.
            self.remove_bounds(store, kind);
        }
    }

    /// An edge survives the loss of internal vertices, but losing an
    /// endpoint vertex makes it vanish (its replacement list stays empty).
    fn process_edge(&mut self, store: &mut TopologyStore, edge: Shape) {
        let mut fence: FxHashSet<ShapeId> = FxHashSet::default();
        let mut kept = Vec::new();

        for &vertex in store.children(edge) {
            if !fence.insert(vertex.id()) {
                continue;
            }
            if self.is_removed(vertex) {
                if matches!(
                    vertex.orientation(),
                    Orientation::Forward | Orientation::Reversed
                ) {
                    // An endpoint is gone: the edge disappears.
                    return;
                }
            } else {
                kept.push(vertex);
            }
        }

        let new_edge = self.make_shape(store, edge, &kept);
        if let Some(list) = self.modified.get_mut(&edge.id()) {
            list.push(new_edge);
        }
    }

    /// Re-walks the wire's edges in connectivity order. Removed edges (and
    /// modified edges without a replacement) split the sequence into runs;
    /// each maximal surviving run becomes one new wire.
    fn process_wire(&mut self, store: &mut TopologyStore, wire: Shape) {
        let edges: Vec<Shape> = store.children(wire).to_vec();
        let mut runs: Vec<Vec<Shape>> = Vec::new();
        let mut run: Vec<Shape> = Vec::new();

        for edge in edges {
            if self.is_removed(edge) {
                if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
            } else if self.is_modified(edge) {
                let replacements = self.get_modified(store, edge, None);
                if let Some(&first) = replacements.first() {
                    run.push(first.oriented_in(edge));
                } else if !run.is_empty() {
                    // The edge was not recreated: it breaks the run too.
                    runs.push(std::mem::take(&mut run));
                }
            } else {
                run.push(edge);
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }

        if !runs.is_empty() {
            let wires = self.make_wires(store, wire, runs);
            self.modified.insert(wire.id(), wires);
        }
    }

    /// Faces and solids share one rule: a new face/solid is created only
    /// when a single coherent outer boundary survives, i.e. the outer
    /// wire/shell is intact or was replaced by exactly one closed fragment
    /// of the same kind. Everything else bubbles up as loose fragments.
    fn process_face_or_solid(&mut self, store: &mut TopologyStore, shape: Shape) {
        let sub_kind = if store.kind(shape) == ShapeKind::Face {
            ShapeKind::Wire
        } else {
            ShapeKind::Shell
        };
        let Some(outer) = store.outer_boundary(shape) else {
            return;
        };

        let mut to_create = false;
        let mut closed_subs: Vec<Shape> = Vec::new();
        let mut new_shapes: Vec<Shape> = Vec::new();

        if self.is_removed(outer) {
            // The outer boundary is gone; no coherent face/solid remains.
        } else if self.is_modified(outer) {
            let fragments = self.get_modified(store, outer, None);

            // Look for exactly one closed fragment of the boundary kind.
            let mut closed_fragment: Option<Shape> = None;
            let mut ambiguous = false;
            for &fragment in &fragments {
                if store.kind(fragment) == sub_kind && store.is_closed(fragment) {
                    if closed_fragment.is_some() {
                        ambiguous = true;
                        break;
                    }
                    closed_fragment = Some(fragment);
                }
            }

            let chosen = if ambiguous { None } else { closed_fragment };
            if let Some(chosen) = chosen {
                to_create = true;
                closed_subs.push(chosen.oriented_in(outer));
            }
            for &fragment in &fragments {
                if chosen.is_none_or(|c| !fragment.is_same(c)) {
                    new_shapes.push(fragment.oriented_in(outer));
                }
            }
        } else {
            to_create = true;
            closed_subs.push(outer);
        }

        // Inner boundaries (holes) are never promoted to "the" outer
        // boundary; closed ones ride along, the rest float up.
        let children: Vec<Shape> = store.children(shape).to_vec();
        for child in children {
            if child.is_same(outer) {
                continue;
            }
            if self.is_modified(child) {
                for fragment in self.get_modified(store, child, None) {
                    let fragment = fragment.oriented_in(child);
                    if to_create
                        && store.kind(fragment) == sub_kind
                        && store.is_closed(fragment)
                    {
                        closed_subs.push(fragment);
                    } else {
                        new_shapes.push(fragment);
                    }
                }
            } else if !self.is_removed(child) {
                if to_create {
                    closed_subs.push(child);
                } else {
                    new_shapes.push(child);
                }
            }
        }

        if to_create {
            let new_shape = self.make_shape(store, shape, &closed_subs);
            new_shapes.insert(0, new_shape);
        }

        if !new_shapes.is_empty() {
            self.modified.insert(shape.id(), new_shapes);
        }
    }

    /// Shells and comp-solids regroup their surviving direct sub-shapes
    /// (faces or solids) into connected components via shared boundaries;
    /// fragments of any other kind pass through untouched.
    fn process_shell_or_comp_solid(&mut self, store: &mut TopologyStore, shape: Shape) {
        let sub_kind = if store.kind(shape) == ShapeKind::Shell {
            ShapeKind::Face
        } else {
            ShapeKind::Solid
        };

        let mut subs: Vec<Shape> = Vec::new();
        let mut others: Vec<Shape> = Vec::new();

        let children: Vec<Shape> = store.children(shape).to_vec();
        for child in children {
            if self.is_modified(child) {
                for fragment in self.get_modified(store, child, None) {
                    let fragment = fragment.oriented_in(child);
                    if store.kind(fragment) == sub_kind {
                        subs.push(fragment);
                    } else {
                        others.push(fragment);
                    }
                }
            } else if !self.is_removed(child) {
                if store.kind(child) == sub_kind {
                    subs.push(child);
                } else {
                    others.push(child);
                }
            }
        }

        let mut new_shapes = self.group_via_bounds(store, shape, &subs);
        new_shapes.extend(others);

        if !new_shapes.is_empty() {
            self.modified.insert(shape.id(), new_shapes);
        }
    }

    /// Compounds flatten: surviving children are collected as-is, and a
    /// single survivor replaces the compound without a redundant wrapper.
    fn process_compound(&mut self, store: &mut TopologyStore, compound: Shape) {
        let mut kept: Vec<Shape> = Vec::new();

        let children: Vec<Shape> = store.children(compound).to_vec();
        for child in children {
            if self.is_modified(child) {
                for fragment in self.get_modified(store, child, None) {
                    kept.push(fragment.oriented_in(child));
                }
            } else if !self.is_removed(child) {
                kept.push(child);
            }
        }

        if kept.is_empty() {
            return;
        }
        let replacement = if kept.len() == 1 {
            kept[0]
        } else {
            self.make_shape(store, compound, &kept)
        };
        if let Some(list) = self.modified.get_mut(&compound.id()) {
            list.push(replacement);
        }
    }

    /// Builds one new wire per run of edges. If the original wire wrapped
    /// around (first and last runs share a vertex), the runs are spliced
    /// first. A new wire is closed iff it has no free endpoints.
    pub(super) fn make_wires(
        &mut self,
        store: &mut TopologyStore,
        wire: Shape,
        mut runs: Vec<Vec<Shape>>,
    ) -> Vec<Shape> {
        if runs.len() > 1 {
            let first_edge = runs[0][0];
            let last_run = &runs[runs.len() - 1];
            let last_edge = last_run[last_run.len() - 1];

            if store.common_vertex(first_edge, last_edge).is_some() {
                // Wrap-around: the last run continues into the first.
                if let Some(last) = runs.pop() {
                    let mut merged = last;
                    merged.append(&mut runs[0]);
                    runs[0] = merged;
                }
            }
        }

        let mut wires = Vec::with_capacity(runs.len());
        for run in &runs {
            let new_wire = self.make_shape(store, wire, run);
            let closed = store.wire_ends(run).is_empty();
            store.set_closed(new_wire, closed);
            wires.push(new_wire);
        }
        wires
    }

    /// Groups `subs` (faces for a shell, solids for a comp-solid) into
    /// connected components, where connectivity means sharing a boundary
    /// sub-shape (edge or face). A boundary element shared by exactly two
    /// members becomes internal and cancels out of the component's bound
    /// set; a component with an empty bound set is closed.
    pub(super) fn group_via_bounds(
        &mut self,
        store: &mut TopologyStore,
        shape: Shape,
        subs: &[Shape],
    ) -> Vec<Shape> {
        let is_shell = store.kind(shape) == ShapeKind::Shell;
        let bound_kind = if is_shell {
            ShapeKind::Edge
        } else {
            ShapeKind::Face
        };

        let mut groups: Vec<Vec<Shape>> = Vec::new();
        let mut bounds: Vec<FxHashSet<ShapeId>> = Vec::new();

        for &sub in subs {
            let sub_bounds = store.explore(sub, bound_kind);

            // Every component this sub-shape touches.
            let mut matched: Vec<usize> = Vec::new();
            for b in &sub_bounds {
                for (i, zone) in bounds.iter().enumerate() {
                    if !matched.contains(&i) && zone.contains(&b.id()) {
                        matched.push(i);
                        break;
                    }
                }
            }

            if matched.is_empty() {
                groups.push(vec![sub]);
                bounds.push(sub_bounds.iter().map(|b| b.id()).collect());
                continue;
            }

            matched.sort_unstable();
            let target = matched[0];

            // Merge every other touched component into the first.
            for &j in matched[1..].iter().rev() {
                let group = groups.remove(j);
                let zone = bounds.remove(j);
                groups[target].extend(group);
                bounds[target].extend(zone);
            }

            // Add the sub-shape; its bounds symmetric-difference in, so
            // boundary elements shared with a neighbor become internal.
            groups[target].push(sub);
            for b in &sub_bounds {
                if !bounds[target].insert(b.id()) {
                    bounds[target].remove(&b.id());
                }
            }
        }

        let mut new_shapes = Vec::new();
        let mut singles = Vec::new();
        for (group, zone) in groups.iter().zip(&bounds) {
            if !is_shell && group.len() == 1 {
                // Avoid a comp-solid wrapping a single solid.
                singles.push(group[0]);
            } else {
                let new_shape = self.make_shape(store, shape, group);
                if zone.is_empty() {
                    store.set_closed(new_shape, true);
                }
                new_shapes.push(new_shape);
            }
        }
        new_shapes.extend(singles);
        new_shapes
    }

    /// After the face (or solid) pass, boundary elements absorbed into a
    /// surviving neighbor must not also float up as loose fragments:
    /// collect the bounds of every kept face/solid, then strip duplicates
    /// from all replacement lists, re-stitching wire/shell fragments whose
    /// own bounds were taken.
    fn remove_bounds(&mut self, store: &mut TopologyStore, kind: ShapeKind) {
        let Some(root) = self.shape else { return };
        let (bound_kind, complex_kind) = if kind == ShapeKind::Face {
            (ShapeKind::Edge, ShapeKind::Wire)
        } else {
            (ShapeKind::Face, ShapeKind::Shell)
        };

        let shapes = store.explore(root, kind);
        let mut bounds: FxHashSet<ShapeId> = FxHashSet::default();

        for &shape in &shapes {
            if self.is_removed(shape) {
                continue;
            }
            if self.is_modified(shape) {
                let replacements = self.get_modified(store, shape, None);
                if let Some(&first) = replacements.first() {
                    if store.kind(first) == kind {
                        store.collect_kind_into(first, bound_kind, &mut bounds);
                    }
                }
            } else {
                store.collect_kind_into(shape, bound_kind, &mut bounds);
            }
        }

        for &shape in &shapes {
            let Some(fragments) = self.modified.get(&shape.id()) else {
                continue;
            };
            let fragments = fragments.clone();
            let mut stripped: Vec<Shape> = Vec::new();
            let mut changed = false;

            for fragment in fragments {
                let fragment_kind = store.kind(fragment);
                if fragment_kind == bound_kind {
                    if bounds.contains(&fragment.id()) {
                        // Absorbed into a neighbor.
                        changed = true;
                    } else {
                        stripped.push(fragment);
                    }
                } else if fragment_kind == complex_kind {
                    let (was_modified, new_bounds) = if kind == ShapeKind::Face {
                        self.remove_common_edges(store, fragment, &bounds)
                    } else {
                        self.remove_common_faces(store, fragment, &bounds)
                    };
                    if was_modified {
                        self.modified.insert(fragment.id(), new_bounds.clone());
                        stripped.extend(new_bounds);
                        changed = true;
                    } else {
                        stripped.push(fragment);
                    }
                } else {
                    stripped.push(fragment);
                }
            }

            if changed {
                self.modified.insert(shape.id(), stripped);
            }
        }
    }

    /// Strips edges of `wire` found in `to_remove` and re-stitches the
    /// remainder into new wires. Zero-width edges (same vertex at both
    /// ends) are dropped without splitting the run. Walks the wire's edge
    /// occurrences, so a seam edge is visited once per orientation.
    fn remove_common_edges(
        &mut self,
        store: &mut TopologyStore,
        wire: Shape,
        to_remove: &FxHashSet<ShapeId>,
    ) -> (bool, Vec<Shape>) {
        let mut runs: Vec<Vec<Shape>> = Vec::new();
        let mut run: Vec<Shape> = Vec::new();
        let mut was_modified = false;

        for &edge in store.children(wire) {
            if to_remove.contains(&edge.id()) {
                let (start, end) = store.edge_vertices(edge);
                let same_ends = start.zip(end).is_some_and(|(a, b)| a.is_same(b));
                if !same_ends && !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
                was_modified = true;
            } else {
                run.push(edge);
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }

        let new_wires = if was_modified && !runs.is_empty() {
            self.make_wires(store, wire, runs)
        } else {
            Vec::new()
        };
        (was_modified, new_wires)
    }

    /// Strips faces of `shell` found in `to_remove` and regroups the
    /// remainder into new shells.
    fn remove_common_faces(
        &mut self,
        store: &mut TopologyStore,
        shell: Shape,
        to_remove: &FxHashSet<ShapeId>,
    ) -> (bool, Vec<Shape>) {
        let faces = store.explore(shell, ShapeKind::Face);
        let kept: Vec<Shape> = faces
            .iter()
            .copied()
            .filter(|f| !to_remove.contains(&f.id()))
            .collect();
        let was_modified = kept.len() != faces.len();

        let new_shells = if was_modified && !kept.is_empty() {
            self.group_via_bounds(store, shell, &kept)
        } else {
            Vec::new()
        };
        (was_modified, new_shells)
    }
}
