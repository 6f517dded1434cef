pub mod explore;
pub mod shape;

pub use shape::{Orientation, Shape, ShapeId, ShapeKind};

use crate::math::Point3;
use slotmap::SlotMap;

/// Record of a single topological entity.
///
/// Children are ordered handles one level down in the containment tree;
/// the order is significant for wires (connectivity order) and for faces
/// and solids (the outer boundary comes first).
#[derive(Debug, Clone)]
pub struct ShapeRecord {
    kind: ShapeKind,
    children: Vec<Shape>,
    closed: bool,
    degenerate: bool,
    point: Option<Point3>,
}

/// Central arena that owns all topological entities.
///
/// Entities reference each other via [`Shape`] handles (generational ids
/// plus an orientation), avoiding self-referential structures and enabling
/// safe mutation. Unlike a store with one arena per kind, a single uniform
/// arena lets the extraction algorithms treat all kinds generically.
#[derive(Debug, Default)]
pub struct TopologyStore {
    records: SlotMap<ShapeId, ShapeRecord>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, record: ShapeRecord) -> Shape {
        Shape::new(self.records.insert(record))
    }

    // --- Constructors ---

    /// Inserts a vertex at the given point.
    pub fn add_vertex(&mut self, point: Point3) -> Shape {
        self.insert(ShapeRecord {
            kind: ShapeKind::Vertex,
            children: Vec::new(),
            closed: false,
            degenerate: false,
            point: Some(point),
        })
    }

    /// Inserts an edge from `start` to `end`. The start vertex is recorded
    /// `Forward`, the end vertex `Reversed`.
    pub fn add_edge(&mut self, start: Shape, end: Shape) -> Shape {
        debug_assert_eq!(self.kind(start), ShapeKind::Vertex);
        debug_assert_eq!(self.kind(end), ShapeKind::Vertex);
        self.insert(ShapeRecord {
            kind: ShapeKind::Edge,
            children: vec![
                start.with_orientation(Orientation::Forward),
                end.with_orientation(Orientation::Reversed),
            ],
            closed: false,
            degenerate: false,
            point: None,
        })
    }

    /// Inserts a closed edge that starts and ends at the same vertex.
    pub fn add_closed_edge(&mut self, vertex: Shape) -> Shape {
        let edge = self.add_edge(vertex, vertex);
        self.records[edge.id()].closed = true;
        edge
    }

    /// Inserts a degenerate (zero-length placeholder) edge at `vertex`.
    pub fn add_degenerate_edge(&mut self, vertex: Shape) -> Shape {
        let edge = self.add_closed_edge(vertex);
        self.records[edge.id()].degenerate = true;
        edge
    }

    /// Appends an internal vertex to an edge.
    pub fn add_internal_vertex(&mut self, edge: Shape, vertex: Shape) {
        debug_assert_eq!(self.kind(edge), ShapeKind::Edge);
        self.records[edge.id()]
            .children
            .push(vertex.with_orientation(Orientation::Internal));
    }

    /// Inserts a wire from an ordered run of oriented edges.
    pub fn add_wire(&mut self, edges: Vec<Shape>, closed: bool) -> Shape {
        self.insert(ShapeRecord {
            kind: ShapeKind::Wire,
            children: edges,
            closed,
            degenerate: false,
            point: None,
        })
    }

    /// Inserts a face bounded by an outer wire and inner (hole) wires.
    /// The outer wire is the first child.
    pub fn add_face(&mut self, outer: Shape, inner: Vec<Shape>) -> Shape {
        let mut children = Vec::with_capacity(inner.len() + 1);
        children.push(outer);
        children.extend(inner);
        self.insert(ShapeRecord {
            kind: ShapeKind::Face,
            children,
            closed: false,
            degenerate: false,
            point: None,
        })
    }

    /// Inserts a shell from a set of oriented faces.
    pub fn add_shell(&mut self, faces: Vec<Shape>, closed: bool) -> Shape {
        self.insert(ShapeRecord {
            kind: ShapeKind::Shell,
            children: faces,
            closed,
            degenerate: false,
            point: None,
        })
    }

    /// Inserts a solid bounded by an outer shell and inner (void) shells.
    /// The outer shell is the first child.
    pub fn add_solid(&mut self, outer: Shape, inner: Vec<Shape>) -> Shape {
        let mut children = Vec::with_capacity(inner.len() + 1);
        children.push(outer);
        children.extend(inner);
        self.insert(ShapeRecord {
            kind: ShapeKind::Solid,
            children,
            closed: false,
            degenerate: false,
            point: None,
        })
    }

    /// Inserts a comp-solid from a set of solids sharing faces.
    pub fn add_comp_solid(&mut self, solids: Vec<Shape>) -> Shape {
        self.insert(ShapeRecord {
            kind: ShapeKind::CompSolid,
            children: solids,
            closed: false,
            degenerate: false,
            point: None,
        })
    }

    /// Inserts a compound aggregating arbitrary shapes.
    pub fn add_compound(&mut self, children: Vec<Shape>) -> Shape {
        self.insert(ShapeRecord {
            kind: ShapeKind::Compound,
            children,
            closed: false,
            degenerate: false,
            point: None,
        })
    }

    // --- Accessors ---

    /// The kind of a shape.
    ///
    /// # Panics
    ///
    /// Panics if the shape is not in this store.
    #[must_use]
    pub fn kind(&self, shape: Shape) -> ShapeKind {
        self.records[shape.id()].kind
    }

    /// The ordered direct children of a shape.
    ///
    /// # Panics
    ///
    /// Panics if the shape is not in this store.
    #[must_use]
    pub fn children(&self, shape: Shape) -> &[Shape] {
        &self.records[shape.id()].children
    }

    /// Whether a shape carries the closed flag.
    #[must_use]
    pub fn is_closed(&self, shape: Shape) -> bool {
        self.records[shape.id()].closed
    }

    /// Sets the closed flag of a shape.
    pub fn set_closed(&mut self, shape: Shape, closed: bool) {
        self.records[shape.id()].closed = closed;
    }

    /// Whether an edge is degenerate (a zero-length placeholder).
    #[must_use]
    pub fn is_degenerate(&self, shape: Shape) -> bool {
        self.records[shape.id()].degenerate
    }

    /// The position of a vertex, if the shape is a vertex.
    #[must_use]
    pub fn point(&self, shape: Shape) -> Option<Point3> {
        self.records[shape.id()].point
    }

    /// Number of shapes in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // --- Incremental builder ---

    /// Creates a new shape of the same kind as `shape`, with the same
    /// flags but no children. The counterpart of adding children with
    /// [`TopologyStore::add`].
    pub fn empty_copied(&mut self, shape: Shape) -> Shape {
        let record = &self.records[shape.id()];
        let copy = ShapeRecord {
            kind: record.kind,
            children: Vec::new(),
            closed: false,
            degenerate: record.degenerate,
            point: record.point,
        };
        self.insert(copy)
    }

    /// Appends `child` to the children of `parent`, keeping the child's
    /// orientation as given.
    pub fn add(&mut self, parent: Shape, child: Shape) {
        self.records[parent.id()].children.push(child);
    }
}
