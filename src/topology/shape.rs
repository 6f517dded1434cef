slotmap::new_key_type! {
    /// Unique identifier for a shape in the topology store.
    ///
    /// Two [`Shape`] handles with the same id denote the same underlying
    /// topological entity regardless of orientation.
    pub struct ShapeId;
}

/// The topological kind of a shape, ordered from lowest dimension to
/// highest. The ordinal order is also the bottom-up rebuild order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKind {
    Vertex,
    Edge,
    Wire,
    Face,
    Shell,
    Solid,
    CompSolid,
    Compound,
}

impl ShapeKind {
    /// All kinds in ascending dimension order.
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Vertex,
        ShapeKind::Edge,
        ShapeKind::Wire,
        ShapeKind::Face,
        ShapeKind::Shell,
        ShapeKind::Solid,
        ShapeKind::CompSolid,
        ShapeKind::Compound,
    ];

    /// Human-readable kind name, used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Vertex => "vertex",
            ShapeKind::Edge => "edge",
            ShapeKind::Wire => "wire",
            ShapeKind::Face => "face",
            ShapeKind::Shell => "shell",
            ShapeKind::Solid => "solid",
            ShapeKind::CompSolid => "comp-solid",
            ShapeKind::Compound => "compound",
        }
    }
}

/// Orientation of a shape occurrence within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Forward,
    Reversed,
    Internal,
    External,
}

impl Orientation {
    /// Reverses the orientation. `Internal` and `External` are unchanged.
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
            other => other,
        }
    }

    /// Composes `self` with the orientation of a containing context.
    ///
    /// `Forward` contexts leave the orientation unchanged, `Reversed`
    /// contexts flip it, and `Internal`/`External` contexts absorb it.
    /// Composition is associative.
    #[must_use]
    pub fn compose(self, context: Orientation) -> Self {
        match context {
            Orientation::Forward => self,
            Orientation::Reversed => self.reverse(),
            absorbing => absorbing,
        }
    }
}

/// A lightweight handle to a shape occurrence: an id into the topology
/// store plus the orientation of this particular occurrence.
///
/// Equality (`==`, `Hash`) is orientation-sensitive. Use [`Shape::is_same`]
/// for structural identity, which ignores orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    id: ShapeId,
    orientation: Orientation,
}

impl Shape {
    /// Creates a forward-oriented handle for the given id.
    #[must_use]
    pub fn new(id: ShapeId) -> Self {
        Self {
            id,
            orientation: Orientation::Forward,
        }
    }

    /// The structural identity of this shape.
    #[must_use]
    pub fn id(self) -> ShapeId {
        self.id
    }

    /// The orientation of this occurrence.
    #[must_use]
    pub fn orientation(self) -> Orientation {
        self.orientation
    }

    /// Returns `true` if both handles denote the same underlying shape,
    /// regardless of orientation.
    #[must_use]
    pub fn is_same(self, other: Shape) -> bool {
        self.id == other.id
    }

    /// Returns this shape with the given orientation.
    #[must_use]
    pub fn with_orientation(self, orientation: Orientation) -> Self {
        Self {
            id: self.id,
            orientation,
        }
    }

    /// Returns this shape forced to `Forward` orientation.
    #[must_use]
    pub fn forward(self) -> Self {
        self.with_orientation(Orientation::Forward)
    }

    /// Returns this shape with reversed orientation.
    #[must_use]
    pub fn reversed(self) -> Self {
        self.with_orientation(self.orientation.reverse())
    }

    /// Returns this shape oriented relative to a containing context:
    /// its own orientation composed with the context's orientation.
    #[must_use]
    pub fn oriented_in(self, context: Shape) -> Self {
        self.with_orientation(self.orientation.compose(context.orientation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Orientation::compose ──

    #[test]
    fn forward_context_is_identity() {
        for o in [
            Orientation::Forward,
            Orientation::Reversed,
            Orientation::Internal,
            Orientation::External,
        ] {
            assert_eq!(o.compose(Orientation::Forward), o);
        }
    }

    #[test]
    fn reversed_context_flips_forward_and_reversed_only() {
        assert_eq!(
            Orientation::Forward.compose(Orientation::Reversed),
            Orientation::Reversed
        );
        assert_eq!(
            Orientation::Reversed.compose(Orientation::Reversed),
            Orientation::Forward
        );
        assert_eq!(
            Orientation::Internal.compose(Orientation::Reversed),
            Orientation::Internal
        );
        assert_eq!(
            Orientation::External.compose(Orientation::Reversed),
            Orientation::External
        );
    }

    #[test]
    fn internal_and_external_contexts_absorb() {
        assert_eq!(
            Orientation::Forward.compose(Orientation::Internal),
            Orientation::Internal
        );
        assert_eq!(
            Orientation::Reversed.compose(Orientation::External),
            Orientation::External
        );
    }

    #[test]
    fn compose_is_associative() {
        let all = [
            Orientation::Forward,
            Orientation::Reversed,
            Orientation::Internal,
            Orientation::External,
        ];
        for a in all {
            for b in all {
                for c in all {
                    assert_eq!(a.compose(b).compose(c), a.compose(b.compose(c)));
                }
            }
        }
    }

    // ── ShapeKind ordering ──

    #[test]
    fn kinds_are_ordered_by_dimension() {
        for pair in ShapeKind::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(ShapeKind::ALL[0], ShapeKind::Vertex);
        assert_eq!(ShapeKind::ALL[7], ShapeKind::Compound);
    }
}
