use thiserror::Error;

/// Validation failures of the sub-shape extraction algorithm.
///
/// All of these are detected before any derived state is mutated, so a
/// failed [`Extractor::perform`](crate::Extractor::perform) leaves no
/// partial result behind.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// No root shape has been installed via `set_shape`.
    #[error("no root shape is set")]
    NullRoot,

    /// A shape in the removal list is not a sub-shape of the root.
    #[error("shape to remove is not a sub-shape of the root")]
    NotASubShape,

    /// The removal list contains the root shape itself.
    #[error("cannot remove the root shape itself")]
    CannotRemoveRoot,

    /// The removal list contains a seam edge of an ancestor face.
    #[error("cannot remove a seam edge of a face")]
    SeamEdgeRemoval,

    /// The removal list contains a degenerate edge owned by a face.
    #[error("cannot remove a degenerate edge of a face")]
    DegenerateEdgeRemoval,
}

/// Non-fatal conditions reported by the extraction algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractWarning {
    /// The removal list is empty; the result is the unchanged input.
    EmptyRemovalSet,
}
