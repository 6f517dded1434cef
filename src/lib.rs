pub mod error;
pub mod math;
pub mod operations;
pub mod topology;

pub use operations::extract::{ExtractError, ExtractWarning, Extractor};
pub use topology::{Orientation, Shape, ShapeId, ShapeKind, TopologyStore};
