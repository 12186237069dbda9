pub mod curvature;
pub mod edge;
pub mod sequence;

pub use curvature::Curvature;
pub use edge::Edge;
pub use sequence::EdgeSequence;
