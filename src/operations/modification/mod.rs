mod cut_into_edge;

pub use cut_into_edge::{CutIntoEdge, CutResult};
