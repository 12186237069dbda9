mod curve_from_extreme;
mod dart_shape;
mod from_fractions;
mod side_with_cut;
mod simple_loop;

pub use curve_from_extreme::CurveFromExtreme;
pub use dart_shape::DartShape;
pub use from_fractions::FromFractions;
pub use side_with_cut::SideWithCut;
pub use simple_loop::SimpleLoop;
