pub use self::{coord::*, matrix::*, piece::*, shape::*};

pub(crate) mod coord;
pub(crate) mod matrix;
pub(crate) mod piece;
pub(crate) mod shape;
