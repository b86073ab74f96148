pub type Error = inf::Error;
pub type Result<T = ()> = inf::Result<T>;

mod cell;
pub mod crs;
mod extent;
mod grid;
pub mod nodata;
mod point;
mod size;

#[doc(inline)]
pub use cell::{Cell, CellIterator};
#[doc(inline)]
pub use crs::CrsKind;
#[doc(inline)]
pub use extent::Extent;
#[doc(inline)]
pub use grid::{PoleCoverage, RasterGrid};
#[doc(inline)]
pub use point::Point;
#[doc(inline)]
pub use size::{Columns, RasterSize, Rows};
