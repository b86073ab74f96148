//! Two-direction min-plus relaxation sweeps over 8-connected raster grids.
//!
//! [`euclidean`] implements `gridDistance` and [`costdistance`] implements `costDistance`.
//! They share the block/carry machinery described here conceptually but are kept as
//! separate, specialized passes rather than one generic one — the friction-weighted
//! edge costs in `costDistance` make a shared abstraction more confusing than two
//! similarly-shaped functions.
pub mod costdistance;
pub mod euclidean;

use crate::io::InMemoryRaster;

/// Copies one row-band out of a full-grid buffer, for round-tripping between passes.
pub(crate) fn extract_block(raster: &InMemoryRaster, row_start: i32, nrows: i32) -> Vec<f64> {
    let ncol = raster.ncol as usize;
    let start = row_start as usize * ncol;
    let end = start + nrows as usize * ncol;
    raster.data[start..end].to_vec()
}
