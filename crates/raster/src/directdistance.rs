//! Direct distance and direction from every cell to the nearest vector feature (§4.6).
//!
//! Unlike the sweep operators this is not a min-plus relaxation: it is a per-cell,
//! per-point exact measurement, one geodesic or planar evaluation per candidate point.
//! Polygon features are expected to have already been reduced to their boundary cells
//! by the edge extractor and fed in as a `PointSet`.
use crate::blockplan::BlockPlan;
use crate::io::{RasterReader, RasterWriter};
use crate::output::OperatorOutput;
use crate::vectorsource::PointSet;
use crate::Result;
use geo::RasterGrid;

/// Whether the azimuth is measured from the raster cell to the nearest point, or from the
/// nearest point back to the raster cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AzimuthReference {
    FromCell,
    ToCell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Degrees,
    Radians,
}

/// For every cell not itself a feature, the planar or geodesic distance to the nearest
/// point in `points`. Feature cells (already `NaN` in the caller's feature mask) are left
/// `NaN`, mirroring "feature cells contribute 0/undefined and are excluded up front".
pub fn direct_distance(
    feature_mask_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
    points: &PointSet,
) -> Result<OperatorOutput<()>> {
    let ncol = grid.ncol();
    let is_geographic = grid.is_lonlat();

    for block in plan.blocks() {
        let mask = feature_mask_reader.read_block(block.row_start, block.nrows, 0, ncol)?;
        let mut out = vec![f64::NAN; mask.len()];

        for local_row in 0..block.nrows {
            let abs_row = block.row_start + local_row;
            let y = grid.y_from_row(abs_row);
            for col in 0..ncol {
                let idx = (local_row as usize) * ncol as usize + col as usize;
                if geo::nodata::is_missing(mask[idx]) {
                    continue; // this cell IS a feature; distance stays NaN (treated as 0 by callers)
                }
                let x = grid.x_from_col(col);
                out[idx] = nearest_distance(x, y, points, is_geographic);
            }
        }

        writer.write_block(block.row_start, block.nrows, &out)?;
    }

    Ok(OperatorOutput::new(()))
}

/// For every cell not itself a feature, the azimuth (in `unit`) to (or from, per `reference`)
/// the nearest point in `points`.
pub fn direct_direction(
    feature_mask_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
    points: &PointSet,
    reference: AzimuthReference,
    unit: AngleUnit,
) -> Result<OperatorOutput<()>> {
    let ncol = grid.ncol();
    let is_geographic = grid.is_lonlat();

    for block in plan.blocks() {
        let mask = feature_mask_reader.read_block(block.row_start, block.nrows, 0, ncol)?;
        let mut out = vec![f64::NAN; mask.len()];

        for local_row in 0..block.nrows {
            let abs_row = block.row_start + local_row;
            let y = grid.y_from_row(abs_row);
            for col in 0..ncol {
                let idx = (local_row as usize) * ncol as usize + col as usize;
                if geo::nodata::is_missing(mask[idx]) {
                    continue;
                }
                let x = grid.x_from_col(col);
                out[idx] = nearest_azimuth(x, y, points, is_geographic, reference, unit);
            }
        }

        writer.write_block(block.row_start, block.nrows, &out)?;
    }

    Ok(OperatorOutput::new(()))
}

fn nearest_distance(x: f64, y: f64, points: &PointSet, is_geographic: bool) -> f64 {
    let mut best = f64::INFINITY;
    for (px, py) in points.iter() {
        let d = if is_geographic {
            geodesy::distance_geo(x, y, px, py)
        } else {
            geodesy::distance_plane((x, y), (px, py))
        };
        if d < best {
            best = d;
        }
    }
    best
}

fn nearest_azimuth(x: f64, y: f64, points: &PointSet, is_geographic: bool, reference: AzimuthReference, unit: AngleUnit) -> f64 {
    let mut best_dist = f64::INFINITY;
    let mut best_azimuth = f64::NAN;

    for (px, py) in points.iter() {
        let (d, azimuth_deg) = if is_geographic {
            let d = geodesy::distance_geo(x, y, px, py);
            let az = match reference {
                AzimuthReference::FromCell => geodesy::azimuth_geo(x, y, px, py),
                AzimuthReference::ToCell => geodesy::azimuth_geo(px, py, x, y),
            };
            (d, az)
        } else {
            let d = geodesy::distance_plane((x, y), (px, py));
            let (dx, dy) = match reference {
                AzimuthReference::FromCell => (px - x, py - y),
                AzimuthReference::ToCell => (x - px, y - py),
            };
            // Bearing convention: 0 = north, clockwise positive, to match the geodesic case.
            let az = dx.atan2(dy).to_degrees();
            (d, az)
        };

        if d < best_dist {
            best_dist = d;
            best_azimuth = azimuth_deg;
        }
    }

    match unit {
        AngleUnit::Degrees => best_azimuth,
        AngleUnit::Radians => best_azimuth.to_radians(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{InMemoryRaster, InMemoryRasterWriter};
    use approx::assert_relative_eq;
    use geo::{Columns, CrsKind, Extent, RasterSize, Rows};

    fn planar_grid(nrow: i32, ncol: i32) -> RasterGrid {
        RasterGrid::new(
            RasterSize::with_rows_cols(Rows(nrow), Columns(ncol)),
            1,
            Extent::new(0.0, ncol as f64, 0.0, nrow as f64),
            CrsKind::Planar { meters_per_unit: 1.0 },
        )
    }

    #[test]
    fn distance_to_single_point_at_grid_corner() {
        let grid = planar_grid(3, 3);
        let mut mask = InMemoryRaster::filled(3, 3, 0.0); // no cell is itself a feature
        let points = PointSet::new(vec![0.5], vec![2.5]); // center of cell (0,0)

        let mut writer = InMemoryRasterWriter::new(3, 3);
        let plan = BlockPlan::whole_grid(3);
        direct_distance(&mut mask, &mut writer, &grid, &plan, &points).unwrap();

        assert_relative_eq!(writer.data[0], 0.0, epsilon = 1e-9);
        assert!(writer.data.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn feature_cells_stay_nan() {
        let grid = planar_grid(2, 2);
        let mut mask = InMemoryRaster::new(2, 2, vec![f64::NAN, 0.0, 0.0, 0.0]);
        let points = PointSet::new(vec![1.5], vec![1.5]);
        let mut writer = InMemoryRasterWriter::new(2, 2);
        let plan = BlockPlan::whole_grid(2);
        direct_distance(&mut mask, &mut writer, &grid, &plan, &points).unwrap();
        assert!(writer.data[0].is_nan());
    }

    #[test]
    fn bearing_east_is_ninety_degrees() {
        let grid = planar_grid(1, 3);
        let mut mask = InMemoryRaster::filled(1, 3, 0.0);
        let points = PointSet::new(vec![2.5], vec![0.5]); // east of column 0
        let mut writer = InMemoryRasterWriter::new(1, 3);
        let plan = BlockPlan::whole_grid(1);
        direct_direction(
            &mut mask,
            &mut writer,
            &grid,
            &plan,
            &points,
            AzimuthReference::FromCell,
            AngleUnit::Degrees,
        )
        .unwrap();
        assert_relative_eq!(writer.data[0], 90.0, epsilon = 1e-9);
    }
}
