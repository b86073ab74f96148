//! 3x3 focal edge/boundary extraction (§4.7): the feeder pass that turns a classified
//! raster into the "feature cells" the direct-distance/direction operator sweeps against.
use crate::blockplan::BlockPlan;
use crate::io::{RasterReader, RasterWriter};
use crate::output::OperatorOutput;
use crate::{Error, Result};
use geo::nodata::is_missing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    /// Non-`NaN` cell bordering a `NaN` neighbor becomes an edge.
    Inner,
    /// `NaN` cell bordering a non-`NaN` neighbor becomes an edge.
    Outer,
    /// Cell bordering any differently-valued neighbor becomes an edge (both `NaN` is not a difference).
    Classes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

impl Connectivity {
    pub fn from_neighbor_count(n: i32) -> Result<Self> {
        match n {
            4 => Ok(Connectivity::Four),
            8 => Ok(Connectivity::Eight),
            _ => Err(Error::InvalidArgument(format!("neighbors must be 4 or 8, got {n}"))),
        }
    }

    fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            Connectivity::Eight => &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)],
        }
    }
}

pub struct EdgeOptions {
    pub mode: EdgeMode,
    pub connectivity: Connectivity,
    /// Value assigned to non-`NaN`, non-edge cells (`Inner`/`Classes`) or `NaN`, non-edge
    /// cells (`Outer`).
    pub falseval: f64,
    /// Column 0's west neighbor is column `ncol-1` of the same row, and vice versa
    /// (antimeridian wrap on a global lon-lat grid).
    pub wrap_columns: bool,
}

/// Runs edge extraction block by block, reading a one-row halo above and below each band
/// (clamped/replicated at the grid's own top and bottom edge) and stripping it after use.
pub fn edges(
    reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    plan: &BlockPlan,
    opts: &EdgeOptions,
) -> Result<OperatorOutput<()>> {
    let nrow = reader.nrow();
    let ncol = reader.ncol();
    let offsets = opts.connectivity.offsets();

    for block in plan.blocks() {
        let halo_top = (block.row_start - 1).max(0);
        let halo_bottom = (block.row_start + block.nrows + 1).min(nrow);
        let halo_nrows = halo_bottom - halo_top;
        let raw = reader.read_block(halo_top, halo_nrows, 0, ncol)?;

        let local_index = |abs_row: i32| -> usize { (abs_row.clamp(halo_top, halo_bottom - 1) - halo_top) as usize };
        let row_at = |abs_row: i32| -> &[f64] {
            let idx = local_index(abs_row);
            &raw[idx * ncol as usize..(idx + 1) * ncol as usize]
        };
        let col_at = |c: i32| -> usize {
            if opts.wrap_columns {
                c.rem_euclid(ncol) as usize
            } else {
                c.clamp(0, ncol - 1) as usize
            }
        };

        let mut out = vec![0.0; (block.nrows as usize) * (ncol as usize)];
        for local_row in 0..block.nrows {
            let abs_row = block.row_start + local_row;
            let center_row = row_at(abs_row);
            let out_row = &mut out[(local_row as usize) * ncol as usize..(local_row as usize + 1) * ncol as usize];
            for col in 0..ncol {
                let center = center_row[col as usize];
                let mut neighbors = [0.0; 8];
                for (k, &(dr, dc)) in offsets.iter().enumerate() {
                    neighbors[k] = row_at(abs_row + dr)[col_at(col + dc)];
                }
                out_row[col as usize] = edge_value(opts.mode, center, &neighbors[..offsets.len()], opts.falseval);
            }
        }

        writer.write_block(block.row_start, block.nrows, &out)?;
    }

    Ok(OperatorOutput::new(()))
}

fn edge_value(mode: EdgeMode, center: f64, neighbors: &[f64], falseval: f64) -> f64 {
    match mode {
        EdgeMode::Inner => {
            if is_missing(center) {
                f64::NAN
            } else if neighbors.iter().any(|&n| is_missing(n)) {
                1.0
            } else {
                falseval
            }
        }
        EdgeMode::Outer => {
            if !is_missing(center) {
                falseval
            } else if neighbors.iter().any(|&n| !is_missing(n)) {
                1.0
            } else {
                f64::NAN
            }
        }
        EdgeMode::Classes => {
            let differs = |n: f64| match (is_missing(center), is_missing(n)) {
                (true, true) => false,
                (true, false) | (false, true) => true,
                (false, false) => center != n,
            };
            if is_missing(center) && neighbors.iter().all(|&n| is_missing(n)) {
                f64::NAN
            } else if neighbors.iter().any(|&n| differs(n)) {
                1.0
            } else {
                falseval
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{InMemoryRaster, InMemoryRasterWriter};

    fn checkerboard() -> InMemoryRaster {
        // NaN border around a single non-NaN center cell.
        #[rustfmt::skip]
        let data = vec![
            f64::NAN, f64::NAN, f64::NAN,
            f64::NAN, 1.0,      f64::NAN,
            f64::NAN, f64::NAN, f64::NAN,
        ];
        InMemoryRaster::new(3, 3, data)
    }

    #[test]
    fn inner_edge_marks_the_lone_non_nan_cell() {
        let mut reader = checkerboard();
        let mut writer = InMemoryRasterWriter::new(3, 3);
        let plan = BlockPlan::whole_grid(3);
        let opts = EdgeOptions {
            mode: EdgeMode::Inner,
            connectivity: Connectivity::Eight,
            falseval: 0.0,
            wrap_columns: false,
        };
        edges(&mut reader, &mut writer, &plan, &opts).unwrap();
        assert_eq!(writer.data[4], 1.0); // center cell
        assert!(writer.data[0].is_nan()); // corner stays NaN
    }

    #[test]
    fn outer_edge_marks_nan_cells_touching_data() {
        let mut reader = checkerboard();
        let mut writer = InMemoryRasterWriter::new(3, 3);
        let plan = BlockPlan::whole_grid(3);
        let opts = EdgeOptions {
            mode: EdgeMode::Outer,
            connectivity: Connectivity::Eight,
            falseval: 0.0,
            wrap_columns: false,
        };
        edges(&mut reader, &mut writer, &plan, &opts).unwrap();
        assert_eq!(writer.data[1], 1.0); // top-middle NaN cell touches the center
        assert_eq!(writer.data[4], 0.0); // the data cell itself gets falseval
    }

    #[test]
    fn invalid_neighbor_count_is_rejected() {
        assert!(Connectivity::from_neighbor_count(6).is_err());
        assert!(Connectivity::from_neighbor_count(4).is_ok());
        assert!(Connectivity::from_neighbor_count(8).is_ok());
    }
}
