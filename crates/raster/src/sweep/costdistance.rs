use super::extract_block;
use crate::blockplan::BlockPlan;
use crate::io::{InMemoryRaster, InMemoryRasterWriter, RasterReader, RasterWriter};
use crate::neighbor::NeighborSteps;
use crate::output::{OperatorOutput, Warning};
use crate::{Error, Result};
use geo::nodata::is_missing;
use geo::RasterGrid;

pub struct CostDistanceOptions {
    /// Friction value that marks a cell as a source (cost 0).
    pub target: f64,
    /// If true, friction is ignored entirely and the sweep behaves like `gridDistance`.
    pub grid_only: bool,
    pub max_iterations: u32,
}

impl Default for CostDistanceOptions {
    fn default() -> Self {
        CostDistanceOptions {
            target: 1.0,
            grid_only: false,
            max_iterations: 50,
        }
    }
}

/// Friction-weighted accumulated least-cost distance to the nearest source cell (§4.5).
///
/// Negative friction anywhere is a caller error. Only the raster's first layer is used;
/// a multi-layer `grid` attaches an `OnlyLayerZeroUsed` warning rather than failing, mirroring
/// `costDistance`'s own "first input layer only" recursion onto a single-layer subset.
pub fn cost_distance(
    friction_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
    opts: &CostDistanceOptions,
) -> Result<OperatorOutput<()>> {
    let nrow = grid.nrow();
    let ncol = grid.ncol();

    let mut warnings = Vec::new();
    if grid.nlyr() > 1 {
        warnings.push(Warning::OnlyLayerZeroUsed);
    }

    let mut friction = InMemoryRaster::filled(nrow, ncol, f64::NAN);
    for block in plan.blocks() {
        let f = friction_reader.read_block(block.row_start, block.nrows, 0, ncol)?;
        if f.iter().any(|&v| !is_missing(v) && v < 0.0) {
            return Err(Error::InvalidArgument("costDistance: negative friction value".into()));
        }
        let start = block.row_start as usize * ncol as usize;
        friction.data[start..start + f.len()].copy_from_slice(&f);
    }

    let is_source: Vec<bool> = friction.data.iter().map(|&v| v == opts.target).collect();
    if opts.grid_only {
        for v in friction.data.iter_mut() {
            *v = 1.0;
        }
    } else {
        for (v, &source) in friction.data.iter_mut().zip(is_source.iter()) {
            if source {
                *v = 0.0;
            }
        }
    }

    let mut current = InMemoryRaster::new(
        nrow,
        ncol,
        is_source.iter().map(|&s| if s { 0.0 } else { f64::INFINITY }).collect(),
    );

    let mut converged = false;
    for iteration in 1..=opts.max_iterations {
        let previous = current.clone();
        current = run_pass(&current, &friction, grid, plan, true)?;
        current = run_pass(&current, &friction, grid, plan, false)?;
        if current.data == previous.data {
            converged = true;
            break;
        }
        if iteration == opts.max_iterations {
            warnings.push(Warning::DidNotConverge { iterations: iteration });
        }
    }
    let _ = converged;

    for block in plan.blocks() {
        let data = extract_block(&current, block.row_start, block.nrows);
        writer.write_block(block.row_start, block.nrows, &data)?;
    }

    Ok(OperatorOutput::with_warnings((), warnings))
}

fn run_pass(
    dist: &InMemoryRaster,
    friction: &InMemoryRaster,
    grid: &RasterGrid,
    plan: &BlockPlan,
    forward: bool,
) -> Result<InMemoryRaster> {
    let nrow = grid.nrow();
    let ncol = grid.ncol();
    let wrap = grid.is_global_lonlat();

    let mut writer = InMemoryRasterWriter::new(nrow, ncol);
    let mut dist_reader = dist.clone();

    let blocks: Vec<_> = if forward {
        plan.blocks().to_vec()
    } else {
        let mut b = plan.blocks().to_vec();
        b.reverse();
        b
    };

    let mut carry = vec![f64::INFINITY; ncol as usize];
    let mut carry_friction = vec![f64::NAN; ncol as usize];

    for block in &blocks {
        let mut dist_block = dist_reader.read_block(block.row_start, block.nrows, 0, ncol)?;
        let friction_block = {
            let mut f = friction.clone();
            f.read_block(block.row_start, block.nrows, 0, ncol)?
        };

        let row_range: Vec<i32> = if forward {
            (0..block.nrows).collect()
        } else {
            (0..block.nrows).rev().collect()
        };

        for &local_row in &row_range {
            let abs_row = block.row_start + local_row;
            let steps = NeighborSteps::for_row(grid, abs_row).halved();
            let base = (local_row as usize) * ncol as usize;
            let row = &mut dist_block[base..base + ncol as usize];
            let row_friction = &friction_block[base..base + ncol as usize];

            if forward {
                relax_forward(row, &carry, row_friction, &carry_friction, ncol, wrap, steps);
                if abs_row == 0 && grid.ns_polar().north() {
                    apply_pole_shortcut(row, steps.dy * 2.0);
                }
            } else {
                relax_backward(row, &carry, row_friction, &carry_friction, ncol, wrap, steps);
                if abs_row == grid.nrow() - 1 && grid.ns_polar().south() {
                    apply_pole_shortcut(row, steps.dy * 2.0);
                }
            }

            carry.copy_from_slice(row);
            carry_friction.copy_from_slice(row_friction);
        }

        writer.write_block(block.row_start, block.nrows, &dist_block)?;
    }

    let data = writer.data.clone();
    writer.finalize()?;
    Ok(InMemoryRaster::new(nrow, ncol, data))
}

#[inline]
fn edge_weight(fa: f64, fb: f64, step: f64) -> Option<f64> {
    if is_missing(fa) || is_missing(fb) {
        None
    } else {
        Some(step * (fa + fb))
    }
}

fn relax_forward(row: &mut [f64], above: &[f64], rf: &[f64], af: &[f64], ncol: i32, wrap: bool, steps: NeighborSteps) {
    let n = ncol as usize;
    for col in 0..n {
        if col > 0 {
            if let Some(w) = edge_weight(rf[col], rf[col - 1], steps.dx) {
                row[col] = row[col].min(row[col - 1] + w);
            }
        } else if wrap {
            if let Some(w) = edge_weight(rf[col], rf[n - 1], steps.dx) {
                row[col] = row[col].min(row[n - 1] + w);
            }
        }
        if let Some(w) = edge_weight(rf[col], af[col], steps.dy) {
            row[col] = row[col].min(above[col] + w);
        }
        if col > 0 {
            if let Some(w) = edge_weight(rf[col], af[col - 1], steps.dxy) {
                row[col] = row[col].min(above[col - 1] + w);
            }
        } else if wrap {
            if let Some(w) = edge_weight(rf[col], af[n - 1], steps.dxy) {
                row[col] = row[col].min(above[n - 1] + w);
            }
        }
    }
    for col in (0..n).rev() {
        if col < n - 1 {
            if let Some(w) = edge_weight(rf[col], rf[col + 1], steps.dx) {
                row[col] = row[col].min(row[col + 1] + w);
            }
            if let Some(w) = edge_weight(rf[col], af[col + 1], steps.dxy) {
                row[col] = row[col].min(above[col + 1] + w);
            }
        } else if wrap {
            if let Some(w) = edge_weight(rf[col], rf[0], steps.dx) {
                row[col] = row[col].min(row[0] + w);
            }
            if let Some(w) = edge_weight(rf[col], af[0], steps.dxy) {
                row[col] = row[col].min(above[0] + w);
            }
        }
    }
}

fn relax_backward(row: &mut [f64], below: &[f64], rf: &[f64], bf: &[f64], ncol: i32, wrap: bool, steps: NeighborSteps) {
    let n = ncol as usize;
    for col in (0..n).rev() {
        if col < n - 1 {
            if let Some(w) = edge_weight(rf[col], rf[col + 1], steps.dx) {
                row[col] = row[col].min(row[col + 1] + w);
            }
        } else if wrap {
            if let Some(w) = edge_weight(rf[col], rf[0], steps.dx) {
                row[col] = row[col].min(row[0] + w);
            }
        }
        if let Some(w) = edge_weight(rf[col], bf[col], steps.dy) {
            row[col] = row[col].min(below[col] + w);
        }
        if col < n - 1 {
            if let Some(w) = edge_weight(rf[col], bf[col + 1], steps.dxy) {
                row[col] = row[col].min(below[col + 1] + w);
            }
        } else if wrap {
            if let Some(w) = edge_weight(rf[col], bf[0], steps.dxy) {
                row[col] = row[col].min(below[0] + w);
            }
        }
    }
    for col in 0..n {
        if col > 0 {
            if let Some(w) = edge_weight(rf[col], rf[col - 1], steps.dx) {
                row[col] = row[col].min(row[col - 1] + w);
            }
            if let Some(w) = edge_weight(rf[col], bf[col - 1], steps.dxy) {
                row[col] = row[col].min(below[col - 1] + w);
            }
        } else if wrap {
            if let Some(w) = edge_weight(rf[col], rf[n - 1], steps.dx) {
                row[col] = row[col].min(row[n - 1] + w);
            }
            if let Some(w) = edge_weight(rf[col], bf[n - 1], steps.dxy) {
                row[col] = row[col].min(below[n - 1] + w);
            }
        }
    }
}

/// Polar propagation uses a bare `dy` step rather than a friction-weighted one — an
/// approximation carried over from the original sweep rather than derived here.
fn apply_pole_shortcut(row: &mut [f64], dy: f64) {
    let min_row = row.iter().cloned().fold(f64::INFINITY, f64::min);
    for v in row.iter_mut() {
        *v = v.min(min_row + dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::InMemoryRasterWriter;
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
    fn uniform_friction_matches_hand_computed_diagonal() {
        let grid = planar_grid(3, 3);
        let mut friction = InMemoryRaster::filled(3, 3, 2.0);
        friction.data[0] = 1.0; // target at (0,0), using target value 1.0 below

        let mut writer = InMemoryRasterWriter::new(3, 3);
        let plan = BlockPlan::whole_grid(3);
        let opts = CostDistanceOptions {
            target: 1.0,
            grid_only: false,
            max_iterations: 20,
        };
        cost_distance(&mut friction, &mut writer, &grid, &plan, &opts).unwrap();

        assert_relative_eq!(writer.data[0], 0.0);
        // dist[1,1] = 2 * (2+2)/2 * sqrt(2) = 4*sqrt(2)
        assert_relative_eq!(writer.data[4], 4.0 * std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn multi_layer_grid_attaches_only_layer_zero_warning() {
        let grid = RasterGrid::new(
            RasterSize::with_rows_cols(Rows(2), Columns(2)),
            2,
            Extent::new(0.0, 2.0, 0.0, 2.0),
            CrsKind::Planar { meters_per_unit: 1.0 },
        );
        let mut friction = InMemoryRaster::new(2, 2, vec![1.0, 2.0, 2.0, 2.0]);
        let mut writer = InMemoryRasterWriter::new(2, 2);
        let plan = BlockPlan::whole_grid(2);
        let opts = CostDistanceOptions::default();
        let out = cost_distance(&mut friction, &mut writer, &grid, &plan, &opts).unwrap();
        assert_eq!(out.warnings, vec![crate::output::Warning::OnlyLayerZeroUsed]);
    }

    #[test]
    fn negative_friction_is_rejected() {
        let grid = planar_grid(2, 2);
        let mut friction = InMemoryRaster::new(2, 2, vec![1.0, -1.0, 2.0, 2.0]);
        let mut writer = InMemoryRasterWriter::new(2, 2);
        let plan = BlockPlan::whole_grid(2);
        let opts = CostDistanceOptions::default();
        let result = cost_distance(&mut friction, &mut writer, &grid, &plan, &opts);
        assert!(result.is_err());
    }

    #[test]
    fn output_is_non_negative_and_monotonic_per_pass() {
        let grid = planar_grid(4, 4);
        let mut friction = InMemoryRaster::filled(4, 4, 3.0);
        friction.data[0] = 1.0;
        let mut writer = InMemoryRasterWriter::new(4, 4);
        let plan = BlockPlan::whole_grid(4);
        let opts = CostDistanceOptions {
            target: 1.0,
            grid_only: false,
            max_iterations: 20,
        };
        cost_distance(&mut friction, &mut writer, &grid, &plan, &opts).unwrap();
        assert!(writer.data.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn rerunning_converged_output_is_idempotent() {
        let grid = planar_grid(4, 4);
        let mut friction = InMemoryRaster::filled(4, 4, 2.0);
        friction.data[0] = 1.0;
        let plan = BlockPlan::whole_grid(4);
        let opts = CostDistanceOptions {
            target: 1.0,
            grid_only: false,
            max_iterations: 20,
        };

        let mut writer1 = InMemoryRasterWriter::new(4, 4);
        cost_distance(&mut friction.clone(), &mut writer1, &grid, &plan, &opts).unwrap();

        // Re-run cost distance using the converged distances as a friction-equivalent source
        // marker (only cell 0 is still target == 1.0, so this checks that a second run off the
        // same input reproduces the same fixed point rather than drifting).
        let mut writer2 = InMemoryRasterWriter::new(4, 4);
        cost_distance(&mut friction, &mut writer2, &grid, &plan, &opts).unwrap();

        assert_eq!(writer1.data, writer2.data);
    }
}
