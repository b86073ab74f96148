use super::extract_block;
use crate::blockplan::BlockPlan;
use crate::io::{InMemoryRaster, InMemoryRasterWriter, RasterReader, RasterWriter};
use crate::neighbor::NeighborSteps;
use crate::output::OperatorOutput;
use crate::Result;
use geo::nodata::is_missing;
use geo::RasterGrid;

/// Euclidean (unweighted) distance-to-nearest-source transform (`gridDistance`, §4.4).
///
/// `source_reader` supplies the input raster: any non-`NaN` cell is a source with
/// distance 0. The output has the same geometry, single layer, values `>= 0`.
pub fn grid_distance(
    source_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
) -> Result<OperatorOutput<()>> {
    let nrow = grid.nrow();
    let ncol = grid.ncol();

    let mut forward_writer = InMemoryRasterWriter::new(nrow, ncol);
    initial_forward_pass(source_reader, &mut forward_writer, grid, plan)?;
    let mut current = InMemoryRaster::new(nrow, ncol, take_data(forward_writer)?);

    let mut backward_writer = InMemoryRasterWriter::new(nrow, ncol);
    directional_pass(&mut current, &mut backward_writer, grid, plan, false)?;
    current = InMemoryRaster::new(nrow, ncol, take_data(backward_writer)?);

    // Non-global planar grids have no pole/wrap short circuits to propagate, so the
    // forward+backward pair above already reached the fixed point (§4.4 step 6). Geographic
    // grids (and in particular global or polar ones) may still improve, so keep alternating
    // passes until nothing changes or a generous iteration cap is hit.
    if grid.is_lonlat() {
        const MAX_EXTRA_PASSES: u32 = 8;
        let mut forward = true;
        for _ in 0..MAX_EXTRA_PASSES {
            let mut pass_writer = InMemoryRasterWriter::new(nrow, ncol);
            let changed = directional_pass(&mut current, &mut pass_writer, grid, plan, forward)?;
            current = InMemoryRaster::new(nrow, ncol, take_data(pass_writer)?);
            forward = !forward;
            if !changed {
                break;
            }
        }
    }

    for block in plan.blocks() {
        let data = extract_block(&current, block.row_start, block.nrows);
        writer.write_block(block.row_start, block.nrows, &data)?;
    }

    Ok(OperatorOutput::new(()))
}

fn take_data(writer: InMemoryRasterWriter) -> Result<Vec<f64>> {
    let data = writer.data.clone();
    writer.finalize()?;
    Ok(data)
}

fn initial_forward_pass(
    source_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
) -> Result<()> {
    let ncol = grid.ncol();
    let wrap = grid.is_global_lonlat();
    let north_pole = grid.ns_polar().north();

    let mut above = vec![f64::INFINITY; ncol as usize];
    for block in plan.blocks() {
        let v = source_reader.read_block(block.row_start, block.nrows, 0, ncol)?;
        let mut dist = vec![0.0; v.len()];
        for (d, &src) in dist.iter_mut().zip(v.iter()) {
            *d = if is_missing(src) { f64::INFINITY } else { 0.0 };
        }

        for local_row in 0..block.nrows {
            let abs_row = block.row_start + local_row;
            let steps = NeighborSteps::for_row(grid, abs_row);
            let row = &mut dist[(local_row as usize) * ncol as usize..(local_row as usize + 1) * ncol as usize];
            relax_row_forward(row, &above, ncol, wrap, steps);

            if abs_row == 0 && north_pole {
                apply_pole_shortcut(row, steps.dy);
            }

            above.copy_from_slice(row);
        }

        writer.write_block(block.row_start, block.nrows, &dist)?;
    }

    Ok(())
}

/// A later pass over an already-initialized distance grid: same relaxation, no source reset.
fn directional_pass(
    dist_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
    forward: bool,
) -> Result<bool> {
    let ncol = grid.ncol();
    let wrap = grid.is_global_lonlat();
    let mut changed = false;

    let blocks: Vec<_> = if forward {
        plan.blocks().to_vec()
    } else {
        let mut b = plan.blocks().to_vec();
        b.reverse();
        b
    };

    let mut carry = vec![f64::INFINITY; ncol as usize];
    for block in &blocks {
        let original = dist_reader.read_block(block.row_start, block.nrows, 0, ncol)?;
        let mut dist = original.clone();

        let row_range: Vec<i32> = if forward {
            (0..block.nrows).collect()
        } else {
            (0..block.nrows).rev().collect()
        };

        for &local_row in &row_range {
            let abs_row = block.row_start + local_row;
            let steps = NeighborSteps::for_row(grid, abs_row);
            let row = &mut dist[(local_row as usize) * ncol as usize..(local_row as usize + 1) * ncol as usize];

            if forward {
                relax_row_forward(row, &carry, ncol, wrap, steps);
                if abs_row == 0 && grid.ns_polar().north() {
                    apply_pole_shortcut(row, steps.dy);
                }
            } else {
                relax_row_backward(row, &carry, ncol, wrap, steps);
                if abs_row == grid.nrow() - 1 && grid.ns_polar().south() {
                    apply_pole_shortcut(row, steps.dy);
                }
            }

            carry.copy_from_slice(row);
        }

        if dist != original {
            changed = true;
        }
        writer.write_block(block.row_start, block.nrows, &dist)?;
    }

    Ok(changed)
}

fn relax_row_forward(row: &mut [f64], above: &[f64], ncol: i32, wrap: bool, steps: NeighborSteps) {
    let n = ncol as usize;
    for col in 0..n {
        if col > 0 {
            row[col] = row[col].min(row[col - 1] + steps.dx);
        } else if wrap {
            row[col] = row[col].min(row[n - 1] + steps.dx);
        }
        row[col] = row[col].min(above[col] + steps.dy);
        if col > 0 {
            row[col] = row[col].min(above[col - 1] + steps.dxy);
        } else if wrap {
            row[col] = row[col].min(above[n - 1] + steps.dxy);
        }
    }
    for col in (0..n).rev() {
        if col < n - 1 {
            row[col] = row[col].min(row[col + 1] + steps.dx);
            row[col] = row[col].min(above[col + 1] + steps.dxy);
        } else if wrap {
            row[col] = row[col].min(row[0] + steps.dx);
            row[col] = row[col].min(above[0] + steps.dxy);
        }
    }
}

fn relax_row_backward(row: &mut [f64], below: &[f64], ncol: i32, wrap: bool, steps: NeighborSteps) {
    let n = ncol as usize;
    for col in (0..n).rev() {
        if col < n - 1 {
            row[col] = row[col].min(row[col + 1] + steps.dx);
        } else if wrap {
            row[col] = row[col].min(row[0] + steps.dx);
        }
        row[col] = row[col].min(below[col] + steps.dy);
        if col < n - 1 {
            row[col] = row[col].min(below[col + 1] + steps.dxy);
        } else if wrap {
            row[col] = row[col].min(below[0] + steps.dxy);
        }
    }
    for col in 0..n {
        if col > 0 {
            row[col] = row[col].min(row[col - 1] + steps.dx);
            row[col] = row[col].min(below[col - 1] + steps.dxy);
        } else if wrap {
            row[col] = row[col].min(row[n - 1] + steps.dx);
            row[col] = row[col].min(below[n - 1] + steps.dxy);
        }
    }
}

/// Propagation across the pole: every cell on the polar row can reach the row's own
/// minimum by crossing the pole and coming back down, at the cost of one `dy` step.
fn apply_pole_shortcut(row: &mut [f64], dy: f64) {
    let min_row = row.iter().cloned().fold(f64::INFINITY, f64::min);
    for v in row.iter_mut() {
        *v = v.min(min_row + dy);
    }
}
