//! 3x3 focal terrain derivatives (§4.8): slope, aspect, flow direction, TPI, TRI, roughness.
//!
//! All operate on one elevation layer. Border rows and columns always emit `NaN` since a
//! full 3x3 window isn't available there; this is why the block planner's terrain floor is
//! 3 rows (the block's own halo plus one interior row).
use crate::blockplan::BlockPlan;
use crate::directdistance::AngleUnit;
use crate::io::{RasterReader, RasterWriter};
use crate::neighbor::NeighborSteps;
use crate::output::OperatorOutput;
use crate::Result;
use geo::nodata::is_missing;
use geo::RasterGrid;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeAlgorithm {
    /// Rook-only finite differences (uses N/S/E/W neighbors).
    Horn4,
    /// Full Horn (1981) weighted 3x3 kernel.
    Horn8,
}

/// Neighbor offsets in flow-direction encoding order: East first, then counterclockwise.
const FLOW_OFFSETS: [(i32, i32); 8] = [
    (0, 1),   // E  -> 1
    (-1, 1),  // NE -> 2
    (-1, 0),  // N  -> 4
    (-1, -1), // NW -> 8
    (0, -1),  // W  -> 16
    (1, -1),  // SW -> 32
    (1, 0),   // S  -> 64
    (1, 1),   // SE -> 128
];

/// Runs `cell` (a single-cell terrain kernel) over every interior cell, reading a one-row
/// halo above/below each block and leaving every border row/column `NaN`.
fn run_focal(
    elevation_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
    mut cell_fn: impl FnMut(i32, i32, &dyn Fn(i32, i32) -> f64, NeighborSteps) -> f64,
) -> Result<()> {
    let nrow = grid.nrow();
    let ncol = grid.ncol();

    for block in plan.blocks() {
        let halo_top = (block.row_start - 1).max(0);
        let halo_bottom = (block.row_start + block.nrows + 1).min(nrow);
        let halo_nrows = halo_bottom - halo_top;
        let raw = elevation_reader.read_block(halo_top, halo_nrows, 0, ncol)?;

        let at = |abs_row: i32, col: i32| -> f64 {
            if abs_row < 0 || abs_row >= nrow || col < 0 || col >= ncol {
                return f64::NAN;
            }
            if abs_row < halo_top || abs_row >= halo_bottom {
                return f64::NAN;
            }
            let local = abs_row - halo_top;
            raw[(local as usize) * ncol as usize + col as usize]
        };

        let mut out = vec![f64::NAN; (block.nrows as usize) * (ncol as usize)];
        for local_row in 0..block.nrows {
            let abs_row = block.row_start + local_row;
            let out_row = &mut out[(local_row as usize) * ncol as usize..(local_row as usize + 1) * ncol as usize];
            if abs_row == 0 || abs_row == nrow - 1 {
                continue; // border row: stays NaN
            }
            let steps = NeighborSteps::for_row(grid, abs_row);
            for col in 0..ncol {
                if col == 0 || col == ncol - 1 {
                    continue; // border column: stays NaN
                }
                out_row[col as usize] = cell_fn(abs_row, col, &at, steps);
            }
        }

        writer.write_block(block.row_start, block.nrows, &out)?;
    }

    Ok(())
}

fn finite_differences(at: &dyn Fn(i32, i32) -> f64, row: i32, col: i32, algo: SlopeAlgorithm, steps: NeighborSteps) -> Option<(f64, f64)> {
    let window: [[f64; 3]; 3] = [
        [at(row - 1, col - 1), at(row - 1, col), at(row - 1, col + 1)],
        [at(row, col - 1), at(row, col), at(row, col + 1)],
        [at(row + 1, col - 1), at(row + 1, col), at(row + 1, col + 1)],
    ];
    if window.iter().flatten().any(|v| is_missing(*v)) {
        return None;
    }

    let (zx, zy) = match algo {
        SlopeAlgorithm::Horn4 => {
            let zx = (window[1][0] - window[1][2]) / (2.0 * steps.dx);
            let zy = (window[2][1] - window[0][1]) / (2.0 * steps.dy);
            (zx, zy)
        }
        SlopeAlgorithm::Horn8 => {
            let zx = ((window[0][0] + 2.0 * window[1][0] + window[2][0]) - (window[0][2] + 2.0 * window[1][2] + window[2][2]))
                / (8.0 * steps.dx);
            let zy = ((window[2][0] + 2.0 * window[2][1] + window[2][2]) - (window[0][0] + 2.0 * window[0][1] + window[0][2]))
                / (8.0 * steps.dy);
            (zx, zy)
        }
    };
    Some((zx, zy))
}

pub fn slope(
    elevation_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
    algo: SlopeAlgorithm,
) -> Result<OperatorOutput<()>> {
    run_focal(elevation_reader, writer, grid, plan, |row, col, at, steps| {
        match finite_differences(at, row, col, algo, steps) {
            Some((zx, zy)) => (zx * zx + zy * zy).sqrt().atan(),
            None => f64::NAN,
        }
    })?;
    Ok(OperatorOutput::new(()))
}

pub fn aspect(
    elevation_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
    algo: SlopeAlgorithm,
    unit: AngleUnit,
) -> Result<OperatorOutput<()>> {
    run_focal(elevation_reader, writer, grid, plan, |row, col, at, steps| {
        match finite_differences(at, row, col, algo, steps) {
            Some((zx, zy)) => {
                let two_pi = std::f64::consts::TAU;
                let mut a = (std::f64::consts::FRAC_PI_2 - zy.atan2(zx)) % two_pi;
                if a < 0.0 {
                    a += two_pi;
                }
                match unit {
                    AngleUnit::Radians => a,
                    AngleUnit::Degrees => a.to_degrees(),
                }
            }
            None => f64::NAN,
        }
    })?;
    Ok(OperatorOutput::new(()))
}

/// Flow direction encoded as `2^k`, `k` in `[0,7]` starting East and going counterclockwise.
/// Ties among equally-steepest neighbors are broken by `rng`, seeded by the caller so runs
/// are reproducible under test.
pub fn flow_direction(
    elevation_reader: &mut impl RasterReader,
    writer: &mut impl RasterWriter,
    grid: &RasterGrid,
    plan: &BlockPlan,
    seed: u64,
) -> Result<OperatorOutput<()>> {
    let mut rng = StdRng::seed_from_u64(seed);
    // `run_focal` takes `FnMut`, so the RNG can be captured and advanced call to call while
    // still producing the same sequence for a given seed regardless of block boundaries.
    run_focal(elevation_reader, writer, grid, plan, |row, col, at, steps| {
        let h0 = at(row, col);
        if is_missing(h0) {
            return f64::NAN;
        }

        let mut best_drop = f64::NEG_INFINITY;
        let mut candidates: Vec<u32> = Vec::new();
        for (k, &(dr, dc)) in FLOW_OFFSETS.iter().enumerate() {
            let hk = at(row + dr, col + dc);
            if is_missing(hk) {
                continue;
            }
            let d = match (dr, dc) {
                (0, _) => steps.dx,
                (_, 0) => steps.dy,
                _ => steps.dxy,
            };
            let drop = (h0 - hk) / d;
            if drop > best_drop {
                best_drop = drop;
                candidates.clear();
                candidates.push(1u32 << k);
            } else if drop == best_drop {
                candidates.push(1u32 << k);
            }
        }

        if candidates.is_empty() {
            return f64::NAN;
        }
        let choice = if candidates.len() == 1 {
            candidates[0]
        } else {
            candidates[rng.gen_range(0..candidates.len())]
        };
        choice as f64
    })?;
    Ok(OperatorOutput::new(()))
}

pub fn tpi(elevation_reader: &mut impl RasterReader, writer: &mut impl RasterWriter, grid: &RasterGrid, plan: &BlockPlan) -> Result<OperatorOutput<()>> {
    run_focal(elevation_reader, writer, grid, plan, |row, col, at, _steps| {
        let h0 = at(row, col);
        let mut neighbors = Vec::with_capacity(8);
        for &(dr, dc) in FLOW_OFFSETS.iter() {
            neighbors.push(at(row + dr, col + dc));
        }
        if is_missing(h0) || neighbors.iter().any(|v| is_missing(*v)) {
            return f64::NAN;
        }
        let mean = neighbors.iter().sum::<f64>() / neighbors.len() as f64;
        h0 - mean
    })?;
    Ok(OperatorOutput::new(()))
}

pub fn tri(elevation_reader: &mut impl RasterReader, writer: &mut impl RasterWriter, grid: &RasterGrid, plan: &BlockPlan) -> Result<OperatorOutput<()>> {
    run_focal(elevation_reader, writer, grid, plan, |row, col, at, _steps| {
        let h0 = at(row, col);
        let mut neighbors = Vec::with_capacity(8);
        for &(dr, dc) in FLOW_OFFSETS.iter() {
            neighbors.push(at(row + dr, col + dc));
        }
        if is_missing(h0) || neighbors.iter().any(|v| is_missing(*v)) {
            return f64::NAN;
        }
        neighbors.iter().map(|h| (h0 - h).abs()).sum::<f64>() / neighbors.len() as f64
    })?;
    Ok(OperatorOutput::new(()))
}

pub fn roughness(elevation_reader: &mut impl RasterReader, writer: &mut impl RasterWriter, grid: &RasterGrid, plan: &BlockPlan) -> Result<OperatorOutput<()>> {
    run_focal(elevation_reader, writer, grid, plan, |row, col, at, _steps| {
        let h0 = at(row, col);
        let mut values = Vec::with_capacity(9);
        values.push(h0);
        for &(dr, dc) in FLOW_OFFSETS.iter() {
            values.push(at(row + dr, col + dc));
        }
        if values.iter().any(|v| is_missing(*v)) {
            return f64::NAN;
        }
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        max - min
    })?;
    Ok(OperatorOutput::new(()))
}
