//! The collaborator interfaces the core consumes but does not implement: reading/writing
//! raster blocks and answering CRS questions. File formats, compression and CRS parsing
//! belong to a driver layer outside this crate; `InMemory*` implementations here exist so
//! the sweep kernels can be driven and tested without one.
use crate::{Error, Result};

/// Streams row-major `f64` blocks out of a raster source. `NaN` means missing.
///
/// Implementations own whatever file handle or connection they need; `read_block` may
/// block on I/O, which is the only suspension point the sweep driver has to account for.
pub trait RasterReader {
    fn nrow(&self) -> i32;
    fn ncol(&self) -> i32;

    fn read_block(&mut self, row_start: i32, nrows: i32, col_start: i32, ncols: i32) -> Result<Vec<f64>>;
}

/// Persists row-major `f64` blocks to a raster target.
///
/// Writes must be atomic at block granularity: if `write_block` returns `Err`, no partial
/// block reaches the target. `finalize` commits the output; dropping a writer that was
/// never finalized is treated as an abandoned, partially written output.
pub trait RasterWriter {
    fn write_block(&mut self, row_start: i32, nrows: i32, data: &[f64]) -> Result<()>;
    fn finalize(self) -> Result<()>;
}

/// Answers the narrow set of CRS questions the core needs without parsing CRS definitions itself.
pub trait CrsOracle {
    fn meters_per_unit(&self) -> Option<f64>;
    fn is_lonlat(&self) -> bool;
    fn is_same(&self, other: &Self) -> bool;
}

/// A full grid held in memory, used as a `RasterReader` for tests and small in-process runs.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryRaster {
    pub nrow: i32,
    pub ncol: i32,
    pub data: Vec<f64>,
}

impl InMemoryRaster {
    pub fn new(nrow: i32, ncol: i32, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), (nrow as usize) * (ncol as usize), "raster data size mismatch");
        InMemoryRaster { nrow, ncol, data }
    }

    pub fn filled(nrow: i32, ncol: i32, value: f64) -> Self {
        InMemoryRaster {
            nrow,
            ncol,
            data: vec![value; (nrow as usize) * (ncol as usize)],
        }
    }
}

impl RasterReader for InMemoryRaster {
    fn nrow(&self) -> i32 {
        self.nrow
    }

    fn ncol(&self) -> i32 {
        self.ncol
    }

    fn read_block(&mut self, row_start: i32, nrows: i32, col_start: i32, ncols: i32) -> Result<Vec<f64>> {
        if row_start < 0 || row_start + nrows > self.nrow || col_start < 0 || col_start + ncols > self.ncol {
            return Err(Error::InvalidArgument(format!(
                "block ({row_start},{nrows})x({col_start},{ncols}) is out of bounds for a {}x{} raster",
                self.nrow, self.ncol
            )));
        }

        let mut out = Vec::with_capacity((nrows as usize) * (ncols as usize));
        for row in row_start..row_start + nrows {
            let row_base = (row as usize) * (self.ncol as usize);
            out.extend_from_slice(&self.data[row_base + col_start as usize..row_base + (col_start + ncols) as usize]);
        }
        Ok(out)
    }
}

/// Accumulates written blocks into a single in-memory grid, used to assert on operator output in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryRasterWriter {
    pub nrow: i32,
    pub ncol: i32,
    pub data: Vec<f64>,
    finalized: bool,
}

impl InMemoryRasterWriter {
    pub fn new(nrow: i32, ncol: i32) -> Self {
        InMemoryRasterWriter {
            nrow,
            ncol,
            data: vec![f64::NAN; (nrow as usize) * (ncol as usize)],
            finalized: false,
        }
    }
}

impl RasterWriter for InMemoryRasterWriter {
    fn write_block(&mut self, row_start: i32, nrows: i32, data: &[f64]) -> Result<()> {
        if data.len() != (nrows as usize) * (self.ncol as usize) {
            return Err(Error::SizeMismatch {
                size1: (nrows as usize, self.ncol as usize),
                size2: (data.len(), 1),
            });
        }
        let start = (row_start as usize) * (self.ncol as usize);
        self.data[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn finalize(mut self) -> Result<()> {
        self.finalized = true;
        Ok(())
    }
}

impl Drop for InMemoryRasterWriter {
    fn drop(&mut self) {
        if !self.finalized {
            log::warn!("InMemoryRasterWriter dropped without finalize(): output is abandoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_block_extracts_the_requested_window() {
        let mut raster = InMemoryRaster::new(3, 3, (0..9).map(|v| v as f64).collect());
        let block = raster.read_block(1, 2, 1, 2).unwrap();
        assert_eq!(block, vec![4.0, 5.0, 7.0, 8.0]);
    }

    #[test]
    fn read_block_rejects_out_of_bounds_windows() {
        let mut raster = InMemoryRaster::filled(3, 3, 0.0);
        assert!(raster.read_block(0, 4, 0, 3).is_err());
    }

    #[test]
    fn writer_assembles_blocks_in_order() {
        let mut writer = InMemoryRasterWriter::new(4, 2);
        writer.write_block(0, 2, &[1.0, 1.0, 2.0, 2.0]).unwrap();
        writer.write_block(2, 2, &[3.0, 3.0, 4.0, 4.0]).unwrap();
        assert_eq!(writer.data, vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);
        writer.finalize().unwrap();
    }
}
