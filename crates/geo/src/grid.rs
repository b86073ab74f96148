use crate::{crs::CrsKind, extent::Extent, size::Columns, size::Rows, RasterSize};

/// Flags which pole(s) a geographic raster's extent reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoleCoverage {
    None,
    South,
    North,
    Both,
}

impl PoleCoverage {
    pub fn north(&self) -> bool {
        matches!(self, PoleCoverage::North | PoleCoverage::Both)
    }

    pub fn south(&self) -> bool {
        matches!(self, PoleCoverage::South | PoleCoverage::Both)
    }
}

/// Global-wrap tolerance for `is_global_lonlat`: the spec asks for `xmax - xmin >= 360 - eps`.
const GLOBAL_EXTENT_EPS: f64 = 1e-9;
/// How close an extent edge needs to be to +/-90 degrees to count as touching a pole.
const POLE_EPS: f64 = 1e-9;

/// Immutable geometric description of a raster: its shape, extent and spatial reference kind.
///
/// This is the "Raster grid abstraction" the sweep kernels are built against. It owns no
/// pixel data; reading and writing blocks of data is the job of the `RasterReader`/`RasterWriter`
/// collaborators in the `io` module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterGrid {
    size: RasterSize,
    nlyr: usize,
    extent: Extent,
    crs_kind: CrsKind,
}

impl RasterGrid {
    pub fn new(size: RasterSize, nlyr: usize, extent: Extent, crs_kind: CrsKind) -> Self {
        assert!(size.rows.count() >= 1 && size.cols.count() >= 1, "grid must have at least one row and column");
        assert!(nlyr >= 1, "grid must have at least one layer");
        RasterGrid {
            size,
            nlyr: nlyr.max(1),
            extent,
            crs_kind,
        }
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn nrow(&self) -> i32 {
        self.size.rows.count()
    }

    pub fn ncol(&self) -> i32 {
        self.size.cols.count()
    }

    pub fn nlyr(&self) -> usize {
        self.nlyr
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn crs_kind(&self) -> CrsKind {
        self.crs_kind
    }

    pub fn is_lonlat(&self) -> bool {
        self.crs_kind.is_lonlat()
    }

    /// Cell width in the grid's native linear unit.
    pub fn xres(&self) -> f64 {
        self.extent.width() / self.ncol() as f64
    }

    /// Cell height in the grid's native linear unit.
    pub fn yres(&self) -> f64 {
        self.extent.height() / self.nrow() as f64
    }

    /// A geographic raster whose columns span (approximately) a full 360 degrees of longitude,
    /// making the last column adjacent to the first ("wraps at the antimeridian").
    pub fn is_global_lonlat(&self) -> bool {
        self.is_lonlat() && self.extent.width() >= 360.0 - GLOBAL_EXTENT_EPS
    }

    /// Which pole(s), if any, this geographic grid's extent reaches.
    pub fn ns_polar(&self) -> PoleCoverage {
        if !self.is_lonlat() {
            return PoleCoverage::None;
        }
        let north = self.extent.ymax >= 90.0 - POLE_EPS;
        let south = self.extent.ymin <= -90.0 + POLE_EPS;
        match (north, south) {
            (true, true) => PoleCoverage::Both,
            (true, false) => PoleCoverage::North,
            (false, true) => PoleCoverage::South,
            (false, false) => PoleCoverage::None,
        }
    }

    /// The latitude (or planar y-coordinate) at the center of `row`, row 0 being the top row.
    pub fn y_from_row(&self, row: i32) -> f64 {
        self.extent.ymax - (row as f64 + 0.5) * self.yres()
    }

    /// The longitude (or planar x-coordinate) at the center of `col`, col 0 being the leftmost column.
    pub fn x_from_col(&self, col: i32) -> f64 {
        self.extent.xmin + (col as f64 + 0.5) * self.xres()
    }

    pub fn rows(&self) -> Rows {
        self.size.rows
    }

    pub fn cols(&self) -> Columns {
        self.size.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::{Columns, Rows};

    fn planar_grid(nrow: i32, ncol: i32) -> RasterGrid {
        RasterGrid::new(
            RasterSize::with_rows_cols(Rows(nrow), Columns(ncol)),
            1,
            Extent::new(0.0, ncol as f64, 0.0, nrow as f64),
            CrsKind::Planar { meters_per_unit: 1.0 },
        )
    }

    #[test]
    fn resolution() {
        let g = planar_grid(5, 5);
        assert_eq!(g.xres(), 1.0);
        assert_eq!(g.yres(), 1.0);
    }

    #[test]
    fn global_lonlat_detection() {
        let g = RasterGrid::new(
            RasterSize::with_rows_cols(Rows(1), Columns(360)),
            1,
            Extent::new(-180.0, 180.0, -0.5, 0.5),
            CrsKind::Geographic,
        );
        assert!(g.is_global_lonlat());
        assert_eq!(g.ns_polar(), PoleCoverage::None);
    }

    #[test]
    fn pole_coverage() {
        let g = RasterGrid::new(
            RasterSize::with_rows_cols(Rows(180), Columns(360)),
            1,
            Extent::new(-180.0, 180.0, -90.0, 90.0),
            CrsKind::Geographic,
        );
        assert_eq!(g.ns_polar(), PoleCoverage::Both);
        assert!(g.ns_polar().north());
        assert!(g.ns_polar().south());
    }

    #[test]
    fn y_from_row_matches_cell_centers() {
        let g = planar_grid(5, 5);
        assert_eq!(g.y_from_row(0), 4.5);
        assert_eq!(g.y_from_row(4), 0.5);
    }

    #[test]
    fn x_from_col_matches_cell_centers() {
        let g = planar_grid(5, 5);
        assert_eq!(g.x_from_col(0), 0.5);
        assert_eq!(g.x_from_col(4), 4.5);
    }

    #[test]
    fn planar_is_never_global_or_polar() {
        let g = planar_grid(3, 3);
        assert!(!g.is_global_lonlat());
        assert_eq!(g.ns_polar(), PoleCoverage::None);
    }
}
