use geo::RasterGrid;

/// Edge weights from a cell to its east, south and south-east neighbor at a given row.
///
/// Constant across rows for a planar grid; for a geographic grid these vary with
/// latitude, so the sweep kernels recompute them once per row rather than once per grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborSteps {
    pub dx: f64,
    pub dy: f64,
    pub dxy: f64,
}

impl NeighborSteps {
    /// The step values for cost distance are the *half*-step on each side of an edge
    /// (the full edge weight is `step * (friction_a + friction_b)`, see costdistance.rs).
    pub fn halved(self) -> Self {
        NeighborSteps {
            dx: self.dx / 2.0,
            dy: self.dy / 2.0,
            dxy: self.dxy / 2.0,
        }
    }

    pub fn for_row(grid: &RasterGrid, row: i32) -> NeighborSteps {
        if grid.is_lonlat() {
            geographic_steps(grid, row)
        } else {
            planar_steps(grid)
        }
    }
}

fn planar_steps(grid: &RasterGrid) -> NeighborSteps {
    let unit = grid.crs_kind().meters_per_unit();
    let dx = grid.xres() * unit;
    let dy = grid.yres() * unit;
    NeighborSteps {
        dx,
        dy,
        dxy: (dx * dx + dy * dy).sqrt(),
    }
}

/// Geodesic step lengths at `row`'s center latitude.
///
/// `dy`/`dxy` go to `+inf` rather than `NaN` at the poles, so a min-plus relaxation
/// that adds an edge weight to an unreachable cell never silently picks it as a minimum.
fn geographic_steps(grid: &RasterGrid, row: i32) -> NeighborSteps {
    let lat = grid.y_from_row(row);
    let lon0 = grid.extent().xmin;
    let dlon = grid.xres();
    let dlat = grid.yres();

    let dx = geodesy::distance_geo(lon0, lat, lon0 + dlon, lat);
    let dy = geodesy::distance_geo(lon0, lat, lon0, lat - dlat);
    let dxy = geodesy::distance_geo(lon0, lat, lon0 + dlon, lat - dlat);

    let finite_or_inf = |v: f64| if v.is_nan() { f64::INFINITY } else { v };
    NeighborSteps {
        dx: finite_or_inf(dx),
        dy: finite_or_inf(dy),
        dxy: finite_or_inf(dxy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn planar_unit_grid_has_unit_steps() {
        let grid = planar_grid(5, 5);
        let steps = NeighborSteps::for_row(&grid, 2);
        assert_relative_eq!(steps.dx, 1.0);
        assert_relative_eq!(steps.dy, 1.0);
        assert_relative_eq!(steps.dxy, std::f64::consts::SQRT_2);
    }

    #[test]
    fn halving_divides_every_component() {
        let steps = NeighborSteps { dx: 2.0, dy: 4.0, dxy: 6.0 }.halved();
        assert_relative_eq!(steps.dx, 1.0);
        assert_relative_eq!(steps.dy, 2.0);
        assert_relative_eq!(steps.dxy, 3.0);
    }

    #[test]
    fn geographic_steps_shrink_with_dx_toward_the_pole() {
        let grid = RasterGrid::new(
            RasterSize::with_rows_cols(Rows(180), Columns(360)),
            1,
            Extent::new(-180.0, 180.0, -90.0, 90.0),
            CrsKind::Geographic,
        );
        let equator = NeighborSteps::for_row(&grid, 90);
        let near_pole = NeighborSteps::for_row(&grid, 1);
        assert!(near_pole.dx < equator.dx, "a degree of longitude shrinks near the pole");
    }
}
