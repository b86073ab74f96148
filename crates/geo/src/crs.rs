/// The kind of spatial reference a raster grid is defined in.
///
/// The core never parses or transforms CRS definitions itself (that belongs to
/// the driver layer); it only needs to know which distance math applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrsKind {
    /// A projected/planar CRS where one linear unit maps to `meters_per_unit` meters.
    Planar { meters_per_unit: f64 },
    /// A geographic (longitude/latitude) CRS.
    Geographic,
    /// No CRS information is available; treated like `Planar` with unit meters.
    Unknown,
}

impl CrsKind {
    pub fn is_lonlat(&self) -> bool {
        matches!(self, CrsKind::Geographic)
    }

    /// The scalar to multiply a linear-unit resolution by to get meters.
    /// Meaningless (returns 1.0) for geographic CRSs, which use the geodesy kernel instead.
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            CrsKind::Planar { meters_per_unit } => *meters_per_unit,
            CrsKind::Geographic | CrsKind::Unknown => 1.0,
        }
    }
}
