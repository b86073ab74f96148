//! Streaming raster geoprocessing core: distance sweeps, cost-weighted distance, direct
//! distance/direction to a vector feature, edge extraction and terrain derivatives.
//!
//! Every operator is a free function over a `RasterReader`/`RasterWriter` pair plus a
//! `BlockPlan`, so the engine never assumes a whole grid fits in memory at once. The
//! `InMemory*` types in [`io`] exist for tests and small in-process runs; production file
//! formats, compression and CRS parsing live in a driver layer outside this crate.
pub type Error = inf::Error;
pub type Result<T = ()> = inf::Result<T>;

mod block;
mod blockplan;
pub mod directdistance;
pub mod edges;
mod neighbor;
pub mod io;
pub mod output;
pub mod sweep;
pub mod terrain;
pub mod vectorsource;

#[doc(inline)]
pub use block::RasterBlock;
#[doc(inline)]
pub use blockplan::{BlockPlan, BlockSpec};
#[doc(inline)]
pub use directdistance::{direct_direction, direct_distance, AngleUnit, AzimuthReference};
#[doc(inline)]
pub use edges::{edges, Connectivity, EdgeMode, EdgeOptions};
#[doc(inline)]
pub use neighbor::NeighborSteps;
#[doc(inline)]
pub use output::{OperatorOutput, Warning};
#[doc(inline)]
pub use sweep::costdistance::{cost_distance, CostDistanceOptions};
#[doc(inline)]
pub use sweep::euclidean::grid_distance;
#[doc(inline)]
pub use terrain::{aspect, flow_direction, roughness, slope, tpi, tri, SlopeAlgorithm};
#[doc(inline)]
pub use vectorsource::{InMemoryVectorSource, PointSet, VectorKind, VectorSource};
