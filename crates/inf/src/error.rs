use thiserror::Error;

/// Error taxonomy shared by every crate in the workspace.
///
/// The sweep kernels distinguish between input the caller can fix (`InvalidArgument`),
/// I/O failures surfaced by a reader/writer collaborator (`IOError`), and everything
/// else that is a genuine bug or unrecoverable runtime condition (`Runtime`).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Raster dimensions do not match ({}x{}) <-> ({}x{})", .size1.0, .size1.1, .size2.0, .size2.1)]
    SizeMismatch {
        size1: (usize, usize),
        size2: (usize, usize),
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Invalid string: {0}")]
    InvalidString(#[from] std::ffi::NulError),
    #[error("System time error")]
    TimeError(#[from] std::time::SystemTimeError),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
}
