pub use error::Error;
pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod cast;
pub mod duration;
mod error;
pub mod fs;
pub mod progress;

#[doc(inline)]
pub use duration::Recorder;
#[doc(inline)]
pub use progress::{CancellationToken, ProgressCounter};
