//! Production implementations of the injected seams.
//!
//! - [`TokioTimerFactory`] - repeating timer on the tokio runtime
//! - [`HttpProbeFactory`] - HTTP GET probes over reqwest

pub mod http_probe;
pub mod tokio_timer;

pub use http_probe::HttpProbeFactory;
pub use tokio_timer::TokioTimerFactory;
