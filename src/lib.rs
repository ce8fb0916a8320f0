//! Bounded, timer-driven network-reachability monitoring.
//!
//! [`ReachabilityMonitor`] periodically probes a target endpoint and reports
//! the first definitive answer - reachable or not - through a one-shot
//! callback, giving up silently after a configured number of attempts. The
//! scheduler and transport are injected through narrow factory traits;
//! production implementations backed by tokio and reqwest ship in [`io`].
//!
//! ```ignore
//! use reachability_monitor::{MonitorConfig, ReachabilityMonitor};
//!
//! let monitor = ReachabilityMonitor::over_http(MonitorConfig::default())?;
//! monitor.set_sink(|reachable| println!("network reachable: {reachable}"));
//! monitor.start();
//! ```

pub mod config;
pub mod io;
pub mod monitor;

pub use config::MonitorConfig;
pub use io::{HttpProbeFactory, TokioTimerFactory};
pub use monitor::{
    ProbeCompletion, ProbeFactory, ProbeOutcome, ProbeTask, ReachabilityMonitor, ReachabilitySink,
    TickHandler, Timer, TimerFactory, channel_sink,
};
