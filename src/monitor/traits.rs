//! Injected capability seams for the reachability monitor.
//!
//! The monitor never touches a concrete scheduler or transport. It is
//! parameterized over two narrow, object-safe trait pairs:
//!
//! - [`TimerFactory`] / [`Timer`] - a repeating timer with `{fire, invalidate}`
//! - [`ProbeFactory`] / [`ProbeTask`] - a cancellable network check with `{resume, cancel}`
//!
//! Production implementations live in [`crate::io`]; tests substitute fakes.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

/// Handler invoked once per timer firing.
pub type TickHandler = Arc<dyn Fn() + Send + Sync>;

/// Outcome of a completed probe: the HTTP status code of the exchange, or
/// the transport error that prevented one.
pub type ProbeOutcome = anyhow::Result<u16>;

/// Completion invoked at most once, when a probe finishes without being
/// cancelled.
pub type ProbeCompletion = Box<dyn FnOnce(ProbeOutcome) + Send>;

/// One-shot sink receiving the monitor's single reachability verdict.
pub type ReachabilitySink = Box<dyn FnOnce(bool) + Send>;

/// A repeating timer handle.
///
/// `fire` triggers the tick handler immediately, outside the regular
/// schedule. `invalidate` stops all future firings, `fire` included; it is
/// idempotent.
pub trait Timer: Send + Sync {
    fn fire(&self);
    fn invalidate(&self);
}

/// Produces repeating timers bound to a tick handler.
pub trait TimerFactory: Send + Sync {
    fn repeating(&self, period: Duration, on_tick: TickHandler) -> Arc<dyn Timer>;
}

/// A single cancellable reachability check.
///
/// `resume` starts execution; the monitor calls it at most once per task.
/// `cancel` is a best-effort abort: a cancelled task never delivers its
/// completion, and cancelling a task that already completed is a no-op.
pub trait ProbeTask: Send + Sync {
    fn resume(&self);
    fn cancel(&self);
}

/// Produces probe tasks against a target endpoint.
pub trait ProbeFactory: Send + Sync {
    fn probe(&self, target: &Url, on_complete: ProbeCompletion) -> Arc<dyn ProbeTask>;
}
