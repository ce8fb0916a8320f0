//! Reachability monitoring core.
//!
//! This module holds the transport-agnostic pieces:
//! - `traits` - the injected timer/probe seams and callback type aliases
//! - `reachability` - the [`ReachabilityMonitor`] itself

pub mod reachability;
pub mod traits;

pub use reachability::ReachabilityMonitor;
pub use traits::{
    ProbeCompletion, ProbeFactory, ProbeOutcome, ProbeTask, ReachabilitySink, TickHandler, Timer,
    TimerFactory,
};

use crossbeam::channel::{Receiver, bounded};

/// Builds a sink that forwards the verdict into a bounded channel.
///
/// For owners that would rather poll for the result than install a closure.
pub fn channel_sink() -> (ReachabilitySink, Receiver<bool>) {
    let (tx, rx) = bounded(1);
    let sink: ReachabilitySink = Box::new(move |reachable| {
        let _ = tx.send(reachable);
    });
    (sink, rx)
}
