//! Bounded, timer-driven network-reachability monitoring.
//!
//! [`ReachabilityMonitor`] answers one question: did the network come back
//! within N attempts? On [`start`](ReachabilityMonitor::start) it creates a
//! repeating timer and fires it immediately. Every firing dispatches one
//! cancellable probe against the configured target, replacing the previous
//! one. The first probe that completes - with any HTTP status or a transport
//! error - ends the run and reports a single boolean through the sink. If
//! `max_iterations` firings pass without a completed probe, the monitor
//! halts silently: no verdict is ever reported.
//!
//! ```text
//!                ┌─────── tick (count ≤ max) ───────┐
//!                ▼                                  │
//! start() ──► timer fires ──► probe dispatched ─────┘
//!                │                    │
//!     count > max│                    │ completes (status / error)
//!                ▼                    ▼
//!            Exhausted            Answered ──► sink(reachable)
//!           (no report)
//! ```
//!
//! Terminal states are absorbing: once the monitor has stopped - answer,
//! exhaustion, [`stop`](ReachabilityMonitor::stop) or drop - later ticks and
//! completions are discarded and the sink can no longer fire. Dropping the
//! last handle tears down the timer and any in-flight probe.

use std::sync::{Arc, Mutex, Weak};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::monitor::traits::{
    ProbeFactory, ProbeOutcome, ProbeTask, ReachabilitySink, TickHandler, Timer, TimerFactory,
};

/// Statuses counted as proof of reachability.
fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

#[derive(Default)]
struct MonitorInner {
    iterations: u32,
    timer: Option<Arc<dyn Timer>>,
    active_probe: Option<Arc<dyn ProbeTask>>,
    stopped: bool,
    sink: Option<ReachabilitySink>,
}

/// Polls a target endpoint until it gets one definitive answer or runs out
/// of attempts.
///
/// The timer and probe transport are injected through
/// [`TimerFactory`]/[`ProbeFactory`]; [`over_http`](Self::over_http) wires
/// the production implementations. All state mutation is serialized behind
/// one mutex, so a tick racing a probe completion resolves cleanly in favor
/// of whichever gets there first.
pub struct ReachabilityMonitor {
    config: MonitorConfig,
    probe_factory: Arc<dyn ProbeFactory>,
    timer_factory: Arc<dyn TimerFactory>,
    // handed to the tick/completion closures so they never keep the
    // monitor alive
    weak_self: Weak<ReachabilityMonitor>,
    inner: Mutex<MonitorInner>,
}

impl ReachabilityMonitor {
    pub fn new(
        config: MonitorConfig,
        probe_factory: Arc<dyn ProbeFactory>,
        timer_factory: Arc<dyn TimerFactory>,
    ) -> anyhow::Result<Arc<Self>> {
        config
            .validate()
            .context("invalid reachability monitor configuration")?;

        Ok(Arc::new_cyclic(|weak| Self {
            config,
            probe_factory,
            timer_factory,
            weak_self: weak.clone(),
            inner: Mutex::new(MonitorInner::default()),
        }))
    }

    /// Builds a monitor wired to the tokio timer and the reqwest HTTP probe.
    ///
    /// Must be called within a tokio runtime.
    pub fn over_http(config: MonitorConfig) -> anyhow::Result<Arc<Self>> {
        let probes = Arc::new(crate::io::HttpProbeFactory::new(config.probe_timeout)?);
        Self::new(config, probes, Arc::new(crate::io::TokioTimerFactory))
    }

    /// Installs the sink receiving the single reachability verdict.
    ///
    /// The sink fires at most once per monitor lifetime, and runs on
    /// whatever thread delivers the probe completion; redispatching to
    /// another execution context is the caller's concern.
    pub fn set_sink(&self, sink: impl FnOnce(bool) + Send + 'static) {
        self.inner.lock().unwrap().sink = Some(Box::new(sink));
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.lock().unwrap().stopped
    }

    /// Starts polling. The timer fires immediately: the first tick happens
    /// during this call and dispatches the first probe.
    ///
    /// Calling `start` again, or on a monitor that already stopped, leaves
    /// the existing state untouched.
    pub fn start(&self) {
        let weak = self.weak_self.clone();
        let on_tick: TickHandler = Arc::new(move || {
            if let Some(monitor) = weak.upgrade() {
                monitor.tick();
            }
        });

        let timer = {
            let mut inner = self.inner.lock().unwrap();
            if inner.stopped {
                warn!("start() called on a stopped reachability monitor");
                return;
            }
            if inner.timer.is_some() {
                warn!("start() called twice; keeping the existing timer");
                return;
            }
            let timer = self
                .timer_factory
                .repeating(self.config.tick_interval, on_tick);
            inner.timer = Some(timer.clone());
            timer
        };

        info!(
            "reachability monitor started: target={} max_iterations={}",
            self.config.target, self.config.max_iterations
        );
        timer.fire();
    }

    /// Halts the monitor: invalidates the timer, cancels any in-flight
    /// probe, and drops the sink uninvoked. Safe to call at any time, any
    /// number of times.
    pub fn stop(&self) {
        let (timer, probe) = {
            let mut inner = self.inner.lock().unwrap();
            inner.stopped = true;
            inner.sink = None;
            (inner.timer.take(), inner.active_probe.take())
        };

        if let Some(timer) = timer {
            timer.invalidate();
        }
        if let Some(probe) = probe {
            probe.cancel();
        }
    }

    fn tick(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.stopped {
            return;
        }
        inner.iterations += 1;

        if inner.iterations > self.config.max_iterations {
            let timer = inner.timer.take();
            let pending = inner.active_probe.take();
            inner.stopped = true;
            drop(inner);

            info!(
                "no reachability answer after {} attempts, giving up",
                self.config.max_iterations
            );
            if let Some(timer) = timer {
                timer.invalidate();
            }
            if let Some(pending) = pending {
                pending.cancel();
            }
            return;
        }

        debug!(
            "reachability probe {}/{} -> {}",
            inner.iterations, self.config.max_iterations, self.config.target
        );

        let weak = self.weak_self.clone();
        let probe = self.probe_factory.probe(
            &self.config.target,
            Box::new(move |outcome| {
                if let Some(monitor) = weak.upgrade() {
                    monitor.complete(outcome);
                }
            }),
        );
        let previous = inner.active_probe.replace(probe.clone());
        drop(inner);

        if let Some(previous) = previous {
            previous.cancel();
        }
        probe.resume();
    }

    fn complete(&self, outcome: ProbeOutcome) {
        let reachable = match &outcome {
            Ok(status) => is_success(*status),
            Err(_) => false,
        };

        let (timer, sink) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.stopped {
                debug!("probe completion after stop discarded");
                return;
            }
            inner.stopped = true;
            inner.active_probe = None;
            (inner.timer.take(), inner.sink.take())
        };

        if let Some(timer) = timer {
            timer.invalidate();
        }

        match outcome {
            Ok(status) => info!("reachability probe answered with status {status}: reachable={reachable}"),
            Err(error) => warn!("reachability probe failed: {error:#}"),
        }

        if let Some(sink) = sink {
            sink(reachable);
        }
    }
}

impl Drop for ReachabilityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
