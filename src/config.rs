//! Configuration for the reachability monitor.

use std::time::Duration;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_TARGET: &str = "https://www.google.com";
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Immutable settings for one [`ReachabilityMonitor`](crate::ReachabilityMonitor).
///
/// Serde derives let the struct sit inside an application's configuration
/// file; every field falls back to its default when omitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Endpoint probed for reachability.
    pub target: Url,
    /// Period of the repeating timer driving probe dispatch.
    pub tick_interval: Duration,
    /// Transport timeout applied to each individual probe.
    pub probe_timeout: Duration,
    /// Number of timer firings allowed before the monitor gives up.
    pub max_iterations: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target: Url::parse(DEFAULT_TARGET).expect("default target URL is valid"),
            tick_interval: DEFAULT_TICK_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl MonitorConfig {
    /// Rejects configurations a monitor cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_iterations == 0 {
            bail!("max_iterations must be positive");
        }
        if self.tick_interval.is_zero() {
            bail!("tick_interval must be non-zero");
        }
        if self.probe_timeout.is_zero() {
            bail!("probe_timeout must be non-zero");
        }
        Ok(())
    }
}
