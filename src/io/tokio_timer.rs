//! Tokio-backed repeating timer.
//!
//! [`TokioTimerFactory`] produces [`Timer`]s driven by a spawned task and
//! [`tokio::time::interval`], so creating one requires an ambient tokio
//! runtime. The interval's immediate first tick is consumed at spawn:
//! periodic firings start one full period after creation, and the
//! fire-on-start behavior the monitor wants goes through [`Timer::fire`].

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

use crate::monitor::traits::{TickHandler, Timer, TimerFactory};

/// Produces [`TokioTimer`]s. Stateless; share freely.
pub struct TokioTimerFactory;

impl TimerFactory for TokioTimerFactory {
    fn repeating(&self, period: Duration, on_tick: TickHandler) -> Arc<dyn Timer> {
        Arc::new(TokioTimer::spawn(period, on_tick))
    }
}

/// A repeating timer whose schedule lives in a spawned tokio task.
pub struct TokioTimer {
    on_tick: TickHandler,
    invalidated: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TokioTimer {
    fn spawn(period: Duration, on_tick: TickHandler) -> Self {
        let invalidated = Arc::new(AtomicBool::new(false));

        let flag = invalidated.clone();
        let tick = on_tick.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.tick().await; // consume the immediate first tick
            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                tick();
            }
        });

        Self {
            on_tick,
            invalidated,
            task: Mutex::new(Some(task)),
        }
    }
}

impl Timer for TokioTimer {
    fn fire(&self) {
        if self.invalidated.load(Ordering::SeqCst) {
            return;
        }
        (self.on_tick)();
    }

    fn invalidate(&self) {
        if self.invalidated.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("repeating timer invalidated");
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.invalidate();
    }
}
