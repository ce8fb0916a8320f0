//! HTTP reachability probes over reqwest.
//!
//! One probe is one GET against the configured target. Any HTTP response,
//! whatever the status, counts as a completed exchange and reaches the
//! completion as `Ok(status)`; transport-level failures (DNS, connect,
//! timeout) arrive as `Err`. A cancelled probe delivers nothing.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

use crate::monitor::traits::{ProbeCompletion, ProbeFactory, ProbeTask};

/// Produces [`HttpProbe`]s sharing one connection pool and timeout.
pub struct HttpProbeFactory {
    client: Client,
}

impl HttpProbeFactory {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for reachability probes")?;
        Ok(Self { client })
    }
}

impl ProbeFactory for HttpProbeFactory {
    fn probe(&self, target: &Url, on_complete: ProbeCompletion) -> Arc<dyn ProbeTask> {
        Arc::new(HttpProbe {
            client: self.client.clone(),
            target: target.clone(),
            completion: Mutex::new(Some(on_complete)),
            cancelled: AtomicBool::new(false),
            task: Mutex::new(None),
        })
    }
}

/// One not-yet-started or in-flight HTTP reachability check.
pub struct HttpProbe {
    client: Client,
    target: Url,
    completion: Mutex<Option<ProbeCompletion>>,
    cancelled: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ProbeTask for HttpProbe {
    fn resume(&self) {
        let Some(completion) = self.completion.lock().unwrap().take() else {
            // already resumed, or cancelled before start
            return;
        };

        let client = self.client.clone();
        let target = self.target.clone();
        let handle = tokio::spawn(async move {
            debug!("reachability probe GET {target}");
            let outcome = match client.get(target.clone()).send().await {
                Ok(response) => Ok(response.status().as_u16()),
                Err(error) => Err(anyhow::Error::new(error)
                    .context(format!("reachability probe against {target} failed"))),
            };
            completion(outcome);
        });

        let mut task = self.task.lock().unwrap();
        if self.cancelled.load(Ordering::SeqCst) {
            // cancel raced the spawn
            handle.abort();
        } else {
            *task = Some(handle);
        }
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        // not yet resumed: drop the completion so it can never fire
        self.completion.lock().unwrap().take();
        if let Some(task) = self.task.lock().unwrap().take() {
            debug!("reachability probe cancelled");
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::monitor::{ReachabilityMonitor, channel_sink};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Instant;
    use tokio::sync::oneshot;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    /// Serves exactly one HTTP response on a loopback socket, then exits.
    fn one_shot_http_server(status_line: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let response =
                    format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    #[tokio::test]
    async fn test_completed_probe_reports_the_response_status() {
        let target = one_shot_http_server("HTTP/1.1 204 No Content");
        let factory = HttpProbeFactory::new(Duration::from_secs(5)).unwrap();

        let (tx, rx) = oneshot::channel();
        let probe = factory.probe(
            &target,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );
        probe.resume();

        let outcome = tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.unwrap(), 204);
    }

    #[tokio::test]
    async fn test_transport_failure_reports_an_error() {
        // port 0 is never connectable
        let target = Url::parse("http://127.0.0.1:0/").unwrap();
        let factory = HttpProbeFactory::new(Duration::from_secs(5)).unwrap();

        let (tx, rx) = oneshot::channel();
        let probe = factory.probe(
            &target,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );
        probe.resume();

        let outcome = tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_probe_never_completes() {
        let target = Url::parse("http://127.0.0.1:0/").unwrap();
        let factory = HttpProbeFactory::new(Duration::from_secs(5)).unwrap();

        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let probe = factory.probe(
            &target,
            Box::new(move |_| {
                flag.store(true, Ordering::SeqCst);
            }),
        );

        probe.cancel();
        probe.cancel(); // idempotent
        probe.resume();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_monitor_over_http_reports_reachable() {
        init_tracing();
        let target = one_shot_http_server("HTTP/1.1 200 OK");
        let config = MonitorConfig {
            target,
            ..MonitorConfig::default()
        };

        let monitor = ReachabilityMonitor::over_http(config).unwrap();
        let (sink, rx) = channel_sink();
        monitor.set_sink(sink);
        monitor.start();

        let deadline = Instant::now() + Duration::from_secs(5);
        let verdict = loop {
            if let Ok(verdict) = rx.try_recv() {
                break verdict;
            }
            assert!(Instant::now() < deadline, "no verdict within deadline");
            tokio::time::sleep(Duration::from_millis(20)).await;
        };
        assert!(verdict);
    }
}
