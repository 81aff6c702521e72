use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_core::Latency;
use courier_logging::{courier_debug, courier_info};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{LatencySink, SettingsStore};

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub endpoint: String,
    pub interval: Duration,
    pub connect_timeout: Duration,
    /// Kept at the interval so a hung request skips one cycle at most.
    pub request_timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://discord.com/api/v9/gateway".to_string(),
            interval: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("invalid probe endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("probe timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

/// Measures one round trip to a remote endpoint.
#[async_trait::async_trait]
pub trait LatencyProbe: Send + Sync {
    async fn probe(&self) -> Result<Duration, ProbeError>;
}

/// Unauthenticated `HEAD` request; any HTTP status counts as a round trip.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    endpoint: String,
    client: reqwest::Client,
}

impl ReqwestProbe {
    pub fn new(settings: &ProbeSettings) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ProbeError::Network(err.to_string()))?;
        Ok(Self {
            endpoint: settings.endpoint.clone(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl LatencyProbe for ReqwestProbe {
    async fn probe(&self) -> Result<Duration, ProbeError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|err| ProbeError::InvalidEndpoint(err.to_string()))?;
        let started = Instant::now();
        self.client
            .head(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Ok(started.elapsed())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        return ProbeError::Timeout;
    }
    ProbeError::Network(err.to_string())
}

/// Runs one probe; failures become [`Latency::NoSignal`] instead of errors.
pub async fn measure(probe: &dyn LatencyProbe) -> Latency {
    match probe.probe().await {
        Ok(elapsed) => Latency::Millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
        Err(err) => {
            courier_debug!("latency probe failed: {err}");
            Latency::NoSignal
        }
    }
}

/// Background task probing latency on a fixed interval while the `pingTest`
/// flag is on. The flag is re-read every cycle.
pub struct LatencyMonitor {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl LatencyMonitor {
    /// Must be called within a tokio runtime. The first probe fires after one interval.
    pub fn spawn(
        probe: Arc<dyn LatencyProbe>,
        settings: Arc<dyn SettingsStore>,
        sink: Arc<dyn LatencySink>,
        interval: Duration,
    ) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !settings.load().ping_test {
                    continue;
                }
                let latency = tokio::select! {
                    _ = token.cancelled() => break,
                    latency = measure(probe.as_ref()) => latency,
                };
                sink.update(latency);
            }
            courier_info!("latency monitor stopped");
        });
        Self { cancel, handle }
    }

    /// Cancels the task, including any in-flight probe, and waits for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
