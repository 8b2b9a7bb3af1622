/// Periodic smart playlist refresh
use crate::services::SmartPlaylistService;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Owned handle for the refresh timer
///
/// The first pass runs one full interval after [`start`](Self::start).
pub struct SmartPlaylistRefresher {
    service: SmartPlaylistService,
    period: Duration,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SmartPlaylistRefresher {
    pub fn new(service: SmartPlaylistService, period: Duration) -> Self {
        Self {
            service,
            period,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawn the timer task; calling it again while running does nothing
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let service = self.service.clone();
        let period = self.period;

        tracing::info!(
            "Smart playlist refresh scheduled every {}s",
            period.as_secs()
        );

        self.task = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(e) = service.refresh_all().await {
                            tracing::warn!("Smart playlist refresh failed: {}", e);
                        }
                    }
                }
            }

            tracing::info!("Smart playlist refresh stopped");
        }));
    }

    /// Cancel the timer and wait for an in-flight pass to finish
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Smart playlist refresh task ended abnormally: {}", e);
            }
        }
    }
}
