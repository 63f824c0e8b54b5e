//! Monitor orchestrating one scheduling unit per configured service

use crate::errors::Result;
use crate::models::{CheckResult, CheckStatus, MAX_CHECK_PERIOD, ServiceSpec};
use crate::prober::{HttpProber, Probe};
use crate::store::ResultStore;

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Lifecycle of a [`Monitor`]. There is no way back from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    NotStarted,
    Running,
    Stopped,
}

#[derive(Debug)]
struct Lifecycle {
    state: MonitorState,
    units: Vec<JoinHandle<()>>,
}

/// Runs periodic checks for every configured service and keeps the latest
/// result of each in a shared [`ResultStore`].
///
/// Construct once and share behind an `Arc`; the read side
/// ([`Monitor::results`], [`Monitor::results_list`]) may be called from any
/// number of tasks in any lifecycle state.
pub struct Monitor {
    services: Vec<ServiceSpec>,
    store: Arc<ResultStore>,
    prober: Arc<dyn Probe>,
    shutdown_tx: watch::Sender<bool>,
    lifecycle: Mutex<Lifecycle>,
}

impl Monitor {
    /// Create a monitor probing over HTTP
    pub fn new(services: Vec<ServiceSpec>) -> Result<Self> {
        Ok(Self::with_prober(services, Arc::new(HttpProber::new()?)))
    }

    /// Create a monitor with a custom probe implementation
    pub fn with_prober(services: Vec<ServiceSpec>, prober: Arc<dyn Probe>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            services,
            store: Arc::new(ResultStore::new()),
            prober,
            shutdown_tx,
            lifecycle: Mutex::new(Lifecycle {
                state: MonitorState::NotStarted,
                units: Vec::new(),
            }),
        }
    }

    /// Seed a placeholder for every service, then spawn one scheduling unit
    /// per service.
    ///
    /// Only the first call has any effect; later calls, including calls after
    /// [`Monitor::stop`], are ignored with a warning.
    pub async fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.state != MonitorState::NotStarted {
            warn!("Ignoring start request, monitor is {:?}", lifecycle.state);
            return;
        }

        for spec in &self.services {
            self.store.upsert(CheckResult::pending(spec)).await;
        }

        for spec in &self.services {
            let unit = ServiceUnit {
                spec: spec.clone(),
                store: Arc::clone(&self.store),
                prober: Arc::clone(&self.prober),
                shutdown: self.shutdown_tx.subscribe(),
                last_status: None,
            };
            let span = info_span!("service", name = %spec.name);
            lifecycle.units.push(tokio::spawn(unit.run().instrument(span)));
        }

        lifecycle.state = MonitorState::Running;
        info!("Monitoring started for {} services", self.services.len());
    }

    /// Signal every scheduling unit to stop and wait until all have exited.
    ///
    /// Probes still in flight are abandoned without writing a result, so no
    /// store writes happen once this returns.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        match lifecycle.state {
            MonitorState::Running => {}
            MonitorState::NotStarted => {
                lifecycle.state = MonitorState::Stopped;
                info!("Monitor stopped before it was started");
                return;
            }
            MonitorState::Stopped => {
                warn!("Ignoring stop request, monitor already stopped");
                return;
            }
        }

        info!("Stopping {} scheduling units", lifecycle.units.len());
        self.shutdown_tx.send_replace(true);

        let units = std::mem::take(&mut lifecycle.units);
        for outcome in join_all(units).await {
            if let Err(e) = outcome {
                error!("Scheduling unit ended abnormally: {}", e);
            }
        }

        lifecycle.state = MonitorState::Stopped;
        info!("Monitor stopped");
    }

    pub async fn state(&self) -> MonitorState {
        self.lifecycle.lock().await.state
    }

    /// Copy of the latest result per service name
    pub async fn results(&self) -> HashMap<String, CheckResult> {
        self.store.snapshot_map().await
    }

    /// Copy of the latest results, unordered
    pub async fn results_list(&self) -> Vec<CheckResult> {
        self.store.snapshot_list().await
    }

    pub async fn result(&self, service_name: &str) -> Option<CheckResult> {
        self.store.get(service_name).await
    }

    /// Configured services in configuration order
    pub fn services(&self) -> &[ServiceSpec] {
        &self.services
    }
}

/// Per-service loop: probe now, then on every tick until shutdown
struct ServiceUnit {
    spec: ServiceSpec,
    store: Arc<ResultStore>,
    prober: Arc<dyn Probe>,
    shutdown: watch::Receiver<bool>,
    last_status: Option<CheckStatus>,
}

impl ServiceUnit {
    async fn run(mut self) {
        info!(
            "Checking {} {} every {:?} (timeout {:?})",
            self.spec.method, self.spec.url, self.spec.check_interval, self.spec.timeout
        );

        let period = self
            .spec
            .check_interval
            .clamp(Duration::from_millis(1), MAX_CHECK_PERIOD);
        let mut ticker = interval_at(Instant::now() + period, period);
        // A probe overrunning its interval yields at most one catch-up tick, never a backlog.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if self.check().await {
            loop {
                tokio::select! {
                    biased;
                    _ = self.shutdown.changed() => break,
                    _ = ticker.tick() => {
                        if !self.check().await {
                            break;
                        }
                    }
                }
            }
        }

        info!("Scheduling unit exited");
    }

    /// Run one probe and store its result. Returns `false` once shutdown has
    /// been signalled, in which case nothing is stored.
    async fn check(&mut self) -> bool {
        if *self.shutdown.borrow() {
            return false;
        }

        let result = tokio::select! {
            biased;
            _ = self.shutdown.changed() => return false,
            result = self.prober.probe(&self.spec) => result,
        };

        self.record_transition(&result);
        self.store.upsert(result).await;
        true
    }

    fn record_transition(&mut self, result: &CheckResult) {
        let previous = self.last_status.replace(result.status);

        match (previous, result.status) {
            (Some(before), after) if before == after => {
                debug!("Service still {} ({})", after, result.message);
            }
            (_, CheckStatus::Down) => {
                warn!("Service is down: {}", result.message);
            }
            (_, status) => {
                info!(
                    "Service is {} (status {}, {}ms)",
                    status, result.status_code, result.response_time_ms
                );
            }
        }
    }
}
