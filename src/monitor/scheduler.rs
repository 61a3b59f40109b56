use super::{CycleFault, CycleReport, Lifecycle, LifecycleError, MonitorEvent, Status};
use crate::capture::PacketSource;
use crate::classify::{ClassificationAdapter, Prediction};
use crate::config::MonitorConfig;
use crate::features::{FeatureExtractor, FeatureVector};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 256;

struct Inner {
    lifecycle: Lifecycle,
    status: Status,
    session: Uuid,
    /// Bumped on every start; a task whose epoch is stale exits.
    epoch: u64,
    cycle: u64,
    series: Vec<CycleReport>,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    inner: Mutex<Inner>,
    wake: Notify,
    events: broadcast::Sender<MonitorEvent>,
    source: Arc<Mutex<Box<dyn PacketSource>>>,
    extractor: FeatureExtractor,
    adapter: ClassificationAdapter,
    batch_packets: usize,
    cycle_delay: Duration,
}

/// Periodic capture/classify driver for one interface.
///
/// `start` spawns onto the current tokio runtime and must be called from within one.
pub struct Monitor {
    shared: Arc<Shared>,
}

impl Monitor {
    pub fn new(
        config: &MonitorConfig,
        source: impl PacketSource + 'static,
        adapter: ClassificationAdapter,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let source: Box<dyn PacketSource> = Box::new(source);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    lifecycle: Lifecycle::Idle,
                    status: Status::Idle,
                    session: Uuid::nil(),
                    epoch: 0,
                    cycle: 0,
                    series: Vec::new(),
                    task: None,
                }),
                wake: Notify::new(),
                events,
                source: Arc::new(Mutex::new(source)),
                extractor: FeatureExtractor::new(),
                adapter,
                batch_packets: config.batch_packets,
                cycle_delay: config.cycle_delay(),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.shared.events.subscribe()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lock().lifecycle
    }

    pub fn status(&self) -> Status {
        self.shared.lock().status.clone()
    }

    /// Completed cycles since start or the last reset.
    pub fn cycle(&self) -> u64 {
        self.shared.lock().cycle
    }

    pub fn series(&self) -> Vec<CycleReport> {
        self.shared.lock().series.clone()
    }

    /// Idle/Stopped → Monitoring. Returns the new session id.
    pub fn start(&self) -> Result<Uuid, LifecycleError> {
        let mut inner = self.shared.lock();
        if inner.lifecycle == Lifecycle::Monitoring {
            return Err(LifecycleError::InvalidTransition {
                action: "start",
                from: inner.lifecycle,
            });
        }
        inner.lifecycle = Lifecycle::Monitoring;
        inner.epoch += 1;
        inner.session = Uuid::new_v4();

        // a stopped session may still be finishing its last cycle; never overlap it
        let previous = inner.task.take();
        let shared = Arc::clone(&self.shared);
        let (epoch, session) = (inner.epoch, inner.session);
        inner.task = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            shared.run(epoch, session).await;
        }));

        self.shared.set_status(&mut inner, Status::Monitoring);
        info!(%session, "monitoring started");
        Ok(session)
    }

    /// Monitoring → Stopped. No further cycle is scheduled.
    ///
    /// A cycle already capturing when this is called still completes, so subscribers may see one
    /// `MonitorEvent::Cycle` after `Status(Stopped)`. Nothing follows that report.
    pub fn stop(&self) -> Result<(), LifecycleError> {
        let mut inner = self.shared.lock();
        if inner.lifecycle != Lifecycle::Monitoring {
            return Err(LifecycleError::InvalidTransition {
                action: "stop",
                from: inner.lifecycle,
            });
        }
        inner.lifecycle = Lifecycle::Stopped;
        self.shared.set_status(&mut inner, Status::Stopped);
        drop(inner);
        self.shared.wake.notify_waiters();
        info!("monitoring stopped");
        Ok(())
    }

    /// Clear the series and cycle counter. Lifecycle is unchanged.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.cycle = 0;
        inner.series.clear();
        self.shared.emit(MonitorEvent::Reset);
        info!(lifecycle = %inner.lifecycle, "series reset");
    }

    /// Stop if running and wait for the session task to finish.
    pub async fn shutdown(&self) {
        let _ = self.stop();
        let task = self.shared.lock().task.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        inner.lifecycle = Lifecycle::Stopped;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: MonitorEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn set_status(&self, inner: &mut Inner, status: Status) {
        inner.status = status.clone();
        self.emit(MonitorEvent::Status(status));
    }

    fn is_active(&self, epoch: u64) -> bool {
        let inner = self.lock();
        inner.lifecycle == Lifecycle::Monitoring && inner.epoch == epoch
    }

    async fn run(self: Arc<Self>, epoch: u64, session: Uuid) {
        loop {
            if !self.is_active(epoch) {
                break;
            }
            let started = Instant::now();
            let outcome = self.run_cycle().await;
            self.complete_cycle(session, outcome);

            let mut woken = std::pin::pin!(self.wake.notified());
            woken.as_mut().enable();
            if !self.is_active(epoch) {
                break;
            }
            // measured from cycle start; a slow cycle shortens the wait
            tokio::select! {
                _ = sleep_until(started + self.cycle_delay) => {}
                _ = woken => {}
            }
        }
        info!(%session, "monitoring session ended");
    }

    async fn run_cycle(&self) -> Result<(FeatureVector, Prediction), CycleFault> {
        let source = Arc::clone(&self.source);
        let count = self.batch_packets;
        let batch = tokio::task::spawn_blocking(move || {
            let mut source = source.lock().unwrap_or_else(PoisonError::into_inner);
            source.next_batch(count)
        })
        .await
        .map_err(|e| CycleFault::Worker(e.to_string()))??;

        let features = self.extractor.extract(&batch);
        let prediction = self.adapter.classify(&features)?;
        Ok((features, prediction))
    }

    fn complete_cycle(&self, session: Uuid, outcome: Result<(FeatureVector, Prediction), CycleFault>) {
        let mut inner = self.lock();
        match outcome {
            Ok((features, prediction)) => {
                inner.cycle += 1;
                let report = CycleReport {
                    session,
                    cycle: inner.cycle,
                    ts: Utc::now(),
                    features,
                    prediction,
                };
                inner.series.push(report.clone());
                if prediction.is_attack() {
                    warn!(cycle = report.cycle, "DDoS attack traffic detected");
                } else {
                    info!(cycle = report.cycle, %prediction, "cycle complete");
                }
                if matches!(inner.status, Status::Error(_)) && inner.lifecycle == Lifecycle::Monitoring {
                    self.set_status(&mut inner, Status::Monitoring);
                }
                self.emit(MonitorEvent::Cycle(report));
            }
            Err(fault) => {
                warn!(error = %fault, "monitoring cycle failed");
                self.set_status(&mut inner, Status::Error(fault.to_string()));
            }
        }
    }
}
