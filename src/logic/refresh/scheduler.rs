//! Refresh Scheduler
//!
//! Async driver around `RefreshMachine`: a periodic timer plus manual
//! triggers, fetches run as spawned tasks, and every state change is
//! published on a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::machine::{DashboardState, FetchTicket, Resolution, RefreshMachine, Trigger};
use crate::error::{DetectionError, DetectionResult};
use crate::logic::analytics::AnalyticsSnapshot;
use crate::logic::detection::DetectionClient;

pub type AnalyticsState = DashboardState<AnalyticsSnapshot>;

// ============================================================================
// SOURCE
// ============================================================================

/// Anything that can produce an analytics snapshot
#[async_trait]
pub trait AnalyticsSource: Send + Sync + 'static {
    async fn fetch_analytics(&self) -> DetectionResult<AnalyticsSnapshot>;
}

#[async_trait]
impl AnalyticsSource for DetectionClient {
    async fn fetch_analytics(&self) -> DetectionResult<AnalyticsSnapshot> {
        DetectionClient::fetch_analytics(self).await
    }
}

// ============================================================================
// SHARED STATE
// ============================================================================

struct Shared<S> {
    source: RwLock<Arc<S>>,
    machine: Mutex<RefreshMachine<AnalyticsSnapshot>>,
    updates: watch::Sender<AnalyticsState>,
    cancel: CancellationToken,
}

impl<S: AnalyticsSource> Shared<S> {
    /// Ask the machine for a ticket and, if granted, spawn the fetch
    fn launch(self: &Arc<Self>, trigger: Trigger, force: bool) -> Option<FetchTicket> {
        let ticket = {
            let mut machine = self.machine.lock();
            let ticket = if force {
                machine.supersede(trigger)
            } else {
                machine.begin(trigger)
            }?;
            self.updates.send_replace(machine.state());
            ticket
        };

        log::debug!("Fetch #{} started ({:?})", ticket.seq(), ticket.trigger());
        let source = self.source.read().clone();
        let shared = Arc::clone(self);

        tokio::spawn(async move {
            // Own task so a panicking source still resolves the ticket
            let mut fetch = tokio::spawn(async move { source.fetch_analytics().await });
            let result = tokio::select! {
                _ = shared.cancel.cancelled() => {
                    fetch.abort();
                    return;
                }
                joined = &mut fetch => joined.unwrap_or_else(|e| {
                    log::error!("Analytics fetch #{} task failed: {}", ticket.seq(), e);
                    Err(DetectionError::Unreachable(format!("analytics fetch task failed: {}", e)))
                }),
            };
            shared.resolve(ticket, result);
        });

        Some(ticket)
    }

    fn resolve(&self, ticket: FetchTicket, result: DetectionResult<AnalyticsSnapshot>) {
        let mut machine = self.machine.lock();
        if let Err(e) = &result {
            log::warn!("Analytics fetch #{} failed: {}", ticket.seq(), e);
        }

        match machine.complete(ticket, result) {
            Resolution::TornDown => {}
            Resolution::Stale => {
                self.updates.send_replace(machine.state());
            }
            Resolution::Applied(phase) => {
                log::debug!("Fetch #{} resolved: {:?}", ticket.seq(), phase);
                self.updates.send_replace(machine.state());
            }
        }
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Start polling `source` every `interval`; the first fetch starts immediately
    pub fn spawn<S: AnalyticsSource>(source: Arc<S>, interval: Duration) -> RefreshHandle<S> {
        let machine = RefreshMachine::new();
        let (updates, _) = watch::channel(machine.state());
        let shared = Arc::new(Shared {
            source: RwLock::new(source),
            machine: Mutex::new(machine),
            updates,
            cancel: CancellationToken::new(),
        });

        log::info!("Analytics refresh every {}s", interval.as_secs());
        tokio::spawn(drive(Arc::clone(&shared), interval));

        RefreshHandle { shared }
    }
}

async fn drive<S: AnalyticsSource>(shared: Arc<Shared<S>>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => break,
            _ = ticker.tick() => {
                shared.launch(Trigger::Interval, false);
            }
        }
    }
    log::debug!("Refresh timer released");
}

// ============================================================================
// HANDLE
// ============================================================================

/// Owner's side of a running scheduler. Dropping it tears the scheduler down.
pub struct RefreshHandle<S: AnalyticsSource> {
    shared: Arc<Shared<S>>,
}

impl<S: AnalyticsSource> RefreshHandle<S> {
    /// Manual refresh; `None` if a fetch is already in flight
    pub fn refresh(&self) -> Option<FetchTicket> {
        self.shared.launch(Trigger::Manual, false)
    }

    /// Abandon any in-flight fetch and start a new one
    pub fn supersede(&self) -> Option<FetchTicket> {
        self.shared.launch(Trigger::Reconfigured, true)
    }

    /// Switch to a new source (e.g. a client for another base URL) and refetch
    pub fn reconfigure(&self, source: Arc<S>) -> Option<FetchTicket> {
        *self.shared.source.write() = source;
        log::info!("Analytics source reconfigured");
        self.supersede()
    }

    pub fn state(&self) -> AnalyticsState {
        self.shared.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalyticsState> {
        self.shared.updates.subscribe()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Release the timer; in-flight results are ignored from now on
    pub fn shutdown(&self) {
        if self.shared.cancel.is_cancelled() {
            return;
        }
        self.shared.machine.lock().teardown();
        self.shared.cancel.cancel();
        log::info!("Analytics refresh stopped");
    }
}

impl<S: AnalyticsSource> Drop for RefreshHandle<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
