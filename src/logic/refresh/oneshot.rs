//! One-shot requests
//!
//! A single user-initiated detection request run through `RefreshMachine`
//! without the periodic transition. Clones share one machine, so a second
//! submit while the first is pending is refused.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use super::machine::{DashboardState, FetchTicket, Phase, RefreshMachine, Resolution, Trigger};
use crate::error::DetectionResult;

#[derive(Debug)]
pub struct OneShot<T> {
    machine: Arc<Mutex<RefreshMachine<T>>>,
}

impl<T> Clone for OneShot<T> {
    fn clone(&self) -> Self {
        Self {
            machine: Arc::clone(&self.machine),
        }
    }
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        Self {
            machine: Arc::new(Mutex::new(RefreshMachine::new())),
        }
    }
}

impl<T: Clone> OneShot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `request` unless one is pending or the owner is gone.
    ///
    /// Returns the phase the machine settled in, or `None` when the request
    /// was not started or its result was ignored.
    pub async fn run<F, Fut>(&self, request: F) -> Option<Phase>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DetectionResult<T>>,
    {
        let ticket = self.machine.lock().begin(Trigger::Manual)?;
        let mut pending = PendingRequest {
            machine: &self.machine,
            ticket: Some(ticket),
        };
        let result = request().await;

        let resolution = pending.complete(result);
        match resolution {
            Resolution::Applied(phase) => Some(phase),
            Resolution::Stale | Resolution::TornDown => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.machine.lock().phase() == Phase::Fetching
    }

    pub fn state(&self) -> DashboardState<T> {
        self.machine.lock().state()
    }

    /// Drop any pending result when it arrives
    pub fn teardown(&self) {
        self.machine.lock().teardown();
    }
}

/// Abandons the ticket if the request future is dropped before it resolves
struct PendingRequest<'a, T> {
    machine: &'a Mutex<RefreshMachine<T>>,
    ticket: Option<FetchTicket>,
}

impl<T> PendingRequest<'_, T> {
    fn complete(&mut self, result: DetectionResult<T>) -> Resolution {
        match self.ticket.take() {
            Some(ticket) => self.machine.lock().complete(ticket, result),
            None => Resolution::Stale,
        }
    }
}

impl<T> Drop for PendingRequest<'_, T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.machine.lock().abandon(ticket);
        }
    }
}
