//! Refresh State Machine
//!
//! `Idle -> Fetching -> {Settled, Failed}`, back to `Fetching` on a tick or
//! a manual trigger. Pure and synchronous; the async driver lives in
//! `scheduler`.
//!
//! Every fetch carries a ticket with a sequence number. Only the latest
//! issued ticket may resolve the cycle, so a fetch that started later
//! always wins over one that started earlier.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DetectionError;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Fetching,
    Settled,
    Failed,
}

/// What asked for a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Interval,
    Manual,
    Reconfigured,
}

/// Issued by the machine when a fetch may start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    trigger: Trigger,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

/// What `complete` did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The result was applied and the machine moved to this phase
    Applied(Phase),
    /// A later fetch has been issued; the result was discarded
    Stale,
    /// The owning view is gone; nothing changed
    TornDown,
}

/// Observable view of the machine
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState<T> {
    pub phase: Phase,
    /// Last good value; survives failures
    pub value: Option<T>,
    /// Error of the last failed cycle, cleared on success
    pub error: Option<DetectionError>,
    pub last_settled: Option<DateTime<Utc>>,
    /// Latest issued sequence number
    pub seq: u64,
    /// Resolutions dropped because a later fetch had started
    pub discarded: u64,
}

impl<T> DashboardState<T> {
    pub fn is_fetching(&self) -> bool {
        self.phase == Phase::Fetching
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

// ============================================================================
// MACHINE
// ============================================================================

#[derive(Debug)]
pub struct RefreshMachine<T> {
    phase: Phase,
    /// Phase to return to when the in-flight fetch is abandoned
    resting: Phase,
    value: Option<T>,
    error: Option<DetectionError>,
    last_settled: Option<DateTime<Utc>>,
    issued: u64,
    discarded: u64,
    torn_down: bool,
}

impl<T> Default for RefreshMachine<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            resting: Phase::Idle,
            value: None,
            error: None,
            last_settled: None,
            issued: 0,
            discarded: 0,
            torn_down: false,
        }
    }
}

impl<T> RefreshMachine<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&DetectionError> {
        self.error.as_ref()
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Start a fetch unless one is already in flight
    pub fn begin(&mut self, trigger: Trigger) -> Option<FetchTicket> {
        if self.torn_down {
            return None;
        }
        if self.phase == Phase::Fetching {
            log::debug!("Refresh ({:?}) skipped: fetch #{} in flight", trigger, self.issued);
            return None;
        }
        Some(self.issue(trigger))
    }

    /// Start a fetch even if one is in flight; the older one becomes stale
    pub fn supersede(&mut self, trigger: Trigger) -> Option<FetchTicket> {
        if self.torn_down {
            return None;
        }
        if self.phase == Phase::Fetching {
            log::debug!("Fetch #{} superseded", self.issued);
        }
        Some(self.issue(trigger))
    }

    fn issue(&mut self, trigger: Trigger) -> FetchTicket {
        if self.phase != Phase::Fetching {
            self.resting = self.phase;
        }
        self.issued += 1;
        self.phase = Phase::Fetching;
        FetchTicket {
            seq: self.issued,
            trigger,
        }
    }

    /// Apply the result of the fetch identified by `ticket`
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<T, DetectionError>) -> Resolution {
        if self.torn_down {
            return Resolution::TornDown;
        }
        if ticket.seq != self.issued || self.phase != Phase::Fetching {
            self.discarded += 1;
            log::debug!("Discarding fetch #{} (latest is #{})", ticket.seq, self.issued);
            return Resolution::Stale;
        }

        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
                self.last_settled = Some(Utc::now());
                self.phase = Phase::Settled;
            }
            Err(e) => {
                self.error = Some(e);
                self.phase = Phase::Failed;
            }
        }
        Resolution::Applied(self.phase)
    }

    /// The fetch for `ticket` will never report back (its future was
    /// dropped or its task died). Returns to the phase held before it.
    pub fn abandon(&mut self, ticket: FetchTicket) -> Resolution {
        if self.torn_down {
            return Resolution::TornDown;
        }
        if ticket.seq != self.issued || self.phase != Phase::Fetching {
            return Resolution::Stale;
        }
        log::debug!("Fetch #{} abandoned", ticket.seq);
        self.phase = self.resting;
        Resolution::Applied(self.phase)
    }

    /// The owning view is gone; later completions are no-ops
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }
}

impl<T: Clone> RefreshMachine<T> {
    pub fn state(&self) -> DashboardState<T> {
        DashboardState {
            phase: self.phase,
            value: self.value.clone(),
            error: self.error.clone(),
            last_settled: self.last_settled,
            seq: self.issued,
            discarded: self.discarded,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> DetectionError {
        DetectionError::Unreachable("connection refused".into())
    }

    #[test]
    fn test_happy_cycle() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        assert_eq!(m.phase(), Phase::Idle);

        let ticket = m.begin(Trigger::Interval).unwrap();
        assert_eq!(ticket.seq(), 1);
        assert_eq!(m.phase(), Phase::Fetching);

        assert_eq!(m.complete(ticket, Ok("A")), Resolution::Applied(Phase::Settled));
        assert_eq!(m.value(), Some(&"A"));
        assert!(m.state().last_settled.is_some());
    }

    #[test]
    fn test_manual_trigger_blocked_while_fetching() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let periodic = m.begin(Trigger::Interval).unwrap();

        assert!(m.begin(Trigger::Manual).is_none());
        assert!(m.begin(Trigger::Interval).is_none());
        assert_eq!(m.latest_issued(), 1);

        m.complete(periodic, Ok("A"));
        let manual = m.begin(Trigger::Manual).unwrap();
        assert_eq!(manual.seq(), 2);
        assert_eq!(manual.trigger(), Trigger::Manual);
    }

    #[test]
    fn test_failure_keeps_previous_value() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let t1 = m.begin(Trigger::Interval).unwrap();
        m.complete(t1, Ok("A"));

        let t2 = m.begin(Trigger::Manual).unwrap();
        assert_eq!(m.complete(t2, Err(unreachable())), Resolution::Applied(Phase::Failed));
        assert_eq!(m.value(), Some(&"A"));
        assert_eq!(m.error(), Some(&unreachable()));

        let t3 = m.begin(Trigger::Interval).unwrap();
        m.complete(t3, Ok("B"));
        assert_eq!(m.value(), Some(&"B"));
        assert!(m.error().is_none());
    }

    #[test]
    fn test_failure_from_idle_has_no_value() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let t = m.begin(Trigger::Interval).unwrap();
        m.complete(t, Err(unreachable()));
        let state = m.state();
        assert_eq!(state.phase, Phase::Failed);
        assert!(state.value.is_none());
        assert!(state.has_error());
    }

    #[test]
    fn test_later_fetch_wins_when_earlier_resolves_last() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let slow = m.begin(Trigger::Interval).unwrap();
        let fast = m.supersede(Trigger::Reconfigured).unwrap();

        assert_eq!(m.complete(fast, Ok("second")), Resolution::Applied(Phase::Settled));
        assert_eq!(m.complete(slow, Ok("first")), Resolution::Stale);
        assert_eq!(m.value(), Some(&"second"));
        assert_eq!(m.state().discarded, 1);
    }

    #[test]
    fn test_later_fetch_wins_when_earlier_resolves_first() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let slow = m.begin(Trigger::Interval).unwrap();
        let fast = m.supersede(Trigger::Reconfigured).unwrap();

        assert_eq!(m.complete(slow, Ok("first")), Resolution::Stale);
        assert_eq!(m.phase(), Phase::Fetching);
        assert_eq!(m.complete(fast, Ok("second")), Resolution::Applied(Phase::Settled));
        assert_eq!(m.value(), Some(&"second"));
    }

    #[test]
    fn test_stale_failure_does_not_set_error() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let old = m.begin(Trigger::Interval).unwrap();
        let new = m.supersede(Trigger::Reconfigured).unwrap();
        m.complete(new, Ok("fresh"));
        assert_eq!(m.complete(old, Err(unreachable())), Resolution::Stale);
        assert!(m.error().is_none());
        assert_eq!(m.phase(), Phase::Settled);
    }

    #[test]
    fn test_completion_after_teardown_is_noop() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let t1 = m.begin(Trigger::Interval).unwrap();
        m.complete(t1, Ok("A"));
        let t2 = m.begin(Trigger::Manual).unwrap();

        m.teardown();
        assert_eq!(m.complete(t2, Ok("B")), Resolution::TornDown);
        assert_eq!(m.value(), Some(&"A"));
        assert!(m.begin(Trigger::Manual).is_none());
        assert!(m.supersede(Trigger::Reconfigured).is_none());
    }

    #[test]
    fn test_abandon_restores_previous_phase() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let t1 = m.begin(Trigger::Manual).unwrap();
        assert_eq!(m.abandon(t1), Resolution::Applied(Phase::Idle));

        let t2 = m.begin(Trigger::Manual).unwrap();
        m.complete(t2, Ok("A"));
        let t3 = m.begin(Trigger::Manual).unwrap();
        assert_eq!(m.abandon(t3), Resolution::Applied(Phase::Settled));
        assert_eq!(m.value(), Some(&"A"));
        assert!(m.begin(Trigger::Manual).is_some());
    }

    #[test]
    fn test_abandon_of_superseded_fetch_is_stale() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let old = m.begin(Trigger::Interval).unwrap();
        let new = m.supersede(Trigger::Reconfigured).unwrap();
        assert_eq!(m.abandon(old), Resolution::Stale);
        assert_eq!(m.phase(), Phase::Fetching);
        assert_eq!(m.complete(new, Ok("B")), Resolution::Applied(Phase::Settled));
    }

    #[test]
    fn test_ticket_resolves_once() {
        let mut m: RefreshMachine<&str> = RefreshMachine::new();
        let t = m.begin(Trigger::Manual).unwrap();
        m.complete(t, Ok("A"));
        assert_eq!(m.complete(t, Ok("again")), Resolution::Stale);
        assert_eq!(m.value(), Some(&"A"));
    }
}
