//! Rate Gate Module
//!
//! Global daily quota for newly computed verdicts. Cache hits never reach
//! the gate's commit step, so they never consume quota.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

// == Clock ==
/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

// == Quota Status ==
/// Observable view of the gate after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub requests_today: u64,
    pub limit: u64,
    pub remaining: u64,
}

/// Returned when the daily limit is already used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaExceeded(pub QuotaStatus);

#[derive(Debug)]
struct GateState {
    count: u64,
    reset_date: NaiveDate,
}

// == Rate Gate ==
/// Single process-wide counter of new analyses per calendar day.
pub struct RateGate {
    state: Mutex<GateState>,
    limit: u64,
    clock: Arc<dyn Clock>,
}

impl RateGate {
    /// Creates a gate backed by the system clock.
    pub fn new(limit: u64) -> Self {
        Self::with_clock(limit, Arc::new(SystemClock))
    }

    /// Creates a gate with an explicit date source.
    pub fn with_clock(limit: u64, clock: Arc<dyn Clock>) -> Self {
        let reset_date = clock.today();
        Self {
            state: Mutex::new(GateState {
                count: 0,
                reset_date,
            }),
            limit,
            clock,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Dry-run check: rolls the day over if needed but never increments.
    pub fn peek(&self) -> Result<QuotaStatus, QuotaExceeded> {
        let mut state = self.state.lock();
        self.roll_day(&mut state);
        let status = self.status(state.count);
        if state.count >= self.limit {
            warn!(
                requests_today = state.count,
                limit = self.limit,
                "Global daily limit reached"
            );
            return Err(QuotaExceeded(status));
        }
        Ok(status)
    }

    /// Admits one new analysis, or rejects it when the limit is used up.
    ///
    /// Day rollover, limit check and increment share one critical section.
    pub fn check_and_increment(&self) -> Result<QuotaStatus, QuotaExceeded> {
        let mut state = self.state.lock();
        self.roll_day(&mut state);
        if state.count >= self.limit {
            warn!(
                requests_today = state.count,
                limit = self.limit,
                "Global daily limit reached"
            );
            return Err(QuotaExceeded(self.status(state.count)));
        }
        state.count += 1;
        info!(
            requests_today = state.count,
            limit = self.limit,
            "New video analysis admitted"
        );
        Ok(self.status(state.count))
    }

    /// Current quota view without side effects other than day rollover.
    pub fn status_now(&self) -> QuotaStatus {
        let mut state = self.state.lock();
        self.roll_day(&mut state);
        self.status(state.count)
    }

    fn roll_day(&self, state: &mut GateState) {
        let today = self.clock.today();
        if today > state.reset_date {
            state.count = 0;
            state.reset_date = today;
            info!(%today, "Global rate limit reset for new day");
        }
    }

    fn status(&self, count: u64) -> QuotaStatus {
        QuotaStatus {
            requests_today: count,
            limit: self.limit,
            remaining: self.limit.saturating_sub(count),
        }
    }
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("limit", &self.limit)
            .field("state", &*self.state.lock())
            .finish()
    }
}
