use chrono::{DateTime, Local, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::product_manager::ProductManager;

/// Longest local-time gap (DST switch) searched for a valid trigger instant.
const MAX_GAP_MINUTES: i64 = 180;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleStatus {
    Completed,
    Failed(String),
    Panicked(String),
}

impl CycleStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleStatus::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub completed_runs: u64,
    pub failed_runs: u64,
    pub last_run: Option<DateTime<Local>>,
    pub last_status: Option<CycleStatus>,
    pub next_run: DateTime<Local>,
    pub uptime_seconds: u64,
}

/// Fires once a day at a fixed local wall-clock time.
#[derive(Debug, Clone)]
pub struct DailyTrigger {
    at: NaiveTime,
    next_run: DateTime<Local>,
}

impl DailyTrigger {
    /// The first run is today if `at` is still ahead of `now`, otherwise tomorrow.
    pub fn new(at: NaiveTime, now: DateTime<Local>) -> Self {
        Self {
            at,
            next_run: next_occurrence(at, now),
        }
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    pub fn next_run(&self) -> DateTime<Local> {
        self.next_run
    }

    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        now >= self.next_run
    }

    /// Moves to the first occurrence strictly after `now`.
    pub fn advance(&mut self, now: DateTime<Local>) {
        self.next_run = next_occurrence(self.at, now);
    }
}

fn next_occurrence(at: NaiveTime, now: DateTime<Local>) -> DateTime<Local> {
    let mut date = now.date_naive();
    loop {
        if let Some(candidate) = resolve_local(date.and_time(at)) {
            if candidate > now {
                return candidate;
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => return now,
        };
    }
}

/// Maps a wall-clock time to an instant. Ambiguous times take the earlier
/// instant; times skipped by a DST jump move to the first valid minute after.
fn resolve_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    (0..=MAX_GAP_MINUTES).find_map(|minutes| {
        match Local.from_local_datetime(&(naive + chrono::Duration::minutes(minutes))) {
            LocalResult::Single(instant) => Some(instant),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => None,
        }
    })
}

/// Drives one cycle per day and keeps running whatever a cycle does.
pub struct ProductScheduler {
    manager: ProductManager,
    trigger: DailyTrigger,
    tick_interval: Duration,
    state: SchedulerState,
    completed_runs: u64,
    failed_runs: u64,
    last_run: Option<DateTime<Local>>,
    last_status: Option<CycleStatus>,
    start_time: DateTime<Utc>,
}

impl ProductScheduler {
    pub fn new(manager: ProductManager, trigger_time: NaiveTime, tick_interval: Duration) -> Self {
        Self::with_trigger(manager, DailyTrigger::new(trigger_time, Local::now()), tick_interval)
    }

    pub fn with_trigger(manager: ProductManager, trigger: DailyTrigger, tick_interval: Duration) -> Self {
        Self {
            manager,
            trigger,
            tick_interval,
            state: SchedulerState::Idle,
            completed_runs: 0,
            failed_runs: 0,
            last_run: None,
            last_status: None,
            start_time: Utc::now(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn next_run(&self) -> DateTime<Local> {
        self.trigger.next_run()
    }

    pub fn get_stats(&self) -> SchedulerStats {
        let uptime = Utc::now().signed_duration_since(self.start_time);

        SchedulerStats {
            completed_runs: self.completed_runs,
            failed_runs: self.failed_runs,
            last_run: self.last_run,
            last_status: self.last_status.clone(),
            next_run: self.trigger.next_run(),
            uptime_seconds: uptime.num_seconds().max(0) as u64,
        }
    }

    /// Polls forever. Only process termination stops this loop.
    pub async fn run(&mut self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Daily check scheduled at {} (next run {})",
            self.trigger.at().format("%H:%M"),
            self.next_run().format("%Y-%m-%d %H:%M")
        );

        loop {
            interval.tick().await;
            self.tick(Local::now()).await;
        }
    }

    /// Runs a cycle if the trigger is due at `now`. Returns the cycle outcome
    /// when one ran.
    pub async fn tick(&mut self, now: DateTime<Local>) -> Option<CycleStatus> {
        if !self.trigger.is_due(now) {
            return None;
        }

        let status = self.run_now(now).await;
        self.trigger.advance(now);
        tracing::info!("Next check at {}", self.next_run().format("%Y-%m-%d %H:%M"));
        Some(status)
    }

    /// Runs one cycle immediately, outside of the schedule.
    ///
    /// Errors and panics from the cycle are logged as critical and turned into
    /// a status; they never reach the caller.
    pub async fn run_now(&mut self, now: DateTime<Local>) -> CycleStatus {
        self.state = SchedulerState::Running;

        let outcome = AssertUnwindSafe(self.manager.run_cycle()).catch_unwind().await;
        let status = match outcome {
            Ok(Ok(summary)) => {
                tracing::debug!("Cycle {} completed", summary.cycle_id);
                CycleStatus::Completed
            }
            Ok(Err(e)) => {
                tracing::error!(severity = "critical", "Unexpected error during product check: {}", e);
                CycleStatus::Failed(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(severity = "critical", "Product check panicked: {}", message);
                CycleStatus::Panicked(message)
            }
        };

        self.state = SchedulerState::Idle;
        self.last_run = Some(now);
        if status.is_success() {
            self.completed_runs += 1;
        } else {
            self.failed_runs += 1;
        }
        self.last_status = Some(status.clone());

        status
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
