//! Processing processes: an active chop or cook bound to one (station,
//! agent, item) triple. Progress advances one tick at a time; completion
//! triggers the atomic transformation in `world::transfer`. Stopping a
//! process discards its progress; processing does not checkpoint.

use contracts::{ProcessKind, ProcessSnapshot};

/// Result of advancing a process by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStep {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingProcess {
    pub process_id: String,
    pub station_id: String,
    pub agent_id: String,
    pub item_id: String,
    pub process_kind: ProcessKind,
    pub started_tick: u64,
    pub duration_ticks: u64,
    pub elapsed_ticks: u64,
}

impl ProcessingProcess {
    pub fn start(
        process_id: impl Into<String>,
        station_id: impl Into<String>,
        agent_id: impl Into<String>,
        item_id: impl Into<String>,
        process_kind: ProcessKind,
        started_tick: u64,
        duration_ticks: u64,
    ) -> Self {
        Self {
            process_id: process_id.into(),
            station_id: station_id.into(),
            agent_id: agent_id.into(),
            item_id: item_id.into(),
            process_kind,
            started_tick,
            duration_ticks: duration_ticks.max(1),
            elapsed_ticks: 0,
        }
    }

    /// Advance by one tick. Returns `Completed` exactly once, on the tick
    /// elapsed reaches the duration.
    pub fn advance(&mut self) -> ProcessStep {
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
        if self.elapsed_ticks >= self.duration_ticks {
            ProcessStep::Completed
        } else {
            ProcessStep::InProgress
        }
    }

    /// Integer progress for prompts and snapshots, 0..=100.
    pub fn progress_percent(&self) -> u8 {
        let percent = self.elapsed_ticks.saturating_mul(100) / self.duration_ticks;
        percent.min(100) as u8
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            process_id: self.process_id.clone(),
            station_id: self.station_id.clone(),
            agent_id: self.agent_id.clone(),
            item_id: self.item_id.clone(),
            process_kind: self.process_kind,
            started_tick: self.started_tick,
            duration_ticks: self.duration_ticks,
            elapsed_ticks: self.elapsed_ticks,
            progress_percent: self.progress_percent(),
        }
    }
}
