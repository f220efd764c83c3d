//! The kitchen world: single-threaded, cooperative, tick-driven. All state
//! is mutated only inside the per-tick update pass; a station mutation
//! completes fully, including its invalidation broadcast, before control
//! returns to the caller, so no agent ever observes a half-updated station.

mod commands;
mod events;
mod init;
mod inspect;
mod interact;
mod invalidation;
mod snapshot;
mod step;
mod transfer;

use std::collections::BTreeMap;

use contracts::{
    ActorRef, Command, CommandPayload, Denial, Event, EventType, InteractionIntent, RunMode,
    SessionConfig, SessionStatus, TargetRef, SCHEMA_VERSION_V1,
};
use serde_json::{json, Value};

use crate::agent::{Agent, StationCandidate};
use crate::gesture::{GesturePhase, GestureState, HoldDecision, ReleaseAction};
use crate::interactable::{CandidateEntry, TargetClass};
use crate::item::{Item, ItemOwner};
use crate::process::{ProcessStep, ProcessingProcess};
use crate::recipes::RecipeBook;
use crate::station::Station;

#[derive(Debug, Clone)]
struct QueuedCommand {
    effective_tick: u64,
    insertion_sequence: u64,
    command: Command,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepMetrics {
    pub advanced_ticks: u64,
    pub processed_commands: u64,
    pub completed_processes: u64,
}

/// What `resolve_target` decided an agent would do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub target: TargetRef,
    pub intent: InteractionIntent,
}

#[derive(Debug)]
pub struct KitchenWorld {
    config: SessionConfig,
    status: SessionStatus,
    recipes: RecipeBook,
    queued_commands: Vec<QueuedCommand>,
    next_command_sequence: u64,
    event_log: Vec<Event>,
    agents: BTreeMap<String, Agent>,
    stations: BTreeMap<String, Station>,
    items: BTreeMap<String, Item>,
    /// Active processes, keyed by station id: at most one per station.
    processes: BTreeMap<String, ProcessingProcess>,
    /// Active gesture attempts, keyed by agent id.
    gestures: BTreeMap<String, GestureState>,
    next_item_sequence: u64,
    next_process_sequence: u64,
    state_hash: u64,
    replay_hash: u64,
    last_step_metrics: StepMetrics,
}

fn synthetic_timestamp(tick: u64, seq: u64) -> String {
    format!(
        "1970-01-01T{:02}:{:02}:{:02}Z",
        (tick / 3600) % 24,
        (tick / 60) % 60,
        (tick + seq) % 60
    )
}

fn mix_state_hash(state_hash: u64, tick: u64, sequence_in_tick: u64) -> u64 {
    let mut hash = state_hash ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    hash ^= sequence_in_tick.wrapping_mul(0x517C_C1B7_2722_0A95);
    hash.rotate_left(17)
}

fn mix_replay_hash(current: u64, event_id: &str, tick: u64, sequence: u64) -> u64 {
    let mut hash = current ^ tick.wrapping_mul(0xA24B_1C62_5B93_2D47);
    hash ^= sequence.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for byte in event_id.as_bytes() {
        hash = hash.rotate_left(7) ^ u64::from(*byte);
        hash = hash.wrapping_mul(0x517C_C1B7_2722_0A95);
    }
    hash
}
