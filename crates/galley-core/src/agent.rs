//! Agents: a player's interaction endpoint. Each agent owns a detection
//! volume, a priority-ordered cache of candidate interactables, a
//! distance-ordered cache of candidate stations, fixed carry slots, and the
//! highlight/interaction state the whole kernel protects.
//!
//! The central consistency invariant: whenever `is_interacting` is false,
//! `highlighted_target` equals what `world::resolve_target` returns. Every
//! state-changing path re-establishes it synchronously.

use contracts::{AgentSeed, ProcessKind, SessionConfig, TargetRef};

use crate::geometry::{DetectionVolume, Position};
use crate::interactable::CandidateEntry;

/// A station currently inside the agent's detection volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationCandidate {
    pub station_id: String,
    pub distance_sq: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub agent_id: String,
    pub position: Position,
    pub detection_radius_cm: i64,
    /// Processing categories this agent may perform, from external config.
    pub capabilities: Vec<ProcessKind>,
    /// Fixed-capacity carry slots; `None` is an empty slot.
    pub carry_slots: Vec<Option<String>>,
    /// Priority-ordered candidate cache (priority desc, distance asc, id asc).
    pub candidate_interactables: Vec<CandidateEntry>,
    /// Distance-ordered station cache (distance asc, id asc).
    pub candidate_stations: Vec<StationCandidate>,
    pub current_target: Option<TargetRef>,
    pub is_interacting: bool,
    pub highlighted_target: Option<TargetRef>,
}

impl Agent {
    pub fn from_seed(seed: &AgentSeed, config: &SessionConfig) -> Self {
        Self {
            agent_id: seed.agent_id.clone(),
            position: Position::new(seed.x_cm, seed.y_cm),
            detection_radius_cm: config.detection_radius_cm,
            capabilities: seed.capabilities.clone(),
            carry_slots: vec![None; usize::from(config.carry_slots_per_agent.max(1))],
            candidate_interactables: Vec::new(),
            candidate_stations: Vec::new(),
            current_target: None,
            is_interacting: false,
            highlighted_target: None,
        }
    }

    pub fn detection_volume(&self) -> DetectionVolume {
        DetectionVolume::new(self.position, self.detection_radius_cm)
    }

    pub fn can_process(&self, kind: ProcessKind) -> bool {
        self.capabilities.contains(&kind)
    }

    // --- Carry slots ---

    /// First carried item, lowest slot first. With the observed capacity of
    /// one this is simply "the carried item".
    pub fn carried_item_id(&self) -> Option<&str> {
        self.carry_slots
            .iter()
            .find_map(|slot| slot.as_deref())
    }

    pub fn is_carrying(&self) -> bool {
        self.carried_item_id().is_some()
    }

    pub fn first_free_slot(&self) -> Option<u8> {
        self.carry_slots
            .iter()
            .position(Option::is_none)
            .map(|idx| idx as u8)
    }

    /// Put an item into the first free slot. Returns the slot index, or
    /// `None` when every slot is full (the caller maps this to a capacity
    /// denial).
    pub fn store_item(&mut self, item_id: &str) -> Option<u8> {
        let slot = self.first_free_slot()?;
        self.carry_slots[usize::from(slot)] = Some(item_id.to_string());
        Some(slot)
    }

    /// Remove a specific item from whichever slot holds it.
    pub fn release_item(&mut self, item_id: &str) -> Option<u8> {
        let idx = self
            .carry_slots
            .iter()
            .position(|slot| slot.as_deref() == Some(item_id))?;
        self.carry_slots[idx] = None;
        Some(idx as u8)
    }

    // --- Candidate caches ---

    /// Replace both caches with freshly scanned, pre-sorted contents.
    pub fn set_candidates(
        &mut self,
        mut interactables: Vec<CandidateEntry>,
        mut stations: Vec<StationCandidate>,
    ) {
        interactables.sort();
        stations.sort_by(|a, b| {
            a.distance_sq
                .cmp(&b.distance_sq)
                .then_with(|| a.station_id.cmp(&b.station_id))
        });
        self.candidate_interactables = interactables;
        self.candidate_stations = stations;
    }

    /// Lazy purge on read: drop every cached entry its predicate rejects.
    /// Never assume a cached entry is still valid. The two caches validate
    /// independently; a station may stay a placement candidate after it
    /// stops being an empty-handed interactable.
    pub fn purge_candidates<F, G>(&mut self, mut target_valid: F, mut station_valid: G)
    where
        F: FnMut(&TargetRef) -> bool,
        G: FnMut(&str) -> bool,
    {
        self.candidate_interactables
            .retain(|entry| target_valid(&entry.target));
        self.candidate_stations
            .retain(|candidate| station_valid(&candidate.station_id));
    }

    pub fn nearest_station_id(&self) -> Option<&str> {
        self.candidate_stations
            .first()
            .map(|candidate| candidate.station_id.as_str())
    }
}
