//! Stations: single-slot item containers with a per-agent permission matrix
//! and a kind-specific acceptance predicate. The slot-local checks live
//! here; the full transfer protocol (which also moves item ownership and
//! fires events) lives in `world::transfer`.

use contracts::{Denial, ItemKind, PermissionRule, ProcessKind, StationKind, StationSeed};

use crate::geometry::Position;
use crate::recipes::RecipeBook;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub station_id: String,
    pub kind: StationKind,
    pub position: Position,
    /// Item currently in the slot. Placement fully succeeds or fully fails;
    /// there is never a partially placed occupant.
    pub occupant: Option<String>,
    /// Order a serving window currently accepts. Ignored by other kinds.
    pub current_order: Option<ItemKind>,
    /// Agent currently mid-gesture or mid-process on this station. While
    /// set, the station is unavailable to every other agent.
    pub busy_with: Option<String>,
    pub hold_to_process: bool,
    pub place_rule: PermissionRule,
    pub remove_rule: PermissionRule,
}

impl Station {
    pub fn from_seed(seed: &StationSeed) -> Self {
        Self {
            station_id: seed.station_id.clone(),
            kind: seed.kind,
            position: Position::new(seed.x_cm, seed.y_cm),
            occupant: None,
            current_order: seed.initial_order,
            busy_with: None,
            hold_to_process: seed.hold_to_process,
            place_rule: seed.place_rule.clone(),
            remove_rule: seed.remove_rule.clone(),
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// The processing category this station performs, if any.
    pub fn process_kind(&self) -> Option<ProcessKind> {
        self.kind.process_kind()
    }

    /// Whether `agent_id` may act on this station right now: a station busy
    /// with another agent's gesture or process is unavailable to everyone
    /// else.
    pub fn available_for(&self, agent_id: &str) -> bool {
        match &self.busy_with {
            None => true,
            Some(current) => current == agent_id,
        }
    }

    /// Kind-specific acceptance predicate, independent of permissions and
    /// capacity.
    pub fn accepts_kind(&self, kind: ItemKind, recipes: &RecipeBook) -> bool {
        match self.kind {
            StationKind::Counter | StationKind::Display => true,
            StationKind::ChoppingBoard | StationKind::Stove => match self.process_kind() {
                Some(process) => recipes.can_transform(kind, process),
                None => false,
            },
            StationKind::ServingWindow => self.current_order == Some(kind),
        }
    }

    /// Full placement check: permission, then capacity, then predicate.
    /// The occupied-but-combinable path is checked by the caller before
    /// falling back to this, since it needs the occupant's kind.
    pub fn may_place(
        &self,
        agent_id: &str,
        kind: ItemKind,
        recipes: &RecipeBook,
    ) -> Result<(), Denial> {
        if !self.place_rule.allows(agent_id) {
            return Err(Denial::Permission);
        }
        if self.is_occupied() {
            return Err(Denial::Capacity);
        }
        if !self.accepts_kind(kind, recipes) {
            return Err(Denial::Predicate);
        }
        Ok(())
    }

    /// Removal check: permission, then occupancy.
    pub fn may_remove(&self, agent_id: &str) -> Result<(), Denial> {
        if !self.remove_rule.allows(agent_id) {
            return Err(Denial::Permission);
        }
        if !self.is_occupied() {
            return Err(Denial::Capacity);
        }
        Ok(())
    }
}
