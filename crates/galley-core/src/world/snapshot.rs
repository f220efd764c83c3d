use super::*;

use contracts::{
    AgentSnapshot, GestureSnapshot, ItemSnapshot, StationSnapshot, WorldSnapshot,
};

impl KitchenWorld {
    /// In-memory snapshot of the whole world at the current tick, for
    /// inspection and the CLI. Iteration order is BTreeMap order, so two
    /// identical runs serialize identically.
    pub fn snapshot_for_current_tick(&self) -> WorldSnapshot {
        let tick = self.status.current_tick;
        let agents = self
            .agents
            .values()
            .map(|agent| AgentSnapshot {
                agent_id: agent.agent_id.clone(),
                x_cm: agent.position.x_cm,
                y_cm: agent.position.y_cm,
                capabilities: agent.capabilities.clone(),
                carry_slots: agent.carry_slots.clone(),
                is_interacting: agent.is_interacting,
                current_target: agent.current_target.clone(),
                highlighted_target: agent.highlighted_target.clone(),
                candidate_interactables: agent
                    .candidate_interactables
                    .iter()
                    .map(|entry| entry.target.clone())
                    .collect(),
                candidate_stations: agent
                    .candidate_stations
                    .iter()
                    .map(|candidate| candidate.station_id.clone())
                    .collect(),
            })
            .collect::<Vec<_>>();

        let stations = self
            .stations
            .values()
            .map(|station| StationSnapshot {
                station_id: station.station_id.clone(),
                kind: station.kind,
                x_cm: station.position.x_cm,
                y_cm: station.position.y_cm,
                occupant_item_id: station.occupant.clone(),
                current_order: station.current_order,
                busy_with: station.busy_with.clone(),
                hold_to_process: station.hold_to_process,
            })
            .collect::<Vec<_>>();

        let items = self
            .items
            .values()
            .map(|item| ItemSnapshot {
                item_id: item.item_id.clone(),
                kind: item.kind,
                x_cm: item.position.x_cm,
                y_cm: item.position.y_cm,
                owner: item.owner.to_owner_ref(),
                independently_interactable: item.independently_interactable,
            })
            .collect::<Vec<_>>();

        let processes = self
            .processes
            .values()
            .map(ProcessingProcess::snapshot)
            .collect::<Vec<_>>();

        let gestures = self
            .gestures
            .values()
            .map(|gesture| GestureSnapshot {
                agent_id: gesture.agent_id.clone(),
                station_id: gesture.station_id.clone(),
                phase: gesture.phase.as_str().to_string(),
                press_tick: gesture.press_tick,
            })
            .collect::<Vec<_>>();

        WorldSnapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: self.status.session_id.clone(),
            tick,
            created_at: synthetic_timestamp(tick, 0),
            snapshot_id: format!("snap_{tick:06}"),
            state_hash: format!("{:016x}", self.state_hash),
            replay_hash: format!("{:016x}", self.replay_hash),
            agents,
            stations,
            items,
            processes,
            gestures,
        }
    }
}
