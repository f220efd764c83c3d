use super::*;

impl KitchenWorld {
    pub fn inspect_agent(&self, agent_id: &str) -> Option<Value> {
        self.agents.get(agent_id).map(|agent| {
            json!({
                "agent_id": agent.agent_id,
                "x_cm": agent.position.x_cm,
                "y_cm": agent.position.y_cm,
                "capabilities": agent.capabilities,
                "carry_slots": agent.carry_slots,
                "is_interacting": agent.is_interacting,
                "current_target": agent.current_target,
                "highlighted_target": agent.highlighted_target,
                "candidate_interactables": agent
                    .candidate_interactables
                    .iter()
                    .map(|entry| {
                        json!({
                            "target": entry.target,
                            "priority": entry.priority,
                            "distance_sq": entry.distance_sq,
                        })
                    })
                    .collect::<Vec<_>>(),
                "candidate_stations": agent
                    .candidate_stations
                    .iter()
                    .map(|candidate| {
                        json!({
                            "station_id": candidate.station_id,
                            "distance_sq": candidate.distance_sq,
                        })
                    })
                    .collect::<Vec<_>>(),
                "prompt": self.prompt_for(agent_id),
            })
        })
    }

    pub fn inspect_station(&self, station_id: &str) -> Option<Value> {
        self.stations.get(station_id).map(|station| {
            let occupant = station
                .occupant
                .as_deref()
                .and_then(|item_id| self.items.get(item_id))
                .map(|item| {
                    json!({
                        "item_id": item.item_id,
                        "kind": item.kind.as_str(),
                    })
                });
            let process = self.processes.get(station_id).map(|process| {
                json!({
                    "process_id": process.process_id,
                    "agent_id": process.agent_id,
                    "process_kind": process.process_kind.as_str(),
                    "progress_percent": process.progress_percent(),
                })
            });
            json!({
                "station_id": station.station_id,
                "kind": station.kind.as_str(),
                "x_cm": station.position.x_cm,
                "y_cm": station.position.y_cm,
                "occupant": occupant,
                "current_order": station.current_order.map(contracts::ItemKind::as_str),
                "busy_with": station.busy_with,
                "hold_to_process": station.hold_to_process,
                "active_process": process,
            })
        })
    }

    /// Audit of the ownership invariant: every item has exactly one owner
    /// and every cross-link (carry slot, station slot) points back at it.
    pub fn ownership_census(&self) -> Value {
        let mut inconsistencies = Vec::<String>::new();

        for item in self.items.values() {
            match &item.owner {
                ItemOwner::Ground => {}
                ItemOwner::Agent { agent_id, slot } => {
                    let held = self
                        .agents
                        .get(agent_id)
                        .and_then(|agent| agent.carry_slots.get(usize::from(*slot)))
                        .and_then(Option::as_deref);
                    if held != Some(item.item_id.as_str()) {
                        inconsistencies.push(format!(
                            "{} claims agent {} slot {} which does not hold it",
                            item.item_id, agent_id, slot
                        ));
                    }
                }
                ItemOwner::Station { station_id } => {
                    let occupant = self
                        .stations
                        .get(station_id)
                        .and_then(|station| station.occupant.as_deref());
                    if occupant != Some(item.item_id.as_str()) {
                        inconsistencies.push(format!(
                            "{} claims station {} which does not hold it",
                            item.item_id, station_id
                        ));
                    }
                }
            }
        }

        for agent in self.agents.values() {
            for (slot, held) in agent.carry_slots.iter().enumerate() {
                if let Some(item_id) = held {
                    let consistent = self.items.get(item_id).is_some_and(|item| {
                        item.owner
                            == ItemOwner::Agent {
                                agent_id: agent.agent_id.clone(),
                                slot: slot as u8,
                            }
                    });
                    if !consistent {
                        inconsistencies.push(format!(
                            "agent {} slot {} holds {} which is not owned by it",
                            agent.agent_id, slot, item_id
                        ));
                    }
                }
            }
        }

        for station in self.stations.values() {
            if let Some(item_id) = &station.occupant {
                let consistent = self.items.get(item_id).is_some_and(|item| {
                    item.owner
                        == ItemOwner::Station {
                            station_id: station.station_id.clone(),
                        }
                });
                if !consistent {
                    inconsistencies.push(format!(
                        "station {} holds {} which is not owned by it",
                        station.station_id, item_id
                    ));
                }
            }
        }

        json!({
            "tick": self.status.current_tick,
            "item_count": self.items.len(),
            "consistent": inconsistencies.is_empty(),
            "inconsistencies": inconsistencies,
        })
    }

    /// Prompt text for what this agent's press would do right now,
    /// including in-progress percentages while a process runs. Unavailable
    /// interactions surface why, derived from the denial taxonomy.
    pub fn prompt_for(&self, agent_id: &str) -> String {
        let Some(agent) = self.agents.get(agent_id) else {
            return String::new();
        };

        if agent.is_interacting {
            if let Some(gesture) = self.gestures.get(agent_id) {
                if let Some(process) = self.processes.get(&gesture.station_id) {
                    return format!(
                        "{}... {}%",
                        process.process_kind.as_str(),
                        process.progress_percent()
                    );
                }
                // Only an uncommitted hold is still waiting on a process;
                // a committed gesture with no process means it completed.
                if gesture.phase == GesturePhase::AwaitingHoldDecision {
                    if let Some(kind) = self.occupant_kind(&gesture.station_id) {
                        return format!("keep holding to process {}", kind.display_name());
                    }
                }
            }
            return "interacting".to_string();
        }

        match self.resolve_target(agent_id) {
            Some(resolved) => match (&resolved.target, resolved.intent) {
                (TargetRef::Item(item_id), InteractionIntent::PickupItem) => self
                    .items
                    .get(item_id)
                    .map(|item| format!("pick up {}", item.kind.display_name()))
                    .unwrap_or_default(),
                (TargetRef::Station(station_id), InteractionIntent::RetrieveItem) => self
                    .occupant_kind(station_id)
                    .map(|kind| format!("take {}", kind.display_name()))
                    .unwrap_or_default(),
                (TargetRef::Station(station_id), InteractionIntent::StartProcessing) => {
                    let verb = self
                        .stations
                        .get(station_id)
                        .and_then(Station::process_kind)
                        .map(contracts::ProcessKind::verb)
                        .unwrap_or("process");
                    let hold_gated = self
                        .stations
                        .get(station_id)
                        .map(|station| station.hold_to_process)
                        .unwrap_or(true);
                    match self.occupant_kind(station_id) {
                        Some(kind) if hold_gated => format!(
                            "hold to {verb} {}, tap to take",
                            kind.display_name()
                        ),
                        Some(kind) => format!("{verb} {}", kind.display_name()),
                        None => String::new(),
                    }
                }
                (TargetRef::Station(station_id), InteractionIntent::PlaceItem) => {
                    let carried = agent
                        .carried_item_id()
                        .and_then(|item_id| self.items.get(item_id))
                        .map(|item| item.kind.display_name())
                        .unwrap_or_default();
                    let station = self
                        .stations
                        .get(station_id)
                        .map(|station| station.kind.as_str().replace('_', " "))
                        .unwrap_or_default();
                    format!("place {carried} on {station}")
                }
                (TargetRef::Station(station_id), InteractionIntent::CombineItems) => {
                    let carried = agent
                        .carried_item_id()
                        .and_then(|item_id| self.items.get(item_id))
                        .map(|item| item.kind.display_name())
                        .unwrap_or_default();
                    let occupant = self
                        .occupant_kind(station_id)
                        .map(contracts::ItemKind::display_name)
                        .unwrap_or_default();
                    format!("combine {carried} with {occupant}")
                }
                (TargetRef::Station(station_id), InteractionIntent::ViewDisplay) => self
                    .occupant_kind(station_id)
                    .map(|kind| format!("look at {}", kind.display_name()))
                    .unwrap_or_default(),
                _ => String::new(),
            },
            None => match agent.carried_item_id().and_then(|id| self.items.get(id)) {
                Some(item) => format!("drop {}", item.kind.display_name()),
                None => String::new(),
            },
        }
    }

    fn occupant_kind(&self, station_id: &str) -> Option<contracts::ItemKind> {
        self.stations
            .get(station_id)
            .and_then(|station| station.occupant.as_deref())
            .and_then(|item_id| self.items.get(item_id))
            .map(|item| item.kind)
    }
}
