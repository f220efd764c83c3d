use super::*;

impl KitchenWorld {
    /// Detach the occupant from a station slot without firing events: the
    /// item is "in transit", held by the caller, owned by the ground until
    /// the enclosing operation re-homes or destroys it before returning.
    fn detach_occupant(&mut self, station_id: &str) -> Option<String> {
        let station = self.stations.get_mut(station_id)?;
        let item_id = station.occupant.take()?;
        if let Some(item) = self.items.get_mut(&item_id) {
            item.owner = ItemOwner::Ground;
            item.independently_interactable = true;
        }
        Some(item_id)
    }

    /// Attach an item to a station slot: ownership transfers to the station
    /// and independent interaction is disabled so the item cannot be picked
    /// up around the station protocol.
    fn attach_occupant(&mut self, station_id: &str, item_id: &str) {
        let Some(station) = self.stations.get_mut(station_id) else {
            return;
        };
        let position = station.position;
        station.occupant = Some(item_id.to_string());
        if let Some(item) = self.items.get_mut(item_id) {
            item.owner = ItemOwner::Station {
                station_id: station_id.to_string(),
            };
            item.independently_interactable = false;
            item.position = position;
        }
    }

    fn destroy_item(&mut self, item_id: &str, tick: u64, sequence_in_tick: &mut u64, caused_by: Vec<String>) {
        if self.items.remove(item_id).is_some() {
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::ItemDestroyed,
                vec![ActorRef::item(item_id)],
                caused_by,
                None,
            );
        }
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place the carried item onto a station. Fully succeeds (ownership
    /// transferred, independent interaction disabled, event fired,
    /// invalidation broadcast) or fully fails with no state change.
    pub(super) fn place_item(
        &mut self,
        agent_id: &str,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) -> Result<(), Denial> {
        let agent = self.agents.get(agent_id).ok_or(Denial::Permission)?;
        let item_id = agent
            .carried_item_id()
            .map(str::to_string)
            .ok_or(Denial::Predicate)?;
        let kind = self.items.get(&item_id).ok_or(Denial::Predicate)?.kind;
        let station = self.stations.get(station_id).ok_or(Denial::Predicate)?;
        if !station.available_for(agent_id) {
            return Err(Denial::ConcurrentOwnership);
        }
        station.may_place(agent_id, kind, &self.recipes)?;
        let station_kind = station.kind;
        let served = station_kind == contracts::StationKind::ServingWindow
            && station.current_order == Some(kind);

        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.release_item(&item_id);
        }
        self.attach_occupant(station_id, &item_id);

        let event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::ItemPlaced,
            vec![
                ActorRef::agent(agent_id),
                ActorRef::station(station_id),
                ActorRef::item(item_id.clone()),
            ],
            vec![command_ref.to_string()],
            Some(json!({ "item_kind": kind.as_str() })),
        );
        if served {
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::ItemServed,
                vec![ActorRef::station(station_id), ActorRef::item(item_id)],
                vec![event_id.clone()],
                Some(json!({ "order": kind.as_str() })),
            );
        }
        self.broadcast_station_change(station_id, tick, sequence_in_tick, &event_id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove the occupant into the agent's carry slot: permission-checked
    /// retrieval, the tap half of the gesture classifier and the plain
    /// station pickup path.
    pub(super) fn retrieve_to_carry(
        &mut self,
        agent_id: &str,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) -> Result<(), Denial> {
        let station = self.stations.get(station_id).ok_or(Denial::Predicate)?;
        if !station.available_for(agent_id) {
            return Err(Denial::ConcurrentOwnership);
        }
        station.may_remove(agent_id)?;
        let agent = self.agents.get(agent_id).ok_or(Denial::Permission)?;
        let slot = agent.first_free_slot().ok_or(Denial::Capacity)?;

        // A retrieval under an active process cancels it; progress is lost.
        if let Some(process) = self.processes.remove(station_id) {
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::ProcessingStopped,
                vec![
                    ActorRef::agent(process.agent_id.clone()),
                    ActorRef::station(station_id),
                    ActorRef::item(process.item_id.clone()),
                ],
                vec![command_ref.to_string()],
                Some(json!({
                    "process_id": process.process_id,
                    "progress_percent": process.progress_percent(),
                })),
            );
        }

        let item_id = self.detach_occupant(station_id).ok_or(Denial::Capacity)?;
        let agent_position = self.agents.get(agent_id).map(|agent| agent.position);
        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.carry_slots[usize::from(slot)] = Some(item_id.clone());
        }
        if let Some(item) = self.items.get_mut(&item_id) {
            item.owner = ItemOwner::Agent {
                agent_id: agent_id.to_string(),
                slot,
            };
            if let Some(position) = agent_position {
                item.position = position;
            }
        }

        let event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::ItemRemoved,
            vec![
                ActorRef::agent(agent_id),
                ActorRef::station(station_id),
                ActorRef::item(item_id),
            ],
            vec![command_ref.to_string()],
            Some(json!({ "slot": slot })),
        );
        self.broadcast_station_change(station_id, tick, sequence_in_tick, &event_id);
        Ok(())
    }

    /// System-driven removal: same transfer as `retrieve_to_carry` but with
    /// no agent permission check and no carry destination; the item ends up
    /// loose on the station's position. Used for cleanup flows.
    pub(super) fn clear_item(
        &mut self,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        caused_by: Vec<String>,
    ) -> Option<String> {
        let item_id = self.detach_occupant(station_id)?;
        let event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::ItemCleared,
            vec![ActorRef::station(station_id), ActorRef::item(item_id.clone())],
            caused_by,
            None,
        );
        self.broadcast_station_change(station_id, tick, sequence_in_tick, &event_id);
        Some(item_id)
    }

    /// A customer (external collaborator) takes the served dish: clear the
    /// slot without permission checks and destroy the item.
    pub(super) fn consume_served(
        &mut self,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) {
        let Some(item_id) =
            self.clear_item(station_id, tick, sequence_in_tick, vec![command_ref.to_string()])
        else {
            return;
        };
        let kind = self.items.get(&item_id).map(|item| item.kind);
        let event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::ServedConsumed,
            vec![ActorRef::station(station_id), ActorRef::item(item_id.clone())],
            vec![command_ref.to_string()],
            kind.map(|kind| json!({ "item_kind": kind.as_str() })),
        );
        self.destroy_item(&item_id, tick, sequence_in_tick, vec![event_id.clone()]);
        self.broadcast_station_change(station_id, tick, sequence_in_tick, &event_id);
    }

    // -----------------------------------------------------------------------
    // Combination
    // -----------------------------------------------------------------------

    /// Combine the carried item with the station's occupant. The rollback is
    /// the correctness-critical step: when no combination rule exists, the
    /// original occupant is re-placed before returning failure. The station
    /// is never left empty or holding neither the original nor a result.
    pub(super) fn try_combine(
        &mut self,
        agent_id: &str,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) -> Result<(), Denial> {
        let station = self.stations.get(station_id).ok_or(Denial::Predicate)?;
        if !station.available_for(agent_id) {
            return Err(Denial::ConcurrentOwnership);
        }
        if !station.place_rule.allows(agent_id) {
            return Err(Denial::Permission);
        }
        if !station.is_occupied() {
            return Err(Denial::Capacity);
        }
        let carried_id = self
            .agents
            .get(agent_id)
            .and_then(|agent| agent.carried_item_id().map(str::to_string))
            .ok_or(Denial::Predicate)?;
        let carried_kind = self.items.get(&carried_id).ok_or(Denial::Predicate)?.kind;

        // (1) Remove the occupant; it is now in transit, held locally.
        let occupant_id = self.detach_occupant(station_id).ok_or(Denial::Capacity)?;
        let occupant_kind = self
            .items
            .get(&occupant_id)
            .map(|item| item.kind)
            .ok_or(Denial::Capacity)?;

        // (2) Ask the resolver for a combined result.
        match self.recipes.combination_result(carried_kind, occupant_kind) {
            // (3) Success: both inputs are destroyed, the result takes the slot.
            Some(result_kind) => {
                if let Some(agent) = self.agents.get_mut(agent_id) {
                    agent.release_item(&carried_id);
                }
                let result_id = self.mint_item_id();
                let position = self
                    .stations
                    .get(station_id)
                    .map(|station| station.position)
                    .unwrap_or_default();
                self.items.insert(
                    result_id.clone(),
                    Item::loose(result_id.clone(), result_kind, position),
                );
                self.attach_occupant(station_id, &result_id);
                let event_id = self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::ItemsCombined,
                    vec![
                        ActorRef::agent(agent_id),
                        ActorRef::station(station_id),
                        ActorRef::item(result_id.clone()),
                    ],
                    vec![command_ref.to_string()],
                    Some(json!({
                        "consumed": [carried_id, occupant_id],
                        "result_kind": result_kind.as_str(),
                        "result_item_id": result_id,
                    })),
                );
                self.destroy_item(&carried_id, tick, sequence_in_tick, vec![event_id.clone()]);
                self.destroy_item(&occupant_id, tick, sequence_in_tick, vec![event_id.clone()]);
                self.broadcast_station_change(station_id, tick, sequence_in_tick, &event_id);
                Ok(())
            }
            // (4) Failure: re-place the original occupant, then report.
            None => {
                self.attach_occupant(station_id, &occupant_id);
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::CombinationRolledBack,
                    vec![
                        ActorRef::agent(agent_id),
                        ActorRef::station(station_id),
                        ActorRef::item(occupant_id),
                    ],
                    vec![command_ref.to_string()],
                    Some(json!({
                        "offered_item_id": carried_id,
                        "offered_kind": carried_kind.as_str(),
                    })),
                );
                Err(Denial::Predicate)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transformation on processing completion
    // -----------------------------------------------------------------------

    /// Non-destructive transformation: remove the occupant, obtain its
    /// transformed counterpart, and only then place the result back. When no
    /// result exists the station ends up empty rather than holding a
    /// half-updated reference.
    pub(super) fn complete_process(
        &mut self,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        let Some(process) = self.processes.remove(station_id) else {
            return;
        };
        let completed_event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::ProcessingCompleted,
            vec![
                ActorRef::agent(process.agent_id.clone()),
                ActorRef::station(station_id),
                ActorRef::item(process.item_id.clone()),
            ],
            Vec::new(),
            Some(json!({
                "process_id": process.process_id,
                "process_kind": process.process_kind.as_str(),
            })),
        );

        let Some(input_id) = self.detach_occupant(station_id) else {
            return;
        };
        let input_kind = match self.items.get(&input_id) {
            Some(item) => item.kind,
            None => return,
        };
        let result = self
            .recipes
            .transformation(input_kind, process.process_kind)
            .map(|rule| rule.output);

        match result {
            Some(output_kind) => {
                let output_id = self.mint_item_id();
                let position = self
                    .stations
                    .get(station_id)
                    .map(|station| station.position)
                    .unwrap_or_default();
                self.items.insert(
                    output_id.clone(),
                    Item::loose(output_id.clone(), output_kind, position),
                );
                self.attach_occupant(station_id, &output_id);
                let event_id = self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::ItemTransformed,
                    vec![
                        ActorRef::station(station_id),
                        ActorRef::item(output_id.clone()),
                    ],
                    vec![completed_event_id.clone()],
                    Some(json!({
                        "input_item_id": input_id,
                        "input_kind": input_kind.as_str(),
                        "output_item_id": output_id,
                        "output_kind": output_kind.as_str(),
                    })),
                );
                self.destroy_item(&input_id, tick, sequence_in_tick, vec![event_id.clone()]);
                // The occupant identity changed: every agent in range must
                // re-resolve, or their caches point at a destroyed item.
                self.broadcast_station_change(station_id, tick, sequence_in_tick, &event_id);
            }
            None => {
                self.destroy_item(
                    &input_id,
                    tick,
                    sequence_in_tick,
                    vec![completed_event_id.clone()],
                );
                self.broadcast_station_change(
                    station_id,
                    tick,
                    sequence_in_tick,
                    &completed_event_id,
                );
            }
        }
    }
}
