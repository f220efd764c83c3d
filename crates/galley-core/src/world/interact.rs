use super::*;

impl KitchenWorld {
    // -----------------------------------------------------------------------
    // Candidate detection
    // -----------------------------------------------------------------------

    /// Classify a station as an empty-handed interactable for `agent`, or
    /// `None` when it offers nothing right now. Shared by the scan and the
    /// lazy cleanup so a cached entry is valid exactly while this still
    /// returns a class.
    fn station_entry_class(&self, agent: &Agent, station: &Station) -> Option<TargetClass> {
        if !station.available_for(&agent.agent_id) {
            return None;
        }
        let occupant_id = station.occupant.as_deref()?;
        let occupant = self.items.get(occupant_id)?;
        if let Some(process) = station.process_kind() {
            if self.recipes.can_transform(occupant.kind, process) && agent.can_process(process) {
                return Some(TargetClass::ProcessableStation);
            }
        }
        if !station.remove_rule.allows(&agent.agent_id) {
            // An occupied display with removal denied still surfaces as a
            // prompt-only candidate at the bottom of the priority order.
            return match station.kind {
                contracts::StationKind::Display => Some(TargetClass::Display),
                _ => None,
            };
        }
        match station.kind {
            contracts::StationKind::ServingWindow => Some(TargetClass::ServingRetrieve),
            _ => Some(TargetClass::StationRetrieve),
        }
    }

    /// Whether a station belongs in the distance-ordered station cache at
    /// all: it must be in range and the permission matrix must give the
    /// agent at least one of place or remove.
    fn station_is_candidate(&self, agent: &Agent, station: &Station) -> bool {
        station.place_rule.allows(&agent.agent_id) || station.remove_rule.allows(&agent.agent_id)
    }

    /// Rebuild both candidate caches from a full scan of the agent's
    /// detection volume. This is the enter/exit application point; it runs
    /// on movement and on every invalidation broadcast.
    pub(super) fn rescan_agent(&mut self, agent_id: &str) {
        let Some(agent) = self.agents.get(agent_id) else {
            return;
        };
        let volume = agent.detection_volume();

        let mut interactables = Vec::new();
        for item in self.items.values() {
            if item.available_for_pickup() && volume.contains(item.position) {
                interactables.push(CandidateEntry::new(
                    TargetRef::Item(item.item_id.clone()),
                    TargetClass::LooseItem,
                    agent.position.distance_sq(item.position),
                ));
            }
        }

        let mut stations = Vec::new();
        for station in self.stations.values() {
            if !volume.contains(station.position) {
                continue;
            }
            let distance_sq = agent.position.distance_sq(station.position);
            if self.station_is_candidate(agent, station) {
                stations.push(StationCandidate {
                    station_id: station.station_id.clone(),
                    distance_sq,
                });
            }
            if let Some(class) = self.station_entry_class(agent, station) {
                interactables.push(CandidateEntry::new(
                    TargetRef::Station(station.station_id.clone()),
                    class,
                    distance_sq,
                ));
            }
        }

        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.set_candidates(interactables, stations);
        }
    }

    /// Lazy purge on read: drop cached entries whose referent is gone or no
    /// longer offers an interaction.
    pub(super) fn cleanup_invalid_candidates(&mut self, agent_id: &str) {
        let Some(agent) = self.agents.get(agent_id) else {
            return;
        };
        let mut valid_targets = std::collections::BTreeSet::new();
        for entry in &agent.candidate_interactables {
            let keep = match &entry.target {
                TargetRef::Item(item_id) => self
                    .items
                    .get(item_id)
                    .is_some_and(Item::available_for_pickup),
                TargetRef::Station(station_id) => self
                    .stations
                    .get(station_id)
                    .and_then(|station| self.station_entry_class(agent, station))
                    .is_some(),
            };
            if keep {
                valid_targets.insert(entry.target.clone());
            }
        }
        let mut valid_stations = std::collections::BTreeSet::new();
        for candidate in &agent.candidate_stations {
            let keep = self
                .stations
                .get(&candidate.station_id)
                .is_some_and(|station| self.station_is_candidate(agent, station));
            if keep {
                valid_stations.insert(candidate.station_id.clone());
            }
        }

        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.purge_candidates(
                |target| valid_targets.contains(target),
                |station_id| valid_stations.contains(station_id),
            );
        }
    }

    // -----------------------------------------------------------------------
    // Target resolution
    // -----------------------------------------------------------------------

    /// Pick "the interactable this agent would use right now". Pure with
    /// respect to the world: no side effects, so transitions can be detected
    /// by calling it before and after a change. Invalid cached entries are
    /// skipped here and purged separately by the lazy cleanup.
    pub fn resolve_target(&self, agent_id: &str) -> Option<ResolvedTarget> {
        let agent = self.agents.get(agent_id)?;

        if let Some(carried_id) = agent.carried_item_id() {
            let carried = self.items.get(carried_id)?;
            // Carrying: station logic. Only the nearest in-range station is
            // evaluated; the explicit intent priority there is
            // combine > place > none (ground drop on press).
            let station = agent
                .candidate_stations
                .iter()
                .find_map(|candidate| self.stations.get(&candidate.station_id))?;
            if !station.available_for(agent_id) {
                return None;
            }
            if let Some(occupant_id) = station.occupant.as_deref() {
                let occupant = self.items.get(occupant_id)?;
                if station.kind == contracts::StationKind::Counter
                    && station.place_rule.allows(agent_id)
                    && self.recipes.can_combine(carried.kind, occupant.kind)
                {
                    return Some(ResolvedTarget {
                        target: TargetRef::Station(station.station_id.clone()),
                        intent: InteractionIntent::CombineItems,
                    });
                }
                return None;
            }
            if station.may_place(agent_id, carried.kind, &self.recipes).is_ok() {
                return Some(ResolvedTarget {
                    target: TargetRef::Station(station.station_id.clone()),
                    intent: InteractionIntent::PlaceItem,
                });
            }
            return None;
        }

        // Empty-handed: head of the priority-ordered candidate list,
        // skipping entries that have silently gone stale.
        for entry in &agent.candidate_interactables {
            match &entry.target {
                TargetRef::Item(item_id) => {
                    if self
                        .items
                        .get(item_id)
                        .is_some_and(Item::available_for_pickup)
                    {
                        return Some(ResolvedTarget {
                            target: entry.target.clone(),
                            intent: InteractionIntent::PickupItem,
                        });
                    }
                }
                TargetRef::Station(station_id) => {
                    let Some(station) = self.stations.get(station_id) else {
                        continue;
                    };
                    let Some(class) = self.station_entry_class(agent, station) else {
                        continue;
                    };
                    let intent = match class {
                        TargetClass::ProcessableStation => InteractionIntent::StartProcessing,
                        TargetClass::Display => InteractionIntent::ViewDisplay,
                        _ => InteractionIntent::RetrieveItem,
                    };
                    return Some(ResolvedTarget {
                        target: entry.target.clone(),
                        intent,
                    });
                }
            }
        }
        None
    }

    // -----------------------------------------------------------------------
    // Highlighting
    // -----------------------------------------------------------------------

    /// Re-establish `highlighted_target == resolve_target()` synchronously.
    /// Suspended while the agent is mid-interaction; stopping a highlight
    /// that is already inactive is a no-op.
    pub(super) fn refresh_highlight(
        &mut self,
        agent_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        caused_by: &[String],
    ) {
        let Some(agent) = self.agents.get(agent_id) else {
            return;
        };
        if agent.is_interacting {
            return;
        }
        let new_target = self.resolve_target(agent_id).map(|resolved| resolved.target);
        let old_target = agent.highlighted_target.clone();
        if new_target == old_target {
            return;
        }
        if let Some(old) = old_target {
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::HighlightStopped,
                vec![ActorRef::agent(agent_id)],
                caused_by.to_vec(),
                Some(json!({ "target_kind": old.kind_str(), "target_id": old.id() })),
            );
        }
        if let Some(new) = &new_target {
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::HighlightStarted,
                vec![ActorRef::agent(agent_id)],
                caused_by.to_vec(),
                Some(json!({ "target_kind": new.kind_str(), "target_id": new.id() })),
            );
        }
        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.highlighted_target = new_target;
        }
    }

    // -----------------------------------------------------------------------
    // Press / release
    // -----------------------------------------------------------------------

    pub(super) fn handle_press(
        &mut self,
        agent_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) {
        let Some(agent) = self.agents.get(agent_id) else {
            return;
        };
        if agent.is_interacting {
            return;
        }
        self.cleanup_invalid_candidates(agent_id);

        let Some(resolved) = self.resolve_target(agent_id) else {
            // Ground-drop fallback: carrying with nowhere to put it.
            if self
                .agents
                .get(agent_id)
                .is_some_and(Agent::is_carrying)
            {
                self.drop_carried(agent_id, tick, sequence_in_tick, command_ref);
            }
            return;
        };

        let outcome = match (&resolved.target, resolved.intent) {
            (TargetRef::Item(item_id), InteractionIntent::PickupItem) => {
                let item_id = item_id.clone();
                self.pickup_loose_item(agent_id, &item_id, tick, sequence_in_tick, command_ref)
            }
            (TargetRef::Station(station_id), InteractionIntent::PlaceItem) => {
                let station_id = station_id.clone();
                self.place_item(agent_id, &station_id, tick, sequence_in_tick, command_ref)
            }
            (TargetRef::Station(station_id), InteractionIntent::CombineItems) => {
                let station_id = station_id.clone();
                self.try_combine(agent_id, &station_id, tick, sequence_in_tick, command_ref)
            }
            (TargetRef::Station(station_id), InteractionIntent::RetrieveItem) => {
                let station_id = station_id.clone();
                self.retrieve_to_carry(agent_id, &station_id, tick, sequence_in_tick, command_ref)
            }
            (TargetRef::Station(station_id), InteractionIntent::StartProcessing) => {
                let station_id = station_id.clone();
                self.press_processable_station(
                    agent_id,
                    &station_id,
                    tick,
                    sequence_in_tick,
                    command_ref,
                )
            }
            // A display is view-only; the press itself is always refused.
            (TargetRef::Station(_), InteractionIntent::ViewDisplay) => Err(Denial::Permission),
            _ => return,
        };

        match outcome {
            Ok(()) => {
                if let Some(agent) = self.agents.get_mut(agent_id) {
                    agent.current_target = Some(resolved.target);
                    agent.is_interacting = true;
                }
            }
            Err(denial) => {
                // A failed attempt leaves no residual state behind.
                self.push_denial_event(
                    tick,
                    sequence_in_tick,
                    agent_id,
                    &resolved.target,
                    resolved.intent,
                    denial,
                    vec![command_ref.to_string()],
                );
            }
        }
    }

    pub(super) fn handle_release(
        &mut self,
        agent_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) {
        let Some(agent) = self.agents.get(agent_id) else {
            return;
        };
        if !agent.is_interacting {
            return;
        }

        if let Some(gesture) = self.gestures.remove(agent_id) {
            let station_id = gesture.station_id.clone();
            match gesture.release() {
                ReleaseAction::TapRetrieve => {
                    if let Err(denial) = self.retrieve_to_carry(
                        agent_id,
                        &station_id,
                        tick,
                        sequence_in_tick,
                        command_ref,
                    ) {
                        self.push_denial_event(
                            tick,
                            sequence_in_tick,
                            agent_id,
                            &TargetRef::Station(station_id.clone()),
                            InteractionIntent::RetrieveItem,
                            denial,
                            vec![command_ref.to_string()],
                        );
                    }
                }
                ReleaseAction::StopProcess => {
                    self.stop_process(&station_id, tick, sequence_in_tick, command_ref);
                }
            }
        }

        self.reset_interaction(agent_id);
        self.cleanup_invalid_candidates(agent_id);
        self.refresh_highlight(agent_id, tick, sequence_in_tick, &[command_ref.to_string()]);
    }

    /// Press against an occupied, processable station: hold-gated stations
    /// arm the classifier; with gating off, processing starts immediately
    /// (already committed, so release stops it).
    fn press_processable_station(
        &mut self,
        agent_id: &str,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) -> Result<(), Denial> {
        let hold_to_process = self
            .stations
            .get(station_id)
            .ok_or(Denial::Predicate)?
            .hold_to_process;

        if hold_to_process {
            let mut gesture = GestureState::press(agent_id, station_id, tick);
            if self.config.hold_threshold_ticks == 0 {
                self.start_process(agent_id, station_id, tick, sequence_in_tick, command_ref)?;
                gesture.commit();
            }
            self.gestures.insert(agent_id.to_string(), gesture);
        } else {
            self.start_process(agent_id, station_id, tick, sequence_in_tick, command_ref)?;
            let mut gesture = GestureState::press(agent_id, station_id, tick);
            gesture.commit();
            self.gestures.insert(agent_id.to_string(), gesture);
        }
        if let Some(station) = self.stations.get_mut(station_id) {
            station.busy_with = Some(agent_id.to_string());
        }
        Ok(())
    }

    /// Hold threshold reached: try to start the process. On success the
    /// gesture commits; on failure the attempt resets fully so the next
    /// press starts from a clean slate.
    pub(super) fn commit_hold_gesture(
        &mut self,
        agent_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        let Some(gesture) = self.gestures.get(agent_id) else {
            return;
        };
        let station_id = gesture.station_id.clone();
        match self.start_process(agent_id, &station_id, tick, sequence_in_tick, "") {
            Ok(()) => {
                if let Some(gesture) = self.gestures.get_mut(agent_id) {
                    gesture.commit();
                }
            }
            Err(denial) => {
                self.push_denial_event(
                    tick,
                    sequence_in_tick,
                    agent_id,
                    &TargetRef::Station(station_id.clone()),
                    InteractionIntent::StartProcessing,
                    denial,
                    Vec::new(),
                );
                self.gestures.remove(agent_id);
                self.reset_interaction(agent_id);
                self.refresh_highlight(agent_id, tick, sequence_in_tick, &[]);
            }
        }
    }

    fn start_process(
        &mut self,
        agent_id: &str,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) -> Result<(), Denial> {
        if self.processes.contains_key(station_id) {
            return Err(Denial::ConcurrentOwnership);
        }
        let station = self.stations.get(station_id).ok_or(Denial::Predicate)?;
        let process_kind = station.process_kind().ok_or(Denial::Predicate)?;
        let occupant_id = station.occupant.clone().ok_or(Denial::Capacity)?;
        let occupant = self.items.get(&occupant_id).ok_or(Denial::Capacity)?;
        let rule = self
            .recipes
            .transformation(occupant.kind, process_kind)
            .ok_or(Denial::Predicate)?
            .clone();
        let agent = self.agents.get(agent_id).ok_or(Denial::Permission)?;
        if !agent.can_process(process_kind) {
            return Err(Denial::Permission);
        }

        let process_id = self.mint_process_id();
        let process = ProcessingProcess::start(
            process_id.clone(),
            station_id,
            agent_id,
            occupant_id.clone(),
            process_kind,
            tick,
            rule.duration_ticks,
        );
        self.processes.insert(station_id.to_string(), process);
        let caused_by = if command_ref.is_empty() {
            Vec::new()
        } else {
            vec![command_ref.to_string()]
        };
        self.push_event(
            tick,
            sequence_in_tick,
            EventType::ProcessingStarted,
            vec![
                ActorRef::agent(agent_id),
                ActorRef::station(station_id),
                ActorRef::item(occupant_id),
            ],
            caused_by,
            Some(json!({
                "process_id": process_id,
                "process_kind": process_kind.as_str(),
                "duration_ticks": rule.duration_ticks,
            })),
        );
        Ok(())
    }

    /// Explicit stop: the process is destroyed and its progress discarded.
    /// A no-op when the process already completed under the held press.
    fn stop_process(
        &mut self,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) {
        let Some(process) = self.processes.remove(station_id) else {
            return;
        };
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

    fn pickup_loose_item(
        &mut self,
        agent_id: &str,
        item_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) -> Result<(), Denial> {
        let item = self.items.get(item_id).ok_or(Denial::ConcurrentOwnership)?;
        if !item.available_for_pickup() {
            return Err(Denial::ConcurrentOwnership);
        }
        let agent = self.agents.get_mut(agent_id).ok_or(Denial::Permission)?;
        let slot = agent.store_item(item_id).ok_or(Denial::Capacity)?;
        let agent_position = agent.position;
        if let Some(item) = self.items.get_mut(item_id) {
            item.owner = ItemOwner::Agent {
                agent_id: agent_id.to_string(),
                slot,
            };
            item.position = agent_position;
        }
        let event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::ItemPickedUp,
            vec![ActorRef::agent(agent_id), ActorRef::item(item_id)],
            vec![command_ref.to_string()],
            Some(json!({ "slot": slot })),
        );
        self.broadcast_position_change(agent_position, tick, sequence_in_tick, &event_id);
        Ok(())
    }

    fn drop_carried(
        &mut self,
        agent_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) {
        let Some(agent) = self.agents.get_mut(agent_id) else {
            return;
        };
        let Some(item_id) = agent.carried_item_id().map(str::to_string) else {
            return;
        };
        agent.release_item(&item_id);
        let position = agent.position;
        if let Some(item) = self.items.get_mut(&item_id) {
            item.owner = ItemOwner::Ground;
            item.position = position;
        }
        let event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::ItemDropped,
            vec![ActorRef::agent(agent_id), ActorRef::item(item_id)],
            vec![command_ref.to_string()],
            None,
        );
        self.broadcast_position_change(position, tick, sequence_in_tick, &event_id);
    }

    // -----------------------------------------------------------------------
    // Reset discipline and range-exit
    // -----------------------------------------------------------------------

    /// The reset discipline: every terminal transition clears the gesture,
    /// the station's interactor, and the agent's interaction flags before
    /// any subsequent press is processed. Skipping any of these produces a
    /// stuck interactable that silently ignores future presses.
    pub(super) fn reset_interaction(&mut self, agent_id: &str) {
        self.gestures.remove(agent_id);
        for station in self.stations.values_mut() {
            if station.busy_with.as_deref() == Some(agent_id) {
                station.busy_with = None;
            }
        }
        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.current_target = None;
            agent.is_interacting = false;
        }
    }

    /// An interacting agent whose detection volume no longer contains its
    /// current target is force-released: process destroyed, reset discipline
    /// applied.
    pub(super) fn force_release_if_out_of_range(
        &mut self,
        agent_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        cause_event_id: &str,
    ) {
        let Some(agent) = self.agents.get(agent_id) else {
            return;
        };
        if !agent.is_interacting {
            return;
        }
        let Some(target) = agent.current_target.clone() else {
            return;
        };
        let target_position = match &target {
            TargetRef::Item(item_id) => self.items.get(item_id).map(|item| item.position),
            TargetRef::Station(station_id) => {
                self.stations.get(station_id).map(|station| station.position)
            }
        };
        let in_range = target_position
            .map(|position| agent.detection_volume().contains(position))
            .unwrap_or(false);
        if in_range {
            return;
        }

        if let TargetRef::Station(station_id) = &target {
            let owned_by_agent = self
                .processes
                .get(station_id)
                .is_some_and(|process| process.agent_id == agent_id);
            if owned_by_agent {
                self.stop_process(station_id, tick, sequence_in_tick, cause_event_id);
            }
        }
        self.push_event(
            tick,
            sequence_in_tick,
            EventType::InteractionForceReleased,
            vec![ActorRef::agent(agent_id)],
            vec![cause_event_id.to_string()],
            Some(json!({
                "target_kind": target.kind_str(),
                "target_id": target.id(),
            })),
        );
        self.reset_interaction(agent_id);
    }
}
