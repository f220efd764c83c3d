use super::*;

impl KitchenWorld {
    /// Drain every command due at `tick` in (effective_tick, insertion)
    /// order. Input arriving within one tick is applied in deterministic
    /// insertion order.
    pub(super) fn process_due_commands(&mut self, tick: u64, sequence_in_tick: &mut u64) -> u64 {
        self.queued_commands.sort_by(|a, b| {
            a.effective_tick
                .cmp(&b.effective_tick)
                .then(a.insertion_sequence.cmp(&b.insertion_sequence))
        });

        let mut future = Vec::new();
        let mut due = Vec::new();
        for queued in self.queued_commands.drain(..) {
            if queued.effective_tick <= tick {
                due.push(queued);
            } else {
                future.push(queued);
            }
        }
        self.queued_commands = future;
        self.sync_queue_depth();

        let processed = due.len() as u64;
        for queued in due {
            self.apply_command(queued.command, tick, sequence_in_tick);
        }
        processed
    }

    pub(super) fn apply_command(
        &mut self,
        command: Command,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        let command_ref = format!("cmd:{}", command.command_id);
        match &command.payload {
            CommandPayload::SimStart => self.start(),
            CommandPayload::SimPause => self.pause(),
            CommandPayload::SimStepTick { .. } | CommandPayload::SimRunToTick { .. } => {}
            CommandPayload::PressInteract { agent_id } => {
                let agent_id = agent_id.clone();
                self.handle_press(&agent_id, tick, sequence_in_tick, &command_ref);
            }
            CommandPayload::ReleaseInteract { agent_id } => {
                let agent_id = agent_id.clone();
                self.handle_release(&agent_id, tick, sequence_in_tick, &command_ref);
            }
            CommandPayload::MoveAgent {
                agent_id,
                x_cm,
                y_cm,
            } => {
                let agent_id = agent_id.clone();
                let (x_cm, y_cm) = (*x_cm, *y_cm);
                self.move_agent(&agent_id, x_cm, y_cm, tick, sequence_in_tick, &command_ref);
            }
            CommandPayload::SpawnItem { kind, x_cm, y_cm } => {
                let (kind, x_cm, y_cm) = (*kind, *x_cm, *y_cm);
                let item_id = self.mint_item_id();
                let item = Item::loose(
                    item_id.clone(),
                    kind,
                    crate::geometry::Position::new(x_cm, y_cm),
                );
                let position = item.position;
                self.items.insert(item_id.clone(), item);
                let event_id = self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::ItemSpawned,
                    vec![ActorRef::item(item_id.clone())],
                    vec![command_ref.clone()],
                    Some(json!({
                        "item_kind": kind.as_str(),
                        "x_cm": position.x_cm,
                        "y_cm": position.y_cm,
                    })),
                );
                // A new loose item is a structural change every nearby
                // agent's candidate cache must pick up.
                self.broadcast_position_change(position, tick, sequence_in_tick, &event_id);
            }
            CommandPayload::SetOrder { station_id, kind } => {
                let station_id = station_id.clone();
                let kind = *kind;
                if let Some(station) = self.stations.get_mut(&station_id) {
                    station.current_order = Some(kind);
                    let position = station.position;
                    let event_id = self.push_event(
                        tick,
                        sequence_in_tick,
                        EventType::OrderSet,
                        vec![ActorRef::station(station_id.clone())],
                        vec![command_ref.clone()],
                        Some(json!({ "order": kind.as_str() })),
                    );
                    // The acceptance predicate changed, so placement
                    // targets may have changed with it.
                    self.broadcast_position_change(position, tick, sequence_in_tick, &event_id);
                }
            }
            CommandPayload::ConsumeServed { station_id } => {
                let station_id = station_id.clone();
                self.consume_served(&station_id, tick, sequence_in_tick, &command_ref);
            }
        }

        self.push_event(
            tick,
            sequence_in_tick,
            EventType::CommandApplied,
            Vec::new(),
            vec![command_ref],
            Some(json!({ "command_type": command.command_type })),
        );
    }

    fn move_agent(
        &mut self,
        agent_id: &str,
        x_cm: i64,
        y_cm: i64,
        tick: u64,
        sequence_in_tick: &mut u64,
        command_ref: &str,
    ) {
        let Some(agent) = self.agents.get_mut(agent_id) else {
            return;
        };
        agent.position = crate::geometry::Position::new(x_cm, y_cm);
        // Carried items ride along; their position lags at most this one
        // update, never a full tick.
        let carried = agent
            .carry_slots
            .iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>();
        for item_id in carried {
            if let Some(item) = self.items.get_mut(&item_id) {
                item.position = crate::geometry::Position::new(x_cm, y_cm);
            }
        }

        let event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::AgentMoved,
            vec![ActorRef::agent(agent_id)],
            vec![command_ref.to_string()],
            Some(json!({ "x_cm": x_cm, "y_cm": y_cm })),
        );

        // Spatial enter/exit is applied before any resolution: rescan, then
        // force-release if the move walked away from a live interaction.
        self.rescan_agent(agent_id);
        self.force_release_if_out_of_range(agent_id, tick, sequence_in_tick, &event_id);
        self.refresh_highlight(agent_id, tick, sequence_in_tick, &[event_id]);
    }
}
