use super::*;

impl KitchenWorld {
    pub(super) fn push_event(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
        event_type: EventType,
        actors: Vec<ActorRef>,
        caused_by: Vec<String>,
        details: Option<Value>,
    ) -> String {
        *sequence_in_tick = sequence_in_tick.saturating_add(1);
        let event_id = format!("evt_{tick:06}_{:04}", *sequence_in_tick);
        self.event_log.push(Event {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: self.status.session_id.clone(),
            tick,
            created_at: synthetic_timestamp(tick, *sequence_in_tick),
            event_id: event_id.clone(),
            sequence_in_tick: *sequence_in_tick,
            event_type,
            actors,
            caused_by,
            details,
        });
        self.replay_hash = mix_replay_hash(self.replay_hash, &event_id, tick, *sequence_in_tick);
        event_id
    }

    pub(super) fn push_denial_event(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
        agent_id: &str,
        target: &TargetRef,
        intent: InteractionIntent,
        denial: Denial,
        caused_by: Vec<String>,
    ) -> String {
        let actor = match target {
            TargetRef::Item(id) => ActorRef::item(id.clone()),
            TargetRef::Station(id) => ActorRef::station(id.clone()),
        };
        self.push_event(
            tick,
            sequence_in_tick,
            EventType::InteractionDenied,
            vec![ActorRef::agent(agent_id), actor],
            caused_by,
            Some(json!({
                "intent": intent.as_str(),
                "denial": denial.as_str(),
                "reason": denial.prompt_reason(),
            })),
        )
    }
}
