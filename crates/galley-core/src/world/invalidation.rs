use super::*;

use crate::geometry::Position;

impl KitchenWorld {
    /// Synchronous cache invalidation: candidate lists are caches, not live
    /// queries, and caches do not self-invalidate. Every structural change
    /// at a position forces each agent whose detection volume covers it to
    /// purge stale entries, re-scan, and re-run the highlight transition
    /// before the mutation returns to its caller.
    pub(super) fn broadcast_position_change(
        &mut self,
        position: Position,
        tick: u64,
        sequence_in_tick: &mut u64,
        cause_event_id: &str,
    ) {
        let affected = self
            .agents
            .values()
            .filter(|agent| agent.detection_volume().contains(position))
            .map(|agent| agent.agent_id.clone())
            .collect::<Vec<_>>();
        if affected.is_empty() {
            return;
        }

        self.push_event(
            tick,
            sequence_in_tick,
            EventType::CandidatesInvalidated,
            affected.iter().cloned().map(ActorRef::agent).collect(),
            vec![cause_event_id.to_string()],
            Some(json!({ "agent_count": affected.len() })),
        );

        // The rescan replaces both caches wholesale; no purge needed first.
        for agent_id in affected {
            self.rescan_agent(&agent_id);
            self.refresh_highlight(
                &agent_id,
                tick,
                sequence_in_tick,
                &[cause_event_id.to_string()],
            );
        }
    }

    /// Invalidation for a station whose occupant identity changed outside
    /// (or inside) an agent's own press/release flow.
    pub(super) fn broadcast_station_change(
        &mut self,
        station_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
        cause_event_id: &str,
    ) {
        let Some(position) = self
            .stations
            .get(station_id)
            .map(|station| station.position)
        else {
            return;
        };
        self.broadcast_position_change(position, tick, sequence_in_tick, cause_event_id);
    }
}
