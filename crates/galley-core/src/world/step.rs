use super::*;

impl KitchenWorld {
    pub fn start(&mut self) {
        if !self.status.is_complete() {
            self.status.mode = RunMode::Running;
        }
    }

    pub fn pause(&mut self) {
        self.status.mode = RunMode::Paused;
    }

    pub fn session_id(&self) -> &str {
        &self.status.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn events(&self) -> &[Event] {
        &self.event_log
    }

    pub fn replay_hash(&self) -> u64 {
        self.replay_hash
    }

    pub fn last_step_metrics(&self) -> StepMetrics {
        self.last_step_metrics
    }

    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    pub fn station(&self, station_id: &str) -> Option<&Station> {
        self.stations.get(station_id)
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.get(item_id)
    }

    pub fn process_for_station(&self, station_id: &str) -> Option<&ProcessingProcess> {
        self.processes.get(station_id)
    }

    pub fn gesture_for_agent(&self, agent_id: &str) -> Option<&GestureState> {
        self.gestures.get(agent_id)
    }

    pub fn enqueue_command(&mut self, command: Command, effective_tick: u64) {
        self.queued_commands.push(QueuedCommand {
            effective_tick,
            insertion_sequence: self.next_command_sequence,
            command,
        });
        self.next_command_sequence = self.next_command_sequence.saturating_add(1);
        self.sync_queue_depth();
    }

    /// Queue a command for the next tick.
    pub fn inject_command(&mut self, command: Command) {
        let effective_tick = self.status.current_tick + 1;
        self.enqueue_command(command, effective_tick);
    }

    /// Advance one tick. Ordering inside the tick is fixed: due commands
    /// (input and movement, each applying its own synchronous invalidation),
    /// then gesture threshold checks, then process progress. Returns false
    /// once the session is complete.
    pub fn step(&mut self) -> bool {
        let previous_tick = self.status.current_tick;
        self.last_step_metrics = StepMetrics::default();
        if self.status.is_complete() {
            self.status.mode = RunMode::Paused;
            return false;
        }
        self.status.mode = RunMode::Running;
        let tick = self.status.current_tick.saturating_add(1);
        if tick > self.status.max_ticks {
            self.status.mode = RunMode::Paused;
            return false;
        }
        self.status.current_tick = tick;
        let mut sequence_in_tick = 0_u64;

        let processed_commands = self.process_due_commands(tick, &mut sequence_in_tick);
        self.tick_gestures(tick, &mut sequence_in_tick);
        let completed_processes = self.tick_processes(tick, &mut sequence_in_tick);

        self.state_hash = mix_state_hash(self.state_hash, tick, sequence_in_tick);
        self.last_step_metrics = StepMetrics {
            advanced_ticks: self.status.current_tick.saturating_sub(previous_tick),
            processed_commands,
            completed_processes,
        };

        if self.status.current_tick >= self.status.max_ticks {
            self.status.mode = RunMode::Paused;
        }
        self.sync_queue_depth();

        true
    }

    pub fn step_n(&mut self, n: u64) -> u64 {
        let mut committed = 0_u64;
        for _ in 0..n {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    pub fn run_to_tick(&mut self, tick: u64) -> u64 {
        let mut committed = 0_u64;
        while self.status.current_tick < tick {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    pub(super) fn sync_queue_depth(&mut self) {
        self.status.queue_depth = self.queued_commands.len();
    }

    /// Hold-threshold pass: every gesture still awaiting its decision checks
    /// the threshold; reaching it attempts to start the process. A failed
    /// start applies the full reset discipline so the station never sticks.
    ///
    /// Runs after the command drain, so a release due this tick has already
    /// consumed its gesture: a release landing exactly on the threshold tick
    /// resolves as a tap, never a process start.
    fn tick_gestures(&mut self, tick: u64, sequence_in_tick: &mut u64) {
        let due = self
            .gestures
            .iter()
            .filter(|(_, gesture)| {
                gesture.evaluate(tick, self.config.hold_threshold_ticks)
                    == HoldDecision::ThresholdReached
            })
            .map(|(agent_id, _)| agent_id.clone())
            .collect::<Vec<_>>();
        for agent_id in due {
            self.commit_hold_gesture(&agent_id, tick, sequence_in_tick);
        }
    }

    /// Process progress pass: advance every active process one tick and run
    /// the completion transformation for those that finish.
    fn tick_processes(&mut self, tick: u64, sequence_in_tick: &mut u64) -> u64 {
        let mut completed = Vec::new();
        for (station_id, process) in self.processes.iter_mut() {
            if process.advance() == ProcessStep::Completed {
                completed.push(station_id.clone());
            }
        }
        let count = completed.len() as u64;
        for station_id in completed {
            self.complete_process(&station_id, tick, sequence_in_tick);
        }
        count
    }
}
