use super::*;

impl KitchenWorld {
    /// Build a world from explicit configuration and an injected recipe
    /// book. There are no ambient singletons; every collaborator arrives
    /// through this constructor so tests can assemble worlds directly.
    pub fn new(config: SessionConfig, recipes: RecipeBook) -> Self {
        let status = SessionStatus {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: config.session_id.clone(),
            current_tick: 0,
            max_ticks: config.max_ticks(),
            mode: RunMode::Paused,
            queue_depth: 0,
        };

        let mut world = Self {
            status,
            recipes,
            queued_commands: Vec::new(),
            next_command_sequence: 0,
            event_log: Vec::new(),
            agents: BTreeMap::new(),
            stations: BTreeMap::new(),
            items: BTreeMap::new(),
            processes: BTreeMap::new(),
            gestures: BTreeMap::new(),
            next_item_sequence: 0,
            next_process_sequence: 0,
            state_hash: config.seed,
            replay_hash: config.seed,
            last_step_metrics: StepMetrics::default(),
            config,
        };

        for seed in world.config.stations.clone() {
            let mut station = Station::from_seed(&seed);
            if let Some(kind) = seed.initial_item {
                let item_id = world.mint_item_id();
                let mut item = Item::loose(item_id.clone(), kind, station.position);
                item.owner = ItemOwner::Station {
                    station_id: station.station_id.clone(),
                };
                item.independently_interactable = false;
                world.items.insert(item_id.clone(), item);
                station.occupant = Some(item_id);
            }
            world.stations.insert(station.station_id.clone(), station);
        }

        for seed in world.config.loose_items.clone() {
            let item_id = world.mint_item_id();
            let item = Item::loose(
                item_id.clone(),
                seed.kind,
                crate::geometry::Position::new(seed.x_cm, seed.y_cm),
            );
            world.items.insert(item_id, item);
        }

        for seed in world.config.agents.clone() {
            let agent = Agent::from_seed(&seed, &world.config);
            world.agents.insert(agent.agent_id.clone(), agent);
        }

        // Initial scan so the highlight invariant holds from tick zero.
        let agent_ids = world.agents.keys().cloned().collect::<Vec<_>>();
        let mut sequence_in_tick = 0_u64;
        for agent_id in agent_ids {
            world.rescan_agent(&agent_id);
            world.refresh_highlight(&agent_id, 0, &mut sequence_in_tick, &[]);
        }

        world
    }

    /// Default kitchen with the standard recipe book.
    pub fn with_default_layout() -> Self {
        Self::new(SessionConfig::default(), RecipeBook::standard())
    }

    pub(super) fn mint_item_id(&mut self) -> String {
        self.next_item_sequence = self.next_item_sequence.saturating_add(1);
        format!("item_{:06}", self.next_item_sequence)
    }

    pub(super) fn mint_process_id(&mut self) -> String {
        self.next_process_sequence = self.next_process_sequence.saturating_add(1);
        format!("proc_{:06}", self.next_process_sequence)
    }
}
