//! v1 cross-boundary contracts for the galley interaction kernel, CLI, and
//! any external presentation layer: session config, commands, events,
//! snapshots, and the shared interaction vocabulary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION_V1: &str = "1.0";
pub const TICKS_PER_SECOND: u64 = 60;

// ---------------------------------------------------------------------------
// Interaction vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Tomato,
    Lettuce,
    Meat,
    Bread,
    ChoppedTomato,
    ChoppedLettuce,
    ChoppedMeat,
    CookedPatty,
    Salad,
    Burger,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tomato => "tomato",
            Self::Lettuce => "lettuce",
            Self::Meat => "meat",
            Self::Bread => "bread",
            Self::ChoppedTomato => "chopped_tomato",
            Self::ChoppedLettuce => "chopped_lettuce",
            Self::ChoppedMeat => "chopped_meat",
            Self::CookedPatty => "cooked_patty",
            Self::Salad => "salad",
            Self::Burger => "burger",
        }
    }

    /// Human wording for prompt text ("chopped tomato" rather than "chopped_tomato").
    pub fn display_name(self) -> String {
        self.as_str().replace('_', " ")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Chopping,
    Cooking,
}

impl ProcessKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chopping => "chopping",
            Self::Cooking => "cooking",
        }
    }

    /// Imperative verb for prompts ("hold to chop").
    pub fn verb(self) -> &'static str {
        match self {
            Self::Chopping => "chop",
            Self::Cooking => "cook",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    Counter,
    ChoppingBoard,
    Stove,
    ServingWindow,
    Display,
}

impl StationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::ChoppingBoard => "chopping_board",
            Self::Stove => "stove",
            Self::ServingWindow => "serving_window",
            Self::Display => "display",
        }
    }

    /// The processing category this station performs, if any.
    pub fn process_kind(self) -> Option<ProcessKind> {
        match self {
            Self::ChoppingBoard => Some(ProcessKind::Chopping),
            Self::Stove => Some(ProcessKind::Cooking),
            Self::Counter | Self::ServingWindow | Self::Display => None,
        }
    }
}

/// Reference to something an agent can act upon: a loose item or a station slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TargetRef {
    Item(String),
    Station(String),
}

impl TargetRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Item(id) | Self::Station(id) => id,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Item(_) => "item",
            Self::Station(_) => "station",
        }
    }
}

/// What a resolved interaction would do if the agent pressed right now.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InteractionIntent {
    PickupItem,
    RetrieveItem,
    PlaceItem,
    CombineItems,
    StartProcessing,
    /// Passive display target: the press never acts, the prompt just
    /// describes what is shown.
    ViewDisplay,
}

impl InteractionIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PickupItem => "pickup_item",
            Self::RetrieveItem => "retrieve_item",
            Self::PlaceItem => "place_item",
            Self::CombineItems => "combine_items",
            Self::StartProcessing => "start_processing",
            Self::ViewDisplay => "view_display",
        }
    }
}

/// Why an operation was refused. Operations fail by value, never by panic;
/// prompt text for unavailable interactions is derived from this taxonomy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    Permission,
    Capacity,
    Predicate,
    ConcurrentOwnership,
}

impl Denial {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permission => "denied_by_permission",
            Self::Capacity => "denied_by_capacity",
            Self::Predicate => "denied_by_predicate",
            Self::ConcurrentOwnership => "denied_by_concurrent_ownership",
        }
    }

    pub fn prompt_reason(self) -> &'static str {
        match self {
            Self::Permission => "not allowed",
            Self::Capacity => "no space",
            Self::Predicate => "wrong item",
            Self::ConcurrentOwnership => "already taken",
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for Denial {}

/// Station permission matrix entry: who may place onto / remove from a slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "rule", content = "agent_ids", rename_all = "snake_case")]
pub enum PermissionRule {
    AllowAll,
    DenyAll,
    Only(Vec<String>),
}

impl PermissionRule {
    pub fn allows(&self, agent_id: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::DenyAll => false,
            Self::Only(ids) => ids.iter().any(|id| id == agent_id),
        }
    }
}

impl Default for PermissionRule {
    fn default() -> Self {
        Self::AllowAll
    }
}

// ---------------------------------------------------------------------------
// Session configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentSeed {
    pub agent_id: String,
    pub x_cm: i64,
    pub y_cm: i64,
    /// Processing categories this agent may perform (permission source is
    /// external configuration, never computed by the core).
    #[serde(default)]
    pub capabilities: Vec<ProcessKind>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StationSeed {
    pub station_id: String,
    pub kind: StationKind,
    pub x_cm: i64,
    pub y_cm: i64,
    /// Tap-vs-hold gating for processing stations. When off, pressing an
    /// occupied processable station starts processing immediately.
    #[serde(default = "default_true")]
    pub hold_to_process: bool,
    #[serde(default)]
    pub place_rule: PermissionRule,
    #[serde(default)]
    pub remove_rule: PermissionRule,
    #[serde(default)]
    pub initial_item: Option<ItemKind>,
    #[serde(default)]
    pub initial_order: Option<ItemKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemSeed {
    pub kind: ItemKind,
    pub x_cm: i64,
    pub y_cm: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub schema_version: String,
    pub session_id: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub duration_seconds: u32,
    pub ticks_per_second: u64,
    /// Press-duration threshold separating a tap (retrieve) from a hold
    /// (begin processing), in ticks.
    pub hold_threshold_ticks: u64,
    pub detection_radius_cm: i64,
    pub carry_slots_per_agent: u8,
    pub agents: Vec<AgentSeed>,
    pub stations: Vec<StationSeed>,
    #[serde(default)]
    pub loose_items: Vec<ItemSeed>,
    #[serde(default)]
    pub scenario_flags: BTreeMap<String, bool>,
    pub notes: Option<String>,
}

impl SessionConfig {
    pub fn max_ticks(&self) -> u64 {
        u64::from(self.duration_seconds) * self.ticks_per_second
    }
}

impl Default for SessionConfig {
    /// Default two-chef kitchen: one chopper and one cook, a shared counter,
    /// a chopping board, a stove, a serving window, and a display shelf.
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: "session_local_001".to_string(),
            seed: 1337,
            duration_seconds: 180,
            ticks_per_second: TICKS_PER_SECOND,
            hold_threshold_ticks: 30,
            detection_radius_cm: 150,
            carry_slots_per_agent: 1,
            agents: vec![
                AgentSeed {
                    agent_id: "chef_001".to_string(),
                    x_cm: 100,
                    y_cm: 100,
                    capabilities: vec![ProcessKind::Chopping],
                },
                AgentSeed {
                    agent_id: "chef_002".to_string(),
                    x_cm: 500,
                    y_cm: 100,
                    capabilities: vec![ProcessKind::Cooking],
                },
            ],
            stations: vec![
                StationSeed {
                    station_id: "station:counter_1".to_string(),
                    kind: StationKind::Counter,
                    x_cm: 300,
                    y_cm: 100,
                    hold_to_process: true,
                    place_rule: PermissionRule::AllowAll,
                    remove_rule: PermissionRule::AllowAll,
                    initial_item: None,
                    initial_order: None,
                },
                StationSeed {
                    station_id: "station:board_1".to_string(),
                    kind: StationKind::ChoppingBoard,
                    x_cm: 100,
                    y_cm: 200,
                    hold_to_process: true,
                    place_rule: PermissionRule::AllowAll,
                    remove_rule: PermissionRule::AllowAll,
                    initial_item: None,
                    initial_order: None,
                },
                StationSeed {
                    station_id: "station:stove_1".to_string(),
                    kind: StationKind::Stove,
                    x_cm: 500,
                    y_cm: 200,
                    hold_to_process: true,
                    place_rule: PermissionRule::AllowAll,
                    remove_rule: PermissionRule::AllowAll,
                    initial_item: None,
                    initial_order: None,
                },
                StationSeed {
                    station_id: "station:window_1".to_string(),
                    kind: StationKind::ServingWindow,
                    x_cm: 300,
                    y_cm: 300,
                    hold_to_process: true,
                    place_rule: PermissionRule::AllowAll,
                    remove_rule: PermissionRule::DenyAll,
                    initial_item: None,
                    initial_order: Some(ItemKind::Salad),
                },
                StationSeed {
                    station_id: "station:shelf_1".to_string(),
                    kind: StationKind::Display,
                    x_cm: 100,
                    y_cm: 300,
                    hold_to_process: true,
                    place_rule: PermissionRule::DenyAll,
                    remove_rule: PermissionRule::DenyAll,
                    initial_item: Some(ItemKind::Burger),
                    initial_order: None,
                },
            ],
            loose_items: vec![
                ItemSeed {
                    kind: ItemKind::Tomato,
                    x_cm: 80,
                    y_cm: 80,
                },
                ItemSeed {
                    kind: ItemKind::Lettuce,
                    x_cm: 120,
                    y_cm: 80,
                },
                ItemSeed {
                    kind: ItemKind::Meat,
                    x_cm: 480,
                    y_cm: 80,
                },
                ItemSeed {
                    kind: ItemKind::Bread,
                    x_cm: 520,
                    y_cm: 80,
                },
            ],
            scenario_flags: BTreeMap::new(),
            notes: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStatus {
    pub schema_version: String,
    pub session_id: String,
    pub current_tick: u64,
    pub max_ticks: u64,
    pub mode: RunMode,
    pub queue_depth: usize,
}

impl SessionStatus {
    pub fn is_complete(&self) -> bool {
        self.current_tick >= self.max_ticks
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session_id={} tick={}/{} mode={:?} queue_depth={}",
            self.session_id, self.current_tick, self.max_ticks, self.mode, self.queue_depth
        )
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    SimStart,
    SimPause,
    SimStepTick,
    SimRunToTick,
    PressInteract,
    ReleaseInteract,
    MoveAgent,
    SpawnItem,
    SetOrder,
    ConsumeServed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandPayload {
    SimStart,
    SimPause,
    SimStepTick {
        steps: u64,
    },
    SimRunToTick {
        target_tick: u64,
    },
    PressInteract {
        agent_id: String,
    },
    ReleaseInteract {
        agent_id: String,
    },
    MoveAgent {
        agent_id: String,
        x_cm: i64,
        y_cm: i64,
    },
    SpawnItem {
        kind: ItemKind,
        x_cm: i64,
        y_cm: i64,
    },
    SetOrder {
        station_id: String,
        kind: ItemKind,
    },
    ConsumeServed {
        station_id: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub schema_version: String,
    pub command_id: String,
    pub session_id: String,
    pub issued_at_tick: u64,
    pub command_type: CommandType,
    pub payload: CommandPayload,
}

impl Command {
    pub fn new(
        command_id: impl Into<String>,
        session_id: impl Into<String>,
        issued_at_tick: u64,
        command_type: CommandType,
        payload: CommandPayload,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command_id.into(),
            session_id: session_id.into(),
            issued_at_tick,
            command_type,
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorRef {
    pub actor_id: String,
    pub actor_kind: String,
}

impl ActorRef {
    pub fn agent(agent_id: impl Into<String>) -> Self {
        Self {
            actor_id: agent_id.into(),
            actor_kind: "agent".to_string(),
        }
    }

    pub fn station(station_id: impl Into<String>) -> Self {
        Self {
            actor_id: station_id.into(),
            actor_kind: "station".to_string(),
        }
    }

    pub fn item(item_id: impl Into<String>) -> Self {
        Self {
            actor_id: item_id.into(),
            actor_kind: "item".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CommandApplied,
    AgentMoved,
    ItemSpawned,
    ItemDestroyed,
    ItemPickedUp,
    ItemDropped,
    ItemPlaced,
    ItemRemoved,
    ItemCleared,
    ItemsCombined,
    CombinationRolledBack,
    ItemTransformed,
    ProcessingStarted,
    ProcessingStopped,
    ProcessingCompleted,
    InteractionDenied,
    InteractionForceReleased,
    HighlightStarted,
    HighlightStopped,
    CandidatesInvalidated,
    OrderSet,
    ItemServed,
    ServedConsumed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub schema_version: String,
    pub session_id: String,
    pub tick: u64,
    pub created_at: String,
    pub event_id: String,
    pub sequence_in_tick: u64,
    pub event_type: EventType,
    pub actors: Vec<ActorRef>,
    pub caused_by: Vec<String>,
    pub details: Option<Value>,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Serialized form of item ownership. Exactly one owner at all times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "owner", rename_all = "snake_case")]
pub enum OwnerRef {
    Ground,
    Agent { agent_id: String, slot: u8 },
    Station { station_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentSnapshot {
    pub agent_id: String,
    pub x_cm: i64,
    pub y_cm: i64,
    pub capabilities: Vec<ProcessKind>,
    pub carry_slots: Vec<Option<String>>,
    pub is_interacting: bool,
    pub current_target: Option<TargetRef>,
    pub highlighted_target: Option<TargetRef>,
    pub candidate_interactables: Vec<TargetRef>,
    pub candidate_stations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StationSnapshot {
    pub station_id: String,
    pub kind: StationKind,
    pub x_cm: i64,
    pub y_cm: i64,
    pub occupant_item_id: Option<String>,
    pub current_order: Option<ItemKind>,
    pub busy_with: Option<String>,
    pub hold_to_process: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub item_id: String,
    pub kind: ItemKind,
    pub x_cm: i64,
    pub y_cm: i64,
    pub owner: OwnerRef,
    pub independently_interactable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub process_id: String,
    pub station_id: String,
    pub agent_id: String,
    pub item_id: String,
    pub process_kind: ProcessKind,
    pub started_tick: u64,
    pub duration_ticks: u64,
    pub elapsed_ticks: u64,
    pub progress_percent: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GestureSnapshot {
    pub agent_id: String,
    pub station_id: String,
    pub phase: String,
    pub press_tick: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    pub schema_version: String,
    pub session_id: String,
    pub tick: u64,
    pub created_at: String,
    pub snapshot_id: String,
    pub state_hash: String,
    pub replay_hash: String,
    pub agents: Vec<AgentSnapshot>,
    pub stations: Vec<StationSnapshot>,
    pub items: Vec<ItemSnapshot>,
    pub processes: Vec<ProcessSnapshot>,
    pub gestures: Vec<GestureSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub schema_version: String,
    pub query_type: String,
    pub session_id: String,
    pub generated_at_tick: u64,
    pub data: Value,
}

pub mod serde_u64_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_round_trip() {
        let config = SessionConfig::default();
        let encoded = serde_json::to_string(&config).expect("serialize");
        let decoded: SessionConfig = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(config, decoded);
    }

    #[test]
    fn default_config_is_complete_kitchen() {
        let config = SessionConfig::default();
        assert!(config.hold_threshold_ticks > 0);
        assert!(config.detection_radius_cm > 0);
        assert!(config.carry_slots_per_agent >= 1);
        assert!(config.max_ticks() > 0);
        assert_eq!(config.agents.len(), 2);
        assert!(config
            .stations
            .iter()
            .any(|s| s.kind == StationKind::ChoppingBoard));
        assert!(config.stations.iter().any(|s| s.kind == StationKind::Stove));
        assert!(config
            .stations
            .iter()
            .any(|s| s.kind == StationKind::ServingWindow));
    }

    #[test]
    fn seed_serializes_as_string() {
        let config = SessionConfig::default();
        let value = serde_json::to_value(&config).expect("serialize");
        assert_eq!(value["seed"], serde_json::json!("1337"));
    }

    #[test]
    fn command_round_trip() {
        let command = Command::new(
            "cmd_001",
            "session_local_001",
            0,
            CommandType::PressInteract,
            CommandPayload::PressInteract {
                agent_id: "chef_001".to_string(),
            },
        );
        let encoded = serde_json::to_string(&command).expect("serialize");
        let decoded: Command = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(command, decoded);
    }

    #[test]
    fn permission_rule_matrix() {
        assert!(PermissionRule::AllowAll.allows("chef_001"));
        assert!(!PermissionRule::DenyAll.allows("chef_001"));
        let only = PermissionRule::Only(vec!["chef_002".to_string()]);
        assert!(only.allows("chef_002"));
        assert!(!only.allows("chef_001"));
    }

    #[test]
    fn owner_ref_round_trip() {
        let owners = vec![
            OwnerRef::Ground,
            OwnerRef::Agent {
                agent_id: "chef_001".to_string(),
                slot: 0,
            },
            OwnerRef::Station {
                station_id: "station:counter_1".to_string(),
            },
        ];
        let encoded = serde_json::to_string(&owners).expect("serialize");
        let decoded: Vec<OwnerRef> = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(owners, decoded);
    }
}
