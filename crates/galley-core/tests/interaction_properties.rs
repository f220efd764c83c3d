use contracts::{
    Command, CommandPayload, CommandType, EventType, InteractionIntent, ItemKind, SessionConfig,
    TargetRef,
};
use galley_core::recipes::RecipeBook;
use galley_core::world::KitchenWorld;
use proptest::prelude::*;

fn base_config() -> SessionConfig {
    SessionConfig::default()
}

fn world_with(config: SessionConfig) -> KitchenWorld {
    KitchenWorld::new(config, RecipeBook::standard())
}

fn command(world: &KitchenWorld, id: &str, command_type: CommandType, payload: CommandPayload) -> Command {
    Command::new(
        id,
        world.session_id().to_string(),
        world.status().current_tick,
        command_type,
        payload,
    )
}

fn press(world: &mut KitchenWorld, agent_id: &str, id: &str) {
    let command = command(
        world,
        id,
        CommandType::PressInteract,
        CommandPayload::PressInteract {
            agent_id: agent_id.to_string(),
        },
    );
    world.inject_command(command);
    world.step();
}

fn release(world: &mut KitchenWorld, agent_id: &str, id: &str) {
    let command = command(
        world,
        id,
        CommandType::ReleaseInteract,
        CommandPayload::ReleaseInteract {
            agent_id: agent_id.to_string(),
        },
    );
    world.inject_command(command);
    world.step();
}

fn move_to(world: &mut KitchenWorld, agent_id: &str, x_cm: i64, y_cm: i64, id: &str) {
    let command = command(
        world,
        id,
        CommandType::MoveAgent,
        CommandPayload::MoveAgent {
            agent_id: agent_id.to_string(),
            x_cm,
            y_cm,
        },
    );
    world.inject_command(command);
    world.step();
}

/// Park chef_001's tomato on the chopping board and clear the interaction,
/// leaving the board ready for a tap-vs-hold press.
fn stage_tomato_on_board(world: &mut KitchenWorld) {
    press(world, "chef_001", "stage_pick");
    release(world, "chef_001", "stage_pick_r");
    press(world, "chef_001", "stage_place");
    release(world, "chef_001", "stage_place_r");
    assert!(world
        .station("station:board_1")
        .is_some_and(|station| station.occupant.is_some()));
}

#[test]
fn property_1_single_press_resolves_exactly_one_target() {
    let world = world_with(base_config());
    // Two loose items and a station are candidates simultaneously; the
    // resolution is a single deterministic winner.
    let first = world.resolve_target("chef_001").expect("target");
    let second = world.resolve_target("chef_001").expect("target");
    assert_eq!(first, second);
    assert_eq!(first.intent, InteractionIntent::PickupItem);
}

#[test]
fn property_2_tap_below_threshold_never_starts_processing() {
    let mut world = world_with(base_config());
    stage_tomato_on_board(&mut world);

    press(&mut world, "chef_001", "tap");
    release(&mut world, "chef_001", "tap_r");

    assert!(world.process_for_station("station:board_1").is_none());
    assert!(!world
        .events()
        .iter()
        .any(|event| event.event_type == EventType::ProcessingStarted));
    assert!(world
        .agent("chef_001")
        .is_some_and(|agent| agent.carried_item_id().is_some()));
}

#[test]
fn property_3_hold_threshold_boundary_is_inclusive() {
    let mut world = world_with(base_config());
    let threshold = world.config().hold_threshold_ticks;
    stage_tomato_on_board(&mut world);

    press(&mut world, "chef_001", "hold");
    world.step_n(threshold - 1);
    assert!(
        world.process_for_station("station:board_1").is_none(),
        "one tick early must still be waiting"
    );
    world.step();
    assert!(
        world.process_for_station("station:board_1").is_some(),
        "threshold tick itself commits the hold"
    );
}

#[test]
fn property_4_zero_threshold_starts_processing_on_press() {
    let mut config = base_config();
    config.hold_threshold_ticks = 0;
    let mut world = world_with(config);
    stage_tomato_on_board(&mut world);

    press(&mut world, "chef_001", "press");
    assert!(world.process_for_station("station:board_1").is_some());

    // Release still stops it, same as an interrupted hold.
    release(&mut world, "chef_001", "press_r");
    assert!(world.process_for_station("station:board_1").is_none());
    assert!(world
        .events()
        .iter()
        .any(|event| event.event_type == EventType::ProcessingStopped));
}

#[test]
fn property_5_occupied_processable_station_outranks_loose_items() {
    let mut world = world_with(base_config());
    stage_tomato_on_board(&mut world);

    // The lettuce is nearer than the board, but the board carries a
    // choppable occupant and chef_001 can chop.
    let resolved = world.resolve_target("chef_001").expect("target");
    assert_eq!(
        resolved.target,
        TargetRef::Station("station:board_1".to_string())
    );
    assert_eq!(resolved.intent, InteractionIntent::StartProcessing);
}

#[test]
fn property_6_capability_gap_downgrades_station_to_retrieve() {
    let mut world = world_with(base_config());
    stage_tomato_on_board(&mut world);

    // chef_002 cannot chop, so the same occupied board is only a retrieve
    // target for it.
    move_to(&mut world, "chef_002", 140, 200, "approach");
    let resolved = world.resolve_target("chef_002").expect("target");
    assert_eq!(
        resolved.target,
        TargetRef::Station("station:board_1".to_string())
    );
    assert_eq!(resolved.intent, InteractionIntent::RetrieveItem);
}

#[test]
fn property_7_highlight_tracks_resolution_through_a_session() {
    let mut world = world_with(base_config());
    let script: &[(&str, i64, i64)] = &[
        ("chef_001", 290, 110),
        ("chef_002", 140, 200),
        ("chef_001", 100, 100),
        ("chef_002", 500, 100),
    ];
    for (index, (agent_id, x_cm, y_cm)) in script.iter().enumerate() {
        move_to(&mut world, agent_id, *x_cm, *y_cm, &format!("mv_{index}"));
        for agent_id in ["chef_001", "chef_002"] {
            let agent = world.agent(agent_id).expect("agent");
            if !agent.is_interacting {
                assert_eq!(
                    agent.highlighted_target,
                    world.resolve_target(agent_id).map(|resolved| resolved.target),
                    "highlight drifted for {agent_id}"
                );
            }
        }
    }
}

#[test]
fn property_8_range_exit_mid_hold_force_releases() {
    let mut world = world_with(base_config());
    stage_tomato_on_board(&mut world);
    press(&mut world, "chef_001", "hold");
    world.step_n(5);

    move_to(&mut world, "chef_001", 2_000, 2_000, "walk_off");

    assert!(world
        .events()
        .iter()
        .any(|event| event.event_type == EventType::InteractionForceReleased));
    let agent = world.agent("chef_001").expect("agent");
    assert!(!agent.is_interacting);
    assert!(world.gesture_for_agent("chef_001").is_none());
    assert!(world
        .station("station:board_1")
        .is_some_and(|station| station.busy_with.is_none()));
}

#[test]
fn property_9_busy_station_is_invisible_to_other_agents() {
    let mut world = world_with(base_config());
    stage_tomato_on_board(&mut world);
    press(&mut world, "chef_001", "hold");

    move_to(&mut world, "chef_002", 140, 200, "approach");
    let agent = world.agent("chef_002").expect("agent");
    assert!(agent
        .candidate_interactables
        .iter()
        .all(|entry| entry.target != TargetRef::Station("station:board_1".to_string())));
    assert!(world
        .resolve_target("chef_002")
        .map(|resolved| resolved.target != TargetRef::Station("station:board_1".to_string()))
        .unwrap_or(true));
}

#[test]
fn property_10_serving_window_rejects_non_order_placement() {
    let mut world = world_with(base_config());
    let spawn = command(
        &world,
        "spawn_burger",
        CommandType::SpawnItem,
        CommandPayload::SpawnItem {
            kind: ItemKind::Burger,
            x_cm: 310,
            y_cm: 290,
        },
    );
    world.inject_command(spawn);
    world.step();
    move_to(&mut world, "chef_001", 310, 290, "approach");
    press(&mut world, "chef_001", "pick");
    release(&mut world, "chef_001", "pick_r");

    // Order is salad; a carried burger has no placement target here.
    assert!(world.resolve_target("chef_001").is_none());
    assert!(world
        .station("station:window_1")
        .is_some_and(|station| station.occupant.is_none()));
}

#[test]
fn property_11_set_order_changes_the_acceptance_predicate() {
    let mut world = world_with(base_config());
    let spawn = command(
        &world,
        "spawn_burger",
        CommandType::SpawnItem,
        CommandPayload::SpawnItem {
            kind: ItemKind::Burger,
            x_cm: 310,
            y_cm: 290,
        },
    );
    world.inject_command(spawn);
    world.step();
    move_to(&mut world, "chef_001", 310, 290, "approach");
    press(&mut world, "chef_001", "pick");
    release(&mut world, "chef_001", "pick_r");
    assert!(world.resolve_target("chef_001").is_none());

    let set_order = command(
        &world,
        "order_burger",
        CommandType::SetOrder,
        CommandPayload::SetOrder {
            station_id: "station:window_1".to_string(),
            kind: ItemKind::Burger,
        },
    );
    world.inject_command(set_order);
    world.step();

    let resolved = world.resolve_target("chef_001").expect("target");
    assert_eq!(
        resolved.target,
        TargetRef::Station("station:window_1".to_string())
    );
    assert_eq!(resolved.intent, InteractionIntent::PlaceItem);
    press(&mut world, "chef_001", "serve");
    assert!(world
        .events()
        .iter()
        .any(|event| event.event_type == EventType::ItemServed));
}

#[test]
fn property_12_release_on_the_exact_threshold_tick_is_a_tap() {
    let mut world = world_with(base_config());
    let threshold = base_config().hold_threshold_ticks;
    stage_tomato_on_board(&mut world);

    press(&mut world, "chef_001", "arm");
    let press_tick = world.status().current_tick;

    // Queue the release for the same tick the threshold would land on.
    // Commands drain before the threshold pass, so the gesture is consumed
    // as a tap and no process ever starts.
    let boundary_release = command(
        &world,
        "boundary_release",
        CommandType::ReleaseInteract,
        CommandPayload::ReleaseInteract {
            agent_id: "chef_001".to_string(),
        },
    );
    world.enqueue_command(boundary_release, press_tick + threshold);
    world.run_to_tick(press_tick + threshold);

    assert!(world.process_for_station("station:board_1").is_none());
    assert!(!world
        .events()
        .iter()
        .any(|event| event.event_type == EventType::ProcessingStarted));
    let agent = world.agent("chef_001").expect("agent");
    let carried = agent.carried_item_id().expect("tap retrieved the occupant");
    assert_eq!(
        world.item(carried).map(|item| item.kind),
        Some(ItemKind::Tomato)
    );
}

proptest! {
    #[test]
    fn property_20_identical_command_streams_replay_identically(
        seed in 1_u64..10_000,
        steps in 1_u64..96,
    ) {
        let run = || {
            let mut config = base_config();
            config.seed = seed;
            let mut world = world_with(config);
            press(&mut world, "chef_001", "p1");
            release(&mut world, "chef_001", "r1");
            press(&mut world, "chef_001", "p2");
            world.step_n(steps);
            world
        };
        let world_a = run();
        let world_b = run();

        prop_assert_eq!(world_a.events(), world_b.events());
        prop_assert_eq!(world_a.replay_hash(), world_b.replay_hash());
        prop_assert_eq!(
            world_a.status().current_tick,
            world_b.status().current_tick
        );
    }

    #[test]
    fn property_21_session_config_round_trip_with_variations(
        threshold in 0_u64..120,
        radius in 1_i64..1_000,
        slots in 1_u8..4,
    ) {
        let mut config = base_config();
        config.hold_threshold_ticks = threshold;
        config.detection_radius_cm = radius;
        config.carry_slots_per_agent = slots;

        let encoded = serde_json::to_string(&config).expect("serialize");
        let decoded: SessionConfig = serde_json::from_str(&encoded).expect("deserialize");
        prop_assert_eq!(config, decoded);
    }

    #[test]
    fn property_22_ownership_census_holds_under_arbitrary_input(
        pulses in proptest::collection::vec((0_u8..2, 1_u64..8), 1..24),
    ) {
        let mut world = world_with(base_config());
        for (index, (which, gap)) in pulses.iter().enumerate() {
            let agent_id = if *which == 0 { "chef_001" } else { "chef_002" };
            press(&mut world, agent_id, &format!("p{index}"));
            world.step_n(*gap);
            release(&mut world, agent_id, &format!("r{index}"));
        }
        let census = world.ownership_census();
        prop_assert_eq!(&census["consistent"], &serde_json::Value::Bool(true));
    }

    #[test]
    fn property_23_step_n_commits_exactly_n_until_completion(steps in 1_u64..64) {
        let mut world = world_with(base_config());
        let committed = world.step_n(steps);
        prop_assert_eq!(committed, steps);
        prop_assert_eq!(world.status().current_tick, steps);
    }
}
