use std::collections::BTreeMap;
use std::env;

use contracts::{Command, CommandPayload, CommandType, QueryResponse, SCHEMA_VERSION_V1};
use galley_core::KitchenWorld;

fn print_usage() {
    println!("galley-cli <command>");
    println!("commands:");
    println!("  status");
    println!("  step [n]");
    println!("  run-to <tick>");
    println!("  snapshot [tick]");
    println!("  events <ticks>");
    println!("  inspect <agent|station> <id>");
    println!("  demo [ticks]");
    println!("    runs a scripted two-chef session and prints the event summary");
}

fn parse_u64(value: Option<&String>, label: &str) -> Result<u64, String> {
    let raw = value.ok_or_else(|| format!("missing {}", label))?;
    raw.parse::<u64>()
        .map_err(|_| format!("invalid {}: {}", label, raw))
}

fn command_for(
    world: &KitchenWorld,
    id: &str,
    command_type: CommandType,
    payload: CommandPayload,
) -> Command {
    Command::new(
        id,
        world.session_id().to_string(),
        world.status().current_tick,
        command_type,
        payload,
    )
}

/// Queue the demo script: chef_001 chops the tomato while chef_002 drops
/// the unusable raw meat, exercising pickup, placement, the hold gesture,
/// processing, and the ground-drop fallback.
fn queue_demo_script(world: &mut KitchenWorld) {
    let hold = world.config().hold_threshold_ticks;
    let script: Vec<(u64, &str, CommandType, CommandPayload)> = vec![
        (
            1,
            "demo_pick",
            CommandType::PressInteract,
            CommandPayload::PressInteract {
                agent_id: "chef_001".to_string(),
            },
        ),
        (
            2,
            "demo_pick_r",
            CommandType::ReleaseInteract,
            CommandPayload::ReleaseInteract {
                agent_id: "chef_001".to_string(),
            },
        ),
        (
            3,
            "demo_place",
            CommandType::PressInteract,
            CommandPayload::PressInteract {
                agent_id: "chef_001".to_string(),
            },
        ),
        (
            4,
            "demo_place_r",
            CommandType::ReleaseInteract,
            CommandPayload::ReleaseInteract {
                agent_id: "chef_001".to_string(),
            },
        ),
        (
            5,
            "demo_hold",
            CommandType::PressInteract,
            CommandPayload::PressInteract {
                agent_id: "chef_001".to_string(),
            },
        ),
        (
            5 + hold + 150,
            "demo_hold_r",
            CommandType::ReleaseInteract,
            CommandPayload::ReleaseInteract {
                agent_id: "chef_001".to_string(),
            },
        ),
        (
            6,
            "demo_meat",
            CommandType::PressInteract,
            CommandPayload::PressInteract {
                agent_id: "chef_002".to_string(),
            },
        ),
        (
            7,
            "demo_meat_r",
            CommandType::ReleaseInteract,
            CommandPayload::ReleaseInteract {
                agent_id: "chef_002".to_string(),
            },
        ),
        (
            8,
            "demo_drop",
            CommandType::PressInteract,
            CommandPayload::PressInteract {
                agent_id: "chef_002".to_string(),
            },
        ),
        (
            9,
            "demo_drop_r",
            CommandType::ReleaseInteract,
            CommandPayload::ReleaseInteract {
                agent_id: "chef_002".to_string(),
            },
        ),
    ];
    for (tick, id, command_type, payload) in script {
        let command = command_for(world, id, command_type, payload);
        world.enqueue_command(command, tick);
    }
}

fn print_event_summary(world: &KitchenWorld) {
    let mut counts = BTreeMap::<String, usize>::new();
    for event in world.events() {
        *counts.entry(format!("{:?}", event.event_type)).or_insert(0) += 1;
    }
    println!("events by type:");
    for (event_type, count) in counts {
        println!("  {event_type}: {count}");
    }
}

fn run_demo(args: &[String]) -> Result<(), String> {
    let ticks = args
        .get(2)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| format!("invalid ticks: {value}"))
        })
        .transpose()?
        .unwrap_or(240);

    let mut world = KitchenWorld::with_default_layout();
    world.start();
    queue_demo_script(&mut world);
    let committed = world.run_to_tick(ticks);
    world.pause();

    println!("demo committed={} {}", committed, world.status());
    print_event_summary(&world);
    for agent_id in ["chef_001", "chef_002"] {
        let prompt = world.prompt_for(agent_id);
        let prompt = if prompt.is_empty() { "-" } else { prompt.as_str() };
        println!("prompt {agent_id}: {prompt}");
    }
    println!("replay_hash={:016x}", world.replay_hash());
    Ok(())
}

fn run_inspect(world: &KitchenWorld, args: &[String]) -> Result<QueryResponse, String> {
    let subject = args
        .get(2)
        .map(String::as_str)
        .ok_or_else(|| "missing subject (agent|station)".to_string())?;
    let id = args.get(3).ok_or_else(|| "missing id".to_string())?;
    let data = match subject {
        "agent" => world
            .inspect_agent(id)
            .ok_or_else(|| format!("unknown agent: {id}"))?,
        "station" => world
            .inspect_station(id)
            .ok_or_else(|| format!("unknown station: {id}"))?,
        other => return Err(format!("unknown subject: {other}")),
    };
    Ok(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: format!("inspect_{subject}"),
        session_id: world.session_id().to_string(),
        generated_at_tick: world.status().current_tick,
        data,
    })
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let mut world = KitchenWorld::with_default_layout();

    match command {
        Some("status") => {
            println!("{}", world.status());
        }
        Some("step") => {
            let steps = args.get(2).and_then(|v| v.parse::<u64>().ok()).unwrap_or(1);
            world.start();
            let committed = world.step_n(steps);
            println!("stepped={} {}", committed, world.status());
        }
        Some("run-to") => match parse_u64(args.get(2), "tick") {
            Ok(target_tick) => {
                world.start();
                let committed = world.run_to_tick(target_tick);
                println!("committed={} {}", committed, world.status());
            }
            Err(err) => {
                eprintln!("error: {}", err);
                print_usage();
                std::process::exit(2);
            }
        },
        Some("snapshot") => {
            let ticks = args.get(2).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
            world.start();
            let _ = world.run_to_tick(ticks);
            let snapshot = world.snapshot_for_current_tick();
            match serde_json::to_string_pretty(&snapshot) {
                Ok(rendered) => println!("{rendered}"),
                Err(err) => {
                    eprintln!("error: failed to render snapshot: {err}");
                    std::process::exit(1);
                }
            }
        }
        Some("events") => match parse_u64(args.get(2), "ticks") {
            Ok(ticks) => {
                world.start();
                let _ = world.run_to_tick(ticks);
                for event in world.events() {
                    match serde_json::to_string(event) {
                        Ok(rendered) => println!("{rendered}"),
                        Err(err) => {
                            eprintln!("error: failed to render event: {err}");
                            std::process::exit(1);
                        }
                    }
                }
            }
            Err(err) => {
                eprintln!("error: {}", err);
                print_usage();
                std::process::exit(2);
            }
        },
        Some("inspect") => match run_inspect(&world, &args) {
            Ok(response) => match serde_json::to_string_pretty(&response) {
                Ok(rendered) => println!("{rendered}"),
                Err(err) => {
                    eprintln!("error: failed to render response: {err}");
                    std::process::exit(1);
                }
            },
            Err(err) => {
                eprintln!("error: {}", err);
                print_usage();
                std::process::exit(2);
            }
        },
        Some("demo") => {
            if let Err(err) = run_demo(&args) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        _ => {
            print_usage();
        }
    }
}
