//! warden-demo: headless driver for the enemy AI.
//!
//! Usage:
//!   warden-demo run [--seconds 30] [--seed 42] [--combos combos.json] [--json]
//!   warden-demo combos [--combos combos.json]
//!
//! Set RUST_LOG (e.g. `RUST_LOG=warden_ai=debug`) for per-decision logs.

use std::path::PathBuf;
use std::process;

use tracing::info;

use warden_ai::combos::ComboTable;
use warden_core::constants::TICK_RATE;
use warden_core::events::AiEvent;
use warden_sim::scenario::courtyard_ambush;
use warden_sim::SimConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "combos" => cmd_combos(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "warden-demo: WARDEN enemy AI sandbox\n\
         \n\
         Commands:\n\
         \n\
         run       Play the courtyard ambush scenario headless\n\
         \n\
           --seconds <N>      Simulated seconds to run (default: 30)\n\
           --seed <N>         RNG seed (default: 42)\n\
           --combos <path>    Combo table JSON (default: built-in table)\n\
           --json             Print the final snapshot as JSON on stdout\n\
         \n\
         combos    Print a combo table\n\
         \n\
           --combos <path>    Combo table JSON (default: built-in table)\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_number<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match flag_value(args, flag) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("Error: {flag} expects a number, got {raw:?}");
            process::exit(1);
        }),
    }
}

fn load_combos(args: &[String]) -> ComboTable {
    let Some(path) = flag_value(args, "--combos").map(PathBuf::from) else {
        return ComboTable::default();
    };
    match ComboTable::load(&path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}: {e}", path.display());
            process::exit(1);
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let seconds: f64 = parse_number(args, "--seconds", 30.0);
    let seed: u64 = parse_number(args, "--seed", 42);
    let json = args.iter().any(|a| a == "--json");

    let config = SimConfig {
        seed,
        combos: load_combos(args),
        ..Default::default()
    };
    let mut run = courtyard_ambush(config);
    info!(seed, seconds, enemies = run.enemies.len(), "courtyard ambush started");

    let ticks = (seconds * f64::from(TICK_RATE)).ceil() as u64;
    let mut last = None;
    for _ in 0..ticks {
        let snapshot = run.step();
        let at = snapshot.time.elapsed_secs;
        for event in &snapshot.events {
            report(at, event);
        }
        last = Some(snapshot);
    }

    let Some(snapshot) = last else {
        return;
    };
    for enemy in &snapshot.enemies {
        info!(
            agent = %enemy.id,
            state = enemy.state.name(),
            combo = %enemy.combo,
            health = enemy.health,
            "final enemy state"
        );
    }
    if let Some(player) = &snapshot.player {
        info!(health = player.health, defeated = player.defeated, "final player state");
    }

    if json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: failed to serialize snapshot: {e}");
                process::exit(1);
            }
        }
    }
}

/// Log the gameplay-relevant events; per-tick noise stays at debug level.
fn report(at: f64, event: &AiEvent) {
    match event {
        AiEvent::StateChanged { agent, from, to } => {
            info!(t = at, %agent, "{} -> {}", from.name(), to.name());
        }
        AiEvent::ComboSelected { agent, name, .. } => {
            info!(t = at, %agent, combo = %name, "combo selected");
        }
        AiEvent::HitLanded {
            agent,
            target,
            damage,
            attack,
        } => {
            info!(t = at, %agent, %target, damage, step = attack.step, "hit");
        }
        AiEvent::Defeated { agent } => {
            info!(t = at, %agent, "defeated");
        }
        AiEvent::LockOnChanged { target } => {
            info!(t = at, target = ?target, "lock-on");
        }
        _ => {}
    }
}

// --- Combos command ---

fn cmd_combos(args: &[String]) {
    let table = load_combos(args);
    for (i, combo) in table.combos.iter().enumerate() {
        println!("{i}: {} (range {:.1} m, {} steps)", combo.name, combo.range, combo.len());
        for step in 0..combo.len() {
            println!(
                "     step {}: after {:.2}s  damage {:>5.1}  trigger {}",
                step + 1,
                combo.delay(step).unwrap_or_default(),
                combo.damage(step).unwrap_or(f32::NAN),
                combo.trigger(step).unwrap_or("-"),
            );
        }
    }
}
