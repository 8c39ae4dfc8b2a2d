//! Runs a scripted Bastion defence without a renderer and prints what
//! happened.

use bastion_core::Game;
use bastion_host::Session;
use bastion_td::{Strategy, TdAction, TdConfig, TdEvent, TdGame, ThemeSource, TowerKind};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "headless-runner")]
#[command(about = "Headless Bastion simulation with a scripted defence")]
struct Args {
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Ticks to simulate (60 per second at the default rate)
    #[arg(long, default_value = "36000")]
    ticks: u64,

    /// TOML file overriding the default balance
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation speed multiplier: 1, 2 or 5
    #[arg(long, default_value = "1")]
    speed: u8,

    /// Pace ticks at wall-clock rate and print status every second
    #[arg(long, short)]
    realtime: bool,

    /// JSON terrain grid to use instead of the procedural map
    #[arg(long)]
    map: Option<PathBuf>,

    /// Write the final snapshot as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

/// Serves a pre-generated grid from disk.
struct MapFile(PathBuf);

impl ThemeSource for MapFile {
    fn generate(&self, _theme: &str, _width: u16, _height: u16) -> Option<String> {
        match std::fs::read_to_string(&self.0) {
            Ok(json) => Some(json),
            Err(err) => {
                tracing::warn!(path = %self.0.display(), %err, "cannot read map file");
                None
            }
        }
    }
}

/// Towers to raise, in order, as gold allows.
fn defence_plan() -> Vec<(TowerKind, u16, u16)> {
    vec![
        (TowerKind::Archer, 8, 24),
        (TowerKind::Archer, 11, 24),
        (TowerKind::Barracks, 8, 26),
        (TowerKind::Tar, 11, 20),
        (TowerKind::Fire, 8, 20),
        (TowerKind::Archer, 7, 20),
        (TowerKind::Crossbow, 12, 16),
        (TowerKind::Knight, 8, 16),
        (TowerKind::Lightning, 11, 12),
        (TowerKind::Archer, 8, 12),
        (TowerKind::Crossbow, 7, 16),
        (TowerKind::Fire, 12, 20),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => TdConfig::load(path)?,
        None => TdConfig::default(),
    };
    let tick_hz = config.tick_hz;

    let game = match &args.map {
        Some(path) => {
            let source = MapFile(path.clone());
            TdGame::with_theme(config.clone(), args.seed, &source, "file")
        }
        None => TdGame::new(config.clone(), args.seed),
    };
    let mut session = Session::from_game(game, config, args.seed, tick_hz);
    session.submit(TdAction::SetSpeed(args.speed));

    let mut plan = defence_plan().into_iter().peekable();
    let mut all_events = Vec::new();
    let mut last_status = Instant::now();
    let tick_duration = Duration::from_secs_f64(1.0 / tick_hz as f64);

    while session.current_tick() < args.ticks {
        let tick_start = Instant::now();
        script(&mut session, &mut plan);

        let Some(events) = session.step_one_tick() else {
            break;
        };
        if args.realtime {
            for event in &events {
                print_event(session.current_tick(), event);
            }
        }
        all_events.extend(events);

        if args.realtime {
            if last_status.elapsed() >= Duration::from_secs(1) {
                print_status(&session);
                last_status = Instant::now();
            }
            let elapsed = tick_start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            }
        }
    }

    println!("=== Bastion Simulation Complete ===");
    println!("Outcome: {:?}", session.is_terminal());
    println!("Final tick: {}", session.current_tick());
    print_status(&session);
    print_event_summary(&all_events);

    if let Some(path) = &args.snapshot {
        let snapshot = session.observe();
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        tracing::info!(path = %path.display(), "snapshot written");
    }

    Ok(())
}

/// Scripted decisions for the next tick: start idle waves, buy the next
/// affordable tower from the plan, point crossbows at the strongest enemy.
fn script(
    session: &mut Session<TdGame>,
    plan: &mut std::iter::Peekable<std::vec::IntoIter<(TowerKind, u16, u16)>>,
) {
    let mut orders = Vec::new();
    let state = session.game().state();
    if state.game_over {
        return;
    }

    if !state.wave_active {
        orders.push(TdAction::StartWave);
    }

    while let Some(&(kind, x, y)) = plan.peek() {
        let buildable = state.grid.in_bounds(x, y) && state.grid.terrain(x, y).is_buildable();
        if !buildable {
            tracing::debug!(x, y, "plan cell unavailable, skipping");
            plan.next();
            continue;
        }
        if state.gold >= kind.spec().cost {
            plan.next();
            orders.push(TdAction::Build { x, y, kind });
        }
        break;
    }

    let idle_crossbow = state
        .world
        .towers
        .iter()
        .find(|(_, t)| t.kind == TowerKind::Crossbow && t.strategy == Strategy::First);
    if let Some((tower, _)) = idle_crossbow {
        orders.push(TdAction::SetStrategy {
            tower,
            strategy: Strategy::Strongest,
        });
    }

    for order in orders {
        session.submit(order);
    }
}

fn print_status(session: &Session<TdGame>) {
    let state = session.game().state();
    println!(
        "[tick {:>6}] wave {} | gold {} | lives {} | towers {} | enemies {} | season {}",
        session.current_tick(),
        state.wave,
        state.gold,
        state.lives,
        state.world.towers.len(),
        state.world.enemies.len(),
        state.season.as_str(),
    );
}

fn print_event(tick: u64, event: &TdEvent) {
    match event {
        TdEvent::TowerBuilt { x, y, kind, .. } => {
            println!("[tick {tick:>6}] built {} at ({x}, {y})", kind.as_str())
        }
        TdEvent::WaveStarted { wave, enemies } => {
            println!("[tick {tick:>6}] wave {wave} started ({enemies} enemies)")
        }
        TdEvent::WaveCompleted { wave, bonus } => {
            println!("[tick {tick:>6}] wave {wave} cleared (+{bonus} gold)")
        }
        TdEvent::CastleBreached { kind, lives_lost, .. } => {
            println!("[tick {tick:>6}] {} breached the castle (-{lives_lost})", kind.as_str())
        }
        TdEvent::GameOver { wave } => println!("[tick {tick:>6}] castle fell on wave {wave}"),
        TdEvent::ActionRejected { reason } => println!("[tick {tick:>6}] rejected: {reason}"),
        _ => {}
    }
}

fn print_event_summary(events: &[TdEvent]) {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for event in events {
        let name = match event {
            TdEvent::TowerBuilt { .. } => "TowerBuilt",
            TdEvent::TowerSold { .. } => "TowerSold",
            TdEvent::TowerUpgraded { .. } => "TowerUpgraded",
            TdEvent::AbilityUsed { .. } => "AbilityUsed",
            TdEvent::CitadelUpgraded { .. } => "CitadelUpgraded",
            TdEvent::WaveStarted { .. } => "WaveStarted",
            TdEvent::WaveCompleted { .. } => "WaveCompleted",
            TdEvent::EnemySpawned { .. } => "EnemySpawned",
            TdEvent::EnemyKilled { .. } => "EnemyKilled",
            TdEvent::CastleBreached { .. } => "CastleBreached",
            TdEvent::TarPulse { .. } => "TarPulse",
            TdEvent::LightningBolt { .. } => "LightningBolt",
            TdEvent::SeasonChanged { .. } => "SeasonChanged",
            TdEvent::GameOver { .. } => "GameOver",
            TdEvent::ActionRejected { .. } => "ActionRejected",
        };
        *counts.entry(name).or_default() += 1;
    }

    println!("\nEvent summary:");
    for (name, count) in counts {
        println!("  {name}: {count}");
    }
}
