//! Pinball Physics demo runner
//!
//! Builds a small walled playfield, drops a few balls on it and runs the
//! fixed-step cycle. Prints the final table state as JSON.
//!
//! Usage: `pinball-physics [seed] [steps] [tuning.json]`

use std::process::ExitCode;

use glam::Vec3;

use pinball_physics::sim::{Material, RecordKind, Table, tick};
use pinball_physics::{PhysicsError, PhysicsTuning};

const DEFAULT_SEED: u64 = 12345;
const DEFAULT_STEPS: u64 = 2000;

/// Playfield extents in table units
const TABLE_WIDTH: f32 = 1000.0;
const TABLE_HEIGHT: f32 = 2000.0;
const BALL_RADIUS: f32 = 25.0;

struct Args {
    seed: u64,
    steps: u64,
    tuning_path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse().map_err(|_| format!("invalid seed: {}", s))?,
        None => DEFAULT_SEED,
    };
    let steps = match args.next() {
        Some(s) => s.parse().map_err(|_| format!("invalid step count: {}", s))?,
        None => DEFAULT_STEPS,
    };
    Ok(Args {
        seed,
        steps,
        tuning_path: args.next(),
    })
}

fn build_table(seed: u64, tuning: PhysicsTuning) -> Result<Table, PhysicsError> {
    let mut table = Table::new(seed, tuning)?;

    table.add_plane(Vec3::Z, 0.0, Material::PLAYFIELD);
    table.add_plane(Vec3::X, 0.0, Material::METAL);
    table.add_plane(Vec3::NEG_X, -TABLE_WIDTH, Material::METAL);
    table.add_plane(Vec3::Y, 0.0, Material::RUBBER);
    table.add_plane(Vec3::NEG_Y, -TABLE_HEIGHT, Material::RUBBER);

    let scattered = Material {
        scatter: 0.3,
        ..Material::RUBBER
    };
    table.add_plane(Vec3::new(1.0, 1.0, 0.0), 200.0, scattered);

    let a = table.spawn_ball(Vec3::new(300.0, 1500.0, 60.0), BALL_RADIUS, 1.0)?;
    let b = table.spawn_ball(Vec3::new(500.0, 1500.0, BALL_RADIUS), BALL_RADIUS, 1.0)?;
    let c = table.spawn_ball(Vec3::new(700.0, 400.0, BALL_RADIUS), BALL_RADIUS, 1.0)?;

    if let Some(ball) = table.ball_mut(a) {
        ball.velocity = Vec3::new(6.0, -2.0, 0.0);
    }
    if let Some(ball) = table.ball_mut(b) {
        ball.velocity = Vec3::new(-3.0, -8.0, 0.0);
    }
    // A captured ball acts as an immovable post
    table.set_frozen(c, true)?;

    Ok(table)
}

fn run(args: Args) -> Result<(), PhysicsError> {
    let tuning = match &args.tuning_path {
        Some(path) => PhysicsTuning::load(path)?,
        None => PhysicsTuning::default(),
    };

    let mut table = build_table(args.seed, tuning)?;
    let mut rng = table.rng_state.to_rng();

    let mut impacts = 0usize;
    let mut contacts = 0usize;
    let mut hardest = 0.0f32;
    for _ in 0..args.steps {
        for record in tick(&mut table, &mut rng) {
            match record.kind {
                RecordKind::Impact => {
                    impacts += 1;
                    hardest = hardest.max(record.impact_speed);
                }
                RecordKind::Contact => contacts += 1,
            }
        }
    }

    log::info!(
        "Simulated {} steps: {} impacts (hardest {:.3}), {} contact resolutions",
        table.step_index,
        impacts,
        hardest,
        contacts
    );
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("usage: pinball-physics [seed] [steps] [tuning.json]");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Pinball physics starting (seed {}, {} steps)", args.seed, args.steps);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
