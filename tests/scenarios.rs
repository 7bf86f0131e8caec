//! End-to-end scenarios on small tables

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use pinball_physics::sim::{
    Ball, CollisionEvent, CollisionRecord, Material, RecordKind, Table, Target,
    apply_resting_contact, resolve_surface_collision, tick,
};
use pinball_physics::{PhysicsError, PhysicsTuning};

fn weightless() -> PhysicsTuning {
    PhysicsTuning {
        gravity: Vec3::ZERO,
        ..Default::default()
    }
}

/// Ball 1 moving at speed 2 toward a stationary ball 2 just out of reach
fn head_on_table(tuning: PhysicsTuning) -> (Table, u32, u32) {
    let mut table = Table::new(1, tuning).unwrap();
    let a = table.spawn_ball(Vec3::ZERO, 1.0, 1.0).unwrap();
    let b = table.spawn_ball(Vec3::new(2.001, 0.0, 0.0), 1.0, 1.0).unwrap();
    table.ball_mut(a).unwrap().velocity = Vec3::new(2.0, 0.0, 0.0);
    (table, a, b)
}

#[test]
fn head_on_pair_exchanges_momentum() {
    let (mut table, a, b) = head_on_table(weightless());
    let mut rng = table.rng_state.to_rng();

    let records = tick(&mut table, &mut rng);

    let impacts: Vec<&CollisionRecord> = records
        .iter()
        .filter(|r| matches!(r.target, Target::Ball(_)))
        .collect();
    assert_eq!(impacts.len(), 1, "pair must be resolved exactly once");
    assert_eq!(impacts[0].kind, RecordKind::Impact);
    assert!((impacts[0].impact_speed - 2.0).abs() < 1e-4);

    let va = table.ball(a).unwrap().velocity;
    let vb = table.ball(b).unwrap().velocity;
    assert!((va.x - 0.2).abs() < 1e-4, "got {}", va.x);
    assert!((vb.x - 1.8).abs() < 1e-4, "got {}", vb.x);
    // Equal and opposite momentum change of 1.8
    assert!(((va.x - 2.0) + 1.8).abs() < 1e-4);
    assert!((vb.x - 1.8).abs() < 1e-4);
    assert!((va + vb - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-4);
}

#[test]
fn tuning_from_json_changes_restitution() {
    let tuning = PhysicsTuning::from_json(
        r#"{ "gravity": [0.0, 0.0, 0.0], "ball_ball_restitution": 0.5 }"#,
    )
    .unwrap();
    // Fields left out keep their defaults
    assert_eq!(tuning.contact_vel, PhysicsTuning::default().contact_vel);

    let (mut table, a, b) = head_on_table(tuning);
    let mut rng = table.rng_state.to_rng();
    tick(&mut table, &mut rng);

    assert!((table.ball(a).unwrap().velocity.x - 0.5).abs() < 1e-4);
    assert!((table.ball(b).unwrap().velocity.x - 1.5).abs() < 1e-4);
}

#[test]
fn bad_tuning_is_rejected() {
    assert!(matches!(
        PhysicsTuning::from_json("{ not json"),
        Err(PhysicsError::Parse(_))
    ));
    assert!(matches!(
        PhysicsTuning::from_json(r#"{ "disp_limit": 0.0 }"#),
        Err(PhysicsError::InvalidTuning(_))
    ));
}

#[test]
fn resting_ball_gets_no_tangential_impulse() {
    let tuning = PhysicsTuning::default();
    let mut ball = Ball::new(1, Vec3::new(0.0, 0.0, 25.0), 25.0, 1.0)
        .unwrap()
        .with_velocity(tuning.gravity * tuning.step_duration);
    let event = CollisionEvent {
        hit_normal: Vec3::Z,
        is_contact: true,
        ..Default::default()
    };

    let response = apply_resting_contact(
        &mut ball,
        &event,
        Material::RUBBER.friction,
        tuning.step_duration,
        tuning.gravity,
        &tuning,
    )
    .unwrap();

    assert_eq!(response.friction_impulse, 0.0);
    assert_eq!(ball.velocity.x, 0.0);
    assert_eq!(ball.velocity.y, 0.0);
    assert_eq!(ball.angular_momentum, Vec3::ZERO);
}

#[test]
fn embedded_correction_is_capped() {
    let tuning = PhysicsTuning {
        disp_limit: 0.005,
        ..Default::default()
    };
    tuning.validate().unwrap();

    // Wall along x = 0, ball pushed 0.01 into it and barely moving
    let mut ball = Ball::new(1, Vec3::new(24.99, 100.0, 25.0), 25.0, 1.0)
        .unwrap()
        .with_velocity(Vec3::new(0.00001, 0.0, 0.0));
    let event = CollisionEvent {
        hit_normal: Vec3::X,
        hit_distance: -0.01,
        ..Default::default()
    };
    let mut rng = Pcg32::seed_from_u64(3);

    let response =
        resolve_surface_collision(&mut ball, &Material::METAL, &event, Vec3::X, &mut rng, &tuning)
            .unwrap();

    // 0.005 rather than disp_gain * 0.01 = 0.009875
    assert!((ball.position.x - 24.995).abs() < 1e-5, "got {}", ball.position.x);
    assert!(ball.velocity.x > 0.0, "embedded ball must be kicked out");
    assert!((response.impact_speed - tuning.embed_shot).abs() < 1e-6);
}

fn scatter_table(seed: u64) -> Table {
    let mut table = Table::new(seed, PhysicsTuning::default()).unwrap();
    let scattered = Material {
        scatter: 0.5,
        ..Material::RUBBER
    };
    table.add_plane(Vec3::Z, 0.0, Material::PLAYFIELD);
    table.add_plane(Vec3::X, 0.0, scattered);
    table.add_plane(Vec3::NEG_X, -400.0, scattered);
    table.add_plane(Vec3::Y, 0.0, scattered);
    table.add_plane(Vec3::NEG_Y, -400.0, scattered);

    let speeds = [
        Vec3::new(7.0, 3.0, 0.0),
        Vec3::new(-5.0, 6.0, 0.0),
        Vec3::new(2.0, -8.0, 0.0),
    ];
    for (i, velocity) in speeds.into_iter().enumerate() {
        let x = 100.0 + 100.0 * i as f32;
        let id = table
            .spawn_ball(Vec3::new(x, 200.0, 25.0), 25.0, 1.0)
            .unwrap();
        table.ball_mut(id).unwrap().velocity = velocity;
    }
    table
}

fn run(seed: u64, steps: usize) -> (Table, Vec<CollisionRecord>) {
    let mut table = scatter_table(seed);
    let mut rng = table.rng_state.to_rng();
    let mut records = Vec::new();
    for _ in 0..steps {
        records.extend(tick(&mut table, &mut rng));
    }
    (table, records)
}

#[test]
fn identical_seeds_replay_identically() {
    let (table_a, records_a) = run(99, 300);
    let (table_b, records_b) = run(99, 300);

    assert_eq!(records_a, records_b);
    assert_eq!(
        serde_json::to_string(&table_a).unwrap(),
        serde_json::to_string(&table_b).unwrap()
    );
    assert_eq!(table_a.step_index, 300);
    assert!(
        records_a
            .iter()
            .any(|r| r.kind == RecordKind::Impact && matches!(r.target, Target::Surface(_))),
        "balls should have hit the walls"
    );
}

#[test]
fn table_state_round_trips_through_json() {
    let (table, _) = run(5, 50);
    let json = serde_json::to_string(&table).unwrap();
    let restored: Table = serde_json::from_str(&json).unwrap();
    assert_eq!(serde_json::to_string(&restored).unwrap(), json);
    assert_eq!(restored.balls, table.balls);
}

#[test]
fn balls_stay_on_the_table() {
    let (table, _) = run(7, 300);
    for ball in &table.balls {
        assert!(ball.position.is_finite() && ball.velocity.is_finite());
        assert!(ball.position.z > 20.0, "ball {} fell through: {}", ball.id, ball.position);
        assert!(ball.position.x > 0.0 && ball.position.x < 400.0);
        assert!(ball.position.y > 0.0 && ball.position.y < 400.0);
    }
}
