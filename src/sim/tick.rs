//! Fixed timestep physics cycle
//!
//! Advances the table by one step: integrate gravity, then repeatedly find
//! the earliest impact, move every ball to it and resolve everything that
//! happens at that time, until the step is used up. Resting contacts are
//! supported once at the end of the step.

use rand::Rng;

use super::ball::Ball;
use super::collision::{resolve_ball_collision, resolve_surface_collision};
use super::contact::apply_resting_contact;
use super::event::{CollisionEvent, CollisionRecord, RecordKind, Response, Target};
use super::state::Table;
use super::toi::ball_time_of_impact;
use crate::tuning::PhysicsTuning;

/// Source of candidate ball pairs
///
/// Narrowing pairs down spatially is left to the caller. Pairs are indices
/// into the id-sorted ball list, `i < j`, in a stable order.
pub trait BroadPhase {
    fn candidate_pairs(&self, balls: &[Ball]) -> Vec<(usize, usize)>;
}

/// Every pair of balls that are not both frozen
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn candidate_pairs(&self, balls: &[Ball]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..balls.len() {
            for j in (i + 1)..balls.len() {
                if !(balls[i].is_frozen() && balls[j].is_frozen()) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}

/// A detected ball pair contact; `event` belongs to `hitter`
#[derive(Debug, Clone, Copy)]
struct PairHit {
    low: usize,
    high: usize,
    hitter: usize,
    event: CollisionEvent,
}

impl PairHit {
    fn other(&self) -> usize {
        if self.hitter == self.low { self.high } else { self.low }
    }
}

/// Advance the table by one step with every ball pair as a candidate
pub fn tick<R: Rng + ?Sized>(table: &mut Table, rng: &mut R) -> Vec<CollisionRecord> {
    tick_with(table, &AllPairs, rng)
}

/// Advance the table by one step
///
/// Returns the contacts that were resolved, in processing order. The same
/// table, seed and broad phase always produce the same records and state.
pub fn tick_with<B, R>(table: &mut Table, broad_phase: &B, rng: &mut R) -> Vec<CollisionRecord>
where
    B: BroadPhase + ?Sized,
    R: Rng + ?Sized,
{
    table.normalize_order();
    let step = table.step_index;
    let Table {
        balls,
        surfaces,
        tuning,
        ..
    } = table;
    let tuning: &PhysicsTuning = tuning;
    let dt = tuning.step_duration;

    for ball in balls.iter_mut() {
        ball.apply_gravity(tuning.gravity, dt);
    }

    let pairs = broad_phase.candidate_pairs(balls);
    let mut records = Vec::new();
    let mut contacts: Vec<(usize, usize, CollisionEvent)> = Vec::new();
    let mut resolved_pairs: Vec<(usize, usize)> = Vec::new();
    let mut remaining = dt;
    let mut elapsed = 0.0;
    let mut stalls = 0u32;

    while remaining > 0.0 {
        let mut hit_time = remaining;

        // Earliest surface impact per ball; contacts are remembered apart
        let mut surface_hits: Vec<(usize, usize, CollisionEvent)> = Vec::new();
        for (bi, ball) in balls.iter().enumerate() {
            if ball.is_frozen() {
                continue;
            }
            let mut earliest: Option<(usize, CollisionEvent)> = None;
            for (si, surface) in surfaces.iter().enumerate() {
                let Some(event) = surface.hit_test(ball, remaining, tuning) else {
                    continue;
                };
                if event.is_contact {
                    match contacts.iter_mut().find(|(b, s, _)| *b == bi && *s == si) {
                        Some(entry) => entry.2 = event,
                        None => contacts.push((bi, si, event)),
                    }
                } else if earliest.is_none_or(|(_, e)| event.hit_time < e.hit_time) {
                    earliest = Some((si, event));
                }
            }
            if let Some((si, event)) = earliest {
                hit_time = hit_time.min(event.hit_time);
                surface_hits.push((bi, si, event));
            }
        }

        let mut pair_hits: Vec<PairHit> = Vec::new();
        for &(low, high) in &pairs {
            if resolved_pairs.contains(&(low, high)) {
                continue;
            }
            // The higher id hits unless it is frozen
            let hitter = if balls[high].is_frozen() { low } else { high };
            let other = if hitter == low { high } else { low };
            let (hitting, target) = pair_mut(balls, hitter, other);
            if let Some(event) = ball_time_of_impact(hitting, target, remaining, tuning) {
                if !event.is_contact {
                    hit_time = hit_time.min(event.hit_time);
                }
                pair_hits.push(PairHit {
                    low,
                    high,
                    hitter,
                    event,
                });
            }
        }

        if hit_time < tuning.static_time || hit_time <= 0.0 {
            stalls += 1;
            if stalls > tuning.static_counts {
                log::trace!("Step {}: forcing progress after {} stalls", step, stalls);
                let forced = tuning.static_time.min(remaining);
                // A zero forced step would never finish; use up the step
                hit_time = if forced > 0.0 { forced } else { remaining };
            }
        }

        for ball in balls.iter_mut() {
            ball.advance(hit_time);
        }

        for (bi, si, event) in surface_hits {
            if event.hit_time > hit_time {
                continue;
            }
            let surface = &surfaces[si];
            let ball = &mut balls[bi];
            let material = surface.material();
            if let Some(response) =
                resolve_surface_collision(ball, material, &event, event.hit_normal, rng, tuning)
            {
                log::debug!(
                    "Step {}: ball {} hit surface {} at speed {:.4}",
                    step,
                    ball.id,
                    surface.id(),
                    response.impact_speed
                );
                records.push(CollisionRecord {
                    step,
                    time: elapsed + event.hit_time,
                    ball_id: ball.id,
                    target: Target::Surface(surface.id()),
                    kind: RecordKind::Impact,
                    impact_speed: response.impact_speed,
                });
            }
        }

        for hit in pair_hits {
            if hit.event.hit_time > hit_time {
                continue;
            }
            if let Some((ball_id, target_id, response)) = resolve_pair(balls, &hit, tuning) {
                resolved_pairs.push((hit.low, hit.high));
                records.push(CollisionRecord {
                    step,
                    time: elapsed + hit.event.hit_time,
                    ball_id,
                    target: Target::Ball(target_id),
                    kind: if hit.event.is_contact {
                        RecordKind::Contact
                    } else {
                        RecordKind::Impact
                    },
                    impact_speed: response.impact_speed,
                });
            }
        }

        remaining -= hit_time;
        elapsed += hit_time;
    }

    for (bi, si, event) in contacts {
        let surface = &surfaces[si];
        let ball = &mut balls[bi];
        let friction = surface.material().friction;
        let gravity = tuning.gravity;
        if let Some(response) = apply_resting_contact(ball, &event, friction, dt, gravity, tuning) {
            records.push(CollisionRecord {
                step,
                time: event.hit_time,
                ball_id: ball.id,
                target: Target::Surface(surface.id()),
                kind: RecordKind::Contact,
                impact_speed: response.impact_speed,
            });
        }
    }

    table.step_index += 1;
    records
}

/// Resolve a pair by reporting it from both sides; the dedup rule in
/// [`resolve_ball_collision`] lets exactly one side act. A frozen target has
/// no event of its own and is reported once.
fn resolve_pair(
    balls: &mut [Ball],
    hit: &PairHit,
    tuning: &PhysicsTuning,
) -> Option<(u32, u32, Response)> {
    let other = hit.other();
    let hitter_event = hit.event;
    let other_event = hit.event.mirrored();

    if balls[other].is_frozen() {
        let (target, colliding) = pair_mut(balls, other, hit.hitter);
        return resolve_ball_collision(target, colliding, &other_event, &hitter_event, false, tuning)
            .map(|response| (colliding.id, target.id, response));
    }

    let mut acted = None;
    for (b, c, event_b, event_c) in [
        (other, hit.hitter, other_event, hitter_event),
        (hit.hitter, other, hitter_event, other_event),
    ] {
        let (ball, colliding) = pair_mut(balls, b, c);
        if let Some(response) =
            resolve_ball_collision(ball, colliding, &event_b, &event_c, false, tuning)
        {
            debug_assert!(acted.is_none(), "ball pair resolved twice");
            acted = Some((colliding.id, ball.id, response));
        }
    }
    acted
}

/// Two distinct mutable balls
fn pair_mut(balls: &mut [Ball], a: usize, b: usize) -> (&mut Ball, &mut Ball) {
    assert_ne!(a, b, "a ball cannot collide with itself");
    if a < b {
        let (left, right) = balls.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = balls.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::material::Material;
    use glam::Vec3;

    fn table() -> Table {
        let mut table = Table::new(42, PhysicsTuning::default()).unwrap();
        table.add_plane(Vec3::Z, 0.0, Material::PLAYFIELD);
        table
    }

    fn weightless_table() -> Table {
        let tuning = PhysicsTuning {
            gravity: Vec3::ZERO,
            ..Default::default()
        };
        Table::new(3, tuning).unwrap()
    }

    #[test]
    fn test_all_pairs_skips_frozen_pairs() {
        let mut t = table();
        t.spawn_ball(Vec3::new(0.0, 0.0, 25.0), 25.0, 1.0).unwrap();
        t.spawn_ball(Vec3::new(100.0, 0.0, 25.0), 25.0, 1.0).unwrap();
        t.spawn_ball(Vec3::new(200.0, 0.0, 25.0), 25.0, 1.0).unwrap();
        t.set_frozen(1, true).unwrap();
        t.set_frozen(2, true).unwrap();
        let pairs = AllPairs.candidate_pairs(&t.balls);
        assert_eq!(pairs, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_ball_at_rest_stays_at_rest() {
        let mut t = table();
        let id = t.spawn_ball(Vec3::new(0.0, 0.0, 25.0), 25.0, 1.0).unwrap();
        let mut rng = t.rng_state.to_rng();
        for _ in 0..200 {
            tick(&mut t, &mut rng);
        }
        let ball = t.ball(id).unwrap();
        assert!((ball.position.z - 25.0).abs() < 0.05);
        assert!(ball.velocity.z.abs() < 0.05);
        assert_eq!(t.step_index, 200);
    }

    #[test]
    fn test_falling_ball_bounces() {
        let mut t = table();
        let id = t.spawn_ball(Vec3::new(0.0, 0.0, 27.0), 25.0, 1.0).unwrap();
        t.ball_mut(id).unwrap().velocity = Vec3::new(0.0, 0.0, -4.0);
        let mut rng = t.rng_state.to_rng();
        let records = tick(&mut t, &mut rng);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target, Target::Surface(1));
        assert_eq!(records[0].kind, RecordKind::Impact);
        assert!(t.ball(id).unwrap().velocity.z > 0.0);
    }

    #[test]
    fn test_pair_resolved_once_per_step() {
        let mut t = weightless_table();
        let a = t.spawn_ball(Vec3::ZERO, 1.0, 1.0).unwrap();
        let b = t.spawn_ball(Vec3::new(2.5, 0.0, 0.0), 1.0, 1.0).unwrap();
        t.ball_mut(a).unwrap().velocity = Vec3::new(1.0, 0.0, 0.0);
        let mut rng = t.rng_state.to_rng();
        let records = tick(&mut t, &mut rng);
        let pair_records: Vec<_> = records
            .iter()
            .filter(|r| matches!(r.target, Target::Ball(_)))
            .collect();
        assert_eq!(pair_records.len(), 1);
        assert!((pair_records[0].time - 0.5).abs() < 1e-4);
        let total = t.ball(a).unwrap().velocity + t.ball(b).unwrap().velocity;
        assert!((total - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_ball_bounces_off_frozen_ball() {
        let mut t = weightless_table();
        let a = t.spawn_ball(Vec3::ZERO, 1.0, 1.0).unwrap();
        let b = t.spawn_ball(Vec3::new(2.5, 0.0, 0.0), 1.0, 1.0).unwrap();
        t.set_frozen(b, true).unwrap();
        t.ball_mut(a).unwrap().velocity = Vec3::new(1.0, 0.0, 0.0);
        let mut rng = t.rng_state.to_rng();
        let records = tick(&mut t, &mut rng);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ball_id, a);
        assert_eq!(records[0].target, Target::Ball(b));
        assert!((t.ball(a).unwrap().velocity.x + 0.8).abs() < 1e-5);
        assert_eq!(t.ball(b).unwrap().position, Vec3::new(2.5, 0.0, 0.0));
    }

    /// Ball sunk 1 unit into the floor with a correction cap too small to
    /// free it: every sub-step reports an impact at time zero
    fn stuck_ball_table() -> (Table, u32) {
        let tuning = PhysicsTuning {
            gravity: Vec3::ZERO,
            disp_limit: 0.001,
            ..Default::default()
        };
        let mut t = Table::new(5, tuning).unwrap();
        t.add_plane(Vec3::Z, 0.0, Material::PLAYFIELD);
        let id = t.spawn_ball(Vec3::new(0.0, 0.0, 24.0), 25.0, 1.0).unwrap();
        (t, id)
    }

    #[test]
    fn test_stalled_step_is_forced_to_finish() {
        let (mut t, id) = stuck_ball_table();
        let mut rng = t.rng_state.to_rng();
        let records = tick(&mut t, &mut rng);
        assert_eq!(t.step_index, 1);
        // One embed kick, then only receding no-ops until the step is used up
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RecordKind::Impact);
        let kick = 1.25 * t.tuning.embed_shot;
        let z = t.ball(id).unwrap().position.z;
        assert!((z - (24.0 + 0.001 + kick)).abs() < 1e-3, "got {}", z);
    }

    #[test]
    fn test_zero_static_time_still_finishes() {
        let (mut t, id) = stuck_ball_table();
        t.tuning.static_time = 0.0;
        let mut rng = t.rng_state.to_rng();
        tick(&mut t, &mut rng);
        assert_eq!(t.step_index, 1);
        let kick = 1.25 * t.tuning.embed_shot;
        let z = t.ball(id).unwrap().position.z;
        assert!((z - (24.0 + 0.001 + kick)).abs() < 1e-3, "got {}", z);
    }
}
