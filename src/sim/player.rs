//! Player ship state machine
//!
//! Movement intent is a lock-free atomic bitmask. Any thread may set or
//! clear bits (the input collaborator calls `forward_down()` and friends);
//! the tick thread takes exactly one snapshot per tick and acts on that
//! snapshot only, so a tick never sees a half-applied combination. The
//! continuous state (position, velocity, heading, shot clock) lives behind
//! its own mutex, held for the duration of one tick.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use bitflags::bitflags;
use glam::Vec2;
use parking_lot::Mutex;

use super::collision::{triangle_circle_collision, within_bounds};
use super::entity::Projectile;
use super::shape;
use super::world::World;
use crate::consts::*;
use crate::heading;
use crate::window::{Color, DrawCommand};

bitflags! {
    /// Currently-held movement intents.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Intent: u8 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const SHOOT = 1 << 4;
    }
}

/// The continuous state guarded by the tick mutex.
#[derive(Debug)]
struct Body {
    position: Vec2,
    velocity: Vec2,
    accel: Vec2,
    rotation: f32,
    last_shot: Option<Instant>,
}

/// The player ship. Singular and long-lived; owned by the simulation driver
/// and shared with the render thread for drawing.
pub struct Player {
    intent: AtomicU8,
    body: Mutex<Body>,
    cooldown: Duration,
}

impl Player {
    pub fn new(position: Vec2, cooldown: Duration) -> Self {
        Self {
            intent: AtomicU8::new(0),
            body: Mutex::new(Body {
                position,
                velocity: Vec2::ZERO,
                accel: Vec2::ZERO,
                rotation: 0.0,
                last_shot: None,
            }),
            cooldown,
        }
    }

    // -- intent transitions (callable from any thread) ----------------------

    fn set(&self, intent: Intent) {
        self.intent.fetch_or(intent.bits(), Ordering::AcqRel);
    }

    fn clear(&self, intent: Intent) {
        self.intent.fetch_and(!intent.bits(), Ordering::AcqRel);
    }

    pub fn forward_down(&self) {
        self.set(Intent::FORWARD);
    }
    pub fn forward_up(&self) {
        self.clear(Intent::FORWARD);
    }
    pub fn backward_down(&self) {
        self.set(Intent::BACKWARD);
    }
    pub fn backward_up(&self) {
        self.clear(Intent::BACKWARD);
    }
    pub fn left_down(&self) {
        self.set(Intent::LEFT);
    }
    pub fn left_up(&self) {
        self.clear(Intent::LEFT);
    }
    pub fn right_down(&self) {
        self.set(Intent::RIGHT);
    }
    pub fn right_up(&self) {
        self.clear(Intent::RIGHT);
    }
    pub fn shoot_down(&self) {
        self.set(Intent::SHOOT);
    }
    pub fn shoot_up(&self) {
        self.clear(Intent::SHOOT);
    }

    /// One atomic snapshot of the full bitmask.
    pub fn intent(&self) -> Intent {
        Intent::from_bits_truncate(self.intent.load(Ordering::Acquire))
    }

    // -- queries ------------------------------------------------------------

    pub fn position(&self) -> Vec2 {
        self.body.lock().position
    }

    pub fn set_position(&self, position: Vec2) {
        self.body.lock().position = position;
    }

    pub fn rotation(&self) -> f32 {
        self.body.lock().rotation
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.lock().velocity
    }

    pub fn radius(&self) -> f32 {
        shape::ship_radius()
    }

    // -- simulation ---------------------------------------------------------

    /// Advance the ship by one fixed tick. No-op once the world is in
    /// game-over state.
    pub fn tick(&self, world: &World) {
        if world.is_game_over() {
            return;
        }

        let mut body = self.body.lock();
        let dt = world.tick_dt();
        let intent = self.intent();

        let under_max_speed = body.velocity.length() <= PLAYER_MAX_SPEED;
        if intent.contains(Intent::FORWARD) && under_max_speed {
            body.accel = heading(body.rotation) * PLAYER_ACCEL;
        } else if intent.contains(Intent::BACKWARD) && under_max_speed {
            body.accel = -heading(body.rotation) * PLAYER_ACCEL;
        } else if body.velocity.length_squared() > 0.0 {
            // Coasting: a strong impulse opposite the velocity settles the
            // ship quickly instead of drifting forever
            body.accel =
                body.velocity.normalize_or_zero() * (-PLAYER_ACCEL * PLAYER_DRAG_FACTOR);
        }

        // Left wins when both turn keys are held
        if intent.contains(Intent::LEFT) {
            body.rotation -= PLAYER_TURN_PER_TICK;
        } else if intent.contains(Intent::RIGHT) {
            body.rotation += PLAYER_TURN_PER_TICK;
        }

        if intent.contains(Intent::SHOOT) {
            self.try_shoot(&mut body, world);
        }

        let new_velocity = body.velocity + body.accel * dt;
        let candidate = body.position + new_velocity * dt;
        let bounds = world.bounds();
        let radius = self.radius();

        if within_bounds(candidate, radius, bounds) {
            body.position = candidate;
            body.velocity = new_velocity;
        } else {
            // Zero the motion component perpendicular to the violated edge,
            // then nudge toward center so the ship can't stick to a wall
            if candidate.y - radius < 0.0 || candidate.y + radius > bounds.y {
                body.velocity.y = 0.0;
                body.accel.y = 0.0;
            } else {
                body.velocity.x = 0.0;
                body.accel.x = 0.0;
            }
            let nudge = (bounds / 2.0 - body.position) * 0.01;
            body.position += nudge;
        }

        let triangle = shape::ship_collision_points(body.position, body.rotation);
        let center = body.position;
        world.for_all_asteroids(|asteroid| {
            if asteroid.is_expired() || world.is_game_over() {
                return;
            }
            if triangle_circle_collision(
                &triangle,
                center,
                radius,
                asteroid.position(),
                asteroid.radius(),
            ) {
                log::info!(
                    "ship struck a tier-{} asteroid at ({:.0}, {:.0})",
                    asteroid.tier(),
                    asteroid.position().x,
                    asteroid.position().y
                );
                world.game_over();
            }
        });
    }

    /// Fire if the cooldown window has elapsed; otherwise a no-op.
    fn try_shoot(&self, body: &mut Body, world: &World) {
        let now = Instant::now();
        if body
            .last_shot
            .is_some_and(|last| now.duration_since(last) < self.cooldown)
        {
            return;
        }
        body.last_shot = Some(now);

        let nose = shape::transform_point(shape::ship_nose(), body.position, body.rotation);
        world.stage_entity(Projectile::new(nose, body.rotation).into());
    }

    pub fn draw(&self, world: &World) {
        let body = self.body.lock();
        let points = shape::ship_world_points(body.position, body.rotation).to_vec();
        world.draw(&DrawCommand::Polygon {
            points,
            color: Color::WHITE,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Asteroid, Entity};
    use crate::sim::world::tests::test_world;
    use proptest::prelude::*;

    fn ticked_player(world: &World) -> Player {
        Player::new(world.bounds() / 2.0, Duration::from_millis(250))
    }

    #[test]
    fn test_intent_bits_set_and_clear() {
        let world = test_world();
        let player = ticked_player(&world);
        player.forward_down();
        player.left_down();
        assert_eq!(player.intent(), Intent::FORWARD | Intent::LEFT);
        player.forward_up();
        assert_eq!(player.intent(), Intent::LEFT);
        player.left_up();
        assert!(player.intent().is_empty());
    }

    #[test]
    fn test_forward_accelerates_along_heading() {
        let world = test_world();
        let player = ticked_player(&world);
        player.forward_down();
        for _ in 0..50 {
            player.tick(&world);
        }
        let v = player.velocity();
        assert!(v.length() > 0.0);
        // Heading starts at 0 radians: +x
        assert!(v.x > 0.0);
        assert!(v.y.abs() < 1e-3);
    }

    #[test]
    fn test_drag_stops_a_coasting_ship() {
        let world = test_world();
        let player = ticked_player(&world);
        player.forward_down();
        for _ in 0..100 {
            player.tick(&world);
        }
        player.forward_up();
        let coasting = player.velocity().length();
        assert!(coasting > 0.0);
        for _ in 0..2000 {
            player.tick(&world);
        }
        assert!(player.velocity().length() < coasting);
    }

    #[test]
    fn test_left_takes_priority_over_right() {
        let world = test_world();
        let player = ticked_player(&world);
        player.left_down();
        player.right_down();
        let before = player.rotation();
        player.tick(&world);
        assert!(player.rotation() < before);
    }

    #[test]
    fn test_speed_capped_below_simulation_max() {
        let world = test_world();
        let player = ticked_player(&world);
        player.forward_down();
        for _ in 0..20_000 {
            player.tick(&world);
        }
        // One tick of acceleration past the cap is the worst case
        let slack = PLAYER_ACCEL * world.tick_dt();
        assert!(player.velocity().length() <= PLAYER_MAX_SPEED + slack);
    }

    #[test]
    fn test_cooldown_allows_one_shot() {
        let world = test_world();
        let player = Player::new(world.bounds() / 2.0, Duration::from_secs(60));
        player.shoot_down();
        player.tick(&world);
        player.tick(&world);
        assert_eq!(world.drain_staged_entities().len(), 1);
    }

    #[test]
    fn test_zero_cooldown_allows_consecutive_shots() {
        let world = test_world();
        let player = Player::new(world.bounds() / 2.0, Duration::ZERO);
        player.shoot_down();
        player.tick(&world);
        player.tick(&world);
        assert_eq!(world.drain_staged_entities().len(), 2);
    }

    #[test]
    fn test_projectile_spawns_at_nose() {
        let world = test_world();
        let player = Player::new(world.bounds() / 2.0, Duration::ZERO);
        player.shoot_down();
        player.tick(&world);
        let staged = world.drain_staged_entities();
        let Entity::Projectile(p) = &staged[0] else {
            panic!("expected a projectile");
        };
        let nose = shape::transform_point(
            shape::ship_nose(),
            player.position(),
            player.rotation(),
        );
        // Ship barely moves in one tick; nose and spawn point stay close
        assert!((p.position() - nose).length() < 1.0);
    }

    #[test]
    fn test_collision_with_asteroid_sets_game_over() {
        let world = test_world();
        let player = ticked_player(&world);
        world
            .asteroids_raw()
            .push_back(Asteroid::new(player.position(), 0.0, 3, &world));
        assert!(!world.is_game_over());
        player.tick(&world);
        assert!(world.is_game_over());
    }

    #[test]
    fn test_tick_is_noop_after_game_over() {
        let world = test_world();
        let player = ticked_player(&world);
        world.game_over();
        player.forward_down();
        let before = player.position();
        for _ in 0..100 {
            player.tick(&world);
        }
        assert_eq!(player.position(), before);
        assert!(player.velocity().length() == 0.0);
    }

    proptest! {
        /// Whatever the intent-bit history, the ship silhouette never leaves
        /// the window.
        #[test]
        fn prop_ship_stays_in_bounds(masks in proptest::collection::vec(0u8..32, 1..300)) {
            let world = test_world();
            let player = Player::new(world.bounds() / 2.0, Duration::from_millis(1));
            for mask in masks {
                player.intent.store(mask, Ordering::Release);
                player.tick(&world);
                let body = player.body.lock();
                let bounds = world.bounds();
                for point in shape::ship_world_points(body.position, body.rotation) {
                    prop_assert!(point.x >= 0.0 && point.x <= bounds.x);
                    prop_assert!(point.y >= 0.0 && point.y <= bounds.y);
                }
            }
        }
    }
}
