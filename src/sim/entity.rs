//! Entity variants and the closed entity sum type
//!
//! Heterogeneous entities live in homogeneous containers as [`Entity`]
//! values: a tagged union over the concrete variants, dispatching the common
//! capability set (tick/draw/position/radius/expiry) by match. No boxing,
//! value semantics throughout.
//!
//! Expiry is a one-way atomic flag. Anything may observe it through a shared
//! reference mid-scan; the flag is only ever stored `true`, and the carcass
//! is removed later by the registry's sweep, never during iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::Vec2;

use super::collision::{point_in_circle, within_bounds};
use super::shape;
use super::world::World;
use crate::consts::*;
use crate::heading;
use crate::window::{Color, DrawCommand};

/// Monotonic expiry flag.
///
/// `set` is the only mutator and only ever writes `true`.
#[derive(Debug, Default)]
pub struct ExpiryFlag(AtomicBool);

impl ExpiryFlag {
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Clone for ExpiryFlag {
    fn clone(&self) -> Self {
        Self(AtomicBool::new(self.get()))
    }
}

// ---------------------------------------------------------------------------
// Asteroid

/// A drifting rock. Created off the registry (spawner thread or a split),
/// staged, admitted at a tick boundary, culled once well offscreen.
#[derive(Debug, Clone)]
pub struct Asteroid {
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    spin: f32,
    tier: u8,
    outline: Vec<Vec2>,
    expired: ExpiryFlag,
}

impl Asteroid {
    /// Build an asteroid at `position` heading along `direction` (radians).
    pub fn new(position: Vec2, direction: f32, tier: u8, world: &World) -> Self {
        let tier = tier.clamp(ASTEROID_MIN_TIER, ASTEROID_MAX_TIER);
        let radius = f32::from(tier) * ASTEROID_TIER_RADIUS;
        Self {
            position,
            velocity: heading(direction) * ASTEROID_SPEED,
            rotation: 0.0,
            spin: world.rng().range_f32(-1.2, 1.2),
            tier,
            outline: shape::asteroid_outline(radius, world.rng()),
            expired: ExpiryFlag::default(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        f32::from(self.tier) * ASTEROID_TIER_RADIUS
    }

    pub fn tier(&self) -> u8 {
        self.tier
    }

    pub fn is_expired(&self) -> bool {
        self.expired.get()
    }

    pub fn tick(&mut self, world: &World) {
        let dt = world.tick_dt();
        self.position += self.velocity * dt;
        self.rotation += self.spin * dt;

        // Asteroids spawn offscreen, so "is offscreen" can't be the cull
        // test; cull once more than the margin past any edge.
        let bounds = world.bounds();
        let margin = bounds * ASTEROID_CULL_MARGIN;
        if self.position.x < -margin.x
            || self.position.y < -margin.y
            || self.position.x > bounds.x + margin.x
            || self.position.y > bounds.y + margin.y
        {
            self.expired.set();
        }
    }

    pub fn draw(&self, world: &World) {
        let points = self
            .outline
            .iter()
            .map(|p| shape::transform_point(*p, self.position, self.rotation))
            .collect();
        world.draw(&DrawCommand::Polygon {
            points,
            color: Color::rgb(160, 160, 160),
        });
    }

    /// React to a projectile hit.
    ///
    /// Nothing else mutates the tier, and the registry never runs two ticks
    /// of the same asteroid concurrently, so the decrement-and-split is
    /// atomic with respect to this instance. Children go to the staging
    /// queue, never straight into the live set.
    pub fn on_collision(&mut self, world: &World) {
        world.add_score(SCORE_PER_HIT, self.position);

        if self.tier > ASTEROID_MIN_TIER {
            let phase = world.rng().range_f32(0.0, std::f32::consts::PI);
            world.stage_asteroid(Asteroid::new(self.position, phase, self.tier - 1, world));
            world.stage_asteroid(Asteroid::new(
                self.position,
                phase - std::f32::consts::PI,
                self.tier - 1,
                world,
            ));
        }

        self.expired.set();
    }
}

// ---------------------------------------------------------------------------
// Projectile

/// A shot from the player's nose. Travels at the simulation maximum, so it
/// can only ever collide with asteroids; nothing else can intercept it.
#[derive(Debug, Clone)]
pub struct Projectile {
    position: Vec2,
    rotation: f32,
    velocity: Vec2,
    expired: ExpiryFlag,
}

impl Projectile {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation,
            velocity: heading(rotation) * MAX_SIM_SPEED,
            expired: ExpiryFlag::default(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        PROJECTILE_LENGTH / 2.0
    }

    /// Leading point; projectiles are fast and thin, so collision tests use
    /// the nose rather than the whole shape.
    pub fn nose(&self) -> Vec2 {
        self.position + heading(self.rotation) * (PROJECTILE_LENGTH / 2.0)
    }

    pub fn is_expired(&self) -> bool {
        self.expired.get()
    }

    pub fn tick(&mut self, world: &World) {
        self.position += self.velocity * world.tick_dt();

        if !within_bounds(self.position, self.radius(), world.bounds()) {
            self.expired.set();
            return;
        }

        let nose = self.nose();
        world.for_all_asteroids(|asteroid| {
            if self.expired.get() || asteroid.is_expired() {
                return;
            }
            if point_in_circle(nose, asteroid.position(), asteroid.radius()) {
                log::debug!(
                    "projectile hit tier-{} asteroid at ({:.0}, {:.0})",
                    asteroid.tier(),
                    asteroid.position().x,
                    asteroid.position().y
                );
                asteroid.on_collision(world);
                self.expired.set();
            }
        });
    }

    pub fn draw(&self, world: &World) {
        let half = PROJECTILE_LENGTH / 2.0;
        let local = [
            Vec2::new(half, 0.0),
            Vec2::new(0.0, PROJECTILE_RADIUS),
            Vec2::new(-half, 0.0),
            Vec2::new(0.0, -PROJECTILE_RADIUS),
        ];
        let points = local
            .iter()
            .map(|p| shape::transform_point(*p, self.position, self.rotation))
            .collect();
        world.draw(&DrawCommand::Polygon {
            points,
            color: Color::rgb(255, 220, 80),
        });
    }
}

// ---------------------------------------------------------------------------
// Dot

/// Decorative impact fleck. Drifts briefly, then expires; purely cosmetic.
#[derive(Debug, Clone)]
pub struct Dot {
    position: Vec2,
    velocity: Vec2,
    created: Instant,
    lifetime: Duration,
    expired: ExpiryFlag,
}

impl Dot {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            created: Instant::now(),
            lifetime: Duration::from_millis(DOT_LIFETIME_MS),
            expired: ExpiryFlag::default(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn is_expired(&self) -> bool {
        self.expired.get()
    }

    pub fn tick(&mut self, world: &World) {
        self.position += self.velocity * world.tick_dt();
        if self.created.elapsed() >= self.lifetime
            || !within_bounds(self.position, 1.0, world.bounds())
        {
            self.expired.set();
        }
    }

    pub fn draw(&self, world: &World) {
        world.draw(&DrawCommand::Circle {
            center: self.position,
            radius: 1.5,
            color: Color::WHITE,
        });
    }
}

// ---------------------------------------------------------------------------
// FloatingText

/// Transient text: score popups at impact points, and the game-over banner
/// (which carries no lifetime and stays until the program ends).
#[derive(Debug, Clone)]
pub struct FloatingText {
    position: Vec2,
    content: String,
    size: f32,
    created: Instant,
    lifetime: Option<Duration>,
    expired: ExpiryFlag,
}

impl FloatingText {
    /// Text that expires after `lifetime_ms`.
    pub fn transient(position: Vec2, content: impl Into<String>, lifetime_ms: u64) -> Self {
        Self {
            position,
            content: content.into(),
            size: 14.0,
            created: Instant::now(),
            lifetime: Some(Duration::from_millis(lifetime_ms)),
            expired: ExpiryFlag::default(),
        }
    }

    /// Text that never times out.
    pub fn permanent(position: Vec2, content: impl Into<String>, size: f32) -> Self {
        Self {
            position,
            content: content.into(),
            size,
            created: Instant::now(),
            lifetime: None,
            expired: ExpiryFlag::default(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn is_expired(&self) -> bool {
        self.expired.get()
    }

    pub fn tick(&mut self, world: &World) {
        let timed_out = self
            .lifetime
            .is_some_and(|lifetime| self.created.elapsed() >= lifetime);
        if timed_out || !within_bounds(self.position, 0.0, world.bounds()) {
            self.expired.set();
        }
    }

    pub fn draw(&self, world: &World) {
        world.draw(&DrawCommand::Text {
            position: self.position,
            content: self.content.clone(),
            size: self.size,
            color: Color::WHITE,
        });
    }
}

// ---------------------------------------------------------------------------
// Entity

/// Closed sum over every entity variant that lives in the generic
/// container. Copy/move preserves the concrete variant and its state.
#[derive(Debug, Clone)]
pub enum Entity {
    Asteroid(Asteroid),
    Projectile(Projectile),
    Dot(Dot),
    Text(FloatingText),
}

impl Entity {
    pub fn position(&self) -> Vec2 {
        match self {
            Entity::Asteroid(a) => a.position(),
            Entity::Projectile(p) => p.position(),
            Entity::Dot(d) => d.position(),
            Entity::Text(t) => t.position(),
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            Entity::Asteroid(a) => a.radius(),
            Entity::Projectile(p) => p.radius(),
            Entity::Dot(_) => 1.5,
            Entity::Text(_) => 0.0,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self {
            Entity::Asteroid(a) => a.is_expired(),
            Entity::Projectile(p) => p.is_expired(),
            Entity::Dot(d) => d.is_expired(),
            Entity::Text(t) => t.is_expired(),
        }
    }

    pub fn tick(&mut self, world: &World) {
        match self {
            Entity::Asteroid(a) => a.tick(world),
            Entity::Projectile(p) => p.tick(world),
            Entity::Dot(d) => d.tick(world),
            Entity::Text(t) => t.tick(world),
        }
    }

    pub fn draw(&self, world: &World) {
        match self {
            Entity::Asteroid(a) => a.draw(world),
            Entity::Projectile(p) => p.draw(world),
            Entity::Dot(d) => d.draw(world),
            Entity::Text(t) => t.draw(world),
        }
    }
}

impl From<Asteroid> for Entity {
    fn from(a: Asteroid) -> Self {
        Entity::Asteroid(a)
    }
}

impl From<Projectile> for Entity {
    fn from(p: Projectile) -> Self {
        Entity::Projectile(p)
    }
}

impl From<Dot> for Entity {
    fn from(d: Dot) -> Self {
        Entity::Dot(d)
    }
}

impl From<FloatingText> for Entity {
    fn from(t: FloatingText) -> Self {
        Entity::Text(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::tests::test_world;

    #[test]
    fn test_expiry_flag_monotonic() {
        let flag = ExpiryFlag::default();
        assert!(!flag.get());
        flag.set();
        assert!(flag.get());
        flag.set();
        assert!(flag.get());
    }

    #[test]
    fn test_expiry_survives_clone() {
        let p = Projectile::new(Vec2::new(50.0, 50.0), 0.0);
        let copy = p.clone();
        assert!(!copy.is_expired());
        p.expired.set();
        // Clone made before expiry is an independent value
        assert!(!copy.is_expired());
        assert!(p.clone().is_expired());
    }

    #[test]
    fn test_projectile_travels_at_max_speed() {
        let p = Projectile::new(Vec2::ZERO, 1.0);
        assert!((p.velocity.length() - MAX_SIM_SPEED).abs() < 1e-3);
    }

    #[test]
    fn test_projectile_expires_offscreen() {
        let world = test_world();
        let mut p = Projectile::new(Vec2::new(499.0, 250.0), 0.0);
        for _ in 0..200 {
            p.tick(&world);
            if p.is_expired() {
                break;
            }
        }
        assert!(p.is_expired());
    }

    #[test]
    fn test_asteroid_culled_past_margin() {
        let world = test_world();
        // Heading straight off the right edge from just inside the margin
        let mut a = Asteroid::new(Vec2::new(540.0, 250.0), 0.0, 2, &world);
        for _ in 0..2000 {
            a.tick(&world);
            if a.is_expired() {
                break;
            }
        }
        assert!(a.is_expired());
    }

    #[test]
    fn test_asteroid_split_produces_two_children() {
        let world = test_world();
        let mut a = Asteroid::new(Vec2::new(250.0, 250.0), 0.0, 3, &world);
        a.on_collision(&world);
        assert!(a.is_expired());
        let first = world.try_pop_staged_asteroid().expect("first child");
        let second = world.try_pop_staged_asteroid().expect("second child");
        assert!(world.try_pop_staged_asteroid().is_none());
        assert_eq!(first.tier(), 2);
        assert_eq!(second.tier(), 2);
        // Children head in exactly opposite directions
        let sum = first.velocity + second.velocity;
        assert!(sum.length() < 1e-3);
        assert_eq!(world.score(), SCORE_PER_HIT);
    }

    #[test]
    fn test_min_tier_asteroid_dies_without_children() {
        let world = test_world();
        let mut a = Asteroid::new(Vec2::new(250.0, 250.0), 0.0, 1, &world);
        a.on_collision(&world);
        assert!(a.is_expired());
        assert!(world.try_pop_staged_asteroid().is_none());
        assert_eq!(world.score(), SCORE_PER_HIT);
    }

    #[test]
    fn test_text_expires_after_lifetime() {
        let world = test_world();
        let mut t = FloatingText::transient(Vec2::new(100.0, 100.0), "+100", 1);
        std::thread::sleep(Duration::from_millis(5));
        t.tick(&world);
        assert!(t.is_expired());
    }

    #[test]
    fn test_permanent_text_never_times_out() {
        let world = test_world();
        let mut t = FloatingText::permanent(Vec2::new(100.0, 100.0), "GAME OVER", 32.0);
        t.tick(&world);
        assert!(!t.is_expired());
    }

    #[test]
    fn test_entity_dispatch_preserves_variant() {
        let e: Entity = Projectile::new(Vec2::new(10.0, 10.0), 0.5).into();
        assert!(matches!(e, Entity::Projectile(_)));
        assert!((e.position() - Vec2::new(10.0, 10.0)).length() < 1e-5);
        let copy = e.clone();
        assert!(matches!(copy, Entity::Projectile(_)));
    }
}
