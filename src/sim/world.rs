//! World registry
//!
//! Owns every live entity, the staging queues that let any thread create
//! entities, and the score/game-over state. New entities become visible to
//! iteration only when a tick boundary drains them out of staging into the
//! live containers; expired entities leave only in the dedicated sweep.
//! Both transitions happen at defined points, never mid-scan.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use glam::Vec2;
use parking_lot::Mutex;

use super::entity::{Asteroid, Dot, Entity, FloatingText};
use crate::consts::*;
use crate::heading;
use crate::sync::{SharedRng, SharedVec, StagingQueue};
use crate::window::{DrawCommand, SharedWindow};

/// Thread-shared game world.
pub struct World {
    window: Arc<SharedWindow>,
    rng: SharedRng,
    tick_dt: f32,
    /// Live non-asteroid entities (projectiles, popups, flecks)
    entities: SharedVec<Entity>,
    /// Live asteroids, kept separate so collision scans touch only rocks
    asteroids: SharedVec<Asteroid>,
    staged_asteroids: StagingQueue<Asteroid>,
    staged_entities: StagingQueue<Entity>,
    score: AtomicU64,
    game_over: AtomicBool,
    score_text: Mutex<FloatingText>,
    /// Created lazily, exactly once, on the first tick after game over
    banner: Mutex<Option<FloatingText>>,
}

impl World {
    pub fn new(window: Arc<SharedWindow>, rng: SharedRng, tick_dt: f32) -> Self {
        Self {
            window,
            rng,
            tick_dt,
            entities: SharedVec::new(),
            asteroids: SharedVec::new(),
            staged_asteroids: StagingQueue::new(),
            staged_entities: StagingQueue::new(),
            score: AtomicU64::new(0),
            game_over: AtomicBool::new(false),
            score_text: Mutex::new(FloatingText::permanent(
                Vec2::new(10.0, 20.0),
                "Score: 0",
                16.0,
            )),
            banner: Mutex::new(None),
        }
    }

    // -- environment --------------------------------------------------------

    pub fn tick_dt(&self) -> f32 {
        self.tick_dt
    }

    /// Window dimensions as a vector.
    pub fn bounds(&self) -> Vec2 {
        self.window.bounds()
    }

    pub fn rng(&self) -> &SharedRng {
        &self.rng
    }

    /// Forward a draw command to the (serialized) window.
    pub fn draw(&self, command: &DrawCommand) {
        self.window.draw(command);
    }

    // -- entity creation (any thread) ---------------------------------------

    /// Create one fresh asteroid in the belt just outside the window,
    /// heading roughly at the screen center, and stage it.
    pub fn spawn_asteroid(&self) {
        let bounds = self.bounds();

        // A coordinate in [0, 10) folded to either side of the axis puts the
        // rock just past one of the four edges.
        let x_rand = self.rng.range_f32(0.0, 10.0);
        let x = if x_rand < 5.0 {
            -x_rand
        } else {
            bounds.x + x_rand
        };
        let y_rand = self.rng.range_f32(0.0, 10.0);
        let y = if y_rand < 5.0 {
            -y_rand
        } else {
            bounds.y + y_rand
        };
        let position = Vec2::new(x, y);

        // Toward the center, perturbed up to 30 degrees either way
        let jitter = 30.0_f32.to_radians();
        let to_center = (bounds / 2.0 - position).to_angle();
        let direction = to_center + self.rng.range_f32(-jitter, jitter);

        log::debug!("spawning asteroid at ({x:.0}, {y:.0})");
        self.stage_asteroid(Asteroid::new(position, direction, ASTEROID_MAX_TIER, self));
    }

    /// Queue an asteroid for admission at the next tick boundary.
    pub fn stage_asteroid(&self, asteroid: Asteroid) {
        self.staged_asteroids.push(asteroid);
    }

    /// Queue any other entity for admission at the next tick boundary.
    pub fn stage_entity(&self, entity: Entity) {
        self.staged_entities.push(entity);
    }

    // -- score / game over --------------------------------------------------

    /// Award points and stage the impact dressing (score popup plus a burst
    /// of flecks) at `position`.
    pub fn add_score(&self, points: u64, position: Vec2) {
        self.score.fetch_add(points, Ordering::AcqRel);
        self.stage_entity(
            FloatingText::transient(position, format!("+{points}"), POPUP_LIFETIME_MS).into(),
        );
        let phase = self.rng.range_f32(0.0, std::f32::consts::TAU);
        let step = std::f32::consts::TAU / DOT_BURST_COUNT as f32;
        for i in 0..DOT_BURST_COUNT {
            let velocity = heading(phase + step * i as f32) * DOT_SPEED;
            self.stage_entity(Dot::new(position, velocity).into());
        }
    }

    pub fn score(&self) -> u64 {
        self.score.load(Ordering::Acquire)
    }

    /// One-way transition into the game-over state. Idempotent.
    pub fn game_over(&self) {
        if !self.game_over.swap(true, Ordering::AcqRel) {
            log::info!("game over with score {}", self.score());
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.load(Ordering::Acquire)
    }

    // -- per-tick sequence --------------------------------------------------

    /// Advance the registry by one tick, always in the same order: game-over
    /// short-circuit, staging admission, score refresh, then entity ticks.
    pub fn tick(&self) {
        if self.is_game_over() {
            let mut banner = self.banner.lock();
            if banner.is_none() {
                *banner = Some(FloatingText::permanent(
                    self.bounds() / 2.0,
                    "GAME OVER",
                    32.0,
                ));
            }
            return;
        }

        while let Some(asteroid) = self.staged_asteroids.try_pop() {
            self.asteroids.push_back(asteroid);
        }
        while let Some(entity) = self.staged_entities.try_pop() {
            self.entities.push_back(entity);
        }

        self.score_text
            .lock()
            .set_content(format!("Score: {}", self.score()));

        self.entities.for_each(|entity| entity.tick(self));
        self.asteroids.for_each(|asteroid| asteroid.tick(self));
    }

    /// Remove everything whose expiry flag is set. Runs between ticks, never
    /// concurrently with iteration over the same container.
    pub fn sweep_expired(&self) {
        self.entities.erase_if(|entity| entity.is_expired());
        self.asteroids.erase_if(|asteroid| asteroid.is_expired());
    }

    /// Draw both live containers, the score readout, and (if present) the
    /// game-over banner.
    pub fn draw_all(&self) {
        self.entities.for_each(|entity| entity.draw(self));
        self.asteroids.for_each(|asteroid| asteroid.draw(self));
        self.score_text.lock().draw(self);
        if let Some(banner) = self.banner.lock().as_ref() {
            banner.draw(self);
        }
    }

    // -- queries ------------------------------------------------------------

    /// Visit every live asteroid. Used by projectile and player collision
    /// scans; the visitor runs under the asteroid-container lock.
    pub fn for_all_asteroids<F: FnMut(&mut Asteroid)>(&self, visitor: F) {
        self.asteroids.for_each(visitor);
    }

    /// Visit every live non-asteroid entity.
    pub fn for_all_entities<F: FnMut(&mut Entity)>(&self, visitor: F) {
        self.entities.for_each(visitor);
    }

    pub fn num_asteroids(&self) -> usize {
        self.asteroids.len()
    }

    /// Total live entity count across both containers.
    pub fn num_entities(&self) -> usize {
        self.entities.len() + self.asteroids.len()
    }

    // -- test hooks ---------------------------------------------------------

    #[cfg(test)]
    pub(crate) fn try_pop_staged_asteroid(&self) -> Option<Asteroid> {
        self.staged_asteroids.try_pop()
    }

    #[cfg(test)]
    pub(crate) fn drain_staged_entities(&self) -> Vec<Entity> {
        let mut out = Vec::new();
        while let Some(e) = self.staged_entities.try_pop() {
            out.push(e);
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn asteroids_raw(&self) -> &SharedVec<Asteroid> {
        &self.asteroids
    }
}
