//! Simulation core
//!
//! Everything that advances on the fixed tick lives here: the entity
//! variants and their sum type, the player state machine, collision math,
//! and the world registry that owns the live sets. The module is free of
//! graphics and platform code; drawing is emitting [`crate::window::DrawCommand`]s
//! through the world's render sink.

pub mod collision;
pub mod entity;
pub mod player;
pub mod shape;
pub mod world;

pub use entity::{Asteroid, Dot, Entity, FloatingText, Projectile};
pub use player::{Intent, Player};
pub use world::World;
