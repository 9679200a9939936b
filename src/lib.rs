//! Astrobelt - a multithreaded asteroids simulation
//!
//! Core modules:
//! - `sim`: entity variants, player state machine, collision, world registry
//! - `sync`: the thread-safe primitives the simulation core is built on
//! - `window`: narrow render/window abstraction (the core never talks to a
//!   graphics backend directly)
//! - `input`: raw key to player-intent mapping
//! - `runtime`: the three-thread lifecycle (render/event, fixed tick, spawner)
//!
//! The simulation advances at a fixed tick rate on its own thread, decoupled
//! from rendering. Entities created off the tick thread go through staging
//! queues and become live only at a tick boundary.

pub mod input;
pub mod runtime;
pub mod settings;
pub mod sim;
pub mod sync;
pub mod window;

pub use settings::{Settings, TickStyle};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Maximum speed of anything in the simulation (pixels/sec). Projectiles
    /// travel at exactly this speed, which is what lets them skip collision
    /// checks against each other and the player: nothing can catch them.
    pub const MAX_SIM_SPEED: f32 = 300.0;
    /// The player tops out at 95% of the simulation maximum.
    pub const PLAYER_MAX_SPEED: f32 = MAX_SIM_SPEED * 0.95;
    /// Thrust acceleration (pixels/sec^2)
    pub const PLAYER_ACCEL: f32 = 220.0;
    /// Drag is a much stronger impulse than thrust so the ship settles fast
    pub const PLAYER_DRAG_FACTOR: f32 = 10.0;
    /// Heading change per simulation tick while a turn key is held (radians)
    pub const PLAYER_TURN_PER_TICK: f32 = 0.008;

    /// Largest asteroid tier; splitting decrements down to [`ASTEROID_MIN_TIER`]
    pub const ASTEROID_MAX_TIER: u8 = 3;
    /// Smallest tier; a hit at this tier destroys the asteroid outright
    pub const ASTEROID_MIN_TIER: u8 = 1;
    /// Collision radius per tier unit
    pub const ASTEROID_TIER_RADIUS: f32 = 14.0;
    /// Asteroid drift speed (pixels/sec)
    pub const ASTEROID_SPEED: f32 = 90.0;
    /// Asteroids are culled once they drift this fraction of the window
    /// dimension past its edge. They spawn offscreen, so "is offscreen"
    /// alone cannot be the cull test.
    pub const ASTEROID_CULL_MARGIN: f32 = 0.1;

    /// Length of a projectile from tail to nose (pixels)
    pub const PROJECTILE_LENGTH: f32 = 10.0;
    /// Half-width of a projectile (pixels)
    pub const PROJECTILE_RADIUS: f32 = 3.0;

    /// Points awarded per projectile-asteroid hit
    pub const SCORE_PER_HIT: u64 = 100;
    /// Lifetime of a floating score popup (milliseconds)
    pub const POPUP_LIFETIME_MS: u64 = 900;
    /// Lifetime of a decorative impact fleck (milliseconds)
    pub const DOT_LIFETIME_MS: u64 = 600;
    /// Number of flecks scattered at an impact point
    pub const DOT_BURST_COUNT: usize = 6;
    /// Fleck scatter speed (pixels/sec)
    pub const DOT_SPEED: f32 = 40.0;
}

/// Normalize an angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `theta`
#[inline]
pub fn heading(theta: f32) -> Vec2 {
    Vec2::from_angle(theta)
}

/// Rotate `point` by `theta` around the origin
#[inline]
pub fn rotate_point(point: Vec2, theta: f32) -> Vec2 {
    Vec2::from_angle(theta).rotate(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_heading_is_unit() {
        for theta in [0.0, 1.0, -2.5, PI] {
            assert!((heading(theta).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(Vec2::new(1.0, 0.0), PI / 2.0);
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }
}
