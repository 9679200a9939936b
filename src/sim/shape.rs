//! Shape geometry for the game's entities
//!
//! The ship is a fixed 4-point convex silhouette; asteroids get a
//! procedurally jittered N-point outline so no two rocks look alike.
//! Collision code works on the transformed points these functions produce.

use glam::Vec2;

use crate::rotate_point;
use crate::sync::SharedRng;

/// Number of vertices in an asteroid outline
pub const ASTEROID_OUTLINE_POINTS: usize = 9;
/// Outline vertices are jittered within ±this fraction of the radius
pub const ASTEROID_OUTLINE_JITTER: f32 = 0.25;

/// The ship silhouette in local space, nose along +x, origin at the pivot.
///
/// ```text
///           1
///            \\
///    2 ----   \\
///    2 ----   / 0  (nose)
///            //
///           3
/// ```
pub const SHIP_POINTS: [Vec2; 4] = [
    Vec2::new(40.0, 0.0),
    Vec2::new(-20.0, 24.0),
    Vec2::new(-8.0, 0.0),
    Vec2::new(-20.0, -24.0),
];

/// Indices of the silhouette points used for exact collision. The tail
/// notch (point 2) lies inside the hull of these three, so the triangle
/// covers the whole ship.
pub const SHIP_COLLISION_TRIANGLE: [usize; 3] = [0, 1, 3];

/// Bounding radius of the ship silhouette.
pub fn ship_radius() -> f32 {
    SHIP_POINTS
        .iter()
        .map(|p| p.length())
        .fold(0.0_f32, f32::max)
}

/// Local point of the ship's nose (where projectiles spawn).
pub fn ship_nose() -> Vec2 {
    SHIP_POINTS[0]
}

/// Transform a local-space point into world space.
pub fn transform_point(local: Vec2, position: Vec2, rotation: f32) -> Vec2 {
    position + rotate_point(local, rotation)
}

/// The ship's silhouette transformed into world space.
pub fn ship_world_points(position: Vec2, rotation: f32) -> [Vec2; 4] {
    SHIP_POINTS.map(|p| transform_point(p, position, rotation))
}

/// The ship's collision triangle transformed into world space.
pub fn ship_collision_points(position: Vec2, rotation: f32) -> [Vec2; 3] {
    SHIP_COLLISION_TRIANGLE.map(|i| transform_point(SHIP_POINTS[i], position, rotation))
}

/// Generate a jittered outline for an asteroid of the given radius.
///
/// Points are in local space around the origin; callers rotate and translate
/// them per frame.
pub fn asteroid_outline(radius: f32, rng: &SharedRng) -> Vec<Vec2> {
    let step = std::f32::consts::TAU / ASTEROID_OUTLINE_POINTS as f32;
    (0..ASTEROID_OUTLINE_POINTS)
        .map(|i| {
            let jitter = rng.range_f32(-ASTEROID_OUTLINE_JITTER, ASTEROID_OUTLINE_JITTER);
            let r = radius * (1.0 + jitter);
            Vec2::from_angle(step * i as f32) * r
        })
        .collect()
}
