//! Collision tests for the simulation
//!
//! Everything here is an arcade approximation: asteroids are circles,
//! projectiles collide with their nose point, and the ship is a triangle.
//! The ship test runs a cheap circle reject before the exact
//! vertex/edge work.

use glam::Vec2;

/// Circle-vs-circle overlap: centers within the sum of the radii.
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    a_pos.distance_squared(b_pos) <= (a_radius + b_radius) * (a_radius + b_radius)
}

/// Point inside (or on) a circle.
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// Whether a circle of `radius` at `pos` lies fully within `[0, bounds.x] x
/// [0, bounds.y]`.
pub fn within_bounds(pos: Vec2, radius: f32, bounds: Vec2) -> bool {
    !(pos.x - radius < 0.0
        || pos.y - radius < 0.0
        || pos.x + radius > bounds.x
        || pos.y + radius > bounds.y)
}

/// Exact triangle-vs-circle test with a broad-phase reject.
///
/// `triangle_center` and `triangle_radius` feed the broad phase: anything
/// further than three combined radii apart cannot possibly touch. Past
/// that, a hit is any triangle vertex inside the circle, or the circle's
/// center projecting onto a triangle edge within the circle's radius.
pub fn triangle_circle_collision(
    triangle: &[Vec2; 3],
    triangle_center: Vec2,
    triangle_radius: f32,
    circle_center: Vec2,
    circle_radius: f32,
) -> bool {
    let reject = 3.0 * (triangle_radius + circle_radius);
    if triangle_center.distance_squared(circle_center) > reject * reject {
        return false;
    }

    for vertex in triangle {
        if point_in_circle(*vertex, circle_center, circle_radius) {
            return true;
        }
    }

    for i in 0..3 {
        let a = triangle[i];
        let b = triangle[(i + 1) % 3];
        if segment_hits_circle(a, b, circle_center, circle_radius) {
            return true;
        }
    }

    false
}

/// Circle-center-to-segment distance test via projection. Only accepts when
/// the projection falls strictly between the endpoints; endpoint hits are
/// already covered by the vertex test.
fn segment_hits_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let edge = b - a;
    let len = edge.length();
    debug_assert!(len > 0.0, "degenerate collision edge");

    let along = (center - a).dot(edge) / len;
    if along <= 0.0 || along >= len {
        return false;
    }

    let closest = a + edge * (along / len);
    point_in_circle(closest, center, radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRI: [Vec2; 3] = [
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(0.0, 10.0),
    ];

    fn tri_hits(circle_center: Vec2, circle_radius: f32) -> bool {
        triangle_circle_collision(&TRI, Vec2::new(3.0, 3.0), 10.0, circle_center, circle_radius)
    }

    #[test]
    fn test_circles_overlap_boundary() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.1, 0.0), 5.0));
    }

    #[test]
    fn test_within_bounds_edges() {
        let bounds = Vec2::new(100.0, 100.0);
        assert!(within_bounds(Vec2::new(50.0, 50.0), 10.0, bounds));
        assert!(!within_bounds(Vec2::new(5.0, 50.0), 10.0, bounds));
        assert!(!within_bounds(Vec2::new(50.0, 95.0), 10.0, bounds));
    }

    #[test]
    fn test_triangle_vertex_in_circle() {
        assert!(tri_hits(Vec2::new(10.5, 0.0), 1.0));
    }

    #[test]
    fn test_triangle_edge_hit() {
        // Circle below the hypotenuse's midpoint, touching the bottom edge
        assert!(tri_hits(Vec2::new(5.0, -0.5), 1.0));
    }

    #[test]
    fn test_triangle_clear_miss() {
        assert!(!tri_hits(Vec2::new(20.0, 20.0), 1.0));
    }

    #[test]
    fn test_broad_phase_rejects_distant_circle() {
        // Well past 3x combined radius: even a huge triangle radius claim
        // cannot make this hit
        assert!(!triangle_circle_collision(
            &TRI,
            Vec2::new(3.0, 3.0),
            1.0,
            Vec2::new(500.0, 500.0),
            1.0
        ));
    }

    #[test]
    fn test_circle_containing_triangle_misses_without_vertex_or_edge() {
        // A circle fully containing the triangle still registers via the
        // vertex test
        assert!(tri_hits(Vec2::new(3.0, 3.0), 50.0));
    }
}
