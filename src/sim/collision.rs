//! Pure overlap and containment queries
//!
//! Everything here is side-effect free. Boundary behavior is deliberate:
//! overlap tests are inclusive at exact contact, containment tests reject a
//! candidate position before it is committed (positions are never corrected
//! after the fact).

use glam::Vec2;

/// Two circles collide iff the distance between centers is at most the sum of
/// their radii. Compared squared for speed; the tie at exact contact counts
/// as a collision.
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

/// Separating-axis test for two axis-aligned boxes given centers and half
/// extents, inclusive at shared edges.
#[inline]
pub fn aabbs_overlap(a: Vec2, half_a: Vec2, b: Vec2, half_b: Vec2) -> bool {
    (a.x - b.x).abs() <= half_a.x + half_b.x && (a.y - b.y).abs() <= half_a.y + half_b.y
}

/// Whether a candidate position stays within a circular arena centered on the
/// origin.
#[inline]
pub fn inside_circle(candidate: Vec2, radius: f32) -> bool {
    candidate.length_squared() <= radius * radius
}

/// Whether a candidate x position stays within the playable band
/// `[margin, width - margin]`.
#[inline]
pub fn inside_band(x: f32, margin: f32, width: f32) -> bool {
    x >= margin && x <= width - margin
}
