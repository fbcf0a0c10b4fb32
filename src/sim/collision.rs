//! Circular hit-tests
//!
//! Everything that can touch in either mode is a circle, so two helpers
//! cover all of it. The call sites choose how forgiving to be: the laser
//! test pads the target generously, the ship test scales the combined size
//! down to stay fair.

use glam::Vec2;

/// True when two circles overlap.
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Size-scaled overlap: `distance < (size_a + size_b) * factor`.
///
/// A factor below 1 tightens the hit box, above 1 loosens it.
pub fn scaled_hit(a: Vec2, size_a: f32, b: Vec2, size_b: f32, factor: f32) -> bool {
    a.distance(b) < (size_a + size_b) * factor
}
