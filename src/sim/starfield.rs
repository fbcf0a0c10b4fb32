//! Scrolling background stars
//!
//! Both modes fly the same starfield, just in different directions:
//! asteroid combat streams stars leftward past the ship, the rescue hover
//! drifts them slowly upward. Speeds are per-star so the field has depth.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

/// One background star.
#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct Starfield {
    stars: Vec<Star>,
    width: f32,
    height: f32,
    count: usize,
    speed_min: f32,
    speed_range: f32,
}

impl Starfield {
    /// Scatter `count` stars over the viewport with per-star speeds in
    /// `speed_min..speed_min + speed_range`.
    pub fn new(
        rng: &mut Pcg32,
        width: f32,
        height: f32,
        count: usize,
        speed_min: f32,
        speed_range: f32,
    ) -> Self {
        let mut field = Self {
            stars: Vec::with_capacity(count),
            width,
            height,
            count,
            speed_min,
            speed_range,
        };
        field.regenerate(rng);
        field
    }

    /// Re-scatter all stars (used on construction and resize).
    pub fn regenerate(&mut self, rng: &mut Pcg32) {
        self.stars.clear();
        for _ in 0..self.count {
            self.stars.push(Star {
                pos: Vec2::new(
                    rng.random_range(0.0..self.width),
                    rng.random_range(0.0..self.height),
                ),
                size: rng.random_range(0.0..2.0),
                speed: rng.random_range(0.0..self.speed_range) + self.speed_min,
            });
        }
    }

    pub fn resize(&mut self, rng: &mut Pcg32, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.regenerate(rng);
    }

    /// Stream leftward, wrapping to the right edge.
    pub fn scroll_horizontal(&mut self) {
        for star in &mut self.stars {
            star.pos.x -= star.speed;
            if star.pos.x < 0.0 {
                star.pos.x = self.width;
            }
        }
    }

    /// Drift upward, wrapping on both axes.
    pub fn scroll_vertical(&mut self) {
        for star in &mut self.stars {
            star.pos.y -= star.speed;
            if star.pos.y < 0.0 {
                star.pos.y = self.height;
            }
            if star.pos.x < 0.0 {
                star.pos.x = self.width;
            } else if star.pos.x > self.width {
                star.pos.x = 0.0;
            }
        }
    }

    /// Sideways push for the travelling-ship effect; the next vertical
    /// scroll wraps anything shoved off-screen.
    pub fn drift(&mut self, dx: f32) {
        for star in &mut self.stars {
            star.pos.x += dx;
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_field_has_requested_count() {
        let mut rng = Pcg32::seed_from_u64(1);
        let field = Starfield::new(&mut rng, 800.0, 600.0, 150, 0.5, 3.0);
        assert_eq!(field.stars().len(), 150);
        assert!(field.stars().iter().all(|s| s.speed >= 0.5));
    }

    #[test]
    fn test_horizontal_wrap() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut field = Starfield::new(&mut rng, 100.0, 100.0, 20, 1.0, 2.0);
        for _ in 0..500 {
            field.scroll_horizontal();
        }
        assert!(field.stars().iter().all(|s| (0.0..=100.0).contains(&s.pos.x)));
    }

    #[test]
    fn test_vertical_wrap_recovers_drift() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut field = Starfield::new(&mut rng, 100.0, 100.0, 20, 0.1, 0.5);
        for _ in 0..200 {
            field.drift(-5.0);
            field.scroll_vertical();
        }
        assert!(field.stars().iter().all(|s| (0.0..=100.0).contains(&s.pos.x)));
        assert!(field.stars().iter().all(|s| (0.0..=100.0).contains(&s.pos.y)));
    }
}
