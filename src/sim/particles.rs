//! Transient visual effects: expanding shockwaves and scattering debris
//!
//! Purely cosmetic - collision logic never reads particles. Their only
//! side effect on the rest of the system is keeping the frame loop alive
//! until the last fragment burns out.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

/// Shockwave starting radius (px).
const SHOCKWAVE_START_RADIUS: f32 = 5.0;
/// Shockwave radius growth per tick (px).
const SHOCKWAVE_GROWTH: f32 = 15.0;
/// Shockwave alpha fade per tick.
const SHOCKWAVE_FADE: f32 = 0.05;
/// Fraction of debris velocity kept each tick.
const DEBRIS_FRICTION: f32 = 0.95;

/// A single effect particle.
#[derive(Debug, Clone, Copy)]
pub enum Particle {
    /// Expanding ring that fades out linearly.
    Shockwave {
        pos: Vec2,
        radius: f32,
        alpha: f32,
        color: u32,
    },
    /// A glowing fragment; velocity decays with friction, life at its own
    /// per-particle rate.
    Debris {
        pos: Vec2,
        vel: Vec2,
        life: f32,
        decay: f32,
        size: f32,
        color: u32,
    },
}

impl Particle {
    /// Still worth drawing?
    fn alive(&self) -> bool {
        match self {
            Particle::Shockwave { alpha, .. } => *alpha > 0.0,
            Particle::Debris { life, .. } => *life > 0.0,
        }
    }
}

/// Particle pool shared by both game modes.
#[derive(Debug, Default)]
pub struct Effects {
    particles: Vec<Particle>,
}

impl Effects {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
        }
    }

    /// One shockwave plus `debris` fragments scattered at random angles.
    ///
    /// Colors are `0xRRGGBB`; the renderer looks them up, the simulation
    /// only carries them.
    pub fn spawn_explosion(&mut self, rng: &mut Pcg32, pos: Vec2, color: u32, debris: usize) {
        self.particles.push(Particle::Shockwave {
            pos,
            radius: SHOCKWAVE_START_RADIUS,
            alpha: 1.0,
            color,
        });

        for _ in 0..debris {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(0.0..15.0) + 5.0;
            self.particles.push(Particle::Debris {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 1.0,
                decay: rng.random_range(0.0..0.03) + 0.01,
                size: rng.random_range(0.0..4.0) + 2.0,
                color,
            });
        }
    }

    /// Age every particle one tick and prune the expired.
    pub fn update(&mut self) {
        for particle in &mut self.particles {
            match particle {
                Particle::Shockwave { radius, alpha, .. } => {
                    *radius += SHOCKWAVE_GROWTH;
                    *alpha -= SHOCKWAVE_FADE;
                }
                Particle::Debris {
                    pos,
                    vel,
                    life,
                    decay,
                    ..
                } => {
                    *pos += *vel;
                    *vel *= DEBRIS_FRICTION;
                    *life -= *decay;
                }
            }
        }
        self.particles.retain(Particle::alive);
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Everything currently alive, for the renderer.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_explosion_particle_count() {
        let mut fx = Effects::new();
        fx.spawn_explosion(&mut rng(), Vec2::new(10.0, 10.0), 0xffaa00, 40);
        assert_eq!(fx.len(), 41);
    }

    #[test]
    fn test_all_particles_eventually_pruned() {
        let mut fx = Effects::new();
        fx.spawn_explosion(&mut rng(), Vec2::ZERO, 0xff0000, 25);
        // Slowest possible debris decays 0.01/tick from life 1.0
        for _ in 0..120 {
            fx.update();
        }
        assert!(fx.is_empty());
    }

    #[test]
    fn test_debris_slows_down() {
        let mut fx = Effects::new();
        fx.spawn_explosion(&mut rng(), Vec2::ZERO, 0xffffff, 1);
        let speed_of = |fx: &Effects| {
            fx.particles()
                .iter()
                .find_map(|p| match p {
                    Particle::Debris { vel, .. } => Some(vel.length()),
                    _ => None,
                })
                .expect("debris present")
        };
        let before = speed_of(&fx);
        fx.update();
        assert!(speed_of(&fx) < before);
    }

    proptest! {
        #[test]
        fn prop_spawn_yields_count_plus_shockwave(count in 0usize..64) {
            let mut fx = Effects::new();
            fx.spawn_explosion(&mut rng(), Vec2::ZERO, 0x00ffff, count);
            prop_assert_eq!(fx.len(), count + 1);
        }
    }
}
