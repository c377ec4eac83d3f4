//! Pluggable behaviour for a [`ParticleSystem`](crate::ParticleSystem): how a slot is
//! (re)spawned, how a live particle moves, and what happens when it runs out of life.

use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::particle::Particle;
use crate::random;

/// Produces the initial state of a slot.
pub trait SpawnRule {
    fn spawn(&mut self, rng: &mut StdRng) -> Particle;
}

impl<F> SpawnRule for F
where
    F: FnMut(&mut StdRng) -> Particle,
{
    fn spawn(&mut self, rng: &mut StdRng) -> Particle {
        self(rng)
    }
}

/// Advances one live particle by `dt` seconds. Called before the particle's age is
/// incremented for the step.
pub trait IntegrationRule {
    fn integrate(&mut self, particle: &mut Particle, dt: f32);
}

impl<F> IntegrationRule for F
where
    F: FnMut(&mut Particle, f32),
{
    fn integrate(&mut self, particle: &mut Particle, dt: f32) {
        self(particle, dt)
    }
}

/// What happens to a slot whose particle reached its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Slot stays dead until the system is reset. Bursty effects.
    Expire,
    /// Slot is refilled in place, keeping the live count constant.
    #[default]
    Respawn,
}

/// Where new particles appear, relative to the emitter origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SpawnRegion {
    #[default]
    Point,
    UnitCube,
    UnitSquare,
    Sphere { radius: f32 },
    Disk { radius: f32 },
    Box { half_extents: Vec3 },
}

impl SpawnRegion {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match *self {
            SpawnRegion::Point => Vec3::ZERO,
            SpawnRegion::UnitCube => random::unit_cube(rng),
            SpawnRegion::UnitSquare => random::unit_square(rng),
            SpawnRegion::Sphere { radius } => random::unit_sphere(rng) * radius,
            SpawnRegion::Disk { radius } => random::unit_disk(rng) * radius,
            SpawnRegion::Box { half_extents } => random::range_vec3(rng, -half_extents, half_extents),
        }
    }
}

/// Colour assigned at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorRule {
    Fixed { rgba: Vec4 },
    /// Independent uniform rgb channels with a fixed alpha.
    RandomRgb { alpha: f32 },
    /// Uniform blend between two colours.
    Between { from: Vec4, to: Vec4 },
}

impl Default for ColorRule {
    fn default() -> Self {
        ColorRule::Fixed { rgba: Vec4::ONE }
    }
}

impl ColorRule {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec4 {
        match *self {
            ColorRule::Fixed { rgba } => rgba,
            ColorRule::RandomRgb { alpha } => Vec4::new(rng.gen(), rng.gen(), rng.gen(), alpha),
            ColorRule::Between { from, to } => from.lerp(to, rng.gen()),
        }
    }
}

/// Generic emitter: samples every spawn parameter from configured ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    pub origin: Vec3,
    pub region: SpawnRegion,
    pub velocity_min: Vec3,
    pub velocity_max: Vec3,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub color: ColorRule,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            region: SpawnRegion::Point,
            velocity_min: Vec3::ZERO,
            velocity_max: Vec3::ZERO,
            lifetime_min: 1.0,
            lifetime_max: 1.0,
            size_min: 0.1,
            size_max: 0.1,
            color: ColorRule::default(),
        }
    }
}

impl SpawnRule for Emitter {
    fn spawn(&mut self, rng: &mut StdRng) -> Particle {
        let position = self.origin + self.region.sample(rng);
        let velocity = random::range_vec3(rng, self.velocity_min, self.velocity_max);
        let lifetime = random::range(rng, self.lifetime_min, self.lifetime_max);
        let size = random::range(rng, self.size_min, self.size_max);
        let color = self.color.sample(rng);
        Particle::spawned(position, velocity, color, size, lifetime)
    }
}

/// `position += velocity * dt`, nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ballistic;

impl IntegrationRule for Ballistic {
    fn integrate(&mut self, particle: &mut Particle, dt: f32) {
        particle.position += particle.velocity * dt;
    }
}

/// Semi-implicit Euler with constant acceleration and linear drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub gravity: Vec3,
    /// Fraction of velocity lost per second.
    pub drag: f32,
    /// Alpha tracks the remaining fraction of life.
    pub fade: bool,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            gravity: Vec3::ZERO,
            drag: 0.0,
            fade: false,
        }
    }
}

impl IntegrationRule for Motion {
    fn integrate(&mut self, particle: &mut Particle, dt: f32) {
        particle.velocity += self.gravity * dt;
        particle.velocity *= (1.0 - self.drag * dt).max(0.0);
        particle.position += particle.velocity * dt;
        if self.fade && particle.lifetime > 0.0 {
            let remaining = 1.0 - (particle.age + dt) / particle.lifetime;
            particle.color.w = remaining.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn emitter_samples_inside_configured_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut emitter = Emitter {
            origin: Vec3::new(0.0, 1.0, 0.0),
            region: SpawnRegion::Box {
                half_extents: Vec3::new(0.5, 0.0, 0.5),
            },
            velocity_min: Vec3::new(-1.0, 2.0, -1.0),
            velocity_max: Vec3::new(1.0, 4.0, 1.0),
            lifetime_min: 0.5,
            lifetime_max: 1.5,
            size_min: 0.1,
            size_max: 0.2,
            color: ColorRule::RandomRgb { alpha: 0.5 },
        };
        for _ in 0..200 {
            let p = emitter.spawn(&mut rng);
            assert!(p.alive);
            assert_eq!(p.age, 0.0);
            assert_eq!(p.position.y, 1.0);
            assert!(p.position.x.abs() <= 0.5 && p.position.z.abs() <= 0.5);
            assert!((2.0..=4.0).contains(&p.velocity.y));
            assert!((0.5..=1.5).contains(&p.lifetime));
            assert!((0.1..=0.2).contains(&p.size));
            assert_eq!(p.color.w, 0.5);
        }
    }

    #[test]
    fn motion_applies_gravity_and_drag() {
        let mut motion = Motion {
            gravity: Vec3::new(0.0, -10.0, 0.0),
            drag: 0.5,
            fade: false,
        };
        let mut p = Particle::spawned(Vec3::ZERO, Vec3::X, Vec4::ONE, 1.0, 10.0);
        motion.integrate(&mut p, 1.0);
        assert!((p.velocity - Vec3::new(0.5, -5.0, 0.0)).length() < 1e-6);
        assert!((p.position - Vec3::new(0.5, -5.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn fading_motion_tracks_remaining_life() {
        let mut motion = Motion {
            fade: true,
            ..Motion::default()
        };
        let mut p = Particle::spawned(Vec3::ZERO, Vec3::ZERO, Vec4::ONE, 1.0, 4.0);
        motion.integrate(&mut p, 1.0);
        assert!((p.color.w - 0.75).abs() < 1e-6);
    }

    #[test]
    fn region_serializes_with_shape_tag() {
        let region = SpawnRegion::Sphere { radius: 2.0 };
        let text = serde_json::to_string(&region).unwrap();
        assert_eq!(text, r#"{"shape":"sphere","radius":2.0}"#);
    }
}
