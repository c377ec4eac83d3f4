use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// One pooled particle slot.
///
/// While `alive`, `0 <= age <= lifetime` holds after every update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec4,
    pub size: f32,
    pub age: f32,
    pub lifetime: f32,
    pub alive: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            color: Vec4::ONE,
            size: 1.0,
            age: 0.0,
            lifetime: 1.0,
            alive: false,
        }
    }
}

impl Particle {
    /// A freshly spawned particle at age zero.
    pub fn spawned(position: Vec3, velocity: Vec3, color: Vec4, size: f32, lifetime: f32) -> Self {
        Self {
            position,
            velocity,
            color,
            size,
            age: 0.0,
            lifetime,
            alive: true,
        }
    }

    /// Normalized age in `[0, 1]`.
    pub fn life_fraction(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }

    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.color.is_finite()
            && self.size.is_finite()
            && self.age.is_finite()
    }

    pub fn view(&self) -> ParticleView {
        ParticleView {
            position: self.position,
            color: self.color,
            size: self.size,
        }
    }
}

/// What a draw pass sees of a live particle. Copied out of the pool so no
/// reference to a slot outlives the traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub position: Vec3,
    pub color: Vec4,
    pub size: f32,
}
