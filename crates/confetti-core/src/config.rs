use std::path::Path;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SimulationError};
use crate::rules::{ColorRule, Emitter, ExpiryPolicy, Motion, SpawnRegion};
use crate::system::{checked_capacity, ParticleSystem};

/// Serializable description of one particle effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub name: String,
    /// Signed so that a negative count in a config file is reported as an
    /// invalid capacity rather than a parse error.
    pub max_particles: i64,
    pub expiry: ExpiryPolicy,
    pub origin: Vec3,
    pub region: SpawnRegion,
    pub velocity_min: Vec3,
    pub velocity_max: Vec3,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub color: ColorRule,
    pub gravity: Vec3,
    pub drag: f32,
    pub fade: bool,
    pub seed: Option<u64>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self::confetti()
    }
}

impl EffectConfig {
    /// Continuously respawning cloud of randomly coloured squares.
    pub fn confetti() -> Self {
        Self {
            name: "Confetti".into(),
            max_particles: 500,
            expiry: ExpiryPolicy::Respawn,
            origin: Vec3::ZERO,
            region: SpawnRegion::UnitCube,
            velocity_min: Vec3::new(-0.1, -0.1, -0.1),
            velocity_max: Vec3::new(0.1, 0.1, 0.1),
            lifetime_min: 1.0,
            lifetime_max: 4.0,
            size_min: 0.1,
            size_max: 0.25,
            color: ColorRule::RandomRgb { alpha: 1.0 },
            gravity: Vec3::new(0.0, -0.1, 0.0),
            drag: 0.0,
            fade: false,
            seed: None,
        }
    }

    /// Fountain of short-lived sparks thrown upwards, fading as they fall.
    pub fn sparks() -> Self {
        Self {
            name: "Sparks".into(),
            max_particles: 800,
            expiry: ExpiryPolicy::Respawn,
            origin: Vec3::new(0.0, -0.8, 0.0),
            region: SpawnRegion::Disk { radius: 0.05 },
            velocity_min: Vec3::new(-0.5, 1.5, -0.5),
            velocity_max: Vec3::new(0.5, 3.0, 0.5),
            lifetime_min: 0.4,
            lifetime_max: 1.2,
            size_min: 0.02,
            size_max: 0.06,
            color: ColorRule::Between {
                from: Vec4::new(1.0, 0.8, 0.3, 1.0),
                to: Vec4::new(1.0, 0.3, 0.0, 1.0),
            },
            gravity: Vec3::new(0.0, -3.0, 0.0),
            drag: 0.2,
            fade: true,
            seed: None,
        }
    }

    /// One-shot explosion; slots stay dead once expired.
    pub fn burst() -> Self {
        Self {
            name: "Burst".into(),
            max_particles: 200,
            expiry: ExpiryPolicy::Expire,
            origin: Vec3::ZERO,
            region: SpawnRegion::Sphere { radius: 0.1 },
            velocity_min: Vec3::splat(-2.0),
            velocity_max: Vec3::splat(2.0),
            lifetime_min: 0.5,
            lifetime_max: 1.5,
            size_min: 0.05,
            size_max: 0.1,
            color: ColorRule::Fixed {
                rgba: Vec4::new(1.0, 1.0, 0.6, 1.0),
            },
            gravity: Vec3::ZERO,
            drag: 1.0,
            fade: true,
            seed: None,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a config, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SimulationError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            _ => return Err(SimulationError::UnsupportedFormat(path.to_path_buf())),
        };
        info!(name = %config.name, path = %path.display(), "loaded effect config");
        Ok(config)
    }

    pub fn emitter(&self) -> Emitter {
        Emitter {
            origin: self.origin,
            region: self.region,
            velocity_min: self.velocity_min,
            velocity_max: self.velocity_max,
            lifetime_min: self.lifetime_min,
            lifetime_max: self.lifetime_max,
            size_min: self.size_min,
            size_max: self.size_max,
            color: self.color,
        }
    }

    pub fn motion(&self) -> Motion {
        Motion {
            gravity: self.gravity,
            drag: self.drag,
            fade: self.fade,
        }
    }

    /// Builds and initializes the system this config describes.
    pub fn build(&self) -> Result<ParticleSystem> {
        let capacity = checked_capacity(self.max_particles)?;
        let mut system = ParticleSystem::new(self.emitter(), self.motion(), self.expiry);
        if let Some(seed) = self.seed {
            system = system.with_seed(seed);
        }
        system.initialize(capacity)?;
        Ok(system)
    }
}
