//! Confetti core: platform-agnostic particle pool, spawn and integration rules, and effect presets.

mod config;
mod error;
mod particle;
pub mod random;
mod rules;
mod system;

pub use config::EffectConfig;
pub use error::{Result, SimulationError};
pub use particle::{Particle, ParticleView};
pub use rules::{
    Ballistic, ColorRule, Emitter, ExpiryPolicy, IntegrationRule, Motion, SpawnRegion, SpawnRule,
};
pub use system::{checked_capacity, ParticleSystem};
