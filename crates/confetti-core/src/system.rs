use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::error::{Result, SimulationError};
use crate::particle::{Particle, ParticleView};
use crate::rules::{ExpiryPolicy, IntegrationRule, SpawnRule};

/// Validates a caller-supplied particle count.
pub fn checked_capacity(capacity: i64) -> Result<usize> {
    usize::try_from(capacity).map_err(|_| SimulationError::InvalidCapacity(capacity))
}

/// Fixed-capacity particle pool advanced on the host once per frame.
///
/// Slots are allocated by [`initialize`](Self::initialize) and never grow afterwards.
/// Expired slots are either left dead or refilled in place according to the
/// [`ExpiryPolicy`], so slot indices stay stable for the life of the pool.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    spawn: Box<dyn SpawnRule>,
    integrate: Box<dyn IntegrationRule>,
    expiry: ExpiryPolicy,
    rng: StdRng,
}

impl ParticleSystem {
    /// Empty system; call [`initialize`](Self::initialize) to allocate slots.
    pub fn new(
        spawn: impl SpawnRule + 'static,
        integrate: impl IntegrationRule + 'static,
        expiry: ExpiryPolicy,
    ) -> Self {
        Self {
            particles: Vec::new(),
            spawn: Box::new(spawn),
            integrate: Box::new(integrate),
            expiry,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the entropy-seeded generator with a deterministic one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Allocates `capacity` slots and spawns every one of them. Calling again
    /// discards the previous pool. If the slots cannot be allocated the previous
    /// pool is kept and [`SimulationError::Allocation`] is returned.
    pub fn initialize(&mut self, capacity: usize) -> Result<()> {
        let mut particles = Vec::new();
        particles.try_reserve_exact(capacity).map_err(|source| {
            warn!(capacity, "cannot allocate particle pool: {source}");
            SimulationError::Allocation { capacity, source }
        })?;
        for index in 0..capacity {
            particles.push(fresh_particle(self.spawn.as_mut(), &mut self.rng, index));
        }
        self.particles = particles;
        debug!(capacity, expiry = ?self.expiry, "particle pool initialized");
        Ok(())
    }

    /// Respawns every slot without reallocating.
    pub fn reset(&mut self) {
        let Self {
            particles,
            spawn,
            rng,
            ..
        } = self;
        for (index, particle) in particles.iter_mut().enumerate() {
            *particle = fresh_particle(spawn.as_mut(), rng, index);
        }
    }

    /// Advances every live particle by `dt` seconds.
    ///
    /// `dt == 0` leaves the pool untouched. Negative or non-finite steps are
    /// ignored; callers are expected to clamp.
    pub fn update(&mut self, dt: f32) {
        if dt == 0.0 {
            return;
        }
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "ignoring invalid time step");
            return;
        }

        let Self {
            particles,
            spawn,
            integrate,
            expiry,
            rng,
        } = self;

        for (index, particle) in particles.iter_mut().enumerate() {
            if !particle.alive {
                continue;
            }
            integrate.integrate(particle, dt);
            particle.age += dt;

            let faulty = !particle.is_finite();
            if faulty {
                warn!(index, "particle state became non-finite; retiring slot");
            }
            if faulty || particle.expired() {
                match expiry {
                    ExpiryPolicy::Expire => particle.alive = false,
                    ExpiryPolicy::Respawn => *particle = fresh_particle(spawn.as_mut(), rng, index),
                }
            }
        }
    }

    /// Live particles in slot order. Each call starts a new traversal.
    pub fn alive(&self) -> impl Iterator<Item = ParticleView> + '_ {
        self.particles
            .iter()
            .filter(|particle| particle.alive)
            .map(Particle::view)
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|particle| particle.alive).count()
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn expiry(&self) -> ExpiryPolicy {
        self.expiry
    }
}

impl fmt::Debug for ParticleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("capacity", &self.capacity())
            .field("alive", &self.alive_count())
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

fn fresh_particle(spawn: &mut dyn SpawnRule, rng: &mut StdRng, index: usize) -> Particle {
    let mut particle = spawn.spawn(rng);
    particle.age = 0.0;
    particle.alive = true;
    if !particle.is_finite() || !particle.lifetime.is_finite() {
        warn!(index, "spawn rule produced a non-finite particle; slot left dead");
        particle.alive = false;
        return particle;
    }
    particle.lifetime = particle.lifetime.max(0.0);
    particle
}
