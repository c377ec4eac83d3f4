//! Sampling helpers for spawn regions and directions.

use glam::Vec3;
use rand::Rng;

/// Uniform value between `min` and `max`. Either order is accepted.
pub fn range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + (max - min) * rng.gen::<f32>()
}

pub fn range_vec3<R: Rng + ?Sized>(rng: &mut R, min: Vec3, max: Vec3) -> Vec3 {
    Vec3::new(
        range(rng, min.x, max.x),
        range(rng, min.y, max.y),
        range(rng, min.z, max.z),
    )
}

/// Point in the axis-aligned cube of side 1 centred on the origin.
pub fn unit_cube<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    range_vec3(rng, Vec3::splat(-0.5), Vec3::splat(0.5))
}

/// Point in the unit square on the XY plane (z = 0).
pub fn unit_square<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(range(rng, -0.5, 0.5), range(rng, -0.5, 0.5), 0.0)
}

/// Point strictly inside the unit sphere, by rejection sampling.
pub fn unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = range_vec3(rng, Vec3::splat(-1.0), Vec3::splat(1.0));
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Point strictly inside the unit disk on the XY plane.
pub fn unit_disk<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(range(rng, -1.0, 1.0), range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Point in the unit sphere flipped into the hemisphere around `normal`.
pub fn hemisphere<R: Rng + ?Sized>(rng: &mut R, normal: Vec3) -> Vec3 {
    let p = unit_sphere(rng);
    if p.dot(normal) > 0.0 {
        p
    } else {
        -p
    }
}

/// Random direction of length one.
pub fn unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = unit_sphere(rng);
        // Rejects near-zero samples that would normalize badly.
        if let Some(dir) = p.try_normalize() {
            return dir;
        }
    }
}
