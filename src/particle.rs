use glam::Vec3;

/// A single SPH fluid particle.
///
/// Created at scene load from cuboid volumes (see [`crate::cuboid`]),
/// mutated only inside [`crate::particle_system::ParticleSystem::simulate`],
/// destroyed when the scene reloads or the particle count changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub density: f32,
    pub pressure: f32,
}

impl Particle {
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            density: 0.0,
            pressure: 0.0,
        }
    }
}
