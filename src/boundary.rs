use crate::cuboid::Cuboid;
use crate::particle::Particle;
use glam::Vec3;

/// Post-integration reflexion boundary response (spec §4.4).
///
/// For each axis, if the particle has escaped the simulation space,
/// snap the position to the wall and negate the corresponding velocity
/// component scaled by `damping` (`d in [0, 1]`).
pub fn resolve_reflexion(particle: &mut Particle, space: &Cuboid, damping: f32) {
    let p = &mut particle.position;
    let v = &mut particle.velocity;

    if p.x < space.x_min {
        p.x = space.x_min;
        v.x = -v.x * damping;
    } else if p.x > space.x_max {
        p.x = space.x_max;
        v.x = -v.x * damping;
    }

    if p.y < space.y_min {
        p.y = space.y_min;
        v.y = -v.y * damping;
    } else if p.y > space.y_max {
        p.y = space.y_max;
        v.y = -v.y * damping;
    }

    if p.z < space.z_min {
        p.z = space.z_min;
        v.z = -v.z * damping;
    } else if p.z > space.z_max {
        p.z = space.z_max;
        v.z = -v.z * damping;
    }
}

/// Continuous spring-damper boundary force, applied during Pass 2
/// (acceleration), within a tolerance band `tau` of each wall (spec
/// §4.4). Not used with grid computation mode — see
/// [`crate::config::Config::validate`].
pub fn force_boundary_acceleration(
    pos: Vec3,
    vel: Vec3,
    space: &Cuboid,
    tolerance: f32,
    spring_k: f32,
    damper_c: f32,
) -> Vec3 {
    let mut force = Vec3::ZERO;

    // min-wall along axis: penetration = tolerance - (pos - wall)
    let mut wall_axis = |pos_axis: f32, vel_axis: f32, wall_min: f32, wall_max: f32| -> f32 {
        let dist_to_min = pos_axis - wall_min;
        if dist_to_min < tolerance {
            let penetration = tolerance - dist_to_min;
            return spring_k * penetration - damper_c * vel_axis;
        }
        let dist_to_max = wall_max - pos_axis;
        if dist_to_max < tolerance {
            let penetration = tolerance - dist_to_max;
            return -(spring_k * penetration) - damper_c * vel_axis;
        }
        0.0
    };

    force.x = wall_axis(pos.x, vel.x, space.x_min, space.x_max);
    force.y = wall_axis(pos.y, vel.y, space.y_min, space.y_max);
    force.z = wall_axis(pos.z, vel.z, space.z_min, space.z_max);

    force
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> Cuboid {
        Cuboid::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0)
    }

    #[test]
    fn reflexion_snaps_escaped_position_to_wall() {
        let mut p = Particle::at_rest(Vec3::new(1.5, 0.0, 0.0));
        p.velocity = Vec3::new(2.0, 0.0, 0.0);
        resolve_reflexion(&mut p, &space(), 0.5);
        assert_eq!(p.position.x, 1.0);
        assert_eq!(p.velocity.x, -1.0);
    }

    #[test]
    fn reflexion_leaves_in_bounds_particle_untouched() {
        let mut p = Particle::at_rest(Vec3::new(0.0, 0.0, 0.0));
        p.velocity = Vec3::new(1.0, 2.0, 3.0);
        resolve_reflexion(&mut p, &space(), 0.5);
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.velocity, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn force_boundary_pushes_away_from_min_wall() {
        let pos = Vec3::new(-0.99, 0.0, 0.0); // inside tolerance of x_min = -1.0
        let force = force_boundary_acceleration(pos, Vec3::ZERO, &space(), 0.05, 1000.0, 10.0);
        assert!(force.x > 0.0, "force should push away from min wall, got {force:?}");
    }

    #[test]
    fn force_boundary_pushes_away_from_max_wall() {
        let pos = Vec3::new(0.99, 0.0, 0.0); // inside tolerance of x_max = 1.0
        let force = force_boundary_acceleration(pos, Vec3::ZERO, &space(), 0.05, 1000.0, 10.0);
        assert!(force.x < 0.0, "force should push away from max wall, got {force:?}");
    }

    #[test]
    fn force_boundary_zero_outside_tolerance_band() {
        let pos = Vec3::ZERO;
        let force = force_boundary_acceleration(pos, Vec3::ZERO, &space(), 0.05, 1000.0, 10.0);
        assert_eq!(force, Vec3::ZERO);
    }
}
