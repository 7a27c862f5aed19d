use crate::config::{Config, ExternalForceDirection};
use glam::Vec3;

/// Falloff softening so the force never divides by exactly zero at the
/// ray itself (spec §9 leaves the original falloff undocumented; this
/// crate decides on the literal `1/(distance+eps)` spec §4.3 states).
const FALLOFF_EPSILON: f32 = 1e-4;

/// Parameters describing the user-driven cursor ray (spec §4.3/§4.5):
/// an infinite ray from `origin` along `direction`, within `radius` of
/// which particles receive an attract/repel force.
#[derive(Clone, Copy, Debug)]
pub struct ExternalForceField {
    pub active: bool,
    pub origin: Vec3,
    pub direction: Vec3,
    pub radius: f32,
    pub strength: f32,
    pub force_direction: ExternalForceDirection,
}

impl Default for ExternalForceField {
    fn default() -> Self {
        Self {
            active: false,
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            radius: 0.5,
            strength: 1.0,
            force_direction: ExternalForceDirection::Repellent,
        }
    }
}

impl ExternalForceField {
    /// Pulls `active`/`radius`/`force_direction` from `Config` (spec §3:
    /// "external-force direction {repellent, attractive} and radius"
    /// are UI-mutated `Config` knobs). `origin`/`direction`/`strength`
    /// are left untouched — those come from the cursor ray, an external
    /// collaborator input with no `Config` representation.
    pub fn sync_config(&mut self, config: &Config) {
        self.active = config.external_force_active;
        self.radius = config.external_force_radius;
        self.force_direction = config.external_force_direction;
    }

    /// Force contribution for a particle at `pos`, or zero if the
    /// field is inactive or `pos` is farther than `radius` from the
    /// ray.
    ///
    /// Computes the perpendicular offset `delta` from `pos` to its
    /// closest point on the ray, then adds a force along
    /// `direction x delta` scaled by `1/(distance+eps)`, signed by
    /// attractive/repellent.
    pub fn force_at(&self, pos: Vec3) -> Vec3 {
        if !self.active {
            return Vec3::ZERO;
        }

        let dir = self.direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Vec3::ZERO;
        }

        let to_particle = pos - self.origin;
        let along = to_particle.dot(dir);
        let closest_on_ray = self.origin + dir * along;
        let delta = pos - closest_on_ray;
        let distance = delta.length();

        if distance > self.radius {
            return Vec3::ZERO;
        }

        let sign = match self.force_direction {
            ExternalForceDirection::Attractive => -1.0,
            ExternalForceDirection::Repellent => 1.0,
        };

        let falloff = 1.0 / (distance + FALLOFF_EPSILON);
        dir.cross(delta) * (sign * self.strength * falloff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_field_contributes_nothing() {
        let field = ExternalForceField::default();
        assert_eq!(field.force_at(Vec3::new(1.0, 0.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn beyond_radius_contributes_nothing() {
        let field = ExternalForceField {
            active: true,
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            radius: 0.5,
            strength: 1.0,
            force_direction: ExternalForceDirection::Repellent,
        };
        assert_eq!(field.force_at(Vec3::new(10.0, 0.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn within_radius_contributes_nonzero_force() {
        let field = ExternalForceField {
            active: true,
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            radius: 0.5,
            strength: 1.0,
            force_direction: ExternalForceDirection::Repellent,
        };
        let force = field.force_at(Vec3::new(0.1, 0.0, 0.0));
        assert!(force.length() > 0.0);
    }

    #[test]
    fn attractive_and_repellent_point_opposite_ways() {
        let mut field = ExternalForceField {
            active: true,
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            radius: 0.5,
            strength: 1.0,
            force_direction: ExternalForceDirection::Repellent,
        };
        let pos = Vec3::new(0.1, 0.0, 0.0);
        let repel = field.force_at(pos);
        field.force_direction = ExternalForceDirection::Attractive;
        let attract = field.force_at(pos);
        assert!((repel + attract).length() < 1e-5);
    }

    #[test]
    fn zero_direction_is_inert() {
        let field = ExternalForceField {
            active: true,
            direction: Vec3::ZERO,
            ..ExternalForceField::default()
        };
        assert_eq!(field.force_at(Vec3::new(0.1, 0.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn sync_config_pulls_active_radius_and_direction_leaves_ray_alone() {
        let mut field = ExternalForceField {
            origin: Vec3::new(1.0, 2.0, 3.0),
            direction: Vec3::X,
            strength: 7.0,
            ..ExternalForceField::default()
        };
        let mut config = Config::default();
        config.external_force_active = true;
        config.external_force_radius = 0.75;
        config.external_force_direction = ExternalForceDirection::Attractive;

        field.sync_config(&config);

        assert!(field.active);
        assert_eq!(field.radius, 0.75);
        assert_eq!(field.force_direction, ExternalForceDirection::Attractive);
        // cursor-ray geometry has no Config representation, untouched
        assert_eq!(field.origin, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(field.direction, Vec3::X);
        assert_eq!(field.strength, 7.0);
    }
}
