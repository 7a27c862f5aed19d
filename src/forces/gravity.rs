use crate::config::GravityMode;
use glam::Vec3;
use std::f32::consts::PI;

/// Number of simulation steps between axis switches in [`GravityMode::Rot90`].
pub const ROT90_SWITCH_PERIOD_STEPS: u32 = 50;

/// Angular step per simulation step for [`GravityMode::Wave`], in radians.
pub const WAVE_ANGLE_STEP: f32 = PI / 180.0;

/// Returns the gravity acceleration vector for `mode` at `simulation_step`
/// (spec §4.3).
///
/// - `Off` → zero.
/// - `Normal` → `(0, -g, 0)`.
/// - `Rot90` → switches between `(0, -g, 0)` and `(-g, 0, 0)` every
///   [`ROT90_SWITCH_PERIOD_STEPS`] steps.
/// - `Wave` → `(sin(theta)*g, -|cos(theta)|*g, 0)` with `theta` stepping
///   by [`WAVE_ANGLE_STEP`] per simulation step.
pub fn gravity_vector(mode: GravityMode, simulation_step: u32, g: f32) -> Vec3 {
    match mode {
        GravityMode::Off => Vec3::ZERO,
        GravityMode::Normal => Vec3::new(0.0, -g, 0.0),
        GravityMode::Rot90 => {
            let period = (simulation_step / ROT90_SWITCH_PERIOD_STEPS) % 2;
            if period == 0 {
                Vec3::new(0.0, -g, 0.0)
            } else {
                Vec3::new(-g, 0.0, 0.0)
            }
        }
        GravityMode::Wave => {
            let theta = simulation_step as f32 * WAVE_ANGLE_STEP;
            Vec3::new(theta.sin() * g, -theta.cos().abs() * g, 0.0)
        }
    }
}
