use crate::error::SphError;
use std::fmt;

/// Domain bounds governing parameter validity (spec §6).
pub const INITIAL_SPACING_MIN: f32 = 0.008;
pub const INITIAL_SPACING_MAX: f32 = 0.256;
pub const PARTICLE_MASS_MIN: f32 = 0.005;
pub const PARTICLE_MASS_MAX: f32 = 0.1;
pub const VISCOSITY_MIN: f32 = 1e-5;
pub const VISCOSITY_MAX: f32 = 10.0;
pub const SIMULATION_TIME_STEP: f32 = 0.05;
pub const NUM_THREADS_MIN: usize = 1;
pub const NUM_THREADS_MAX: usize = 8;

/// Gravity mode (spec §4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GravityMode {
    Off,
    Normal,
    Rot90,
    Wave,
}

impl GravityMode {
    /// Ports `next_gravity_mode` from the original `particle_system.h`.
    pub fn next(self) -> Self {
        match self {
            GravityMode::Off => GravityMode::Normal,
            GravityMode::Normal => GravityMode::Rot90,
            GravityMode::Rot90 => GravityMode::Wave,
            GravityMode::Wave => GravityMode::Off,
        }
    }
}

impl fmt::Display for GravityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GravityMode::Off => "GRAVITY OFF",
            GravityMode::Normal => "GRAVITY NORMAL (-Y)",
            GravityMode::Rot90 => "GRAVITY SWITCH BETWEEN X and Y",
            GravityMode::Wave => "GRAVITY WAVE",
        };
        f.write_str(s)
    }
}

/// Boundary collision method (spec §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionMethod {
    Reflexion,
    Force,
}

impl CollisionMethod {
    pub fn next(self) -> Self {
        match self {
            CollisionMethod::Reflexion => CollisionMethod::Force,
            CollisionMethod::Force => CollisionMethod::Reflexion,
        }
    }
}

impl fmt::Display for CollisionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollisionMethod::Reflexion => "REFLEXION",
            CollisionMethod::Force => "FORCE (SPRING-DAMPER)",
        };
        f.write_str(s)
    }
}

/// Neighbor-enumeration strategy (spec §4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputationMode {
    Brute,
    Grid,
}

impl ComputationMode {
    pub fn next(self) -> Self {
        match self {
            ComputationMode::Brute => ComputationMode::Grid,
            ComputationMode::Grid => ComputationMode::Brute,
        }
    }
}

impl fmt::Display for ComputationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComputationMode::Brute => "BRUTE FORCE",
            ComputationMode::Grid => "SPATIAL GRID",
        };
        f.write_str(s)
    }
}

/// External force direction along the cursor ray (spec §4.3/§4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExternalForceDirection {
    Repellent,
    Attractive,
}

/// Live-mutable simulation parameters (spec §3 `Config`).
///
/// Mutated by the UI thread between frames; the core snapshots this
/// by copy at the start of each pass (spec §5) rather than locking it
/// — tearing on individual scalars is benign for tuning knobs.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub particle_mass: f32,
    pub rest_density: f32,
    pub gas_constant: f32,
    pub viscosity: f32,
    pub gravity_mode: GravityMode,
    pub collision_method: CollisionMethod,
    /// Velocity damping factor in `[0, 1]` for the reflexion boundary.
    pub collision_damping: f32,
    /// Hookean spring stiffness for the force boundary.
    pub boundary_spring_k: f32,
    /// Viscous damper coefficient for the force boundary.
    pub boundary_damper_c: f32,
    /// Tolerance band (distance from wall) within which the force
    /// boundary's spring-damper term is active.
    pub boundary_tolerance: f32,
    pub external_force_direction: ExternalForceDirection,
    pub external_force_radius: f32,
    pub external_force_active: bool,
    pub num_threads: usize,
    pub computation_mode: ComputationMode,
    /// Initial particle spacing `d`; kernel radius `h` is always `4*d`.
    pub initial_spacing: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            particle_mass: 0.02,
            rest_density: 998.29,
            gas_constant: 0.1,
            viscosity: 0.00089,
            gravity_mode: GravityMode::Normal,
            collision_method: CollisionMethod::Reflexion,
            collision_damping: 0.25,
            boundary_spring_k: 10_000.0,
            boundary_damper_c: 50.0,
            boundary_tolerance: 0.05,
            external_force_direction: ExternalForceDirection::Repellent,
            external_force_radius: 0.5,
            external_force_active: false,
            num_threads: 8,
            computation_mode: ComputationMode::Grid,
            initial_spacing: 0.128,
        }
    }
}

impl Config {
    /// Kernel radius `h = 4 * d` (spec §6).
    pub fn kernel_radius(&self) -> f32 {
        self.initial_spacing * 4.0
    }

    pub fn next_gravity_mode(&mut self) {
        self.gravity_mode = self.gravity_mode.next();
    }

    pub fn next_collision_method(&mut self) {
        self.collision_method = self.collision_method.next();
    }

    pub fn next_computation_mode(&mut self) {
        self.computation_mode = self.computation_mode.next();
    }

    /// Validates every bound from spec §6. Invalid values are rejected
    /// with a diagnostic rather than silently clamped — out-of-domain
    /// parameters are a programming error to catch before the step,
    /// not a routine event (contrast with the boundary resolver, which
    /// *does* silently clamp escaped particle positions every step).
    pub fn validate(&self) -> Result<(), SphError> {
        check_range(
            "initial_spacing",
            self.initial_spacing,
            INITIAL_SPACING_MIN,
            INITIAL_SPACING_MAX,
        )?;
        check_range(
            "particle_mass",
            self.particle_mass,
            PARTICLE_MASS_MIN,
            PARTICLE_MASS_MAX,
        )?;
        check_range("viscosity", self.viscosity, VISCOSITY_MIN, VISCOSITY_MAX)?;
        if self.gas_constant <= 0.0 {
            return Err(SphError::ConfigInvalid {
                parameter: "gas_constant",
                reason: "must be > 0".to_string(),
            });
        }
        if !(NUM_THREADS_MIN..=NUM_THREADS_MAX).contains(&self.num_threads) {
            return Err(SphError::ConfigInvalid {
                parameter: "num_threads",
                reason: format!(
                    "must be in [{NUM_THREADS_MIN}, {NUM_THREADS_MAX}], got {}",
                    self.num_threads
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.collision_damping) {
            return Err(SphError::ConfigInvalid {
                parameter: "collision_damping",
                reason: "must be in [0, 1]".to_string(),
            });
        }
        if self.collision_method == CollisionMethod::Force
            && self.computation_mode == ComputationMode::Grid
        {
            return Err(SphError::ConfigInvalid {
                parameter: "collision_method",
                reason:
                    "force boundary method is not allowed with grid computation mode (spec §4.4: \
                     the force method permits transient excursion outside the grid volume)"
                        .to_string(),
            });
        }
        Ok(())
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), SphError> {
    if value < min || value > max {
        Err(SphError::ConfigInvalid {
            parameter: name,
            reason: format!("must be in [{min}, {max}], got {value}"),
        })
    } else {
        Ok(())
    }
}
