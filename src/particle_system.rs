use crate::boundary::{force_boundary_acceleration, resolve_reflexion};
use crate::config::{CollisionMethod, ComputationMode, Config, GravityMode};
use crate::cuboid::Cuboid;
use crate::diagnostics::Diagnostics;
use crate::dispatch::Dispatcher;
use crate::error::{SphError, SphResult};
use crate::forces::external::ExternalForceField;
use crate::forces::gravity::gravity_vector;
use crate::grid::SpatialGrid;
use crate::kernel::KernelCoefficients;
use crate::particle::Particle;
use glam::Vec3;
use std::sync::Mutex;

/// Lifecycle state of a [`ParticleSystem`] (spec §4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Ready,
}

/// Owns the particle array, fluid parameters, spatial grid, and kernel
/// coefficients; runs the three-pass SPH step and applies the
/// boundary policy.
///
/// State machine: `Uninitialized -> Ready` after
/// `generate_initial_particles` + `set_simulation_space`; `Ready`
/// loops on `simulate()`; `set_simulation_space` or a particle-count
/// change drops back to `Uninitialized` (spec §4.3).
pub struct ParticleSystem {
    particles: Vec<Particle>,
    config: Config,
    simulation_space: Option<Cuboid>,
    grid: Option<SpatialGrid>,
    kernel: KernelCoefficients,
    dispatcher: Dispatcher,
    state: State,
    simulation_step: u32,
    paused: bool,
    external_force: ExternalForceField,
    max_particles: usize,
    /// Off by default — see [`ParticleSystem::enable_diagnostics`].
    diagnostics: Option<Diagnostics>,
}

impl ParticleSystem {
    pub fn new(config: Config) -> Self {
        let kernel = KernelCoefficients::new(config.kernel_radius());
        Self {
            particles: Vec::new(),
            dispatcher: Dispatcher::new(config.num_threads),
            config,
            simulation_space: None,
            grid: None,
            kernel,
            state: State::Uninitialized,
            simulation_step: 0,
            paused: false,
            external_force: ExternalForceField::default(),
            max_particles: 2_000_000,
            diagnostics: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Turns on per-pass timing, written via
    /// [`Diagnostics::write_csv`]. Zero overhead when left off.
    pub fn enable_diagnostics(&mut self) {
        self.diagnostics.get_or_insert_with(Diagnostics::new);
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    pub fn external_force_mut(&mut self) -> &mut ExternalForceField {
        &mut self.external_force
    }

    /// Read-only view onto the particle array, for the rendering
    /// collaborator (spec §6 observer handles).
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Read-only view onto the simulation space, for the rendering
    /// collaborator.
    pub fn simulation_space(&self) -> Option<&Cuboid> {
        self.simulation_space.as_ref()
    }

    /// Thousands-separated particle count, e.g. `"12,500"` (ports
    /// `to_string_with_separator` from the original `helper.cpp`).
    pub fn particle_count_display(&self) -> String {
        let digits = self.particles.len().to_string();
        let mut out = String::new();
        let len = digits.len();
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

    /// Populates the particle array from the given fluid-source
    /// cuboids, at the currently configured `initial_spacing`. Requires
    /// `set_simulation_space` to have been called with a space
    /// containing every cuboid.
    pub fn generate_initial_particles(&mut self, cuboids: &[Cuboid]) -> SphResult<()> {
        self.config.validate()?;

        let Some(space) = self.simulation_space else {
            return Err(SphError::NotInitialized);
        };

        for c in cuboids {
            if !space.contains_cuboid(c) {
                return Err(SphError::SceneInvalid {
                    reason: "fluid-source cuboid escapes simulation space".to_string(),
                });
            }
        }

        let mut particles = Vec::new();
        for c in cuboids {
            for pos in c.generate_points(self.config.initial_spacing) {
                particles.push(Particle::at_rest(pos));
            }
        }

        if particles.len() > self.max_particles {
            return Err(SphError::ResourceExhausted {
                requested: particles.len(),
                limit: self.max_particles,
            });
        }

        log::debug!("generated {} initial particles", particles.len());
        self.particles = particles;
        self.rebuild_grid();
        self.state = State::Ready;
        Ok(())
    }

    /// Fixes the grid domain. Drops the system back to `Uninitialized`
    /// per spec §4.3 — the caller must call
    /// `generate_initial_particles` again.
    pub fn set_simulation_space(&mut self, space: Cuboid) {
        self.simulation_space = Some(space);
        self.state = State::Uninitialized;
        self.grid = None;
    }

    fn rebuild_grid(&mut self) {
        if let Some(space) = &self.simulation_space {
            self.grid = Some(SpatialGrid::new(space, self.kernel.h()));
        }
    }

    /// Multiplicatively scales the initial spacing by `1/sqrt(2)`,
    /// increasing particle density ~2x per axis (8x total in 3D), if
    /// the result stays within bounds. Returns whether the change was
    /// applied (spec §6).
    pub fn increase_density(&mut self) -> bool {
        self.rescale_spacing(1.0 / std::f32::consts::SQRT_2)
    }

    /// Scales the initial spacing by `sqrt(2)`, decreasing density,
    /// if the result stays within bounds.
    pub fn decrease_density(&mut self) -> bool {
        self.rescale_spacing(std::f32::consts::SQRT_2)
    }

    fn rescale_spacing(&mut self, factor: f32) -> bool {
        let new_spacing = self.config.initial_spacing * factor;
        if new_spacing < crate::config::INITIAL_SPACING_MIN
            || new_spacing > crate::config::INITIAL_SPACING_MAX
        {
            return false;
        }
        self.config.initial_spacing = new_spacing;
        self.kernel.update(self.config.kernel_radius());
        true
    }

    pub fn set_gravity_mode(&mut self, mode: GravityMode) {
        self.config.gravity_mode = mode;
    }

    pub fn set_computation_mode(&mut self, mode: ComputationMode) {
        self.config.computation_mode = mode;
    }

    pub fn set_collision_method(&mut self, method: CollisionMethod) {
        self.config.collision_method = method;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advances one step regardless of the pause flag (spec §6
    /// `stepOnce`) — useful for single-stepping while paused.
    pub fn step_once(&mut self) -> SphResult<()> {
        self.simulate_inner()
    }

    /// Advances one step, unless paused. Pause is checked only at the
    /// start — never mid-step (spec §5's coarse, inter-pass-only
    /// cancellation).
    pub fn simulate(&mut self) -> SphResult<()> {
        if self.paused {
            return Ok(());
        }
        self.simulate_inner()
    }

    fn simulate_inner(&mut self) -> SphResult<()> {
        if self.state != State::Ready {
            return Err(SphError::NotInitialized);
        }
        self.config.validate()?;

        let config = self.config; // snapshot by copy (spec §5)
        if self.dispatcher.num_threads() != config.num_threads {
            self.dispatcher.set_num_threads(config.num_threads);
        }
        self.kernel.update(config.kernel_radius());
        self.external_force.sync_config(&config);

        let space = self
            .simulation_space
            .ok_or(SphError::NotInitialized)?;

        // Pulled out so a pass closure below can borrow `self` mutably
        // while `diag.measure` also borrows `self.diagnostics` mutably.
        let mut diagnostics = self.diagnostics.take();

        if config.computation_mode == ComputationMode::Grid {
            let grid = self.grid.get_or_insert_with(|| SpatialGrid::new(&space, self.kernel.h()));
            grid.rebuild(&self.particles, &self.dispatcher);
        }

        if let Some(diag) = diagnostics.as_mut() {
            diag.measure("pass_density_pressure", || self.pass_density_pressure(&config));
        } else {
            self.pass_density_pressure(&config);
        }

        // Pass 1 writes density/pressure into the live particle array only;
        // in grid mode the buckets still hold the copies taken before Pass 1
        // ran (spec §5's "Pass 1 happens-before Pass 2 across all particles"
        // would otherwise be violated — Pass 2's neighbor lookups would read
        // last-step density/pressure, zero on the first grid step). Rebuild
        // so Pass 2's bucket copies carry this step's values.
        if config.computation_mode == ComputationMode::Grid {
            self.grid.as_ref().unwrap().rebuild(&self.particles, &self.dispatcher);
        }

        if let Some(diag) = diagnostics.as_mut() {
            diag.measure("pass_acceleration", || self.pass_acceleration(&config, &space));
            diag.measure("pass_integration", || self.pass_integration(&config, &space));
        } else {
            self.pass_acceleration(&config, &space);
            self.pass_integration(&config, &space);
        }

        self.diagnostics = diagnostics;
        self.simulation_step = self.simulation_step.wrapping_add(1);
        Ok(())
    }

    /// Pass 1: density and pressure (spec §4.3).
    fn pass_density_pressure(&mut self, config: &Config) {
        let n = self.particles.len();
        let particles = &self.particles;
        let kernel = &self.kernel;
        let grid = &self.grid;
        let mode = config.computation_mode;
        let mass = config.particle_mass;
        let rest_density = config.rest_density;
        let gas_constant = config.gas_constant;

        let mut densities = vec![0.0f32; n];
        let densities_mutex = Mutex::new(&mut densities);

        self.dispatcher.parallel_for_range(n, |start, end_inclusive| {
            let mut local = Vec::with_capacity(end_inclusive + 1 - start);
            for i in start..=end_inclusive {
                let pi = particles[i].position;
                let mut rho = 0.0f32;
                let mut accumulate = |pj: &Particle| {
                    let r = pi - pj.position;
                    let r2 = r.length_squared();
                    if r2 < kernel.h2() {
                        rho += kernel.poly6(r2);
                    }
                };
                match mode {
                    ComputationMode::Grid => {
                        grid.as_ref().unwrap().for_each_neighbor(pi, accumulate);
                    }
                    ComputationMode::Brute => {
                        for pj in particles.iter() {
                            accumulate(pj);
                        }
                    }
                }
                local.push(mass * rho);
            }
            let mut guard = densities_mutex.lock().unwrap();
            for (offset, rho) in local.into_iter().enumerate() {
                guard[start + offset] = rho;
            }
        });

        for (i, p) in self.particles.iter_mut().enumerate() {
            p.density = densities[i];
            p.pressure = gas_constant * (p.density - rest_density);
        }
    }

    /// Pass 2: acceleration (spec §4.3).
    fn pass_acceleration(&mut self, config: &Config, space: &Cuboid) {
        let n = self.particles.len();
        let particles = &self.particles;
        let kernel = &self.kernel;
        let grid = &self.grid;
        let mode = config.computation_mode;
        let mass = config.particle_mass;
        let external_force = self.external_force;

        let mut accelerations = vec![Vec3::ZERO; n];
        let acc_mutex = Mutex::new(&mut accelerations);

        self.dispatcher.parallel_for_range(n, |start, end_inclusive| {
            let mut local = Vec::with_capacity(end_inclusive + 1 - start);
            for i in start..=end_inclusive {
                let pi = particles[i];
                let mut f_pressure = Vec3::ZERO;
                let mut f_viscosity = Vec3::ZERO;

                let mut accumulate = |pj: &Particle| {
                    let r = pi.position - pj.position;
                    let r2 = r.length_squared();
                    if r2 >= kernel.h2() {
                        return;
                    }
                    let r_len = r2.sqrt();
                    if r_len <= 1e-8 {
                        return; // excludes self (j == i)
                    }
                    let rho_j = pj.density.max(1e-8);
                    f_pressure -=
                        ((pi.pressure + pj.pressure) / (2.0 * rho_j)) * kernel.spiky_gradient(r, r_len);
                    f_viscosity += ((pj.velocity - pi.velocity) / rho_j)
                        * kernel.viscosity_laplacian(r_len);
                };

                match mode {
                    ComputationMode::Grid => {
                        grid.as_ref().unwrap().for_each_neighbor(pi.position, accumulate);
                    }
                    ComputationMode::Brute => {
                        for pj in particles.iter() {
                            accumulate(pj);
                        }
                    }
                }

                f_pressure *= mass;
                f_viscosity *= mass * config.viscosity;

                let mut f_external = gravity_vector(config.gravity_mode, self.simulation_step, 9.8);
                if config.collision_method == CollisionMethod::Force {
                    f_external += force_boundary_acceleration(
                        pi.position,
                        pi.velocity,
                        space,
                        config.boundary_tolerance,
                        config.boundary_spring_k,
                        config.boundary_damper_c,
                    );
                }
                f_external += external_force.force_at(pi.position);

                let rho_i = pi.density.max(1e-8);
                local.push((f_pressure + f_viscosity + f_external) / rho_i);
            }
            let mut guard = acc_mutex.lock().unwrap();
            for (offset, a) in local.into_iter().enumerate() {
                guard[start + offset] = a;
            }
        });

        for (i, p) in self.particles.iter_mut().enumerate() {
            p.acceleration = accelerations[i];
        }
    }

    /// Pass 3: symplectic Verlet-style integration + boundary response
    /// (spec §4.3).
    fn pass_integration(&mut self, config: &Config, space: &Cuboid) {
        let dt = crate::config::SIMULATION_TIME_STEP;
        let n = self.particles.len();
        let particles = &self.particles;

        let mut updated = vec![Particle::at_rest(Vec3::ZERO); n];
        let updated_mutex = Mutex::new(&mut updated);

        self.dispatcher.parallel_for_range(n, |start, end_inclusive| {
            let mut local = Vec::with_capacity(end_inclusive + 1 - start);
            for i in start..=end_inclusive {
                let mut p = particles[i];
                let new_pos = p.position + p.velocity * dt + p.acceleration * dt * dt;
                p.velocity = (new_pos - p.position) / dt;
                p.position = new_pos;

                if config.collision_method == CollisionMethod::Reflexion {
                    resolve_reflexion(&mut p, space, config.collision_damping);
                }
                local.push(p);
            }
            let mut guard = updated_mutex.lock().unwrap();
            for (offset, p) in local.into_iter().enumerate() {
                guard[start + offset] = p;
            }
        });

        self.particles = updated;
    }
}
