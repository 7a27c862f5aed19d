//! Application-level state machine, grounded in `application_handler.h`'s
//! `Application_State` enum and spec §4.7's transition table.
//!
//! The window/GL/input concerns that `Application_Handler` also drove
//! are external collaborators here; this controller only owns the
//! scene registry and the particle system it loads scenes into.

use crate::config::Config;
use crate::error::SphResult;
use crate::particle_system::ParticleSystem;
use crate::scene::SceneDescriptor;
use crate::scene::SceneRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    AppInit,
    AppTerm,
    SimInit,
    SimRun,
    SimTerm,
}

/// Drives the IDLE -> APP_INIT -> SIM_INIT <-> SIM_RUN -> SIM_TERM ->
/// APP_TERM state machine (spec §4.7), one `tick()` per frame.
pub struct SceneController {
    state: ControllerState,
    registry: SceneRegistry,
    particle_system: Option<ParticleSystem>,
    config: Config,
    reload_requested: bool,
}

impl SceneController {
    pub fn new(config: Config) -> Self {
        Self {
            state: ControllerState::Idle,
            registry: SceneRegistry::new(),
            particle_system: None,
            config,
            reload_requested: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SceneRegistry {
        &mut self.registry
    }

    pub fn particle_system(&self) -> Option<&ParticleSystem> {
        self.particle_system.as_ref()
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ControllerState::AppTerm
    }

    /// Requests a scene switch; takes effect on the next SIM_RUN ->
    /// SIM_TERM -> SIM_INIT cycle.
    pub fn request_scene_change(&mut self, scene_id: usize) -> bool {
        if !self.registry.request_scene(scene_id) {
            return false;
        }
        self.reload_requested = true;
        true
    }

    /// Advances the state machine by one frame. During `SimRun`, runs
    /// exactly one `ParticleSystem::simulate()`.
    pub fn tick(&mut self) -> SphResult<()> {
        match self.state {
            ControllerState::Idle => {
                self.state = ControllerState::AppInit;
            }
            ControllerState::AppInit => {
                log::info!("application initialized");
                self.state = ControllerState::SimInit;
            }
            ControllerState::SimInit => match self.load_pending_scene() {
                Ok(()) => self.state = ControllerState::SimRun,
                Err(e) => {
                    log::error!("scene load failed: {e}");
                    self.state = ControllerState::AppTerm;
                }
            },
            ControllerState::SimRun => {
                if let Some(ps) = self.particle_system.as_mut() {
                    if let Err(e) = ps.simulate() {
                        log::error!("simulate() failed: {e}");
                        self.state = ControllerState::AppTerm;
                        return Err(e);
                    }
                }
                if self.reload_requested {
                    self.reload_requested = false;
                    self.state = ControllerState::SimTerm;
                }
            }
            ControllerState::SimTerm => {
                self.state = ControllerState::SimInit;
            }
            ControllerState::AppTerm => {
                // terminal state: the event loop should stop calling tick()
            }
        }
        Ok(())
    }

    fn load_pending_scene(&mut self) -> SphResult<()> {
        if self.registry.next_scene_id().is_none() && self.registry.current_scene_id().is_none() {
            // no scene requested yet on first entry: nothing to load, stay idle in SIM_RUN
            return Ok(());
        }
        if self.registry.next_scene_id().is_none() {
            // re-entering SIM_INIT without a pending change: reload the current scene
            if let Some(id) = self.registry.current_scene_id() {
                self.registry.request_scene(id);
            }
        }

        let descriptor: SceneDescriptor = match self.registry.activate_pending() {
            Some(d) => d.clone(),
            None => return Ok(()),
        };

        let mut ps = ParticleSystem::new(self.config);
        ps.set_simulation_space(descriptor.simulation_space);
        ps.generate_initial_particles(&descriptor.fluid_sources)?;
        self.particle_system = Some(ps);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuboid::Cuboid;

    fn scene() -> SceneDescriptor {
        let space = Cuboid::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        let source = Cuboid::new(-0.3, 0.3, -0.3, 0.3, -0.3, 0.3);
        SceneDescriptor::new("single cube", space, vec![source]).unwrap()
    }

    #[test]
    fn boots_from_idle_through_sim_run() {
        let mut controller = SceneController::new(Config::default());
        let id = controller.registry_mut().register(scene());
        controller.request_scene_change(id);

        assert_eq!(controller.state(), ControllerState::Idle);
        controller.tick().unwrap(); // -> AppInit
        controller.tick().unwrap(); // -> SimInit
        controller.tick().unwrap(); // -> SimRun (loads scene)
        assert_eq!(controller.state(), ControllerState::SimRun);
        assert!(controller.particle_system().is_some());
    }

    #[test]
    fn scene_change_cycles_through_sim_term_and_reloads() {
        let mut controller = SceneController::new(Config::default());
        let id = controller.registry_mut().register(scene());
        controller.request_scene_change(id);
        for _ in 0..3 {
            controller.tick().unwrap();
        }
        assert_eq!(controller.state(), ControllerState::SimRun);

        let other_id = controller.registry_mut().register(scene());
        controller.request_scene_change(other_id);
        controller.tick().unwrap(); // SimRun sees reload_requested -> SimTerm
        assert_eq!(controller.state(), ControllerState::SimTerm);
        controller.tick().unwrap(); // -> SimInit
        controller.tick().unwrap(); // -> SimRun, reloaded
        assert_eq!(controller.state(), ControllerState::SimRun);
        assert_eq!(controller.registry().current_scene_id(), Some(other_id));
    }

    #[test]
    fn failed_scene_load_transitions_to_app_term() {
        let mut cfg = Config::default();
        cfg.initial_spacing = -1.0; // invalid, validate() will reject
        let mut controller = SceneController::new(cfg);
        let id = controller.registry_mut().register(scene());
        controller.request_scene_change(id);
        controller.tick().unwrap(); // AppInit
        controller.tick().unwrap(); // SimInit
        let _ = controller.tick(); // SimInit -> load fails -> AppTerm
        assert_eq!(controller.state(), ControllerState::AppTerm);
        assert!(controller.is_terminated());
    }
}
