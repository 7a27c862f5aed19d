//! Scene registry: named simulation-space + fluid-source descriptors
//! that the controller loads into a [`crate::particle_system::ParticleSystem`].
//!
//! Ported from `scene_handler.h`/`scene_information.h`; the obstacle
//! mesh file paths that class carried are dropped — rigid obstacles
//! are an explicit non-goal of this core.

use crate::cuboid::Cuboid;
use crate::error::{SphError, SphResult};

/// A named scene: a simulation-space box and the fluid-source cuboids
/// that populate it at load time (spec §3 `SceneDescriptor`).
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescriptor {
    pub name: String,
    pub simulation_space: Cuboid,
    pub fluid_sources: Vec<Cuboid>,
}

impl SceneDescriptor {
    /// Validates the containment invariant before returning: every
    /// fluid-source cuboid must be fully contained in `simulation_space`.
    pub fn new(
        name: impl Into<String>,
        simulation_space: Cuboid,
        fluid_sources: Vec<Cuboid>,
    ) -> SphResult<Self> {
        for source in &fluid_sources {
            if !simulation_space.contains_cuboid(source) {
                return Err(SphError::SceneInvalid {
                    reason: "fluid-source cuboid escapes simulation space".to_string(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            simulation_space,
            fluid_sources,
        })
    }
}

/// Registry of available scenes, mirroring `Scene_Handler`'s
/// `current_scene_id`/`next_scene_id` pair: the controller reads
/// `next_scene_id` on a reload request and swaps it into
/// `current_scene_id` once the load succeeds.
#[derive(Default)]
pub struct SceneRegistry {
    scenes: Vec<SceneDescriptor>,
    current_scene_id: Option<usize>,
    next_scene_id: Option<usize>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `scene`, returning its id.
    pub fn register(&mut self, scene: SceneDescriptor) -> usize {
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    /// Removes the scene with the given id. Any pointer to it held by
    /// `current_scene_id`/`next_scene_id` is cleared.
    pub fn unregister(&mut self, scene_id: usize) -> bool {
        if scene_id >= self.scenes.len() {
            return false;
        }
        self.scenes.remove(scene_id);
        if self.current_scene_id == Some(scene_id) {
            self.current_scene_id = None;
        }
        if self.next_scene_id == Some(scene_id) {
            self.next_scene_id = None;
        }
        true
    }

    pub fn unregister_all(&mut self) {
        self.scenes.clear();
        self.current_scene_id = None;
        self.next_scene_id = None;
    }

    pub fn get(&self, scene_id: usize) -> Option<&SceneDescriptor> {
        self.scenes.get(scene_id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Marks `scene_id` for loading on the controller's next SIM_INIT.
    pub fn request_scene(&mut self, scene_id: usize) -> bool {
        if scene_id >= self.scenes.len() {
            return false;
        }
        self.next_scene_id = Some(scene_id);
        true
    }

    pub fn next_scene_id(&self) -> Option<usize> {
        self.next_scene_id
    }

    pub fn current_scene_id(&self) -> Option<usize> {
        self.current_scene_id
    }

    /// Called by the controller once `next_scene_id` has been loaded
    /// successfully: promotes it to `current_scene_id`.
    pub fn activate_pending(&mut self) -> Option<&SceneDescriptor> {
        let id = self.next_scene_id.take()?;
        self.current_scene_id = Some(id);
        self.scenes.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> Cuboid {
        Cuboid::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0)
    }

    #[test]
    fn escaping_fluid_source_is_rejected_at_construction() {
        let escaping = Cuboid::new(-0.5, 1.5, -0.5, 0.5, -0.5, 0.5);
        let result = SceneDescriptor::new("dam break", space(), vec![escaping]);
        assert!(matches!(result, Err(SphError::SceneInvalid { .. })));
    }

    #[test]
    fn register_then_activate_round_trips() {
        let mut registry = SceneRegistry::new();
        let scene = SceneDescriptor::new("single cube", space(), vec![]).unwrap();
        let id = registry.register(scene);
        assert!(registry.request_scene(id));
        let activated = registry.activate_pending().unwrap();
        assert_eq!(activated.name, "single cube");
        assert_eq!(registry.current_scene_id(), Some(id));
        assert_eq!(registry.next_scene_id(), None);
    }

    #[test]
    fn unregister_clears_dangling_pointers() {
        let mut registry = SceneRegistry::new();
        let scene = SceneDescriptor::new("dam break", space(), vec![]).unwrap();
        let id = registry.register(scene);
        registry.request_scene(id);
        registry.activate_pending();
        assert!(registry.unregister(id));
        assert_eq!(registry.current_scene_id(), None);
    }

    #[test]
    fn request_unknown_scene_id_fails() {
        let mut registry = SceneRegistry::new();
        assert!(!registry.request_scene(42));
    }
}
