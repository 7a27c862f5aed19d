//! Compute core for an interactive 3D SPH fluid simulator.
//!
//! Owns particle state, the spatial acceleration grid, the three-pass
//! SPH step, boundary response, and a parallel Marching Cubes density
//! estimator. Rendering (GPU buffers, shaders, camera) and the
//! windowing/input layer are external collaborators that consume the
//! read-only snapshots this crate exposes — see
//! [`particle_system::ParticleSystem`] and
//! [`marching_cubes::MarchingCubesGenerator`].

pub mod boundary;
pub mod config;
pub mod controller;
pub mod cuboid;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod forces;
pub mod grid;
pub mod kernel;
pub mod marching_cubes;
pub mod particle;
pub mod particle_system;
pub mod scene;

pub use config::Config;
pub use controller::SceneController;
pub use cuboid::Cuboid;
pub use error::{SphError, SphResult};
pub use marching_cubes::MarchingCubesGenerator;
pub use particle::Particle;
pub use particle_system::ParticleSystem;
pub use scene::{SceneDescriptor, SceneRegistry};
