use thiserror::Error as ThisError;

/// Errors returned at the public API boundary.
///
/// Per-step arithmetic never raises one of these: NaNs, if they occur
/// inside a pass, propagate silently and are a debugging signal, not a
/// handled condition (see [`crate::particle_system`]).
#[derive(Debug, ThisError, Clone, PartialEq)]
pub enum SphError {
    /// A configuration parameter is outside its documented domain.
    #[error("invalid config parameter `{parameter}`: {reason}")]
    ConfigInvalid {
        parameter: &'static str,
        reason: String,
    },

    /// A scene descriptor violates an invariant (e.g. a fluid-source
    /// cuboid escapes the simulation space).
    #[error("invalid scene: {reason}")]
    SceneInvalid { reason: String },

    /// An operation that requires an initialized particle system was
    /// attempted before `generate_initial_particles`/`set_simulation_space`.
    #[error("particle system is not initialized")]
    NotInitialized,

    /// Requested particle count would exceed the configured limit.
    #[error("requested particle count {requested} exceeds limit {limit}")]
    ResourceExhausted { requested: usize, limit: usize },
}

pub type SphResult<T> = Result<T, SphError>;
