use thiserror::Error;

use crate::particle::ParticleId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// The two endpoints of a spring sit on exactly the same point, so the
    /// spring axis is undefined.
    #[error("spring between {p1} and {p2} is degenerate, its endpoints coincide")]
    DegenerateSpring { p1: ParticleId, p2: ParticleId },
    /// A force or pin refers to a particle that is not part of the shape.
    #[error("particle {0} is not part of the particle collection")]
    UnresolvedParticleReference(ParticleId),
    #[error("unknown integration mode {0:?}, expected one of Euler, Midpoint, RK4")]
    UnknownIntegrationMode(String),
    #[error("spring rest length must be finite and positive, got {0}")]
    InvalidRestLength(f32),
    #[error("particle mass must be finite and positive, got {0}")]
    InvalidMass(f32),
    #[error("spring cannot connect particle {0} to itself")]
    SelfSpring(ParticleId),
    #[error("state vector holds {found} entries, expected {expected}")]
    StateLengthMismatch { expected: usize, found: usize },
    #[error("time step must be finite, got {0}")]
    InvalidTimeStep(f32),
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}
