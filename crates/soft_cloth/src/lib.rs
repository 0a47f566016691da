pub mod derivative;
pub mod error;
pub mod force;
pub mod grid;
pub mod integrator;
pub mod particle;
pub mod shape;
pub mod spring;
pub mod state;

pub use derivative::evaluate;
pub use error::SimError;
pub use force::{Drag, Force, UniformGravity};
pub use grid::{ClothGrid, GridConfig, SpringParams};
pub use integrator::{Euler, IntegrationMode, Integrator, Midpoint, RungeKutta4, StepBuffers};
pub use particle::{Particle, ParticleId};
pub use shape::Shape;
pub use spring::{Spring, SpringFamily};
pub use state::StateVector;
