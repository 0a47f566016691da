pub mod config;
pub mod simulation;

pub use config::{ClothConfig, ConfigError, PinnedParticles};
pub use simulation::ClothSimulation;
pub use soft_cloth;
