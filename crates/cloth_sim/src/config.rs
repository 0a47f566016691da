use std::{
    fs,
    path::{Path, PathBuf},
};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use soft_cloth::{ClothGrid, GridConfig, IntegrationMode, ParticleId, SimError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse cloth config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("pinned index {index} is outside a grid of {count} particles")]
    PinOutOfRange { index: usize, count: usize },
    #[error(transparent)]
    Simulation(#[from] SimError),
}

/// Which grid particles never accelerate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", content = "indices", rename_all = "snake_case")]
pub enum PinnedParticles {
    /// Row-major grid indices, `row * size + column`
    Indices(Vec<usize>),
    /// Every particle in column 0
    #[default]
    FirstColumn,
}

impl PinnedParticles {
    /// Resolves the policy to particle ids of `grid`.
    pub fn resolve(&self, grid: &ClothGrid) -> Result<Vec<ParticleId>, ConfigError> {
        match self {
            PinnedParticles::FirstColumn => Ok(grid.column(0).collect()),
            PinnedParticles::Indices(indices) => indices
                .iter()
                .map(|&index| {
                    grid.ids()
                        .get(index)
                        .copied()
                        .ok_or(ConfigError::PinOutOfRange {
                            index,
                            count: grid.ids().len(),
                        })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothConfig {
    pub grid: GridConfig,
    /// Constant acceleration applied to every particle
    pub gravity: Vec3,
    /// Quadratic air drag, disabled at 0
    pub drag_coefficient: f32,
    pub pinned: PinnedParticles,
    /// Seconds advanced by each running frame
    pub timestep: f32,
    pub mode: IntegrationMode,
    pub start_running: bool,
}

impl Default for ClothConfig {
    fn default() -> Self {
        ClothConfig {
            grid: GridConfig::default(),
            gravity: Vec3::new(0., -0.03, 0.),
            drag_coefficient: 0.,
            pinned: PinnedParticles::FirstColumn,
            timestep: 0.015,
            mode: IntegrationMode::Rk4,
            start_running: false,
        }
    }
}

impl ClothConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ClothConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks values the grid builder and integrators would reject later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.timestep.is_finite() {
            return Err(SimError::InvalidTimeStep(self.timestep).into());
        }
        let count = self.grid.particle_count()?;
        if let PinnedParticles::Indices(indices) = &self.pinned {
            if let Some(&index) = indices.iter().find(|&&index| index >= count) {
                return Err(ConfigError::PinOutOfRange { index, count });
            }
        }
        Ok(())
    }
}
