use bevy::ecs::resource::Resource;
use glam::Vec3;
use log::{info, warn};
use soft_cloth::{ClothGrid, Force, IntegrationMode, Integrator, Shape, SimError, StepBuffers};

use crate::config::{ClothConfig, ConfigError};

/// A cloth grid together with the integrator settings driving it.
///
/// One [`ClothSimulation::tick`] per frame. While paused the tick still
/// integrates, with a time step of zero.
#[derive(Resource)]
pub struct ClothSimulation {
    grid: ClothGrid,
    mode: IntegrationMode,
    timestep: f32,
    running: bool,
    buffers: StepBuffers,
    /// Steps taken while running since the last reset
    steps: u64,
    /// Simulated seconds since the last reset
    elapsed: f32,
    /// Error of the latest failed tick, cleared by the next successful one
    last_error: Option<SimError>,
}

impl ClothSimulation {
    pub fn from_config(config: &ClothConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut grid = ClothGrid::new(config.grid)?;
        let pinned = config.pinned.resolve(&grid)?;

        let n = grid.size();
        let shape = grid.shape_mut();
        shape.add_force(Force::gravity(config.gravity));
        if config.drag_coefficient != 0. {
            shape.add_force(Force::drag(config.drag_coefficient));
        }
        for id in pinned {
            shape.pin(id)?;
        }

        info!(
            "Cloth simulation ready: {n}x{n} particles, {} springs, {} pinned, {} mode",
            shape.springs().count(),
            shape.pinned().count(),
            config.mode
        );

        Ok(ClothSimulation {
            grid,
            mode: config.mode,
            timestep: config.timestep,
            running: config.start_running,
            buffers: StepBuffers::default(),
            steps: 0,
            elapsed: 0.,
            last_error: None,
        })
    }

    /// Advances one frame. Nothing is committed when the step fails.
    ///
    /// A failure is logged once; ticks failing with the same error again are
    /// not logged until a tick succeeds or the error changes.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let dt = if self.running { self.timestep } else { 0. };
        match self
            .mode
            .step_with(self.grid.shape_mut(), dt, &mut self.buffers)
        {
            Ok(()) => {
                self.last_error = None;
                if self.running {
                    self.steps += 1;
                    self.elapsed += dt;
                }
                Ok(())
            }
            Err(err) => {
                if self.record_failure(&err) {
                    warn!("{} step of {dt}s failed: {err}", self.mode);
                }
                Err(err)
            }
        }
    }

    /// Remembers `err`, returning whether it differs from the previous failure.
    fn record_failure(&mut self, err: &SimError) -> bool {
        if self.last_error.as_ref() == Some(err) {
            return false;
        }
        self.last_error = Some(err.clone());
        true
    }

    pub fn last_error(&self) -> Option<&SimError> {
        self.last_error.as_ref()
    }

    pub fn mode(&self) -> IntegrationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: IntegrationMode) {
        if mode != self.mode {
            info!("Integration mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Selects a mode by name. An unknown name leaves the current mode in place.
    pub fn set_mode_str(&mut self, name: &str) -> Result<IntegrationMode, SimError> {
        match name.parse() {
            Ok(mode) => {
                self.set_mode(mode);
                Ok(mode)
            }
            Err(err) => {
                warn!("{err}, keeping {}", self.mode);
                Err(err)
            }
        }
    }

    pub fn cycle_mode(&mut self) -> IntegrationMode {
        self.set_mode(self.mode.next());
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns every particle to its construction position and clears the counters.
    pub fn reset(&mut self) {
        self.grid.shape_mut().reset();
        self.steps = 0;
        self.elapsed = 0.;
        info!("Cloth reset");
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.grid.shape().positions()
    }

    pub fn grid(&self) -> &ClothGrid {
        &self.grid
    }

    pub fn shape(&self) -> &Shape {
        self.grid.shape()
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.shape().kinetic_energy()
    }

    pub fn spring_potential_energy(&self) -> f32 {
        self.shape().spring_potential_energy()
    }

    /// Kinetic plus spring energy. Gravity and drag are not included.
    pub fn total_energy(&self) -> f32 {
        self.kinetic_energy() + self.spring_potential_energy()
    }
}
