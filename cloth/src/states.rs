use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum SimulationState {
    #[default]
    Paused,
    Running,
}

impl SimulationState {
    pub fn from_running(running: bool) -> Self {
        if running {
            SimulationState::Running
        } else {
            SimulationState::Paused
        }
    }
}

impl std::fmt::Display for SimulationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationState::Paused => write!(f, "Paused"),
            SimulationState::Running => write!(f, "Running"),
        }
    }
}
