//! Explicit integrators advancing a [`Shape`] by one time step.
//!
//! Every integrator works on the flat [`StateVector`] of the shape and only
//! writes the particles once, after all derivative evaluations succeeded. If
//! any evaluation fails the particles are left exactly as they were.
//!
//! ```text
//! Euler:    x1 = x0 + dt*f(x0)
//! Midpoint: x1 = x0 + dt*f(x0 + dt/2*f(x0))
//! RK4:      k1 = dt*f(x0)
//!           k2 = dt*f(x0 + k1/2)
//!           k3 = dt*f(x0 + k2/2)
//!           k4 = dt*f(x0 + k3)
//!           x1 = x0 + k1/6 + k2/3 + k3/3 + k4/6
//! ```
//!
//! A `dt` of zero is valid and leaves the state unchanged.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{derivative::evaluate, error::SimError, shape::Shape, state::StateVector};

/// Scratch vectors reused between steps.
///
/// Sized from the particle count on every step, so one set of buffers can be
/// shared by shapes of different sizes.
#[derive(Debug, Clone, Default)]
pub struct StepBuffers {
    initial: StateVector,
    trial: StateVector,
    derivative: StateVector,
    accumulated: StateVector,
}

pub trait Integrator {
    /// Advances `shape` by `dt`, using `buffers` as scratch space.
    fn step_with(
        &self,
        shape: &mut Shape,
        dt: f32,
        buffers: &mut StepBuffers,
    ) -> Result<(), SimError>;

    /// Advances `shape` by `dt` with freshly allocated scratch space.
    fn step(&self, shape: &mut Shape, dt: f32) -> Result<(), SimError> {
        self.step_with(shape, dt, &mut StepBuffers::default())
    }
}

fn check_timestep(dt: f32) -> Result<(), SimError> {
    if dt.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidTimeStep(dt))
    }
}

/// Forward Euler, one derivative evaluation per step.
pub struct Euler;

impl Integrator for Euler {
    fn step_with(
        &self,
        shape: &mut Shape,
        dt: f32,
        buffers: &mut StepBuffers,
    ) -> Result<(), SimError> {
        check_timestep(dt)?;
        let StepBuffers {
            initial,
            derivative,
            ..
        } = buffers;

        initial.gather_from(shape);
        evaluate(shape, initial, derivative)?;
        initial.add_scaled(derivative, dt);
        initial.scatter(shape)
    }
}

/// Midpoint method (RK2), two derivative evaluations per step.
pub struct Midpoint;

impl Integrator for Midpoint {
    fn step_with(
        &self,
        shape: &mut Shape,
        dt: f32,
        buffers: &mut StepBuffers,
    ) -> Result<(), SimError> {
        check_timestep(dt)?;
        let StepBuffers {
            initial,
            trial,
            derivative,
            ..
        } = buffers;

        initial.gather_from(shape);
        evaluate(shape, initial, derivative)?;
        trial.assign_scaled_sum(initial, derivative, dt / 2.);
        evaluate(shape, trial, derivative)?;
        initial.add_scaled(derivative, dt);
        initial.scatter(shape)
    }
}

/// Classical fourth order Runge-Kutta, four derivative evaluations per step.
pub struct RungeKutta4;

impl Integrator for RungeKutta4 {
    fn step_with(
        &self,
        shape: &mut Shape,
        dt: f32,
        buffers: &mut StepBuffers,
    ) -> Result<(), SimError> {
        check_timestep(dt)?;
        let StepBuffers {
            initial,
            trial,
            derivative,
            accumulated,
        } = buffers;

        initial.gather_from(shape);
        accumulated.copy_from(initial);

        // k1
        evaluate(shape, initial, derivative)?;
        accumulated.add_scaled(derivative, dt / 6.);
        trial.assign_scaled_sum(initial, derivative, dt / 2.);

        // k2
        evaluate(shape, trial, derivative)?;
        accumulated.add_scaled(derivative, dt / 3.);
        trial.assign_scaled_sum(initial, derivative, dt / 2.);

        // k3
        evaluate(shape, trial, derivative)?;
        accumulated.add_scaled(derivative, dt / 3.);
        trial.assign_scaled_sum(initial, derivative, dt);

        // k4
        evaluate(shape, trial, derivative)?;
        accumulated.add_scaled(derivative, dt / 6.);

        accumulated.scatter(shape)
    }
}

/// Serialized as `Euler`, `Midpoint` or `RK4`; read back through [`FromStr`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum IntegrationMode {
    Euler,
    Midpoint,
    #[default]
    #[serde(rename = "RK4")]
    Rk4,
}

impl IntegrationMode {
    pub const ALL: [IntegrationMode; 3] = [
        IntegrationMode::Euler,
        IntegrationMode::Midpoint,
        IntegrationMode::Rk4,
    ];

    /// The next mode in `Euler -> Midpoint -> RK4 -> Euler` order.
    pub fn next(self) -> Self {
        match self {
            IntegrationMode::Euler => IntegrationMode::Midpoint,
            IntegrationMode::Midpoint => IntegrationMode::Rk4,
            IntegrationMode::Rk4 => IntegrationMode::Euler,
        }
    }
}

impl Integrator for IntegrationMode {
    fn step_with(
        &self,
        shape: &mut Shape,
        dt: f32,
        buffers: &mut StepBuffers,
    ) -> Result<(), SimError> {
        match self {
            IntegrationMode::Euler => Euler.step_with(shape, dt, buffers),
            IntegrationMode::Midpoint => Midpoint.step_with(shape, dt, buffers),
            IntegrationMode::Rk4 => RungeKutta4.step_with(shape, dt, buffers),
        }
    }
}

impl FromStr for IntegrationMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euler" => Ok(IntegrationMode::Euler),
            "midpoint" | "rk2" => Ok(IntegrationMode::Midpoint),
            "rk4" => Ok(IntegrationMode::Rk4),
            _ => Err(SimError::UnknownIntegrationMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for IntegrationMode {
    type Error = SimError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl fmt::Display for IntegrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationMode::Euler => write!(f, "Euler"),
            IntegrationMode::Midpoint => write!(f, "Midpoint"),
            IntegrationMode::Rk4 => write!(f, "RK4"),
        }
    }
}
