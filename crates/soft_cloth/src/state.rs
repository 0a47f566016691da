//! Flat state of a [`Shape`]: `[pos0, vel0, pos1, vel1, ...]`.
//!
//! The same layout holds derivatives, `[vel0, acc0, vel1, acc1, ...]`.
//! Integrators only ever combine these vectors element by element.

use glam::Vec3;
use rayon::prelude::*;

use crate::{error::SimError, shape::Shape};

/// Below this many entries element-wise loops are not split across threads.
const MIN_PARALLEL_CHUNK: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateVector(Vec<Vec3>);

impl StateVector {
    /// A zeroed state for `particles` particles.
    pub fn zeroed(particles: usize) -> Self {
        StateVector(vec![Vec3::ZERO; 2 * particles])
    }

    pub fn gather(shape: &Shape) -> Self {
        let mut state = StateVector::default();
        state.gather_from(shape);
        state
    }

    /// Overwrites this vector with the positions and velocities of `shape`,
    /// reusing the allocation.
    pub fn gather_from(&mut self, shape: &Shape) {
        self.0.clear();
        self.0.reserve(2 * shape.len());
        for particle in shape.particles() {
            self.0.push(particle.position);
            self.0.push(particle.velocity);
        }
    }

    /// Writes positions and velocities back into the particles of `shape`.
    pub fn scatter(&self, shape: &mut Shape) -> Result<(), SimError> {
        self.check_len(shape.len())?;
        for (particle, pair) in shape.particles_mut().iter_mut().zip(self.0.chunks_exact(2)) {
            particle.position = pair[0];
            particle.velocity = pair[1];
        }
        Ok(())
    }

    pub fn check_len(&self, particles: usize) -> Result<(), SimError> {
        if self.0.len() == 2 * particles {
            Ok(())
        } else {
            Err(SimError::StateLengthMismatch {
                expected: 2 * particles,
                found: self.0.len(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.0.len() / 2
    }

    pub fn position(&self, slot: usize) -> Vec3 {
        self.0[2 * slot]
    }

    pub fn velocity(&self, slot: usize) -> Vec3 {
        self.0[2 * slot + 1]
    }

    /// Acceleration of `slot` when this vector holds a derivative.
    pub fn acceleration(&self, slot: usize) -> Vec3 {
        self.0[2 * slot + 1]
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.0
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Vec3] {
        &mut self.0
    }

    pub fn resize(&mut self, particles: usize) {
        self.0.resize(2 * particles, Vec3::ZERO);
    }

    pub fn copy_from(&mut self, other: &StateVector) {
        self.0.clone_from(&other.0);
    }

    /// `self += scale * other`
    pub fn add_scaled(&mut self, other: &StateVector, scale: f32) {
        debug_assert_eq!(self.0.len(), other.0.len());
        self.0
            .par_iter_mut()
            .with_min_len(MIN_PARALLEL_CHUNK)
            .zip(other.0.par_iter())
            .for_each(|(x, d)| *x += scale * *d);
    }

    /// `self = base + scale * derivative`
    pub fn assign_scaled_sum(&mut self, base: &StateVector, derivative: &StateVector, scale: f32) {
        debug_assert_eq!(base.0.len(), derivative.0.len());
        self.0.resize(base.0.len(), Vec3::ZERO);
        self.0
            .par_iter_mut()
            .with_min_len(MIN_PARALLEL_CHUNK)
            .zip(base.0.par_iter().zip(derivative.0.par_iter()))
            .for_each(|(x, (b, d))| *x = *b + scale * *d);
    }
}

impl From<Vec<Vec3>> for StateVector {
    fn from(entries: Vec<Vec3>) -> Self {
        StateVector(entries)
    }
}
