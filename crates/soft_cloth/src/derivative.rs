use glam::Vec3;

use crate::{error::SimError, force::Force, shape::Shape, state::StateVector};

/// Computes the time derivative of `state` into `derivative`.
///
/// Each particle's pair in the output is `(velocity, acceleration)`. Positions
/// and velocities are read from `state` only, so the same shape can be
/// evaluated at any trial state without touching its particles. Particle
/// masses, forces and pins come from `shape`.
///
/// Pinned particles get zero acceleration after every force has been
/// accumulated.
pub fn evaluate(
    shape: &Shape,
    state: &StateVector,
    derivative: &mut StateVector,
) -> Result<(), SimError> {
    let particles = shape.particles();
    state.check_len(particles.len())?;
    derivative.resize(particles.len());
    let out = derivative.as_mut_slice();

    for (slot, pair) in out.chunks_exact_mut(2).enumerate() {
        pair[0] = state.velocity(slot);
        pair[1] = Vec3::ZERO;
    }

    for force in shape.forces() {
        match force {
            Force::Spring(spring) => {
                let (a, b) = shape.resolve_spring(spring)?;
                let (force_on_a, force_on_b) = spring.force_pair(
                    state.position(a),
                    state.velocity(a),
                    state.position(b),
                    state.velocity(b),
                )?;
                out[2 * a + 1] += force_on_a / particles[a].mass();
                out[2 * b + 1] += force_on_b / particles[b].mass();
            }
            Force::Gravity(gravity) => {
                for pair in out.chunks_exact_mut(2) {
                    pair[1] += gravity.acceleration;
                }
            }
            Force::Drag(drag) => {
                for (particle, pair) in particles.iter().zip(out.chunks_exact_mut(2)) {
                    let velocity = pair[0];
                    pair[1] += drag.force(velocity) / particle.mass();
                }
            }
        }
    }

    for id in shape.pinned() {
        let slot = shape.slot_of(id)?;
        out[2 * slot + 1] = Vec3::ZERO;
    }

    Ok(())
}

impl Shape {
    /// Derivative of the particles' current state, in a freshly allocated vector.
    pub fn derivative(&self) -> Result<StateVector, SimError> {
        let state = StateVector::gather(self);
        let mut derivative = StateVector::zeroed(self.len());
        evaluate(self, &state, &mut derivative)?;
        Ok(derivative)
    }
}
