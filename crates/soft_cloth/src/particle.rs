use std::fmt;

use glam::Vec3;

use crate::error::SimError;

/// Stable identity of a particle inside a [`crate::Shape`].
///
/// Ids are handed out once and never reused, so a spring keeps pointing at
/// the same particle even when other particles are removed and slots shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub(crate) usize);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub(crate) id: ParticleId,
    construct_position: Vec3,
    pub position: Vec3,
    pub velocity: Vec3,
    mass: f32,
}

impl Particle {
    /// Creates a unit mass particle at rest on its construction position.
    ///
    /// The id is a placeholder until the particle is added to a shape.
    pub fn new(construct_position: Vec3) -> Self {
        Particle {
            id: ParticleId(usize::MAX),
            construct_position,
            position: construct_position,
            velocity: Vec3::ZERO,
            mass: 1.,
        }
    }

    /// Replaces the unit mass. The mass must be finite and positive.
    pub fn with_mass(mut self, mass: f32) -> Result<Self, SimError> {
        if !(mass.is_finite() && mass > 0.) {
            return Err(SimError::InvalidMass(mass));
        }
        self.mass = mass;
        Ok(self)
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn construct_position(&self) -> Vec3 {
        self.construct_position
    }

    /// Returns the particle to its construction position and stops it.
    pub fn reset(&mut self) {
        self.position = self.construct_position;
        self.velocity = Vec3::ZERO;
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}
