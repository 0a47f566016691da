use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{error::SimError, particle::ParticleId};

/// Which part of the cloth network a spring belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpringFamily {
    /// Nearest neighbours along a row or a column
    Stretch,
    /// Diagonals of a grid cell
    Shear,
    /// Neighbours two cells apart along a row or a column
    Bend,
    /// Anything not created by the grid builder
    Custom,
}

/// Slot pair of the two anchors, valid for one topology generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CachedSlots {
    pub generation: u64,
    pub a: usize,
    pub b: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    anchor_a: ParticleId,
    anchor_b: ParticleId,
    rest_length: f32,
    pub spring_constant: f32,
    pub damping_coefficient: f32,
    pub family: SpringFamily,
    pub(crate) slots: Option<CachedSlots>,
}

impl Spring {
    pub fn new(
        anchor_a: ParticleId,
        anchor_b: ParticleId,
        rest_length: f32,
        spring_constant: f32,
        damping_coefficient: f32,
    ) -> Result<Self, SimError> {
        if !(rest_length.is_finite() && rest_length > 0.) {
            return Err(SimError::InvalidRestLength(rest_length));
        }
        if anchor_a == anchor_b {
            return Err(SimError::SelfSpring(anchor_a));
        }
        Ok(Spring {
            anchor_a,
            anchor_b,
            rest_length,
            spring_constant,
            damping_coefficient,
            family: SpringFamily::Custom,
            slots: None,
        })
    }

    pub fn with_family(mut self, family: SpringFamily) -> Self {
        self.family = family;
        self
    }

    pub fn anchor_a(&self) -> ParticleId {
        self.anchor_a
    }

    pub fn anchor_b(&self) -> ParticleId {
        self.anchor_b
    }

    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Spring-dampener force acting on `anchor_a`.
    ///
    /// The force on `anchor_b` is exactly the negation of the returned value.
    pub fn force_on_a(
        &self,
        position_a: Vec3,
        velocity_a: Vec3,
        position_b: Vec3,
        velocity_b: Vec3,
    ) -> Result<Vec3, SimError> {
        let delta = position_a - position_b;
        let distance = delta.length();
        if distance == 0.0 {
            return Err(SimError::DegenerateSpring {
                p1: self.anchor_a,
                p2: self.anchor_b,
            });
        }

        let direction = delta / distance;
        let relative_velocity = velocity_a - velocity_b;
        let magnitude = self.spring_constant * (distance - self.rest_length)
            + self.damping_coefficient * relative_velocity.dot(direction);

        Ok(-magnitude * direction)
    }

    /// Returns the forces on `anchor_a` and `anchor_b`, which always cancel.
    pub fn force_pair(
        &self,
        position_a: Vec3,
        velocity_a: Vec3,
        position_b: Vec3,
        velocity_b: Vec3,
    ) -> Result<(Vec3, Vec3), SimError> {
        let force_on_a = self.force_on_a(position_a, velocity_a, position_b, velocity_b)?;
        Ok((force_on_a, -force_on_a))
    }

    pub fn potential_energy(&self, position_a: Vec3, position_b: Vec3) -> f32 {
        let stretch = position_a.distance(position_b) - self.rest_length;
        0.5 * self.spring_constant * stretch * stretch
    }
}
