use glam::Vec3;

use crate::spring::Spring;

/// Constant acceleration applied to every particle, independent of its mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformGravity {
    pub acceleration: Vec3,
}

/// Air resistance acting on each particle on its own, `-|v|² * coefficient * v`.
///
/// This is not part of any spring's action/reaction pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub coefficient: f32,
}

impl Drag {
    pub fn force(&self, velocity: Vec3) -> Vec3 {
        -velocity.length_squared() * self.coefficient * velocity
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Force {
    Gravity(UniformGravity),
    Spring(Spring),
    Drag(Drag),
}

impl Force {
    pub fn gravity(acceleration: Vec3) -> Self {
        Force::Gravity(UniformGravity { acceleration })
    }

    pub fn drag(coefficient: f32) -> Self {
        Force::Drag(Drag { coefficient })
    }

    pub fn as_spring(&self) -> Option<&Spring> {
        match self {
            Force::Spring(spring) => Some(spring),
            Force::Gravity(_) | Force::Drag(_) => None,
        }
    }
}

impl From<Spring> for Force {
    fn from(spring: Spring) -> Self {
        Force::Spring(spring)
    }
}

impl From<UniformGravity> for Force {
    fn from(gravity: UniformGravity) -> Self {
        Force::Gravity(gravity)
    }
}

impl From<Drag> for Force {
    fn from(drag: Drag) -> Self {
        Force::Drag(drag)
    }
}
