//! Builds a square cloth patch of particles joined by stretch, shear and bend
//! springs.

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::SimError,
    particle::{Particle, ParticleId},
    shape::Shape,
    spring::{Spring, SpringFamily},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub spring_constant: f32,
    pub damping_coefficient: f32,
}

impl SpringParams {
    pub const fn new(spring_constant: f32, damping_coefficient: f32) -> Self {
        SpringParams {
            spring_constant,
            damping_coefficient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Particles along each side
    pub size: usize,
    /// Distance between neighbouring particles
    pub spacing: f32,
    /// Position of particle (0, 0)
    pub origin: Vec3,
    /// Direction of increasing row index
    pub row_axis: Vec3,
    /// Direction of increasing column index
    pub column_axis: Vec3,
    pub stretch: SpringParams,
    pub shear: SpringParams,
    pub bend: SpringParams,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            size: 20,
            spacing: 0.05,
            origin: Vec3::new(0.5, 0.5, 0.),
            row_axis: Vec3::NEG_X,
            column_axis: Vec3::Z,
            stretch: SpringParams::new(30., 15.),
            shear: SpringParams::new(30., 15.),
            bend: SpringParams::new(50., 15.),
        }
    }
}

impl GridConfig {
    pub fn particle_position(&self, row: usize, column: usize) -> Vec3 {
        self.origin
            + row as f32 * self.spacing * self.row_axis
            + column as f32 * self.spacing * self.column_axis
    }

    fn params(&self, family: SpringFamily) -> SpringParams {
        match family {
            SpringFamily::Stretch | SpringFamily::Custom => self.stretch,
            SpringFamily::Shear => self.shear,
            SpringFamily::Bend => self.bend,
        }
    }

    /// Number of particles in the grid.
    ///
    /// Fails with [`SimError::InvalidGrid`] when the grid is empty or its
    /// particle and spring counts cannot be indexed.
    pub fn particle_count(&self) -> Result<usize, SimError> {
        let n = self.size;
        if n == 0 {
            return Err(SimError::InvalidGrid("size must be at least 1".to_string()));
        }
        // Every family holds at most 2 * n * n springs
        n.checked_mul(n)
            .filter(|count| count.checked_mul(6).is_some())
            .ok_or_else(|| SimError::InvalidGrid(format!("size {n} is too large")))
    }

    /// Number of springs of `family` a grid of this size holds.
    pub fn expected_springs(&self, family: SpringFamily) -> usize {
        let n = self.size;
        match family {
            SpringFamily::Stretch => 2 * n * n.saturating_sub(1),
            SpringFamily::Shear => 2 * n.saturating_sub(1).pow(2),
            SpringFamily::Bend => 2 * n * n.saturating_sub(2),
            SpringFamily::Custom => 0,
        }
    }
}

struct Pass {
    family: SpringFamily,
    offset: (isize, isize),
    rest_factor: f32,
}

const PASSES: [Pass; 6] = [
    Pass {
        family: SpringFamily::Stretch,
        offset: (0, 1),
        rest_factor: 1.,
    },
    Pass {
        family: SpringFamily::Stretch,
        offset: (1, 0),
        rest_factor: 1.,
    },
    Pass {
        family: SpringFamily::Shear,
        offset: (1, 1),
        rest_factor: std::f32::consts::SQRT_2,
    },
    Pass {
        family: SpringFamily::Shear,
        offset: (-1, 1),
        rest_factor: std::f32::consts::SQRT_2,
    },
    Pass {
        family: SpringFamily::Bend,
        offset: (0, 2),
        rest_factor: 2.,
    },
    Pass {
        family: SpringFamily::Bend,
        offset: (2, 0),
        rest_factor: 2.,
    },
];

/// A cloth patch together with the row-major table of its particle ids.
#[derive(Debug, Clone)]
pub struct ClothGrid {
    shape: Shape,
    ids: Vec<ParticleId>,
    size: usize,
}

impl ClothGrid {
    pub fn new(config: GridConfig) -> Result<Self, SimError> {
        let count = config.particle_count()?;
        if !(config.spacing.is_finite() && config.spacing > 0.) {
            return Err(SimError::InvalidGrid(format!(
                "spacing must be finite and positive, got {}",
                config.spacing
            )));
        }

        let n = config.size;
        let spring_count: usize = [SpringFamily::Stretch, SpringFamily::Shear, SpringFamily::Bend]
            .into_iter()
            .map(|family| config.expected_springs(family))
            .sum();
        let mut shape = Shape::with_capacity(count, spring_count + 2);

        let mut ids = Vec::with_capacity(count);
        for row in 0..n {
            for column in 0..n {
                ids.push(shape.add_particle(Particle::new(config.particle_position(row, column))));
            }
        }

        for pass in &PASSES {
            let params = config.params(pass.family);
            let rest_length = config.spacing * pass.rest_factor;
            for row in 0..n {
                for column in 0..n {
                    let Some(other) = offset_index(n, row, column, pass.offset) else {
                        continue;
                    };
                    let spring = Spring::new(
                        ids[row * n + column],
                        ids[other],
                        rest_length,
                        params.spring_constant,
                        params.damping_coefficient,
                    )?
                    .with_family(pass.family);
                    shape.add_force(spring);
                }
            }
        }

        shape.rebuild_topology();
        debug!(
            "Built {n}x{n} cloth grid with {} springs",
            shape.springs().count()
        );

        Ok(ClothGrid { shape, ids, size: n })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// Particles along each side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Particle ids in row-major order, `row * size + column`.
    pub fn ids(&self) -> &[ParticleId] {
        &self.ids
    }

    pub fn id_at(&self, row: usize, column: usize) -> Option<ParticleId> {
        if row < self.size && column < self.size {
            Some(self.ids[row * self.size + column])
        } else {
            None
        }
    }

    /// Ids of every particle in `column`, top row first.
    pub fn column(&self, column: usize) -> impl Iterator<Item = ParticleId> + '_ {
        (0..self.size).filter_map(move |row| self.id_at(row, column))
    }

    pub fn spring_count(&self, family: SpringFamily) -> usize {
        self.shape
            .springs()
            .filter(|spring| spring.family == family)
            .count()
    }
}

fn offset_index(n: usize, row: usize, column: usize, (d_row, d_column): (isize, isize)) -> Option<usize> {
    let row = row.checked_add_signed(d_row).filter(|&r| r < n)?;
    let column = column.checked_add_signed(d_column).filter(|&c| c < n)?;
    Some(row * n + column)
}
