use std::collections::BTreeSet;

use glam::Vec3;
use log::debug;
use rustc_hash::FxHashMap;

use crate::{
    error::SimError,
    force::Force,
    particle::{Particle, ParticleId},
    spring::{CachedSlots, Spring, SpringFamily},
};

/// The particle collection together with every force acting on it.
///
/// The order of `particles` is the order of the flat state vector. Forces
/// refer to particles by [`ParticleId`], never by slot.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    particles: Vec<Particle>,
    forces: Vec<Force>,
    /// Particles whose acceleration is forced to zero
    pinned: BTreeSet<ParticleId>,
    /// Hashmap from ParticleId to slot in `particles`
    slot_map: FxHashMap<ParticleId, usize>,
    next_id: usize,
    /// Bumped whenever existing slots move, invalidating cached spring slots
    generation: u64,
}

impl Shape {
    pub fn new() -> Self {
        Shape::default()
    }

    pub fn with_capacity(particles: usize, forces: usize) -> Self {
        Shape {
            particles: Vec::with_capacity(particles),
            forces: Vec::with_capacity(forces),
            ..Shape::default()
        }
    }

    pub fn add_particle(&mut self, mut particle: Particle) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        particle.id = id;
        self.slot_map.insert(id, self.particles.len());
        self.particles.push(particle);
        id
    }

    /// Removes a particle along with every spring attached to it and its pin.
    pub fn remove_particle(&mut self, id: ParticleId) -> Option<Particle> {
        let slot = self.slot_map.remove(&id)?;
        let particle = self.particles.remove(slot);
        for shifted in &self.particles[slot..] {
            if let Some(entry) = self.slot_map.get_mut(&shifted.id) {
                *entry -= 1;
            }
        }
        self.forces.retain(|force| match force {
            Force::Spring(spring) => spring.anchor_a() != id && spring.anchor_b() != id,
            Force::Gravity(_) | Force::Drag(_) => true,
        });
        self.pinned.remove(&id);
        self.generation += 1;
        Some(particle)
    }

    /// Adds a force. Spring anchors are only checked when the shape is evaluated.
    pub fn add_force(&mut self, force: impl Into<Force>) {
        let mut force = force.into();
        if let Force::Spring(spring) = &mut force {
            spring.slots = None;
        }
        self.forces.push(force);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to particle state; the collection itself cannot grow or shrink.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.slot_map.get(&id).map(|&slot| &self.particles[slot])
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.slot_map
            .get(&id)
            .map(|&slot| &mut self.particles[slot])
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub fn springs(&self) -> impl Iterator<Item = &Spring> {
        self.forces.iter().filter_map(Force::as_spring)
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.particles.iter().map(|particle| particle.position)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn slot_of(&self, id: ParticleId) -> Result<usize, SimError> {
        self.slot_map
            .get(&id)
            .copied()
            .ok_or(SimError::UnresolvedParticleReference(id))
    }

    /// Slots of both anchors, from the cache when it matches the current generation.
    pub fn resolve_spring(&self, spring: &Spring) -> Result<(usize, usize), SimError> {
        match spring.slots {
            Some(slots) if slots.generation == self.generation => Ok((slots.a, slots.b)),
            _ => Ok((self.slot_of(spring.anchor_a())?, self.slot_of(spring.anchor_b())?)),
        }
    }

    /// Recomputes the cached slots of every spring for the current generation.
    ///
    /// Springs with an anchor outside the collection keep no cache and fail
    /// when the shape is evaluated.
    pub fn rebuild_topology(&mut self) {
        let mut cached = 0;
        for force in &mut self.forces {
            if let Force::Spring(spring) = force {
                spring.slots = match (
                    self.slot_map.get(&spring.anchor_a()),
                    self.slot_map.get(&spring.anchor_b()),
                ) {
                    (Some(&a), Some(&b)) => {
                        cached += 1;
                        Some(CachedSlots {
                            generation: self.generation,
                            a,
                            b,
                        })
                    }
                    _ => None,
                };
            }
        }
        debug!(
            "Rebuilt topology generation {}: {} particles, {} springs cached",
            self.generation,
            self.particles.len(),
            cached
        );
    }

    pub fn pin(&mut self, id: ParticleId) -> Result<(), SimError> {
        self.slot_of(id)?;
        self.pinned.insert(id);
        Ok(())
    }

    pub fn unpin(&mut self, id: ParticleId) -> bool {
        self.pinned.remove(&id)
    }

    pub fn is_pinned(&self, id: ParticleId) -> bool {
        self.pinned.contains(&id)
    }

    pub fn pinned(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.pinned.iter().copied()
    }

    /// Returns every particle to its construction position with zero velocity.
    pub fn reset(&mut self) {
        for particle in &mut self.particles {
            particle.reset();
        }
    }

    /// Returns each resolvable spring with the current positions of its anchors.
    pub fn spring_segments(&self) -> impl Iterator<Item = (SpringFamily, Vec3, Vec3)> + '_ {
        self.springs().filter_map(|spring| {
            let (a, b) = self.resolve_spring(spring).ok()?;
            Some((
                spring.family,
                self.particles[a].position,
                self.particles[b].position,
            ))
        })
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Elastic energy stored in all resolvable springs.
    pub fn spring_potential_energy(&self) -> f32 {
        self.springs()
            .filter_map(|spring| {
                let (a, b) = self.resolve_spring(spring).ok()?;
                Some(spring.potential_energy(self.particles[a].position, self.particles[b].position))
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_in_a_row() -> (Shape, [ParticleId; 3]) {
        let mut shape = Shape::new();
        let a = shape.add_particle(Particle::new(Vec3::ZERO));
        let b = shape.add_particle(Particle::new(Vec3::X));
        let c = shape.add_particle(Particle::new(Vec3::X * 2.));
        shape.add_force(Spring::new(a, b, 1., 1., 0.).unwrap());
        shape.add_force(Spring::new(b, c, 1., 1., 0.).unwrap());
        (shape, [a, b, c])
    }

    #[test]
    fn ids_are_assigned_in_insertion_order() {
        let (shape, [a, b, c]) = three_in_a_row();
        assert_eq!(shape.slot_of(a), Ok(0));
        assert_eq!(shape.slot_of(b), Ok(1));
        assert_eq!(shape.slot_of(c), Ok(2));
        assert_eq!(shape.particle(c).map(Particle::id), Some(c));
    }

    #[test]
    fn removing_a_particle_drops_its_springs_and_shifts_slots() {
        let (mut shape, [a, b, c]) = three_in_a_row();
        shape.rebuild_topology();
        shape.pin(a).unwrap();

        let generation = shape.generation();
        let removed = shape.remove_particle(a).unwrap();

        assert_eq!(removed.id(), a);
        assert_eq!(shape.len(), 2);
        assert_eq!(shape.springs().count(), 1);
        assert_eq!(shape.slot_of(b), Ok(0));
        assert_eq!(shape.slot_of(c), Ok(1));
        assert!(!shape.is_pinned(a));
        assert!(shape.generation() > generation);

        // The cache from the previous generation must not be used
        let spring = *shape.springs().next().unwrap();
        assert_eq!(shape.resolve_spring(&spring), Ok((0, 1)));
    }

    #[test]
    fn rebuild_caches_current_slots() {
        let (mut shape, _) = three_in_a_row();
        shape.rebuild_topology();
        assert!(shape.springs().all(|spring| spring.slots.is_some()));
        let resolved: Vec<_> = shape
            .springs()
            .map(|spring| shape.resolve_spring(spring).unwrap())
            .collect();
        assert_eq!(resolved, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn foreign_anchor_is_unresolved() {
        let (mut shape, [a, ..]) = three_in_a_row();
        let stranger = ParticleId(42);
        let spring = Spring::new(a, stranger, 1., 1., 1.).unwrap();
        shape.add_force(spring);
        shape.rebuild_topology();
        assert_eq!(
            shape.resolve_spring(&spring),
            Err(SimError::UnresolvedParticleReference(stranger))
        );
        assert_eq!(shape.spring_segments().count(), 2);
    }

    #[test]
    fn pinning_requires_a_known_particle() {
        let (mut shape, [a, ..]) = three_in_a_row();
        assert!(shape.pin(a).is_ok());
        assert_eq!(
            shape.pin(ParticleId(7)),
            Err(SimError::UnresolvedParticleReference(ParticleId(7)))
        );
        assert!(shape.unpin(a));
        assert!(!shape.unpin(a));
    }

    #[test]
    fn reset_sweeps_every_particle() {
        let (mut shape, _) = three_in_a_row();
        for particle in shape.particles_mut() {
            particle.position += Vec3::Y;
            particle.velocity = Vec3::Z;
        }
        shape.reset();
        for particle in shape.particles() {
            assert_eq!(particle.position, particle.construct_position());
            assert_eq!(particle.velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn energy_of_resting_chain_is_zero() {
        let (shape, _) = three_in_a_row();
        assert_eq!(shape.kinetic_energy(), 0.);
        assert_eq!(shape.spring_potential_energy(), 0.);
    }
}
