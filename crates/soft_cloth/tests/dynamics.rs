use glam::Vec3;
use soft_cloth::{
    ClothGrid, Euler, Force, GridConfig, IntegrationMode, Integrator, Midpoint, Particle,
    RungeKutta4, Shape, SimError, Spring, StateVector, StepBuffers,
};

const REFERENCE_GRAVITY: Vec3 = Vec3::new(0., -0.03, 0.);

fn close(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    (a - b).length() < tolerance
}

/// Two unit masses two units apart on a spring of rest length one.
fn stretched_pair() -> Shape {
    let mut shape = Shape::new();
    let a = shape.add_particle(Particle::new(Vec3::ZERO));
    let b = shape.add_particle(Particle::new(Vec3::new(2., 0., 0.)));
    shape.add_force(Spring::new(a, b, 1., 8., 0.).unwrap());
    shape
}

fn small_grid(size: usize) -> ClothGrid {
    ClothGrid::new(GridConfig {
        size,
        ..GridConfig::default()
    })
    .unwrap()
}

#[test]
fn euler_update_rule() {
    let mut shape = stretched_pair();
    Euler.step(&mut shape, 0.1).unwrap();

    let [a, b] = [shape.particles()[0], shape.particles()[1]];
    assert_eq!(a.position, Vec3::ZERO);
    assert_eq!(b.position, Vec3::new(2., 0., 0.));
    assert!(close(a.velocity, Vec3::new(0.8, 0., 0.), 1e-6));
    assert!(close(b.velocity, Vec3::new(-0.8, 0., 0.), 1e-6));
}

#[test]
fn midpoint_update_rule() {
    let mut shape = stretched_pair();
    Midpoint.step(&mut shape, 0.1).unwrap();

    // Half step leaves positions in place and gives velocity 0.4
    let [a, b] = [shape.particles()[0], shape.particles()[1]];
    assert!(close(a.position, Vec3::new(0.04, 0., 0.), 1e-6));
    assert!(close(b.position, Vec3::new(1.96, 0., 0.), 1e-6));
    assert!(close(a.velocity, Vec3::new(0.8, 0., 0.), 1e-6));
    assert!(close(b.velocity, Vec3::new(-0.8, 0., 0.), 1e-6));
}

#[test]
fn rk4_update_rule() {
    let mut shape = stretched_pair();
    RungeKutta4.step(&mut shape, 0.1).unwrap();

    // Stage accelerations 8, 8, 7.68, 7.36 and velocities 0, 0.4, 0.4, 0.768
    let position = 0.1 * (0.4 / 3. + 0.4 / 3. + 0.768 / 6.);
    let velocity = 0.1 * (8. / 6. + 8. / 3. + 7.68 / 3. + 7.36 / 6.);
    let [a, b] = [shape.particles()[0], shape.particles()[1]];
    assert!(close(a.position, Vec3::new(position, 0., 0.), 1e-5));
    assert!(close(b.position, Vec3::new(2. - position, 0., 0.), 1e-5));
    assert!(close(a.velocity, Vec3::new(velocity, 0., 0.), 1e-5));
    assert!(close(b.velocity, Vec3::new(-velocity, 0., 0.), 1e-5));
}

#[test]
fn switching_modes_continues_from_current_state() {
    let mut switched = stretched_pair();
    let mut buffers = StepBuffers::default();
    IntegrationMode::Euler
        .step_with(&mut switched, 0.05, &mut buffers)
        .unwrap();
    IntegrationMode::Midpoint
        .step_with(&mut switched, 0.05, &mut buffers)
        .unwrap();

    let mut fresh = stretched_pair();
    Euler.step(&mut fresh, 0.05).unwrap();
    let mut restarted = stretched_pair();
    StateVector::gather(&fresh).scatter(&mut restarted).unwrap();
    Midpoint.step(&mut restarted, 0.05).unwrap();

    assert_eq!(switched.particles(), restarted.particles());
}

#[test]
fn zero_step_is_a_no_op_on_a_hanging_cloth() {
    for mode in IntegrationMode::ALL {
        let mut grid = small_grid(6);
        let column: Vec<_> = grid.column(0).collect();
        let shape = grid.shape_mut();
        shape.add_force(Force::gravity(REFERENCE_GRAVITY));
        shape.add_force(Force::drag(5.));
        for id in column {
            shape.pin(id).unwrap();
        }
        for _ in 0..5 {
            mode.step(shape, 0.005).unwrap();
        }

        let before = shape.particles().to_vec();
        mode.step(shape, 0.).unwrap();
        assert_eq!(shape.particles(), before.as_slice(), "{mode}");
    }
}

#[test]
fn pair_at_rest_length_feels_no_force() {
    let mut shape = Shape::new();
    let a = shape.add_particle(Particle::new(Vec3::new(0.5, 0.5, 0.)));
    let b = shape.add_particle(Particle::new(Vec3::new(0.5, 0.5, 0.05)));
    shape.add_force(Spring::new(a, b, 0.05, 30., 15.).unwrap());
    shape.rebuild_topology();

    let derivative = shape.derivative().unwrap();
    assert_eq!(derivative.as_slice(), &[Vec3::ZERO; 4]);
}

#[test]
fn resting_grid_stays_at_rest() {
    let mut grid = small_grid(8);
    let shape = grid.shape_mut();
    let derivative = shape.derivative().unwrap();
    for slot in 0..shape.len() {
        assert!(derivative.acceleration(slot).length() < 1e-4);
    }

    let before: Vec<_> = shape.positions().collect();
    let mut buffers = StepBuffers::default();
    for _ in 0..20 {
        RungeKutta4.step_with(shape, 0.015, &mut buffers).unwrap();
    }
    for (now, then) in shape.positions().zip(before) {
        assert!(close(now, then, 1e-5));
    }
}

#[test]
fn internal_forces_sum_to_zero() {
    let mut grid = small_grid(5);
    let shape = grid.shape_mut();
    for (i, particle) in shape.particles_mut().iter_mut().enumerate() {
        let i = i as f32;
        particle.position += Vec3::new(0.01 * i.sin(), 0.02 * i.cos(), -0.005 * i);
        particle.velocity = Vec3::new(0.1 * i.cos(), 0., 0.05 * i.sin());
    }

    let derivative = shape.derivative().unwrap();
    let total = (0..shape.len()).fold(Vec3::ZERO, |sum, slot| sum + derivative.acceleration(slot));
    assert!(total.length() < 1e-3, "net internal force {total}");
}

#[test]
fn euler_gravity_scenario() {
    let mut shape = Shape::new();
    shape.add_particle(Particle::new(Vec3::new(0.5, 0.5, 0.)));
    shape.add_force(Force::gravity(REFERENCE_GRAVITY));

    Euler.step(&mut shape, 1.).unwrap();
    let particle = shape.particles()[0];
    assert_eq!(particle.position, Vec3::new(0.5, 0.5, 0.));
    assert!(close(particle.velocity, REFERENCE_GRAVITY, 1e-7));

    Euler.step(&mut shape, 1.).unwrap();
    let particle = shape.particles()[0];
    assert!(close(particle.position, Vec3::new(0.5, 0.47, 0.), 1e-6));
}

#[test]
fn rk4_gravity_scenario_matches_closed_form() {
    let mut shape = Shape::new();
    shape.add_particle(Particle::new(Vec3::new(0.5, 0.5, 0.)));
    shape.add_force(Force::gravity(REFERENCE_GRAVITY));

    let dt = 0.015;
    let mut buffers = StepBuffers::default();
    for _ in 0..100 {
        RungeKutta4.step_with(&mut shape, dt, &mut buffers).unwrap();
    }
    let t = 100. * dt;
    let particle = shape.particles()[0];
    let expected = Vec3::new(0.5, 0.5, 0.) + 0.5 * REFERENCE_GRAVITY * t * t;
    assert!(close(particle.position, expected, 1e-4));
    assert!(close(particle.velocity, REFERENCE_GRAVITY * t, 1e-4));
}

#[test]
fn pinned_column_holds_while_cloth_falls() {
    let mut grid = small_grid(5);
    let column: Vec<_> = grid.column(0).collect();
    let shape = grid.shape_mut();
    shape.add_force(Force::gravity(REFERENCE_GRAVITY));
    for &id in &column {
        shape.pin(id).unwrap();
    }
    let before = shape.clone();

    for _ in 0..200 {
        IntegrationMode::Rk4.step(shape, 0.015).unwrap();
    }

    for &id in &column {
        assert_eq!(shape.particle(id), before.particle(id));
    }
    let far_corner = grid.id_at(4, 4).unwrap();
    let start = before.particle(far_corner).unwrap().position;
    assert!(grid.shape().particle(far_corner).unwrap().position.y < start.y);
}

#[test]
fn degenerate_spring_leaves_state_untouched() {
    for mode in IntegrationMode::ALL {
        let mut shape = Shape::new();
        let a = shape.add_particle(Particle::new(Vec3::ONE));
        let b = shape.add_particle(Particle::new(Vec3::ONE));
        shape.particle_mut(a).unwrap().velocity = Vec3::X;
        shape.add_force(Spring::new(a, b, 0.1, 30., 15.).unwrap());
        let before = shape.particles().to_vec();

        assert_eq!(
            mode.step(&mut shape, 0.015),
            Err(SimError::DegenerateSpring { p1: a, p2: b })
        );
        assert_eq!(shape.particles(), before.as_slice(), "{mode}");
    }
}

#[test]
fn unresolved_reference_leaves_state_untouched() {
    let mut elsewhere = Shape::new();
    for _ in 0..3 {
        elsewhere.add_particle(Particle::new(Vec3::ZERO));
    }
    let stranger = elsewhere.particles()[2].id();

    let mut shape = Shape::new();
    let a = shape.add_particle(Particle::new(Vec3::ZERO));
    shape.add_particle(Particle::new(Vec3::X));
    shape.particle_mut(a).unwrap().velocity = Vec3::Y;
    shape.add_force(Force::gravity(REFERENCE_GRAVITY));
    shape.add_force(Spring::new(a, stranger, 1., 1., 1.).unwrap());
    shape.rebuild_topology();
    let before = shape.particles().to_vec();

    for mode in IntegrationMode::ALL {
        assert_eq!(
            mode.step(&mut shape, 0.015),
            Err(SimError::UnresolvedParticleReference(stranger))
        );
        assert_eq!(shape.particles(), before.as_slice());
    }
}

#[test]
fn reset_is_idempotent_after_motion() {
    let mut grid = small_grid(4);
    let shape = grid.shape_mut();
    shape.add_force(Force::gravity(REFERENCE_GRAVITY));
    for _ in 0..30 {
        IntegrationMode::Midpoint.step(shape, 0.015).unwrap();
    }

    shape.reset();
    let once = shape.particles().to_vec();
    shape.reset();
    assert_eq!(shape.particles(), once.as_slice());
    for particle in &once {
        assert_eq!(particle.position, particle.construct_position());
        assert_eq!(particle.velocity, Vec3::ZERO);
    }
}
