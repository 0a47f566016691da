use bevy::{color::palettes, prelude::*};
use cloth_sim::{
    ClothSimulation,
    soft_cloth::{IntegrationMode, SpringFamily},
};

use crate::states::SimulationState;

/// Size of the cross drawn on every particle.
const PARTICLE_HALF_SIZE: f32 = 0.006;

pub struct ClothPlugin;

impl Plugin for ClothPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (keyboard_input, simulate_system, draw_cloth).chain(),
        );
    }
}

fn keyboard_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut simulation: ResMut<ClothSimulation>,
    mut next_state: ResMut<NextState<SimulationState>>,
    mut app_exit: EventWriter<AppExit>,
) {
    if keys.just_pressed(KeyCode::Space) {
        let running = simulation.toggle_running();
        next_state.set(SimulationState::from_running(running));
    }
    if keys.just_pressed(KeyCode::KeyC) {
        simulation.reset();
    }
    for (key, mode) in [
        (KeyCode::Digit1, IntegrationMode::Euler),
        (KeyCode::Digit2, IntegrationMode::Midpoint),
        (KeyCode::Digit3, IntegrationMode::Rk4),
    ] {
        if keys.just_pressed(key) {
            simulation.set_mode(mode);
        }
    }
    if keys.just_pressed(KeyCode::KeyM) {
        simulation.cycle_mode();
    }
    if keys.just_pressed(KeyCode::KeyQ) {
        app_exit.write(AppExit::Success);
    }
}

/// Ticks once per frame, paused or not. A failed step pauses the cloth.
fn simulate_system(
    mut simulation: ResMut<ClothSimulation>,
    mut next_state: ResMut<NextState<SimulationState>>,
) {
    if simulation.tick().is_err() {
        simulation.set_running(false);
        next_state.set(SimulationState::Paused);
    }
}

fn spring_color(family: SpringFamily) -> Color {
    match family {
        SpringFamily::Stretch => palettes::css::SILVER.with_alpha(0.8).into(),
        SpringFamily::Shear => palettes::css::STEEL_BLUE.with_alpha(0.5).into(),
        SpringFamily::Bend => palettes::css::DARK_ORANGE.with_alpha(0.3).into(),
        SpringFamily::Custom => palettes::css::WHITE.into(),
    }
}

fn draw_cloth(mut gizmos: Gizmos, simulation: Res<ClothSimulation>) {
    let shape = simulation.shape();
    for (family, a, b) in shape.spring_segments() {
        gizmos.line(a, b, spring_color(family));
    }
    for particle in shape.particles() {
        let color = if shape.is_pinned(particle.id()) {
            palettes::css::RED
        } else {
            palettes::css::GOLD
        };
        gizmos.cross(
            Isometry3d::from_translation(particle.position),
            PARTICLE_HALF_SIZE,
            color,
        );
    }
}
