use std::path::PathBuf;

use crate::{debug_ui::DebugUIPlugin, simulation::ClothPlugin, states::SimulationState};
use bevy::{diagnostic::FrameTimeDiagnosticsPlugin, prelude::*};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use cloth_sim::{ClothConfig, ClothSimulation, ConfigError};

mod debug_ui;
mod simulation;
mod states;

const DEFAULT_CONFIG_PATH: &str = "cloth.yaml";

/// Reads the config named by `CLOTH_CONFIG`, or `cloth.yaml` when it exists.
fn load_config() -> Result<ClothConfig, ConfigError> {
    match std::env::var_os("CLOTH_CONFIG") {
        Some(path) => ClothConfig::load(PathBuf::from(path)),
        None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
            ClothConfig::load(DEFAULT_CONFIG_PATH)
        }
        None => Ok(ClothConfig::default()),
    }
}

fn main() -> AppExit {
    let simulation = match load_config().and_then(|config| ClothSimulation::from_config(&config)) {
        Ok(simulation) => simulation,
        Err(err) => {
            eprintln!("Could not start cloth simulation: {err}");
            return AppExit::error();
        }
    };
    let initial_state = SimulationState::from_running(simulation.is_running());

    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Cloth".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            PanOrbitCameraPlugin,
            FrameTimeDiagnosticsPlugin {
                max_history_length: 60,
                smoothing_factor: 0.1,
            },
            DebugUIPlugin,
            ClothPlugin,
        ))
        .insert_resource(simulation)
        .insert_resource(ClearColor(LinearRgba::BLACK.into()))
        .insert_state(initial_state)
        .add_systems(Startup, setup)
        .run()
}

#[derive(Component)]
pub struct MainCamera;

fn setup(mut commands: Commands, simulation: Res<ClothSimulation>) {
    let count = simulation.positions().len().max(1) as f32;
    let center = simulation.positions().sum::<Vec3>() / count;

    commands.spawn((
        PointLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));
    // camera
    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Transform::from_translation(center + Vec3::new(2.0, 1.0, 2.0)).looking_at(center, Vec3::Y),
        PanOrbitCamera {
            focus: center,
            radius: Some(2.),
            zoom_lower_limit: 0.1,
            zoom_upper_limit: Some(10.),
            allow_upside_down: false,
            ..Default::default()
        },
    ));
}
