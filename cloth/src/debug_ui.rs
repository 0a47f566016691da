use bevy::color::palettes;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use cloth_sim::ClothSimulation;

use crate::states::SimulationState;

pub struct DebugUIPlugin;

impl Plugin for DebugUIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup)
            .add_systems(Update, (update_fps, update_cloth_stats))
            .add_systems(
                Update,
                update_state_text.run_if(state_changed::<SimulationState>),
            );
    }
}

#[derive(Component)]
struct FpsText;

#[derive(Component)]
struct StateText;

#[derive(Component)]
struct ModeText;

#[derive(Component)]
struct StepsText;

#[derive(Component)]
struct EnergyText;

/// Formats `value` with a comma every three digits.
fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

fn update_fps(
    bevy_diagnostics: Res<DiagnosticsStore>,
    mut fps_text_query: Query<&mut Text, With<FpsText>>,
) {
    let Some(value) = bevy_diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
    else {
        return;
    };
    if let Ok(mut text) = fps_text_query.single_mut() {
        **text = format!("{value:.0}");
    }
}

fn update_state_text(
    mut state_text_query: Query<&mut Text, With<StateText>>,
    current_state: Res<State<SimulationState>>,
) {
    if let Ok(mut text) = state_text_query.single_mut() {
        **text = current_state.to_string();
    }
}

fn update_cloth_stats(
    simulation: Res<ClothSimulation>,
    mut texts: ParamSet<(
        Query<&mut Text, With<ModeText>>,
        Query<&mut Text, With<StepsText>>,
        Query<&mut Text, With<EnergyText>>,
    )>,
) {
    if let Ok(mut text) = texts.p0().single_mut() {
        **text = simulation.mode().to_string();
    }
    if let Ok(mut text) = texts.p1().single_mut() {
        **text = thousands(simulation.steps());
    }
    if let Ok(mut text) = texts.p2().single_mut() {
        **text = format!("{:.5}", simulation.total_energy());
    }
}

fn stat_row(label: &'static str, value: impl Component) -> impl Bundle {
    (
        Node {
            width: Val::Percent(100.),
            ..Default::default()
        },
        children![
            (
                Text::new(label),
                TextFont {
                    font_size: 12.0,
                    ..default()
                }
            ),
            (
                Node {
                    margin: UiRect::left(Val::Auto),
                    ..Default::default()
                },
                Text::default(),
                TextFont {
                    font_size: 12.0,
                    ..Default::default()
                },
                TextColor(palettes::css::GOLD.into()),
                value
            )
        ],
    )
}

fn section(title: &'static str) -> impl Bundle {
    (
        Node {
            width: Val::Percent(100.),
            display: Display::Flex,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..Default::default()
        },
        children![(
            Text::new(title),
            TextFont {
                font_size: 14.0,
                ..default()
            }
        )],
    )
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Node {
            width: Val::Px(200.),
            height: Val::Auto,
            margin: UiRect::with_left(UiRect::all(Val::Px(10.)), Val::Auto),
            padding: UiRect::all(Val::Px(10.)),
            flex_direction: FlexDirection::Column,
            ..Default::default()
        },
        BackgroundColor(LinearRgba::new(0.01, 0.01, 0.01, 0.8).into()),
        children![
            (
                Node {
                    padding: UiRect::new(Val::Px(0.), Val::Px(0.), Val::Px(5.), Val::Px(5.)),
                    border: UiRect::bottom(Val::Px(1.)),
                    flex_direction: FlexDirection::Column,
                    ..Default::default()
                },
                BorderColor(LinearRgba::new(0.2, 0.2, 0.2, 0.8).into()),
                children![stat_row("FPS: ", FpsText), stat_row("State: ", StateText)]
            ),
            (
                Node {
                    padding: UiRect::new(Val::Px(0.), Val::Px(0.), Val::Px(5.), Val::Px(5.)),
                    flex_direction: FlexDirection::Column,
                    ..Default::default()
                },
                children![
                    section("Cloth"),
                    stat_row("Mode: ", ModeText),
                    stat_row("Steps: ", StepsText),
                    stat_row("Energy: ", EnergyText),
                ]
            ),
            (
                Text::new("Space run/pause  C reset\n1/2/3 Euler/Midpoint/RK4\nM cycle mode  Q quit"),
                TextFont {
                    font_size: 10.0,
                    ..default()
                },
                TextColor(palettes::css::GRAY.into()),
            ),
        ],
    ));
}
