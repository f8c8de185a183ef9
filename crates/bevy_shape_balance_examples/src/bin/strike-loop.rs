//! Headless demo: seeds a population, then strikes one random instance per
//! frame and logs every corrective swap until the population is gone.
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_shape_balance::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use shape_balance::prelude::PassOutcome;

#[derive(Resource)]
struct StrikeRng(StdRng);

fn main() {
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            std::time::Duration::from_millis(10),
        )))
        .add_plugins(LogPlugin::default())
        .add_plugins(AssetPlugin::default())
        .add_plugins(ShapeBalancePlugin)
        .insert_resource(StrikeRng(StdRng::seed_from_u64(7)))
        .add_systems(Startup, request_spawn)
        .add_systems(PreUpdate, strike_random_instance)
        .add_systems(Update, log_swaps)
        .run();
}

fn request_spawn(mut commands: Commands) {
    let meshes = ["SM_Cube", "SM_Sphere", "SM_Cone"];
    let config = SpawnerConfig::new(meshes, ["MI_Red", "MI_Blue"])
        .with_initial_count(20)
        .with_policy(DistributionPolicy::Even);
    let entity = commands.spawn_empty().id();
    commands.trigger(SpawnShapes::from_config(entity, config, 1));
}

fn strike_random_instance(
    state: Option<Res<ShapeSpawnerState>>,
    mut rng: ResMut<StrikeRng>,
    mut strikes: MessageWriter<StrikeInstance>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(state) = state else {
        return;
    };
    let engine = state.engine();
    let occupied: Vec<_> = engine
        .iter_pools()
        .filter(|(_, pool)| !pool.is_empty())
        .map(|(pair, pool)| (pair, pool.len()))
        .collect();
    if occupied.is_empty() {
        info!("Population exhausted.");
        exit.write(AppExit::Success);
        return;
    }

    let (pair, len) = occupied[rng.0.next_u32() as usize % occupied.len()];
    let index = rng.0.next_u32() as usize % len;
    if let Some(tooltip) = state.tooltip(pair, index) {
        info!("Striking{}", tooltip.replace('\n', " |"));
    }
    strikes.write(StrikeInstance::new(pair, index));
}

fn log_swaps(mut reader: MessageReader<BalanceMessage>) {
    for msg in reader.read() {
        if let BalanceEvent::PassFinished {
            dimension,
            outcome: PassOutcome::Swapped { from, to, .. },
        } = &msg.event
        {
            info!("{:?} pass moved one instance {} -> {}", dimension, from, to);
        }
    }
}
