use bevy::prelude::*;
use bevy_shape_balance::prelude::*;

#[derive(Default, Resource)]
struct ConfigHandle(Handle<SpawnerConfigAsset>);

fn main() {
    App::new()
        .init_resource::<ConfigHandle>()
        .add_plugins(DefaultPlugins)
        .add_plugins(ShapeBalancePlugin)
        .add_systems(Startup, load_assets)
        .add_systems(Update, trigger_request)
        .add_systems(Update, on_balance_message)
        .add_observer(print_summary)
        .run();
}

/// Loads the spawner config asset on startup.
fn load_assets(mut asset_handle: ResMut<ConfigHandle>, asset_server: Res<AssetServer>) {
    asset_handle.0 = asset_server.load("shapes.spawner");
}

/// Triggers a spawn request once the config asset is loaded.
fn trigger_request(
    mut commands: Commands,
    mut once: Local<bool>,
    handle: Res<ConfigHandle>,
    assets: Res<Assets<SpawnerConfigAsset>>,
) {
    if *once {
        return;
    }
    // Wait until the asset is loaded.
    if assets.get(&handle.0).is_none() {
        return;
    }

    // Any entity works as the owner; it tags every forwarded message.
    let entity = commands.spawn_empty().id();
    commands.trigger(SpawnShapes::from_asset(entity, handle.0.clone(), 42));

    *once = true;
}

fn on_balance_message(mut reader: MessageReader<BalanceMessage>) {
    for msg in reader.read() {
        match &msg.event {
            BalanceEvent::InstanceAdded {
                pair,
                handle,
                transform,
            } => {
                debug!(
                    "Added {:?} to {} at ({:.1}, {:.1}, {:.1})",
                    handle,
                    pair,
                    transform.position.x,
                    transform.position.y,
                    transform.position.z
                );
            }
            BalanceEvent::InstanceMoved { from, to, handle } => {
                info!("Moved {:?}: {} -> {}", handle, from, to);
            }
            BalanceEvent::DistributionFinished { summary } => {
                info!(
                    "Distribution finished for entity {:?}: placed={}, base={}, remainder={}, swaps={}",
                    msg.owner,
                    summary.placed,
                    summary.base_per_pair,
                    summary.remainder,
                    summary.corrective_swaps
                );
            }
            BalanceEvent::Warning { context, message } => {
                warn!("Warning '{}': {}", context, message);
            }
            _ => {}
        }
    }
}

/// Observes the `EntityEvent` when the initial population is in place.
fn print_summary(spawned: On<ShapesSpawned>, state: Res<ShapeSpawnerState>) {
    let engine = state.engine();
    for mesh in engine.space().meshes() {
        info!("{}: {} instance(s)", mesh, engine.count_mesh(mesh));
    }
    for material in engine.space().materials() {
        info!("{}: {} instance(s)", material, engine.count_material(material));
    }
    info!(
        "Spawner for {} holds {} instance(s)",
        spawned.entity,
        spawned.summary.placed
    );
}
