//! Bevy plugin for shape_balance providing the config asset, resources, message types, and systems.
#![forbid(unsafe_code)]

pub use assets::{
    parse_spawner_config, BoundsDef, ScaleDef, SpawnerConfigAsset, SpawnerConfigAssetLoader,
};
use bevy::prelude::*;
pub use events::{BalanceBus, BalanceEventFilter, BalanceMessage, ChannelSink, StrikeInstance};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shape_balance::prelude::*;

mod assets;
mod events;

/// Convenient re-exports for common types. Import with `use bevy_shape_balance::prelude::*;`.
pub mod prelude {
    pub use shape_balance::prelude::*;

    pub use crate::assets::{
        parse_spawner_config, BoundsDef, ScaleDef, SpawnerConfigAsset, SpawnerConfigAssetLoader,
    };
    pub use crate::events::{
        BalanceBus, BalanceEventFilter, BalanceMessage, ChannelSink, StrikeInstance,
    };
    pub use crate::{
        ShapeBalancePlugin, ShapeSpawnerState, ShapesSpawned, SpawnShapes, SpawnerSource,
    };
}

/// Bevy plugin providing the config asset, resources, message types, and systems.
pub struct ShapeBalancePlugin;

impl Plugin for ShapeBalancePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<BalanceMessage>()
            .add_message::<StrikeInstance>()
            .init_asset::<SpawnerConfigAsset>()
            .init_asset_loader::<SpawnerConfigAssetLoader>()
            .init_resource::<BalanceBus>()
            .init_resource::<BalanceEventFilter>()
            .add_systems(Update, (apply_strikes, drain_balance_messages).chain())
            .add_observer(spawn_shapes);
    }
}

/// The active spawner and the entity that requested it.
///
/// Inserted by the [`SpawnShapes`] observer. A new request replaces it.
#[derive(Resource)]
pub struct ShapeSpawnerState {
    owner: Entity,
    spawner: ShapeSpawner,
}

impl ShapeSpawnerState {
    pub fn new(owner: Entity, spawner: ShapeSpawner) -> Self {
        Self { owner, spawner }
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn spawner(&self) -> &ShapeSpawner {
        &self.spawner
    }

    pub fn engine(&self) -> &BalanceEngine {
        self.spawner.engine()
    }

    /// Tooltip for one instance of the active population.
    pub fn tooltip(&self, pair: DescriptorPair, index: usize) -> Option<String> {
        self.spawner.tooltip(pair, index)
    }
}

/// Where a [`SpawnShapes`] request takes its configuration from.
#[derive(Clone, Debug)]
pub enum SpawnerSource {
    Config(SpawnerConfig),
    Asset(Handle<SpawnerConfigAsset>),
}

/// A request to build a spawner and seed its initial population with a given RNG seed.
#[non_exhaustive]
#[derive(EntityEvent)]
pub struct SpawnShapes {
    /// Entity that owns the resulting spawner.
    pub entity: Entity,
    /// Configuration source.
    pub source: SpawnerSource,
    /// RNG seed for deterministic placement.
    pub seed: u64,
}

impl SpawnShapes {
    pub fn from_config(entity: Entity, config: SpawnerConfig, seed: u64) -> Self {
        Self {
            entity,
            source: SpawnerSource::Config(config),
            seed,
        }
    }

    pub fn from_asset(entity: Entity, handle: Handle<SpawnerConfigAsset>, seed: u64) -> Self {
        Self {
            entity,
            source: SpawnerSource::Asset(handle),
            seed,
        }
    }
}

/// [`EntityEvent`] triggered once the initial population is in place.
#[non_exhaustive]
#[derive(EntityEvent, Clone, Debug)]
pub struct ShapesSpawned {
    /// Entity that requested the spawn.
    pub entity: Entity,
    /// Summary of the initial distribution.
    pub summary: DistributionSummary,
}

fn spawn_shapes(
    request: On<SpawnShapes>,
    mut commands: Commands,
    bus: Res<BalanceBus>,
    filter: Res<BalanceEventFilter>,
    configs: Res<Assets<SpawnerConfigAsset>>,
) {
    let entity = request.entity;
    let config = match &request.source {
        SpawnerSource::Config(config) => config.clone(),
        SpawnerSource::Asset(handle) => {
            let Some(asset) = configs.get(handle) else {
                error!("SpawnerConfigAsset not loaded yet: {:?}", handle);
                return;
            };
            asset.into()
        }
    };

    let mut spawner = match ShapeSpawner::try_new(config) {
        Ok(spawner) => spawner,
        Err(err) => {
            warn!("SpawnShapes config invalid for {:?}: {}", entity, err);
            return;
        }
    };

    let mut rng = StdRng::seed_from_u64(request.seed);
    let mut sink = bus.sink(entity, &filter);
    let summary = match spawner.spawn_initial_with_events(&mut rng, &mut sink) {
        Ok(summary) => summary,
        Err(err) => {
            warn!("Initial distribution failed for {:?}: {}", entity, err);
            return;
        }
    };

    commands.insert_resource(ShapeSpawnerState::new(entity, spawner));
    commands.trigger(ShapesSpawned { entity, summary });
}

fn apply_strikes(
    mut strikes: MessageReader<StrikeInstance>,
    state: Option<ResMut<ShapeSpawnerState>>,
    bus: Res<BalanceBus>,
    filter: Res<BalanceEventFilter>,
) {
    let Some(mut state) = state else {
        let dropped = strikes.read().count();
        if dropped > 0 {
            warn!("Dropped {} strike(s): no active spawner.", dropped);
        }
        return;
    };

    let mut sink = bus.sink(state.owner, &filter);
    for strike in strikes.read() {
        // Rejected strikes are logged and reported as warnings by the spawner.
        let _ = state
            .spawner
            .handle_strike_with_events(strike.pair, strike.index, &mut sink);
    }
}

fn drain_balance_messages(bus: Res<BalanceBus>, mut messages: ResMut<Messages<BalanceMessage>>) {
    while let Ok(message) = bus.receiver().try_recv() {
        messages.write(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Received(Vec<BalanceMessage>);

    #[derive(Resource, Default)]
    struct Finished(Vec<DistributionSummary>);

    fn collect(mut reader: MessageReader<BalanceMessage>, mut received: ResMut<Received>) {
        received.0.extend(reader.read().cloned());
    }

    fn setup_app() -> (App, Entity) {
        let mut app = App::new();
        app.add_message::<BalanceMessage>()
            .add_message::<StrikeInstance>()
            .init_resource::<BalanceBus>()
            .init_resource::<BalanceEventFilter>()
            .init_resource::<Received>()
            .init_resource::<Finished>()
            .insert_resource(Assets::<SpawnerConfigAsset>::default())
            .add_systems(
                Update,
                (apply_strikes, drain_balance_messages, collect).chain(),
            )
            .add_observer(spawn_shapes)
            .add_observer(|done: On<ShapesSpawned>, mut finished: ResMut<Finished>| {
                finished.0.push(done.summary);
            });

        let owner = app.world_mut().spawn_empty().id();
        (app, owner)
    }

    fn config() -> SpawnerConfig {
        SpawnerConfig::new(["Cube", "Sphere"], ["MI_Red", "MI_Blue"])
            .with_initial_count(9)
            .with_policy(DistributionPolicy::Even)
    }

    fn count_kind(app: &App, kind: BalanceEventKind) -> usize {
        app.world()
            .resource::<Received>()
            .0
            .iter()
            .filter(|m| m.event.kind() == kind)
            .count()
    }

    #[test]
    fn spawn_request_seeds_population_and_reports() {
        let (mut app, owner) = setup_app();
        app.world_mut()
            .trigger(SpawnShapes::from_config(owner, config(), 7));
        app.update();

        let state = app.world().resource::<ShapeSpawnerState>();
        assert_eq!(state.owner(), owner);
        assert_eq!(state.engine().total(), 9);

        let finished = &app.world().resource::<Finished>().0;
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].placed, 9);

        assert_eq!(count_kind(&app, BalanceEventKind::InstanceAdded), 9);
        assert!(app
            .world()
            .resource::<Received>()
            .0
            .iter()
            .all(|m| m.owner == owner));
    }

    #[test]
    fn strikes_are_applied_and_forwarded() {
        let (mut app, owner) = setup_app();
        app.world_mut()
            .trigger(SpawnShapes::from_config(owner, config(), 7));
        app.update();

        let cube_red = DescriptorPair::new(MeshKind(0), MaterialKind(0));
        app.world_mut()
            .write_message(StrikeInstance::new(cube_red, 0));
        app.world_mut()
            .write_message(StrikeInstance::new(cube_red, 0));
        app.update();

        let engine = app.world().resource::<ShapeSpawnerState>().engine();
        assert_eq!(engine.total(), 7);
        assert!(engine.verify_counters());
        assert_eq!(count_kind(&app, BalanceEventKind::InstanceRemoved), 2);
        assert_eq!(count_kind(&app, BalanceEventKind::PassFinished), 4);
    }

    #[test]
    fn rejected_strike_becomes_warning_message() {
        let (mut app, owner) = setup_app();
        app.world_mut().trigger(SpawnShapes::from_config(
            owner,
            config().with_initial_count(0),
            1,
        ));
        app.update();

        app.world_mut().write_message(StrikeInstance::new(
            DescriptorPair::new(MeshKind(1), MaterialKind(1)),
            0,
        ));
        app.update();

        assert_eq!(count_kind(&app, BalanceEventKind::Warning), 1);
    }

    #[test]
    fn invalid_config_leaves_no_spawner() {
        let (mut app, owner) = setup_app();
        app.world_mut().trigger(SpawnShapes::from_config(
            owner,
            SpawnerConfig::new(["Cube"], Vec::<String>::new()),
            1,
        ));
        app.update();

        assert!(app.world().get_resource::<ShapeSpawnerState>().is_none());
        assert!(app.world().resource::<Finished>().0.is_empty());
    }

    #[test]
    fn asset_source_reads_loaded_config() {
        let (mut app, owner) = setup_app();
        let asset = parse_spawner_config(
            br#"(meshes: ["Cube", "Sphere", "Cone"], materials: ["MI_Red"], initial_count: Some(6))"#,
        )
        .unwrap();
        let handle = app
            .world_mut()
            .resource_mut::<Assets<SpawnerConfigAsset>>()
            .add(asset);

        app.world_mut()
            .trigger(SpawnShapes::from_asset(owner, handle, 3));
        app.update();

        let engine = app.world().resource::<ShapeSpawnerState>().engine();
        assert_eq!(engine.total(), 6);
        assert_eq!(engine.count_mesh(MeshKind(2)), 2);
    }
}
