use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shape_balance::prelude::*;
use shape_balance_examples::{init_tracing, log_population, render_population_to_png, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SpawnerConfig::new(
        ["SM_Cube", "SM_Sphere", "SM_Cone", "SM_Torus"],
        ["MI_Red", "MI_Green", "MI_Blue"],
    )
    .with_initial_count(23)
    .with_bounds(Vec3::ZERO, Vec3::new(100.0, 100.0, 10.0));

    let mut spawner = ShapeSpawner::try_new(config)?;
    let mut rng = StdRng::seed_from_u64(7);

    // Collect every event to show what the corrective passes did.
    let mut sink = VecSink::new();
    let summary = spawner.spawn_initial_with_events(&mut rng, &mut sink)?;
    for event in sink.as_slice() {
        if let BalanceEvent::InstanceMoved { from, to, handle } = event {
            tracing::info!("corrective move {:?}: {} -> {}", handle, from, to);
        }
    }
    tracing::info!(
        "remainder {} placed randomly, {} corrective swap(s)",
        summary.remainder,
        summary.corrective_swaps
    );
    log_population(spawner.engine());

    let rc = RenderConfig::new((800, 800)).with_base_radius(6.0);
    render_population_to_png(
        spawner.engine(),
        &spawner.sampler().bounds,
        &rc,
        "distribution-random-corrective.png",
    )?;

    Ok(())
}
