use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shape_balance::prelude::*;
use shape_balance_examples::{init_tracing, log_population, render_population_to_png, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // 3 meshes x 3 materials with a remainder of 4: the diagonal walk keeps
    // every kind within one of even.
    let config = SpawnerConfig::new(
        ["SM_Cube", "SM_Sphere", "SM_Cone"],
        ["MI_Red", "MI_Green", "MI_Blue"],
    )
    .with_initial_count(31)
    .with_bounds(Vec3::ZERO, Vec3::new(100.0, 100.0, 10.0))
    .with_policy(DistributionPolicy::Even);

    let mut spawner = ShapeSpawner::try_new(config)?;
    let mut rng = StdRng::seed_from_u64(2025);
    spawner.spawn_initial(&mut rng)?;
    log_population(spawner.engine());

    let rc = RenderConfig::new((800, 800)).with_base_radius(6.0);
    render_population_to_png(
        spawner.engine(),
        &spawner.sampler().bounds,
        &rc,
        "distribution-even.png",
    )?;

    Ok(())
}
