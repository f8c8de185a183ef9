use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use shape_balance::prelude::*;
use shape_balance_examples::{init_tracing, log_population};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SpawnerConfig::new(["SM_Cube", "SM_Sphere"], ["MI_Red", "MI_Blue"])
        .with_initial_count(9)
        .with_policy(DistributionPolicy::Even);
    let mut spawner = ShapeSpawner::try_new(config)?;
    let mut rng = StdRng::seed_from_u64(1);
    spawner.spawn_initial(&mut rng)?;
    log_population(spawner.engine());

    // Keep striking the first Cube/Red instance: the engine pulls instances
    // from the other pools to keep both kinds at their fair share.
    let target = spawner.engine().space().pair_by_names("SM_Cube", "MI_Red")?;
    while spawner.engine().total() > 0 {
        let Some(tooltip) = spawner.tooltip(target, 0) else {
            // Target is empty: strike anything left.
            let occupied: Vec<_> = spawner
                .engine()
                .iter_pools()
                .filter(|(_, pool)| !pool.is_empty())
                .map(|(pair, _)| pair)
                .collect();
            let pair = occupied[rng.next_u32() as usize % occupied.len()];
            let report = spawner.handle_strike(pair, 0)?;
            tracing::info!("struck {}: {} swap(s)", pair, report.swaps());
            continue;
        };

        tracing::info!("striking{}", tooltip.replace('\n', " |"));
        let report = spawner.handle_strike(target, 0)?;
        tracing::info!(
            "thresholds {:?}: mesh pass {:?}, material pass {:?}",
            report.thresholds,
            report.mesh_pass,
            report.material_pass
        );
        log_population(spawner.engine());
    }

    Ok(())
}
