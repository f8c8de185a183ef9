//! Initial distribution of a target count across every descriptor pair.
//!
//! The target `N` is split into `base = N / (Mc * Kc)` instances per pair and a
//! `remainder` of `N - base * Mc * Kc`. How the remainder is placed depends on
//! the [`DistributionPolicy`].
use rand::RngCore;
use tracing::{debug, info};

use crate::balance::BalanceEngine;
use crate::descriptor::DescriptorPair;
use crate::error::{Error, Result};
use crate::events::{BalanceEvent, BalanceEventKind, EventSink};
use crate::sampling::TransformSampling;
use crate::spawn::selection::{correction_targets, pick_random_pair, remainder_pairs};

/// Strategy for placing the instances left over after the even split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistributionPolicy {
    /// One extra instance for each of the first `remainder` pairs of a
    /// diagonal walk over the pair grid. Fully deterministic.
    Even,
    /// Each extra instance lands on a uniformly random pair, followed by a
    /// corrective rebalance of the least-populated kinds.
    #[default]
    RandomCorrective,
}

/// Summary of a distribution run.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistributionSummary {
    /// Instances added by this run.
    pub placed: usize,
    /// Instances every pair received from the even split.
    pub base_per_pair: usize,
    /// Instances placed after the even split.
    pub remainder: usize,
    /// Swaps performed by corrective rebalancing.
    pub corrective_swaps: usize,
}

/// Seeds a [`BalanceEngine`] with a target number of instances.
#[derive(Debug, Clone, Copy)]
pub struct InitialDistributor {
    /// Number of instances to add.
    pub target_count: usize,
    /// Remainder placement strategy.
    pub policy: DistributionPolicy,
}

impl InitialDistributor {
    pub fn new(target_count: usize) -> Self {
        Self {
            target_count,
            policy: DistributionPolicy::default(),
        }
    }

    /// Set the remainder placement policy.
    pub fn with_policy(mut self, policy: DistributionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `(base, remainder)` for `pair_count` pairs.
    pub fn split(&self, pair_count: usize) -> (usize, usize) {
        if pair_count == 0 {
            return (0, 0);
        }
        let base = self.target_count / pair_count;
        (base, self.target_count - base * pair_count)
    }

    pub fn distribute<R: RngCore>(
        &self,
        engine: &mut BalanceEngine,
        sampler: &dyn TransformSampling,
        rng: &mut R,
    ) -> Result<DistributionSummary> {
        self.distribute_with_events(engine, sampler, rng, &mut ())
    }

    pub fn distribute_with_events<R: RngCore>(
        &self,
        engine: &mut BalanceEngine,
        sampler: &dyn TransformSampling,
        rng: &mut R,
        sink: &mut dyn EventSink,
    ) -> Result<DistributionSummary> {
        let pair_count = engine.space().pair_count();
        if pair_count == 0 {
            if self.target_count == 0 {
                return Ok(DistributionSummary::default());
            }
            return Err(Error::InvalidConfig(
                "cannot distribute instances without descriptor pairs".into(),
            ));
        }

        let (base, remainder) = self.split(pair_count);
        let mut summary = DistributionSummary {
            base_per_pair: base,
            remainder,
            ..Default::default()
        };

        let pairs: Vec<_> = engine.space().pairs().collect();
        for &pair in &pairs {
            for _ in 0..base {
                spawn_one(engine, pair, sampler, rng, sink)?;
                summary.placed += 1;
            }
        }

        match self.policy {
            DistributionPolicy::Even => {
                for pair in remainder_pairs(engine.space(), remainder) {
                    spawn_one(engine, pair, sampler, rng, sink)?;
                    summary.placed += 1;
                }
            }
            DistributionPolicy::RandomCorrective => {
                for _ in 0..remainder {
                    let Some(pair) = pick_random_pair(engine.space(), rng) else {
                        break;
                    };
                    spawn_one(engine, pair, sampler, rng, sink)?;
                    summary.placed += 1;

                    let meshes = engine.least_populated_meshes();
                    let materials = engine.least_populated_materials();
                    for target in correction_targets(&meshes, &materials) {
                        let report = engine.rebalance_with_events(target, sink);
                        summary.corrective_swaps += report.swaps();
                    }
                }
            }
        }

        info!(
            "Distributed {} instance(s) over {} pair(s): base {}, remainder {}, corrective swaps {}.",
            summary.placed, pair_count, base, remainder, summary.corrective_swaps
        );
        if sink.wants(BalanceEventKind::DistributionFinished) {
            sink.send(BalanceEvent::DistributionFinished { summary });
        }
        Ok(summary)
    }
}

fn spawn_one<R: RngCore>(
    engine: &mut BalanceEngine,
    pair: DescriptorPair,
    sampler: &dyn TransformSampling,
    rng: &mut R,
    sink: &mut dyn EventSink,
) -> Result<()> {
    let transform = sampler.sample(rng);
    let handle = engine.add_instance(pair, transform)?;
    debug!("Spawned {:?} at {}.", handle, pair);
    if sink.wants(BalanceEventKind::InstanceAdded) {
        sink.send(BalanceEvent::InstanceAdded {
            pair,
            handle,
            transform,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::balance::test_support::{engine, pair};
    use crate::events::VecSink;
    use crate::sampling::BoxTransformSampling;

    fn assert_thresholds_hold(e: &BalanceEngine) {
        let t = e.thresholds();
        for m in e.space().meshes() {
            assert!(e.count_mesh(m) >= t.min_per_mesh, "{m} below threshold");
        }
        for k in e.space().materials() {
            assert!(e.count_material(k) >= t.min_per_material, "{k} below threshold");
        }
    }

    #[test]
    fn exact_multiple_fills_every_pair_equally() {
        let mut e = engine(2, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let summary = InitialDistributor::new(8)
            .with_policy(DistributionPolicy::Even)
            .distribute(&mut e, &BoxTransformSampling::default(), &mut rng)
            .unwrap();

        assert_eq!(summary.base_per_pair, 2);
        assert_eq!(summary.remainder, 0);
        for (_, pool) in e.iter_pools() {
            assert_eq!(pool.len(), 2);
        }
    }

    #[test]
    fn remainder_goes_to_distinct_pairs() {
        let mut e = engine(2, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let summary = InitialDistributor::new(9)
            .with_policy(DistributionPolicy::Even)
            .distribute(&mut e, &BoxTransformSampling::default(), &mut rng)
            .unwrap();

        assert_eq!((summary.base_per_pair, summary.remainder), (2, 1));
        let mut sizes: Vec<_> = e.iter_pools().map(|(_, p)| p.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 2, 2, 3]);
        assert_eq!(e.count_pair(pair(0, 0)), 3);
        assert_eq!(e.total(), 9);
    }

    #[test]
    fn even_policy_satisfies_thresholds_for_any_count() {
        for (m, k) in [(3, 3), (2, 5), (4, 6)] {
            for n in 0..(3 * m * k) {
                let mut e = engine(m, k);
                let mut rng = StdRng::seed_from_u64(n as u64);
                InitialDistributor::new(n)
                    .with_policy(DistributionPolicy::Even)
                    .distribute(&mut e, &BoxTransformSampling::default(), &mut rng)
                    .unwrap();
                assert_eq!(e.total(), n);
                assert_thresholds_hold(&e);
            }
        }
    }

    #[test]
    fn random_corrective_converges_to_balance() {
        for seed in 0..20u64 {
            let mut e = engine(3, 4);
            let mut rng = StdRng::seed_from_u64(seed);
            let summary = InitialDistributor::new(11)
                .distribute(&mut e, &BoxTransformSampling::default(), &mut rng)
                .unwrap();

            assert_eq!(summary.placed, 11);
            assert_eq!(summary.base_per_pair, 0);
            assert_eq!(e.total(), 11);
            assert!(e.verify_counters());
            assert_thresholds_hold(&e);
        }
    }

    #[test]
    fn same_seed_same_population() {
        let run = |seed| {
            let mut e = engine(2, 3);
            let mut rng = StdRng::seed_from_u64(seed);
            InitialDistributor::new(17)
                .distribute(&mut e, &BoxTransformSampling::default(), &mut rng)
                .unwrap();
            let placed: Vec<_> = e
                .iter_pools()
                .flat_map(|(p, pool)| pool.iter().map(move |i| (p, i.transform)))
                .collect();
            placed
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn no_pairs_is_an_error_unless_nothing_requested() {
        let mut e = engine(0, 3);
        let mut rng = StdRng::seed_from_u64(0);
        let sampler = BoxTransformSampling::default();
        assert!(InitialDistributor::new(0)
            .distribute(&mut e, &sampler, &mut rng)
            .is_ok());
        assert!(matches!(
            InitialDistributor::new(4).distribute(&mut e, &sampler, &mut rng),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn events_announce_each_spawn_and_the_summary() {
        let mut e = engine(2, 2);
        let mut rng = StdRng::seed_from_u64(3);
        let mut sink = VecSink::new();
        InitialDistributor::new(6)
            .with_policy(DistributionPolicy::Even)
            .distribute_with_events(
                &mut e,
                &BoxTransformSampling::default(),
                &mut rng,
                &mut sink,
            )
            .unwrap();
        assert_eq!(sink.count_of(BalanceEventKind::InstanceAdded), 6);
        assert_eq!(sink.count_of(BalanceEventKind::DistributionFinished), 1);
    }
}
