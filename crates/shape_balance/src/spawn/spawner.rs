//! High-level spawner wiring setup and removal events to the balance engine.
use rand::RngCore;
use tracing::{info, warn};

use crate::balance::{BalanceEngine, RebalanceReport};
use crate::descriptor::DescriptorPair;
use crate::error::Result;
use crate::events::{BalanceEvent, BalanceEventKind, EventSink};
use crate::sampling::BoxTransformSampling;
use crate::spawn::config::SpawnerConfig;
use crate::spawn::distributor::DistributionSummary;
use crate::spawn::tooltip::format_tooltip;

/// Owns a [`BalanceEngine`] built from a [`SpawnerConfig`] and routes
/// strikes to it. Holds no balance logic of its own.
#[derive(Debug, Clone)]
pub struct ShapeSpawner {
    config: SpawnerConfig,
    engine: BalanceEngine,
    sampler: BoxTransformSampling,
}

impl ShapeSpawner {
    /// Validates `config`, builds the descriptor space and registers one pool
    /// per pair.
    pub fn try_new(config: SpawnerConfig) -> Result<Self> {
        config.validate()?;
        let space = config.descriptor_space()?;
        let engine = BalanceEngine::with_all_pairs(space);
        let sampler = config.sampler();
        info!(
            "Spawner ready: {} mesh(es) x {} material(s).",
            config.meshes.len(),
            config.materials.len()
        );
        Ok(Self {
            config,
            engine,
            sampler,
        })
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn engine(&self) -> &BalanceEngine {
        &self.engine
    }

    pub fn sampler(&self) -> &BoxTransformSampling {
        &self.sampler
    }

    /// Seeds the configured initial population.
    pub fn spawn_initial<R: RngCore>(&mut self, rng: &mut R) -> Result<DistributionSummary> {
        self.spawn_initial_with_events(rng, &mut ())
    }

    pub fn spawn_initial_with_events<R: RngCore>(
        &mut self,
        rng: &mut R,
        sink: &mut dyn EventSink,
    ) -> Result<DistributionSummary> {
        self.config
            .distributor()
            .distribute_with_events(&mut self.engine, &self.sampler, rng, sink)
    }

    /// Removes the struck instance and rebalances around it.
    pub fn handle_strike(&mut self, pair: DescriptorPair, index: usize) -> Result<RebalanceReport> {
        self.handle_strike_with_events(pair, index, &mut ())
    }

    pub fn handle_strike_with_events(
        &mut self,
        pair: DescriptorPair,
        index: usize,
        sink: &mut dyn EventSink,
    ) -> Result<RebalanceReport> {
        match self
            .engine
            .remove_and_rebalance_with_events(pair, Some(index), sink)
        {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!("Strike on {} #{} rejected: {}", pair, index, err);
                if sink.wants(BalanceEventKind::Warning) {
                    sink.send(BalanceEvent::Warning {
                        context: format!("strike:{pair}"),
                        message: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    /// Strike addressed by kind names, e.g. from a hit result.
    pub fn handle_strike_by_names(
        &mut self,
        mesh: &str,
        material: &str,
        index: usize,
    ) -> Result<RebalanceReport> {
        let pair = self.engine.space().pair_by_names(mesh, material)?;
        self.handle_strike(pair, index)
    }

    /// Tooltip for one instance, or `None` if it does not exist.
    pub fn tooltip(&self, pair: DescriptorPair, index: usize) -> Option<String> {
        let space = self.engine.space();
        let mesh = space.mesh_name(pair.mesh)?;
        let material = space.material_name(pair.material)?;
        let instance = self.engine.instance(pair, index)?;
        Some(format_tooltip(material, mesh, instance.transform.scale))
    }
}
