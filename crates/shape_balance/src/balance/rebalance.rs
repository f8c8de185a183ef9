//! Corrective rebalancing after a removal.
//!
//! A rebalance runs a mesh pass and then a material pass. Each pass makes at
//! most one swap, so a single removal triggers at most two reassignments.
//! The mesh pass runs first because, when both dimensions are short, one
//! donor from the right material repairs both deficits with one move.
//!
//! The heuristic is greedy: donors are the first qualifying pairs in
//! declared order. A pass that finds no donor reports
//! [`PassOutcome::NoDonor`] and leaves earlier swaps in place.
use tracing::{debug, warn};

use crate::balance::BalanceEngine;
use crate::descriptor::{DescriptorPair, MaterialKind, MeshKind};
use crate::error::Result;
use crate::events::{BalanceEvent, BalanceEventKind, EventSink};
use crate::pool::InstanceHandle;

/// Fair-share floor per kind for the current total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceThresholds {
    pub min_per_mesh: usize,
    pub min_per_material: usize,
}

/// Descriptor dimension corrected by a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Mesh,
    Material,
}

/// Result of a single rebalance pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The target kind already held its fair share.
    Satisfied,
    /// The dimension has at most one kind, so there is nothing to balance.
    Vacuous,
    /// One instance was moved.
    Swapped {
        from: DescriptorPair,
        to: DescriptorPair,
        handle: InstanceHandle,
    },
    /// The target was short but no pair could donate.
    NoDonor,
}

impl PassOutcome {
    pub fn is_swap(&self) -> bool {
        matches!(self, PassOutcome::Swapped { .. })
    }
}

/// Outcome of both passes of one rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceReport {
    pub thresholds: BalanceThresholds,
    pub mesh_pass: PassOutcome,
    pub material_pass: PassOutcome,
}

impl RebalanceReport {
    fn noop(thresholds: BalanceThresholds) -> Self {
        Self {
            thresholds,
            mesh_pass: PassOutcome::Vacuous,
            material_pass: PassOutcome::Vacuous,
        }
    }

    /// Number of instances moved (0, 1 or 2).
    pub fn swaps(&self) -> usize {
        usize::from(self.mesh_pass.is_swap()) + usize::from(self.material_pass.is_swap())
    }

    pub fn donor_search_failed(&self) -> bool {
        self.mesh_pass == PassOutcome::NoDonor || self.material_pass == PassOutcome::NoDonor
    }

    /// True when neither pass was left short.
    pub fn is_balanced(&self) -> bool {
        !self.donor_search_failed()
    }
}

impl BalanceEngine {
    /// Thresholds for the current total. Zero-sized dimensions yield zero.
    pub fn thresholds(&self) -> BalanceThresholds {
        let total = self.total();
        let meshes = self.space().mesh_count();
        let materials = self.space().material_count();
        BalanceThresholds {
            min_per_mesh: total.checked_div(meshes).unwrap_or(0),
            min_per_material: total.checked_div(materials).unwrap_or(0),
        }
    }

    /// Removes one instance from `pair` (the most recent when `index` is
    /// `None`) and restores balance around it.
    ///
    /// A failed removal returns the error without touching the engine.
    pub fn remove_and_rebalance(
        &mut self,
        pair: DescriptorPair,
        index: Option<usize>,
    ) -> Result<RebalanceReport> {
        self.remove_and_rebalance_with_events(pair, index, &mut ())
    }

    pub fn remove_and_rebalance_with_events(
        &mut self,
        pair: DescriptorPair,
        index: Option<usize>,
        sink: &mut dyn EventSink,
    ) -> Result<RebalanceReport> {
        let removed = self.remove_instance(pair, index)?;
        if sink.wants(BalanceEventKind::InstanceRemoved) {
            sink.send(BalanceEvent::InstanceRemoved {
                pair,
                handle: removed.handle,
            });
        }
        Ok(self.rebalance_with_events(pair, sink))
    }

    /// Runs the mesh pass then the material pass for `target`.
    ///
    /// On a balanced state this is a no-op.
    pub fn rebalance(&mut self, target: DescriptorPair) -> RebalanceReport {
        self.rebalance_with_events(target, &mut ())
    }

    pub fn rebalance_with_events(
        &mut self,
        target: DescriptorPair,
        sink: &mut dyn EventSink,
    ) -> RebalanceReport {
        let thresholds = self.thresholds();
        if self.space().mesh_count() == 0 || self.space().material_count() == 0 {
            return RebalanceReport::noop(thresholds);
        }

        let mesh_pass = self.balance_meshes(target, thresholds);
        report_pass(sink, Dimension::Mesh, mesh_pass);
        let material_pass = self.balance_materials(target.material, thresholds);
        report_pass(sink, Dimension::Material, material_pass);

        RebalanceReport {
            thresholds,
            mesh_pass,
            material_pass,
        }
    }

    fn balance_meshes(&mut self, target: DescriptorPair, t: BalanceThresholds) -> PassOutcome {
        if self.space().mesh_count() <= 1 {
            return PassOutcome::Vacuous;
        }
        let removed_mesh: MeshKind = target.mesh;
        let removed_material: MaterialKind = target.material;

        if self.count_mesh(removed_mesh) >= t.min_per_mesh {
            return PassOutcome::Satisfied;
        }

        let materials_balanced = self.count_material(removed_material) >= t.min_per_material;

        let Some(donor) = self.find_mesh_donor(removed_mesh, t.min_per_mesh) else {
            warn!(
                "No mesh donor for {} (count {}, min {}).",
                removed_mesh,
                self.count_mesh(removed_mesh),
                t.min_per_mesh
            );
            return PassOutcome::NoDonor;
        };

        // Taking the donor straight into the short material fixes both
        // dimensions at once, provided the donor material can spare one.
        let receiver = if !materials_balanced
            && self.count_material(donor.material) > t.min_per_material
            && self.is_registered(target)
        {
            target
        } else {
            DescriptorPair::new(removed_mesh, donor.material)
        };

        self.apply_swap(donor, receiver)
    }

    fn balance_materials(&mut self, removed: MaterialKind, t: BalanceThresholds) -> PassOutcome {
        if self.space().material_count() <= 1 {
            return PassOutcome::Vacuous;
        }
        if self.count_material(removed) >= t.min_per_material {
            return PassOutcome::Satisfied;
        }

        let Some(donor) = self.find_material_donor(removed, t.min_per_material) else {
            warn!(
                "No material donor for {} (count {}, min {}).",
                removed,
                self.count_material(removed),
                t.min_per_material
            );
            return PassOutcome::NoDonor;
        };

        self.apply_swap(donor, DescriptorPair::new(donor.mesh, removed))
    }

    fn apply_swap(&mut self, from: DescriptorPair, to: DescriptorPair) -> PassOutcome {
        match self.swap_instance(from, to) {
            Ok(handle) => {
                debug!("Moved instance {:?} from {} to {}.", handle, from, to);
                PassOutcome::Swapped { from, to, handle }
            }
            Err(err) => {
                // Donor search only returns non-empty, registered pairs.
                warn!("Swap from {} to {} failed: {}", from, to, err);
                PassOutcome::NoDonor
            }
        }
    }
}

fn report_pass(sink: &mut dyn EventSink, dimension: Dimension, outcome: PassOutcome) {
    if let PassOutcome::Swapped { from, to, handle } = outcome {
        if sink.wants(BalanceEventKind::InstanceMoved) {
            sink.send(BalanceEvent::InstanceMoved { from, to, handle });
        }
    }
    if sink.wants(BalanceEventKind::PassFinished) {
        sink.send(BalanceEvent::PassFinished { dimension, outcome });
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    use super::*;
    use crate::balance::test_support::{engine, fill, pair};
    use crate::descriptor::DescriptorSpace;
    use crate::error::Error;
    use crate::events::VecSink;

    fn mesh_spread(e: &BalanceEngine) -> usize {
        let counts: Vec<_> = e.space().meshes().map(|m| e.count_mesh(m)).collect();
        counts.iter().max().unwrap() - counts.iter().min().unwrap()
    }

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
    fn thresholds_floor_the_share() {
        let mut e = engine(2, 3);
        fill(&mut e, &[&[3, 2, 2], &[0, 0, 0]]);
        assert_eq!(
            e.thresholds(),
            BalanceThresholds {
                min_per_mesh: 3,
                min_per_material: 2
            }
        );
    }

    #[test]
    fn rebalance_without_removal_is_noop() {
        let mut e = engine(2, 2);
        fill(&mut e, &[&[2, 2], &[2, 2]]);
        let before: Vec<_> = e.iter_pools().map(|(_, p)| p.len()).collect();
        let report = e.rebalance(pair(0, 0));
        assert_eq!(report.swaps(), 0);
        assert_eq!(report.mesh_pass, PassOutcome::Satisfied);
        assert_eq!(report.material_pass, PassOutcome::Satisfied);
        let after: Vec<_> = e.iter_pools().map(|(_, p)| p.len()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn balanced_start_single_removal_stays_within_one() {
        let mut e = engine(2, 2);
        fill(&mut e, &[&[2, 2], &[2, 2]]);

        let report = e.remove_and_rebalance(pair(0, 0), None).unwrap();

        assert_eq!(e.total(), 7);
        assert_eq!(report.thresholds.min_per_mesh, 3);
        assert_eq!(e.count_mesh(MeshKind(0)) + e.count_mesh(MeshKind(1)), 7);
        assert!(mesh_spread(&e) <= 1);
        assert!(report.swaps() <= 2);
        assert!(e.verify_counters());
    }

    #[test]
    fn mesh_pass_moves_donor_keeping_material() {
        let mut e = engine(2, 1);
        fill(&mut e, &[&[1], &[3]]);

        let report = e.remove_and_rebalance(pair(0, 0), None).unwrap();

        assert_eq!(report.material_pass, PassOutcome::Vacuous);
        assert!(matches!(
            report.mesh_pass,
            PassOutcome::Swapped { from, to, .. } if from == pair(1, 0) && to == pair(0, 0)
        ));
        assert_eq!(e.count_mesh(MeshKind(0)), 1);
        assert_eq!(e.count_mesh(MeshKind(1)), 2);
    }

    #[test]
    fn one_swap_repairs_both_dimensions() {
        let mut e = engine(2, 2);
        fill(&mut e, &[&[1, 0], &[0, 3]]);

        let report = e.remove_and_rebalance(pair(0, 0), None).unwrap();

        assert_eq!(report.swaps(), 1);
        assert!(matches!(
            report.mesh_pass,
            PassOutcome::Swapped { from, to, .. } if from == pair(1, 1) && to == pair(0, 0)
        ));
        assert_eq!(report.material_pass, PassOutcome::Satisfied);
        assert_eq!(e.count_pair(pair(0, 0)), 1);
        assert_eq!(e.count_pair(pair(1, 1)), 2);
        assert_thresholds_hold(&e);
    }

    #[test]
    fn mesh_pass_keeps_donor_material_when_it_cannot_spare() {
        let mut e = engine(2, 3);
        fill(&mut e, &[&[1, 0, 0], &[0, 1, 4]]);

        let report = e.remove_and_rebalance(pair(0, 0), None).unwrap();

        // total 5: min mesh 2, min material 1. The first donor (b, y) sits at
        // the material floor, so it keeps its material.
        assert_eq!(report.thresholds.min_per_mesh, 2);
        assert!(matches!(
            report.mesh_pass,
            PassOutcome::Swapped { from, to, .. } if from == pair(1, 1) && to == pair(0, 1)
        ));
        assert!(matches!(
            report.material_pass,
            PassOutcome::Swapped { from, to, .. } if from == pair(1, 2) && to == pair(1, 0)
        ));
        assert_eq!(report.swaps(), 2);
        // One swap per pass: mesh a gained one but is still below its floor.
        assert_eq!(e.count_mesh(MeshKind(0)), 1);
        for k in e.space().materials() {
            assert!(e.count_material(k) >= 1);
        }
        assert!(e.verify_counters());
    }

    #[test]
    fn material_pass_alone_when_single_mesh() {
        let mut e = engine(1, 2);
        fill(&mut e, &[&[1, 3]]);

        let report = e.remove_and_rebalance(pair(0, 0), None).unwrap();

        assert_eq!(report.mesh_pass, PassOutcome::Vacuous);
        assert!(matches!(
            report.material_pass,
            PassOutcome::Swapped { from, to, .. } if from == pair(0, 1) && to == pair(0, 0)
        ));
        assert_eq!(e.count_material(MaterialKind(0)), 1);
        assert_eq!(e.count_material(MaterialKind(1)), 2);
    }

    #[test]
    fn single_kind_dimensions_are_vacuous() {
        let mut e = engine(1, 1);
        fill(&mut e, &[&[3]]);
        let report = e.remove_and_rebalance(pair(0, 0), None).unwrap();
        assert_eq!(report.mesh_pass, PassOutcome::Vacuous);
        assert_eq!(report.material_pass, PassOutcome::Vacuous);
        assert_eq!(e.total(), 2);
    }

    #[test]
    fn removing_sole_instance_makes_no_further_moves() {
        let mut e = engine(5, 1);
        fill(&mut e, &[&[1], &[0], &[0], &[0], &[0]]);

        let report = e.remove_and_rebalance(pair(0, 0), None).unwrap();

        assert_eq!(e.total(), 0);
        assert_eq!(report.swaps(), 0);
        assert_eq!(report.thresholds, BalanceThresholds::default());
        assert!(e.verify_counters());
    }

    #[test]
    fn missing_receiver_pool_reports_no_donor() {
        let space = DescriptorSpace::new(["a"], ["x", "y"]).unwrap();
        let mut e = BalanceEngine::new(space);
        e.register_pair(pair(0, 1)).unwrap();
        fill(&mut e, &[&[0, 3]]);

        // x is short (0 < 1) but (a, x) has no pool to receive into
        let report = e.rebalance(pair(0, 0));
        assert_eq!(report.material_pass, PassOutcome::NoDonor);
        assert!(report.donor_search_failed());
        assert!(!report.is_balanced());
        assert_eq!(e.total(), 3);
        assert!(e.verify_counters());
    }

    #[test]
    fn failed_removal_does_not_rebalance() {
        let mut e = engine(2, 2);
        fill(&mut e, &[&[0, 1], &[1, 0]]);
        let err = e.remove_and_rebalance(pair(0, 0), None).unwrap_err();
        assert!(matches!(err, Error::EmptyPool { .. }));
        assert_eq!(e.total(), 2);
    }

    #[test]
    fn events_report_removal_moves_and_passes() {
        let mut e = engine(2, 2);
        fill(&mut e, &[&[1, 0], &[0, 3]]);
        let mut sink = VecSink::new();

        e.remove_and_rebalance_with_events(pair(0, 0), None, &mut sink)
            .unwrap();

        assert_eq!(sink.count_of(BalanceEventKind::InstanceRemoved), 1);
        assert_eq!(sink.count_of(BalanceEventKind::InstanceMoved), 1);
        assert_eq!(sink.count_of(BalanceEventKind::PassFinished), 2);
    }

    #[test]
    fn random_strikes_keep_counters_and_thresholds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut e = engine(3, 4);
        fill(&mut e, &[&[3, 3, 3, 3], &[3, 3, 3, 3], &[3, 3, 3, 3]]);

        for _ in 0..30 {
            let pairs: Vec<_> = e
                .iter_pools()
                .filter(|(_, p)| !p.is_empty())
                .map(|(pair, p)| (pair, p.len()))
                .collect();
            if pairs.is_empty() {
                break;
            }
            let (target, len) = pairs[rng.next_u32() as usize % pairs.len()];
            let index = rng.next_u32() as usize % len;

            let report = e.remove_and_rebalance(target, Some(index)).unwrap();

            assert!(report.swaps() <= 2);
            assert!(!report.donor_search_failed());
            assert!(e.verify_counters());
            assert!(
                e.count_mesh(target.mesh) >= report.thresholds.min_per_mesh
                    && e.count_material(target.material) >= report.thresholds.min_per_material
            );
        }
    }
}
