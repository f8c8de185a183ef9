//! Donor search and least-populated queries.
//!
//! Searches walk registered pairs in declared order and stop at the first
//! match, so results are deterministic for a given state but not chosen for
//! any global optimum.
use crate::balance::BalanceEngine;
use crate::descriptor::{DescriptorPair, MaterialKind, MeshKind};

impl BalanceEngine {
    /// First registered pair, in declared order, for which `condition`
    /// holds. The condition receives the pair and its current pool size.
    pub fn find_matching<F>(&self, mut condition: F) -> Option<DescriptorPair>
    where
        F: FnMut(DescriptorPair, usize) -> bool,
    {
        self.iter_pools()
            .find(|(pair, pool)| condition(*pair, pool.len()))
            .map(|(pair, _)| pair)
    }

    /// Donor for the mesh pass: a non-empty pool of another mesh whose mesh
    /// count exceeds `min_per_mesh`, such that the receiving pool
    /// `(receiver, donor material)` exists.
    pub fn find_mesh_donor(&self, receiver: MeshKind, min_per_mesh: usize) -> Option<DescriptorPair> {
        self.find_matching(|pair, count| {
            pair.mesh != receiver
                && count > 0
                && self.count_mesh(pair.mesh) > min_per_mesh
                && self.is_registered(DescriptorPair::new(receiver, pair.material))
        })
    }

    /// Donor for the material pass. Materials are tried in declared order,
    /// then meshes; the receiving pool `(donor mesh, receiver)` must exist.
    pub fn find_material_donor(
        &self,
        receiver: MaterialKind,
        min_per_material: usize,
    ) -> Option<DescriptorPair> {
        let space = self.space();
        space
            .materials()
            .filter(|&k| k != receiver && self.count_material(k) > min_per_material)
            .find_map(|k| {
                space
                    .meshes()
                    .map(|m| DescriptorPair::new(m, k))
                    .find(|&donor| {
                        self.count_pair(donor) > 0
                            && self.is_registered(DescriptorPair::new(donor.mesh, receiver))
                    })
            })
    }

    /// Every mesh holding the minimum mesh count, in declared order.
    pub fn least_populated_meshes(&self) -> Vec<MeshKind> {
        let Some(min) = self.space().meshes().map(|m| self.count_mesh(m)).min() else {
            return Vec::new();
        };
        self.space()
            .meshes()
            .filter(|&m| self.count_mesh(m) == min)
            .collect()
    }

    /// Every material holding the minimum material count, in declared order.
    pub fn least_populated_materials(&self) -> Vec<MaterialKind> {
        let Some(min) = self
            .space()
            .materials()
            .map(|k| self.count_material(k))
            .min()
        else {
            return Vec::new();
        };
        self.space()
            .materials()
            .filter(|&k| self.count_material(k) == min)
            .collect()
    }
}
