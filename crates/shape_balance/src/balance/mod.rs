//! Balance engine: pools, incremental counters, and corrective rebalancing.
//!
//! [`BalanceEngine`] owns one [`InstancePool`] per registered
//! [`DescriptorPair`] together with counters per mesh, per material, and in
//! total. Counters are updated on every add and remove and are never rebuilt
//! by scanning pools. The corrective passes live in [`rebalance`], donor search
//! and least-populated queries in [`donor`].
use std::collections::HashMap;

use crate::descriptor::{DescriptorPair, DescriptorSpace, MaterialKind, MeshKind};
use crate::error::{Error, Result};
use crate::pool::{Instance, InstanceHandle, InstancePool, InstanceTransform};

pub mod donor;
pub mod rebalance;

pub use rebalance::{BalanceThresholds, Dimension, PassOutcome, RebalanceReport};

/// Owns all pools and the counters derived from them.
#[derive(Debug, Clone)]
pub struct BalanceEngine {
    space: DescriptorSpace,
    pools: HashMap<DescriptorPair, InstancePool>,
    mesh_counts: Vec<usize>,
    material_counts: Vec<usize>,
    total: usize,
    next_handle: u64,
}

impl BalanceEngine {
    /// Creates an engine with no registered pools.
    pub fn new(space: DescriptorSpace) -> Self {
        let mesh_counts = vec![0; space.mesh_count()];
        let material_counts = vec![0; space.material_count()];
        Self {
            pools: HashMap::with_capacity(space.pair_count()),
            space,
            mesh_counts,
            material_counts,
            total: 0,
            next_handle: 0,
        }
    }

    /// Creates an engine and registers a pool for every pair of `space`.
    pub fn with_all_pairs(space: DescriptorSpace) -> Self {
        let mut engine = Self::new(space);
        engine.register_all();
        engine
    }

    pub fn space(&self) -> &DescriptorSpace {
        &self.space
    }

    /// Registers the pool for `pair`. Each pair may be registered once.
    pub fn register_pair(&mut self, pair: DescriptorPair) -> Result<()> {
        if !self.space.contains(pair) {
            return Err(Error::UnknownKind {
                name: pair.to_string(),
            });
        }
        if self.pools.contains_key(&pair) {
            return Err(Error::DuplicatePair { pair });
        }
        self.pools.insert(pair, InstancePool::new());
        Ok(())
    }

    /// Registers every pair not yet registered, in declared order.
    pub fn register_all(&mut self) {
        let pairs: Vec<_> = self.space.pairs().collect();
        for pair in pairs {
            self.pools.entry(pair).or_default();
        }
    }

    pub fn is_registered(&self, pair: DescriptorPair) -> bool {
        self.pools.contains_key(&pair)
    }

    pub fn pool(&self, pair: DescriptorPair) -> Option<&InstancePool> {
        self.pools.get(&pair)
    }

    /// Appends an instance to `pair` and bumps every counter it contributes to.
    pub fn add_instance(
        &mut self,
        pair: DescriptorPair,
        transform: InstanceTransform,
    ) -> Result<InstanceHandle> {
        let handle = InstanceHandle(self.next_handle);
        self.push(
            pair,
            Instance {
                handle,
                transform,
            },
        )?;
        self.next_handle += 1;
        Ok(handle)
    }

    /// Removes an instance from `pair`; `None` removes the most recent one.
    pub fn remove_instance(
        &mut self,
        pair: DescriptorPair,
        index: Option<usize>,
    ) -> Result<Instance> {
        let pool = self
            .pools
            .get_mut(&pair)
            .ok_or(Error::UnregisteredPair { pair })?;

        let removed = match index {
            None => pool.pop().ok_or(Error::EmptyPool { pair })?,
            Some(_) if pool.is_empty() => return Err(Error::EmptyPool { pair }),
            Some(i) => {
                let len = pool.len();
                pool.remove(i).ok_or(Error::IndexOutOfRange {
                    pair,
                    index: i,
                    len,
                })?
            }
        };

        self.mesh_counts[pair.mesh.index()] -= 1;
        self.material_counts[pair.material.index()] -= 1;
        self.total -= 1;
        Ok(removed)
    }

    /// Moves the most recent instance of `from` into `to`, keeping its
    /// handle and transform.
    ///
    /// Both pools are checked before anything is mutated, so a failed swap
    /// leaves the engine untouched.
    pub fn swap_instance(
        &mut self,
        from: DescriptorPair,
        to: DescriptorPair,
    ) -> Result<InstanceHandle> {
        if !self.pools.contains_key(&to) {
            return Err(Error::UnregisteredPair { pair: to });
        }
        let instance = self.remove_instance(from, None)?;
        self.push(to, instance)?;
        Ok(instance.handle)
    }

    fn push(&mut self, pair: DescriptorPair, instance: Instance) -> Result<()> {
        let pool = self
            .pools
            .get_mut(&pair)
            .ok_or(Error::UnregisteredPair { pair })?;
        pool.push(instance);
        self.mesh_counts[pair.mesh.index()] += 1;
        self.material_counts[pair.material.index()] += 1;
        self.total += 1;
        Ok(())
    }

    /// Instance count of one pair; zero for unregistered pairs.
    #[inline]
    pub fn count_pair(&self, pair: DescriptorPair) -> usize {
        self.pools.get(&pair).map_or(0, InstancePool::len)
    }

    #[inline]
    pub fn count_mesh(&self, mesh: MeshKind) -> usize {
        self.mesh_counts.get(mesh.index()).copied().unwrap_or(0)
    }

    #[inline]
    pub fn count_material(&self, material: MaterialKind) -> usize {
        self.material_counts.get(material.index()).copied().unwrap_or(0)
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Looks up one instance by pair and index.
    pub fn instance(&self, pair: DescriptorPair, index: usize) -> Option<&Instance> {
        self.pools.get(&pair)?.get(index)
    }

    /// Registered pairs with their pools, in declared order.
    pub fn iter_pools(&self) -> impl Iterator<Item = (DescriptorPair, &InstancePool)> + '_ {
        self.space
            .pairs()
            .filter_map(move |pair| self.pools.get(&pair).map(|pool| (pair, pool)))
    }

    /// Rebuilds every counter from the pools and compares it with the
    /// incremental state. Diagnostic only; normal operation never scans.
    pub fn verify_counters(&self) -> bool {
        let mut meshes = vec![0usize; self.mesh_counts.len()];
        let mut materials = vec![0usize; self.material_counts.len()];
        let mut total = 0usize;
        for (pair, pool) in &self.pools {
            meshes[pair.mesh.index()] += pool.len();
            materials[pair.material.index()] += pool.len();
            total += pool.len();
        }
        meshes == self.mesh_counts
            && materials == self.material_counts
            && total == self.total
            && self.mesh_counts.iter().sum::<usize>() == self.total
            && self.material_counts.iter().sum::<usize>() == self.total
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn pair(m: u16, k: u16) -> DescriptorPair {
        DescriptorPair::new(MeshKind(m), MaterialKind(k))
    }

    pub fn engine(meshes: usize, materials: usize) -> BalanceEngine {
        let space = DescriptorSpace::new(
            (0..meshes).map(|i| format!("mesh_{i}")),
            (0..materials).map(|i| format!("MI_mat_{i}")),
        )
        .unwrap();
        BalanceEngine::with_all_pairs(space)
    }

    /// Fills pools so that `counts[m][k]` instances exist for every pair.
    pub fn fill(engine: &mut BalanceEngine, counts: &[&[usize]]) {
        for (m, row) in counts.iter().enumerate() {
            for (k, &n) in row.iter().enumerate() {
                for i in 0..n {
                    let t = InstanceTransform::from_position(glam::Vec3::new(
                        m as f32,
                        k as f32,
                        i as f32,
                    ));
                    engine.add_instance(pair(m as u16, k as u16), t).unwrap();
                }
            }
        }
    }
}
