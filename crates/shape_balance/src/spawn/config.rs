//! Setup configuration for a [`crate::spawn::spawner::ShapeSpawner`].
use glam::Vec3;

use crate::descriptor::DescriptorSpace;
use crate::error::{Error, Result};
use crate::sampling::{BoundingBox, BoxTransformSampling, ScaleRange};
use crate::spawn::distributor::{DistributionPolicy, InitialDistributor};

/// Everything a spawner needs before first use. Changing it afterwards is
/// not supported; build a new spawner instead.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpawnerConfig {
    /// Mesh kind names in declared order.
    pub meshes: Vec<String>,
    /// Material kind names in declared order.
    pub materials: Vec<String>,
    /// Number of instances seeded by the initial distribution.
    pub initial_count: usize,
    /// Lower per-axis scale bound.
    pub min_scale: Vec3,
    /// Upper per-axis scale bound.
    pub max_scale: Vec3,
    /// World-space center of the placement box.
    pub bounds_center: Vec3,
    /// Half size of the placement box.
    pub bounds_half_extent: Vec3,
    /// Remainder placement policy.
    pub policy: DistributionPolicy,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            materials: Vec::new(),
            initial_count: 9,
            min_scale: Vec3::splat(0.75),
            max_scale: Vec3::splat(1.25),
            bounds_center: Vec3::ZERO,
            bounds_half_extent: Vec3::splat(512.0),
            policy: DistributionPolicy::RandomCorrective,
        }
    }
}

impl SpawnerConfig {
    /// Creates a new [`SpawnerConfig`] with the given kinds and defaults elsewhere.
    pub fn new<M, K>(meshes: M, materials: K) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            meshes: meshes.into_iter().map(Into::into).collect(),
            materials: materials.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Sets the initial instance count.
    pub fn with_initial_count(mut self, initial_count: usize) -> Self {
        self.initial_count = initial_count;
        self
    }

    /// Sets the per-axis scale range.
    pub fn with_scale_range(mut self, min_scale: Vec3, max_scale: Vec3) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Sets the placement box from its center and half extent.
    pub fn with_bounds(mut self, center: Vec3, half_extent: Vec3) -> Self {
        self.bounds_center = center;
        self.bounds_half_extent = half_extent;
        self
    }

    /// Sets the remainder placement policy.
    pub fn with_policy(mut self, policy: DistributionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.bounds_center, self.bounds_half_extent)
    }

    pub fn scale_range(&self) -> ScaleRange {
        ScaleRange::new(self.min_scale, self.max_scale)
    }

    pub fn sampler(&self) -> BoxTransformSampling {
        BoxTransformSampling::new(self.bounds(), self.scale_range())
    }

    pub fn distributor(&self) -> InitialDistributor {
        InitialDistributor::new(self.initial_count).with_policy(self.policy)
    }

    /// Builds the descriptor space declared by this configuration.
    pub fn descriptor_space(&self) -> Result<DescriptorSpace> {
        DescriptorSpace::new(self.meshes.iter().cloned(), self.materials.iter().cloned())
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.meshes.is_empty() {
            return Err(Error::InvalidConfig("meshes must not be empty".into()));
        }
        if self.materials.is_empty() {
            return Err(Error::InvalidConfig("materials must not be empty".into()));
        }
        self.descriptor_space()?;
        self.scale_range().validate()?;
        self.bounds().validate()?;
        Ok(())
    }
}
