//! Uniform transform sampling inside an axis-aligned box.
use glam::Vec3;
use mint::Vector3;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::pool::InstanceTransform;
use crate::sampling::{next_down, rand01, TransformSampling};

/// Axis-aligned placement volume.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub center: Vec3,
    pub half_extent: Vec3,
}

impl BoundingBox {
    pub fn new(center: impl Into<Vec3>, half_extent: impl Into<Vec3>) -> Self {
        Self {
            center: center.into(),
            half_extent: half_extent.into(),
        }
    }

    /// Box spanning two corners, in either order.
    pub fn from_corners(a: impl Into<Vec3>, b: impl Into<Vec3>) -> Self {
        let (a, b) = (a.into(), b.into());
        let min = a.min(b);
        let max = a.max(b);
        Self {
            center: (min + max) * 0.5,
            half_extent: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extent
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extent
    }

    /// Half-open containment: `min <= p < max` on every axis.
    pub fn contains(&self, p: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        p.cmpge(min).all() && p.cmplt(max).all()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center.is_finite() || !self.half_extent.is_finite() {
            return Err(Error::InvalidConfig("bounding box must be finite".into()));
        }
        if self.half_extent.cmple(Vec3::ZERO).any() {
            return Err(Error::InvalidConfig(
                "bounding box half extent must be > 0 in all components".into(),
            ));
        }
        Ok(())
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            half_extent: Vec3::splat(512.0),
        }
    }
}

/// Inclusive per-axis scale range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleRange {
    pub min: Vec3,
    pub max: Vec3,
}

impl ScaleRange {
    pub fn new(min: impl Into<Vec3>, max: impl Into<Vec3>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn uniform(min: f32, max: f32) -> Self {
        Self::new(Vec3::splat(min), Vec3::splat(max))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::InvalidConfig("scale range must be finite".into()));
        }
        if self.min.cmpgt(self.max).any() {
            return Err(Error::InvalidConfig(
                "min_scale must be <= max_scale in all components".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self::uniform(0.75, 1.25)
    }
}

/// Uniform i.i.d. position in a box with an independent uniform scale per axis.
#[derive(Debug, Clone, Default)]
pub struct BoxTransformSampling {
    pub bounds: BoundingBox,
    pub scale: ScaleRange,
}

impl BoxTransformSampling {
    pub fn new(bounds: BoundingBox, scale: ScaleRange) -> Self {
        Self { bounds, scale }
    }

    /// Uniform point in the box, strictly below the max faces.
    pub fn sample_position(&self, rng: &mut dyn RngCore) -> Vector3<f32> {
        let min = self.bounds.min();
        let max = self.bounds.max();
        let size = max - min;

        let mut p = Vec3::new(
            min.x + rand01(rng) * size.x,
            min.y + rand01(rng) * size.y,
            min.z + rand01(rng) * size.z,
        );
        // rand01 can round up to 1.0; keep strictly inside the max faces.
        p.x = p.x.clamp(min.x, next_down(max.x).max(min.x));
        p.y = p.y.clamp(min.y, next_down(max.y).max(min.y));
        p.z = p.z.clamp(min.z, next_down(max.z).max(min.z));
        p.into()
    }

    /// Uniform scale in `[min, max]` per axis.
    pub fn sample_scale(&self, rng: &mut dyn RngCore) -> Vector3<f32> {
        let ScaleRange { min, max } = self.scale;
        let s = Vec3::new(
            lerp(min.x, max.x, rand01(rng)),
            lerp(min.y, max.y, rand01(rng)),
            lerp(min.z, max.z, rand01(rng)),
        );
        s.clamp(min, max).into()
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl TransformSampling for BoxTransformSampling {
    fn sample(&self, rng: &mut dyn RngCore) -> InstanceTransform {
        let position = self.sample_position(rng).into();
        let scale = self.sample_scale(rng).into();
        InstanceTransform { position, scale }
    }
}
