//! Transform sampling for placing new instances.
//!
//! This module defines the [`TransformSampling`] trait consumed by the
//! distributor and the default [`BoxTransformSampling`] strategy, which draws a
//! uniform position inside an axis-aligned box and a uniform per-axis scale.
//! The balance engine itself never samples.
use rand::RngCore;

use crate::pool::InstanceTransform;

pub mod uniform_box;

pub use uniform_box::{BoundingBox, BoxTransformSampling, ScaleRange};

/// Trait for transform sampling.
pub trait TransformSampling: Send + Sync {
    fn sample(&self, rng: &mut dyn RngCore) -> InstanceTransform;
}

/// Uniform integer in `0..n`. Returns 0 when `n == 0`.
#[inline]
pub(crate) fn rand_index(rng: &mut dyn RngCore, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    ((rand01(rng) * n as f32) as usize).min(n - 1)
}

/// Generate a random float in the range [0, 1].
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Compute the next smaller representable float value.
///
/// Returns a value that is strictly less than the input, useful for
/// ensuring bounds are strictly inside a domain. Handles edge cases
/// safely including very small positive values and zero.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() {
        return f32::NAN;
    }

    if val == f32::NEG_INFINITY {
        return f32::NEG_INFINITY;
    }

    if val == f32::INFINITY {
        return f32::MAX;
    }

    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits.saturating_sub(1))
    } else {
        f32::from_bits(bits.saturating_add(1))
    }
}
