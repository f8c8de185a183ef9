#![forbid(unsafe_code)]
//! shape_balance: keeps a population of mesh/material instances balanced.
//!
//! Modules:
//! - descriptor: mesh and material kinds, pairs, and the fixed descriptor space
//! - pool: instance handles, transforms, and per-pair pools
//! - balance: the engine with incremental counters, donor search, and rebalance passes
//! - sampling: transform sampling inside a bounding box
//! - spawn: configuration, initial distribution, spawner, tooltips
//! - events: observable balance events and sinks
//!
//! For examples, see the `shape_balance_examples` crate.
pub mod balance;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod pool;
pub mod sampling;
pub mod spawn;

/// Convenient re-exports for common types. Import with `use shape_balance::prelude::*;`.
pub mod prelude {
    pub use crate::balance::{
        BalanceEngine, BalanceThresholds, Dimension, PassOutcome, RebalanceReport,
    };
    pub use crate::descriptor::{DescriptorPair, DescriptorSpace, MaterialKind, MeshKind};
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        BalanceEvent, BalanceEventKind, EventSink, FnSink, MultiSink, VecSink,
    };
    pub use crate::pool::{Instance, InstanceHandle, InstancePool, InstanceTransform};
    pub use crate::sampling::{BoundingBox, BoxTransformSampling, ScaleRange, TransformSampling};
    pub use crate::spawn::config::SpawnerConfig;
    pub use crate::spawn::distributor::{
        DistributionPolicy, DistributionSummary, InitialDistributor,
    };
    pub use crate::spawn::selection::{correction_targets, pick_random_pair, remainder_pairs};
    pub use crate::spawn::spawner::ShapeSpawner;
    pub use crate::spawn::tooltip::format_tooltip;
}
