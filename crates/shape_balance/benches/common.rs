use std::time::Duration;

use criterion::{Criterion, Throughput};
use shape_balance::prelude::{BalanceEngine, DescriptorSpace};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Square descriptor space named `mesh_{i}` / `MI_mat_{i}`.
pub fn space(kinds: usize) -> DescriptorSpace {
    DescriptorSpace::new(
        (0..kinds).map(|i| format!("mesh_{i}")),
        (0..kinds).map(|i| format!("MI_mat_{i}")),
    )
    .expect("distinct kind names")
}

pub fn empty_engine(kinds: usize) -> BalanceEngine {
    BalanceEngine::with_all_pairs(space(kinds))
}
