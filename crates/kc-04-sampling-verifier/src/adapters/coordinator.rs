//! Filters backed by the transmission coordinator.

use std::sync::Arc;

use kc_03_transmission_coordinator::TransmissionApi;
use shared_types::UpkeepKey;

use crate::ports::outbound::UpkeepFilter;

/// Keeps only keys whose identifier the coordinator has not locked.
pub struct CoordinatorFilter<T> {
    coordinator: Arc<T>,
}

impl<T> CoordinatorFilter<T> {
    pub fn new(coordinator: Arc<T>) -> Self {
        Self { coordinator }
    }
}

impl<T> UpkeepFilter for CoordinatorFilter<T>
where
    T: TransmissionApi,
{
    fn is_eligible(&self, key: &UpkeepKey) -> bool {
        self.coordinator.is_eligible(key)
    }
}

/// Wraps a plain predicate, e.g. `TransmissionCoordinator::filter()`.
pub struct FnFilter<F>(pub F);

impl<F> UpkeepFilter for FnFilter<F>
where
    F: Fn(&UpkeepKey) -> bool + Send + Sync,
{
    fn is_eligible(&self, key: &UpkeepKey) -> bool {
        (self.0)(key)
    }
}
