//! Driving Ports (API - Inbound)

use shared_types::UpkeepKey;

use crate::error::CoordinatorResult;

/// Transmission lockout API offered to the reporting layer and the sampler.
pub trait TransmissionApi: Send + Sync {
    /// Lock the key's identifier and record the key as accepted, unconfirmed.
    ///
    /// # Errors
    ///
    /// `CoordinatorError::AlreadySet` if the identifier is already locked or
    /// the key was already accepted.
    fn accept(&self, key: &UpkeepKey) -> CoordinatorResult<()>;

    /// `true` to keep the key, `false` while its identifier is locked.
    fn is_eligible(&self, key: &UpkeepKey) -> bool;

    /// `false` only for a key that was accepted and not yet confirmed.
    fn is_transmission_confirmed(&self, key: &UpkeepKey) -> bool;
}
