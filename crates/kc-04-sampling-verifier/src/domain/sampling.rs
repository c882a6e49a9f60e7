//! Sampling and batching of active upkeep keys.

use rand::seq::SliceRandom;
use rand::Rng;

use shared_types::UpkeepKey;

use crate::ports::outbound::RatioPolicy;

/// Shuffle `keys` and keep the first `ratio.of_int(len)` of them.
pub fn sample_keys<R>(mut keys: Vec<UpkeepKey>, ratio: &dyn RatioPolicy, rng: &mut R) -> Vec<UpkeepKey>
where
    R: Rng + ?Sized,
{
    let size = ratio.of_int(keys.len()).min(keys.len());
    keys.shuffle(rng);
    keys.truncate(size);
    keys
}

/// Split `keys` into batches of at most `size` keys.
pub fn batch_keys(keys: Vec<UpkeepKey>, size: usize) -> Vec<Vec<UpkeepKey>> {
    keys.chunks(size.max(1)).map(<[UpkeepKey]>::to_vec).collect()
}
