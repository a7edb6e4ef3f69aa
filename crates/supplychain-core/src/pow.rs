use tracing::debug;

use crate::{constants::POW_PREFIX, hash::hash_encoded, BlockData};

pub fn meets_difficulty(hash: &str) -> bool {
    hash.starts_with(POW_PREFIX)
}

/// Sequential search from nonce 0 for the first nonce whose block hash meets
/// the difficulty. Deterministic for identical inputs.
pub fn solve(previous_hash: &str, data: &BlockData<'_>) -> Result<u64, serde_json::Error> {
    let encoded = data.canonical_json()?;
    let mut nonce = 0u64;
    while !meets_difficulty(&hash_encoded(previous_hash, nonce, &encoded)) {
        nonce += 1;
    }
    debug!(index = data.index, nonce, "proof of work found");
    Ok(nonce)
}
