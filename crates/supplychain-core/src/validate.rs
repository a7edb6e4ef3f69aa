//! All-or-nothing validation of a candidate chain received from a peer.

use tracing::debug;

use crate::{error::ChainError, hash::hash_block, pow::meets_difficulty, Block};

/// Checks the genesis shape, then for every later block: its index matches
/// its 1-based position, it links to its predecessor's hash, and its stored
/// hash equals the recomputed proof-of-work hash and meets the difficulty.
pub fn validate_chain(chain: &[Block]) -> Result<(), ChainError> {
    let genesis = chain.first().ok_or(ChainError::Empty)?;
    if !genesis.is_genesis() {
        return Err(ChainError::GenesisMismatch);
    }

    for (offset, pair) in chain.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);
        let position = offset + 2;
        if block.index != position as u64 {
            return Err(ChainError::IndexOutOfSequence {
                position,
                index: block.index,
            });
        }
        if block.previous_block_hash != previous.hash {
            return Err(ChainError::BrokenLink { index: block.index });
        }
        let computed = hash_block(&previous.hash, block.nonce, &block.data()).map_err(|e| {
            ChainError::Encoding {
                index: block.index,
                reason: e.to_string(),
            }
        })?;
        if computed != block.hash {
            return Err(ChainError::HashMismatch { index: block.index });
        }
        if !meets_difficulty(&computed) {
            return Err(ChainError::InsufficientWork { index: block.index });
        }
    }
    Ok(())
}

pub fn is_valid(chain: &[Block]) -> bool {
    match validate_chain(chain) {
        Ok(()) => true,
        Err(err) => {
            debug!(length = chain.len(), %err, "candidate chain is invalid");
            false
        }
    }
}
