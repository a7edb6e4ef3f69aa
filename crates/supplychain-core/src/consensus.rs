//! Longest-valid-chain conflict resolution.
//!
//! Fetching peer chains is the caller's job; this module only decides
//! whether one of the fetched snapshots replaces the local ledger.

use serde::Serialize;
use tracing::{info, warn};

use crate::{validate::validate_chain, ChainSnapshot, Ledger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// A strictly longer valid chain was adopted with its pending pool.
    Replaced {
        previous_length: usize,
        length: usize,
    },
    /// No candidate was strictly longer than the local chain.
    NoLongerChain { length: usize },
    /// The longest candidate failed validation; local state kept.
    InvalidCandidate {
        length: usize,
        candidate_length: usize,
    },
}

impl Resolution {
    pub fn replaced(&self) -> bool {
        matches!(self, Resolution::Replaced { .. })
    }
}

/// Picks the longest candidate strictly longer than `local_len`. Equal
/// lengths are broken by the lexicographically smallest tip hash, so the
/// choice does not depend on the order peers answered in.
pub fn select_candidate(local_len: usize, candidates: &[ChainSnapshot]) -> Option<&ChainSnapshot> {
    select_index(local_len, candidates).map(|i| &candidates[i])
}

fn select_index(local_len: usize, candidates: &[ChainSnapshot]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.chain.len() > local_len)
        .min_by(|(_, a), (_, b)| {
            b.chain
                .len()
                .cmp(&a.chain.len())
                .then_with(|| a.tip_hash().cmp(&b.tip_hash()))
        })
        .map(|(i, _)| i)
}

/// Applies the longest-valid-chain rule to `candidates`. The local chain is
/// only ever replaced by a valid, strictly longer one, so its length never
/// decreases.
pub fn resolve(ledger: &mut Ledger, mut candidates: Vec<ChainSnapshot>) -> Resolution {
    let length = ledger.len();
    let Some(selected) = select_index(length, &candidates) else {
        info!(length, peers = candidates.len(), "local chain kept, no longer candidate");
        return Resolution::NoLongerChain { length };
    };
    let candidate = candidates.swap_remove(selected);
    let candidate_length = candidate.chain.len();

    if let Err(err) = validate_chain(&candidate.chain) {
        warn!(length, candidate_length, %err, "local chain kept, longest candidate is invalid");
        return Resolution::InvalidCandidate {
            length,
            candidate_length,
        };
    }

    ledger.replace_chain(candidate.chain, candidate.pending_transactions);
    info!(previous_length = length, length = candidate_length, "local chain replaced");
    Resolution::Replaced {
        previous_length: length,
        length: candidate_length,
    }
}
