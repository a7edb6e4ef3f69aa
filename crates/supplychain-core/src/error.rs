use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger has no blocks")]
    EmptyChain,

    #[error("transaction field `{field}` is missing or blank")]
    InvalidTransaction { field: &'static str },

    #[error("block rejected: {0}")]
    BlockRejected(RejectReason),

    #[error("failed to encode block data: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Why a block offered by a peer was not appended.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("previous hash {got} does not match local tip {expected}")]
    StaleLink { expected: String, got: String },

    #[error("expected index {expected}, got {got}")]
    UnexpectedIndex { expected: u64, got: u64 },

    #[error("stored hash does not match recomputed hash")]
    HashMismatch,

    #[error("hash does not meet the proof-of-work difficulty")]
    InsufficientWork,
}

/// First defect found while validating a candidate chain.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain is empty")]
    Empty,

    #[error("first block is not the genesis block")]
    GenesisMismatch,

    #[error("block at position {position} carries index {index}")]
    IndexOutOfSequence { position: usize, index: u64 },

    #[error("block {index} does not link to its predecessor")]
    BrokenLink { index: u64 },

    #[error("block {index} hash does not match its content")]
    HashMismatch { index: u64 },

    #[error("block {index} hash does not meet the difficulty")]
    InsufficientWork { index: u64 },

    #[error("block {index} data could not be encoded: {reason}")]
    Encoding { index: u64, reason: String },
}
