/// Length of a SHA-256 digest rendered as lowercase hex.
pub const HASH_HEX_SIZE: usize = 64;

/// Every non-genesis block hash must start with this prefix.
pub const POW_PREFIX: &str = "0000";

pub const GENESIS_INDEX: u64 = 1;
pub const GENESIS_NONCE: u64 = 1;
pub const GENESIS_HASH: &str = "0";
pub const GENESIS_PREVIOUS_HASH: &str = "0";
