pub(crate) const DEFAULT_LISTEN: &str = "127.0.0.1:3001";
pub(crate) const DEFAULT_PEER_TIMEOUT_MS: u64 = 5_000;
pub(crate) const DEFAULT_MAX_IN_FLIGHT: usize = 16;
