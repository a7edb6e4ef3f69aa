use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use supplychain_core::{Ledger, PeerRegistry};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::network::PeerClient;

/// Shared node state. The ledger mutex is the single-writer gate for every
/// admit, seal, accept and replace; guards are never held across a peer call.
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<Mutex<Ledger>>,
    registry: Arc<RwLock<PeerRegistry>>,
    pub peers: PeerClient,
}

impl AppState {
    pub fn new(own_url: &str, peers: PeerClient) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(Ledger::new())),
            registry: Arc::new(RwLock::new(PeerRegistry::new(own_url))),
            peers,
        }
    }

    /// Waits for the ledger without tying up a runtime worker; mining holds
    /// the lock for a whole proof-of-work search.
    pub async fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().await
    }

    /// Owned guard that can be moved into a blocking task.
    pub async fn ledger_owned(&self) -> OwnedMutexGuard<Ledger> {
        Arc::clone(&self.ledger).lock_owned().await
    }

    pub fn registry(&self) -> RwLockReadGuard<'_, PeerRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn registry_mut(&self) -> RwLockWriteGuard<'_, PeerRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}
