use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use reqwest::Client;
use serde::Serialize;
use supplychain_core::ChainSnapshot;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

/// Per-peer outcome of a fan-out call. `rejected` peers answered with a 4xx
/// status; `failed` peers could not be reached, timed out or answered 5xx.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FanOutReport {
    pub delivered: usize,
    pub rejected: Vec<String>,
    pub failed: Vec<String>,
}

/// HTTP client for talking to peers. Every request carries a deadline and at
/// most `max_in_flight` requests run at once. One failing peer never affects
/// another.
#[derive(Clone, Debug)]
pub struct PeerClient {
    http: Client,
    max_in_flight: usize,
    failures: Arc<AtomicU64>,
}

impl PeerClient {
    pub fn new(timeout: Duration, max_in_flight: usize) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            max_in_flight: max_in_flight.max(1),
            failures: Arc::default(),
        })
    }

    /// Total failed peer calls since startup.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// POSTs `body` as JSON to `path` on every peer.
    pub async fn post_all<T>(
        &self,
        peers: Vec<String>,
        path: &'static str,
        body: T,
    ) -> FanOutReport
    where
        T: Serialize + Send + Sync + 'static,
    {
        let body = Arc::new(body);
        let results = self
            .fan_out(peers, move |http, peer| {
                let body = Arc::clone(&body);
                async move {
                    let response = http
                        .post(format!("{peer}{path}"))
                        .json(body.as_ref())
                        .send()
                        .await?;
                    let status = response.status();
                    if !status.is_client_error() {
                        response.error_for_status()?;
                    }
                    Ok::<_, reqwest::Error>(status)
                }
            })
            .await;

        let mut report = FanOutReport::default();
        for (peer, outcome) in results {
            match outcome {
                Ok(status) if status.is_client_error() => {
                    info!(%peer, %status, path, "peer refused payload");
                    report.rejected.push(peer);
                }
                Ok(_) => report.delivered += 1,
                Err(_) => report.failed.push(peer),
            }
        }
        report.rejected.sort();
        report.failed.sort();
        debug!(
            path,
            delivered = report.delivered,
            rejected = report.rejected.len(),
            failed = report.failed.len(),
            "fan-out done"
        );
        report
    }

    /// Collects `(chain, pendingTransactions)` from every peer that answers.
    pub async fn fetch_chains(&self, peers: Vec<String>) -> Vec<ChainSnapshot> {
        self.fan_out(peers, |http, peer| async move {
            http.get(format!("{peer}/blockchain"))
                .send()
                .await?
                .error_for_status()?
                .json::<ChainSnapshot>()
                .await
        })
        .await
        .into_iter()
        .filter_map(|(_, outcome)| outcome.ok())
        .collect()
    }

    async fn fan_out<R, F, Fut>(
        &self,
        peers: Vec<String>,
        call: F,
    ) -> Vec<(String, reqwest::Result<R>)>
    where
        R: Send + 'static,
        F: Fn(Client, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = reqwest::Result<R>> + Send + 'static,
    {
        let call = Arc::new(call);
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();
        for peer in peers {
            let call = Arc::clone(&call);
            let permits = Arc::clone(&permits);
            let http = self.http.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let outcome = (*call)(http, peer.clone()).await;
                (peer, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((peer, outcome)) => {
                    if let Err(err) = &outcome {
                        self.failures.fetch_add(1, Ordering::Relaxed);
                        warn!(%peer, %err, "peer request failed");
                    }
                    results.push((peer, outcome));
                }
                Err(err) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(%err, "peer task did not complete");
                }
            }
        }
        results
    }
}
