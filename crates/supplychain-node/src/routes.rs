use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use supplychain_core::{
    consensus, peers::normalize_url, Block, ChainSnapshot, LedgerError, NewTransaction,
    Transaction,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    error::{ApiError, JsonBody},
    state::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeView {
    #[serde(flatten)]
    snapshot: ChainSnapshot,
    #[serde(rename = "currentNodeURL")]
    current_node_url: String,
    network_nodes: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlockBody {
    pub new_block: Block,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewNodeBody {
    #[serde(rename = "newNodeURL")]
    pub new_node_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkNodesBody {
    pub all_network_nodes: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/blockchain", get(get_blockchain))
        .route("/transactions", post(submit_transaction))
        .route("/transactions/broadcast", post(broadcast_transaction))
        .route("/mine", get(mine))
        .route("/receive-new-block", post(receive_new_block))
        .route("/register-and-broadcast-node", post(register_and_broadcast_node))
        .route("/register-node", post(register_node))
        .route("/register-node-bulk", post(register_node_bulk))
        .route("/consensus", get(run_consensus))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let length = state.ledger().await.len();
    Json(json!({
        "status": "ok",
        "chainLength": length,
        "peerFailures": state.peers.failures(),
    }))
}

async fn get_blockchain(State(state): State<AppState>) -> Json<NodeView> {
    let snapshot = state.ledger().await.snapshot();
    let registry = state.registry();
    Json(NodeView {
        snapshot,
        current_node_url: registry.own_url().to_string(),
        network_nodes: registry.peers(),
    })
}

async fn submit_transaction(
    State(state): State<AppState>,
    JsonBody(tx): JsonBody<Transaction>,
) -> Result<Json<Value>, ApiError> {
    let block_index = state.ledger().await.admit_transaction(tx)?;
    Ok(Json(json!({
        "note": format!("Transaction will be added in block {block_index}."),
        "blockIndex": block_index,
    })))
}

async fn broadcast_transaction(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<NewTransaction>,
) -> Result<Json<Value>, ApiError> {
    let tx = Transaction::create(fields)?;
    let block_index = state.ledger().await.admit_transaction(tx.clone())?;
    let peers = state.registry().peers();
    let broadcast = state.peers.post_all(peers, "/transactions", tx.clone()).await;
    info!(id = %tx.transaction_id, delivered = broadcast.delivered, "transaction broadcast");
    Ok(Json(json!({
        "note": "Transaction created and broadcast successfully.",
        "transaction": tx,
        "blockIndex": block_index,
        "broadcast": broadcast,
    })))
}

async fn mine(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let mut ledger = state.ledger_owned().await;
    let block = tokio::task::spawn_blocking(move || ledger.mine_block()).await??;
    let peers = state.registry().peers();
    let broadcast = state
        .peers
        .post_all(
            peers,
            "/receive-new-block",
            NewBlockBody {
                new_block: block.clone(),
            },
        )
        .await;
    Ok(Json(json!({
        "note": "New block mined and broadcast successfully.",
        "block": block,
        "broadcast": broadcast,
    })))
}

async fn receive_new_block(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewBlockBody>,
) -> Result<Response, ApiError> {
    let index = body.new_block.index;
    let outcome = state.ledger().await.accept_block(body.new_block);
    match outcome {
        Ok(()) => Ok(Json(json!({
            "note": "New block received and accepted.",
            "accepted": true,
            "index": index,
        }))
        .into_response()),
        Err(LedgerError::BlockRejected(reason)) => Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "note": "New block rejected.",
                "accepted": false,
                "reason": reason.to_string(),
            })),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

async fn register_and_broadcast_node(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewNodeBody>,
) -> Json<Value> {
    let new_url = normalize_url(&body.new_node_url);
    let (forward_to, all_nodes) = {
        let mut registry = state.registry_mut();
        if new_url.is_empty() || new_url == registry.own_url() {
            return Json(json!({ "note": "Node ignored." }));
        }
        registry.register(&new_url);
        let peers = registry.peers();
        let forward_to: Vec<String> =
            peers.iter().filter(|p| **p != new_url).cloned().collect();
        let mut all_nodes = peers;
        all_nodes.push(registry.own_url().to_string());
        (forward_to, all_nodes)
    };

    let broadcast = state
        .peers
        .post_all(
            forward_to,
            "/register-node",
            NewNodeBody {
                new_node_url: new_url.clone(),
            },
        )
        .await;
    let bulk = state
        .peers
        .post_all(
            vec![new_url.clone()],
            "/register-node-bulk",
            BulkNodesBody {
                all_network_nodes: all_nodes,
            },
        )
        .await;
    info!(peer = %new_url, forwarded = broadcast.delivered, "registered and broadcast node");

    let note = if bulk.delivered == 1 {
        "New node registered with network successfully."
    } else {
        "New node registered, but it could not be sent the network list."
    };
    Json(json!({
        "note": note,
        "broadcast": broadcast,
        "bulkDelivered": bulk.delivered == 1,
    }))
}

async fn register_node(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewNodeBody>,
) -> Json<Value> {
    let added = state.registry_mut().register(&body.new_node_url);
    let note = if added {
        "New node registered successfully."
    } else {
        "Node already known or ignored."
    };
    Json(json!({ "note": note, "added": added }))
}

async fn register_node_bulk(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<BulkNodesBody>,
) -> Json<Value> {
    let added = state
        .registry_mut()
        .register_all(body.all_network_nodes.iter().map(String::as_str));
    Json(json!({ "note": "Bulk registration successful.", "added": added }))
}

async fn run_consensus(State(state): State<AppState>) -> Json<Value> {
    let peers = state.registry().peers();
    let candidates = state.peers.fetch_chains(peers).await;
    let (resolution, snapshot) = {
        let mut ledger = state.ledger().await;
        let resolution = consensus::resolve(&mut ledger, candidates);
        (resolution, ledger.snapshot())
    };
    let note = if resolution.replaced() {
        "This chain has been replaced."
    } else {
        "Current chain has not been replaced."
    };
    Json(json!({
        "note": note,
        "resolution": resolution,
        "chain": snapshot.chain,
        "pendingTransactions": snapshot.pending_transactions,
    }))
}
