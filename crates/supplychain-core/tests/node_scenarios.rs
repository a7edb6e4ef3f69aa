mod helpers;

use helpers::{ledger_with_length, order, transaction};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use supplychain_core::{
    consensus::resolve, validate::is_valid, ChainSnapshot, Ledger, PeerRegistry, Resolution,
    Transaction,
};

#[test]
fn submit_then_mine_on_fresh_node() {
    let mut node = Ledger::new();
    assert!(node.pending_transactions().is_empty());

    let tx = Transaction::create(order("P1", 5)).unwrap();
    assert_eq!(node.admit_transaction(tx.clone()).unwrap(), 2);

    let block = node.mine_block().unwrap();
    assert_eq!(block.index, 2);
    assert_eq!(block.transactions.len(), 1);
    assert_eq!(block.transactions[0].product_id, "P1");
    assert_eq!(block.transactions[0], tx);
    assert_eq!(block.previous_block_hash, "0");
    assert_eq!(block.previous_block_hash, node.chain()[0].hash);
    assert!(block.hash.starts_with("0000"));
    assert!(node.pending_transactions().is_empty());
    assert!(is_valid(node.chain()));
}

#[test]
fn shorter_node_adopts_longer_peer_chain() {
    let mut a = ledger_with_length(3);
    let mut b = ledger_with_length(5);
    b.admit_transaction(transaction("P-pending", 2)).unwrap();
    assert_eq!(a.len(), 3);
    assert!(is_valid(b.chain()));

    let outcome = resolve(&mut a, vec![b.snapshot()]);
    assert_eq!(
        outcome,
        Resolution::Replaced {
            previous_length: 3,
            length: 5
        }
    );
    assert_eq!(a.chain(), b.chain());
    assert_eq!(a.pending_transactions(), b.pending_transactions());
}

#[test]
fn mined_block_propagates_through_fast_path() {
    let mut miner = ledger_with_length(2);
    let mut follower = Ledger::new();
    resolve(&mut follower, vec![miner.snapshot()]);

    miner.admit_transaction(transaction("P9", 1)).unwrap();
    let block = miner.mine_block().unwrap();
    follower.accept_block(block).unwrap();
    assert_eq!(follower.chain(), miner.chain());

    // Replaying the same block no longer extends the tip.
    let replay = miner.chain()[2].clone();
    assert!(follower.accept_block(replay).is_err());
    assert_eq!(follower.len(), 3);
}

#[test]
fn chain_length_never_decreases_across_runs() {
    let peers: Vec<ChainSnapshot> = [1, 2, 4, 3, 2]
        .into_iter()
        .map(|len| ledger_with_length(len).snapshot())
        .collect();
    let mut forged = ledger_with_length(6).snapshot();
    forged.chain[3].transactions[0].quantity = 1_000;

    let mut rng = StdRng::seed_from_u64(7);
    let mut node = ledger_with_length(2);
    for round_no in 0..20 {
        let mut round: Vec<ChainSnapshot> = peers
            .choose_multiple(&mut rng, 3)
            .cloned()
            .collect();
        if round_no % 2 == 0 {
            round.push(forged.clone());
        }
        round.shuffle(&mut rng);

        let before = node.len();
        resolve(&mut node, round);
        assert!(node.len() >= before);
        assert!(is_valid(node.chain()));
    }

    resolve(&mut node, peers.clone());
    assert_eq!(node.len(), 4);
}

#[test]
fn unreachable_peers_contribute_nothing() {
    let mut node = ledger_with_length(2);
    let before = node.snapshot();
    assert_eq!(
        resolve(&mut node, Vec::new()),
        Resolution::NoLongerChain { length: 2 }
    );
    assert_eq!(node.snapshot(), before);
}

#[test]
fn registry_survives_repeated_announcements() {
    let mut registry = PeerRegistry::new("http://localhost:3001");
    for _ in 0..3 {
        registry.register("http://localhost:3002");
        registry.register_all(["http://localhost:3001", "http://localhost:3003"]);
    }
    assert_eq!(
        registry.peers(),
        vec![
            "http://localhost:3002".to_string(),
            "http://localhost:3003".to_string()
        ]
    );
}
