use tracing::{info, warn};

use crate::{
    error::{LedgerError, RejectReason},
    hash::hash_block,
    now_millis,
    pow::{self, meets_difficulty},
    Block, BlockData, ChainSnapshot, Transaction,
};

/// The sealed chain plus the pool of admitted, not yet sealed transactions.
///
/// Every mutating method takes `&mut self`; callers sharing a ledger across
/// tasks must serialise access (the node keeps it behind a mutex).
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A ledger holding only the genesis block and an empty pending pool.
    pub fn new() -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
        };
        ledger.create_genesis();
        ledger
    }

    fn create_genesis(&mut self) {
        self.chain = vec![Block::genesis()];
        self.pending.clear();
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Index the next sealed block will carry.
    pub fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }

    /// Adds a transaction to the pending pool and returns the index of the
    /// block it is expected to land in. Informational only.
    pub fn admit_transaction(&mut self, tx: Transaction) -> Result<u64, LedgerError> {
        tx.validate()?;
        self.pending.push(tx);
        Ok(self.next_index())
    }

    /// Seals the whole pending pool into a new block and appends it. The pool
    /// is emptied in the same step, so no transaction lands in two blocks.
    pub fn seal_block(&mut self, nonce: u64, previous_block_hash: String, hash: String) -> Block {
        let block = Block {
            index: self.next_index(),
            timestamp: now_millis(),
            transactions: std::mem::take(&mut self.pending),
            nonce,
            hash,
            previous_block_hash,
        };
        info!(
            index = block.index,
            nonce = block.nonce,
            txs = block.transactions.len(),
            hash = %block.hash,
            "sealed block"
        );
        self.chain.push(block.clone());
        block
    }

    /// Runs proof-of-work over the current pending pool and seals the result.
    pub fn mine_block(&mut self) -> Result<Block, LedgerError> {
        let previous_hash = self.last_block()?.hash.clone();
        let data = BlockData {
            transactions: &self.pending,
            index: self.next_index(),
        };
        let nonce = pow::solve(&previous_hash, &data)?;
        let hash = hash_block(&previous_hash, nonce, &data)?;
        Ok(self.seal_block(nonce, previous_hash, hash))
    }

    /// Appends a block mined elsewhere if it extends the local tip and carries
    /// valid proof-of-work. Leaves the ledger untouched on rejection.
    pub fn accept_block(&mut self, block: Block) -> Result<(), LedgerError> {
        if let Err(err) = self.check_extends_tip(&block) {
            warn!(index = block.index, hash = %block.hash, %err, "rejected block");
            return Err(err);
        }
        info!(index = block.index, hash = %block.hash, "accepted block from peer");
        self.chain.push(block);
        self.pending.clear();
        Ok(())
    }

    fn check_extends_tip(&self, block: &Block) -> Result<(), LedgerError> {
        let last = self.last_block()?;
        let reject = |reason| Err(LedgerError::BlockRejected(reason));
        if block.previous_block_hash != last.hash {
            return reject(RejectReason::StaleLink {
                expected: last.hash.clone(),
                got: block.previous_block_hash.clone(),
            });
        }
        if block.index != last.index + 1 {
            return reject(RejectReason::UnexpectedIndex {
                expected: last.index + 1,
                got: block.index,
            });
        }
        let computed = hash_block(&last.hash, block.nonce, &block.data())?;
        if computed != block.hash {
            return reject(RejectReason::HashMismatch);
        }
        if !meets_difficulty(&computed) {
            return reject(RejectReason::InsufficientWork);
        }
        Ok(())
    }

    /// Swaps chain and pending pool together. Only the consensus resolver
    /// calls this, after validating `chain`.
    pub(crate) fn replace_chain(&mut self, chain: Vec<Block>, pending: Vec<Transaction>) {
        self.chain = chain;
        self.pending = pending;
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            chain: self.chain.clone(),
            pending_transactions: self.pending.clone(),
        }
    }
}
