use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod consensus;
pub mod constants;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod peers;
pub mod pow;
pub mod validate;

pub use consensus::Resolution;
pub use error::{ChainError, LedgerError, RejectReason};
pub use ledger::Ledger;
pub use peers::PeerRegistry;

/// A supply-chain movement recorded on the ledger.
///
/// Field order is part of the hashing contract: the proof-of-work preimage
/// serialises transactions in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    #[serde(rename = "productID")]
    pub product_id: String,
    pub product_type: String,
    pub quantity: u64,
    pub payment_mode: String,
    #[serde(rename = "paymentID")]
    pub payment_id: String,
    pub delivery_type: String,
    pub order_date: String,
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
}

/// Caller-supplied fields of a transaction, before an identifier is assigned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub sender: String,
    pub recipient: String,
    #[serde(rename = "productID")]
    pub product_id: String,
    pub product_type: String,
    pub quantity: u64,
    pub payment_mode: String,
    #[serde(rename = "paymentID")]
    pub payment_id: String,
    pub delivery_type: String,
    pub order_date: String,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), LedgerError> {
        require_fields(&[
            ("sender", self.sender.as_str()),
            ("recipient", self.recipient.as_str()),
            ("productID", self.product_id.as_str()),
            ("productType", self.product_type.as_str()),
            ("paymentMode", self.payment_mode.as_str()),
            ("paymentID", self.payment_id.as_str()),
            ("deliveryType", self.delivery_type.as_str()),
            ("orderDate", self.order_date.as_str()),
        ])
    }
}

fn require_fields(fields: &[(&'static str, &str)]) -> Result<(), LedgerError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some(&(field, _)) => Err(LedgerError::InvalidTransaction { field }),
        None => Ok(()),
    }
}

impl Transaction {
    /// Builds a transaction with a fresh identifier. Does not touch any ledger;
    /// admission is a separate step.
    pub fn create(fields: NewTransaction) -> Result<Self, LedgerError> {
        fields.validate()?;
        let NewTransaction {
            sender,
            recipient,
            product_id,
            product_type,
            quantity,
            payment_mode,
            payment_id,
            delivery_type,
            order_date,
        } = fields;
        Ok(Self {
            sender,
            recipient,
            product_id,
            product_type,
            quantity,
            payment_mode,
            payment_id,
            delivery_type,
            order_date,
            transaction_id: new_transaction_id(),
        })
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        require_fields(&[
            ("sender", self.sender.as_str()),
            ("recipient", self.recipient.as_str()),
            ("productID", self.product_id.as_str()),
            ("productType", self.product_type.as_str()),
            ("paymentMode", self.payment_mode.as_str()),
            ("paymentID", self.payment_id.as_str()),
            ("deliveryType", self.delivery_type.as_str()),
            ("orderDate", self.order_date.as_str()),
            ("transactionID", self.transaction_id.as_str()),
        ])
    }
}

/// 128-bit random identifier, hex without separators.
pub fn new_transaction_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
    pub hash: String,
    pub previous_block_hash: String,
}

impl Block {
    pub fn genesis() -> Self {
        Self {
            index: constants::GENESIS_INDEX,
            timestamp: now_millis(),
            transactions: Vec::new(),
            nonce: constants::GENESIS_NONCE,
            hash: constants::GENESIS_HASH.to_string(),
            previous_block_hash: constants::GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    /// Genesis shape check; the timestamp is not part of it.
    pub fn is_genesis(&self) -> bool {
        self.index == constants::GENESIS_INDEX
            && self.nonce == constants::GENESIS_NONCE
            && self.hash == constants::GENESIS_HASH
            && self.previous_block_hash == constants::GENESIS_PREVIOUS_HASH
            && self.transactions.is_empty()
    }

    pub fn data(&self) -> BlockData<'_> {
        BlockData {
            transactions: &self.transactions,
            index: self.index,
        }
    }
}

/// The part of a block covered by proof-of-work, besides the previous hash and nonce.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BlockData<'a> {
    pub transactions: &'a [Transaction],
    pub index: u64,
}

impl BlockData<'_> {
    /// Stable JSON encoding: `{"transactions":[...],"index":N}`.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A node's full ledger state as exchanged between peers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub pending_transactions: Vec<Transaction>,
}

impl ChainSnapshot {
    pub fn tip_hash(&self) -> Option<&str> {
        self.chain.last().map(|b| b.hash.as_str())
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> NewTransaction {
        NewTransaction {
            sender: "Acme Mills".to_string(),
            recipient: "Northwind Retail".to_string(),
            product_id: "P1".to_string(),
            product_type: "textile".to_string(),
            quantity: 5,
            payment_mode: "card".to_string(),
            payment_id: "PAY-77".to_string(),
            delivery_type: "express".to_string(),
            order_date: "2021-03-14".to_string(),
        }
    }

    #[test]
    fn create_assigns_unique_hex_ids() {
        let a = Transaction::create(order()).unwrap();
        let b = Transaction::create(order()).unwrap();
        assert_eq!(a.transaction_id.len(), 32);
        assert!(a.transaction_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.transaction_id, b.transaction_id);
        assert_eq!(a.product_id, "P1");
        assert_eq!(a.quantity, 5);
    }

    #[test]
    fn create_rejects_blank_field() {
        let mut fields = order();
        fields.payment_id = "  ".to_string();
        match Transaction::create(fields) {
            Err(LedgerError::InvalidTransaction { field }) => assert_eq!(field, "paymentID"),
            other => panic!("expected invalid transaction, got {other:?}"),
        }
    }

    #[test]
    fn validate_requires_transaction_id() {
        let mut tx = Transaction::create(order()).unwrap();
        assert!(tx.validate().is_ok());
        tx.transaction_id.clear();
        assert!(matches!(
            tx.validate(),
            Err(LedgerError::InvalidTransaction {
                field: "transactionID"
            })
        ));
    }

    #[test]
    fn transaction_wire_names() {
        let mut tx = Transaction::create(order()).unwrap();
        tx.transaction_id = "abc".to_string();
        let json = serde_json::to_string(&tx).unwrap();
        let expected = r#"{"sender":"Acme Mills","recipient":"Northwind Retail","productID":"P1","productType":"textile","quantity":5,"paymentMode":"card","paymentID":"PAY-77","deliveryType":"express","orderDate":"2021-03-14","transactionID":"abc"}"#;
        assert_eq!(json, expected);
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn block_data_is_canonical() {
        let data = BlockData {
            transactions: &[],
            index: 2,
        };
        assert_eq!(
            data.canonical_json().unwrap(),
            r#"{"transactions":[],"index":2}"#
        );
    }

    #[test]
    fn genesis_shape() {
        let genesis = Block::genesis();
        assert!(genesis.is_genesis());
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.nonce, 1);
        assert_eq!(genesis.hash, "0");
        assert_eq!(genesis.previous_block_hash, "0");
        assert!(genesis.transactions.is_empty());
        assert!(genesis.timestamp > 0);

        let json = serde_json::to_value(&genesis).unwrap();
        assert_eq!(json["previousBlockHash"], "0");
    }
}
