use supplychain_core::{Ledger, NewTransaction, Transaction};

pub fn order(product_id: &str, quantity: u64) -> NewTransaction {
    NewTransaction {
        sender: "Assam Tea Estates".to_string(),
        recipient: "Guwahati Distribution Hub".to_string(),
        product_id: product_id.to_string(),
        product_type: "tea".to_string(),
        quantity,
        payment_mode: "upi".to_string(),
        payment_id: format!("PAY-{product_id}"),
        delivery_type: "standard".to_string(),
        order_date: "2021-01-26".to_string(),
    }
}

pub fn transaction(product_id: &str, quantity: u64) -> Transaction {
    Transaction::create(order(product_id, quantity)).expect("valid order")
}

/// A ledger with `length` blocks including genesis, each mined block holding one transaction.
pub fn ledger_with_length(length: usize) -> Ledger {
    let mut ledger = Ledger::new();
    for i in 1..length {
        ledger
            .admit_transaction(transaction(&format!("P{i}"), i as u64))
            .expect("admit");
        ledger.mine_block().expect("mine");
    }
    ledger
}
