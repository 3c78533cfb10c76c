//! Transaction log: append-only, in insertion order. Entries are never edited
//! or dropped; corrections are new offsetting trades.

use crate::types::account::AccountId;
use crate::types::transaction::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(blob: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<Transaction> = serde_json::from_str(blob)?;
        Ok(Self { entries })
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    pub fn append(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    /// Entries belonging to `user_id`, oldest first.
    pub fn for_user(&self, user_id: AccountId) -> Vec<Transaction> {
        self.entries
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
