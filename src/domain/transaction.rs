use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AccountId, Cents};

pub type TransactionId = i64;

/// An entry in the append-only transaction log.
/// Positive amounts are payments or deposits, negative amounts are withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub amount: Cents,
}

/// A computed state change for one account, ready to be committed.
///
/// The store applies the account update and appends the transaction in one
/// atomic unit, and only if the account still carries `expected_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub account_id: AccountId,
    pub expected_version: i64,
    pub new_balance: Cents,
    pub new_remaining_term: i64,
    pub interest_paid_delta: Cents,
    pub date: NaiveDate,
    pub amount: Cents,
}

/// What the caller gets back after a posting is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub account_id: AccountId,
    pub client_name: String,
    pub date: NaiveDate,
    pub amount: Cents,
    pub new_balance: Cents,
    /// Installments left after the payment; `None` for savings postings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_term: Option<i64>,
}
