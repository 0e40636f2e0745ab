mod repository;

pub use repository::*;

use anyhow::Result;

use crate::domain::{
    AccountId, Client, ClientId, ContractedAccount, Posting, Product, ProductId, TransactionId,
};

/// SQL migration for initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// An account read under its write lock, with whatever its references resolve to.
#[derive(Debug, Clone)]
pub struct LockedAccount {
    pub account: ContractedAccount,
    pub product: Option<Product>,
    pub owner: Option<Client>,
}

/// The storage operations the account ledger needs.
///
/// Quotes read through the `get_*` methods. Postings go through
/// [`lock_account`](LedgerStore::lock_account): while the returned lock is
/// alive no other posting can read or write the account, so every posting is
/// computed from the state left by the previous one.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    type Lock<'a>: PostingLock
    where
        Self: 'a;

    async fn get_account(&self, id: AccountId) -> Result<Option<ContractedAccount>>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>>;

    /// Wait for exclusive write access and read the account with its product and owner.
    /// Returns `Ok(None)` when the account does not exist.
    async fn lock_account(&self, id: AccountId)
    -> Result<Option<(LockedAccount, Self::Lock<'_>)>>;
}

/// Exclusive access to one account, released on commit or drop.
///
/// Dropping the lock without committing discards it with no changes.
#[allow(async_fn_in_trait)]
pub trait PostingLock {
    /// Apply the account update and append the transaction as one unit.
    async fn commit(self, posting: &Posting) -> Result<TransactionId>;
}
