use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{
    self, AccountId, Cents, Clock, ContractedAccount, InstallmentQuote, LedgerError, Posting,
    Product, Projection, Receipt,
};
use crate::storage::{LedgerStore, LockedAccount, PostingLock};

use super::AppError;

/// Runs the credit and savings operations of contracted accounts.
///
/// The store and clock are injected per use, so the same calculator works
/// against SQLite in production and any other [`LedgerStore`] in tests.
/// Postings hold the store's account lock from the read to the commit, so
/// concurrent postings queue up instead of computing from the same balance.
pub struct AccountLedger<'a, S: LedgerStore> {
    store: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: LedgerStore> AccountLedger<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Next installment of a credit account. Read only.
    pub async fn quote_installment(&self, id: AccountId) -> Result<InstallmentQuote, AppError> {
        let account = self.load_account(id).await?;
        let product = self.load_product(&account).await?;
        let quote = domain::quote_installment(&account, &product)?;

        debug!(
            account_id = id,
            principal = quote.principal,
            interest = quote.interest,
            remaining_term = quote.remaining_term,
            "quoted installment"
        );
        Ok(quote)
    }

    /// Pay the next installment of a credit account.
    pub async fn pay_installment(&self, id: AccountId) -> Result<Receipt, AppError> {
        self.post(id, "installment", |account, product, today| {
            domain::pay_installment(account, product, today).map(|(_, posting)| posting)
        })
        .await
    }

    /// Savings balance after one interest period. Read only.
    pub async fn quote_savings_projection(&self, id: AccountId) -> Result<Projection, AppError> {
        let account = self.load_account(id).await?;
        let product = self.load_product(&account).await?;
        let projection = domain::project_savings(&account, &product)?;

        debug!(
            account_id = id,
            projected_balance = projection.projected_balance,
            "projected savings"
        );
        Ok(projection)
    }

    /// Deposit (positive) or withdraw (negative) on a savings account.
    pub async fn post_savings_transaction(
        &self,
        id: AccountId,
        amount: Cents,
    ) -> Result<Receipt, AppError> {
        self.post(id, "savings", |account, product, today| {
            domain::post_savings(account, product, amount, today)
        })
        .await
    }

    async fn post<F>(&self, id: AccountId, kind: &'static str, build: F) -> Result<Receipt, AppError>
    where
        F: FnOnce(&ContractedAccount, &Product, NaiveDate) -> Result<Posting, LedgerError>,
    {
        let Some((locked, lock)) = self.store.lock_account(id).await? else {
            return Err(AppError::AccountNotFound(id));
        };
        let LockedAccount {
            account,
            product,
            owner,
        } = locked;

        // Any early return drops the lock, which discards it unwritten
        let product = product
            .ok_or_else(|| orphaned(&account, format!("product {}", account.product_id)))?;
        let posting = build(&account, &product, self.clock.today())?;
        let client =
            owner.ok_or_else(|| orphaned(&account, format!("client {}", account.client_id)))?;

        let transaction_id = lock.commit(&posting).await?;

        info!(
            account_id = id,
            transaction_id,
            kind,
            amount = posting.amount,
            new_balance = posting.new_balance,
            "posting committed"
        );

        Ok(Receipt {
            transaction_id,
            account_id: id,
            client_name: client.full_name(),
            date: posting.date,
            amount: posting.amount,
            new_balance: posting.new_balance,
            remaining_term: product.is_credit().then_some(posting.new_remaining_term),
        })
    }

    async fn load_account(&self, id: AccountId) -> Result<ContractedAccount, AppError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(AppError::AccountNotFound(id))
    }

    async fn load_product(&self, account: &ContractedAccount) -> Result<Product, AppError> {
        match self.store.get_product(account.product_id).await? {
            Some(product) => Ok(product),
            None => Err(orphaned(account, format!("product {}", account.product_id))),
        }
    }

}

fn orphaned(account: &ContractedAccount, missing: String) -> AppError {
    warn!(account_id = account.id, missing = %missing, "orphaned account");
    AppError::OrphanedAccount {
        account_id: account.id,
        missing,
    }
}
