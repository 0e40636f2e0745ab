use thiserror::Error;

use crate::domain::{AccountId, Cents, ClientId, LedgerError, ProductId, ProductType};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account {account_id} is a {actual} account, expected {expected}")]
    WrongAccountType {
        account_id: AccountId,
        expected: ProductType,
        actual: ProductType,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account {0} has no pending installments")]
    NoPendingInstallments(AccountId),

    #[error("Insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Cents,
        requested: Cents,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Account {account_id} references a missing {missing}")]
    OrphanedAccount {
        account_id: AccountId,
        missing: String,
    },

    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::WrongAccountType {
                account_id,
                expected,
                actual,
            } => AppError::WrongAccountType {
                account_id,
                expected,
                actual,
            },
            LedgerError::NoPendingInstallments(id) => AppError::NoPendingInstallments(id),
            LedgerError::InsufficientFunds {
                account_id,
                balance,
                requested,
            } => AppError::InsufficientFunds {
                account_id,
                balance,
                requested,
            },
            err @ (LedgerError::AmountOutOfRange(_) | LedgerError::InvalidContract(_)) => {
                AppError::InvalidInput(err.to_string())
            }
        }
    }
}
