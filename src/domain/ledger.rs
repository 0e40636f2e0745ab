//! Installment and savings arithmetic for contracted accounts.
//!
//! Everything here is pure: functions take the current account state and
//! return either a quote or the [`Posting`] that should be committed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    AccountId, Cents, ContractedAccount, Posting, Product, ProductType, apply_rate, divide_evenly,
    format_cents,
};

/// Breakdown of the next credit installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentQuote {
    pub account_id: AccountId,
    pub principal: Cents,
    pub interest: Cents,
    pub total: Cents,
    pub remaining_term: i64,
}

/// Savings balance after one interest period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub account_id: AccountId,
    pub balance: Cents,
    pub rate: f64,
    pub projected_balance: Cents,
}

/// Compute the next installment of a credit account.
///
/// Principal is the balance split evenly over the *remaining* term, so the
/// principal portion changes as the term shortens (declining balance, not annuity).
pub fn quote_installment(
    account: &ContractedAccount,
    product: &Product,
) -> Result<InstallmentQuote, LedgerError> {
    require_type(account, product, ProductType::Credit)?;
    if account.is_paid_off() {
        return Err(LedgerError::NoPendingInstallments(account.id));
    }

    let principal = divide_evenly(account.balance, account.remaining_term);
    let interest = apply_rate(account.balance, product.rate)
        .ok_or(LedgerError::AmountOutOfRange(account.balance))?;
    let total = principal
        .checked_add(interest)
        .ok_or(LedgerError::AmountOutOfRange(account.balance))?;

    Ok(InstallmentQuote {
        account_id: account.id,
        principal,
        interest,
        total,
        remaining_term: account.remaining_term,
    })
}

/// Quote the next installment and build the posting that pays it.
pub fn pay_installment(
    account: &ContractedAccount,
    product: &Product,
    date: NaiveDate,
) -> Result<(InstallmentQuote, Posting), LedgerError> {
    let quote = quote_installment(account, product)?;

    let posting = Posting {
        account_id: account.id,
        expected_version: account.version,
        new_balance: (account.balance - quote.principal).max(0),
        new_remaining_term: (account.remaining_term - 1).max(0),
        interest_paid_delta: quote.interest,
        date,
        amount: quote.total,
    };

    Ok((quote, posting))
}

/// Project a savings balance one period ahead: `balance * (1 + rate/100)`.
pub fn project_savings(
    account: &ContractedAccount,
    product: &Product,
) -> Result<Projection, LedgerError> {
    require_type(account, product, ProductType::Savings)?;

    let projected_balance = apply_rate(account.balance, product.rate)
        .and_then(|interest| account.balance.checked_add(interest))
        .ok_or(LedgerError::AmountOutOfRange(account.balance))?;

    Ok(Projection {
        account_id: account.id,
        balance: account.balance,
        rate: product.rate,
        projected_balance,
    })
}

/// Build the posting for a savings deposit (positive) or withdrawal (negative).
/// A zero amount is allowed and still produces a ledger entry.
pub fn post_savings(
    account: &ContractedAccount,
    product: &Product,
    amount: Cents,
    date: NaiveDate,
) -> Result<Posting, LedgerError> {
    require_type(account, product, ProductType::Savings)?;

    let new_balance = account
        .balance
        .checked_add(amount)
        .ok_or(LedgerError::AmountOutOfRange(amount))?;
    if new_balance < 0 {
        return Err(LedgerError::InsufficientFunds {
            account_id: account.id,
            balance: account.balance,
            requested: amount,
        });
    }

    Ok(Posting {
        account_id: account.id,
        expected_version: account.version,
        new_balance,
        new_remaining_term: account.remaining_term,
        interest_paid_delta: 0,
        date,
        amount,
    })
}

fn require_type(
    account: &ContractedAccount,
    product: &Product,
    expected: ProductType,
) -> Result<(), LedgerError> {
    if product.product_type != expected {
        return Err(LedgerError::WrongAccountType {
            account_id: account.id,
            expected,
            actual: product.product_type,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    WrongAccountType {
        account_id: AccountId,
        expected: ProductType,
        actual: ProductType,
    },
    NoPendingInstallments(AccountId),
    InsufficientFunds {
        account_id: AccountId,
        balance: Cents,
        requested: Cents,
    },
    AmountOutOfRange(Cents),
    InvalidContract(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::WrongAccountType {
                account_id,
                expected,
                actual,
            } => write!(
                f,
                "Account {} is a {} account, expected {}",
                account_id, actual, expected
            ),
            LedgerError::NoPendingInstallments(id) => {
                write!(f, "Account {} has no pending installments", id)
            }
            LedgerError::InsufficientFunds {
                account_id,
                balance,
                requested,
            } => write!(
                f,
                "Insufficient funds in account {}: balance {}, requested {}",
                account_id,
                format_cents(*balance),
                format_cents(*requested)
            ),
            LedgerError::AmountOutOfRange(amount) => {
                write!(f, "Amount {} is out of range", amount)
            }
            LedgerError::InvalidContract(reason) => write!(f, "Invalid contract: {}", reason),
        }
    }
}

impl std::error::Error for LedgerError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn credit_product(rate: f64) -> Product {
        Product::new(1, "Credito libre", ProductType::Credit, rate)
    }

    fn savings_product(rate: f64) -> Product {
        Product::new(2, "Ahorro", ProductType::Savings, rate)
    }

    fn account(id: AccountId, balance: Cents, remaining_term: i64) -> ContractedAccount {
        ContractedAccount {
            id,
            product_id: 1,
            client_id: 100,
            initial_capital: balance,
            term_months: remaining_term,
            delivery_date: today(),
            balance,
            interest_paid: 0,
            remaining_term,
            version: 3,
        }
    }

    #[test]
    fn test_quote_installment_scenario() {
        // 120000.00 over 12 months at 1%
        let quote = quote_installment(&account(1, 12_000_000, 12), &credit_product(1.0)).unwrap();
        assert_eq!(quote.principal, 1_000_000);
        assert_eq!(quote.interest, 120_000);
        assert_eq!(quote.total, 1_120_000);
        assert_eq!(quote.remaining_term, 12);
    }

    #[test]
    fn test_quote_installment_rejects_savings() {
        let err = quote_installment(&account(1, 12_000_000, 0), &savings_product(0.5)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::WrongAccountType {
                account_id: 1,
                expected: ProductType::Credit,
                actual: ProductType::Savings,
            }
        );
    }

    #[test]
    fn test_no_pending_installments() {
        let err = quote_installment(&account(9, 0, 0), &credit_product(1.0)).unwrap_err();
        assert_eq!(err, LedgerError::NoPendingInstallments(9));
    }

    #[test]
    fn test_pay_installment_posting() {
        let (quote, posting) =
            pay_installment(&account(1, 12_000_000, 12), &credit_product(1.0), today()).unwrap();

        assert_eq!(posting.amount, quote.total);
        assert_eq!(posting.new_balance, 11_000_000);
        assert_eq!(posting.new_remaining_term, 11);
        assert_eq!(posting.interest_paid_delta, 120_000);
        assert_eq!(posting.expected_version, 3);
        assert_eq!(posting.date, today());
    }

    #[test]
    fn test_principal_declines_with_remaining_term() {
        let product = credit_product(2.0);
        let mut acct = account(1, 1_000_000, 3);
        let mut principals = Vec::new();

        while acct.remaining_term > 0 {
            let (quote, posting) = pay_installment(&acct, &product, today()).unwrap();
            principals.push(quote.principal);
            acct.balance = posting.new_balance;
            acct.remaining_term = posting.new_remaining_term;
        }

        assert_eq!(principals, vec![333_333, 333_334, 333_333]);
        assert_eq!(acct.balance, 0);
    }

    #[test]
    fn test_last_installment_clears_balance() {
        let (quote, posting) =
            pay_installment(&account(1, 4_567, 1), &credit_product(1.0), today()).unwrap();
        assert_eq!(quote.principal, 4_567);
        assert_eq!(posting.new_balance, 0);
        assert_eq!(posting.new_remaining_term, 0);
    }

    #[test]
    fn test_quote_installment_on_very_large_balance() {
        let quote =
            quote_installment(&account(1, 5_000_000_000_000_000_000, 12), &credit_product(1.0))
                .unwrap();
        assert_eq!(quote.principal, 416_666_666_666_666_667);
        assert_eq!(quote.interest, 50_000_000_000_000_000);
        assert_eq!(quote.total, 466_666_666_666_666_667);
    }

    #[test]
    fn test_installment_total_out_of_range() {
        let balance = i64::MAX - 1;
        assert_eq!(
            quote_installment(&account(1, balance, 1), &credit_product(100.0)),
            Err(LedgerError::AmountOutOfRange(balance))
        );

        // Principal and interest fit on their own; their sum does not
        let balance = 6_000_000_000_000_000_000;
        assert_eq!(
            pay_installment(&account(1, balance, 1), &credit_product(100.0), today()).unwrap_err(),
            LedgerError::AmountOutOfRange(balance)
        );
    }

    #[test]
    fn test_projection_out_of_range() {
        let balance = i64::MAX / 2 + 1;
        assert_eq!(
            project_savings(&account(2, balance, 0), &savings_product(100.0)),
            Err(LedgerError::AmountOutOfRange(balance))
        );
    }

    #[test]
    fn test_project_savings_scenario() {
        let projection = project_savings(&account(2, 10_000_000, 0), &savings_product(0.5)).unwrap();
        assert_eq!(projection.projected_balance, 10_050_000);
        assert_eq!(projection.balance, 10_000_000);
    }

    #[test]
    fn test_project_savings_rejects_credit() {
        assert!(matches!(
            project_savings(&account(2, 10_000_000, 12), &credit_product(1.0)),
            Err(LedgerError::WrongAccountType { .. })
        ));
    }

    #[test]
    fn test_post_savings_deposit_and_withdrawal() {
        let acct = account(2, 10_000_000, 0);
        let product = savings_product(0.5);

        let deposit = post_savings(&acct, &product, 50_000, today()).unwrap();
        assert_eq!(deposit.new_balance, 10_050_000);
        assert_eq!(deposit.interest_paid_delta, 0);

        let drain = post_savings(&acct, &product, -10_000_000, today()).unwrap();
        assert_eq!(drain.new_balance, 0);

        let noop = post_savings(&acct, &product, 0, today()).unwrap();
        assert_eq!(noop.new_balance, acct.balance);
        assert_eq!(noop.amount, 0);
    }

    #[test]
    fn test_post_savings_insufficient_funds() {
        let err = post_savings(&account(2, 10_000_000, 0), &savings_product(0.5), -10_000_001, today())
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                account_id: 2,
                balance: 10_000_000,
                requested: -10_000_001,
            }
        );
    }
}
