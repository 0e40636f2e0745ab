use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, ClientId, LedgerError, Product, ProductId, ProductType};

pub type AccountId = i64;

/// Minimum opening deposit for a savings account: 100000.00
pub const MIN_SAVINGS_OPENING: Cents = 10_000_000;

/// A product contracted by a client. Mutated by every posting, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractedAccount {
    pub id: AccountId,
    pub product_id: ProductId,
    pub client_id: ClientId,
    pub initial_capital: Cents,
    /// Original term in months (always 0 for savings)
    pub term_months: i64,
    pub delivery_date: NaiveDate,
    /// Outstanding principal for credit, available funds for savings
    pub balance: Cents,
    /// Cumulative interest charged by paid installments
    pub interest_paid: Cents,
    /// Installments left to pay (always 0 for savings)
    pub remaining_term: i64,
    /// Bumped on every committed posting; checked again when the posting is written
    pub version: i64,
}

impl ContractedAccount {
    /// No installments left to pay. Always true for savings accounts.
    pub fn is_paid_off(&self) -> bool {
        self.remaining_term <= 0
    }
}

/// Validated terms for a new account, before storage assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOpening {
    pub product_id: ProductId,
    pub client_id: ClientId,
    pub initial_capital: Cents,
    pub term_months: i64,
    pub delivery_date: NaiveDate,
}

impl AccountOpening {
    /// Apply the per-type contract rules.
    ///
    /// Credit needs positive capital and term. Savings needs at least
    /// [`MIN_SAVINGS_OPENING`] and has its term forced to zero.
    pub fn new(
        product: &Product,
        client_id: ClientId,
        initial_capital: Cents,
        term_months: i64,
        delivery_date: NaiveDate,
    ) -> Result<Self, LedgerError> {
        let term_months = match product.product_type {
            ProductType::Credit => {
                if initial_capital <= 0 || term_months <= 0 {
                    return Err(LedgerError::InvalidContract(
                        "credit requires capital and term greater than zero".to_string(),
                    ));
                }
                term_months
            }
            ProductType::Savings => {
                if initial_capital < MIN_SAVINGS_OPENING {
                    return Err(LedgerError::InvalidContract(format!(
                        "savings requires an opening deposit of at least {}",
                        super::format_cents(MIN_SAVINGS_OPENING)
                    )));
                }
                0
            }
        };

        Ok(Self {
            product_id: product.id,
            client_id,
            initial_capital,
            term_months,
            delivery_date,
        })
    }

    /// The account as it looks right after contracting.
    pub fn into_account(self, id: AccountId) -> ContractedAccount {
        ContractedAccount {
            id,
            product_id: self.product_id,
            client_id: self.client_id,
            initial_capital: self.initial_capital,
            term_months: self.term_months,
            delivery_date: self.delivery_date,
            balance: self.initial_capital,
            interest_paid: 0,
            remaining_term: self.term_months,
            version: 0,
        }
    }
}
