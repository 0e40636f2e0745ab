// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use neobanco::application::{BankService, ContractRequest};
use neobanco::domain::{AccountId, Cents, Client, FixedClock, Product, ProductType};
use tempfile::TempDir;

pub const CLIENT_ID: i64 = 1_020_304_050;
pub const CREDIT_PRODUCT: i64 = 10;
pub const SAVINGS_PRODUCT: i64 = 20;

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Helper to create a test service with a temporary database and a frozen clock
pub async fn test_service() -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BankService::init(db_path.to_str().unwrap())
        .await?
        .with_clock(FixedClock::on(parse_date("2025-03-15")));
    Ok((service, temp_dir))
}

pub fn sample_client(id: i64) -> Client {
    Client::new(
        id,
        "Ana",
        "Rojas",
        "Carrera 7 # 40-62",
        3_001_234_567,
        "ana.rojas@example.com",
    )
}

/// Test fixture: one client, a 1% credit product and a 0.5% savings product
pub struct Bank;

impl Bank {
    pub async fn setup(service: &BankService) -> Result<()> {
        service.register_client(sample_client(CLIENT_ID)).await?;
        service
            .create_product(Product::new(
                CREDIT_PRODUCT,
                "Credito libre inversion",
                ProductType::Credit,
                1.0,
            ))
            .await?;
        service
            .create_product(Product::new(
                SAVINGS_PRODUCT,
                "Ahorro programado",
                ProductType::Savings,
                0.5,
            ))
            .await?;
        Ok(())
    }

    pub async fn open_credit(
        service: &BankService,
        capital: Cents,
        term_months: i64,
    ) -> Result<AccountId> {
        let account = service
            .contract_product(ContractRequest {
                client_id: CLIENT_ID,
                product_id: CREDIT_PRODUCT,
                initial_capital: capital,
                term_months,
                delivery_date: parse_date("2025-01-10"),
            })
            .await?;
        Ok(account.id)
    }

    pub async fn open_savings(service: &BankService, capital: Cents) -> Result<AccountId> {
        let account = service
            .contract_product(ContractRequest {
                client_id: CLIENT_ID,
                product_id: SAVINGS_PRODUCT,
                initial_capital: capital,
                term_months: 0,
                delivery_date: parse_date("2025-01-10"),
            })
            .await?;
        Ok(account.id)
    }
}
