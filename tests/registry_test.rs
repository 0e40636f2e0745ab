mod common;

use anyhow::Result;
use common::{Bank, CLIENT_ID, CREDIT_PRODUCT, SAVINGS_PRODUCT, parse_date, sample_client, test_service};
use neobanco::application::{AppError, ContractRequest};
use neobanco::domain::{Client, MIN_SAVINGS_OPENING, Product, ProductType};

#[tokio::test]
async fn test_register_and_show_client() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.register_client(sample_client(42)).await?;
    let client = service.get_client(42).await?;

    assert_eq!(client.full_name(), "Ana Rojas");
    assert_eq!(client.phone, 3_001_234_567);
    assert_eq!(client.email, "ana.rojas@example.com");
    Ok(())
}

#[tokio::test]
async fn test_duplicate_client_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.register_client(sample_client(42)).await?;

    let mut other = sample_client(42);
    other.first_name = "Luis".into();
    let err = service.register_client(other).await.unwrap_err();

    assert!(matches!(err, AppError::DuplicateIdentifier(_)));
    assert_eq!(service.get_client(42).await?.first_name, "Ana");
    Ok(())
}

#[tokio::test]
async fn test_invalid_email_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let client = Client::new(5, "Luis", "Bohorquez", "Calle 80", 3_105_550_000, "luis-at-mail.com");
    let err = service.register_client(client).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(service.count_clients().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_update_client_address() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.register_client(sample_client(42)).await?;

    let updated = service
        .update_client_address(42, "Avenida Boyaca 12".into())
        .await?;
    assert_eq!(updated.address, "Avenida Boyaca 12");

    let err = service
        .update_client_address(43, "Nowhere".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ClientNotFound(43)));
    Ok(())
}

#[tokio::test]
async fn test_list_clients_in_id_order() -> Result<()> {
    let (service, _temp) = test_service().await?;
    for id in [30, 10, 20] {
        service.register_client(sample_client(id)).await?;
    }

    let ids: Vec<i64> = service.list_clients().await?.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
    assert_eq!(service.count_clients().await?, 3);
    Ok(())
}

#[tokio::test]
async fn test_create_and_list_products() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bank::setup(&service).await?;

    let products = service.list_products().await?;
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product_type, ProductType::Credit);
    assert_eq!(products[1].product_type, ProductType::Savings);

    let savings = service.get_product(SAVINGS_PRODUCT).await?;
    assert_eq!(savings.rate, 0.5);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_product_id_or_name() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bank::setup(&service).await?;

    let same_id = Product::new(CREDIT_PRODUCT, "Otro credito", ProductType::Credit, 2.0);
    assert!(matches!(
        service.create_product(same_id).await,
        Err(AppError::DuplicateIdentifier(_))
    ));

    let same_name = Product::new(99, "Ahorro programado", ProductType::Savings, 0.1);
    assert!(matches!(
        service.create_product(same_name).await,
        Err(AppError::DuplicateIdentifier(_))
    ));

    assert_eq!(service.list_products().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_negative_rate_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let product = Product::new(1, "Raro", ProductType::Credit, -1.0);
    assert!(matches!(
        service.create_product(product).await,
        Err(AppError::InvalidInput(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_contract_credit() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bank::setup(&service).await?;

    let id = Bank::open_credit(&service, 12_000_000, 12).await?;
    let account = service.get_account(id).await?;

    assert_eq!(account.client_id, CLIENT_ID);
    assert_eq!(account.balance, 12_000_000);
    assert_eq!(account.remaining_term, 12);
    assert_eq!(account.interest_paid, 0);
    assert_eq!(account.delivery_date, parse_date("2025-01-10"));
    Ok(())
}

#[tokio::test]
async fn test_contract_savings_forces_zero_term() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bank::setup(&service).await?;

    let account = service
        .contract_product(ContractRequest {
            client_id: CLIENT_ID,
            product_id: SAVINGS_PRODUCT,
            initial_capital: MIN_SAVINGS_OPENING,
            term_months: 36,
            delivery_date: parse_date("2025-01-10"),
        })
        .await?;

    assert_eq!(account.term_months, 0);
    assert_eq!(service.get_account(account.id).await?.remaining_term, 0);
    Ok(())
}

#[tokio::test]
async fn test_contract_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bank::setup(&service).await?;

    // Savings below the minimum opening deposit
    assert!(matches!(
        Bank::open_savings(&service, MIN_SAVINGS_OPENING - 100).await,
        Err(e) if matches!(e.downcast_ref::<AppError>(), Some(AppError::InvalidInput(_)))
    ));

    // Credit without term
    assert!(matches!(
        Bank::open_credit(&service, 500_000, 0).await,
        Err(e) if matches!(e.downcast_ref::<AppError>(), Some(AppError::InvalidInput(_)))
    ));

    // Unknown client and product
    let unknown_client = service
        .contract_product(ContractRequest {
            client_id: 777,
            product_id: CREDIT_PRODUCT,
            initial_capital: 500_000,
            term_months: 6,
            delivery_date: parse_date("2025-01-10"),
        })
        .await;
    assert!(matches!(unknown_client, Err(AppError::ClientNotFound(777))));

    let unknown_product = service
        .contract_product(ContractRequest {
            client_id: CLIENT_ID,
            product_id: 777,
            initial_capital: 500_000,
            term_months: 6,
            delivery_date: parse_date("2025-01-10"),
        })
        .await;
    assert!(matches!(unknown_product, Err(AppError::ProductNotFound(777))));

    assert!(service.list_accounts_for_client(CLIENT_ID).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_list_accounts_for_client() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bank::setup(&service).await?;
    let credit = Bank::open_credit(&service, 1_000_000, 10).await?;
    let savings = Bank::open_savings(&service, MIN_SAVINGS_OPENING).await?;

    let ids: Vec<i64> = service
        .list_accounts_for_client(CLIENT_ID)
        .await?
        .iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![credit, savings]);

    assert!(matches!(
        service.list_accounts_for_client(5).await,
        Err(AppError::ClientNotFound(5))
    ));
    Ok(())
}

#[tokio::test]
async fn test_account_info() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bank::setup(&service).await?;
    let id = Bank::open_credit(&service, 1_000_000, 10).await?;
    service.pay_installment(id).await?;

    let info = service.get_account_info(id).await?;
    assert_eq!(info.product.id, CREDIT_PRODUCT);
    assert_eq!(info.client.id, CLIENT_ID);
    assert_eq!(info.transaction_count, 1);
    Ok(())
}
