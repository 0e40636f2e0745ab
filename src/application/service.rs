use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{
    AccountId, AccountOpening, Cents, Client, ClientId, Clock, ContractedAccount,
    InstallmentQuote, Product, ProductId, Projection, Receipt, SystemClock, Transaction,
};
use crate::storage::{LedgerStore, Repository};

use super::{AccountLedger, AppError};

/// Application service providing the bank's use cases.
/// This is the primary interface for any client (CLI, API, GUI, etc.).
pub struct BankService {
    repo: Repository,
    clock: Arc<dyn Clock>,
}

/// Everything needed to contract a product for a client.
pub struct ContractRequest {
    pub client_id: ClientId,
    pub product_id: ProductId,
    pub initial_capital: Cents,
    pub term_months: i64,
    pub delivery_date: NaiveDate,
}

/// An account together with its product and owner, for display.
pub struct AccountInfo {
    pub account: ContractedAccount,
    pub product: Product,
    pub client: Client,
    pub transaction_count: i64,
}

impl BankService {
    /// Create a new service with the given repository and the system clock.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used to date transactions.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Today's date according to the service clock; used for stamping and defaults.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The ledger operations, bound to this service's store and clock.
    pub fn ledger(&self) -> AccountLedger<'_, Repository> {
        AccountLedger::new(&self.repo, self.clock.as_ref())
    }

    // ========================
    // Client operations
    // ========================

    /// Register a new client.
    pub async fn register_client(&self, client: Client) -> Result<Client, AppError> {
        if client.id <= 0 {
            return Err(AppError::InvalidInput(format!(
                "client id must be positive, got {}",
                client.id
            )));
        }
        if !client.has_valid_email() {
            return Err(AppError::InvalidInput(format!(
                "email '{}' must look like user@domain.com",
                client.email
            )));
        }
        // The primary key decides; a concurrent registration of the same id loses here
        if !self.repo.save_client(&client).await? {
            return Err(AppError::DuplicateIdentifier(format!("client {}", client.id)));
        }
        info!(client_id = client.id, "client registered");
        Ok(client)
    }

    /// Get a client by ID.
    pub async fn get_client(&self, id: ClientId) -> Result<Client, AppError> {
        self.repo
            .get_client(id)
            .await?
            .ok_or(AppError::ClientNotFound(id))
    }

    /// Change a client's address; the only mutable client field.
    pub async fn update_client_address(
        &self,
        id: ClientId,
        address: String,
    ) -> Result<Client, AppError> {
        if !self.repo.update_client_address(id, &address).await? {
            return Err(AppError::ClientNotFound(id));
        }
        info!(client_id = id, "client address updated");
        self.get_client(id).await
    }

    /// List all clients.
    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        Ok(self.repo.list_clients().await?)
    }

    /// Number of registered clients.
    pub async fn count_clients(&self) -> Result<i64, AppError> {
        Ok(self.repo.count_clients().await?)
    }

    // ========================
    // Product operations
    // ========================

    /// Create a new product. Both the ID and the name must be unused.
    pub async fn create_product(&self, product: Product) -> Result<Product, AppError> {
        if product.id <= 0 {
            return Err(AppError::InvalidInput(format!(
                "product id must be positive, got {}",
                product.id
            )));
        }
        if product.name.trim().is_empty() {
            return Err(AppError::InvalidInput("product name is empty".to_string()));
        }
        if !product.rate.is_finite() || product.rate < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "rate must be a non-negative percentage, got {}",
                product.rate
            )));
        }
        if self.repo.get_product(product.id).await?.is_some() {
            return Err(AppError::DuplicateIdentifier(format!(
                "product {}",
                product.id
            )));
        }
        if self.repo.get_product_by_name(&product.name).await?.is_some() {
            return Err(AppError::DuplicateIdentifier(format!(
                "product name '{}'",
                product.name
            )));
        }

        if !self.repo.save_product(&product).await? {
            return Err(AppError::DuplicateIdentifier(format!(
                "product {} or name '{}'",
                product.id, product.name
            )));
        }
        info!(product_id = product.id, product_type = %product.product_type, "product created");
        Ok(product)
    }

    /// Get a product by ID.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, AppError> {
        self.repo
            .get_product(id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    /// List all products.
    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.repo.list_products().await?)
    }

    // ========================
    // Account operations
    // ========================

    /// Contract a product for an existing client.
    pub async fn contract_product(
        &self,
        request: ContractRequest,
    ) -> Result<ContractedAccount, AppError> {
        let client = self.get_client(request.client_id).await?;
        let product = self.get_product(request.product_id).await?;

        let opening = AccountOpening::new(
            &product,
            client.id,
            request.initial_capital,
            request.term_months,
            request.delivery_date,
        )?;

        let account = self.repo.save_account(opening).await?;
        info!(
            account_id = account.id,
            client_id = client.id,
            product_id = product.id,
            capital = account.initial_capital,
            "product contracted"
        );
        Ok(account)
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<ContractedAccount, AppError> {
        self.repo
            .get_account(id)
            .await?
            .ok_or(AppError::AccountNotFound(id))
    }

    /// Get an account with its product, owner and transaction count.
    pub async fn get_account_info(&self, id: AccountId) -> Result<AccountInfo, AppError> {
        let account = self.get_account(id).await?;
        let product = self.repo.get_product(account.product_id).await?.ok_or_else(|| {
            AppError::OrphanedAccount {
                account_id: id,
                missing: format!("product {}", account.product_id),
            }
        })?;
        let client = self.repo.get_client(account.client_id).await?.ok_or_else(|| {
            AppError::OrphanedAccount {
                account_id: id,
                missing: format!("client {}", account.client_id),
            }
        })?;
        let transaction_count = self.repo.count_transactions_for_account(id).await?;

        Ok(AccountInfo {
            account,
            product,
            client,
            transaction_count,
        })
    }

    /// List the accounts of a client.
    pub async fn list_accounts_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ContractedAccount>, AppError> {
        self.get_client(client_id).await?;
        Ok(self.repo.list_accounts_for_client(client_id).await?)
    }

    /// All transactions of an account, oldest first.
    pub async fn account_statement(&self, id: AccountId) -> Result<Vec<Transaction>, AppError> {
        self.get_account(id).await?;
        Ok(self.repo.list_transactions_for_account(id).await?)
    }

    // ========================
    // Ledger operations
    // ========================

    pub async fn quote_installment(&self, id: AccountId) -> Result<InstallmentQuote, AppError> {
        self.ledger().quote_installment(id).await
    }

    pub async fn pay_installment(&self, id: AccountId) -> Result<Receipt, AppError> {
        self.ledger().pay_installment(id).await
    }

    pub async fn quote_savings_projection(&self, id: AccountId) -> Result<Projection, AppError> {
        self.ledger().quote_savings_projection(id).await
    }

    pub async fn post_savings_transaction(
        &self,
        id: AccountId,
        amount: Cents,
    ) -> Result<Receipt, AppError> {
        self.ledger().post_savings_transaction(id, amount).await
    }
}
