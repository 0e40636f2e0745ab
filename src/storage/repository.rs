use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteExecutor, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, SqlitePool};

use crate::domain::{
    AccountId, AccountOpening, Client, ClientId, ContractedAccount, Posting, Product, ProductId,
    ProductType, Transaction, TransactionId,
};

use super::{LedgerStore, LockedAccount, MIGRATION_001_INITIAL, PostingLock};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Concurrent writers wait this long for the database lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Takes the database write lock up front, so the reads that follow already see
/// the latest committed posting and no other writer can slip in before ours.
const BEGIN_POSTING: &str = "BEGIN IMMEDIATE";

const ACCOUNT_COLUMNS: &str = "id, product_id, client_id, initial_capital_cents, term_months, delivery_date, balance_cents, interest_paid_cents, remaining_term, version";

/// Repository for persisting and querying clients, products, accounts and transactions.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    /// Pass `?mode=rwc` in the URL to create the file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Client operations
    // ========================

    /// Save a new client. Returns false if the ID is already taken.
    pub async fn save_client(&self, client: &Client) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO clients (id, first_name, last_name, address, phone, email)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(client.id)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.address)
        .bind(client.phone)
        .bind(&client.email)
        .execute(&self.pool)
        .await;

        inserted(result).context("Failed to save client")
    }

    /// Change a client's address. Returns false if the client doesn't exist.
    pub async fn update_client_address(&self, id: ClientId, address: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE clients SET address = ? WHERE id = ?")
            .bind(address)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update client address")?;
        Ok(result.rows_affected() > 0)
    }

    /// List all clients, ordered by ID.
    pub async fn list_clients(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, address, phone, email FROM clients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list clients")?;

        Ok(rows.iter().map(Self::row_to_client).collect())
    }

    pub async fn count_clients(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM clients")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count clients")?;
        Ok(row.get("count"))
    }

    fn row_to_client(row: &SqliteRow) -> Client {
        Client {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            address: row.get("address"),
            phone: row.get("phone"),
            email: row.get("email"),
        }
    }

    // ========================
    // Product operations
    // ========================

    /// Save a new product. Returns false if the ID or the name is already taken.
    pub async fn save_product(&self, product: &Product) -> Result<bool> {
        let result =
            sqlx::query("INSERT INTO products (id, name, product_type, rate) VALUES (?, ?, ?, ?)")
                .bind(product.id)
                .bind(&product.name)
                .bind(product.product_type.code())
                .bind(product.rate)
                .execute(&self.pool)
                .await;

        inserted(result).context("Failed to save product")
    }

    /// Get a product by name.
    pub async fn get_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, product_type, rate FROM products WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch product by name")?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    /// List all products, ordered by ID.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, product_type, rate FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list products")?;

        rows.iter().map(Self::row_to_product).collect()
    }

    fn row_to_product(row: &SqliteRow) -> Result<Product> {
        let code: i64 = row.get("product_type");
        Ok(Product {
            id: row.get("id"),
            name: row.get("name"),
            product_type: ProductType::from_code(code)
                .ok_or_else(|| anyhow::anyhow!("Invalid product type code: {}", code))?,
            rate: row.get("rate"),
        })
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a newly contracted account. Balance starts at the initial capital.
    pub async fn save_account(&self, opening: AccountOpening) -> Result<ContractedAccount> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (product_id, client_id, initial_capital_cents, term_months, delivery_date, balance_cents, interest_paid_cents, remaining_term, version)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, 0)
            "#,
        )
        .bind(opening.product_id)
        .bind(opening.client_id)
        .bind(opening.initial_capital)
        .bind(opening.term_months)
        .bind(opening.delivery_date.format(DATE_FORMAT).to_string())
        .bind(opening.initial_capital)
        .bind(opening.term_months)
        .execute(&self.pool)
        .await
        .context("Failed to save account")?;

        Ok(opening.into_account(result.last_insert_rowid()))
    }

    /// List accounts owned by a client, ordered by ID.
    pub async fn list_accounts_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ContractedAccount>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE client_id = ? ORDER BY id",
            ACCOUNT_COLUMNS
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts for client")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    fn row_to_account(row: &SqliteRow) -> Result<ContractedAccount> {
        let delivery_date_str: String = row.get("delivery_date");

        Ok(ContractedAccount {
            id: row.get("id"),
            product_id: row.get("product_id"),
            client_id: row.get("client_id"),
            initial_capital: row.get("initial_capital_cents"),
            term_months: row.get("term_months"),
            delivery_date: NaiveDate::parse_from_str(&delivery_date_str, DATE_FORMAT)
                .context("Invalid delivery_date")?,
            balance: row.get("balance_cents"),
            interest_paid: row.get("interest_paid_cents"),
            remaining_term: row.get("remaining_term"),
            version: row.get("version"),
        })
    }

    // ========================
    // Transaction operations
    // ========================

    /// List the transactions of an account, oldest first.
    pub async fn list_transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, date, amount_cents
            FROM transactions
            WHERE account_id = ?
            ORDER BY id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions for account")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Count transactions for an account.
    pub async fn count_transactions_for_account(&self, account_id: AccountId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM transactions WHERE account_id = ?")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?;
        Ok(row.get("count"))
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let date_str: String = row.get("date");

        Ok(Transaction {
            id: row.get("id"),
            account_id: row.get("account_id"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Invalid transaction date")?,
            amount: row.get("amount_cents"),
        })
    }
}

impl LedgerStore for Repository {
    type Lock<'a> = SqlitePostingLock;

    async fn get_account(&self, id: AccountId) -> Result<Option<ContractedAccount>> {
        fetch_account(&self.pool, id).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>> {
        fetch_client(&self.pool, id).await
    }

    async fn lock_account(
        &self,
        id: AccountId,
    ) -> Result<Option<(LockedAccount, SqlitePostingLock)>> {
        let mut tx = self
            .pool
            .begin_with(BEGIN_POSTING)
            .await
            .context("Failed to begin posting")?;

        // Everything is read on the locked connection; going back to the pool
        // while holding the write lock could starve the other posters.
        let Some(account) = fetch_account(&mut *tx, id).await? else {
            return Ok(None);
        };
        let product = fetch_product(&mut *tx, account.product_id).await?;
        let owner = fetch_client(&mut *tx, account.client_id).await?;

        let locked = LockedAccount {
            account,
            product,
            owner,
        };
        Ok(Some((locked, SqlitePostingLock { tx })))
    }
}

/// An open `BEGIN IMMEDIATE` transaction on one account.
/// Rolled back by sqlx if dropped before [`PostingLock::commit`].
pub struct SqlitePostingLock {
    tx: sqlx::Transaction<'static, Sqlite>,
}

impl PostingLock for SqlitePostingLock {
    async fn commit(mut self, posting: &Posting) -> Result<TransactionId> {
        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET balance_cents = ?,
                remaining_term = ?,
                interest_paid_cents = interest_paid_cents + ?,
                version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(posting.new_balance)
        .bind(posting.new_remaining_term)
        .bind(posting.interest_paid_delta)
        .bind(posting.account_id)
        .bind(posting.expected_version)
        .execute(&mut *self.tx)
        .await
        .context("Failed to update account")?;

        // Only possible if the posting was built from a different read than this lock's
        if updated.rows_affected() == 0 {
            anyhow::bail!(
                "Account {} is not at version {}",
                posting.account_id,
                posting.expected_version
            );
        }

        let inserted = sqlx::query(
            "INSERT INTO transactions (account_id, date, amount_cents) VALUES (?, ?, ?)",
        )
        .bind(posting.account_id)
        .bind(posting.date.format(DATE_FORMAT).to_string())
        .bind(posting.amount)
        .execute(&mut *self.tx)
        .await
        .context("Failed to append transaction")?;

        let transaction_id = inserted.last_insert_rowid();
        self.tx.commit().await.context("Failed to commit posting")?;

        Ok(transaction_id)
    }
}

async fn fetch_account<'e>(
    executor: impl SqliteExecutor<'e>,
    id: AccountId,
) -> Result<Option<ContractedAccount>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM accounts WHERE id = ?",
        ACCOUNT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
    .context("Failed to fetch account")?;

    row.as_ref().map(Repository::row_to_account).transpose()
}

async fn fetch_product<'e>(
    executor: impl SqliteExecutor<'e>,
    id: ProductId,
) -> Result<Option<Product>> {
    let row = sqlx::query("SELECT id, name, product_type, rate FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("Failed to fetch product")?;

    row.as_ref().map(Repository::row_to_product).transpose()
}

async fn fetch_client<'e>(
    executor: impl SqliteExecutor<'e>,
    id: ClientId,
) -> Result<Option<Client>> {
    let row = sqlx::query(
        "SELECT id, first_name, last_name, address, phone, email FROM clients WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
    .context("Failed to fetch client")?;

    Ok(row.as_ref().map(Repository::row_to_client))
}

/// Map a unique-key violation on insert to `Ok(false)`.
fn inserted(
    result: std::result::Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error>,
) -> Result<bool, sqlx::Error> {
    match result {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
        Err(e) => Err(e),
    }
}
