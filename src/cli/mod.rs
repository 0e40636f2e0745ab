use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::application::input::{
    parse_amount, parse_date, parse_id, parse_phone, parse_product_type, parse_rate, parse_term,
};
use crate::application::{AccountInfo, BankService, ContractRequest};
use crate::domain::{
    Client, ContractedAccount, InstallmentQuote, Product, Projection, Receipt, format_cents,
};

/// Neobanco - client, credit and savings back office
#[derive(Parser)]
#[command(name = "neobanco")]
#[command(about = "Manage bank clients, financial products, credit installments and savings")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, global = true, env = "NEOBANCO_DB", default_value = "neobanco.db")]
    pub database: String,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Client management commands
    #[command(subcommand)]
    Client(ClientCommands),

    /// Product management commands
    #[command(subcommand)]
    Product(ProductCommands),

    /// Contract a product for an existing client
    Contract {
        /// Client ID
        #[arg(long)]
        client: String,

        /// Product ID
        #[arg(long)]
        product: String,

        /// Initial capital (at least 100000 for savings)
        #[arg(long)]
        capital: String,

        /// Term in months (ignored for savings)
        #[arg(long, default_value = "0")]
        term: String,

        /// Delivery date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Credit account operations
    #[command(subcommand)]
    Credit(CreditCommands),

    /// Savings account operations
    #[command(subcommand)]
    Savings(SavingsCommands),

    /// Account inspection commands
    #[command(subcommand)]
    Account(AccountCommands),
}

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Register a new client
    Register {
        /// Client ID (national ID number)
        id: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,
    },

    /// Show a client
    Show {
        /// Client ID
        id: String,
    },

    /// Change a client's address
    UpdateAddress {
        /// Client ID
        id: String,

        /// New address
        address: String,
    },

    /// List all clients
    List,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// Create a new product
    Create {
        /// Product ID
        id: String,

        /// Product name (must be unique)
        #[arg(long)]
        name: String,

        /// Product type: 1 or credit, 2 or savings
        #[arg(short = 't', long = "type")]
        product_type: String,

        /// Interest rate in percent per month
        #[arg(short, long)]
        rate: String,
    },

    /// Show a product
    Show {
        /// Product ID
        id: String,
    },

    /// List all products
    List,
}

#[derive(Subcommand)]
pub enum CreditCommands {
    /// Show the next installment of a credit account
    Quote {
        /// Account ID
        account: String,
    },

    /// Pay the next installment of a credit account
    Pay {
        /// Account ID
        account: String,
    },
}

#[derive(Subcommand)]
pub enum SavingsCommands {
    /// Show the balance projected after one interest period
    Quote {
        /// Account ID
        account: String,
    },

    /// Deposit (positive amount) or withdraw (negative amount)
    Post {
        /// Account ID
        account: String,

        /// Amount, e.g. "500" or "-250.50"
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Show an account
    Show {
        /// Account ID
        id: String,
    },

    /// List the accounts of a client
    List {
        /// Client ID
        #[arg(long)]
        client: String,
    },

    /// List the transactions of an account
    Statement {
        /// Account ID
        id: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let json = self.json;

        match self.command {
            Commands::Init => {
                BankService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Client(cmd) => {
                let service = BankService::connect(&self.database).await?;
                run_client_command(&service, cmd, json).await?;
            }

            Commands::Product(cmd) => {
                let service = BankService::connect(&self.database).await?;
                run_product_command(&service, cmd, json).await?;
            }

            Commands::Contract {
                client,
                product,
                capital,
                term,
                date,
            } => {
                let service = BankService::connect(&self.database).await?;
                let delivery_date = match date {
                    Some(date_str) => parse_date("delivery date", &date_str)?,
                    None => service.today(),
                };

                let account = service
                    .contract_product(ContractRequest {
                        client_id: parse_id("client", &client)?,
                        product_id: parse_id("product", &product)?,
                        initial_capital: parse_amount("capital", &capital)?,
                        term_months: parse_term("term", &term)?,
                        delivery_date,
                    })
                    .await?;

                if json {
                    print_json(&account)?;
                } else {
                    println!(
                        "Contracted account {}: capital {}, term {} months",
                        account.id,
                        format_cents(account.initial_capital),
                        account.term_months
                    );
                }
            }

            Commands::Credit(cmd) => {
                let service = BankService::connect(&self.database).await?;
                run_credit_command(&service, cmd, json).await?;
            }

            Commands::Savings(cmd) => {
                let service = BankService::connect(&self.database).await?;
                run_savings_command(&service, cmd, json).await?;
            }

            Commands::Account(cmd) => {
                let service = BankService::connect(&self.database).await?;
                run_account_command(&service, cmd, json).await?;
            }
        }

        Ok(())
    }
}

async fn run_client_command(service: &BankService, cmd: ClientCommands, json: bool) -> Result<()> {
    match cmd {
        ClientCommands::Register {
            id,
            first_name,
            last_name,
            address,
            phone,
            email,
        } => {
            let client = Client::new(
                parse_id("client", &id)?,
                first_name,
                last_name,
                address,
                parse_phone("phone", &phone)?,
                email,
            );
            let client = service.register_client(client).await?;

            if json {
                print_json(&client)?;
            } else {
                println!("Registered client: {} ({})", client.full_name(), client.id);
            }
        }

        ClientCommands::Show { id } => {
            let client = service.get_client(parse_id("client", &id)?).await?;
            if json {
                print_json(&client)?;
            } else {
                print_client(&client);
            }
        }

        ClientCommands::UpdateAddress { id, address } => {
            let client = service
                .update_client_address(parse_id("client", &id)?, address)
                .await?;
            if json {
                print_json(&client)?;
            } else {
                println!("Updated address of {}: {}", client.full_name(), client.address);
            }
        }

        ClientCommands::List => {
            let clients = service.list_clients().await?;
            if json {
                return print_json(&clients);
            }
            if clients.is_empty() {
                println!("No clients found.");
                return Ok(());
            }

            println!(
                "{:<12} {:<28} {:<28} {:<12} {:<28}",
                "ID", "NAME", "ADDRESS", "PHONE", "EMAIL"
            );
            println!("{}", "-".repeat(112));
            for client in &clients {
                println!(
                    "{:<12} {:<28} {:<28} {:<12} {:<28}",
                    client.id,
                    client.full_name(),
                    client.address,
                    client.phone,
                    client.email
                );
            }
            println!();
            println!("Total clients: {}", service.count_clients().await?);
        }
    }

    Ok(())
}

async fn run_product_command(
    service: &BankService,
    cmd: ProductCommands,
    json: bool,
) -> Result<()> {
    match cmd {
        ProductCommands::Create {
            id,
            name,
            product_type,
            rate,
        } => {
            let product = Product::new(
                parse_id("product", &id)?,
                name,
                parse_product_type("type", &product_type)?,
                parse_rate("rate", &rate)?,
            );
            let product = service.create_product(product).await?;

            if json {
                print_json(&product)?;
            } else {
                println!(
                    "Created product: {} ({}, {}%)",
                    product.name, product.product_type, product.rate
                );
            }
        }

        ProductCommands::Show { id } => {
            let product = service.get_product(parse_id("product", &id)?).await?;
            if json {
                print_json(&product)?;
            } else {
                println!("Product: {}", product.name);
                println!("  ID:     {}", product.id);
                println!("  Type:   {}", product.product_type);
                println!("  Rate:   {}%", product.rate);
            }
        }

        ProductCommands::List => {
            let products = service.list_products().await?;
            if json {
                return print_json(&products);
            }
            if products.is_empty() {
                println!("No products found.");
                return Ok(());
            }

            println!("{:<8} {:<28} {:<10} {:>8}", "ID", "NAME", "TYPE", "RATE %");
            println!("{}", "-".repeat(57));
            for product in products {
                println!(
                    "{:<8} {:<28} {:<10} {:>8}",
                    product.id, product.name, product.product_type, product.rate
                );
            }
        }
    }

    Ok(())
}

async fn run_credit_command(service: &BankService, cmd: CreditCommands, json: bool) -> Result<()> {
    match cmd {
        CreditCommands::Quote { account } => {
            let quote = service
                .quote_installment(parse_id("account", &account)?)
                .await?;
            if json {
                print_json(&quote)?;
            } else {
                print_quote(&quote);
            }
        }

        CreditCommands::Pay { account } => {
            let receipt = service
                .pay_installment(parse_id("account", &account)?)
                .await?;
            if json {
                print_json(&receipt)?;
            } else {
                print_receipt("CREDIT PAYMENT RECEIPT", &receipt);
            }
        }
    }

    Ok(())
}

async fn run_savings_command(
    service: &BankService,
    cmd: SavingsCommands,
    json: bool,
) -> Result<()> {
    match cmd {
        SavingsCommands::Quote { account } => {
            let projection = service
                .quote_savings_projection(parse_id("account", &account)?)
                .await?;
            if json {
                print_json(&projection)?;
            } else {
                print_projection(&projection);
            }
        }

        SavingsCommands::Post { account, amount } => {
            let receipt = service
                .post_savings_transaction(
                    parse_id("account", &account)?,
                    parse_amount("amount", &amount)?,
                )
                .await?;
            if json {
                print_json(&receipt)?;
            } else {
                print_receipt("SAVINGS TRANSACTION RECEIPT", &receipt);
            }
        }
    }

    Ok(())
}

async fn run_account_command(
    service: &BankService,
    cmd: AccountCommands,
    json: bool,
) -> Result<()> {
    match cmd {
        AccountCommands::Show { id } => {
            let info = service.get_account_info(parse_id("account", &id)?).await?;
            if json {
                print_json(&info.account)?;
            } else {
                print_account_info(&info);
            }
        }

        AccountCommands::List { client } => {
            let accounts = service
                .list_accounts_for_client(parse_id("client", &client)?)
                .await?;
            if json {
                return print_json(&accounts);
            }
            if accounts.is_empty() {
                println!("No accounts found.");
                return Ok(());
            }

            println!(
                "{:<8} {:<8} {:>16} {:>16} {:>10}",
                "ID", "PRODUCT", "CAPITAL", "BALANCE", "TERM LEFT"
            );
            println!("{}", "-".repeat(62));
            for account in &accounts {
                print_account_row(account);
            }
        }

        AccountCommands::Statement { id } => {
            let transactions = service
                .account_statement(parse_id("account", &id)?)
                .await?;
            if json {
                return print_json(&transactions);
            }
            if transactions.is_empty() {
                println!("No transactions found.");
                return Ok(());
            }

            println!("{:<8} {:<12} {:>16}", "ID", "DATE", "AMOUNT");
            println!("{}", "-".repeat(38));
            for transaction in transactions {
                println!(
                    "{:<8} {:<12} {:>16}",
                    transaction.id,
                    transaction.date,
                    format_cents(transaction.amount)
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_client(client: &Client) {
    println!("Client: {}", client.full_name());
    println!("  ID:      {}", client.id);
    println!("  Address: {}", client.address);
    println!("  Phone:   {}", client.phone);
    println!("  Email:   {}", client.email);
}

fn print_quote(quote: &InstallmentQuote) {
    println!("Installment due for account {}:", quote.account_id);
    println!("  Principal:      {:>16}", format_cents(quote.principal));
    println!("  Interest:       {:>16}", format_cents(quote.interest));
    println!("  Total:          {:>16}", format_cents(quote.total));
    println!("  Term remaining: {:>9} months", quote.remaining_term);
}

fn print_projection(projection: &Projection) {
    println!("Savings account {}:", projection.account_id);
    println!("  Balance:        {:>16}", format_cents(projection.balance));
    println!("  Monthly rate:   {:>15}%", projection.rate);
    println!(
        "  Projected:      {:>16}",
        format_cents(projection.projected_balance)
    );
}

fn print_receipt(title: &str, receipt: &Receipt) {
    let rule = "=".repeat(40);
    println!("{}", rule);
    println!("{}", title);
    println!("{}", rule);
    println!("  Receipt number: {}", receipt.transaction_id);
    println!("  Date:           {}", receipt.date);
    println!("  Client:         {}", receipt.client_name);
    println!("  Account:        {}", receipt.account_id);
    println!("  Amount:         {}", format_cents(receipt.amount));
    println!("  New balance:    {}", format_cents(receipt.new_balance));
    if let Some(term) = receipt.remaining_term {
        println!("  Term remaining: {} months", term);
    }
    println!("{}", rule);
}

fn print_account_row(account: &ContractedAccount) {
    println!(
        "{:<8} {:<8} {:>16} {:>16} {:>10}",
        account.id,
        account.product_id,
        format_cents(account.initial_capital),
        format_cents(account.balance),
        account.remaining_term
    );
}

fn print_account_info(info: &AccountInfo) {
    let account = &info.account;
    println!("Account: {}", account.id);
    println!(
        "  Product:          {} ({}, {}%)",
        info.product.name, info.product.product_type, info.product.rate
    );
    println!("  Client:           {} ({})", info.client.full_name(), info.client.id);
    println!("  Delivered:        {}", account.delivery_date);
    println!("  Initial capital:  {}", format_cents(account.initial_capital));
    println!("  Balance:          {}", format_cents(account.balance));
    if info.product.is_credit() {
        println!("  Term:             {} months", account.term_months);
        println!("  Term remaining:   {} months", account.remaining_term);
        println!("  Interest paid:    {}", format_cents(account.interest_paid));
    }
    println!("  Transactions:     {}", info.transaction_count);
}
