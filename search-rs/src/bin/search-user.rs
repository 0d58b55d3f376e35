//! CLI tool for managing search accounts
//!
//! # Usage
//!
//! ```bash
//! # Add a new account on the free plan
//! search-user add "Jane Doe" jane@example.com password123 --db sqlite://search.db
//!
//! # Add an account directly on a paid plan
//! search-user add "Jane Doe" jane@example.com password123 --plan sub2
//!
//! # Switch an account's plan (resets usage)
//! search-user set-plan jane@example.com enterprise --queries 500 --results 50
//!
//! # List all accounts
//! search-user list
//!
//! # Show an account's search history
//! search-user history jane@example.com
//! ```

use clap::{Parser, Subcommand};
use search_rs::accounts::AccountStore;
use search_rs::plans;
use search_rs::security;

#[derive(Parser)]
#[command(name = "search-user")]
#[command(about = "Manage search proxy accounts", long_about = None)]
struct Cli {
    /// Database URL (e.g., sqlite://search.db)
    #[arg(short, long, default_value = "sqlite://search.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new account
    Add {
        /// Display name
        name: String,
        /// Email address
        email: String,
        /// Password
        password: String,
        /// Plan identifier
        #[arg(long, default_value = plans::DEFAULT_PLAN)]
        plan: String,
    },
    /// Check if an account exists
    Exists {
        /// Email address
        email: String,
    },
    /// List all accounts
    List,
    /// Switch an account's plan (resets usage)
    SetPlan {
        /// Email address
        email: String,
        /// Plan identifier
        plan: String,
        /// Enterprise only: allowed query count
        #[arg(long)]
        queries: Option<i64>,
        /// Enterprise only: results per query
        #[arg(long)]
        results: Option<i64>,
    },
    /// Show an account's search history
    History {
        /// Email address
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store = AccountStore::connect(&cli.db).await?;

    match cli.command {
        Commands::Add {
            name,
            email,
            password,
            plan,
        } => {
            if store.find_by_email(&email).await?.is_some() {
                eprintln!("Error: Account {} already exists", email);
                std::process::exit(1);
            }

            let quota = plans::resolve_plan(&plan, None, None)?;
            let password_hash = security::hash_password(&password)?;
            store
                .create_account(&name, &email, &password_hash, &quota)
                .await?;
            println!(
                "✓ Account {} added on plan {} ({} queries, {} results/query)",
                email, quota.plan_type, quota.allowed_queries, quota.results_per_query
            );
        }
        Commands::Exists { email } => {
            if store.find_by_email(&email).await?.is_some() {
                println!("✓ Account {} exists", email);
            } else {
                println!("✗ Account {} does not exist", email);
                std::process::exit(1);
            }
        }
        Commands::List => {
            let accounts = store.list_accounts().await?;

            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!(
                    "{:<5} {:<20} {:<30} {:<12} {:<10}",
                    "ID", "Name", "Email", "Plan", "Used"
                );
                println!("{:-<80}", "");

                for (id, name, email, plan_type, used, allowed) in &accounts {
                    println!(
                        "{:<5} {:<20} {:<30} {:<12} {}/{}",
                        id, name, email, plan_type, used, allowed
                    );
                }

                println!("\nTotal: {} account(s)", accounts.len());
            }
        }
        Commands::SetPlan {
            email,
            plan,
            queries,
            results,
        } => {
            let Some(account) = store.find_by_email(&email).await? else {
                eprintln!("Error: Account {} does not exist", email);
                std::process::exit(1);
            };

            let quota = plans::resolve_plan(&plan, queries, results)?;
            store.set_plan(account.id, &quota).await?;
            println!(
                "✓ Account {} switched to plan {} ({} queries, {} results/query, ${:.2})",
                email,
                quota.plan_type,
                quota.allowed_queries,
                quota.results_per_query,
                quota.price_usd
            );
        }
        Commands::History { email } => {
            let Some(account) = store.find_by_email(&email).await? else {
                eprintln!("Error: Account {} does not exist", email);
                std::process::exit(1);
            };

            let history = store.history(account.id).await?;

            if history.is_empty() {
                println!("No searches recorded for {}.", email);
            } else {
                println!("{:<22} {:<8} Query", "Timestamp", "Results");
                println!("{:-<60}", "");

                for record in &history {
                    println!(
                        "{:<22} {:<8} {}",
                        record.created_at, record.result_count, record.query
                    );
                }

                println!("\nTotal: {} search(es)", history.len());
            }
        }
    }

    Ok(())
}
