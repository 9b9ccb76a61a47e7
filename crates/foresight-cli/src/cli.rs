//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use foresight_core::{Affects, Money, PlanType};

/// Foresight - See where your money is heading
#[derive(Parser)]
#[command(name = "foresight")]
#[command(about = "Expense forecasting, savings goals and what-if scenarios", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "foresight.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FORESIGHT_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import transactions from CSV (date, description, amount, category)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List recent transactions
    Transactions {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Forecast next month's expenses from imported history
    Forecast {
        /// Completed months of history to use (default from config)
        #[arg(short, long)]
        months: Option<u32>,

        /// Ask the narrative backend for a short summary
        #[arg(long)]
        narrate: bool,
    },

    /// Project time to a savings goal from a flat monthly budget
    Goal {
        /// Savings so far (e.g. "1500.00")
        #[arg(long, default_value = "0", value_parser = parse_money)]
        current: Money,

        /// Goal amount
        #[arg(long, value_parser = parse_money)]
        goal: Money,

        /// Monthly income
        #[arg(long, value_parser = parse_money)]
        income: Money,

        /// Monthly expenses
        #[arg(long, value_parser = parse_money)]
        expense: Money,
    },

    /// Manage savings plans (list, add, contribute, forecast, delete)
    Plans {
        #[command(subcommand)]
        action: Option<PlansAction>,
    },

    /// Simulate a recurring change to income or expenses
    Simulate {
        /// Scenario name
        #[arg(short, long)]
        name: String,

        /// Monthly change (negative to reduce)
        #[arg(short, long, value_parser = parse_money, allow_hyphen_values = true)]
        change: Money,

        /// Which side the change applies to: income or expense
        #[arg(short, long, value_parser = parse_affects)]
        affects: Affects,

        /// Spending category the change belongs to
        #[arg(long)]
        category: Option<String>,

        /// Baseline monthly income (default: recent average)
        #[arg(long, value_parser = parse_money)]
        income: Option<Money>,

        /// Baseline monthly expenses (default: recent average)
        #[arg(long, value_parser = parse_money)]
        expense: Option<Money>,

        /// Months to simulate (default from config)
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires a bearer key from FORESIGHT_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
pub enum PlansAction {
    /// List all plans
    List,

    /// Create a plan
    Add {
        /// Plan name
        #[arg(short, long)]
        name: String,

        /// Goal amount
        #[arg(short, long, value_parser = parse_money)]
        goal: Money,

        /// Amount already saved
        #[arg(long, default_value = "0", value_parser = parse_money)]
        current: Money,

        /// Planned monthly contribution
        #[arg(long, default_value = "0", value_parser = parse_money)]
        monthly: Money,

        /// Target date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        target: Option<NaiveDate>,

        /// Plan type: savings, investment, debt_payoff, purchase, emergency_fund, other
        #[arg(long = "type", default_value = "savings", value_parser = parse_plan_type)]
        plan_type: PlanType,
    },

    /// Record a contribution to a plan
    Contribute {
        /// Plan ID
        id: i64,

        /// Amount contributed
        #[arg(short, long, value_parser = parse_money, allow_hyphen_values = true)]
        amount: Money,

        /// Date of the contribution (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Project a plan from its contribution history
    Forecast {
        /// Plan ID
        id: i64,

        /// Ask the narrative backend for a short summary
        #[arg(long)]
        narrate: bool,
    },

    /// Delete a plan and its contributions
    Delete {
        /// Plan ID
        id: i64,
    },
}

/// Parse a major-unit amount such as "1500", "1,500.00" or "-45.5"
pub fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse(s).map_err(|e| e.to_string())
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date (expected YYYY-MM-DD): {}", s))
}

fn parse_affects(s: &str) -> Result<Affects, String> {
    s.parse()
}

fn parse_plan_type(s: &str) -> Result<PlanType, String> {
    s.parse()
}
