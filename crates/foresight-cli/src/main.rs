//! Foresight CLI - Expense forecasting, goal projection and what-if scenarios
//!
//! Usage:
//!   foresight init                    Initialize database
//!   foresight import --file CSV       Import transactions
//!   foresight forecast                Forecast next month's expenses
//!   foresight plans add --name ...    Create a savings plan
//!   foresight simulate --name ...     Simulate a recurring change
//!   foresight serve --port 3000       Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let output = if cli.json {
        commands::Output::Json
    } else {
        commands::Output::Text
    };

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file)
        }
        Commands::Transactions { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_transactions_list(&db, limit, &commands::currency_symbol())
        }
        Commands::Forecast { months, narrate } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let service = commands::build_service()?;
            commands::cmd_forecast(&db, &service, months, narrate, output).await
        }
        Commands::Goal {
            current,
            goal,
            income,
            expense,
        } => {
            let service = commands::build_service()?;
            commands::cmd_goal(&service, current, goal, income, expense, output)
        }
        Commands::Plans { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let service = commands::build_service()?;
            let symbol = service.config().currency_symbol.as_str();
            match action {
                None | Some(PlansAction::List) => commands::cmd_plans_list(&db, &service, output),
                Some(PlansAction::Add {
                    name,
                    goal,
                    current,
                    monthly,
                    target,
                    plan_type,
                }) => commands::cmd_plans_add(
                    &db,
                    commands::PlanArgs {
                        name,
                        goal,
                        current,
                        monthly,
                        target,
                        plan_type,
                    },
                    symbol,
                ),
                Some(PlansAction::Contribute { id, amount, date }) => {
                    commands::cmd_plans_contribute(&db, id, amount, date, symbol)
                }
                Some(PlansAction::Forecast { id, narrate }) => {
                    commands::cmd_plans_forecast(&db, &service, id, narrate, output).await
                }
                Some(PlansAction::Delete { id }) => commands::cmd_plans_delete(&db, id),
            }
        }
        Commands::Simulate {
            name,
            change,
            affects,
            category,
            income,
            expense,
            months,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let service = commands::build_service()?;
            commands::cmd_simulate(
                &db,
                &service,
                commands::SimulateArgs {
                    name,
                    change,
                    affects,
                    category,
                    income,
                    expense,
                    months,
                },
                output,
            )
            .await
        }
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt).await,
    }
}
