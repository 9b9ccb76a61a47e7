//! What-if scenario command

use anyhow::{bail, Result};
use foresight_core::{Affects, Database, ForecastService, Money, WhatIfScenario, YearMonth};
use foresight_server::MAX_SIMULATION_MONTHS;

use super::{colored, print_json, Output};

/// Parsed arguments for `simulate`
pub struct SimulateArgs {
    pub name: String,
    pub change: Money,
    pub affects: Affects,
    pub category: Option<String>,
    pub income: Option<Money>,
    pub expense: Option<Money>,
    pub months: Option<u32>,
}

pub async fn cmd_simulate(
    db: &Database,
    service: &ForecastService,
    args: SimulateArgs,
    output: Output,
) -> Result<()> {
    if let Some(months) = args.months {
        if months > MAX_SIMULATION_MONTHS {
            bail!("--months must be at most {}", MAX_SIMULATION_MONTHS);
        }
    }

    let scenario = WhatIfScenario {
        name: args.name,
        description: String::new(),
        monthly_change: args.change,
        affects: args.affects,
        category: args.category,
    };

    let current = YearMonth::current();
    let baseline = match (args.income, args.expense) {
        (Some(income), Some(expense)) => Some((income, expense)),
        (None, None) => None,
        (income, expense) => {
            let (stored_income, stored_expense) = service.trailing_baseline(db, current)?;
            Some((
                income.unwrap_or(stored_income),
                expense.unwrap_or(stored_expense),
            ))
        }
    };

    let result = service
        .simulate_at(db, &scenario, args.months, baseline, current)
        .await?;

    if output == Output::Json {
        return print_json(&result);
    }

    let symbol = &service.config().currency_symbol;

    println!();
    println!("🧪 Scenario: {}", result.scenario.name);
    println!("   ─────────────────────────────");
    println!(
        "   Monthly balance: {} → {}",
        result.original_balance.format_with_symbol(symbol),
        result.new_balance.format_with_symbol(symbol)
    );
    println!(
        "   Difference: {} ({:+.1}%)",
        colored(result.difference, symbol),
        result.impact_percentage
    );

    if let Some(last) = result.timeline.last() {
        println!(
            "   After {} months ({}): {} vs {}",
            result.timeline.len(),
            last.month,
            last.new.format_with_symbol(symbol),
            last.original.format_with_symbol(symbol)
        );
    }

    println!();
    println!("   💡 {}", result.recommendation);

    Ok(())
}
