//! Expense forecast and goal projection commands

use anyhow::{bail, Result};
use foresight_core::forecast::advice::describe_months;
use foresight_core::forecast::forecast_goal_achievement_now;
use foresight_core::{Database, Error, ForecastService, Money, Trend, MONTHS_UNREACHABLE};
use foresight_server::MAX_HISTORY_MONTHS;

use super::{print_json, Output};

pub async fn cmd_forecast(
    db: &Database,
    service: &ForecastService,
    months: Option<u32>,
    narrate: bool,
    output: Output,
) -> Result<()> {
    let months = months.unwrap_or(service.config().history_months);
    if months == 0 || months > MAX_HISTORY_MONTHS {
        bail!("--months must be between 1 and {}", MAX_HISTORY_MONTHS);
    }
    let report = match service.expense_forecast(db, months, narrate).await {
        Ok(report) => report,
        Err(Error::InsufficientData { required, actual }) => {
            println!(
                "Not enough history yet: need at least {} completed months, found {}.",
                required, actual
            );
            println!("Import more transactions with: foresight import --file statement.csv");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if output == Output::Json {
        return print_json(&report);
    }

    let symbol = &service.config().currency_symbol;
    let forecast = &report.forecast;
    let trend_icon = match forecast.trend {
        Trend::Increasing => "📈",
        Trend::Decreasing => "📉",
        Trend::Stable => "➡️ ",
    };

    println!();
    println!("🔮 Expense Forecast for {}", forecast.month);
    println!("   ─────────────────────────────");
    println!(
        "   Predicted expenses: {}",
        forecast.predicted_expense.format_with_symbol(symbol)
    );
    println!("   Confidence: {}%", forecast.confidence);
    println!(
        "   {} Trend: {} ({:+.1}%)",
        trend_icon, forecast.trend, forecast.percent_change
    );
    println!(
        "   Average income: {}",
        report.monthly_income.format_with_symbol(symbol)
    );

    for factor in &forecast.factors {
        println!("   • {}", factor);
    }

    if !forecast.breakdown.is_empty() {
        println!();
        println!("   Spending by category ({} months)", months);
        for entry in forecast.breakdown.iter().take(8) {
            println!(
                "   {:<24} {:>12}",
                entry.category,
                entry.amount.format_with_symbol(symbol)
            );
        }
    }

    if let Some(narrative) = &report.narrative {
        println!();
        println!("   💬 {}", narrative);
    }

    Ok(())
}

pub fn cmd_goal(
    service: &ForecastService,
    current: Money,
    goal: Money,
    income: Money,
    expense: Money,
    output: Output,
) -> Result<()> {
    let projection = forecast_goal_achievement_now(current, goal, income, expense);

    if output == Output::Json {
        return print_json(&projection);
    }

    let symbol = &service.config().currency_symbol;
    let months = (projection.months_to_goal != MONTHS_UNREACHABLE)
        .then_some(projection.months_to_goal);

    println!();
    println!("🎯 Goal Projection");
    println!("   ─────────────────────────────");
    println!(
        "   Remaining: {} of {}",
        projection.remaining_amount.format_with_symbol(symbol),
        projection.goal_amount.format_with_symbol(symbol)
    );
    println!(
        "   Monthly balance: {} ({:.1}% savings rate)",
        projection.monthly_balance.format_with_symbol(symbol),
        projection.savings_rate
    );
    println!("   Time to goal: {}", describe_months(months));
    if let Some(date) = projection.estimated_completion_date {
        println!("   Estimated completion: {}", date);
    }
    println!("   Feasibility: {}", projection.feasibility);

    if !projection.recommendations.is_empty() {
        println!();
        for rec in &projection.recommendations {
            println!("   💡 {}", rec);
        }
    }

    Ok(())
}
