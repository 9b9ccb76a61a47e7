//! Savings plan commands

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use foresight_core::forecast::advice::describe_months;
use foresight_core::{Database, ForecastService, Money, NewPlan, PlanType};

use super::{print_json, Output};

/// Parsed arguments for `plans add`
pub struct PlanArgs {
    pub name: String,
    pub goal: Money,
    pub current: Money,
    pub monthly: Money,
    pub target: Option<NaiveDate>,
    pub plan_type: PlanType,
}

pub fn cmd_plans_list(db: &Database, service: &ForecastService, output: Output) -> Result<()> {
    let plans = db.list_plans()?;

    if output == Output::Json {
        return print_json(&plans);
    }

    if plans.is_empty() {
        println!("No plans yet. Create one with:");
        println!("  foresight plans add --name \"Emergency fund\" --goal 6000");
        return Ok(());
    }

    let symbol = &service.config().currency_symbol;

    println!();
    println!("🎯 Savings Plans");
    println!("   ─────────────────────────────────────────────────────────────");

    for plan in plans {
        let progress = if plan.goal_amount.is_positive() {
            plan.current_amount.ratio(plan.goal_amount) * 100.0
        } else {
            0.0
        };
        let target = plan
            .target_date
            .map(|d| format!(" by {}", d))
            .unwrap_or_default();
        println!(
            "   [{}] {} ({}) │ {} / {} ({:.0}%){}",
            plan.id,
            plan.name,
            plan.plan_type,
            plan.current_amount.format_with_symbol(symbol),
            plan.goal_amount.format_with_symbol(symbol),
            progress,
            target
        );
    }

    Ok(())
}

pub fn cmd_plans_add(db: &Database, args: PlanArgs, symbol: &str) -> Result<()> {
    if args.name.trim().is_empty() {
        anyhow::bail!("Plan name must not be empty");
    }
    if !args.goal.is_positive() {
        anyhow::bail!("Goal amount must be positive");
    }

    let plan = NewPlan {
        name: args.name,
        goal_amount: args.goal,
        current_amount: args.current,
        monthly_contribution: args.monthly,
        target_date: args.target,
        plan_type: args.plan_type,
    };
    let id = db.create_plan(&plan).context("Failed to create plan")?;

    println!(
        "✅ Created plan [{}] {} (goal {})",
        id,
        plan.name,
        plan.goal_amount.format_with_symbol(symbol)
    );
    println!("   Record contributions with: foresight plans contribute {} --amount 100", id);

    Ok(())
}

pub fn cmd_plans_contribute(
    db: &Database,
    id: i64,
    amount: Money,
    date: Option<NaiveDate>,
    symbol: &str,
) -> Result<()> {
    if amount.is_zero() {
        anyhow::bail!("Contribution amount must not be zero");
    }

    let occurred_at = date
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or_else(Utc::now);
    db.record_contribution(id, amount, occurred_at)?;

    let plan = db
        .get_plan(id)?
        .ok_or_else(|| anyhow::anyhow!("Plan {} not found", id))?;

    println!(
        "✅ Recorded {} for {} (now {} of {})",
        amount.format_with_symbol(symbol),
        plan.name,
        plan.current_amount.format_with_symbol(symbol),
        plan.goal_amount.format_with_symbol(symbol)
    );

    Ok(())
}

pub async fn cmd_plans_forecast(
    db: &Database,
    service: &ForecastService,
    id: i64,
    narrate: bool,
    output: Output,
) -> Result<()> {
    let report = service
        .goal_report(db, id, Utc::now().date_naive(), narrate)
        .await?;

    if output == Output::Json {
        return print_json(&report);
    }

    let symbol = &service.config().currency_symbol;
    let f = &report.forecast;

    println!();
    println!("🎯 {} ({:.0}% complete)", f.plan_name, f.progress_percentage);
    println!("   ─────────────────────────────");
    println!(
        "   Saved: {} of {} ({} to go)",
        f.current_amount.format_with_symbol(symbol),
        f.goal_amount.format_with_symbol(symbol),
        f.remaining_amount.format_with_symbol(symbol)
    );
    println!(
        "   Average contribution: {}/month",
        f.average_monthly_contribution.format_with_symbol(symbol)
    );
    println!("   Time to goal: {}", describe_months(f.months_to_goal));
    if let Some(date) = f.estimated_completion_date {
        println!("   Estimated completion: {}", date);
    }
    if let Some(months) = f.months_until_target {
        println!(
            "   Needed for target date ({} months): {}/month",
            months,
            f.recommended_monthly_contribution.format_with_symbol(symbol)
        );
    }

    println!();
    println!("   Scenarios");
    for (label, scenario) in [
        ("Conservative", &f.scenarios.conservative),
        ("Current", &f.scenarios.current),
        ("Aggressive", &f.scenarios.aggressive),
    ] {
        let months = scenario.is_reachable().then_some(scenario.months_to_goal);
        println!(
            "   {:<13} {:>12}/month → {}",
            label,
            scenario.monthly_amount.format_with_symbol(symbol),
            describe_months(months)
        );
    }

    println!();
    println!("   💡 {}", f.advice);
    if let Some(narrative) = &report.narrative {
        println!("   💬 {}", narrative);
    }

    Ok(())
}

pub fn cmd_plans_delete(db: &Database, id: i64) -> Result<()> {
    if !db.delete_plan(id)? {
        anyhow::bail!("Plan {} not found", id);
    }
    println!("🗑️  Deleted plan {}", id);
    Ok(())
}
