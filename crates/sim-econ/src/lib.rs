#![deny(warnings)]

//! Economic models: the financial calculator for the founder simulation.
//!
//! This crate provides pure helpers for:
//! - Burn rate, runway and monthly expenses
//! - Role-weighted team productivity
//! - Customer acquisition, churn and subscription revenue
//! - Company valuation, investor-quoted valuation and investor interest

pub mod benchmarks;

pub use benchmarks::{category_benchmark, milestone_factors, CategoryBenchmark, MilestoneFactors};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sim_core::{Category, Employee, Milestone, Role};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Numeric conversion between float and decimal failed.
    #[error("non-finite numeric conversion")]
    NonFinite,
}

/// Fixed monthly overhead on top of payroll and rent, USD.
pub const BASE_OVERHEAD_USD: i64 = 2_000;

/// Burn rate: `max(0, expenses - revenue)`.
pub fn burn_rate(expenses: Decimal, revenue: Decimal) -> Decimal {
    (expenses - revenue).max(Decimal::ZERO)
}

/// Months of cash left; `+inf` when not burning, negative when already in debt.
///
/// Example:
/// assert!(runway(Decimal::ZERO, Decimal::ZERO).is_infinite());
pub fn runway(money: Decimal, burn_rate: Decimal) -> f64 {
    if burn_rate <= Decimal::ZERO {
        return f64::INFINITY;
    }
    money
        .checked_div(burn_rate)
        .and_then(|r| r.to_f64())
        .unwrap_or(if money.is_sign_negative() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        })
}

/// Payroll + office rent + durable event overhead + base overhead.
pub fn monthly_expenses(
    employees: &[Employee],
    office_cost: Decimal,
    recurring_overhead: Decimal,
) -> Decimal {
    let payroll: Decimal = employees.iter().map(|e| e.salary).sum();
    payroll + office_cost + recurring_overhead + Decimal::from(BASE_OVERHEAD_USD)
}

/// Contribution weight of a role to overall team productivity.
pub fn role_multiplier(role: Role) -> f64 {
    match role {
        Role::Engineer => 1.0,
        Role::Designer => 0.7,
        Role::Sales => 0.5,
        Role::Marketing => 0.4,
        Role::Operations => 0.3,
        Role::Cofounder => 1.2,
    }
}

/// Sum of `productivity * role_multiplier` over onboarded employees.
pub fn team_productivity(employees: &[Employee]) -> f64 {
    employees
        .iter()
        .filter(|e| e.onboarding_complete)
        .map(|e| e.productivity * role_multiplier(e.role))
        .sum()
}

/// Expected new customers in a month, rounded to the nearest integer.
///
/// Zero at the idea stage or without salespeople. Marketing amplifies sales
/// by up to +50% (two marketers per salesperson); product-market fit scales
/// the result between 0.5x and 1x.
pub fn customer_acquisitions(
    milestone: Milestone,
    category: Category,
    product_market_fit: f64,
    sales: usize,
    marketing: usize,
) -> u64 {
    if milestone == Milestone::Idea || sales == 0 {
        return 0;
    }
    let base = category_benchmark(category).acquisition_rate;
    let stage = milestone_factors(milestone).acquisition_multiplier;
    let marketing_mult = 1.0 + (marketing as f64 / (sales as f64).max(f64::EPSILON)).min(2.0) * 0.25;
    let fit_mult = 0.5 + product_market_fit.clamp(0.0, 1.0) * 0.5;
    let n = base * sales as f64 * stage * marketing_mult * fit_mult;
    if n.is_finite() && n > 0.0 {
        n.round() as u64
    } else {
        0
    }
}

/// Monthly churn rate for a milestone.
pub fn churn_rate(milestone: Milestone) -> f64 {
    milestone_factors(milestone).churn_rate
}

/// Customers lost this month: `round(total * churn_rate)`.
pub fn churned_customers(total_customers: u64, milestone: Milestone) -> u64 {
    (total_customers as f64 * churn_rate(milestone)).round() as u64
}

/// Monthly subscription revenue, rounded to whole dollars.
pub fn revenue_from_customers(total_customers: u64, category: Category, milestone: Milestone) -> Decimal {
    if milestone == Milestone::Idea || total_customers == 0 {
        return Decimal::ZERO;
    }
    let arpu = f64::from(category_benchmark(category).arpu_usd);
    let mult = milestone_factors(milestone).arpu_multiplier;
    Decimal::from((total_customers as f64 * arpu * mult).round() as i64)
}

/// Company valuation from cash, burn, revenue and trailing revenue growth.
///
/// Annual revenue is valued at a 5x multiple, raised with growth (oldest vs
/// newest history entry) and clamped to [3, 15]. Short runway (< 6 months)
/// discounts down to 0.5x; profitability earns a 1.2x premium. Never below cash.
pub fn company_valuation(
    cash: Decimal,
    burn_rate: Decimal,
    revenue: Decimal,
    revenue_history: &VecDeque<Decimal>,
) -> Result<Decimal, EconError> {
    let mut value = cash;
    if revenue > Decimal::ZERO {
        let annual = revenue * Decimal::from(12);
        let growth = match (revenue_history.front(), revenue_history.back()) {
            (Some(oldest), Some(newest)) if revenue_history.len() >= 2 && *oldest > Decimal::ZERO => {
                ((*newest - *oldest) / *oldest).to_f64().ok_or(EconError::NonFinite)?
            }
            _ => 0.0,
        };
        let mut multiple = 5.0;
        if growth > 0.0 {
            multiple = 5.0 * (1.0 + growth * 10.0).min(3.0);
        }
        let multiple = Decimal::from_f64(multiple.clamp(3.0, 15.0)).ok_or(EconError::NonFinite)?;
        value += annual * multiple;
    }
    if burn_rate > Decimal::ZERO {
        let months = runway(cash, burn_rate);
        if months < 6.0 {
            let discount = Decimal::from_f64((months / 6.0).max(0.5)).ok_or(EconError::NonFinite)?;
            value *= discount;
        }
    } else {
        value *= Decimal::new(12, 1);
    }
    Ok(value.max(cash))
}

/// Valuation an investor quotes alongside an offer.
///
/// `(revenue * 10 + maturity * 500k + team * 50k + pmf * 1M) * stage multiplier`.
pub fn offer_valuation(
    revenue: Decimal,
    maturity: f64,
    team_size: usize,
    product_market_fit: f64,
    milestone: Milestone,
) -> Result<Decimal, EconError> {
    if !(maturity.is_finite() && product_market_fit.is_finite()) {
        return Err(EconError::NonFinite);
    }
    let soft = maturity.clamp(0.0, 1.0) * 500_000.0 + product_market_fit.clamp(0.0, 1.0) * 1_000_000.0;
    let soft = Decimal::from_f64(soft.round()).ok_or(EconError::NonFinite)?;
    let base = revenue * Decimal::from(10) + soft + Decimal::from(team_size as u64 * 50_000);
    let stage = Decimal::from_f64(milestone_factors(milestone).valuation_multiplier)
        .ok_or(EconError::NonFinite)?;
    Ok((base * stage).round())
}

/// Investor interest in [0, 1] at round start.
pub fn investor_interest(
    milestone: Milestone,
    overall_progress: f64,
    team_size: usize,
    revenue: Decimal,
) -> f64 {
    let revenue = revenue.to_f64().unwrap_or(0.0).max(0.0);
    let interest = milestone_factors(milestone).investor_weight * 0.5
        + (overall_progress / 100.0).clamp(0.0, 1.0) * 0.2
        + (team_size as f64 / 10.0).min(1.0) * 0.15
        + (revenue / 50_000.0).min(1.0) * 0.15;
    interest.clamp(0.0, 1.0)
}
