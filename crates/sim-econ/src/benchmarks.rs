//! Customer and investor benchmark tables.

use sim_core::{Category, Milestone};

/// Per-category customer economics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryBenchmark {
    /// Average revenue per customer, USD per month.
    pub arpu_usd: u32,
    /// Customers acquired per salesperson per month at full maturity.
    pub acquisition_rate: f64,
}

pub fn category_benchmark(category: Category) -> CategoryBenchmark {
    let (arpu_usd, acquisition_rate) = match category {
        Category::Crm => (120, 4.0),
        Category::Productivity => (20, 12.0),
        Category::Analytics => (75, 6.0),
        Category::Ai => (100, 5.0),
        Category::Hr => (10, 20.0),
    };
    CategoryBenchmark {
        arpu_usd,
        acquisition_rate,
    }
}

/// Every milestone-keyed multiplier used by the economy, in one row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MilestoneFactors {
    pub arpu_multiplier: f64,
    pub acquisition_multiplier: f64,
    /// Monthly share of customers lost.
    pub churn_rate: f64,
    /// Weight of the milestone in investor interest.
    pub investor_weight: f64,
    pub offer_amount_multiplier: f64,
    pub offer_equity_multiplier: f64,
    /// Stage multiplier for investor-quoted valuations.
    pub valuation_multiplier: f64,
}

const IDEA: MilestoneFactors = MilestoneFactors {
    arpu_multiplier: 0.0,
    acquisition_multiplier: 0.0,
    churn_rate: 0.0,
    investor_weight: 0.1,
    offer_amount_multiplier: 0.4,
    offer_equity_multiplier: 1.4,
    valuation_multiplier: 0.5,
};

const MVP: MilestoneFactors = MilestoneFactors {
    arpu_multiplier: 0.5,
    acquisition_multiplier: 0.3,
    churn_rate: 0.13,
    investor_weight: 0.3,
    offer_amount_multiplier: 0.6,
    offer_equity_multiplier: 1.15,
    valuation_multiplier: 0.7,
};

const VALIDATED: MilestoneFactors = MilestoneFactors {
    arpu_multiplier: 0.7,
    acquisition_multiplier: 0.6,
    churn_rate: 0.07,
    investor_weight: 0.6,
    offer_amount_multiplier: 0.85,
    offer_equity_multiplier: 1.0,
    valuation_multiplier: 0.9,
};

const GROWING: MilestoneFactors = MilestoneFactors {
    arpu_multiplier: 0.9,
    acquisition_multiplier: 0.9,
    churn_rate: 0.04,
    investor_weight: 0.85,
    offer_amount_multiplier: 1.0,
    offer_equity_multiplier: 0.9,
    valuation_multiplier: 1.1,
};

const MATURE: MilestoneFactors = MilestoneFactors {
    arpu_multiplier: 1.0,
    acquisition_multiplier: 1.0,
    churn_rate: 0.015,
    investor_weight: 1.0,
    offer_amount_multiplier: 1.15,
    offer_equity_multiplier: 0.85,
    valuation_multiplier: 1.3,
};

pub fn milestone_factors(milestone: Milestone) -> &'static MilestoneFactors {
    match milestone {
        Milestone::Idea => &IDEA,
        Milestone::Mvp => &MVP,
        Milestone::Validated => &VALIDATED,
        Milestone::Growing => &GROWING,
        Milestone::Mature => &MATURE,
    }
}
