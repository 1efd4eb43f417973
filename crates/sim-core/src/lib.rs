#![deny(warnings)]

//! Core domain models and invariants for the founder simulation.
//!
//! This crate defines the serializable world state, static content tables,
//! calendar helpers and player commands shared by every other crate, plus
//! validation helpers that check the cross-entity invariants of a state.

pub mod action;
pub mod calendar;
pub mod content;
pub mod model;

pub use action::{Difficulty, GameConfig, PlayerAction};
pub use content::{product_template, Category, ProductTemplate, OFFICE_TIERS, PRODUCT_TEMPLATES};
pub use model::*;

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Validation errors for world-state invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Founder equity dropped below zero.
    #[error("total equity {0} is negative")]
    NegativeEquity(Decimal),
    /// More than one co-founder on the roster.
    #[error("{0} co-founders on the roster, at most one allowed")]
    MultipleCofounders(usize),
    /// Two employees share an id.
    #[error("duplicate employee id: {0}")]
    DuplicateEmployee(String),
    /// Role and subclass do not pair up.
    #[error("employee {0} has an invalid role/subclass pairing")]
    InvalidSubclass(String),
    /// Feature priorities are not a permutation of 1..=N.
    #[error("feature priorities are not a dense 1..N permutation")]
    PriorityNotPermutation,
    /// Feature assignment and employee back-reference disagree.
    #[error("assignment of employee {0} is inconsistent")]
    AssignmentMismatch(String),
    /// Progress value outside [0, 100].
    #[error("progress out of range on {0}")]
    ProgressOutOfRange(String),
    /// Revenue history longer than its cap.
    #[error("revenue history holds {0} entries")]
    RevenueHistoryOverflow(usize),
    /// More than one round in progress, or the active pointer is stale.
    #[error("active funding round is inconsistent")]
    ActiveRoundMismatch,
    /// A recruiter runs more searches than allowed.
    #[error("recruiter {0} runs too many searches")]
    RecruiterOverbooked(String),
    /// Too many pending events.
    #[error("{0} pending events exceed the limit")]
    TooManyEvents(usize),
    /// Numeric field must be finite.
    #[error("non-finite numeric value encountered")]
    NonFinite,
}

/// Maximum concurrently active searches per recruiter.
pub const MAX_SEARCHES_PER_RECRUITER: usize = 2;

/// Validate the team roster: unique ids, a single co-founder, valid subclasses.
pub fn validate_team(team: &TeamState) -> Result<(), ValidationError> {
    let mut ids = BTreeSet::new();
    for e in &team.employees {
        if !ids.insert(&e.id) {
            return Err(ValidationError::DuplicateEmployee(e.id.0.clone()));
        }
        if !e.role.accepts_subclass(e.role_subclass) {
            return Err(ValidationError::InvalidSubclass(e.id.0.clone()));
        }
        if !e.productivity.is_finite() {
            return Err(ValidationError::NonFinite);
        }
    }
    let cofounders = team.employees.iter().filter(|e| e.role.is_cofounder()).count();
    if cofounders > 1 {
        return Err(ValidationError::MultipleCofounders(cofounders));
    }
    let mut per_recruiter: BTreeMap<String, usize> = BTreeMap::new();
    for s in team.active_hiring_searches.iter().filter(|s| s.is_active()) {
        let key = match &s.recruiter {
            Recruiter::Founder => "founder".to_string(),
            Recruiter::Employee(id) => id.0.clone(),
        };
        let n = per_recruiter.entry(key.clone()).or_insert(0);
        *n += 1;
        if *n > MAX_SEARCHES_PER_RECRUITER {
            return Err(ValidationError::RecruiterOverbooked(key));
        }
    }
    Ok(())
}

/// Validate product structure and the assignment back-references.
pub fn validate_product(product: &ProductState, team: &TeamState) -> Result<(), ValidationError> {
    let in_range = |p: f64| p.is_finite() && (0.0..=100.0).contains(&p);
    if !in_range(product.overall_progress) {
        return Err(ValidationError::ProgressOutOfRange("product".to_string()));
    }
    let mut prios: Vec<u32> = product.features.iter().map(|f| f.priority).collect();
    prios.sort_unstable();
    if prios.iter().enumerate().any(|(i, p)| *p as usize != i + 1) {
        return Err(ValidationError::PriorityNotPermutation);
    }
    let mut seen = BTreeSet::new();
    for f in &product.features {
        if !in_range(f.progress) {
            return Err(ValidationError::ProgressOutOfRange(f.id.0.clone()));
        }
        if let Some(c) = f.components.iter().find(|c| !in_range(c.progress)) {
            return Err(ValidationError::ProgressOutOfRange(c.id.0.clone()));
        }
        for emp in &f.assigned_team {
            let back = team.employee(emp).and_then(|e| e.assigned_feature_id.as_ref());
            if back != Some(&f.id) || !seen.insert(emp) {
                return Err(ValidationError::AssignmentMismatch(emp.0.clone()));
            }
        }
    }
    for e in &team.employees {
        if let Some(fid) = &e.assigned_feature_id {
            let listed = product
                .feature(fid)
                .map(|f| f.assigned_team.contains(&e.id))
                .unwrap_or(false);
            if !listed {
                return Err(ValidationError::AssignmentMismatch(e.id.0.clone()));
            }
        }
    }
    Ok(())
}

/// Validate funding bookkeeping.
pub fn validate_funding(funding: &FundingState) -> Result<(), ValidationError> {
    if funding.total_equity < Decimal::ZERO {
        return Err(ValidationError::NegativeEquity(funding.total_equity));
    }
    let in_progress: Vec<&FundingRound> = funding
        .rounds
        .iter()
        .filter(|r| r.status == RoundStatus::InProgress)
        .collect();
    let consistent = match (&funding.active_round, in_progress.as_slice()) {
        (None, []) => true,
        (Some(id), [r]) => &r.id == id,
        _ => false,
    };
    if !consistent {
        return Err(ValidationError::ActiveRoundMismatch);
    }
    Ok(())
}

/// Validate the whole world state.
pub fn validate_state(state: &GameState) -> Result<(), ValidationError> {
    if !state.clock.current_time.is_finite() || state.clock.game_speed <= 0.0 {
        return Err(ValidationError::NonFinite);
    }
    validate_team(&state.team)?;
    validate_product(&state.product, &state.team)?;
    validate_funding(&state.funding)?;
    let history = state.treasury.revenue_history.len();
    if history > REVENUE_HISTORY_LEN {
        return Err(ValidationError::RevenueHistoryOverflow(history));
    }
    let pending = state.events.pending_events.len();
    if pending > MAX_PENDING_EVENTS {
        return Err(ValidationError::TooManyEvents(pending));
    }
    Ok(())
}
