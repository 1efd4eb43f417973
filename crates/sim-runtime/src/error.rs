use rust_decimal::Decimal;
use sim_core::{Role, RoundType};
use thiserror::Error;

/// Reasons a player action is rejected. Rejection never mutates state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    #[error("candidate {0} not found")]
    CandidateNotFound(String),
    #[error("employee {0} not found")]
    EmployeeNotFound(String),
    #[error("feature {0} not found")]
    FeatureNotFound(String),
    #[error("offer {0} not found in the active round")]
    OfferNotFound(String),
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    #[error("office capacity of {0} seats reached")]
    CapacityExceeded(u32),
    #[error("a co-founder is already on the team or being recruited")]
    DuplicateCofounder,
    #[error("granting {0} equity points would exceed remaining equity")]
    InsufficientEquity(Decimal),
    #[error("role {0} does not accept that subclass")]
    InvalidSubclass(Role),
    #[error("recruiter must be the founder or the co-founder")]
    InvalidRecruiter,
    #[error("recruiter already runs {0} active searches")]
    RecruiterOverbooked(usize),
    #[error("a funding round is already in progress")]
    RoundInProgress,
    #[error("{requested} cannot start before its predecessor completes")]
    RoundOutOfSequence { requested: RoundType },
    #[error("monthly revenue {actual} below the {required} required")]
    RevenueRequirement { required: Decimal, actual: Decimal },
    #[error("offer {0} has expired")]
    OfferExpired(String),
    #[error("employee {0} cannot be staffed on features")]
    NotAssignable(String),
    #[error("game speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),
}
