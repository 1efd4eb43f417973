//! World-state data model.
//!
//! Every type here is plain serializable data. Derived aggregates (expenses,
//! burn, runway, team totals, progress) are written only by the runtime's
//! recompute passes, never set independently.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use crate::calendar;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a hired employee, e.g. "emp-12".
    EmployeeId
);
string_id!(
    /// Identifier of a candidate (pool or search generated).
    CandidateId
);
string_id!(
    /// Identifier of a hiring search.
    SearchId
);
string_id!(
    /// Identifier of a product feature, unique within a product.
    FeatureId
);
string_id!(
    /// Identifier of a feature component.
    ComponentId
);
string_id!(
    /// Identifier of a funding round.
    RoundId
);
string_id!(
    /// Identifier of a funding offer.
    OfferId
);
string_id!(
    /// Identifier of a narrative event.
    EventId
);
string_id!(
    /// Identifier of a purchased office.
    OfficeId
);

/// Monotonic id source shared by every subsystem that creates entities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    /// Produce the next id with the given prefix, e.g. `emp-3`.
    pub fn next<T: From<String>>(&mut self, prefix: &str) -> T {
        self.next += 1;
        T::from(format!("{prefix}-{}", self.next))
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// Employee roles. `Cofounder` also parses from `"cto"`; the two names are one role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Engineer,
    Designer,
    Sales,
    Marketing,
    Operations,
    #[serde(alias = "cto")]
    Cofounder,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Engineer,
        Role::Designer,
        Role::Sales,
        Role::Marketing,
        Role::Operations,
        Role::Cofounder,
    ];

    pub fn is_cofounder(self) -> bool {
        matches!(self, Role::Cofounder)
    }

    /// Engineers and designers must carry a subclass; everyone else must not.
    pub fn accepts_subclass(self, subclass: Option<RoleSubclass>) -> bool {
        match (self, subclass) {
            (Role::Engineer, Some(s)) => s.is_engineering(),
            (Role::Designer, Some(s)) => !s.is_engineering(),
            (Role::Engineer | Role::Designer, None) => false,
            (_, None) => true,
            (_, Some(_)) => false,
        }
    }

    /// Roles that can be staffed on a feature.
    pub fn builds_product(self) -> bool {
        matches!(self, Role::Engineer | Role::Designer | Role::Cofounder)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Engineer => "engineer",
            Role::Designer => "designer",
            Role::Sales => "sales",
            Role::Marketing => "marketing",
            Role::Operations => "operations",
            Role::Cofounder => "cofounder",
        };
        f.write_str(s)
    }
}

/// Specialization of engineers (frontend/backend) and designers (product/visual).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSubclass {
    Frontend,
    Backend,
    Product,
    Visual,
}

impl RoleSubclass {
    pub fn is_engineering(self) -> bool {
        matches!(self, RoleSubclass::Frontend | RoleSubclass::Backend)
    }
}

/// Seniority, ordered junior < mid < senior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

/// A hired team member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: Role,
    /// Required for engineers/designers, absent otherwise.
    pub role_subclass: Option<RoleSubclass>,
    /// Monthly salary in USD.
    pub salary: Decimal,
    /// Productivity rating in [0, 1].
    pub productivity: f64,
    /// Game time (days) of hire.
    pub hire_date: f64,
    /// False for the first 14 days after hire; co-founders start onboarded.
    pub onboarding_complete: bool,
    pub experience_level: ExperienceLevel,
    /// Equity points held; co-founders only.
    pub equity_percent: Option<Decimal>,
    /// Back-reference to the feature this employee is staffed on.
    pub assigned_feature_id: Option<FeatureId>,
}

/// A prospective hire; consumed when hired.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub role: Role,
    pub role_subclass: Option<RoleSubclass>,
    /// Monthly salary the candidate asks for, in USD.
    pub expected_salary: Decimal,
    /// Productivity rating in [0, 1].
    pub productivity: f64,
    pub experience_level: ExperienceLevel,
}

/// Who runs a hiring search.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recruiter {
    /// The player.
    Founder,
    /// An employee, who must be the co-founder.
    Employee(EmployeeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    Active,
    Completed,
}

/// A recruiter-bound search that accrues candidates over time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HiringSearch {
    pub id: SearchId,
    pub role: Role,
    pub role_subclass: Option<RoleSubclass>,
    pub recruiter: Recruiter,
    /// Game time (days) the search opened.
    pub started_at: f64,
    /// Candidates generated so far; grows while active.
    pub candidates: Vec<Candidate>,
    /// One-way: active -> completed.
    pub status: SearchStatus,
}

impl HiringSearch {
    pub fn is_active(&self) -> bool {
        self.status == SearchStatus::Active
    }
}

/// Roster, candidates and derived team totals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    pub employees: Vec<Employee>,
    /// Legacy flat pool seeded at game start.
    pub candidate_pool: Vec<Candidate>,
    pub active_hiring_searches: Vec<HiringSearch>,
    /// Derived: sum of salaries.
    pub total_monthly_salary: Decimal,
    /// Derived: role-weighted productivity of onboarded staff.
    pub total_productivity: f64,
}

impl TeamState {
    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }

    pub fn employee_mut(&mut self, id: &EmployeeId) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|e| &e.id == id)
    }

    pub fn cofounder(&self) -> Option<&Employee> {
        self.employees.iter().find(|e| e.role.is_cofounder())
    }

    /// Number of onboarded employees holding `role`.
    pub fn onboarded_count(&self, role: Role) -> usize {
        self.employees
            .iter()
            .filter(|e| e.role == role && e.onboarding_complete)
            .count()
    }

    /// Active searches currently run by `recruiter`.
    pub fn searches_by(&self, recruiter: &Recruiter) -> usize {
        self.active_hiring_searches
            .iter()
            .filter(|s| s.is_active() && &s.recruiter == recruiter)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// Product maturity stage, derived from the share of fully complete features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Milestone {
    Idea,
    Mvp,
    Validated,
    Growing,
    Mature,
}

impl Milestone {
    pub const ALL: [Milestone; 5] = [
        Milestone::Idea,
        Milestone::Mvp,
        Milestone::Validated,
        Milestone::Growing,
        Milestone::Mature,
    ];

    /// Map the completed-feature ratio onto thresholds 0.2/0.4/0.6/0.8.
    pub fn from_completion_ratio(ratio: f64) -> Milestone {
        if ratio < 0.2 {
            Milestone::Idea
        } else if ratio < 0.4 {
            Milestone::Mvp
        } else if ratio < 0.6 {
            Milestone::Validated
        } else if ratio < 0.8 {
            Milestone::Growing
        } else {
            Milestone::Mature
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Milestone::Idea => "idea",
            Milestone::Mvp => "mvp",
            Milestone::Validated => "validated",
            Milestone::Growing => "growing",
            Milestone::Mature => "mature",
        };
        f.write_str(s)
    }
}

/// A unit of work inside a feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureComponent {
    pub id: ComponentId,
    pub name: String,
    /// Weight for aggregation, 1-10.
    pub base_complexity: f64,
    /// Nominal single-engineer completion time in days (> 0).
    pub estimated_days: f64,
    /// 0-100, never decreases.
    pub progress: f64,
}

impl FeatureComponent {
    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }
}

/// Staffing needed before a feature counts as properly resourced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRequirements {
    pub min_seniority: ExperienceLevel,
    pub frontend: u32,
    pub backend: u32,
    pub product: u32,
    pub visual: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub name: String,
    pub description: String,
    /// Dense 1..=N rank, unique per feature.
    pub priority: u32,
    /// Weight for overall progress, 1-10.
    pub base_complexity: f64,
    /// Fixed at product selection.
    pub components: Vec<FeatureComponent>,
    /// Derived: complexity-weighted mean of component progress.
    pub progress: f64,
    /// Employees staffed here; an employee is on at most one feature.
    pub assigned_team: BTreeSet<EmployeeId>,
    pub requirements: FeatureRequirements,
    pub unlocks_capability: Option<String>,
}

impl Feature {
    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductState {
    /// 0-100, complexity-weighted mean of features.
    pub overall_progress: f64,
    pub current_milestone: Milestone,
    pub features: Vec<Feature>,
    /// overall_progress / 100.
    pub maturity: f64,
    /// 0-1, never decreases.
    pub quality: f64,
    /// 0-1, never decreases.
    pub product_market_fit: f64,
    /// Locked once development has started.
    pub product_template_id: Option<String>,
}

impl ProductState {
    pub fn feature(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| &f.id == id)
    }

    pub fn feature_mut(&mut self, id: &FeatureId) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| &f.id == id)
    }

    /// Whether switching templates is still allowed.
    pub fn template_locked(&self) -> bool {
        self.product_template_id.is_some() && self.overall_progress > 0.0
    }
}

// ---------------------------------------------------------------------------
// Funding
// ---------------------------------------------------------------------------

/// Funding rounds in the order they must be raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundType {
    Seed,
    SeriesA,
    SeriesB,
    SeriesC,
    SeriesD,
}

impl RoundType {
    pub const ALL: [RoundType; 5] = [
        RoundType::Seed,
        RoundType::SeriesA,
        RoundType::SeriesB,
        RoundType::SeriesC,
        RoundType::SeriesD,
    ];

    pub fn previous(self) -> Option<RoundType> {
        match self {
            RoundType::Seed => None,
            RoundType::SeriesA => Some(RoundType::Seed),
            RoundType::SeriesB => Some(RoundType::SeriesA),
            RoundType::SeriesC => Some(RoundType::SeriesB),
            RoundType::SeriesD => Some(RoundType::SeriesC),
        }
    }

    pub fn next(self) -> Option<RoundType> {
        match self {
            RoundType::Seed => Some(RoundType::SeriesA),
            RoundType::SeriesA => Some(RoundType::SeriesB),
            RoundType::SeriesB => Some(RoundType::SeriesC),
            RoundType::SeriesC => Some(RoundType::SeriesD),
            RoundType::SeriesD => None,
        }
    }
}

impl fmt::Display for RoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundType::Seed => "seed",
            RoundType::SeriesA => "seriesA",
            RoundType::SeriesB => "seriesB",
            RoundType::SeriesC => "seriesC",
            RoundType::SeriesD => "seriesD",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundStatus {
    InProgress,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingOffer {
    pub id: OfferId,
    pub round_type: RoundType,
    /// Cash offered, USD.
    pub amount: Decimal,
    /// Company valuation quoted by the investor, USD.
    pub valuation: Decimal,
    /// Equity points asked for (one decimal).
    pub equity_percent: Decimal,
    pub requirements: Vec<String>,
    /// Game time (days) after which the offer lapses.
    pub expires_at: f64,
}

impl FundingOffer {
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    pub id: RoundId,
    pub round_type: RoundType,
    /// One-way: in progress -> completed | failed.
    pub status: RoundStatus,
    pub started_at: f64,
    pub offers: Vec<FundingOffer>,
    /// 0-1, fixed at round start.
    pub investor_interest: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingState {
    /// Founder equity points; starts at 100 and never goes negative.
    pub total_equity: Decimal,
    /// Cumulative cash raised, USD.
    pub total_raised: Decimal,
    /// Append-only history, including the active round.
    pub rounds: Vec<FundingRound>,
    /// Id of the single in-progress round, if any.
    pub active_round: Option<RoundId>,
}

impl Default for FundingState {
    fn default() -> Self {
        Self {
            total_equity: Decimal::ONE_HUNDRED,
            total_raised: Decimal::ZERO,
            rounds: Vec::new(),
            active_round: None,
        }
    }
}

impl FundingState {
    pub fn active_round(&self) -> Option<&FundingRound> {
        let id = self.active_round.as_ref()?;
        self.rounds.iter().find(|r| &r.id == id)
    }

    pub fn active_round_mut(&mut self) -> Option<&mut FundingRound> {
        let id = self.active_round.clone()?;
        self.rounds.iter_mut().find(|r| r.id == id)
    }

    /// The most advanced round type that reached `completed`.
    pub fn highest_completed(&self) -> Option<RoundType> {
        self.rounds
            .iter()
            .filter(|r| r.status == RoundStatus::Completed)
            .map(|r| r.round_type)
            .max()
    }
}

// ---------------------------------------------------------------------------
// Offices, customers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfficeTier {
    Coworking,
    Small,
    Medium,
    Large,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub id: OfficeId,
    pub tier: OfficeTier,
    /// Seats.
    pub capacity: u32,
    /// Rent in USD per month.
    pub monthly_cost: Decimal,
    pub name: String,
    pub description: String,
}

/// Purchased offices; totals only ever grow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficeState {
    pub offices: Vec<Office>,
    pub total_capacity: u32,
    pub total_monthly_cost: Decimal,
}

/// Recomputed in the monthly cycle only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerState {
    pub total_customers: u64,
    pub monthly_acquisitions: u64,
    pub monthly_churn: u64,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Team,
    Product,
    Financial,
    Market,
}

/// One step of an event option's outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum EventEffect {
    /// Added to the treasury.
    Money(Decimal),
    /// Durable monthly cost change; raises the subject's salary when the event has one.
    Expense(Decimal),
    /// Added to overall product progress, clamped to [0, 100].
    Product(f64),
    /// Equity points moved from the founder to the event's subject.
    Equity(Decimal),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventOption {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Applied in order.
    pub effects: Vec<EventEffect>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    pub options: Vec<EventOption>,
    pub triggered_at: f64,
    pub expires_at: f64,
    /// Employee the event is about, e.g. the co-founder.
    pub subject: Option<EmployeeId>,
}

impl GameEvent {
    pub fn is_expired(&self, now: f64) -> bool {
        now > self.expires_at
    }
}

/// Maximum number of events awaiting a response.
pub const MAX_PENDING_EVENTS: usize = 3;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventState {
    pub pending_events: Vec<GameEvent>,
    /// Append-only.
    pub event_history: Vec<GameEvent>,
    pub last_event_time: f64,
}

// ---------------------------------------------------------------------------
// Clock, treasury, root
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// Fractional days since `start_date`.
    pub current_time: f64,
    /// Calendar anchor; immutable after creation.
    pub start_date: NaiveDate,
    pub is_paused: bool,
    /// Simulated days per real second; always > 0.
    pub game_speed: f64,
}

impl Clock {
    /// Calendar date of the current simulated day.
    pub fn date(&self) -> NaiveDate {
        calendar::game_date(self.start_date, self.current_time)
    }
}

/// Number of monthly revenue entries retained.
pub const REVENUE_HISTORY_LEN: usize = 12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Treasury {
    /// Cash in USD; may dip below zero before game over is flagged.
    pub money: Decimal,
    pub monthly_expenses: Decimal,
    pub monthly_revenue: Decimal,
    /// Oldest first, at most 12 entries.
    pub revenue_history: VecDeque<Decimal>,
    /// max(0, expenses - revenue).
    pub burn_rate: Decimal,
    /// Months of cash left; infinite when not burning.
    pub runway: f64,
    /// Durable monthly cost added by events.
    pub recurring_overhead: Decimal,
}

impl Treasury {
    /// Append a month of revenue, evicting the oldest entries beyond the cap.
    pub fn record_revenue(&mut self, revenue: Decimal) {
        self.revenue_history.push_back(revenue);
        while self.revenue_history.len() > REVENUE_HISTORY_LEN {
            self.revenue_history.pop_front();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverReason {
    Bankruptcy,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOverReason::Bankruptcy => f.write_str("bankruptcy"),
        }
    }
}

/// The single mutable root of a running simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub clock: Clock,
    pub treasury: Treasury,
    pub team: TeamState,
    pub product: ProductState,
    pub funding: FundingState,
    pub offices: OfficeState,
    pub customers: CustomerState,
    pub events: EventState,
    /// One-way: once set, time stops.
    pub game_over: Option<GameOverReason>,
    #[serde(default)]
    pub ids: IdSequence,
}

impl GameState {
    pub fn is_game_over(&self) -> bool {
        self.game_over.is_some()
    }
}
