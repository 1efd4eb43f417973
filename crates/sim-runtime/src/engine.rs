//! The simulation engine: owns the world state and the RNG, advances time in
//! bounded sub-steps and routes player actions.
//!
//! Each sub-step runs the phases in a fixed order: daily (product, hiring,
//! financial refresh), weekly (financial refresh), monthly (customers, cash
//! flow, revenue history, onboarding, funding, event roll), then the daily
//! event roll and the bankruptcy check.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sim_core::{
    calendar, content, product_template, Candidate, CandidateId, Category, Clock, CustomerState,
    Employee, EmployeeId, EventId, EventState, FeatureId, FundingRound, FundingState, GameConfig,
    GameOverReason, GameState, IdSequence, Milestone, OfferId, OfficeId, OfficeState, OfficeTier,
    PlayerAction, ProductState, ProductTemplate, Recruiter, Role, RoleSubclass, RoundId,
    RoundStatus, RoundType, SearchId, SearchStatus, TeamState, Treasury,
    MAX_SEARCHES_PER_RECRUITER,
};
use sim_econ::{
    burn_rate, churned_customers, company_valuation, customer_acquisitions, investor_interest,
    monthly_expenses, revenue_from_customers, runway, team_productivity,
};
use std::collections::VecDeque;
use tracing::{debug, info, trace, warn};

use crate::error::ActionError;
use crate::events::{self, EventContext};
use crate::funding::{self, OfferContext};
use crate::hiring;
use crate::product;
use crate::staffing;

/// Longest simulated interval processed in one sub-step, in days.
pub const MAX_STEP_DAYS: f64 = 1.0;
/// One-off recruiting fee charged on every regular hire, USD.
pub const RECRUITING_FEE_USD: i64 = 3_000;
/// Days after hiring before an employee counts as onboarded.
pub const ONBOARDING_DAYS: f64 = 14.0;

/// Where a candidate was found when hiring.
enum Source {
    Search(usize, usize),
    Pool(usize),
}

/// A running game.
#[derive(Debug)]
pub struct GameEngine {
    state: GameState,
    rng: ChaCha8Rng,
    /// Day number of the last processed daily phase.
    last_day: i64,
}

impl GameEngine {
    /// Create a paused game at day zero from `config`.
    pub fn new(config: &GameConfig) -> Self {
        let mut rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut ids = IdSequence::default();

        let template = config.selected_product_id.as_deref().and_then(|id| {
            let found = product_template(id);
            if found.is_none() {
                warn!(template = id, "unknown product template, using the default product");
            }
            found
        });
        let features = match template {
            Some(t) => t.build_features(&mut rng),
            None => content::default_features(&mut rng),
        };
        let product = ProductState {
            overall_progress: 0.0,
            current_milestone: Milestone::Idea,
            features,
            maturity: 0.0,
            quality: 0.5,
            product_market_fit: 0.0,
            product_template_id: template.map(|t| t.id.to_string()),
        };

        let office = OfficeTier::Coworking.office(ids.next("office"));
        let offices = OfficeState {
            total_capacity: office.capacity,
            total_monthly_cost: office.monthly_cost,
            offices: vec![office],
        };
        let team = TeamState {
            candidate_pool: hiring::initial_candidate_pool(&mut ids, &mut rng),
            ..TeamState::default()
        };

        let state = GameState {
            clock: Clock {
                current_time: 0.0,
                start_date: config.start_date,
                is_paused: true,
                game_speed: 1.0,
            },
            treasury: Treasury {
                money: config.resolved_starting_money(),
                monthly_expenses: Decimal::ZERO,
                monthly_revenue: Decimal::ZERO,
                revenue_history: VecDeque::new(),
                burn_rate: Decimal::ZERO,
                runway: f64::INFINITY,
                recurring_overhead: Decimal::ZERO,
            },
            team,
            product,
            funding: FundingState::default(),
            offices,
            customers: CustomerState::default(),
            events: EventState::default(),
            game_over: None,
            ids,
        };
        let mut engine = Self {
            state,
            rng,
            last_day: -1,
        };
        engine.recompute_financials();
        info!(
            money = %engine.state.treasury.money,
            product = ?engine.state.product.product_template_id,
            "game created"
        );
        engine
    }

    /// Resume from an existing state, e.g. a deserialized save.
    pub fn with_state(state: GameState, rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let last_day = if state.clock.current_time > 0.0 {
            calendar::day_number(state.clock.current_time)
        } else {
            -1
        };
        let mut engine = Self {
            state,
            rng,
            last_day,
        };
        engine.recompute_financials();
        engine
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned copy of the world for rendering or saving.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Current valuation; falls back to cash when the inputs are not representable.
    pub fn company_valuation(&self) -> Decimal {
        let t = &self.state.treasury;
        company_valuation(t.money, t.burn_rate, t.monthly_revenue, &t.revenue_history)
            .unwrap_or(t.money)
    }

    fn template(&self) -> Option<&'static ProductTemplate> {
        self.state
            .product
            .product_template_id
            .as_deref()
            .and_then(product_template)
    }

    fn category(&self) -> Category {
        self.template().map(|t| t.category).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance by `elapsed_ms` of real time scaled by the game speed.
    /// No-op while paused or after game over.
    pub fn tick(&mut self, elapsed_ms: f64) {
        if self.state.clock.is_paused || self.state.is_game_over() {
            return;
        }
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return;
        }
        let mut remaining = elapsed_ms / 1000.0 * self.state.clock.game_speed;
        while remaining > 0.0 && !self.state.is_game_over() {
            let step = remaining.min(MAX_STEP_DAYS);
            remaining -= step;
            self.step(step);
        }
    }

    /// Run whole simulated days independent of the game speed. Like `tick`,
    /// this is a no-op while paused.
    pub fn advance_days(&mut self, days: u32) {
        if self.state.clock.is_paused {
            return;
        }
        for _ in 0..days {
            if self.state.is_game_over() {
                break;
            }
            self.step(1.0);
        }
    }

    fn step(&mut self, days: f64) {
        let prev = self.state.clock.current_time;
        let next = prev + days;
        self.state.clock.current_time = next;
        events::drop_expired(&mut self.state.events, next);

        let crossed = calendar::boundaries(self.state.clock.start_date, self.last_day, prev, next);
        if crossed.new_day {
            self.last_day = calendar::day_number(next);
            self.daily_phase();
        }
        if crossed.new_week {
            self.recompute_financials();
        }
        if crossed.new_month {
            self.monthly_phase(prev);
        }
        trace!(
            day = next,
            money = %self.state.treasury.money,
            runway = self.state.treasury.runway,
            "tick"
        );
        if crossed.new_day {
            self.roll_event();
        }
        self.check_game_over();
    }

    fn daily_phase(&mut self) {
        let now = self.state.clock.current_time;
        if !calendar::is_weekend(self.state.clock.date()) {
            self.state.product = product::advance_product(&self.state.product, &self.state.team.employees);
        }
        self.complete_onboarding(now);
        hiring::update_hiring_searches(
            &mut self.state.team.active_hiring_searches,
            &mut self.state.ids,
            now,
            &mut self.rng,
        );
        self.recompute_financials();
    }

    /// `prev` is the time before the step, so the closing month is the one
    /// the previous date falls in.
    fn monthly_phase(&mut self, prev: f64) {
        let closing = calendar::game_date(self.state.clock.start_date, prev);
        let milestone = self.state.product.current_milestone;
        let category = self.category();

        let team = &self.state.team;
        let acquired = customer_acquisitions(
            milestone,
            category,
            self.state.product.product_market_fit,
            team.onboarded_count(Role::Sales),
            team.onboarded_count(Role::Marketing),
        );
        let acquired = (acquired as f64 * calendar::weekday_fraction(closing)).round() as u64;
        let lost = churned_customers(self.state.customers.total_customers, milestone);
        let total = (self.state.customers.total_customers + acquired).saturating_sub(lost);
        self.state.customers = CustomerState {
            total_customers: total,
            monthly_acquisitions: acquired,
            monthly_churn: lost,
        };
        self.recompute_financials();

        let t = &mut self.state.treasury;
        t.money = t.money - t.monthly_expenses + t.monthly_revenue;
        self.recompute_financials();
        let revenue = self.state.treasury.monthly_revenue;
        self.state.treasury.record_revenue(revenue);
        info!(
            month = %closing,
            money = %self.state.treasury.money,
            revenue = %revenue,
            customers = total,
            "month closed"
        );

        self.complete_onboarding(self.state.clock.current_time);

        if self.state.funding.active_round.is_some() {
            let ctx = self.offer_context();
            funding::update_funding(&mut self.state.funding, &mut self.state.ids, &ctx, &mut self.rng);
        }
        self.roll_event();
    }

    fn complete_onboarding(&mut self, now: f64) {
        for e in self.state.team.employees.iter_mut() {
            if !e.onboarding_complete && now - e.hire_date >= ONBOARDING_DAYS {
                e.onboarding_complete = true;
                debug!(employee = %e.id, "onboarding complete");
            }
        }
    }

    fn offer_context(&self) -> OfferContext {
        OfferContext {
            milestone: self.state.product.current_milestone,
            monthly_revenue: self.state.treasury.monthly_revenue,
            maturity: self.state.product.maturity,
            product_market_fit: self.state.product.product_market_fit,
            team_size: self.state.team.employees.len(),
            template: self.template(),
            now: self.state.clock.current_time,
        }
    }

    fn roll_event(&mut self) {
        let ctx = EventContext {
            now: self.state.clock.current_time,
            runway: self.state.treasury.runway,
            cofounder: self.state.team.cofounder(),
        };
        events::roll_event(&mut self.state.events, &mut self.state.ids, &ctx, &mut self.rng);
    }

    fn check_game_over(&mut self) {
        let t = &self.state.treasury;
        if t.money <= Decimal::ZERO && t.runway <= 0.0 {
            self.state.game_over = Some(GameOverReason::Bankruptcy);
            info!(
                day = self.state.clock.current_time,
                money = %t.money,
                "game over: {}",
                GameOverReason::Bankruptcy
            );
        }
    }

    /// Refresh every derived financial field from the current roster,
    /// offices and customers.
    pub fn recompute_financials(&mut self) {
        let category = self.category();
        let s = &mut self.state;
        s.team.total_monthly_salary = s.team.employees.iter().map(|e| e.salary).sum();
        s.team.total_productivity = team_productivity(&s.team.employees);
        s.treasury.monthly_revenue = revenue_from_customers(
            s.customers.total_customers,
            category,
            s.product.current_milestone,
        );
        s.treasury.monthly_expenses = monthly_expenses(
            &s.team.employees,
            s.offices.total_monthly_cost,
            s.treasury.recurring_overhead,
        );
        s.treasury.burn_rate = burn_rate(s.treasury.monthly_expenses, s.treasury.monthly_revenue);
        s.treasury.runway = runway(s.treasury.money, s.treasury.burn_rate);
    }

    // -----------------------------------------------------------------------
    // Clock controls
    // -----------------------------------------------------------------------

    pub fn set_paused(&mut self, paused: bool) {
        self.state.clock.is_paused = paused;
    }

    pub fn set_game_speed(&mut self, speed: f64) -> Result<(), ActionError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ActionError::InvalidSpeed(speed));
        }
        self.state.clock.game_speed = speed;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Team
    // -----------------------------------------------------------------------

    fn locate_candidate(&self, candidate: &CandidateId, search: Option<&SearchId>) -> Option<Source> {
        let searches = &self.state.team.active_hiring_searches;
        let in_search = searches.iter().enumerate().find_map(|(si, s)| {
            if matches!(search, Some(id) if id != &s.id) {
                return None;
            }
            s.candidates
                .iter()
                .position(|c| &c.id == candidate)
                .map(|ci| Source::Search(si, ci))
        });
        in_search.or_else(|| {
            self.state
                .team
                .candidate_pool
                .iter()
                .position(|c| &c.id == candidate)
                .map(Source::Pool)
        })
    }

    fn take_candidate(&mut self, source: Source) -> Candidate {
        let team = &mut self.state.team;
        match source {
            Source::Search(si, ci) => team.active_hiring_searches[si].candidates.remove(ci),
            Source::Pool(i) => team.candidate_pool.remove(i),
        }
    }

    /// Equity asked by a co-founder, falling with company age.
    fn draw_cofounder_equity(&mut self) -> Decimal {
        let days = self.state.clock.current_time;
        let (lo, hi) = if days <= 30.0 {
            (20.0, 25.0)
        } else if days <= 90.0 {
            (15.0, 20.0)
        } else {
            (10.0, 15.0)
        };
        let draw: f64 = self.rng.gen_range(lo..=hi);
        Decimal::from_f64(draw)
            .map(|d| d.round_dp(1))
            .unwrap_or_else(|| Decimal::from(lo as i64))
    }

    fn cofounder_terms(&mut self) -> Result<Decimal, ActionError> {
        if self.state.team.cofounder().is_some() {
            return Err(ActionError::DuplicateCofounder);
        }
        let equity = self.draw_cofounder_equity();
        if equity > self.state.funding.total_equity {
            return Err(ActionError::InsufficientEquity(equity));
        }
        Ok(equity)
    }

    fn admit(&mut self, candidate: Candidate, equity: Option<Decimal>) -> EmployeeId {
        let now = self.state.clock.current_time;
        let id: EmployeeId = self.state.ids.next("emp");
        let cofounder = candidate.role.is_cofounder();
        let employee = Employee {
            id: id.clone(),
            name: candidate.name,
            role: candidate.role,
            role_subclass: candidate.role_subclass,
            salary: candidate.expected_salary,
            productivity: candidate.productivity,
            hire_date: now,
            onboarding_complete: cofounder,
            experience_level: candidate.experience_level,
            equity_percent: equity,
            assigned_feature_id: None,
        };
        info!(
            employee = %employee.id,
            name = %employee.name,
            role = %employee.role,
            salary = %employee.salary,
            "hired"
        );
        self.state.team.employees.push(employee);
        if let Some(points) = equity {
            self.state.funding.total_equity -= points;
            for s in self.state.team.active_hiring_searches.iter_mut() {
                if s.is_active() && s.role.is_cofounder() {
                    s.status = SearchStatus::Completed;
                }
            }
        }
        self.recompute_financials();
        id
    }

    /// Hire a candidate from a search (checked first) or the starting pool.
    ///
    /// Regular hires need a free seat and cash for the first month's salary
    /// plus the recruiting fee. A co-founder costs equity instead and is
    /// onboarded immediately.
    pub fn hire_employee(
        &mut self,
        candidate: &CandidateId,
        search: Option<&SearchId>,
    ) -> Result<EmployeeId, ActionError> {
        let source = self
            .locate_candidate(candidate, search)
            .ok_or_else(|| ActionError::CandidateNotFound(candidate.0.clone()))?;
        let (role, salary) = {
            let c = match &source {
                Source::Search(si, ci) => &self.state.team.active_hiring_searches[*si].candidates[*ci],
                Source::Pool(i) => &self.state.team.candidate_pool[*i],
            };
            (c.role, c.expected_salary)
        };

        if role.is_cofounder() {
            let equity = self.cofounder_terms()?;
            let c = self.take_candidate(source);
            return Ok(self.admit(c, Some(equity)));
        }

        let capacity = self.state.offices.total_capacity;
        if self.state.team.employees.len() >= capacity as usize {
            return Err(ActionError::CapacityExceeded(capacity));
        }
        let cost = salary + Decimal::from(RECRUITING_FEE_USD);
        let available = self.state.treasury.money;
        if available < cost {
            return Err(ActionError::InsufficientFunds {
                needed: cost,
                available,
            });
        }
        self.state.treasury.money -= cost;
        let c = self.take_candidate(source);
        Ok(self.admit(c, None))
    }

    /// Bring on a freshly generated co-founder without a search.
    pub fn hire_cofounder(&mut self) -> Result<EmployeeId, ActionError> {
        let equity = self.cofounder_terms()?;
        let c = hiring::generate_candidate(&mut self.state.ids, Role::Cofounder, None, &mut self.rng);
        Ok(self.admit(c, Some(equity)))
    }

    /// Let an employee go. Their feature slot is freed and any searches they
    /// were running close. Unknown ids are ignored.
    pub fn fire_employee(&mut self, employee: &EmployeeId) {
        if self.state.team.employee(employee).is_none() {
            warn!(employee = %employee, "fire: no such employee");
            return;
        }
        staffing::release(&mut self.state.team, &mut self.state.product, employee);
        self.state.team.employees.retain(|e| &e.id != employee);
        let recruiter = Recruiter::Employee(employee.clone());
        for s in self.state.team.active_hiring_searches.iter_mut() {
            if s.is_active() && s.recruiter == recruiter {
                s.status = SearchStatus::Completed;
            }
        }
        info!(employee = %employee, "employee left");
        self.recompute_financials();
    }

    /// Open a recruiter-bound search. The recruiter is the founder or the
    /// co-founder, each running at most two searches at a time.
    pub fn start_hiring_search(
        &mut self,
        role: Role,
        subclass: Option<RoleSubclass>,
        recruiter: Recruiter,
    ) -> Result<SearchId, ActionError> {
        if !role.accepts_subclass(subclass) {
            return Err(ActionError::InvalidSubclass(role));
        }
        let team = &self.state.team;
        if role.is_cofounder()
            && (team.cofounder().is_some()
                || team
                    .active_hiring_searches
                    .iter()
                    .any(|s| s.is_active() && s.role.is_cofounder()))
        {
            return Err(ActionError::DuplicateCofounder);
        }
        if let Recruiter::Employee(id) = &recruiter {
            let is_cofounder = team.employee(id).is_some_and(|e| e.role.is_cofounder());
            if !is_cofounder {
                return Err(ActionError::InvalidRecruiter);
            }
        }
        let running = team.searches_by(&recruiter);
        if running >= MAX_SEARCHES_PER_RECRUITER {
            return Err(ActionError::RecruiterOverbooked(running));
        }
        let search = hiring::start_hiring_search(
            &mut self.state.ids,
            role,
            subclass,
            recruiter,
            self.state.clock.current_time,
        );
        let id = search.id.clone();
        info!(search = %id, role = %role, "hiring search started");
        self.state.team.active_hiring_searches.push(search);
        Ok(id)
    }

    /// Drop a search and its candidates.
    pub fn cancel_hiring_search(&mut self, search: &SearchId) {
        let before = self.state.team.active_hiring_searches.len();
        self.state.team.active_hiring_searches.retain(|s| &s.id != search);
        if self.state.team.active_hiring_searches.len() == before {
            warn!(search = %search, "cancel: no such search");
        }
    }

    // -----------------------------------------------------------------------
    // Funding
    // -----------------------------------------------------------------------

    /// Open the next round. Rounds run strictly in order starting at seed, one
    /// at a time, and later rounds need minimum monthly revenue.
    pub fn start_fundraising(&mut self, round: RoundType) -> Result<RoundId, ActionError> {
        if self.state.funding.active_round.is_some() {
            return Err(ActionError::RoundInProgress);
        }
        let allowed = match self.state.funding.highest_completed() {
            Some(done) => done.next(),
            None => Some(RoundType::Seed),
        };
        if allowed != Some(round) {
            return Err(ActionError::RoundOutOfSequence { requested: round });
        }
        let required = funding::revenue_requirement(round);
        let actual = self.state.treasury.monthly_revenue;
        if actual < required {
            return Err(ActionError::RevenueRequirement { required, actual });
        }
        let interest = investor_interest(
            self.state.product.current_milestone,
            self.state.product.overall_progress,
            self.state.team.employees.len(),
            actual,
        );
        let id: RoundId = self.state.ids.next("round");
        self.state.funding.rounds.push(FundingRound {
            id: id.clone(),
            round_type: round,
            status: RoundStatus::InProgress,
            started_at: self.state.clock.current_time,
            offers: Vec::new(),
            investor_interest: interest,
        });
        self.state.funding.active_round = Some(id.clone());
        info!(round = %round, interest, "fundraising started");
        Ok(id)
    }

    /// Take an offer from the active round, closing the round. Sibling offers
    /// are discarded. Returns the cash raised.
    pub fn accept_funding_offer(&mut self, offer: &OfferId) -> Result<Decimal, ActionError> {
        let now = self.state.clock.current_time;
        let equity_left = self.state.funding.total_equity;
        let round = self
            .state
            .funding
            .active_round()
            .ok_or_else(|| ActionError::OfferNotFound(offer.0.clone()))?;
        let chosen = round
            .offers
            .iter()
            .find(|o| &o.id == offer)
            .ok_or_else(|| ActionError::OfferNotFound(offer.0.clone()))?;
        if chosen.is_expired(now) {
            return Err(ActionError::OfferExpired(offer.0.clone()));
        }
        if chosen.equity_percent > equity_left {
            return Err(ActionError::InsufficientEquity(chosen.equity_percent));
        }
        let (amount, equity) = (chosen.amount, chosen.equity_percent);

        if let Some(round) = self.state.funding.active_round_mut() {
            round.offers.retain(|o| &o.id == offer);
            round.status = RoundStatus::Completed;
            info!(round = %round.round_type, amount = %amount, equity = %equity, "offer accepted");
        }
        let f = &mut self.state.funding;
        f.active_round = None;
        f.total_equity -= equity;
        f.total_raised += amount;
        self.state.treasury.money += amount;
        self.recompute_financials();
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Events, offices, product
    // -----------------------------------------------------------------------

    /// Resolve a pending event with one of its options. Unknown events or
    /// options are ignored.
    pub fn respond_to_event(&mut self, event: &EventId, option: &str) {
        let Some(idx) = self
            .state
            .events
            .pending_events
            .iter()
            .position(|e| &e.id == event)
        else {
            warn!(event = %event, "respond: event not pending");
            return;
        };
        let Some(effects) = self.state.events.pending_events[idx]
            .options
            .iter()
            .find(|o| o.id == option)
            .map(|o| o.effects.clone())
        else {
            warn!(event = %event, option, "respond: unknown option");
            return;
        };
        let resolved = self.state.events.pending_events.remove(idx);
        for effect in &effects {
            events::apply_effect(&mut self.state, effect, resolved.subject.as_ref());
        }
        debug!(event = %resolved.id, option, "event resolved");
        self.state.events.event_history.push(resolved);
        self.recompute_financials();
    }

    /// Buy an office for three months of its rent. Capacity and rent add to
    /// the existing totals.
    pub fn purchase_office(&mut self, tier: OfficeTier) -> Result<OfficeId, ActionError> {
        let cost = tier.purchase_cost();
        let available = self.state.treasury.money;
        if available < cost {
            return Err(ActionError::InsufficientFunds {
                needed: cost,
                available,
            });
        }
        self.state.treasury.money -= cost;
        let office = tier.office(self.state.ids.next("office"));
        let id = office.id.clone();
        let offices = &mut self.state.offices;
        offices.total_capacity += office.capacity;
        offices.total_monthly_cost += office.monthly_cost;
        info!(office = %id, name = %office.name, capacity = offices.total_capacity, "office purchased");
        offices.offices.push(office);
        self.recompute_financials();
        Ok(id)
    }

    /// Replace the product with a template's features. Ignored for unknown
    /// templates and once a chosen template has made progress.
    pub fn select_product_template(&mut self, template_id: &str) {
        let Some(template) = product_template(template_id) else {
            warn!(template = template_id, "select: unknown product template");
            return;
        };
        if self.state.product.template_locked() {
            debug!(template = template_id, "select: product already in development");
            return;
        }
        staffing::clear_all(&mut self.state.team, &mut self.state.product);
        self.state.product = ProductState {
            overall_progress: 0.0,
            current_milestone: Milestone::Idea,
            features: template.build_features(&mut self.rng),
            maturity: 0.0,
            quality: 0.5,
            product_market_fit: 0.0,
            product_template_id: Some(template.id.to_string()),
        };
        info!(template = template.id, features = self.state.product.features.len(), "product selected");
        self.recompute_financials();
    }

    /// Move a feature to `priority` (clamped to 1..=N), swapping with the
    /// feature that held it so priorities stay a permutation.
    pub fn prioritize_feature(&mut self, feature: &FeatureId, priority: i64) {
        let features = &mut self.state.product.features;
        let n = features.len() as i64;
        let Some(current) = features.iter().find(|f| &f.id == feature).map(|f| f.priority) else {
            warn!(feature = %feature, "prioritize: no such feature");
            return;
        };
        let target = priority.clamp(1, n.max(1)) as u32;
        if target == current {
            return;
        }
        for f in features.iter_mut() {
            if &f.id == feature {
                f.priority = target;
            } else if f.priority == target {
                f.priority = current;
            }
        }
        features.sort_by_key(|f| f.priority);
    }

    pub fn assign_employee_to_feature(
        &mut self,
        employee: &EmployeeId,
        feature: &FeatureId,
    ) -> Result<(), ActionError> {
        staffing::assign(&mut self.state.team, &mut self.state.product, employee, feature)
    }

    pub fn unassign_employee_from_feature(&mut self, employee: &EmployeeId, feature: &FeatureId) {
        if !staffing::unassign(&mut self.state.team, &mut self.state.product, employee, feature) {
            debug!(employee = %employee, feature = %feature, "unassign: not on feature");
        }
    }

    pub fn auto_assign_teams(&mut self) {
        staffing::auto_assign(&mut self.state.team, &mut self.state.product);
    }

    /// Route a serialized player action to its operation.
    pub fn dispatch(&mut self, action: PlayerAction) -> Result<(), ActionError> {
        match action {
            PlayerAction::Hire { candidate, search } => {
                self.hire_employee(&candidate, search.as_ref()).map(drop)
            }
            PlayerAction::Fire { employee } => {
                self.fire_employee(&employee);
                Ok(())
            }
            PlayerAction::StartHiringSearch {
                role,
                subclass,
                recruiter,
            } => self.start_hiring_search(role, subclass, recruiter).map(drop),
            PlayerAction::CancelHiringSearch { search } => {
                self.cancel_hiring_search(&search);
                Ok(())
            }
            PlayerAction::HireCofounder => self.hire_cofounder().map(drop),
            PlayerAction::StartFundraising { round } => self.start_fundraising(round).map(drop),
            PlayerAction::AcceptOffer { offer } => self.accept_funding_offer(&offer).map(drop),
            PlayerAction::RespondToEvent { event, option } => {
                self.respond_to_event(&event, &option);
                Ok(())
            }
            PlayerAction::PurchaseOffice { tier } => self.purchase_office(tier).map(drop),
            PlayerAction::SelectProduct { template_id } => {
                self.select_product_template(&template_id);
                Ok(())
            }
            PlayerAction::PrioritizeFeature { feature, priority } => {
                self.prioritize_feature(&feature, priority);
                Ok(())
            }
            PlayerAction::AssignEmployee { employee, feature } => {
                self.assign_employee_to_feature(&employee, &feature)
            }
            PlayerAction::UnassignEmployee { employee, feature } => {
                self.unassign_employee_from_feature(&employee, &feature);
                Ok(())
            }
            PlayerAction::AutoAssignTeams => {
                self.auto_assign_teams();
                Ok(())
            }
            PlayerAction::SetPaused { paused } => {
                self.set_paused(paused);
                Ok(())
            }
            PlayerAction::SetGameSpeed { speed } => self.set_game_speed(speed),
        }
    }
}
