#![deny(warnings)]

//! Headless founder policy.
//!
//! `Autopilot::propose` reads a state snapshot and returns the actions a
//! cautious founder would take next. It never mutates state; the caller routes
//! proposals through the engine, which may still reject them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::{
    Candidate, CandidateId, EventEffect, EventOption, GameState, OfficeTier, PlayerAction,
    Recruiter, Role, RoleSubclass, RoundType, SearchId, MAX_SEARCHES_PER_RECRUITER,
};
use sim_econ::runway;
use tracing::debug;

/// Tunables for the policy.
#[derive(Clone, Debug, PartialEq)]
pub struct AutopilotConfig {
    /// Start raising once runway falls below this many months.
    pub raise_below_runway: f64,
    /// Only hire while runway after the hire stays above this.
    pub hire_runway_floor: f64,
    /// Stop growing the team at this size.
    pub max_team: usize,
    /// Keep at least this much founder equity when bringing on a co-founder.
    pub min_equity_for_cofounder: Decimal,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            raise_below_runway: 9.0,
            hire_runway_floor: 12.0,
            max_team: 12,
            min_equity_for_cofounder: Decimal::from(60),
        }
    }
}

/// Weighted utility: higher is better. Cash is weighted up when runway is short.
pub fn utility(cash_k: f64, product_points: f64, equity_points: f64, runway_months: f64) -> f64 {
    let cash_weight = if runway_months < 6.0 { 3.0 } else { 1.0 };
    cash_k * cash_weight + product_points * 2.0 - equity_points * 40.0
}

/// Score an event option by summing its effects. A recurring expense counts
/// as a year of cost.
pub fn option_utility(option: &EventOption, runway_months: f64) -> f64 {
    let (mut cash, mut product, mut equity) = (0.0, 0.0, 0.0);
    for effect in &option.effects {
        match effect {
            EventEffect::Money(v) => cash += v.to_f64().unwrap_or(0.0) / 1000.0,
            EventEffect::Expense(v) => cash -= v.to_f64().unwrap_or(0.0) * 12.0 / 1000.0,
            EventEffect::Product(v) => product += v,
            EventEffect::Equity(v) => equity += v.to_f64().unwrap_or(0.0),
        }
    }
    utility(cash, product, equity, runway_months)
}

#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    config: AutopilotConfig,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AutopilotConfig {
        &self.config
    }

    /// Actions for the current snapshot, most urgent first.
    pub fn propose(&self, state: &GameState) -> Vec<PlayerAction> {
        if state.is_game_over() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        self.answer_events(state, &mut actions);
        self.manage_funding(state, &mut actions);
        self.grow_team(state, &mut actions);
        self.staff_features(state, &mut actions);
        if !actions.is_empty() {
            debug!(count = actions.len(), day = state.clock.current_time, "autopilot proposals");
        }
        actions
    }

    fn answer_events(&self, state: &GameState, out: &mut Vec<PlayerAction>) {
        let runway_months = state.treasury.runway;
        for event in &state.events.pending_events {
            let best = event.options.iter().max_by(|a, b| {
                option_utility(a, runway_months).total_cmp(&option_utility(b, runway_months))
            });
            if let Some(option) = best {
                out.push(PlayerAction::RespondToEvent {
                    event: event.id.clone(),
                    option: option.id.clone(),
                });
            }
        }
    }

    fn manage_funding(&self, state: &GameState, out: &mut Vec<PlayerAction>) {
        let funding = &state.funding;
        let now = state.clock.current_time;
        if let Some(round) = funding.active_round() {
            let best = round
                .offers
                .iter()
                .filter(|o| !o.is_expired(now) && o.equity_percent <= funding.total_equity)
                .max_by_key(|o| {
                    if o.equity_percent > Decimal::ZERO {
                        o.amount / o.equity_percent
                    } else {
                        Decimal::ZERO
                    }
                });
            if let Some(offer) = best {
                out.push(PlayerAction::AcceptOffer {
                    offer: offer.id.clone(),
                });
            }
            return;
        }
        if state.treasury.runway < self.config.raise_below_runway {
            let next = match funding.highest_completed() {
                Some(done) => done.next(),
                None => Some(RoundType::Seed),
            };
            if let Some(round) = next {
                out.push(PlayerAction::StartFundraising { round });
            }
        }
    }

    fn grow_team(&self, state: &GameState, out: &mut Vec<PlayerAction>) {
        let team = &state.team;
        if team.cofounder().is_none() && state.funding.total_equity >= self.config.min_equity_for_cofounder {
            out.push(PlayerAction::HireCofounder);
        }
        if team.employees.len() >= self.config.max_team {
            return;
        }

        let subclass = self.scarcer_engineering_subclass(state);
        let recruiter = Recruiter::Founder;
        let engineering_search_open = team
            .active_hiring_searches
            .iter()
            .any(|s| s.is_active() && s.role == Role::Engineer && s.recruiter == recruiter);
        if !engineering_search_open && team.searches_by(&recruiter) < MAX_SEARCHES_PER_RECRUITER {
            out.push(PlayerAction::StartHiringSearch {
                role: Role::Engineer,
                subclass: Some(subclass),
                recruiter,
            });
        }

        let seats_full = team.employees.len() >= state.offices.total_capacity as usize;
        if seats_full {
            if let Some(tier) = self.affordable_office(state) {
                out.push(PlayerAction::PurchaseOffice { tier });
            }
            return;
        }
        if let Some((candidate, search)) = self.best_affordable_candidate(state) {
            out.push(PlayerAction::Hire { candidate, search });
        }
    }

    fn scarcer_engineering_subclass(&self, state: &GameState) -> RoleSubclass {
        let count = |sub: RoleSubclass| {
            state
                .team
                .employees
                .iter()
                .filter(|e| e.role == Role::Engineer && e.role_subclass == Some(sub))
                .count()
        };
        if count(RoleSubclass::Backend) < count(RoleSubclass::Frontend) {
            RoleSubclass::Backend
        } else {
            RoleSubclass::Frontend
        }
    }

    /// Runway that would remain after paying `upfront` and adding `monthly` cost.
    fn runway_after(&self, state: &GameState, upfront: Decimal, monthly: Decimal) -> f64 {
        let t = &state.treasury;
        let burn = (t.monthly_expenses + monthly - t.monthly_revenue).max(Decimal::ZERO);
        runway(t.money - upfront, burn)
    }

    fn affordable_office(&self, state: &GameState) -> Option<OfficeTier> {
        [OfficeTier::Small, OfficeTier::Medium, OfficeTier::Large]
            .into_iter()
            .filter(|tier| tier.spec().capacity > state.offices.total_capacity / 2)
            .find(|tier| {
                self.runway_after(state, tier.purchase_cost(), tier.monthly_cost())
                    >= self.config.hire_runway_floor
            })
    }

    fn best_affordable_candidate(&self, state: &GameState) -> Option<(CandidateId, Option<SearchId>)> {
        let from_pool = state.team.candidate_pool.iter().map(|c| (c, None));
        let from_searches = state
            .team
            .active_hiring_searches
            .iter()
            .flat_map(|s| s.candidates.iter().map(move |c| (c, Some(&s.id))));
        from_pool
            .chain(from_searches)
            .filter(|(c, _)| !c.role.is_cofounder() && c.role != Role::Operations)
            .filter(|(c, _)| {
                let upfront = c.expected_salary + Decimal::from(3_000);
                self.runway_after(state, upfront, c.expected_salary) >= self.config.hire_runway_floor
            })
            .max_by(|(a, _), (b, _)| value_for_money(a).total_cmp(&value_for_money(b)))
            .map(|(c, s)| (c.id.clone(), s.cloned()))
    }

    fn staff_features(&self, state: &GameState, out: &mut Vec<PlayerAction>) {
        let idle = state.team.employees.iter().any(|e| {
            e.onboarding_complete && e.role.builds_product() && e.assigned_feature_id.is_none()
        });
        let work_left = state.product.features.iter().any(|f| !f.is_complete());
        if idle && work_left {
            out.push(PlayerAction::AutoAssignTeams);
        }
    }
}

/// Productivity per thousand dollars of salary, with product builders favoured.
fn value_for_money(c: &Candidate) -> f64 {
    let salary_k = c.expected_salary.to_f64().unwrap_or(f64::MAX) / 1000.0;
    let builder = if c.role.builds_product() { 1.5 } else { 1.0 };
    c.productivity * builder / salary_k.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use sim_core::{EventId, EventKind, GameConfig, GameEvent};
    use sim_runtime::GameEngine;

    fn engine(money: i64, seed: u64) -> GameEngine {
        GameEngine::new(
            &GameConfig::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
                .with_starting_money(Decimal::from(money))
                .with_product("project-management")
                .with_seed(seed),
        )
    }

    fn option(id: &str, effects: Vec<EventEffect>) -> EventOption {
        EventOption {
            id: id.to_string(),
            label: id.to_string(),
            description: String::new(),
            effects,
        }
    }

    #[test]
    fn utility_is_monotonic() {
        assert!(utility(1.0, 0.0, 0.0, 12.0) < utility(2.0, 0.0, 0.0, 12.0));
        assert!(utility(0.0, 1.0, 0.0, 12.0) < utility(0.0, 2.0, 0.0, 12.0));
        assert!(utility(0.0, 0.0, 2.0, 12.0) < utility(0.0, 0.0, 1.0, 12.0));
        assert!(utility(1.0, 0.0, 0.0, 12.0) < utility(1.0, 0.0, 0.0, 2.0));
    }

    #[test]
    fn fresh_company_recruits() {
        let e = engine(250_000, 1);
        let actions = Autopilot::default().propose(e.state());
        assert!(actions.contains(&PlayerAction::HireCofounder));
        assert!(actions.iter().any(|a| matches!(
            a,
            PlayerAction::StartHiringSearch {
                role: Role::Engineer,
                subclass: Some(RoleSubclass::Frontend),
                recruiter: Recruiter::Founder,
            }
        )));
        assert!(actions.iter().any(|a| matches!(a, PlayerAction::Hire { .. })));
    }

    #[test]
    fn broke_company_neither_hires_nor_buys() {
        let e = engine(10_000, 2);
        let actions = Autopilot::default().propose(e.state());
        assert!(!actions.iter().any(|a| matches!(a, PlayerAction::Hire { .. } | PlayerAction::PurchaseOffice { .. })));
        assert!(actions.contains(&PlayerAction::StartFundraising {
            round: RoundType::Seed
        }));
    }

    #[test]
    fn emergency_cash_wins_when_runway_is_short() {
        let mut state = engine(10_000, 3).snapshot();
        state.events.pending_events.push(GameEvent {
            id: EventId("event-99".into()),
            kind: EventKind::Financial,
            title: "Emergency Funding".into(),
            description: String::new(),
            options: vec![
                option("decline", vec![]),
                option("accept", vec![EventEffect::Money(Decimal::from(100_000))]),
            ],
            triggered_at: 0.0,
            expires_at: 2.0,
            subject: None,
        });
        let actions = Autopilot::default().propose(&state);
        assert!(actions.contains(&PlayerAction::RespondToEvent {
            event: EventId("event-99".into()),
            option: "accept".into(),
        }));
    }

    #[test]
    fn equity_is_expensive() {
        let keep = option("keep", vec![EventEffect::Product(-10.0)]);
        let give = option("give", vec![EventEffect::Equity(Decimal::from(5))]);
        assert!(option_utility(&keep, 12.0) > option_utility(&give, 12.0));
        let raise = option("raise", vec![EventEffect::Expense(Decimal::from(3_000))]);
        assert!(option_utility(&raise, 12.0) < 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn autopilot_never_breaks_invariants(seed in any::<u64>(), months in 1u32..10) {
            let mut e = engine(300_000, seed);
            e.set_paused(false);
            let pilot = Autopilot::default();
            for _ in 0..months * 30 {
                for action in pilot.propose(e.state()) {
                    let _ = e.dispatch(action);
                }
                e.advance_days(1);
                let s = e.state();
                prop_assert!(sim_core::validate_state(s).is_ok());
                prop_assert!(s.funding.total_equity >= Decimal::ZERO);
                if s.is_game_over() {
                    break;
                }
            }
        }
    }
}
