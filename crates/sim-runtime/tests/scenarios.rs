use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use sim_core::{
    product_template, validate_state, Category, GameConfig, Milestone, OfficeTier, Recruiter,
    Role, RoleSubclass, RoundType, SearchStatus,
};
use sim_runtime::{ActionError, GameEngine};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn engine(seed: u64) -> GameEngine {
    GameEngine::new(
        &GameConfig::new(start())
            .with_starting_money(Decimal::from(100_000))
            .with_seed(seed),
    )
}

#[test]
fn selecting_a_template_builds_its_features() {
    let mut e = engine(1);
    e.select_product_template("project-management");
    let template = product_template("project-management").unwrap();
    let p = &e.state().product;
    assert_eq!(p.overall_progress, 0.0);
    assert_eq!(p.current_milestone, Milestone::Idea);
    assert_eq!(p.features.len(), template.features.len());
    assert!(p.features.iter().all(|f| !f.components.is_empty()));
    assert_eq!(p.product_template_id.as_deref(), Some("project-management"));
}

#[test]
fn an_empty_month_costs_exactly_the_fixed_expenses() {
    let mut e = engine(2);
    let expenses = e.state().treasury.monthly_expenses;
    assert_eq!(expenses, Decimal::from(3_000));
    e.set_paused(false);
    e.tick(31_000.0);
    let s = e.state();
    assert_eq!(s.clock.date(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    assert_eq!(s.treasury.money, Decimal::from(100_000) - expenses);
    assert_eq!(s.treasury.monthly_revenue, Decimal::ZERO);
    assert_eq!(s.treasury.revenue_history.len(), 1);
    validate_state(s).unwrap();
}

#[test]
fn rounds_must_be_raised_in_order() {
    let mut e = engine(3);
    assert_eq!(
        e.start_fundraising(RoundType::SeriesA),
        Err(ActionError::RoundOutOfSequence {
            requested: RoundType::SeriesA
        })
    );
    e.start_fundraising(RoundType::Seed).unwrap();
    assert_eq!(e.start_fundraising(RoundType::Seed), Err(ActionError::RoundInProgress));

    e.set_paused(false);
    e.advance_days(31);
    let best = e.state().funding.active_round().unwrap().offers[0].clone();
    let money = e.state().treasury.money;
    assert_eq!(e.accept_funding_offer(&best.id), Ok(best.amount));
    assert_eq!(e.state().treasury.money, money + best.amount);
    assert_eq!(
        e.state().funding.total_equity,
        Decimal::ONE_HUNDRED - best.equity_percent
    );
    assert!(e.state().funding.active_round.is_none());

    assert_eq!(
        e.start_fundraising(RoundType::SeriesC),
        Err(ActionError::RoundOutOfSequence {
            requested: RoundType::SeriesC
        })
    );
    assert!(matches!(
        e.start_fundraising(RoundType::SeriesA),
        Err(ActionError::RevenueRequirement { .. })
    ));

    let mut state = e.into_state();
    state.product.current_milestone = Milestone::Mature;
    state.customers.total_customers = 1_000;
    let mut e = GameEngine::with_state(state, Some(3));
    assert!(e.state().treasury.monthly_revenue >= Decimal::from(10_000));
    assert!(e.start_fundraising(RoundType::SeriesA).is_ok());
    validate_state(e.state()).unwrap();
}

#[test]
fn regular_hire_debits_fee_and_salary() {
    let mut e = engine(4);
    let candidate = e.state().team.candidate_pool[0].clone();
    let money = e.state().treasury.money;
    let id = e.hire_employee(&candidate.id, None).unwrap();
    let s = e.state();
    assert_eq!(s.treasury.money, money - Decimal::from(3_000) - candidate.expected_salary);
    assert!(s.team.candidate_pool.iter().all(|c| c.id != candidate.id));
    let hired = s.team.employee(&id).unwrap();
    assert!(!hired.onboarding_complete);
    assert_eq!(hired.salary, candidate.expected_salary);
    assert_eq!(
        e.hire_employee(&candidate.id, None),
        Err(ActionError::CandidateNotFound(candidate.id.0.clone()))
    );
}

#[test]
fn cofounder_costs_equity_not_cash() {
    let mut e = engine(5);
    let money = e.state().treasury.money;
    let id = e.hire_cofounder().unwrap();
    let s = e.state();
    let cofounder = s.team.employee(&id).unwrap();
    let equity = cofounder.equity_percent.unwrap();
    assert!(equity >= Decimal::from(20) && equity <= Decimal::from(25));
    assert!(cofounder.onboarding_complete);
    assert_eq!(s.treasury.money, money);
    assert_eq!(s.funding.total_equity, Decimal::ONE_HUNDRED - equity);
    assert_eq!(e.hire_cofounder(), Err(ActionError::DuplicateCofounder));
    assert_eq!(
        e.start_hiring_search(Role::Cofounder, None, Recruiter::Founder),
        Err(ActionError::DuplicateCofounder)
    );
}

#[test]
fn cofounder_found_through_a_search() {
    let mut e = engine(6);
    let search = e
        .start_hiring_search(Role::Cofounder, None, Recruiter::Founder)
        .unwrap();
    e.set_paused(false);
    e.advance_days(15);
    let s = e.state();
    let found = s
        .team
        .active_hiring_searches
        .iter()
        .find(|h| h.id == search)
        .unwrap();
    let candidate = found.candidates[0].clone();
    let money = s.treasury.money;
    e.hire_employee(&candidate.id, Some(&search)).unwrap();
    let s = e.state();
    assert_eq!(s.treasury.money, money);
    assert!(s.team.cofounder().is_some());
    let closed = s.team.active_hiring_searches.iter().find(|h| h.id == search).unwrap();
    assert_eq!(closed.status, SearchStatus::Completed);
}

#[test]
fn recruiters_are_limited_to_two_searches() {
    let mut e = engine(7);
    let eng = Some(RoleSubclass::Backend);
    e.start_hiring_search(Role::Engineer, eng, Recruiter::Founder).unwrap();
    e.start_hiring_search(Role::Sales, None, Recruiter::Founder).unwrap();
    assert_eq!(
        e.start_hiring_search(Role::Marketing, None, Recruiter::Founder),
        Err(ActionError::RecruiterOverbooked(2))
    );
    assert_eq!(
        e.start_hiring_search(Role::Engineer, None, Recruiter::Founder),
        Err(ActionError::InvalidSubclass(Role::Engineer))
    );
    let hire = e.state().team.candidate_pool[0].clone();
    let emp = e.hire_employee(&hire.id, None).unwrap();
    assert_eq!(
        e.start_hiring_search(Role::Sales, None, Recruiter::Employee(emp)),
        Err(ActionError::InvalidRecruiter)
    );
    let cofounder = e.hire_cofounder().unwrap();
    e.start_hiring_search(Role::Sales, None, Recruiter::Employee(cofounder))
        .unwrap();
}

#[test]
fn capacity_and_cash_gate_hiring() {
    let mut e = GameEngine::new(
        &GameConfig::new(start())
            .with_starting_money(Decimal::from(2_000))
            .with_seed(8),
    );
    let c = e.state().team.candidate_pool[0].id.clone();
    assert!(matches!(
        e.hire_employee(&c, None),
        Err(ActionError::InsufficientFunds { .. })
    ));
    assert!(matches!(
        e.purchase_office(OfficeTier::Small),
        Err(ActionError::InsufficientFunds { .. })
    ));
    assert_eq!(e.state().treasury.money, Decimal::from(2_000));

    let mut e = GameEngine::new(
        &GameConfig::new(start())
            .with_starting_money(Decimal::from(1_000_000))
            .with_seed(8),
    );
    let pool: Vec<_> = e.state().team.candidate_pool.iter().map(|c| c.id.clone()).collect();
    for c in &pool[..5] {
        e.hire_employee(c, None).unwrap();
    }
    assert_eq!(e.hire_employee(&pool[5], None), Err(ActionError::CapacityExceeded(5)));
    e.purchase_office(OfficeTier::Small).unwrap();
    assert_eq!(e.state().offices.total_capacity, 15);
    e.hire_employee(&pool[5], None).unwrap();
}

#[test]
fn bankruptcy_stops_the_clock() {
    let mut e = GameEngine::new(
        &GameConfig::new(start())
            .with_starting_money(Decimal::from(5_000))
            .with_seed(9),
    );
    e.set_paused(false);
    e.set_game_speed(10.0).unwrap();
    for _ in 0..20 {
        e.tick(10_000.0);
    }
    assert!(e.is_game_over());
    let frozen = e.snapshot();
    e.tick(10_000.0);
    assert_eq!(frozen, e.snapshot());
    assert!(frozen.treasury.money <= Decimal::ZERO);
}

#[test]
fn speed_must_be_positive() {
    let mut e = engine(10);
    assert_eq!(e.set_game_speed(0.0), Err(ActionError::InvalidSpeed(0.0)));
    assert!(e.set_game_speed(f64::NAN).is_err());
    assert_eq!(e.state().clock.game_speed, 1.0);
}

#[test]
fn staffed_product_makes_progress() {
    let mut e = GameEngine::new(
        &GameConfig::new(start())
            .with_starting_money(Decimal::from(500_000))
            .with_product("crm-platform")
            .with_seed(11),
    );
    let cofounder = e.hire_cofounder().unwrap();
    let first = e.state().product.features[0].id.clone();
    e.assign_employee_to_feature(&cofounder, &first).unwrap();
    assert_eq!(
        e.state().team.employee(&cofounder).unwrap().assigned_feature_id.as_ref(),
        Some(&first)
    );
    e.set_paused(false);
    e.advance_days(30);
    assert!(e.state().product.overall_progress > 0.0);
    validate_state(e.state()).unwrap();
    // Development has started, so the template is locked in.
    e.select_product_template("ai-chatbot");
    assert_eq!(
        e.state().product.product_template_id.as_deref(),
        Some("crm-platform")
    );
}

#[test]
fn weekends_make_no_product_progress() {
    // 2025-01-03 is a Friday.
    let friday = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let mut e = GameEngine::new(
        &GameConfig::new(friday)
            .with_starting_money(Decimal::from(500_000))
            .with_product("crm-platform")
            .with_seed(12),
    );
    let cofounder = e.hire_cofounder().unwrap();
    let first = e.state().product.features[0].id.clone();
    e.assign_employee_to_feature(&cofounder, &first).unwrap();
    e.set_paused(false);

    let friday_progress = e.state().product.overall_progress;
    e.advance_days(1);
    assert_eq!(e.state().clock.date(), NaiveDate::from_ymd_opt(2025, 1, 4).unwrap());
    assert_eq!(e.state().product.overall_progress, friday_progress);
    e.advance_days(1);
    assert_eq!(e.state().product.overall_progress, friday_progress);
    e.advance_days(1);
    assert_eq!(e.state().clock.date(), NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    assert!(e.state().product.overall_progress > friday_progress);
}

#[test]
fn month_close_books_revenue_from_the_updated_customer_base() {
    let mut state = engine(13).into_state();
    state.team.candidate_pool[0].role = Role::Sales;
    state.team.candidate_pool[0].role_subclass = None;
    for f in state.product.features.iter_mut() {
        for c in f.components.iter_mut() {
            c.progress = 100.0;
        }
        f.progress = 100.0;
    }
    state.product.overall_progress = 100.0;
    state.product.maturity = 1.0;
    state.product.product_market_fit = 0.8;
    state.product.current_milestone = Milestone::Mature;
    state.customers.total_customers = 1_000;
    let mut e = GameEngine::with_state(state, Some(13));

    let seller = e.state().team.candidate_pool[0].id.clone();
    e.hire_employee(&seller, None).unwrap();
    e.set_paused(false);
    e.advance_days(30);
    let before = e.snapshot();
    assert_eq!(before.clock.date(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    assert_eq!(before.treasury.revenue_history.len(), 0);
    assert_eq!(before.team.onboarded_count(Role::Sales), 1);

    e.advance_days(1);
    let s = e.state();
    let c = &s.customers;
    assert!(c.monthly_acquisitions > 0);
    assert_eq!(c.monthly_churn, 15);
    assert_eq!(
        c.total_customers,
        before.customers.total_customers + c.monthly_acquisitions - c.monthly_churn
    );
    let revenue =
        sim_econ::revenue_from_customers(c.total_customers, Category::default(), Milestone::Mature);
    assert_eq!(s.treasury.monthly_revenue, revenue);
    assert_eq!(s.treasury.monthly_expenses, before.treasury.monthly_expenses);
    assert_eq!(
        s.treasury.money,
        before.treasury.money - before.treasury.monthly_expenses + revenue
    );
    assert_eq!(s.treasury.revenue_history.back(), Some(&revenue));
    validate_state(s).unwrap();
}

#[derive(Clone, Debug)]
enum Op {
    Hire(usize),
    Fire(usize),
    HireCofounder,
    Search(usize),
    Advance(u32),
    Prioritize(usize, i64),
    AutoAssign,
    Office(usize),
    Raise,
    AcceptBest,
    Respond(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..20).prop_map(Op::Hire),
        (0usize..20).prop_map(Op::Fire),
        Just(Op::HireCofounder),
        (0usize..6).prop_map(Op::Search),
        (1u32..40).prop_map(Op::Advance),
        ((0usize..8), (-2i64..12)).prop_map(|(i, p)| Op::Prioritize(i, p)),
        Just(Op::AutoAssign),
        (0usize..4).prop_map(Op::Office),
        Just(Op::Raise),
        Just(Op::AcceptBest),
        (0usize..2).prop_map(Op::Respond),
    ]
}

fn apply(e: &mut GameEngine, op: &Op) {
    let s = e.snapshot();
    match op {
        Op::Hire(i) => {
            let from_searches = s
                .team
                .active_hiring_searches
                .iter()
                .flat_map(|h| h.candidates.iter().map(move |c| (c.id.clone(), Some(h.id.clone()))));
            let pool = s.team.candidate_pool.iter().map(|c| (c.id.clone(), None));
            let all: Vec<_> = pool.chain(from_searches).collect();
            if let Some((c, search)) = all.get(*i) {
                if e.hire_employee(c, search.as_ref()).is_ok() {
                    let after = e.state();
                    assert!(after.team.employees.len() <= after.offices.total_capacity as usize);
                }
            }
        }
        Op::Fire(i) => {
            if let Some(emp) = s.team.employees.get(*i) {
                e.fire_employee(&emp.id);
            }
        }
        Op::HireCofounder => {
            let _ = e.hire_cofounder();
        }
        Op::Search(r) => {
            let role = Role::ALL[*r % Role::ALL.len()];
            let subclass = match role {
                Role::Engineer => Some(RoleSubclass::Frontend),
                Role::Designer => Some(RoleSubclass::Visual),
                _ => None,
            };
            let _ = e.start_hiring_search(role, subclass, Recruiter::Founder);
        }
        Op::Advance(days) => e.advance_days(*days),
        Op::Prioritize(i, p) => {
            if let Some(f) = s.product.features.get(*i) {
                e.prioritize_feature(&f.id, *p);
            }
        }
        Op::AutoAssign => e.auto_assign_teams(),
        Op::Office(t) => {
            let tier = [OfficeTier::Coworking, OfficeTier::Small, OfficeTier::Medium, OfficeTier::Large][*t];
            let _ = e.purchase_office(tier);
        }
        Op::Raise => {
            let next = s
                .funding
                .highest_completed()
                .map_or(Some(RoundType::Seed), RoundType::next);
            if let Some(round) = next {
                let _ = e.start_fundraising(round);
            }
        }
        Op::AcceptBest => {
            if let Some(offer) = s.funding.active_round().and_then(|r| r.offers.first()) {
                let _ = e.accept_funding_offer(&offer.id);
            }
        }
        Op::Respond(o) => {
            if let Some(ev) = s.events.pending_events.first() {
                if let Some(opt) = ev.options.get(*o) {
                    e.respond_to_event(&ev.id, &opt.id);
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn invariants_hold_under_any_action_sequence(
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let mut e = GameEngine::new(
            &GameConfig::new(start())
                .with_starting_money(Decimal::from(400_000))
                .with_product("crm-platform")
                .with_seed(seed),
        );
        e.set_paused(false);
        for op in &ops {
            apply(&mut e, op);
            let s = e.state();
            prop_assert!(s.funding.total_equity >= Decimal::ZERO);
            prop_assert!(s.team.employees.iter().filter(|x| x.role.is_cofounder()).count() <= 1);
            prop_assert!(s.treasury.revenue_history.len() <= 12);
            prop_assert!(validate_state(s).is_ok(), "{:?} after {:?}", validate_state(s), op);
        }
    }

    #[test]
    fn auto_assign_twice_is_stable(seed in any::<u64>(), hires in 0usize..6, days in 14u32..40) {
        let mut e = GameEngine::new(
            &GameConfig::new(start())
                .with_starting_money(Decimal::from(400_000))
                .with_product("analytics-dashboard")
                .with_seed(seed),
        );
        let _ = e.hire_cofounder();
        let pool: Vec<_> = e.state().team.candidate_pool.iter().map(|c| c.id.clone()).collect();
        for c in pool.iter().take(hires) {
            let _ = e.hire_employee(c, None);
        }
        e.set_paused(false);
        e.advance_days(days);
        e.auto_assign_teams();
        let first = e.snapshot();
        e.auto_assign_teams();
        prop_assert_eq!(first, e.snapshot());
    }
}
