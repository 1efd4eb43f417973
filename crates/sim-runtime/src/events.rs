//! Random narrative events and the effect interpreter.

use rand::Rng;
use rust_decimal::Decimal;
use sim_core::{
    Employee, EmployeeId, EventEffect, EventId, EventKind, EventOption, EventState, GameEvent,
    GameState, IdSequence, MAX_PENDING_EVENTS,
};
use tracing::debug;

/// Minimum days between two generated events.
pub const EVENT_COOLDOWN_DAYS: f64 = 10.0;
/// Chance an eligible roll produces an event.
pub const EVENT_CHANCE: f64 = 0.3;
/// Chance a generated event is about the co-founder, when there is one.
pub const COFOUNDER_EVENT_CHANCE: f64 = 0.05;
/// Runway (months) below which the financial event becomes emergency funding.
const EMERGENCY_RUNWAY_MONTHS: f64 = 3.0;

/// What the generator needs to know about the company.
#[derive(Clone, Copy, Debug)]
pub struct EventContext<'a> {
    pub now: f64,
    pub runway: f64,
    pub cofounder: Option<&'a Employee>,
}

fn usd(v: i64) -> Decimal {
    Decimal::from(v)
}

fn option(id: &str, label: &str, description: &str, effects: Vec<EventEffect>) -> EventOption {
    EventOption {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        effects,
    }
}

struct Draft {
    kind: EventKind,
    title: String,
    description: String,
    options: Vec<EventOption>,
    ttl_days: f64,
    subject: Option<EmployeeId>,
}

impl Draft {
    fn new(kind: EventKind, title: &str, description: impl Into<String>, ttl_days: f64) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.into(),
            options: Vec::new(),
            ttl_days,
            subject: None,
        }
    }

    fn option(mut self, o: EventOption) -> Self {
        self.options.push(o);
        self
    }

    fn about(mut self, employee: &Employee) -> Self {
        self.subject = Some(employee.id.clone());
        self
    }

    fn build(self, ids: &mut IdSequence, now: f64) -> GameEvent {
        GameEvent {
            id: ids.next("event"),
            kind: self.kind,
            title: self.title,
            description: self.description,
            options: self.options,
            triggered_at: now,
            expires_at: now + self.ttl_days,
            subject: self.subject,
        }
    }
}

fn team_event<R: Rng + ?Sized>(rng: &mut R) -> Draft {
    if rng.gen_bool(0.5) {
        Draft::new(
            EventKind::Team,
            "Tech Talent Market Crash",
            "Hiring costs dropped across the market. Recruiters refund part of their fees.",
            7.0,
        )
        .option(option(
            "hire-now",
            "Hire Aggressively",
            "Claim the recruiting fee refund",
            vec![EventEffect::Money(usd(6_000))],
        ))
        .option(option("wait", "Wait", "Keep the current plan", vec![]))
    } else {
        Draft::new(
            EventKind::Team,
            "Key Employee Competing Offer",
            "A key employee received a competing offer and wants a raise to stay.",
            3.0,
        )
        .option(option(
            "give-raise",
            "Give Raise",
            "Add $2k/month to payroll",
            vec![EventEffect::Expense(usd(2_000))],
        ))
        .option(option(
            "let-go",
            "Let Them Go",
            "Absorb the productivity loss",
            vec![EventEffect::Product(-5.0)],
        ))
    }
}

fn product_event() -> Draft {
    Draft::new(
        EventKind::Product,
        "Technical Breakthrough",
        "The team found a much simpler approach to a hard problem.",
        1.0,
    )
    .option(option(
        "boost",
        "Apply Breakthrough",
        "Accelerate development",
        vec![EventEffect::Product(5.0)],
    ))
}

fn financial_event(runway: f64) -> Draft {
    if runway < EMERGENCY_RUNWAY_MONTHS {
        Draft::new(
            EventKind::Financial,
            "Emergency Funding Opportunity",
            "An angel offers a bridge on poor terms because runway is short.",
            2.0,
        )
        .option(option(
            "take-emergency",
            "Take Emergency Funding",
            "Receive $100k",
            vec![EventEffect::Money(usd(100_000))],
        ))
        .option(option("decline", "Decline", "Try to survive without it", vec![]))
    } else {
        Draft::new(
            EventKind::Financial,
            "Unexpected Expense",
            "A $5,000 legal fee is due.",
            1.0,
        )
        .option(option(
            "pay",
            "Pay It",
            "Pay the fee",
            vec![EventEffect::Money(usd(-5_000))],
        ))
    }
}

fn market_event() -> Draft {
    Draft::new(
        EventKind::Market,
        "Market Opportunity",
        "An enterprise customer will sign a $50k contract if you build a custom feature.",
        5.0,
    )
    .option(option(
        "build-feature",
        "Build Custom Feature",
        "Divert the roadmap for the contract",
        vec![EventEffect::Product(-10.0), EventEffect::Money(usd(50_000))],
    ))
    .option(option("decline", "Decline", "Focus on the core product", vec![]))
}

fn cofounder_event<R: Rng + ?Sized>(cofounder: &Employee, rng: &mut R) -> Draft {
    let name = &cofounder.name;
    let draft = match rng.gen_range(0..4) {
        0 => Draft::new(
            EventKind::Team,
            "Co-Founder Wants More Equity",
            format!("{name} asks for an additional 5% equity."),
            5.0,
        )
        .option(option(
            "give-equity",
            "Grant Additional Equity",
            "Transfer 5 points of equity",
            vec![EventEffect::Equity(usd(5))],
        ))
        .option(option(
            "refuse",
            "Refuse",
            "Risk the relationship",
            vec![EventEffect::Product(-10.0)],
        )),
        1 => Draft::new(
            EventKind::Team,
            "Co-Founder Considering Leaving",
            format!("{name} has another offer and wants a $3k/month raise or 3% more equity."),
            3.0,
        )
        .option(option(
            "give-raise",
            "Give Raise",
            "Add $3k/month to their salary",
            vec![EventEffect::Expense(usd(3_000))],
        ))
        .option(option(
            "give-equity",
            "Give More Equity",
            "Transfer 3 points of equity",
            vec![EventEffect::Equity(usd(3))],
        ))
        .option(option(
            "let-leave",
            "Let Them Leave",
            "Accept the loss",
            vec![EventEffect::Product(-20.0)],
        )),
        2 => Draft::new(
            EventKind::Team,
            "Co-Founder Conflict",
            format!("You and {name} disagree about product direction."),
            2.0,
        )
        .option(option(
            "compromise",
            "Find Compromise",
            "Spend time resolving it",
            vec![EventEffect::Product(-5.0)],
        ))
        .option(option(
            "stand-ground",
            "Stand Your Ground",
            "Risk further conflict",
            vec![EventEffect::Product(-15.0)],
        )),
        _ => Draft::new(
            EventKind::Team,
            "Co-Founder Wants to Pivot",
            format!("{name} believes the company should pivot to a new market."),
            7.0,
        )
        .option(option(
            "pivot",
            "Pivot",
            "Rework large parts of the product",
            vec![EventEffect::Product(-30.0)],
        ))
        .option(option(
            "stay-course",
            "Stay the Course",
            "Keep the current direction",
            vec![EventEffect::Product(-5.0)],
        )),
    };
    draft.about(cofounder)
}

/// Draw one event from the catalogue.
pub fn generate_event<R: Rng + ?Sized>(ids: &mut IdSequence, ctx: &EventContext<'_>, rng: &mut R) -> GameEvent {
    if let Some(cofounder) = ctx.cofounder {
        if rng.gen_bool(COFOUNDER_EVENT_CHANCE) {
            return cofounder_event(cofounder, rng).build(ids, ctx.now);
        }
    }
    let draft = match rng.gen_range(0..4) {
        0 => team_event(rng),
        1 => product_event(),
        2 => financial_event(ctx.runway),
        _ => market_event(),
    };
    draft.build(ids, ctx.now)
}

/// Silently drop pending events past their deadline.
pub fn drop_expired(events: &mut EventState, now: f64) {
    events.pending_events.retain(|e| !e.is_expired(now));
}

/// Roll for a new event: at least 10 days since the last one, a 30% chance,
/// and fewer than three pending. Returns the id of the new event.
pub fn roll_event<R: Rng + ?Sized>(
    events: &mut EventState,
    ids: &mut IdSequence,
    ctx: &EventContext<'_>,
    rng: &mut R,
) -> Option<EventId> {
    if ctx.now - events.last_event_time < EVENT_COOLDOWN_DAYS {
        return None;
    }
    if !rng.gen_bool(EVENT_CHANCE) || events.pending_events.len() >= MAX_PENDING_EVENTS {
        return None;
    }
    let event = generate_event(ids, ctx, rng);
    debug!(event = %event.id, title = %event.title, "event triggered");
    let id = event.id.clone();
    events.pending_events.push(event);
    events.last_event_time = ctx.now;
    Some(id)
}

/// Apply one effect. Expense raises the subject's salary when the subject is
/// on the roster, otherwise recurring overhead. Equity moves at most the
/// founder's remaining points to the subject.
pub fn apply_effect(state: &mut GameState, effect: &EventEffect, subject: Option<&EmployeeId>) {
    match effect {
        EventEffect::Money(v) => state.treasury.money += *v,
        EventEffect::Product(v) => {
            state.product.overall_progress = (state.product.overall_progress + v).clamp(0.0, 100.0);
        }
        EventEffect::Expense(v) => {
            match subject.and_then(|id| state.team.employee_mut(id)) {
                Some(e) => e.salary = (e.salary + *v).max(Decimal::ZERO),
                None => {
                    state.treasury.recurring_overhead =
                        (state.treasury.recurring_overhead + *v).max(Decimal::ZERO)
                }
            }
        }
        EventEffect::Equity(v) => {
            let grant = (*v).min(state.funding.total_equity).max(Decimal::ZERO);
            if let Some(e) = subject.and_then(|id| state.team.employee_mut(id)) {
                e.equity_percent = Some(e.equity_percent.unwrap_or(Decimal::ZERO) + grant);
                state.funding.total_equity -= grant;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::{ExperienceLevel, Role};

    fn cofounder() -> Employee {
        Employee {
            id: EmployeeId("emp-1".into()),
            name: "Quinn Lee".into(),
            role: Role::Cofounder,
            role_subclass: None,
            salary: Decimal::from(9_000),
            productivity: 0.95,
            hire_date: 0.0,
            onboarding_complete: true,
            experience_level: ExperienceLevel::Senior,
            equity_percent: Some(Decimal::from(20)),
            assigned_feature_id: None,
        }
    }

    #[test]
    fn cooldown_and_cap_gate_generation() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut ids = IdSequence::default();
        let mut events = EventState::default();
        let ctx = EventContext {
            now: 5.0,
            runway: 10.0,
            cofounder: None,
        };
        for _ in 0..100 {
            assert!(roll_event(&mut events, &mut ids, &ctx, &mut rng).is_none());
        }
        let ctx = EventContext { now: 20.0, ..ctx };
        let mut generated = 0;
        for _ in 0..200 {
            if roll_event(&mut events, &mut ids, &ctx, &mut rng).is_some() {
                generated += 1;
            }
        }
        // After the first event the cooldown restarts at day 20.
        assert_eq!(generated, 1);
        assert_eq!(events.last_event_time, 20.0);
    }

    #[test]
    fn events_expire_after_deadline() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mut ids = IdSequence::default();
        let ctx = EventContext {
            now: 0.0,
            runway: 1.0,
            cofounder: None,
        };
        let mut events = EventState::default();
        events.pending_events.push(generate_event(&mut ids, &ctx, &mut rng));
        let deadline = events.pending_events[0].expires_at;
        drop_expired(&mut events, deadline);
        assert_eq!(events.pending_events.len(), 1);
        drop_expired(&mut events, deadline + 0.01);
        assert!(events.pending_events.is_empty());
    }

    #[test]
    fn catalogue_options_are_well_formed() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut ids = IdSequence::default();
        let cf = cofounder();
        let ctx = EventContext {
            now: 3.0,
            runway: 2.0,
            cofounder: Some(&cf),
        };
        let mut saw_cofounder = false;
        for _ in 0..500 {
            let e = generate_event(&mut ids, &ctx, &mut rng);
            assert!(!e.options.is_empty());
            assert!(e.expires_at > e.triggered_at);
            assert_ne!(e.title, "Unexpected Expense");
            if e.subject.is_some() {
                saw_cofounder = true;
                assert!(e.title.starts_with("Co-Founder"));
            }
        }
        assert!(saw_cofounder);
    }
}
