//! Funding-round lifecycle: offer generation, sorting and expiry.

use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sim_core::{
    FundingOffer, FundingState, IdSequence, Milestone, ProductTemplate, RoundStatus, RoundType,
};
use sim_econ::{milestone_factors, offer_valuation};
use tracing::{debug, info};

/// Days after round start before investors respond.
pub const OFFER_DELAY_DAYS: f64 = 30.0;
/// Offer lifetime from generation.
pub const OFFER_TTL_DAYS: f64 = 30.0;
/// Age after which a round whose offers all lapsed fails.
pub const ROUND_TIMEOUT_DAYS: f64 = 120.0;

/// Minimum monthly revenue before a round may start.
pub fn revenue_requirement(round: RoundType) -> Decimal {
    match round {
        RoundType::Seed => Decimal::ZERO,
        RoundType::SeriesA => Decimal::from(10_000),
        RoundType::SeriesB => Decimal::from(100_000),
        RoundType::SeriesC => Decimal::from(500_000),
        RoundType::SeriesD => Decimal::from(2_000_000),
    }
}

/// Interpolation range for a round: (min amount, max amount, max equity, min equity).
fn base_terms(round: RoundType) -> (f64, f64, f64, f64) {
    match round {
        RoundType::Seed => (250_000.0, 2_000_000.0, 25.0, 15.0),
        RoundType::SeriesA => (3_000_000.0, 15_000_000.0, 20.0, 12.0),
        RoundType::SeriesB => (15_000_000.0, 50_000_000.0, 15.0, 8.0),
        RoundType::SeriesC => (50_000_000.0, 150_000_000.0, 12.0, 5.0),
        RoundType::SeriesD => (100_000_000.0, 300_000_000.0, 8.0, 3.0),
    }
}

/// Hard bounds applied last: (amount min, amount max, equity min, equity max).
fn hard_bounds(round: RoundType) -> (f64, f64, f64, f64) {
    match round {
        RoundType::Seed => (200_000.0, 2_500_000.0, 12.0, 30.0),
        RoundType::SeriesA => (2_500_000.0, 18_000_000.0, 8.0, 25.0),
        RoundType::SeriesB => (12_000_000.0, 60_000_000.0, 5.0, 18.0),
        RoundType::SeriesC => (40_000_000.0, 180_000_000.0, 3.0, 15.0),
        RoundType::SeriesD => (80_000_000.0, 350_000_000.0, 2.0, 10.0),
    }
}

/// Company metrics investors look at when drafting offers.
#[derive(Clone, Copy, Debug)]
pub struct OfferContext {
    pub milestone: Milestone,
    pub monthly_revenue: Decimal,
    pub maturity: f64,
    pub product_market_fit: f64,
    pub team_size: usize,
    pub template: Option<&'static ProductTemplate>,
    pub now: f64,
}

/// Draft one offer. `interest` is the jittered investor interest; `index`
/// spreads terms across the batch by +/-7.5%.
pub fn draft_offer(
    ids: &mut IdSequence,
    round: RoundType,
    interest: f64,
    index: usize,
    ctx: &OfferContext,
) -> FundingOffer {
    let factors = milestone_factors(ctx.milestone);
    let complexity = ctx
        .template
        .map(|t| f64::from(t.estimated_complexity))
        .unwrap_or(3.0);
    let potential = ctx.template.map(|t| t.revenue_potential).unwrap_or(1.0);
    let complexity_factor = 0.9 + (complexity / 5.0) * 0.2;
    let potential_factor = 0.85 + (potential - 1.0) * 0.3;

    let variation = (index as f64 / 5.0) * 0.15 - 0.075;
    let vi = (interest + variation).clamp(0.0, 1.0);
    let (min_amount, max_amount, max_equity, min_equity) = base_terms(round);
    let mut amount = min_amount + vi * (max_amount - min_amount);
    let mut equity = max_equity - vi * (max_equity - min_equity);
    amount *= factors.offer_amount_multiplier * complexity_factor * potential_factor;
    equity *= factors.offer_equity_multiplier;

    let revenue = ctx.monthly_revenue.to_f64().unwrap_or(0.0);
    if revenue > 0.0 {
        let bonus = (1.0 + revenue / 100_000.0 * 0.1).min(1.2);
        amount *= bonus;
        equity /= bonus;
    }
    let (amin, amax, emin, emax) = hard_bounds(round);
    let amount = amount.clamp(amin, amax).round();
    let equity = (equity.clamp(emin, emax) * 10.0).round() / 10.0;

    let required = revenue_requirement(round);
    let requirements = if required > Decimal::ZERO {
        vec![format!(
            "Minimum {}k/month revenue",
            (required / Decimal::from(1_000)).round()
        )]
    } else {
        Vec::new()
    };
    let valuation = offer_valuation(
        ctx.monthly_revenue,
        ctx.maturity,
        ctx.team_size,
        ctx.product_market_fit,
        ctx.milestone,
    )
    .unwrap_or(Decimal::ZERO);

    FundingOffer {
        id: ids.next("offer"),
        round_type: round,
        amount: Decimal::from(amount as i64),
        valuation,
        equity_percent: Decimal::from_f64(equity)
            .map(|e| e.round_dp(1))
            .unwrap_or(Decimal::from(emax as i64)),
        requirements,
        expires_at: ctx.now + OFFER_TTL_DAYS,
    }
}

/// `amount / equity`; larger is better for the founder.
fn terms_score(offer: &FundingOffer) -> Decimal {
    if offer.equity_percent > Decimal::ZERO {
        offer.amount / offer.equity_percent
    } else {
        Decimal::MAX
    }
}

/// Monthly update of the active round: generate offers once 30 days have
/// passed, and fail the round once 120 days have passed with every offer lapsed.
pub fn update_funding<R: Rng + ?Sized>(
    funding: &mut FundingState,
    ids: &mut IdSequence,
    ctx: &OfferContext,
    rng: &mut R,
) {
    let Some(round) = funding.active_round_mut() else {
        return;
    };
    if round.status != RoundStatus::InProgress {
        return;
    }
    let age = ctx.now - round.started_at;
    if age >= OFFER_DELAY_DAYS && round.offers.is_empty() {
        let n = ((round.investor_interest * 5.0).ceil() as usize).clamp(1, 5);
        for i in 0..n {
            let jittered = (round.investor_interest + (rng.gen::<f64>() - 0.5) * 0.2).clamp(0.0, 1.0);
            let offer = draft_offer(ids, round.round_type, jittered, i, ctx);
            round.offers.push(offer);
        }
        round.offers.sort_by_key(|o| std::cmp::Reverse(terms_score(o)));
        info!(round = %round.round_type, offers = n, "investors responded");
    }
    if age >= ROUND_TIMEOUT_DAYS && !round.offers.is_empty() {
        round.offers.retain(|o| !o.is_expired(ctx.now));
        if round.offers.is_empty() {
            round.status = RoundStatus::Failed;
            info!(round = %round.round_type, "funding round failed");
            funding.active_round = None;
        } else {
            debug!(round = %round.round_type, live = round.offers.len(), "offers still open");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::{product_template, FundingRound, RoundId};

    fn ctx(milestone: Milestone, revenue: i64, now: f64) -> OfferContext {
        OfferContext {
            milestone,
            monthly_revenue: Decimal::from(revenue),
            maturity: 0.3,
            product_market_fit: 0.1,
            team_size: 3,
            template: product_template("project-management"),
            now,
        }
    }

    fn funding_with_round(round_type: RoundType, interest: f64) -> FundingState {
        let mut f = FundingState::default();
        f.rounds.push(FundingRound {
            id: RoundId("round-1".into()),
            round_type,
            status: RoundStatus::InProgress,
            started_at: 0.0,
            offers: Vec::new(),
            investor_interest: interest,
        });
        f.active_round = Some(RoundId("round-1".into()));
        f
    }

    #[test]
    fn seed_offer_stays_within_hard_bounds() {
        let mut ids = IdSequence::default();
        for m in Milestone::ALL {
            for i in 0..5 {
                let o = draft_offer(&mut ids, RoundType::Seed, 0.5, i, &ctx(m, 0, 31.0));
                assert!(o.amount >= Decimal::from(200_000) && o.amount <= Decimal::from(2_500_000));
                assert!(o.equity_percent >= Decimal::from(12) && o.equity_percent <= Decimal::from(30));
                assert!(o.requirements.is_empty());
                assert_eq!(o.expires_at, 61.0);
            }
        }
    }

    #[test]
    fn later_rounds_carry_revenue_requirement() {
        let mut ids = IdSequence::default();
        let o = draft_offer(&mut ids, RoundType::SeriesA, 0.9, 0, &ctx(Milestone::Growing, 20_000, 40.0));
        assert_eq!(o.requirements, vec!["Minimum 10k/month revenue".to_string()]);
        assert_eq!(o.equity_percent, o.equity_percent.round_dp(1));
    }

    #[test]
    fn offers_arrive_after_thirty_days_sorted_by_terms() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut ids = IdSequence::default();
        let mut f = funding_with_round(RoundType::Seed, 0.7);
        update_funding(&mut f, &mut ids, &ctx(Milestone::Mvp, 0, 29.0), &mut rng);
        assert!(f.active_round().unwrap().offers.is_empty());
        update_funding(&mut f, &mut ids, &ctx(Milestone::Mvp, 0, 31.0), &mut rng);
        let offers = &f.active_round().unwrap().offers;
        assert_eq!(offers.len(), 4);
        for pair in offers.windows(2) {
            assert!(terms_score(&pair[0]) >= terms_score(&pair[1]));
        }
    }

    #[test]
    fn round_fails_when_all_offers_lapse() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut ids = IdSequence::default();
        let mut f = funding_with_round(RoundType::Seed, 0.1);
        update_funding(&mut f, &mut ids, &ctx(Milestone::Idea, 0, 31.0), &mut rng);
        assert_eq!(f.active_round().unwrap().offers.len(), 1);
        update_funding(&mut f, &mut ids, &ctx(Milestone::Idea, 0, 100.0), &mut rng);
        assert!(f.active_round.is_some());
        update_funding(&mut f, &mut ids, &ctx(Milestone::Idea, 0, 121.0), &mut rng);
        assert!(f.active_round.is_none());
        assert_eq!(f.rounds[0].status, RoundStatus::Failed);
    }
}
