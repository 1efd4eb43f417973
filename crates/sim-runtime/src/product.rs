//! Product/feature development engine.
//!
//! Invoked once per simulated weekday. Each incomplete feature with an
//! onboarded team advances its first incomplete component (85% share) and,
//! with two or more engineers, its second (15% share). Feature and product
//! progress are complexity-weighted means; the milestone follows the share of
//! fully complete features.

use sim_core::{Employee, Feature, FeatureComponent, Milestone, ProductState, Role};

/// Daily product-market-fit gain once maturity exceeds 0.5.
pub const PMF_DAILY_GAIN: f64 = 0.001;
/// Daily quality gain while any designer works on a feature.
pub const QUALITY_DAILY_GAIN: f64 = 0.0005;

const PRIMARY_SHARE: f64 = 0.85;
const SECONDARY_SHARE: f64 = 0.15;

/// Weight of an assigned role in a feature team's productivity score.
fn feature_role_weight(role: Role) -> f64 {
    match role {
        Role::Engineer => 1.0,
        Role::Cofounder => 1.2,
        Role::Designer => 0.7,
        _ => 0.0,
    }
}

/// Speed-up from `engineers` working together: 1 -> 1.0x, 2 -> 1.7x, 3 -> 2.4x.
pub fn engineer_efficiency(engineers: usize) -> f64 {
    if engineers <= 1 {
        1.0
    } else {
        1.0 + (engineers - 1) as f64 * 0.7
    }
}

fn daily_progress(component: &FeatureComponent, efficiency: f64, multiplier: f64) -> f64 {
    let adjustment = if component.base_complexity > 8.0 { 0.9 } else { 1.0 };
    (100.0 / component.estimated_days.max(f64::EPSILON)) * efficiency * multiplier * adjustment
}

/// Complexity-weighted mean of `(progress, weight)` pairs; exactly 100 when
/// every item is complete.
fn weighted_progress<I: Iterator<Item = (f64, f64)> + Clone>(items: I) -> f64 {
    if items.clone().all(|(p, _)| p >= 100.0) && items.clone().next().is_some() {
        return 100.0;
    }
    let (sum, weight) = items.fold((0.0, 0.0), |(s, w), (p, c)| (s + p * c, w + c));
    if weight > 0.0 {
        (sum / weight).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn feature_progress(feature: &Feature) -> f64 {
    weighted_progress(
        feature
            .components
            .iter()
            .map(|c| (c.progress, c.base_complexity)),
    )
}

pub fn overall_progress(features: &[Feature]) -> f64 {
    weighted_progress(features.iter().map(|f| (f.progress, f.base_complexity)))
}

pub fn milestone_for(features: &[Feature]) -> Milestone {
    if features.is_empty() {
        return Milestone::Idea;
    }
    let done = features.iter().filter(|f| f.is_complete()).count();
    Milestone::from_completion_ratio(done as f64 / features.len() as f64)
}

/// Advance one feature by a working day. Returns true when a designer contributed.
fn advance_feature(feature: &mut Feature, employees: &[Employee]) -> bool {
    if feature.is_complete() {
        return false;
    }
    let team: Vec<&Employee> = employees
        .iter()
        .filter(|e| e.onboarding_complete && feature.assigned_team.contains(&e.id))
        .collect();
    if team.is_empty() {
        return false;
    }
    let score: f64 = team
        .iter()
        .map(|e| e.productivity * feature_role_weight(e.role))
        .sum();
    let multiplier = 0.5 + score * 0.1;
    let engineers = team
        .iter()
        .filter(|e| matches!(e.role, Role::Engineer | Role::Cofounder))
        .count();
    let has_designer = team.iter().any(|e| e.role == Role::Designer);

    if engineers > 0 {
        let mut open = feature.components.iter_mut().filter(|c| !c.is_complete());
        if let Some(primary) = open.next() {
            let gain = daily_progress(primary, engineer_efficiency(engineers), multiplier) * PRIMARY_SHARE;
            primary.progress = (primary.progress + gain).min(100.0);
        }
        if engineers >= 2 {
            if let Some(secondary) = open.next() {
                let gain = daily_progress(secondary, engineer_efficiency(engineers - 1), multiplier)
                    * SECONDARY_SHARE;
                secondary.progress = (secondary.progress + gain).min(100.0);
            }
        }
    }
    feature.progress = feature_progress(feature);
    has_designer
}

/// One working day of development. Pure: returns the next product state.
pub fn advance_product(product: &ProductState, employees: &[Employee]) -> ProductState {
    let mut next = product.clone();
    let mut designers_working = false;
    for feature in next.features.iter_mut() {
        designers_working |= advance_feature(feature, employees);
    }
    recompute_product(&mut next);
    if next.maturity > 0.5 {
        next.product_market_fit = (next.product_market_fit + PMF_DAILY_GAIN).min(1.0);
    }
    if designers_working {
        next.quality = (next.quality + QUALITY_DAILY_GAIN).min(1.0);
    }
    next
}

/// Refresh derived progress, maturity and milestone from component progress.
pub fn recompute_product(product: &mut ProductState) {
    for feature in product.features.iter_mut() {
        feature.progress = feature_progress(feature);
    }
    product.overall_progress = overall_progress(&product.features);
    product.maturity = (product.overall_progress / 100.0).min(1.0);
    product.current_milestone = milestone_for(&product.features);
}
