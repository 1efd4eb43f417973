//! Feature staffing: manual assignment and requirement-driven auto-assignment.
//!
//! An employee is listed on at most one feature, and `Employee::assigned_feature_id`
//! always mirrors the feature's `assigned_team`.

use sim_core::{
    EmployeeId, ExperienceLevel, FeatureId, ProductState, Role, RoleSubclass, TeamState,
};
use std::collections::BTreeSet;

use crate::error::ActionError;

/// Staff `employee` on `feature`, moving them off any previous feature.
pub fn assign(
    team: &mut TeamState,
    product: &mut ProductState,
    employee: &EmployeeId,
    feature: &FeatureId,
) -> Result<(), ActionError> {
    let emp = team
        .employee(employee)
        .ok_or_else(|| ActionError::EmployeeNotFound(employee.0.clone()))?;
    if product.feature(feature).is_none() {
        return Err(ActionError::FeatureNotFound(feature.0.clone()));
    }
    if !emp.role.builds_product() || !emp.onboarding_complete {
        return Err(ActionError::NotAssignable(employee.0.clone()));
    }
    if emp.assigned_feature_id.as_ref() == Some(feature) {
        return Ok(());
    }
    for f in product.features.iter_mut() {
        f.assigned_team.remove(employee);
    }
    if let Some(f) = product.feature_mut(feature) {
        f.assigned_team.insert(employee.clone());
    }
    if let Some(e) = team.employee_mut(employee) {
        e.assigned_feature_id = Some(feature.clone());
    }
    Ok(())
}

/// Remove `employee` from `feature`. Returns false when they were not on it.
pub fn unassign(
    team: &mut TeamState,
    product: &mut ProductState,
    employee: &EmployeeId,
    feature: &FeatureId,
) -> bool {
    let removed = product
        .feature_mut(feature)
        .map(|f| f.assigned_team.remove(employee))
        .unwrap_or(false);
    if removed {
        if let Some(e) = team.employee_mut(employee) {
            if e.assigned_feature_id.as_ref() == Some(feature) {
                e.assigned_feature_id = None;
            }
        }
    }
    removed
}

/// Drop an employee from every feature (used when they leave).
pub fn release(team: &mut TeamState, product: &mut ProductState, employee: &EmployeeId) {
    for f in product.features.iter_mut() {
        f.assigned_team.remove(employee);
    }
    if let Some(e) = team.employee_mut(employee) {
        e.assigned_feature_id = None;
    }
}

/// Clear every assignment on both sides.
pub fn clear_all(team: &mut TeamState, product: &mut ProductState) {
    for e in team.employees.iter_mut() {
        e.assigned_feature_id = None;
    }
    for f in product.features.iter_mut() {
        f.assigned_team.clear();
    }
}

#[derive(Debug)]
struct Slot {
    id: EmployeeId,
    role: Role,
    subclass: Option<RoleSubclass>,
    level: ExperienceLevel,
}

fn pick<F: Fn(&Slot) -> bool>(
    pool: &[Slot],
    used: &mut BTreeSet<EmployeeId>,
    n: u32,
    accept: F,
) -> Vec<EmployeeId> {
    let mut out = Vec::new();
    for slot in pool {
        if out.len() as u32 >= n {
            break;
        }
        if !used.contains(&slot.id) && accept(slot) {
            used.insert(slot.id.clone());
            out.push(slot.id.clone());
        }
    }
    out
}

/// Rebuild all assignments from scratch.
///
/// Incomplete features are visited in priority order and their requirement
/// counts filled from onboarded staff meeting the minimum seniority, most
/// productive first (id breaks ties). A co-founder covers one frontend and one
/// backend slot at once and is placed before dedicated engineers.
pub fn auto_assign(team: &mut TeamState, product: &mut ProductState) {
    clear_all(team, product);

    let mut candidates: Vec<(f64, Slot)> = team
        .employees
        .iter()
        .filter(|e| e.onboarding_complete && e.role.builds_product())
        .map(|e| {
            (
                e.productivity,
                Slot {
                    id: e.id.clone(),
                    role: e.role,
                    subclass: e.role_subclass,
                    level: e.experience_level,
                },
            )
        })
        .collect();
    candidates.sort_by(|(pa, a), (pb, b)| pb.total_cmp(pa).then_with(|| a.id.cmp(&b.id)));
    let pool: Vec<Slot> = candidates.into_iter().map(|(_, s)| s).collect();

    let mut order: Vec<usize> = (0..product.features.len()).collect();
    order.sort_by_key(|i| product.features[*i].priority);

    let mut used = BTreeSet::new();
    let mut placements: Vec<(EmployeeId, FeatureId)> = Vec::new();
    for idx in order {
        let feature = &mut product.features[idx];
        if feature.is_complete() {
            continue;
        }
        let req = feature.requirements;
        let senior_enough = |s: &Slot| s.level >= req.min_seniority;
        let engineer_of = |sub: RoleSubclass| {
            move |s: &Slot| s.role == Role::Engineer && s.subclass == Some(sub) && s.level >= req.min_seniority
        };
        let designer_of = |sub: RoleSubclass| {
            move |s: &Slot| s.role == Role::Designer && s.subclass == Some(sub) && s.level >= req.min_seniority
        };

        let units = req.frontend.min(req.backend);
        let cofounders = pick(&pool, &mut used, units, |s| s.role.is_cofounder() && senior_enough(s));
        let covered = cofounders.len() as u32;
        let mut staff = cofounders;
        staff.extend(pick(&pool, &mut used, req.frontend - covered, engineer_of(RoleSubclass::Frontend)));
        staff.extend(pick(&pool, &mut used, req.backend - covered, engineer_of(RoleSubclass::Backend)));
        staff.extend(pick(&pool, &mut used, req.product, designer_of(RoleSubclass::Product)));
        staff.extend(pick(&pool, &mut used, req.visual, designer_of(RoleSubclass::Visual)));

        for id in staff {
            feature.assigned_team.insert(id.clone());
            placements.push((id, feature.id.clone()));
        }
    }
    for (emp, feature) in placements {
        if let Some(e) = team.employee_mut(&emp) {
            e.assigned_feature_id = Some(feature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sim_core::{
        validate_product, Employee, Feature, FeatureRequirements, Milestone,
    };

    fn emp(
        id: &str,
        role: Role,
        subclass: Option<RoleSubclass>,
        level: ExperienceLevel,
        productivity: f64,
    ) -> Employee {
        Employee {
            id: EmployeeId(id.to_string()),
            name: id.to_string(),
            role,
            role_subclass: subclass,
            salary: Decimal::from(5_000),
            productivity,
            hire_date: 0.0,
            onboarding_complete: true,
            experience_level: level,
            equity_percent: None,
            assigned_feature_id: None,
        }
    }

    fn feature(id: &str, priority: u32, frontend: u32, backend: u32, min: ExperienceLevel) -> Feature {
        Feature {
            id: FeatureId(id.to_string()),
            name: id.to_string(),
            description: String::new(),
            priority,
            base_complexity: 4.0,
            components: sim_core::content::generate_components(id, id, 4.0),
            progress: 0.0,
            assigned_team: BTreeSet::new(),
            requirements: FeatureRequirements {
                min_seniority: min,
                frontend,
                backend,
                product: 1,
                visual: 0,
            },
            unlocks_capability: None,
        }
    }

    fn setup() -> (TeamState, ProductState) {
        let team = TeamState {
            employees: vec![
                emp("cf", Role::Cofounder, None, ExperienceLevel::Senior, 0.95),
                emp("fe1", Role::Engineer, Some(RoleSubclass::Frontend), ExperienceLevel::Mid, 0.8),
                emp("fe2", Role::Engineer, Some(RoleSubclass::Frontend), ExperienceLevel::Junior, 0.9),
                emp("be1", Role::Engineer, Some(RoleSubclass::Backend), ExperienceLevel::Senior, 0.85),
                emp("pd1", Role::Designer, Some(RoleSubclass::Product), ExperienceLevel::Mid, 0.7),
                emp("s1", Role::Sales, None, ExperienceLevel::Senior, 1.0),
            ],
            ..TeamState::default()
        };
        let product = ProductState {
            overall_progress: 0.0,
            current_milestone: Milestone::Idea,
            features: vec![
                feature("a", 1, 2, 1, ExperienceLevel::Mid),
                feature("b", 2, 1, 1, ExperienceLevel::Junior),
            ],
            maturity: 0.0,
            quality: 0.5,
            product_market_fit: 0.0,
            product_template_id: None,
        };
        (team, product)
    }

    #[test]
    fn cofounder_fills_both_engineering_slots_first() {
        let (mut team, mut product) = setup();
        auto_assign(&mut team, &mut product);
        let a = &product.features[0].assigned_team;
        let expected: BTreeSet<EmployeeId> = ["cf", "fe1", "pd1"].iter().map(|s| EmployeeId(s.to_string())).collect();
        assert_eq!(a, &expected);
        // fe2 is junior-eligible for b; be1 takes b's backend slot.
        let b = &product.features[1].assigned_team;
        let expected: BTreeSet<EmployeeId> = ["fe2", "be1"].iter().map(|s| EmployeeId(s.to_string())).collect();
        assert_eq!(b, &expected);
        assert!(team.employee(&EmployeeId("s1".into())).unwrap().assigned_feature_id.is_none());
        validate_product(&product, &team).unwrap();
    }

    #[test]
    fn auto_assign_is_idempotent() {
        let (mut team, mut product) = setup();
        auto_assign(&mut team, &mut product);
        let first = product.clone();
        auto_assign(&mut team, &mut product);
        assert_eq!(first, product);
    }

    #[test]
    fn manual_assignment_moves_between_features() {
        let (mut team, mut product) = setup();
        let e = EmployeeId("fe1".into());
        let a = FeatureId("a".into());
        let b = FeatureId("b".into());
        assign(&mut team, &mut product, &e, &a).unwrap();
        assign(&mut team, &mut product, &e, &b).unwrap();
        assert!(!product.features[0].assigned_team.contains(&e));
        assert!(product.features[1].assigned_team.contains(&e));
        validate_product(&product, &team).unwrap();
        assert!(!unassign(&mut team, &mut product, &e, &a));
        assert!(unassign(&mut team, &mut product, &e, &b));
        assert!(team.employee(&e).unwrap().assigned_feature_id.is_none());
    }

    #[test]
    fn sales_cannot_be_staffed() {
        let (mut team, mut product) = setup();
        let err = assign(&mut team, &mut product, &EmployeeId("s1".into()), &FeatureId("a".into()));
        assert_eq!(err, Err(ActionError::NotAssignable("s1".into())));
        let err = assign(&mut team, &mut product, &EmployeeId("fe1".into()), &FeatureId("zzz".into()));
        assert_eq!(err, Err(ActionError::FeatureNotFound("zzz".into())));
    }
}
