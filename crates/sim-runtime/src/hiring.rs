//! Recruiter-bound hiring searches and candidate generation.

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use sim_core::{
    Candidate, CandidateId, ExperienceLevel, HiringSearch, IdSequence, Recruiter, Role,
    RoleSubclass, SearchId, SearchStatus,
};
use tracing::debug;

/// A search stops producing candidates after this many days.
pub const HIRING_SEARCH_DURATION_DAYS: f64 = 60.0;
/// Average candidate arrival rate.
pub const CANDIDATES_PER_WEEK: f64 = 1.5;
/// Size of the flat candidate pool seeded at game start.
pub const INITIAL_POOL_SIZE: usize = 8;

const FIRST_NAMES: [&str; 16] = [
    "Alex", "Jordan", "Taylor", "Morgan", "Casey", "Riley", "Avery", "Quinn", "Sam", "Jamie",
    "Robin", "Devon", "Emerson", "Harper", "Kai", "Parker",
];
const LAST_NAMES: [&str; 16] = [
    "Smith", "Johnson", "Nguyen", "Brown", "Okafor", "Garcia", "Kowalski", "Davis", "Tanaka",
    "Martinez", "Singh", "Lopez", "Fischer", "Anderson", "Rossi", "Lee",
];

fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
    format!("{first} {last}")
}

fn random_subclass<R: Rng + ?Sized>(role: Role, rng: &mut R) -> Option<RoleSubclass> {
    match role {
        Role::Engineer => Some(if rng.gen_bool(0.5) {
            RoleSubclass::Frontend
        } else {
            RoleSubclass::Backend
        }),
        Role::Designer => Some(if rng.gen_bool(0.5) {
            RoleSubclass::Product
        } else {
            RoleSubclass::Visual
        }),
        _ => None,
    }
}

/// 40% junior, 40% mid, 20% senior.
fn random_experience<R: Rng + ?Sized>(rng: &mut R) -> ExperienceLevel {
    let r: f64 = rng.gen();
    if r < 0.4 {
        ExperienceLevel::Junior
    } else if r < 0.8 {
        ExperienceLevel::Mid
    } else {
        ExperienceLevel::Senior
    }
}

/// Monthly salary band in USD for a role at a level.
fn salary_band(role: Role, level: ExperienceLevel) -> (f64, f64) {
    match (level, role) {
        (ExperienceLevel::Junior, Role::Engineer) => (6_000.0, 8_000.0),
        (ExperienceLevel::Junior, Role::Designer) => (5_000.0, 7_000.0),
        (ExperienceLevel::Junior, _) => (4_000.0, 6_000.0),
        (ExperienceLevel::Mid, Role::Engineer) => (10_000.0, 13_000.0),
        (ExperienceLevel::Mid, Role::Designer) => (8_000.0, 11_000.0),
        (ExperienceLevel::Mid, _) => (6_000.0, 9_000.0),
        (ExperienceLevel::Senior, Role::Engineer) => (14_000.0, 18_000.0),
        (ExperienceLevel::Senior, Role::Designer) => (11_000.0, 15_000.0),
        (ExperienceLevel::Senior, _) => (9_000.0, 13_000.0),
    }
}

fn productivity_band(level: ExperienceLevel) -> (f64, f64) {
    match level {
        ExperienceLevel::Junior => (0.5, 0.7),
        ExperienceLevel::Mid => (0.7, 0.9),
        ExperienceLevel::Senior => (0.85, 1.0),
    }
}

fn round_productivity(p: f64) -> f64 {
    (p * 100.0).round() / 100.0
}

/// Generate one candidate for a role. Co-founders are always senior with a
/// $8-12k salary and 0.9-1.0 productivity; engineers and designers without a
/// requested subclass get a random one.
pub fn generate_candidate<R: Rng + ?Sized>(
    ids: &mut IdSequence,
    role: Role,
    subclass: Option<RoleSubclass>,
    rng: &mut R,
) -> Candidate {
    let id: CandidateId = ids.next("cand");
    let name = random_name(rng);
    if role.is_cofounder() {
        let salary = 8_000.0 + rng.gen::<f64>() * 4_000.0;
        let productivity = 0.9 + rng.gen::<f64>() * 0.1;
        return Candidate {
            id,
            name,
            role,
            role_subclass: None,
            expected_salary: Decimal::from(salary.round() as i64),
            productivity: round_productivity(productivity),
            experience_level: ExperienceLevel::Senior,
        };
    }
    let role_subclass = match subclass {
        Some(s) if role.accepts_subclass(Some(s)) => Some(s),
        _ => random_subclass(role, rng),
    };
    let level = random_experience(rng);
    let (smin, smax) = salary_band(role, level);
    let (pmin, pmax) = productivity_band(level);
    let salary = smin + rng.gen::<f64>() * (smax - smin);
    let productivity = pmin + rng.gen::<f64>() * (pmax - pmin);
    Candidate {
        id,
        name,
        role,
        role_subclass,
        expected_salary: Decimal::from(salary.round() as i64),
        productivity: round_productivity(productivity),
        experience_level: level,
    }
}

/// The flat pool available from day zero: engineers, designers, sales and
/// marketing at uniformly random levels, paid the bottom of their band.
pub fn initial_candidate_pool<R: Rng + ?Sized>(ids: &mut IdSequence, rng: &mut R) -> Vec<Candidate> {
    const ROLES: [Role; 4] = [Role::Engineer, Role::Designer, Role::Sales, Role::Marketing];
    const LEVELS: [ExperienceLevel; 3] = [
        ExperienceLevel::Junior,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
    ];
    (0..INITIAL_POOL_SIZE)
        .map(|_| {
            let role = ROLES[rng.gen_range(0..ROLES.len())];
            let level = LEVELS[rng.gen_range(0..LEVELS.len())];
            let (salary, _) = salary_band(role, level);
            let (pmin, pmax) = productivity_band(level);
            Candidate {
                id: ids.next("cand"),
                name: random_name(rng),
                role,
                role_subclass: random_subclass(role, rng),
                expected_salary: Decimal::from(salary as i64),
                productivity: round_productivity(pmin + rng.gen::<f64>() * (pmax - pmin)),
                experience_level: level,
            }
        })
        .collect()
}

/// Open a search with no candidates. Validation is the caller's job.
pub fn start_hiring_search(
    ids: &mut IdSequence,
    role: Role,
    subclass: Option<RoleSubclass>,
    recruiter: Recruiter,
    now: f64,
) -> HiringSearch {
    let id: SearchId = ids.next("search");
    HiringSearch {
        id,
        role,
        role_subclass: subclass,
        recruiter,
        started_at: now,
        candidates: Vec::new(),
        status: SearchStatus::Active,
    }
}

/// Daily search update: close searches older than 60 days, otherwise top up
/// candidates toward `floor(days / 7) * 1.5`, one or two at a time.
pub fn update_hiring_searches<R: Rng + ?Sized>(
    searches: &mut [HiringSearch],
    ids: &mut IdSequence,
    now: f64,
    rng: &mut R,
) {
    for search in searches.iter_mut().filter(|s| s.is_active()) {
        let elapsed = now - search.started_at;
        if elapsed >= HIRING_SEARCH_DURATION_DAYS {
            search.status = SearchStatus::Completed;
            debug!(search = %search.id, found = search.candidates.len(), "hiring search completed");
            continue;
        }
        let expected = (elapsed / 7.0).floor() * CANDIDATES_PER_WEEK;
        let have = search.candidates.len();
        if (have as f64) < expected {
            let shortfall = expected.ceil() as usize - have;
            let batch = rng.gen_range(1..=2usize).min(shortfall);
            for _ in 0..batch {
                let c = generate_candidate(ids, search.role, search.role_subclass, rng);
                search.candidates.push(c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal::prelude::ToPrimitive;

    #[test]
    fn cofounder_candidates_are_senior_without_subclass() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ids = IdSequence::default();
        for _ in 0..50 {
            let c = generate_candidate(&mut ids, Role::Cofounder, Some(RoleSubclass::Backend), &mut rng);
            assert_eq!(c.experience_level, ExperienceLevel::Senior);
            assert_eq!(c.role_subclass, None);
            let s = c.expected_salary.to_i64().unwrap();
            assert!((8_000..=12_000).contains(&s));
            assert!((0.9..=1.0).contains(&c.productivity));
        }
    }

    #[test]
    fn engineers_always_get_a_matching_subclass() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut ids = IdSequence::default();
        for _ in 0..50 {
            let c = generate_candidate(&mut ids, Role::Engineer, Some(RoleSubclass::Visual), &mut rng);
            assert!(matches!(
                c.role_subclass,
                Some(RoleSubclass::Frontend | RoleSubclass::Backend)
            ));
            let sales = generate_candidate(&mut ids, Role::Sales, None, &mut rng);
            assert_eq!(sales.role_subclass, None);
        }
    }

    #[test]
    fn initial_pool_has_eight_valid_candidates() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ids = IdSequence::default();
        let pool = initial_candidate_pool(&mut ids, &mut rng);
        assert_eq!(pool.len(), INITIAL_POOL_SIZE);
        for c in &pool {
            assert!(c.role.accepts_subclass(c.role_subclass));
            assert!(!c.role.is_cofounder());
        }
    }

    #[test]
    fn search_completes_after_sixty_days() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut ids = IdSequence::default();
        let mut searches = vec![start_hiring_search(
            &mut ids,
            Role::Engineer,
            Some(RoleSubclass::Backend),
            Recruiter::Founder,
            10.0,
        )];
        update_hiring_searches(&mut searches, &mut ids, 16.0, &mut rng);
        assert!(searches[0].candidates.is_empty());
        update_hiring_searches(&mut searches, &mut ids, 17.0, &mut rng);
        assert!(!searches[0].candidates.is_empty());
        update_hiring_searches(&mut searches, &mut ids, 70.0, &mut rng);
        assert_eq!(searches[0].status, SearchStatus::Completed);
        let frozen = searches[0].candidates.len();
        update_hiring_searches(&mut searches, &mut ids, 75.0, &mut rng);
        assert_eq!(searches[0].candidates.len(), frozen);
    }

    proptest! {
        #[test]
        fn daily_updates_stay_under_the_cap(seed in any::<u64>(), start in 0.0f64..30.0) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut ids = IdSequence::default();
            let mut searches = vec![start_hiring_search(&mut ids, Role::Designer, None, Recruiter::Founder, start)];
            for day in 0..75 {
                update_hiring_searches(&mut searches, &mut ids, start + day as f64, &mut rng);
            }
            prop_assert_eq!(searches[0].status, SearchStatus::Completed);
            prop_assert!(searches[0].candidates.len() as f64 <= (60.0f64 / 7.0 * 1.5).ceil());
            prop_assert!(searches[0].candidates.iter().all(|c| c.role == Role::Designer && c.role_subclass.is_some()));
        }
    }
}
