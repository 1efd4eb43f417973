//! Player commands and initial configuration.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{
    CandidateId, EmployeeId, EventId, FeatureId, OfferId, OfficeTier, Recruiter, Role,
    RoleSubclass, RoundType, SearchId,
};

/// Game difficulty; only affects the default starting cash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn default_starting_money(self) -> Decimal {
        match self {
            Difficulty::Easy => Decimal::from(250_000),
            Difficulty::Medium => Decimal::from(100_000),
            Difficulty::Hard => Decimal::from(50_000),
        }
    }
}

/// Configuration supplied once when a game is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Cash at day zero; falls back to the difficulty default when absent.
    #[serde(default)]
    pub starting_money: Option<Decimal>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Product template to select at creation.
    #[serde(default)]
    pub selected_product_id: Option<String>,
    /// Calendar anchor for day zero.
    pub start_date: NaiveDate,
    /// Fixed RNG seed; `None` draws from OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl GameConfig {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            starting_money: None,
            difficulty: Difficulty::default(),
            selected_product_id: None,
            start_date,
            rng_seed: None,
        }
    }

    pub fn with_starting_money(mut self, money: Decimal) -> Self {
        self.starting_money = Some(money);
        self
    }

    pub fn with_product(mut self, template_id: impl Into<String>) -> Self {
        self.selected_product_id = Some(template_id.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Starting cash after applying the difficulty default.
    pub fn resolved_starting_money(&self) -> Decimal {
        self.starting_money
            .unwrap_or_else(|| self.difficulty.default_starting_money())
    }
}

/// A player request routed through the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Hire {
        candidate: CandidateId,
        search: Option<SearchId>,
    },
    Fire {
        employee: EmployeeId,
    },
    StartHiringSearch {
        role: Role,
        subclass: Option<RoleSubclass>,
        recruiter: Recruiter,
    },
    CancelHiringSearch {
        search: SearchId,
    },
    HireCofounder,
    StartFundraising {
        round: RoundType,
    },
    AcceptOffer {
        offer: OfferId,
    },
    RespondToEvent {
        event: EventId,
        option: String,
    },
    PurchaseOffice {
        tier: OfficeTier,
    },
    SelectProduct {
        template_id: String,
    },
    PrioritizeFeature {
        feature: FeatureId,
        priority: i64,
    },
    AssignEmployee {
        employee: EmployeeId,
        feature: FeatureId,
    },
    UnassignEmployee {
        employee: EmployeeId,
        feature: FeatureId,
    },
    AutoAssignTeams,
    SetPaused {
        paused: bool,
    },
    SetGameSpeed {
        speed: f64,
    },
}
