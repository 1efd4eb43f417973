//! Static content tables: product templates, predefined feature components,
//! office tiers, and the procedural generators that fill the gaps.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{
    ComponentId, ExperienceLevel, Feature, FeatureComponent, FeatureId, FeatureRequirements,
    Office, OfficeId, OfficeTier,
};

/// Market category of a product; selects customer benchmarks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "CRM")]
    Crm,
    #[default]
    Productivity,
    Analytics,
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "HR")]
    Hr,
}

#[derive(Debug)]
pub struct ComponentTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub complexity: u8,
    pub days: u16,
}

const fn comp(id: &'static str, name: &'static str, complexity: u8, days: u16) -> ComponentTemplate {
    ComponentTemplate {
        id,
        name,
        complexity,
        days,
    }
}

impl ComponentTemplate {
    pub fn instantiate(&self) -> FeatureComponent {
        FeatureComponent {
            id: ComponentId(self.id.to_string()),
            name: self.name.to_string(),
            base_complexity: f64::from(self.complexity),
            estimated_days: f64::from(self.days),
            progress: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct FeatureTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub complexity: u8,
    pub priority: u32,
    pub unlocks: Option<&'static str>,
}

const fn feat(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    complexity: u8,
    priority: u32,
    unlocks: Option<&'static str>,
) -> FeatureTemplate {
    FeatureTemplate {
        id,
        name,
        description,
        complexity,
        priority,
        unlocks,
    }
}

#[derive(Debug)]
pub struct ProductTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    /// Overall difficulty, 1-5.
    pub estimated_complexity: u8,
    /// Investor-facing upside, 1.0-2.0.
    pub revenue_potential: f64,
    pub features: &'static [FeatureTemplate],
}

const ANALYTICS: Option<&str> = Some("analytics");
const MOBILE: Option<&str> = Some("mobile");

pub static PRODUCT_TEMPLATES: [ProductTemplate; 5] = [
    ProductTemplate {
        id: "crm-platform",
        name: "CRM Platform",
        description: "Customer relationship management for small sales teams",
        category: Category::Crm,
        estimated_complexity: 4,
        revenue_potential: 1.4,
        features: &[
            feat("auth", "User Authentication", "Sign-up, login and roles", 3, 1, None),
            feat("contacts", "Contact Management", "Store and organize customer records", 4, 2, None),
            feat("pipeline", "Sales Pipeline", "Track deals through stages", 5, 3, None),
            feat("email", "Email Integration", "Sync and send email from the CRM", 5, 4, None),
            feat("ai-scoring", "AI Lead Scoring", "Rank leads by conversion likelihood", 7, 5, ANALYTICS),
            feat("reporting", "Sales Reporting", "Dashboards for revenue and activity", 4, 6, ANALYTICS),
            feat("api", "Public API", "Programmatic access for integrations", 6, 7, None),
            feat("mobile", "Mobile App", "CRM on iOS and Android", 8, 8, MOBILE),
        ],
    },
    ProductTemplate {
        id: "project-management",
        name: "Project Management Tool",
        description: "Plan, track and ship work as a team",
        category: Category::Productivity,
        estimated_complexity: 3,
        revenue_potential: 1.2,
        features: &[
            feat("auth", "User Authentication", "Sign-up, login and roles", 3, 1, None),
            feat("tasks", "Task Management", "Create, assign and track tasks", 4, 2, None),
            feat("boards", "Kanban Boards", "Visual boards for workflow stages", 4, 3, None),
            feat("collaboration", "Team Collaboration", "Comments, mentions and shared views", 5, 4, None),
            feat("automation", "Workflow Automation", "Rules that move work automatically", 6, 5, Some("automation")),
            feat("time-tracking", "Time Tracking", "Log and report time spent", 4, 6, ANALYTICS),
            feat("integrations", "Integrations", "Connect chat, code hosting and calendars", 5, 7, None),
            feat("mobile", "Mobile App", "Manage projects on the go", 7, 8, MOBILE),
        ],
    },
    ProductTemplate {
        id: "analytics-dashboard",
        name: "Analytics Dashboard",
        description: "Business intelligence over a company's data",
        category: Category::Analytics,
        estimated_complexity: 5,
        revenue_potential: 1.6,
        features: &[
            feat("auth", "User Authentication", "Sign-up, login and roles", 4, 1, None),
            feat("data-connectors", "Data Connectors", "Import from databases and SaaS tools", 6, 2, None),
            feat("visualization", "Visualizations", "Charts and dashboards", 5, 3, None),
            feat("real-time", "Real-time Updates", "Streaming metrics", 6, 4, ANALYTICS),
            feat("predictive", "Predictive Analytics", "Forecasts from historical data", 8, 5, ANALYTICS),
            feat("alerts", "Alerts", "Notify on metric thresholds", 4, 6, None),
            feat("export", "Export", "CSV and PDF exports", 3, 7, None),
            feat("api", "Public API", "Programmatic access for integrations", 7, 8, None),
        ],
    },
    ProductTemplate {
        id: "ai-chatbot",
        name: "AI Support Chatbot",
        description: "Automated customer support conversations",
        category: Category::Ai,
        estimated_complexity: 5,
        revenue_potential: 1.5,
        features: &[
            feat("chat-interface", "Chat Interface", "Embeddable chat widget", 3, 1, None),
            feat("nlp", "Natural Language Understanding", "Intent and entity detection", 7, 2, None),
            feat("knowledge-base", "Knowledge Base", "Answers sourced from help articles", 5, 3, None),
            feat("multi-channel", "Multi-channel Support", "Web, email and messaging apps", 5, 4, None),
            feat("analytics", "Conversation Analytics", "Resolution and satisfaction metrics", 4, 5, ANALYTICS),
            feat("training", "Custom Model Training", "Fine-tune on customer transcripts", 8, 6, None),
            feat("sso", "Single Sign-On", "Enterprise identity providers", 5, 7, None),
            feat("api", "Public API", "Programmatic access for integrations", 6, 8, None),
        ],
    },
    ProductTemplate {
        id: "hr-management",
        name: "HR Management Suite",
        description: "People operations for growing companies",
        category: Category::Hr,
        estimated_complexity: 4,
        revenue_potential: 1.3,
        features: &[
            feat("employee-db", "Employee Directory", "Central employee records", 3, 1, None),
            feat("onboarding", "Onboarding Flows", "Checklists for new hires", 4, 2, None),
            feat("time-off", "Time Off", "Requests, approvals and balances", 4, 3, None),
            feat("performance", "Performance Reviews", "Review cycles and goals", 5, 4, ANALYTICS),
            feat("payroll", "Payroll", "Run payroll and tax filings", 6, 5, Some("revenue")),
            feat("benefits", "Benefits", "Enrollment and plan management", 5, 6, None),
            feat("reporting", "HR Reporting", "Headcount and attrition dashboards", 4, 7, ANALYTICS),
            feat("mobile", "Mobile App", "Self-service for employees", 6, 8, MOBILE),
        ],
    },
];

/// Look up a product template by id.
pub fn product_template(id: &str) -> Option<&'static ProductTemplate> {
    PRODUCT_TEMPLATES.iter().find(|t| t.id == id)
}

/// Hand-authored component breakdowns for well-known feature ids.
static PREDEFINED_COMPONENTS: &[(&str, &[ComponentTemplate])] = &[
    (
        "auth",
        &[
            comp("auth-1", "User Registration", 2, 3),
            comp("auth-2", "Login & Session Management", 3, 4),
            comp("auth-3", "Password Reset Flow", 2, 3),
            comp("auth-4", "Role-Based Access Control", 4, 5),
            comp("auth-5", "User Profile Management", 2, 3),
        ],
    ),
    (
        "contacts",
        &[
            comp("contacts-1", "Contact Data Model", 3, 4),
            comp("contacts-2", "Contact List & Search", 3, 4),
            comp("contacts-3", "Contact Detail View", 2, 3),
            comp("contacts-4", "CSV Import", 4, 5),
            comp("contacts-5", "Duplicate Detection", 5, 6),
        ],
    ),
    (
        "pipeline",
        &[
            comp("pipeline-1", "Deal Stages", 3, 4),
            comp("pipeline-2", "Drag & Drop Board", 4, 5),
            comp("pipeline-3", "Deal Value Tracking", 3, 4),
            comp("pipeline-4", "Win/Loss Reasons", 2, 3),
            comp("pipeline-5", "Forecasting", 5, 6),
        ],
    ),
    (
        "email",
        &[
            comp("email-1", "Mailbox Sync", 5, 6),
            comp("email-2", "Email Templates", 3, 4),
            comp("email-3", "Open & Click Tracking", 4, 5),
            comp("email-4", "Sequences", 5, 6),
            comp("email-5", "Email Timeline", 3, 4),
        ],
    ),
    (
        "ai-scoring",
        &[
            comp("ai-scoring-1", "Feature Extraction", 6, 7),
            comp("ai-scoring-2", "Scoring Model", 8, 9),
            comp("ai-scoring-3", "Score Explanations", 5, 6),
            comp("ai-scoring-4", "Model Retraining", 6, 7),
            comp("ai-scoring-5", "Score Display", 3, 4),
        ],
    ),
    (
        "reporting",
        &[
            comp("reporting-1", "Report Builder", 5, 6),
            comp("reporting-2", "Standard Reports", 3, 4),
            comp("reporting-3", "Scheduled Reports", 4, 5),
            comp("reporting-4", "Chart Widgets", 4, 5),
            comp("reporting-5", "Report Sharing", 2, 3),
        ],
    ),
    (
        "api",
        &[
            comp("api-1", "REST Endpoints", 4, 5),
            comp("api-2", "API Keys & Auth", 3, 4),
            comp("api-3", "Rate Limiting", 4, 5),
            comp("api-4", "Webhooks", 5, 6),
            comp("api-5", "API Documentation", 2, 3),
        ],
    ),
    (
        "mobile",
        &[
            comp("mobile-1", "Mobile App Architecture", 5, 6),
            comp("mobile-2", "Core UI Components", 4, 5),
            comp("mobile-3", "API Integration", 4, 5),
            comp("mobile-4", "Offline Support", 6, 7),
            comp("mobile-5", "Push Notifications", 5, 6),
        ],
    ),
    (
        "tasks",
        &[
            comp("tasks-1", "Task Management System", 4, 5),
            comp("tasks-2", "Task Dependencies", 5, 6),
            comp("tasks-3", "Task Filtering & Sorting", 3, 4),
            comp("tasks-4", "Bulk Task Operations", 4, 5),
        ],
    ),
    (
        "collaboration",
        &[
            comp("collab-1", "Real-time Collaboration Engine", 7, 8),
            comp("collab-2", "Comments System", 4, 5),
            comp("collab-3", "Mentions & Notifications", 5, 6),
            comp("collab-4", "Activity Feed", 4, 5),
        ],
    ),
    (
        "time-tracking",
        &[
            comp("time-1", "Timer Widget", 3, 4),
            comp("time-2", "Timesheets", 4, 5),
            comp("time-3", "Billable Hours", 4, 5),
            comp("time-4", "Time Reports", 3, 4),
        ],
    ),
    (
        "chat-interface",
        &[
            comp("chat-1", "Chat Widget", 3, 4),
            comp("chat-2", "Message History", 3, 4),
            comp("chat-3", "Typing Indicators", 2, 3),
            comp("chat-4", "Human Handoff", 4, 5),
        ],
    ),
    (
        "nlp",
        &[
            comp("nlp-1", "Intent Classification", 7, 8),
            comp("nlp-2", "Entity Extraction", 6, 7),
            comp("nlp-3", "Context Tracking", 7, 8),
            comp("nlp-4", "Response Generation", 8, 9),
        ],
    ),
    (
        "employee-db",
        &[
            comp("emp-db-1", "Employee Records", 3, 4),
            comp("emp-db-2", "Org Chart", 4, 5),
            comp("emp-db-3", "Document Storage", 3, 4),
            comp("emp-db-4", "Directory Search", 2, 3),
        ],
    ),
    (
        "performance",
        &[
            comp("perf-1", "Review Cycles", 4, 5),
            comp("perf-2", "Goal Tracking", 4, 5),
            comp("perf-3", "Peer Feedback", 3, 4),
            comp("perf-4", "Calibration Reports", 5, 6),
        ],
    ),
];

/// Components for a feature: the predefined set for its id, or a generated
/// spread of `clamp(ceil(c / 1.5), 3, 6)` components around its complexity.
pub fn generate_components(feature_id: &str, feature_name: &str, complexity: f64) -> Vec<FeatureComponent> {
    if let Some((_, set)) = PREDEFINED_COMPONENTS.iter().find(|(id, _)| *id == feature_id) {
        return set.iter().map(ComponentTemplate::instantiate).collect();
    }
    let n = ((complexity / 1.5).ceil() as i64).clamp(3, 6) as usize;
    (0..n)
        .map(|i| {
            let raw = complexity + (i as f64 - n as f64 / 2.0) * 0.5;
            let c = (raw.clamp(2.0, 8.0) * 10.0).round() / 10.0;
            FeatureComponent {
                id: ComponentId(format!("{feature_id}-comp-{}", i + 1)),
                name: format!("{feature_name} - Component {}", i + 1),
                base_complexity: c,
                estimated_days: (c * 1.2).ceil(),
                progress: 0.0,
            }
        })
        .collect()
}

fn one_if<R: Rng + ?Sized>(rng: &mut R, threshold: f64) -> u32 {
    u32::from(rng.gen::<f64>() > threshold)
}

/// Staffing requirements by complexity band. Every feature needs at least
/// one engineering slot.
pub fn generate_requirements<R: Rng + ?Sized>(complexity: f64, rng: &mut R) -> FeatureRequirements {
    let mut req = if complexity <= 3.0 {
        FeatureRequirements {
            min_seniority: if rng.gen_bool(0.5) {
                ExperienceLevel::Junior
            } else {
                ExperienceLevel::Mid
            },
            frontend: one_if(rng, 0.5),
            backend: one_if(rng, 0.5),
            product: one_if(rng, 0.7),
            visual: 0,
        }
    } else if complexity <= 6.0 {
        FeatureRequirements {
            min_seniority: if rng.gen::<f64>() > 0.3 {
                ExperienceLevel::Mid
            } else {
                ExperienceLevel::Senior
            },
            frontend: one_if(rng, 0.3),
            backend: one_if(rng, 0.3),
            product: one_if(rng, 0.4),
            visual: one_if(rng, 0.6),
        }
    } else {
        let engineers = (complexity / 4.0).ceil() as u32;
        FeatureRequirements {
            min_seniority: ExperienceLevel::Senior,
            frontend: engineers,
            backend: engineers,
            product: one_if(rng, 0.3),
            visual: one_if(rng, 0.3),
        }
    };
    if req.frontend + req.backend == 0 {
        if rng.gen_bool(0.5) {
            req.frontend = 1;
        } else {
            req.backend = 1;
        }
    }
    req
}

fn new_feature<R: Rng + ?Sized>(
    id: &str,
    name: &str,
    description: &str,
    complexity: f64,
    priority: u32,
    unlocks: Option<&str>,
    rng: &mut R,
) -> Feature {
    Feature {
        id: FeatureId(id.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        priority,
        base_complexity: complexity,
        components: generate_components(id, name, complexity),
        progress: 0.0,
        assigned_team: BTreeSet::new(),
        requirements: generate_requirements(complexity, rng),
        unlocks_capability: unlocks.map(str::to_string),
    }
}

impl ProductTemplate {
    /// Instantiate the template's features in priority order.
    pub fn build_features<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Feature> {
        let mut features: Vec<Feature> = self
            .features
            .iter()
            .map(|f| {
                new_feature(
                    f.id,
                    f.name,
                    f.description,
                    f.complexity.into(),
                    f.priority,
                    f.unlocks,
                    rng,
                )
            })
            .collect();
        features.sort_by_key(|f| f.priority);
        features
    }
}

/// The placeholder product used before a template is chosen.
pub fn default_features<R: Rng + ?Sized>(rng: &mut R) -> Vec<Feature> {
    vec![new_feature(
        "core",
        "Core Functionality",
        "The essential features of your product",
        5.0,
        1,
        None,
        rng,
    )]
}

// ---------------------------------------------------------------------------
// Offices
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct OfficeSpec {
    pub tier: OfficeTier,
    pub name: &'static str,
    pub description: &'static str,
    pub capacity: u32,
    /// USD per month.
    pub monthly_cost: i64,
}

pub static OFFICE_TIERS: [OfficeSpec; 4] = [
    OfficeSpec {
        tier: OfficeTier::Coworking,
        name: "Coworking Space",
        description: "Hot desks in a shared space; cheap and flexible",
        capacity: 5,
        monthly_cost: 1_000,
    },
    OfficeSpec {
        tier: OfficeTier::Small,
        name: "Small Office",
        description: "A private room for a small founding team",
        capacity: 10,
        monthly_cost: 3_000,
    },
    OfficeSpec {
        tier: OfficeTier::Medium,
        name: "Medium Office",
        description: "A full floor with meeting rooms",
        capacity: 25,
        monthly_cost: 8_000,
    },
    OfficeSpec {
        tier: OfficeTier::Large,
        name: "Large Office",
        description: "A headquarters for a scaling company",
        capacity: 50,
        monthly_cost: 20_000,
    },
];

impl OfficeTier {
    pub fn spec(self) -> &'static OfficeSpec {
        match self {
            OfficeTier::Coworking => &OFFICE_TIERS[0],
            OfficeTier::Small => &OFFICE_TIERS[1],
            OfficeTier::Medium => &OFFICE_TIERS[2],
            OfficeTier::Large => &OFFICE_TIERS[3],
        }
    }

    pub fn monthly_cost(self) -> Decimal {
        Decimal::from(self.spec().monthly_cost)
    }

    /// Upfront purchase price: three months of rent.
    pub fn purchase_cost(self) -> Decimal {
        self.monthly_cost() * Decimal::from(3)
    }

    pub fn office(self, id: OfficeId) -> Office {
        let spec = self.spec();
        Office {
            id,
            tier: self,
            capacity: spec.capacity,
            monthly_cost: self.monthly_cost(),
            name: spec.name.to_string(),
            description: spec.description.to_string(),
        }
    }
}
