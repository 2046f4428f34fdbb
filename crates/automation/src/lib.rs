//! Campaign automation — typed rule conditions, the default rule set, and the
//! engine that turns campaign metrics into recommended actions.

pub mod conditions;
pub mod engine;
pub mod rules;

pub use conditions::{CampaignField, CampaignPredicate, ComparisonOperator, RuleCondition};
pub use engine::{RuleEvaluationResult, RulesEngine};
pub use rules::{default_rules, CampaignRule, RuleAction};
