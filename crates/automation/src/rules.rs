//! Campaign rule definitions and the built-in rule set.

use chronos_core::CampaignStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conditions::{CampaignField, ComparisonOperator, RuleCondition};

/// Intervention a rule recommends when its condition holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Pause,
    IncreaseBudget,
    DecreaseBudget,
    Alert,
    Enable,
}

impl RuleAction {
    pub const ALL: [RuleAction; 5] = [
        RuleAction::Pause,
        RuleAction::IncreaseBudget,
        RuleAction::DecreaseBudget,
        RuleAction::Alert,
        RuleAction::Enable,
    ];
}

/// A named automation rule. Higher `priority` is evaluated first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub condition: RuleCondition,
    pub action: RuleAction,
    /// Shown to the operator when the rule fires.
    pub reason: String,
    pub priority: i32,
}

impl CampaignRule {
    /// New enabled rule with a generated id.
    pub fn new(
        name: impl Into<String>,
        condition: RuleCondition,
        action: RuleAction,
        priority: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            enabled: true,
            condition,
            action,
            reason: String::new(),
            priority,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

fn cmp(field: CampaignField, operator: ComparisonOperator, value: f64) -> RuleCondition {
    RuleCondition::compare(field, operator, value)
}

fn active() -> RuleCondition {
    RuleCondition::status(CampaignStatus::Active)
}

/// The built-in rule set, highest priority first.
pub fn default_rules() -> Vec<CampaignRule> {
    use CampaignField::*;
    use ComparisonOperator::*;

    vec![
        CampaignRule::new(
            "Kill Low ROAS",
            RuleCondition::all(vec![cmp(Roas, LessThan, 0.8), cmp(Spend, GreaterThan, 1000.0)]),
            RuleAction::Pause,
            100,
        )
        .with_id("kill-low-roas")
        .with_description("Pause campaigns burning budget below break-even")
        .with_reason("ROAS below 0.8 after more than $1,000 spent"),
        CampaignRule::new(
            "Zero Conversions Alert",
            RuleCondition::all(vec![
                active(),
                cmp(TrackedSales, Equals, 0.0),
                cmp(Spend, GreaterThan, 100.0),
            ]),
            RuleAction::Alert,
            95,
        )
        .with_id("zero-conversions-alert")
        .with_description("Flag active campaigns spending without any tracked revenue")
        .with_reason("No tracked sales after more than $100 spent"),
        CampaignRule::new(
            "Scale High Performers",
            RuleCondition::all(vec![
                cmp(Roas, GreaterThan, 3.0),
                cmp(Spend, LessThan, 5000.0),
                active(),
            ]),
            RuleAction::IncreaseBudget,
            90,
        )
        .with_id("scale-high-performers")
        .with_description("Give more budget to efficient campaigns that still have headroom")
        .with_reason("ROAS above 3.0 with spend under $5,000"),
        CampaignRule::new(
            "High Spend Low Leads",
            RuleCondition::all(vec![
                cmp(Spend, GreaterThan, 500.0),
                cmp(Leads, LessThan, 5.0),
                active(),
            ]),
            RuleAction::Pause,
            85,
        )
        .with_id("high-spend-low-leads")
        .with_description("Pause campaigns that spend heavily but generate few leads")
        .with_reason("More than $500 spent with fewer than 5 leads"),
        CampaignRule::new(
            "Alert Declining Performance",
            RuleCondition::all(vec![
                cmp(Roas, GreaterThan, 0.8),
                cmp(Roas, LessThan, 1.5),
                cmp(Spend, GreaterThan, 500.0),
            ]),
            RuleAction::Alert,
            80,
        )
        .with_id("alert-declining-performance")
        .with_description("Warn before a marginal campaign slides under break-even")
        .with_reason("ROAS between 0.8 and 1.5 with more than $500 spent"),
        CampaignRule::new(
            "Reduce Budget Mediocre",
            RuleCondition::all(vec![
                cmp(Roas, GreaterThanOrEqual, 1.0),
                cmp(Roas, LessThan, 1.5),
                cmp(Spend, GreaterThan, 2000.0),
            ]),
            RuleAction::DecreaseBudget,
            70,
        )
        .with_id("reduce-budget-mediocre")
        .with_description("Trim budget on large campaigns that barely break even")
        .with_reason("ROAS between 1.0 and 1.5 with more than $2,000 spent"),
        CampaignRule::new(
            "Revive Paused High-Potential",
            RuleCondition::all(vec![
                RuleCondition::status(CampaignStatus::Paused),
                cmp(Roas, GreaterThan, 2.0),
            ]),
            RuleAction::Enable,
            60,
        )
        .with_id("revive-paused-high-potential")
        .with_description("Re-enable paused campaigns whose tracked ROAS is strong")
        .with_reason("Paused campaign with ROAS above 2.0")
        .disabled(),
    ]
}
