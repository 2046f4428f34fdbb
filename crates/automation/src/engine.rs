//! Rules engine — evaluates enabled rules against campaigns in priority order
//! and collects every match as a recommended action.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use chronos_core::Campaign;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::rules::{default_rules, CampaignRule, RuleAction};

/// One rule firing for one campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEvaluationResult {
    pub campaign: Campaign,
    pub rule_id: String,
    pub rule_name: String,
    pub action: RuleAction,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Owns an ordered rule list for its lifetime. Mutation takes `&mut self`,
/// so concurrent callers must serialize access themselves.
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    rules: Vec<CampaignRule>,
}

impl RulesEngine {
    pub fn new(rules: Vec<CampaignRule>) -> Self {
        let mut engine = Self { rules };
        engine.sort();
        engine
    }

    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    /// Append a rule and restore descending priority order. Rules with equal
    /// priority keep insertion order.
    pub fn add_rule(&mut self, rule: CampaignRule) {
        info!(rule_id = %rule.id, name = %rule.name, priority = rule.priority, "Rule added");
        self.rules.push(rule);
        self.sort();
    }

    /// Returns `false` when no rule has this id.
    pub fn remove_rule(&mut self, id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        let removed = self.rules.len() != before;
        if removed {
            info!(rule_id = %id, "Rule removed");
        }
        removed
    }

    /// Returns `false` when no rule has this id.
    pub fn toggle_rule(&mut self, id: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                info!(rule_id = %id, enabled, "Rule toggled");
                true
            }
            None => false,
        }
    }

    pub fn get_rules(&self) -> &[CampaignRule] {
        &self.rules
    }

    pub fn get_rule(&self, id: &str) -> Option<&CampaignRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Evaluate every enabled rule against every campaign.
    ///
    /// Conditions are awaited one at a time, campaign-major then priority
    /// order, so output order is deterministic. A campaign may match several
    /// rules, including ones recommending conflicting actions. A condition
    /// that fails is logged and treated as no match for that pair only.
    pub async fn evaluate(&self, campaigns: &[Campaign]) -> Vec<RuleEvaluationResult> {
        let mut results = Vec::new();

        for campaign in campaigns {
            for rule in self.rules.iter().filter(|r| r.enabled) {
                match rule.condition.evaluate(campaign).await {
                    Ok(true) => {
                        debug!(
                            campaign_id = %campaign.id,
                            rule = %rule.name,
                            action = ?rule.action,
                            "Rule matched"
                        );
                        metrics::counter!("rules.matches").increment(1);
                        results.push(RuleEvaluationResult {
                            campaign: campaign.clone(),
                            rule_id: rule.id.clone(),
                            rule_name: rule.name.clone(),
                            action: rule.action,
                            reason: rule.reason.clone(),
                            timestamp: Utc::now(),
                        });
                    }
                    Ok(false) => {}
                    Err(e) => {
                        metrics::counter!("rules.condition_errors").increment(1);
                        warn!(
                            rule_id = %rule.id,
                            rule = %rule.name,
                            campaign_id = %campaign.id,
                            error = %e,
                            "Rule condition failed, skipping"
                        );
                    }
                }
            }
        }

        info!(
            campaigns = campaigns.len(),
            matches = results.len(),
            "Rules evaluated"
        );
        results
    }

    /// Match counts per action, in [`RuleAction::ALL`] order. Actions with no
    /// matches are omitted.
    pub fn summarize(results: &[RuleEvaluationResult]) -> Vec<(RuleAction, usize)> {
        RuleAction::ALL
            .into_iter()
            .map(|action| (action, results.iter().filter(|r| r.action == action).count()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    fn sort(&mut self) {
        self.rules.sort_by_key(|r| Reverse(r.priority));
    }
}
