//! Rule condition types and evaluation logic.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chronos_core::{Campaign, CampaignStatus, ChronosResult, Platform};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

/// Numeric campaign metric a condition can compare against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignField {
    Spend,
    PlatformReportedSales,
    TrackedSales,
    Roas,
    Leads,
}

impl CampaignField {
    pub fn value(&self, campaign: &Campaign) -> f64 {
        match self {
            Self::Spend => campaign.spend,
            Self::PlatformReportedSales => campaign.platform_reported_sales,
            Self::TrackedSales => campaign.chronos_tracked_sales,
            Self::Roas => campaign.roas(),
            Self::Leads => campaign.leads as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub fn compare(&self, actual: f64, expected: f64) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::GreaterThan => actual > expected,
            Self::GreaterThanOrEqual => actual >= expected,
            Self::LessThan => actual < expected,
            Self::LessThanOrEqual => actual <= expected,
        }
    }
}

/// Caller-supplied predicate for conditions the typed variants cannot
/// express. May be asynchronous and may fail.
#[async_trait]
pub trait CampaignPredicate: Send + Sync + fmt::Debug {
    async fn matches(&self, campaign: &Campaign) -> ChronosResult<bool>;
}

/// Predicate over a single campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    Compare {
        field: CampaignField,
        operator: ComparisonOperator,
        value: f64,
    },
    StatusIs {
        status: CampaignStatus,
    },
    PlatformIs {
        platform: Platform,
    },
    All {
        conditions: Vec<RuleCondition>,
    },
    Any {
        conditions: Vec<RuleCondition>,
    },
    Not {
        condition: Box<RuleCondition>,
    },
    /// Not serializable; rules carrying one live only in memory.
    #[serde(skip)]
    Custom(Arc<dyn CampaignPredicate>),
}

impl RuleCondition {
    pub fn compare(field: CampaignField, operator: ComparisonOperator, value: f64) -> Self {
        Self::Compare {
            field,
            operator,
            value,
        }
    }

    pub fn status(status: CampaignStatus) -> Self {
        Self::StatusIs { status }
    }

    pub fn all(conditions: Vec<RuleCondition>) -> Self {
        Self::All { conditions }
    }

    pub fn any(conditions: Vec<RuleCondition>) -> Self {
        Self::Any { conditions }
    }

    pub fn negate(condition: RuleCondition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    pub fn custom(predicate: impl CampaignPredicate + 'static) -> Self {
        Self::Custom(Arc::new(predicate))
    }

    /// Wrap a synchronous closure as a custom condition.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Campaign) -> ChronosResult<bool> + Send + Sync + 'static,
    {
        Self::custom(FnPredicate {
            name: name.into(),
            f: Box::new(f),
        })
    }

    /// Evaluate against a campaign. `All` and `Any` short-circuit left to
    /// right; the first failing child aborts the whole condition.
    pub fn evaluate<'a>(&'a self, campaign: &'a Campaign) -> BoxFuture<'a, ChronosResult<bool>> {
        async move {
            match self {
                Self::Compare {
                    field,
                    operator,
                    value,
                } => Ok(operator.compare(field.value(campaign), *value)),
                Self::StatusIs { status } => Ok(campaign.status == *status),
                Self::PlatformIs { platform } => Ok(campaign.platform == *platform),
                Self::All { conditions } => {
                    for condition in conditions {
                        if !condition.evaluate(campaign).await? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                Self::Any { conditions } => {
                    for condition in conditions {
                        if condition.evaluate(campaign).await? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                Self::Not { condition } => Ok(!condition.evaluate(campaign).await?),
                Self::Custom(predicate) => predicate.matches(campaign).await,
            }
        }
        .boxed()
    }
}

type CampaignFn = Box<dyn Fn(&Campaign) -> ChronosResult<bool> + Send + Sync>;

struct FnPredicate {
    name: String,
    f: CampaignFn,
}

impl fmt::Debug for FnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate").field("name", &self.name).finish()
    }
}

#[async_trait]
impl CampaignPredicate for FnPredicate {
    async fn matches(&self, campaign: &Campaign) -> ChronosResult<bool> {
        (self.f)(campaign)
    }
}
