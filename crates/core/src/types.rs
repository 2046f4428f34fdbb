use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChronosError, ChronosResult};

/// Advertising platform a campaign runs on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    Facebook,
    Google,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Google, Platform::TikTok];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CampaignStatus {
    Active,
    Paused,
}

/// Return on ad spend. Zero spend yields 0.0 rather than infinity so every
/// consumer (rules, dashboard, CLI output) sees the same finite value.
pub fn roas(tracked_sales: f64, spend: f64) -> f64 {
    if spend > 0.0 {
        tracked_sales / spend
    } else {
        0.0
    }
}

/// One advertising campaign as reported by an ad platform, enriched with
/// revenue tracked by the attribution modeler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub status: CampaignStatus,
    pub spend: f64,
    pub platform_reported_sales: f64,
    /// Written only by the attribution modeler.
    #[serde(default)]
    pub chronos_tracked_sales: f64,
    #[serde(default)]
    pub leads: u64,
    #[serde(default)]
    pub ad_sets: Vec<AdSet>,
}

impl Campaign {
    pub fn roas(&self) -> f64 {
        roas(self.chronos_tracked_sales, self.spend)
    }

    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }
}

/// Ad set inside a campaign. Same shape as [`Campaign`] at a finer grain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdSet {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub spend: f64,
    pub platform_reported_sales: f64,
    #[serde(default)]
    pub chronos_tracked_sales: f64,
    #[serde(default)]
    pub leads: u64,
}

impl AdSet {
    pub fn roas(&self) -> f64 {
        roas(self.chronos_tracked_sales, self.spend)
    }
}

/// Rule for splitting a journey's conversion value across its ad clicks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttributionModel {
    #[serde(rename = "First-Click")]
    FirstClick,
    #[serde(rename = "Last-Click")]
    LastClick,
    Linear,
    #[serde(rename = "Time-Decay")]
    TimeDecay,
    #[serde(rename = "U-Shaped")]
    UShaped,
}

impl AttributionModel {
    pub const ALL: [AttributionModel; 5] = [
        AttributionModel::FirstClick,
        AttributionModel::LastClick,
        AttributionModel::Linear,
        AttributionModel::TimeDecay,
        AttributionModel::UShaped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstClick => "First-Click",
            Self::LastClick => "Last-Click",
            Self::Linear => "Linear",
            Self::TimeDecay => "Time-Decay",
            Self::UShaped => "U-Shaped",
        }
    }
}

impl std::fmt::Display for AttributionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttributionModel {
    type Err = ChronosError;

    /// Accepts the display names as well as lowercase/underscore spellings
    /// (`u-shaped`, `time_decay`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| ChronosError::InvalidInput(format!("unknown attribution model: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TouchpointType {
    #[serde(rename = "Ad Click")]
    AdClick,
    #[serde(rename = "Email Open")]
    EmailOpen,
    #[serde(rename = "Organic Search")]
    OrganicSearch,
    Direct,
    Checkout,
    #[serde(other)]
    Other,
}

/// A single recorded interaction between a customer and a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Touchpoint {
    pub id: String,
    #[serde(rename = "type")]
    pub touchpoint_type: TouchpointType,
    /// Matched against [`Campaign::name`] for ad clicks.
    pub source: String,
    pub device: String,
    pub timestamp: DateTime<Utc>,
}

impl Touchpoint {
    pub fn is_ad_click(&self) -> bool {
        self.touchpoint_type == TouchpointType::AdClick
    }
}

/// Cross-device link resolved by the identity graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityLink {
    pub device: String,
    pub identifier: String,
    /// 0-100.
    pub confidence_score: u8,
}

/// A customer's full touch history. Touchpoints are kept in chronological
/// order; insertion order is treated as temporal order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerJourney {
    pub id: String,
    pub customer_name: String,
    pub email: String,
    #[serde(rename = "totalLTV")]
    pub total_ltv: f64,
    pub touchpoints: Vec<Touchpoint>,
    #[serde(default)]
    pub identity_graph: Vec<IdentityLink>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CustomerJourney {
    /// Ad-click touchpoints in chronological order.
    pub fn ad_clicks(&self) -> impl Iterator<Item = &Touchpoint> {
        self.touchpoints.iter().filter(|t| t.is_ad_click())
    }
}

/// Campaigns and journeys as exported by the dashboard, the unit of input
/// for a refresh cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub journeys: Vec<CustomerJourney>,
}

impl DashboardSnapshot {
    pub fn from_json(json: &str) -> ChronosResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> ChronosResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
