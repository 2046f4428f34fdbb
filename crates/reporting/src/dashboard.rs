//! Dashboard roll-ups — totals, platform over-reporting, and side-by-side
//! attribution model comparison.

use chrono::{DateTime, Utc};
use chronos_core::types::roas;
use chronos_core::{AttributionModel, Campaign, CustomerJourney, Platform};
use serde::{Deserialize, Serialize};

use crate::attribution::AttributionModeler;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformBreakdown {
    pub platform: Platform,
    pub campaigns: u64,
    pub spend: f64,
    pub platform_reported_sales: f64,
    pub tracked_sales: f64,
    pub roas: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_spend: f64,
    pub platform_reported_sales: f64,
    pub tracked_sales: f64,
    pub total_leads: u64,
    pub active_campaigns: u64,
    /// Tracked sales over spend (0.0 when nothing was spent).
    pub blended_roas: f64,
    /// Revenue the ad platforms claim beyond what attribution supports.
    pub over_reported_sales: f64,
    /// `over_reported_sales` as a percentage of platform-reported sales.
    pub over_reported_percent: f64,
    pub platforms: Vec<PlatformBreakdown>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparison {
    pub model: AttributionModel,
    pub tracked_sales: f64,
    pub blended_roas: f64,
    /// Campaign id -> tracked sales under this model, in campaign order.
    pub by_campaign: Vec<(String, f64)>,
}

pub fn summarize(campaigns: &[Campaign]) -> DashboardSummary {
    let total_spend: f64 = campaigns.iter().map(|c| c.spend).sum();
    let platform_reported_sales: f64 = campaigns.iter().map(|c| c.platform_reported_sales).sum();
    let tracked_sales: f64 = campaigns.iter().map(|c| c.chronos_tracked_sales).sum();
    let over_reported_sales = platform_reported_sales - tracked_sales;

    let platforms = Platform::ALL
        .into_iter()
        .filter_map(|platform| {
            let group: Vec<&Campaign> = campaigns.iter().filter(|c| c.platform == platform).collect();
            if group.is_empty() {
                return None;
            }
            let spend: f64 = group.iter().map(|c| c.spend).sum();
            let tracked: f64 = group.iter().map(|c| c.chronos_tracked_sales).sum();
            Some(PlatformBreakdown {
                platform,
                campaigns: group.len() as u64,
                spend,
                platform_reported_sales: group.iter().map(|c| c.platform_reported_sales).sum(),
                tracked_sales: tracked,
                roas: roas(tracked, spend),
            })
        })
        .collect();

    DashboardSummary {
        total_spend,
        platform_reported_sales,
        tracked_sales,
        total_leads: campaigns.iter().map(|c| c.leads).sum(),
        active_campaigns: campaigns.iter().filter(|c| c.is_active()).count() as u64,
        blended_roas: roas(tracked_sales, total_spend),
        over_reported_sales,
        over_reported_percent: if platform_reported_sales > 0.0 {
            over_reported_sales / platform_reported_sales * 100.0
        } else {
            0.0
        },
        platforms,
        generated_at: Utc::now(),
    }
}

/// Run the modeler under every attribution model so the dashboard can show
/// how much each campaign's credit moves between models.
pub fn compare_models(campaigns: &[Campaign], journeys: &[CustomerJourney]) -> Vec<ModelComparison> {
    let modeler = AttributionModeler::new();
    let total_spend: f64 = campaigns.iter().map(|c| c.spend).sum();

    AttributionModel::ALL
        .into_iter()
        .map(|model| {
            let attributed = modeler.attribute(campaigns, journeys, model);
            let tracked_sales: f64 = attributed.iter().map(|c| c.chronos_tracked_sales).sum();
            ModelComparison {
                model,
                tracked_sales,
                blended_roas: roas(tracked_sales, total_spend),
                by_campaign: attributed
                    .into_iter()
                    .map(|c| (c.id, c.chronos_tracked_sales))
                    .collect(),
            }
        })
        .collect()
}
