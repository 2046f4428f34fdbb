//! Revenue attribution — distributes each customer journey's lifetime value
//! across the ad clicks that led to it and rolls the credit up per campaign.

use std::collections::HashMap;

use chronos_core::{AttributionModel, Campaign, CustomerJourney, Touchpoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Share of a journey's value assigned to one ad-click touchpoint, before the
/// source is resolved to a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TouchpointCredit {
    pub touchpoint_id: String,
    pub source: String,
    pub amount: f64,
}

/// Stateless attribution modeler. Every call works on borrowed input and
/// returns fresh campaigns; nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct AttributionModeler;

impl AttributionModeler {
    pub fn new() -> Self {
        Self
    }

    /// Recompute `chronos_tracked_sales` for every campaign from the given
    /// journeys under `model`.
    ///
    /// Ad clicks whose source matches no campaign name are dropped, and
    /// journeys without ad clicks contribute nothing. Neither is an error.
    pub fn attribute(
        &self,
        campaigns: &[Campaign],
        journeys: &[CustomerJourney],
        model: AttributionModel,
    ) -> Vec<Campaign> {
        let mut revenue_by_campaign: HashMap<&str, f64> =
            campaigns.iter().map(|c| (c.id.as_str(), 0.0)).collect();

        // First campaign wins when two share a name.
        let mut id_by_name: HashMap<&str, &str> = HashMap::with_capacity(campaigns.len());
        for campaign in campaigns {
            id_by_name
                .entry(campaign.name.as_str())
                .or_insert(campaign.id.as_str());
        }

        let mut dropped = 0usize;
        for journey in journeys {
            for credit in self.journey_credits(journey, model) {
                match id_by_name.get(credit.source.as_str()) {
                    Some(&id) => *revenue_by_campaign.entry(id).or_insert(0.0) += credit.amount,
                    None => {
                        dropped += 1;
                        debug!(
                            journey_id = %journey.id,
                            source = %credit.source,
                            "Ad click source matches no campaign"
                        );
                    }
                }
            }
        }

        info!(
            model = %model,
            campaigns = campaigns.len(),
            journeys = journeys.len(),
            unmatched_touchpoints = dropped,
            "Attribution computed"
        );

        campaigns
            .iter()
            .map(|campaign| {
                let revenue = revenue_by_campaign
                    .get(campaign.id.as_str())
                    .copied()
                    .unwrap_or(0.0);
                Campaign {
                    chronos_tracked_sales: revenue.round(),
                    ..campaign.clone()
                }
            })
            .collect()
    }

    /// Per-ad-click credit for a single journey, in chronological order.
    ///
    /// Every ad click appears once, including those credited zero. Amounts
    /// are unrounded.
    pub fn journey_credits(
        &self,
        journey: &CustomerJourney,
        model: AttributionModel,
    ) -> Vec<TouchpointCredit> {
        let clicks: Vec<&Touchpoint> = journey.ad_clicks().collect();
        let shares = model_shares(model, clicks.len());

        clicks
            .into_iter()
            .zip(shares)
            .map(|(touchpoint, share)| TouchpointCredit {
                touchpoint_id: touchpoint.id.clone(),
                source: touchpoint.source.clone(),
                amount: journey.total_ltv * share,
            })
            .collect()
    }
}

/// Fraction of the journey value each of `n` ad clicks receives.
///
/// U-Shaped with exactly two clicks has no interior touchpoints, so the
/// middle 20% is assigned to nobody.
fn model_shares(model: AttributionModel, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let last = n - 1;

    match model {
        AttributionModel::FirstClick => (0..n).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect(),
        AttributionModel::LastClick => (0..n).map(|i| if i == last { 1.0 } else { 0.0 }).collect(),
        AttributionModel::Linear => vec![1.0 / n as f64; n],
        AttributionModel::TimeDecay => {
            // Relative to the last click so long journeys cannot overflow.
            let weights: Vec<f64> = (0..n).map(|i| 0.5f64.powi((last - i) as i32)).collect();
            let total: f64 = weights.iter().sum();
            weights.into_iter().map(|w| w / total).collect()
        }
        AttributionModel::UShaped => {
            if n == 1 {
                return vec![1.0];
            }
            let interior = n.saturating_sub(2);
            (0..n)
                .map(|i| {
                    if i == 0 || i == last {
                        0.4
                    } else {
                        0.2 / interior as f64
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use chronos_core::{CampaignStatus, Platform, TouchpointType};

    fn campaign(id: &str, name: &str) -> Campaign {
        Campaign {
            id: id.to_string(),
            name: name.to_string(),
            platform: Platform::Facebook,
            status: CampaignStatus::Active,
            spend: 100.0,
            platform_reported_sales: 0.0,
            chronos_tracked_sales: 0.0,
            leads: 0,
            ad_sets: Vec::new(),
        }
    }

    fn journey(ltv: f64, touches: &[(TouchpointType, &str)]) -> CustomerJourney {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        CustomerJourney {
            id: "j-1".to_string(),
            customer_name: "Test Customer".to_string(),
            email: "customer@example.com".to_string(),
            total_ltv: ltv,
            touchpoints: touches
                .iter()
                .enumerate()
                .map(|(i, (kind, source))| Touchpoint {
                    id: format!("tp-{i}"),
                    touchpoint_type: *kind,
                    source: source.to_string(),
                    device: "desktop".to_string(),
                    timestamp: start + Duration::hours(i as i64),
                })
                .collect(),
            identity_graph: Vec::new(),
            tags: Vec::new(),
        }
    }

    fn ads(ltv: f64, sources: &[&str]) -> CustomerJourney {
        let touches: Vec<_> = sources.iter().map(|s| (TouchpointType::AdClick, *s)).collect();
        journey(ltv, &touches)
    }

    fn abc() -> Vec<Campaign> {
        vec![campaign("a", "A"), campaign("b", "B"), campaign("c", "C")]
    }

    fn sales(campaigns: &[Campaign], id: &str) -> f64 {
        campaigns.iter().find(|c| c.id == id).unwrap().chronos_tracked_sales
    }

    // 1. Concrete scenarios ---------------------------------------------------

    #[test]
    fn test_u_shaped_three_touchpoints() {
        let out = AttributionModeler::new().attribute(
            &abc(),
            &[ads(100.0, &["A", "B", "C"])],
            AttributionModel::UShaped,
        );
        assert_eq!(sales(&out, "a"), 40.0);
        assert_eq!(sales(&out, "b"), 20.0);
        assert_eq!(sales(&out, "c"), 40.0);
    }

    #[test]
    fn test_u_shaped_two_touchpoints_loses_interior_share() {
        let modeler = AttributionModeler::new();
        let credits = modeler.journey_credits(&ads(100.0, &["A", "B"]), AttributionModel::UShaped);
        let total: f64 = credits.iter().map(|c| c.amount).sum();
        assert!((total - 80.0).abs() < 1e-9);

        let out = modeler.attribute(&abc(), &[ads(100.0, &["A", "B"])], AttributionModel::UShaped);
        assert_eq!(sales(&out, "a"), 40.0);
        assert_eq!(sales(&out, "b"), 40.0);
    }

    #[test]
    fn test_u_shaped_single_touchpoint_gets_everything() {
        let out = AttributionModeler::new().attribute(
            &abc(),
            &[ads(75.0, &["B"])],
            AttributionModel::UShaped,
        );
        assert_eq!(sales(&out, "b"), 75.0);
    }

    #[test]
    fn test_first_and_last_click() {
        let modeler = AttributionModeler::new();
        let journeys = [ads(300.0, &["A", "B", "C"])];

        let first = modeler.attribute(&abc(), &journeys, AttributionModel::FirstClick);
        assert_eq!(sales(&first, "a"), 300.0);
        assert_eq!(sales(&first, "b"), 0.0);

        let last = modeler.attribute(&abc(), &journeys, AttributionModel::LastClick);
        assert_eq!(sales(&last, "c"), 300.0);
        assert_eq!(sales(&last, "a"), 0.0);
    }

    #[test]
    fn test_linear_accumulates_repeat_campaign() {
        let out = AttributionModeler::new().attribute(
            &abc(),
            &[ads(90.0, &["A", "B", "A"])],
            AttributionModel::Linear,
        );
        assert_eq!(sales(&out, "a"), 60.0);
        assert_eq!(sales(&out, "b"), 30.0);
        assert_eq!(sales(&out, "c"), 0.0);
    }

    #[test]
    fn test_time_decay_weights() {
        let credits = AttributionModeler::new()
            .journey_credits(&ads(70.0, &["A", "B", "C"]), AttributionModel::TimeDecay);
        // weights 1, 2, 4 over 7
        assert!((credits[0].amount - 10.0).abs() < 1e-9);
        assert!((credits[1].amount - 20.0).abs() < 1e-9);
        assert!((credits[2].amount - 40.0).abs() < 1e-9);
    }

    // 2. Silent degradation ---------------------------------------------------

    #[test]
    fn test_journey_without_ad_clicks_contributes_nothing() {
        let modeler = AttributionModeler::new();
        let organic = journey(
            500.0,
            &[
                (TouchpointType::OrganicSearch, "A"),
                (TouchpointType::EmailOpen, "B"),
                (TouchpointType::Checkout, "C"),
            ],
        );

        for model in AttributionModel::ALL {
            let out = modeler.attribute(&abc(), std::slice::from_ref(&organic), model);
            assert!(out.iter().all(|c| c.chronos_tracked_sales == 0.0), "{model}");
        }
    }

    #[test]
    fn test_non_ad_touchpoints_are_skipped_for_position() {
        let mixed = journey(
            100.0,
            &[
                (TouchpointType::OrganicSearch, "C"),
                (TouchpointType::AdClick, "A"),
                (TouchpointType::EmailOpen, "C"),
                (TouchpointType::AdClick, "B"),
            ],
        );
        let out = AttributionModeler::new().attribute(&abc(), &[mixed], AttributionModel::FirstClick);
        assert_eq!(sales(&out, "a"), 100.0);
        assert_eq!(sales(&out, "c"), 0.0);
    }

    #[test]
    fn test_unmatched_source_is_dropped_silently() {
        let out = AttributionModeler::new().attribute(
            &abc(),
            &[ads(100.0, &["A", "Retired Campaign"])],
            AttributionModel::Linear,
        );
        assert_eq!(sales(&out, "a"), 50.0);
        let total: f64 = out.iter().map(|c| c.chronos_tracked_sales).sum();
        assert_eq!(total, 50.0);
    }

    #[test]
    fn test_campaign_absent_from_journeys_resets_to_zero() {
        let mut stale = abc();
        stale[2].chronos_tracked_sales = 999.0;

        let out = AttributionModeler::new().attribute(&stale, &[ads(10.0, &["A"])], AttributionModel::Linear);
        assert_eq!(sales(&out, "c"), 0.0);
        // input untouched
        assert_eq!(stale[2].chronos_tracked_sales, 999.0);
    }

    #[test]
    fn test_tracked_sales_rounded_to_whole_units() {
        let out = AttributionModeler::new().attribute(
            &abc(),
            &[ads(100.0, &["A", "B", "C"])],
            AttributionModel::Linear,
        );
        assert_eq!(sales(&out, "a"), 33.0);
        assert_eq!(sales(&out, "b"), 33.0);
        assert_eq!(sales(&out, "c"), 33.0);
    }

    // 3. Properties -----------------------------------------------------------

    #[test]
    fn test_revenue_conservation() {
        let modeler = AttributionModeler::new();
        let cases: [&[&str]; 4] = [&["A"], &["A", "B", "C"], &["C", "A", "B", "A"], &["B"; 7]];

        for sources in cases {
            let j = ads(1234.56, sources);
            for model in [AttributionModel::Linear, AttributionModel::TimeDecay, AttributionModel::UShaped] {
                let total: f64 = modeler.journey_credits(&j, model).iter().map(|c| c.amount).sum();
                assert!(
                    (total - 1234.56).abs() < 0.01 * sources.len() as f64,
                    "{model} with {} clicks credited {total}",
                    sources.len()
                );
            }
        }
    }

    #[test]
    fn test_first_last_click_symmetry_under_reversal() {
        let modeler = AttributionModeler::new();
        let forward = ads(100.0, &["A", "B", "C"]);
        let mut reversed = forward.clone();
        reversed.touchpoints.reverse();

        let first = modeler.attribute(&abc(), &[forward.clone()], AttributionModel::FirstClick);
        let last = modeler.attribute(&abc(), &[reversed.clone()], AttributionModel::LastClick);
        assert_eq!(first, last);

        let last_fwd = modeler.attribute(&abc(), &[forward], AttributionModel::LastClick);
        let first_rev = modeler.attribute(&abc(), &[reversed], AttributionModel::FirstClick);
        assert_eq!(last_fwd, first_rev);
    }

    #[test]
    fn test_time_decay_is_monotonic() {
        let credits = AttributionModeler::new().journey_credits(
            &ads(1000.0, &["A", "B", "C", "A", "B", "C"]),
            AttributionModel::TimeDecay,
        );
        for pair in credits.windows(2) {
            assert!(pair[1].amount >= pair[0].amount);
        }
    }

    #[test]
    fn test_time_decay_long_journey_stays_finite() {
        let sources = vec!["A"; 1100];
        let long = ads(1000.0, &sources);
        let modeler = AttributionModeler::new();

        let credits = modeler.journey_credits(&long, AttributionModel::TimeDecay);
        assert!(credits.iter().all(|c| c.amount.is_finite()));
        let total: f64 = credits.iter().map(|c| c.amount).sum();
        assert!((total - 1000.0).abs() < 1e-6);
        for pair in credits.windows(2) {
            assert!(pair[1].amount >= pair[0].amount);
        }

        let out = modeler.attribute(&abc(), &[long], AttributionModel::TimeDecay);
        assert_eq!(sales(&out, "a"), 1000.0);
    }
}
