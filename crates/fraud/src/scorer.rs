//! Fraud risk scorer — sums the weights of every triggered heuristic into a
//! 0-100 score and classifies the session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chronos_core::config::FraudConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::probe::EnvironmentProbe;
use crate::signals::{ENVIRONMENT_CHECKS, NO_INTERACTION, NO_INTERACTION_WEIGHT};

/// Scores at or above this are classified as bots.
pub const BOT_THRESHOLD: u8 = 50;
pub const MAX_RISK_SCORE: u8 = 100;
pub const DEFAULT_OBSERVATION_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Assessment of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRiskResult {
    pub is_bot: bool,
    pub risk_score: u8,
    /// Triggered checks, in evaluation order.
    pub factors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl FraudRiskResult {
    /// Build from triggered factor names and their summed weight. The score
    /// is clamped to 100 and the bot flag derived from it.
    pub fn from_points(factors: Vec<String>, points: u32) -> Self {
        let risk_score = points.min(MAX_RISK_SCORE as u32) as u8;
        Self {
            is_bot: risk_score >= BOT_THRESHOLD,
            risk_score,
            factors,
            timestamp: Utc::now(),
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self.risk_score {
            0..=24 => RiskLevel::Low,
            25..=49 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

/// Caller-owned scorer over an environment probe.
pub struct FraudRiskScorer {
    probe: Arc<dyn EnvironmentProbe>,
    observation_window: Duration,
}

impl FraudRiskScorer {
    pub fn new(probe: Arc<dyn EnvironmentProbe>) -> Self {
        Self {
            probe,
            observation_window: DEFAULT_OBSERVATION_WINDOW,
        }
    }

    pub fn from_config(probe: Arc<dyn EnvironmentProbe>, config: &FraudConfig) -> Self {
        Self::new(probe).with_observation_window(Duration::from_millis(config.observation_window_ms))
    }

    pub fn with_observation_window(mut self, window: Duration) -> Self {
        self.observation_window = window;
        self
    }

    pub fn observation_window(&self) -> Duration {
        self.observation_window
    }

    /// Run every check and wait out the interaction window. Never fails.
    pub async fn analyze(&self) -> FraudRiskResult {
        let environment = self.probe.environment();

        let mut factors = Vec::new();
        let mut points = 0u32;
        for check in &ENVIRONMENT_CHECKS {
            if (check.detect)(&environment) {
                factors.push(check.name.to_string());
                points += check.weight;
            }
        }

        if !self.probe.observe_interaction(self.observation_window).await {
            factors.push(NO_INTERACTION.to_string());
            points += NO_INTERACTION_WEIGHT;
        }

        let result = FraudRiskResult::from_points(factors, points);

        metrics::counter!("fraud.sessions_scored").increment(1);
        if result.is_bot {
            metrics::counter!("fraud.bots_detected").increment(1);
        }
        info!(
            risk_score = result.risk_score,
            is_bot = result.is_bot,
            factors = ?result.factors,
            "Session scored"
        );
        result
    }
}
