use serde::Deserialize;

use crate::error::ChronosResult;
use crate::types::AttributionModel;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CHRONOS__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub attribution: AttributionConfig,
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default)]
    pub fraud: FraudConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_model")]
    pub default_model: AttributionModel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutomationConfig {
    /// Ids of default rules switched off at startup.
    #[serde(default)]
    pub disabled_rules: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FraudConfig {
    #[serde(default = "default_observation_window_ms")]
    pub observation_window_ms: u64,
}

// Default functions
fn default_model() -> AttributionModel {
    AttributionModel::UShaped
}
fn default_observation_window_ms() -> u64 {
    3000
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
        }
    }
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            observation_window_ms: default_observation_window_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment
    /// variables. Environment values take precedence.
    pub fn load(path: Option<&str>) -> ChronosResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("CHRONOS")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("automation.disabled_rules"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
