pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{ChronosError, ChronosResult};
pub use types::{
    AdSet, AttributionModel, Campaign, CampaignStatus, CustomerJourney, DashboardSnapshot,
    IdentityLink, Platform, Touchpoint, TouchpointType,
};
