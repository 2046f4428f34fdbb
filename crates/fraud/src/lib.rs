//! Bot and fraud screening — heuristic signals about a visiting client,
//! gathered through an [`EnvironmentProbe`], folded into a bounded risk score.

pub mod probe;
pub mod scorer;
pub mod signals;

pub use probe::{
    BrowserCapabilities, EnvironmentProbe, InteractionEvent, InteractionKind, ReportedEnvironment,
    SessionProbe,
};
pub use scorer::{FraudRiskResult, FraudRiskScorer, RiskLevel};
