//! Campaign reporting — multi-touch revenue attribution and the dashboard
//! roll-ups built on top of it.

pub mod attribution;
pub mod dashboard;

pub use attribution::{AttributionModeler, TouchpointCredit};
pub use chronos_core::AttributionModel;
pub use dashboard::{compare_models, summarize, DashboardSummary, ModelComparison};
