//! Environment probes — where the scorer's signals come from.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Which baseline browser APIs the client has.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowserCapabilities {
    pub local_storage: Option<bool>,
    pub session_storage: Option<bool>,
    pub fetch: Option<bool>,
    pub promise: Option<bool>,
    pub cookies: Option<bool>,
}

/// Client-reported signals for one session. `None` means the client could
/// not read the signal; checks depending on it do not fire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportedEnvironment {
    /// `navigator.webdriver`.
    pub webdriver: Option<bool>,
    /// Names of non-standard globals found on the window object.
    pub globals: Option<Vec<String>>,
    pub user_agent: Option<String>,
    /// `navigator.platform`.
    pub platform: Option<String>,
    pub languages: Option<Vec<String>>,
    pub plugin_count: Option<u32>,
    pub gpu_renderer: Option<String>,
    /// Whether `window.chrome.runtime`-style objects exist.
    pub chrome_runtime: Option<bool>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    /// IANA zone name.
    pub timezone: Option<String>,
    /// Empty string when the visit had no referrer.
    pub referrer: Option<String>,
    pub page_url: Option<String>,
    pub cookies_enabled: Option<bool>,
    pub capabilities: Option<BrowserCapabilities>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    PointerMove,
    TouchMove,
    Scroll,
    Click,
    KeyDown,
}

impl InteractionKind {
    /// Pointer movement, touch movement and scrolling. Clicks and key events
    /// do not count.
    pub fn is_human_signal(&self) -> bool {
        matches!(self, Self::PointerMove | Self::TouchMove | Self::Scroll)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    pub at: DateTime<Utc>,
}

/// Source of ambient client signals for the scorer.
#[async_trait]
pub trait EnvironmentProbe: Send + Sync {
    fn environment(&self) -> ReportedEnvironment;

    /// Resolve `true` as soon as a human interaction is seen, `false` once
    /// `window` has elapsed without one. Must always resolve.
    async fn observe_interaction(&self, window: Duration) -> bool;
}

/// Probe over the signals a client reported for its session, with a live
/// feed of interaction events.
pub struct SessionProbe {
    environment: ReportedEnvironment,
    interactions: broadcast::Sender<InteractionEvent>,
}

impl SessionProbe {
    pub fn new(environment: ReportedEnvironment) -> Self {
        let (interactions, _) = broadcast::channel(64);
        Self {
            environment,
            interactions,
        }
    }

    /// Feed an interaction. Returns how many observers received it; events
    /// arriving while nobody is observing are dropped.
    pub fn record_interaction(&self, kind: InteractionKind) -> usize {
        self.interactions
            .send(InteractionEvent { kind, at: Utc::now() })
            .unwrap_or(0)
    }

    /// Observers currently attached.
    pub fn listener_count(&self) -> usize {
        self.interactions.receiver_count()
    }
}

#[async_trait]
impl EnvironmentProbe for SessionProbe {
    fn environment(&self) -> ReportedEnvironment {
        self.environment.clone()
    }

    async fn observe_interaction(&self, window: Duration) -> bool {
        let mut listener = self.interactions.subscribe();

        let wait_for_human = async {
            loop {
                match listener.recv().await {
                    Ok(event) if event.kind.is_human_signal() => return true,
                    Ok(_) => continue,
                    // Missed events were still interactions.
                    Err(broadcast::error::RecvError::Lagged(_)) => return true,
                    Err(broadcast::error::RecvError::Closed) => return false,
                }
            }
        };

        let seen = tokio::time::timeout(window, wait_for_human)
            .await
            .unwrap_or(false);
        drop(listener);

        debug!(seen, window_ms = window.as_millis() as u64, "Interaction window closed");
        seen
    }
}
