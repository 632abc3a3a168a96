//! Configuration for the coordinators and the popup session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the popup obtains a summary when the cache has nothing fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupMode {
    /// Poll the cache for a background prefetch to land.
    #[default]
    AwaitPrefetch,

    /// Call the summarization service directly.
    OnDemand,
}

/// Timing and policy knobs shared by the background and popup halves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingConfig {
    /// Maximum age at which a cached bundle is usable.
    ///
    /// Default: 30 minutes.
    pub freshness_window: Duration,

    /// Period between cache reads while the popup waits for a prefetch.
    ///
    /// Default: 2 seconds.
    pub poll_interval: Duration,

    /// Total time the popup waits before giving up.
    ///
    /// Default: 30 seconds.
    pub poll_timeout: Duration,

    /// How long the completion indicator stays up.
    ///
    /// Default: 4 seconds.
    pub badge_duration: Duration,

    /// Delay between the page-ready signal and the first scrape.
    ///
    /// Default: 1 second.
    pub page_settle_delay: Duration,

    /// How long the scraper keeps looking for a profile name.
    ///
    /// Default: 2 seconds.
    pub scrape_max_wait: Duration,

    /// Pause between scrape attempts.
    ///
    /// Default: 100 milliseconds.
    pub scrape_retry_interval: Duration,

    /// Drop the cached bundle on every page load so it is always rebuilt.
    ///
    /// Default: false.
    pub refresh_on_page_load: bool,

    /// Popup behaviour on a cache miss.
    #[serde(default)]
    pub popup_mode: PopupMode,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(30 * 60),
            poll_interval: Duration::from_secs(2),
            poll_timeout: Duration::from_secs(30),
            badge_duration: Duration::from_secs(4),
            page_settle_delay: Duration::from_secs(1),
            scrape_max_wait: Duration::from_millis(2000),
            scrape_retry_interval: Duration::from_millis(100),
            refresh_on_page_load: false,
            popup_mode: PopupMode::AwaitPrefetch,
        }
    }
}

impl BriefingConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the freshness window.
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Set the poll period and total wait.
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    /// Set how long the completion indicator stays visible.
    pub fn with_badge_duration(mut self, duration: Duration) -> Self {
        self.badge_duration = duration;
        self
    }

    /// Set the delay before the page-load scrape.
    pub fn with_page_settle_delay(mut self, delay: Duration) -> Self {
        self.page_settle_delay = delay;
        self
    }

    /// Set the scraper's retry budget.
    pub fn with_scrape_wait(mut self, max_wait: Duration, retry_interval: Duration) -> Self {
        self.scrape_max_wait = max_wait;
        self.scrape_retry_interval = retry_interval;
        self
    }

    /// Rebuild the bundle on every page load.
    pub fn with_refresh_on_page_load(mut self, refresh: bool) -> Self {
        self.refresh_on_page_load = refresh;
        self
    }

    /// Set the popup's cache-miss behaviour.
    pub fn with_popup_mode(mut self, mode: PopupMode) -> Self {
        self.popup_mode = mode;
        self
    }
}
