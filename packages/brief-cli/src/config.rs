use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use profile_brief::BriefingConfig;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Settings {
    pub relay_url: String,
    pub database_url: String,
    pub freshness_window: Duration,
    pub poll_timeout: Duration,
}

impl Settings {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let freshness_minutes: u64 = env::var("BRIEF_FRESHNESS_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("BRIEF_FRESHNESS_MINUTES must be a valid number")?;

        Ok(Self {
            relay_url: env::var("BRIEF_RELAY_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            database_url: env::var("BRIEF_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://brief.db?mode=rwc".to_string()),
            freshness_window: minutes(freshness_minutes)
                .context("BRIEF_FRESHNESS_MINUTES is too large")?,
            poll_timeout: Duration::from_secs(
                env::var("BRIEF_POLL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("BRIEF_POLL_TIMEOUT_SECS must be a valid number")?,
            ),
        })
    }

    /// Coordinator and popup timings for these settings.
    pub fn briefing_config(&self) -> BriefingConfig {
        let config = BriefingConfig::default();
        let interval = config.poll_interval;

        config
            .with_freshness_window(self.freshness_window)
            .with_polling(interval, self.poll_timeout)
    }
}

/// A whole number of minutes, or `None` if the seconds overflow.
fn minutes(count: u64) -> Option<Duration> {
    count.checked_mul(60).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_briefing_config_uses_settings() {
        let settings = Settings {
            relay_url: "http://localhost:3001".into(),
            database_url: "sqlite::memory:".into(),
            freshness_window: minutes(5).unwrap(),
            poll_timeout: Duration::from_secs(10),
        };

        let config = settings.briefing_config();
        assert_eq!(config.freshness_window, Duration::from_secs(300));
        assert_eq!(config.poll_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, BriefingConfig::default().poll_interval);
    }

    #[test]
    fn test_oversized_minutes_are_rejected() {
        assert_eq!(minutes(u64::MAX), None);
        assert_eq!(minutes(u64::MAX / 60), Some(Duration::from_secs(u64::MAX / 60 * 60)));
    }
}
