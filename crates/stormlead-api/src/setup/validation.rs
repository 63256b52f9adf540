//! Configuration validation
//!
//! Runs the config's own checks and warns about settings that are accepted but
//! have no effect yet.

use anyhow::Result;
use stormlead_core::Config;

/// Validate configuration before any file is touched
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && !config.security.cors_enabled {
        tracing::warn!("CORS disabled in production - browsers on other origins cannot submit leads");
    }

    if config.email.enabled {
        tracing::warn!("EMAIL_ENABLED is set but lead notification emails are not sent by this server");
    }

    if config.notifications.slack_webhook.is_some() {
        tracing::warn!("SLACK_WEBHOOK is set but Slack notifications are not sent by this server");
    }

    Ok(())
}
