//! Tracing subscriber and alerting setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::observability::{AlertConfig, AlertLayer};

const DEFAULT_FILTER: &str = "info,quill_server=debug,quill_infra=debug,quill_core=debug";

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// JSON lines instead of pretty output.
    pub json_logs: bool,
    pub service_name: String,
    pub alerts_enabled: bool,
    /// Webhook receiving ERROR events (Slack, Discord, ...). Console when unset.
    pub alert_webhook_url: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            service_name: "quill".to_string(),
            alerts_enabled: true,
            alert_webhook_url: None,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json_logs),
            service_name: std::env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            alerts_enabled: std::env::var("ALERTS_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.alerts_enabled),
            alert_webhook_url: std::env::var("ALERT_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.is_empty()),
        }
    }
}

/// Install the global subscriber. Must run inside the tokio runtime, the
/// alert layer spawns its delivery task there.
pub fn init_telemetry(config: &TelemetryConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let alert_layer = config.alerts_enabled.then(|| {
        let alert_config = AlertConfig {
            service: config.service_name.clone(),
            ..AlertConfig::default()
        };
        match &config.alert_webhook_url {
            Some(url) => AlertLayer::webhook(alert_config, url.clone()),
            None => AlertLayer::console(alert_config),
        }
    });

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(alert_layer);

    if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        alerts_enabled = config.alerts_enabled,
        webhook = config.alert_webhook_url.is_some(),
        "Telemetry initialized"
    );
}
