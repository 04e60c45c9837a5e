//! Alerting layer: forwards high-severity events to an out-of-band channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

/// An event worth waking someone up for.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub service: String,
    pub level: Level,
    pub message: String,
    pub target: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fields: Vec<(String, String)>,
}

impl AlertMessage {
    fn summary(&self) -> String {
        let mut text = format!(
            "[{}] {} {}: {}",
            self.service, self.level, self.target, self.message
        );
        for (name, value) in &self.fields {
            text.push_str(&format!("\n  {name} = {value}"));
        }
        text
    }
}

#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub service: String,
    /// Least severe level that raises an alert.
    pub min_level: Level,
    /// Alerts queued beyond this are dropped.
    pub buffer_size: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            service: "quill".to_string(),
            min_level: Level::ERROR,
            buffer_size: 100,
        }
    }
}

/// Delivery backend for alerts.
#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Failed to send alert: {0}")]
    SendError(String),
}

/// Writes alerts to stderr. Used in development.
pub struct ConsoleAlertSender;

#[async_trait::async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!("\nALERT {}\n{}\n", alert.timestamp, alert.summary());
        Ok(())
    }
}

/// Posts alerts as `{"text": ...}` to a chat webhook.
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        let payload = serde_json::json!({
            "text": alert.summary(),
            "service": alert.service,
            "target": alert.target,
            "timestamp": alert.timestamp.to_rfc3339(),
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| AlertError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Tracing layer queueing alerts for a background delivery task.
///
/// Never blocks the logging call site: when the queue is full the alert
/// is dropped.
pub struct AlertLayer {
    config: AlertConfig,
    queue: mpsc::Sender<AlertMessage>,
}

impl AlertLayer {
    /// Spawns the delivery task on the current tokio runtime.
    pub fn new(config: AlertConfig, sender: Arc<dyn AlertSender>) -> Self {
        let (queue, mut rx) = mpsc::channel::<AlertMessage>(config.buffer_size.max(1));

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if let Err(e) = sender.send(alert).await {
                    // Logging here would re-enter this layer.
                    eprintln!("{e}");
                }
            }
        });

        Self { config, queue }
    }

    pub fn console(config: AlertConfig) -> Self {
        Self::new(config, Arc::new(ConsoleAlertSender))
    }

    pub fn webhook(config: AlertConfig, url: String) -> Self {
        Self::new(config, Arc::new(WebhookAlertSender::new(url)))
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn record(&mut self, field: &tracing::field::Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.record(field, value.to_string());
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Level ordering: ERROR < WARN < ... so "at least as severe" is <=.
        if *metadata.level() > self.config.min_level {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let alert = AlertMessage {
            service: self.config.service.clone(),
            level: *metadata.level(),
            message: visitor.message,
            target: metadata.target().to_string(),
            timestamp: chrono::Utc::now(),
            fields: visitor.fields,
        };

        let _ = self.queue.try_send(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracing_subscriber::layer::SubscriberExt;

    struct ChannelSender(mpsc::UnboundedSender<AlertMessage>);

    #[async_trait::async_trait]
    impl AlertSender for ChannelSender {
        async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
            self.0
                .send(alert)
                .map_err(|e| AlertError::SendError(e.to_string()))
        }
    }

    #[tokio::test]
    async fn forwards_errors_and_skips_warnings() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let layer = AlertLayer::new(AlertConfig::default(), Arc::new(ChannelSender(tx)));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("only a warning");
            tracing::error!(operation = "save post", "Request failed");
        });

        let alert = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alert.level, Level::ERROR);
        assert_eq!(alert.message, "Request failed");
        assert_eq!(
            alert.fields,
            vec![("operation".to_string(), "save post".to_string())]
        );
        assert!(rx.try_recv().is_err());
    }
}
