use crate::adapters::template::MessageTemplate;
use crate::domain::model::Participant;
use crate::domain::ports::Notifier;
use crate::utils::error::{ExchangeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound on a single webhook call; a hung request fails and is retried.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    content_type: &'a str,
}

/// Delivers each match as a JSON POST to an HTTP endpoint.
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    from: String,
    template: MessageTemplate,
    headers: HashMap<String, String>,
    timeout: Duration,
    dry_run: bool,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>, from: impl Into<String>, template: MessageTemplate) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            from: from.into(),
            template,
            headers: HashMap::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            dry_run: false,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 乾跑模式：所有訊息都寄回寄件者本人
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn recipient<'a>(&'a self, source: &'a Participant) -> &'a str {
        if self.dry_run {
            &self.from
        } else {
            &source.contact
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, source: &Participant, destination: &Participant) -> Result<()> {
        let message = self.template.render(source, destination);
        let to = self.recipient(source);
        let payload = WebhookPayload {
            from: &self.from,
            to,
            subject: &message.subject,
            body: &message.body,
            content_type: "text/html",
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&payload);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        tracing::debug!("POST {} for {}", self.endpoint, source);
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(ExchangeError::DeliveryError {
                recipient: to.to_string(),
                message: format!("endpoint returned {}", response.status()),
            });
        }
        Ok(())
    }
}

/// Renders messages into the log instead of sending them.
pub struct LogNotifier {
    template: MessageTemplate,
}

impl LogNotifier {
    pub fn new(template: MessageTemplate) -> Self {
        Self { template }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, source: &Participant, destination: &Participant) -> Result<()> {
        let message = self.template.render(source, destination);
        tracing::info!(
            "[dry-run] to {} <{}>: {} | {}",
            source,
            source.contact,
            message.subject,
            message.body
        );
        Ok(())
    }
}
