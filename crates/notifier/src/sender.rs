use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

use crate::error::NotifyError;
use crate::labels::Labels;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// `週間コミットレポート (2026/02/14)`; test sends get a prefix.
pub fn report_subject(labels: &Labels, sent_on: NaiveDate, test: bool) -> String {
    let prefix = if test { labels.test_prefix } else { "" };
    format!(
        "{prefix}{} ({})",
        labels.title,
        sent_on.format("%Y/%m/%d")
    )
}

/// `Display Name <address>`
pub fn from_header(sender_name: &str, address: &str) -> String {
    format!("{} <{}>", sender_name.trim(), address.trim())
}

#[async_trait]
pub trait ReportSender: Send + Sync {
    /// Delivers one message and returns the provider's message id.
    async fn send(&self, message: &EmailMessage) -> Result<String, NotifyError>;
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

pub struct ResendSender {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl ResendSender {
    pub fn new(api_key: impl Into<String>, api_base: &str) -> Result<Self, NotifyError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(NotifyError::Invalid("missing Resend api key".into()));
        }
        let endpoint = Url::parse(api_base)
            .and_then(|base| base.join("emails"))
            .map_err(|err| NotifyError::Invalid(format!("invalid api base '{api_base}': {err}")))?;
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ReportSender for ResendSender {
    #[instrument(skip(self, message), fields(subject = %message.subject, recipients = message.to.len()))]
    async fn send(&self, message: &EmailMessage) -> Result<String, NotifyError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let sent: SendResponse = resp.json().await?;
        info!(message_id = %sent.id, "report e-mail accepted");
        Ok(sent.id)
    }
}
