use futures::future::{join_all, BoxFuture};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{Lead, Provider, ProviderId, ProviderUser, Zone};
use super::store::{LeadRepository, ProviderDirectory, StoreError};

/// Subject template key understood by the transactional mail boundary.
pub const NEW_LEAD_SUBJECT_KEY: &str = "newLead";

/// Delivery category a message is filed under at the mail provider. Lead
/// notifications are the only sends this crate produces, and they are all
/// marketing-category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailCategory {
    Marketing,
}

impl MailCategory {
    pub const fn label(self) -> &'static str {
        match self {
            MailCategory::Marketing => "marketing",
        }
    }
}

/// Rendered notification handed to the mail boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadNotification {
    pub subject_key: String,
    pub subject: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub html_body: String,
    pub category: MailCategory,
}

/// Outbound mail seam. Production adapters (transactional email providers)
/// live outside this crate; tests and the demo use recording doubles.
pub trait LeadMailer: Send + Sync {
    fn send(&self, message: LeadNotification) -> BoxFuture<'_, Result<(), MailError>>;
}

/// Mail dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("recipient rejected: {0}")]
    Rejected(String),
}

/// One failed send, retained for logs and diagnostics only. Failed sends do
/// not reduce `providers_notified`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSend {
    pub provider_id: ProviderId,
    pub recipient_email: String,
    pub reason: String,
}

/// Result of one fan-out run. `providers_notified` counts matched providers,
/// not confirmed deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOutcome {
    pub providers_notified: usize,
    pub emails_attempted: usize,
    pub failed_sends: Vec<FailedSend>,
}

/// Render the `newLead` notification for one provider user.
pub fn render_new_lead_email(lead: &Lead, zone: &Zone, recipient: &ProviderUser) -> LeadNotification {
    LeadNotification {
        subject_key: NEW_LEAD_SUBJECT_KEY.to_string(),
        subject: format!("New lead in {}", zone.name),
        recipient_name: recipient.name.clone(),
        recipient_email: recipient.email.clone(),
        html_body: render_new_lead_html(lead, zone, recipient),
        category: MailCategory::Marketing,
    }
}

/// Notify every user of every active provider serving the lead's zone, then
/// record one dispatch row per matched provider.
///
/// All email sends are issued as one concurrent batch; dispatch rows are
/// written as a separate batch once the sends have settled. Individual send
/// failures are logged and collected but never abort the fan-out. Only a
/// failure of the provider query itself is an error.
pub async fn notify_providers<S, M>(
    store: &S,
    mailer: &M,
    lead: &Lead,
    zone: &Zone,
) -> Result<NotificationOutcome, StoreError>
where
    S: LeadRepository + ProviderDirectory,
    M: LeadMailer,
{
    let providers = store.active_providers_in_zone(&zone.id)?;

    let mut recipients: Vec<(ProviderId, String)> = Vec::new();
    let mut sends = Vec::new();
    for provider in &providers {
        for user in &provider.users {
            let message = render_new_lead_email(lead, zone, user);
            recipients.push((provider.id.clone(), user.email.clone()));
            sends.push(mailer.send(message));
        }
    }

    let emails_attempted = sends.len();
    let results = join_all(sends).await;

    let mut failed_sends = Vec::new();
    for ((provider_id, recipient_email), result) in recipients.into_iter().zip(results) {
        if let Err(err) = result {
            warn!(
                lead = %lead.id.0,
                provider = %provider_id.0,
                recipient = %recipient_email,
                error = %err,
                "lead notification send failed"
            );
            failed_sends.push(FailedSend {
                provider_id,
                recipient_email,
                reason: err.to_string(),
            });
        }
    }

    record_dispatch_batch(store, lead, &providers);

    Ok(NotificationOutcome {
        providers_notified: providers.len(),
        emails_attempted,
        failed_sends,
    })
}

/// One dispatch row per matched provider, regardless of how its emails
/// fared. Duplicate (lead, provider) pairs are no-ops; row-level store
/// errors are logged and tolerated, matching the send policy.
fn record_dispatch_batch<S: LeadRepository>(store: &S, lead: &Lead, providers: &[Provider]) {
    for provider in providers {
        if let Err(err) = store.record_dispatch(&lead.id, &provider.id) {
            warn!(
                lead = %lead.id.0,
                provider = %provider.id.0,
                error = %err,
                "failed to record lead dispatch"
            );
        }
    }
}

fn render_new_lead_html(lead: &Lead, zone: &Zone, recipient: &ProviderUser) -> String {
    use std::fmt::Write as _;

    let mut html = String::new();
    let _ = writeln!(html, "<h1>New lead in {}</h1>", escape_html(&zone.name));
    let _ = writeln!(
        html,
        "<p>Hi {}, a customer in your service area just requested an offer.</p>",
        escape_html(&recipient.name)
    );
    let _ = writeln!(
        html,
        "<p><strong>Customer:</strong> {}</p>",
        escape_html(&lead.customer_name)
    );
    let _ = writeln!(
        html,
        "<p><strong>Contact:</strong> {} / {}</p>",
        escape_html(&lead.email),
        escape_html(&lead.phone)
    );
    let _ = writeln!(
        html,
        "<p><strong>Area:</strong> {} ({}), postal code {}</p>",
        escape_html(&zone.name),
        escape_html(&zone.country_name),
        escape_html(&lead.postal_code)
    );
    if !lead.categories.is_empty() {
        let names: Vec<&str> = lead
            .categories
            .iter()
            .map(|category| category.name.as_str())
            .collect();
        let _ = writeln!(
            html,
            "<p><strong>Services:</strong> {}</p>",
            escape_html(&names.join(", "))
        );
    }
    let _ = writeln!(
        html,
        "<p><strong>Request:</strong> {}</p>",
        escape_html(&lead.service_details)
    );
    let _ = writeln!(
        html,
        "<p>Log in to your dashboard to accept or decline this lead.</p>"
    );
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
