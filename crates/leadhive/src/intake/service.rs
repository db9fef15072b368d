use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::IntakeConfig;

use super::domain::{
    AuditAction, AuditDraft, AuditEntityKind, Lead, LeadDraft, LeadId, LeadStatus,
    LeadSubmission, SubmissionError,
};
use super::notify::{notify_providers, LeadMailer, NotificationOutcome};
use super::store::{LeadRepository, ProviderDirectory, StoreError, ZoneDirectory};

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lead_id() -> LeadId {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeadId(format!("lead-{id:06}"))
}

/// Orchestrates the intake flow: zone resolution, the lead-creation
/// transaction, and the provider notification fan-out.
pub struct LeadIntakeService<S, M> {
    store: Arc<S>,
    mailer: Arc<M>,
    country: IntakeConfig,
}

impl<S, M> LeadIntakeService<S, M>
where
    S: ZoneDirectory + LeadRepository + ProviderDirectory + 'static,
    M: LeadMailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, country: IntakeConfig) -> Self {
        Self {
            store,
            mailer,
            country,
        }
    }

    /// Run the full intake flow for one submission.
    ///
    /// Zone resolution and the creation transaction are all-or-nothing: a
    /// missing zone or a failed transaction leaves no state behind. The
    /// notification fan-out runs after the lead has committed and its
    /// failure never rolls the lead back.
    pub async fn submit(&self, submission: LeadSubmission) -> Result<IntakeReceipt, IntakeError> {
        submission.validate()?;

        let postal_code = submission.postal_code.trim().to_string();
        let zone = self
            .store
            .zone_for_postal_code(&self.country.country_code, &postal_code)
            .map_err(IntakeError::Storage)?
            .ok_or_else(|| IntakeError::ZoneNotFound {
                postal_code: postal_code.clone(),
            })?;

        let draft = LeadDraft {
            id: next_lead_id(),
            customer_name: submission.name.trim().to_string(),
            email: submission.email.trim().to_string(),
            phone: submission.phone.trim().to_string(),
            service_details: submission.service_details.trim().to_string(),
            postal_code: postal_code.clone(),
            zone_id: zone.id.clone(),
            categories: submission.categories,
        };
        let mut metadata = BTreeMap::new();
        metadata.insert("postal_code".to_string(), postal_code.clone());
        metadata.insert("zone_id".to_string(), zone.id.0.clone());
        metadata.insert("zone_name".to_string(), zone.name.clone());
        metadata.insert("country_code".to_string(), zone.country_code.clone());
        let audit = AuditDraft {
            action: AuditAction::CreateLead,
            entity_kind: AuditEntityKind::Lead,
            metadata,
        };

        let mut lead = self
            .store
            .create_lead(draft, audit)
            .map_err(IntakeError::Creation)?;
        info!(lead = %lead.id.0, zone = %zone.id.0, "lead recorded");

        let receipt = match notify_providers(
            self.store.as_ref(),
            self.mailer.as_ref(),
            &lead,
            &zone,
        )
        .await
        {
            Ok(outcome) => {
                if outcome.providers_notified > 0 {
                    match self.store.mark_lead_sent(&lead.id) {
                        Ok(()) => lead.status = LeadStatus::Sent,
                        Err(err) => {
                            warn!(lead = %lead.id.0, error = %err, "failed to mark lead as sent");
                        }
                    }
                }
                self.receipt_for(lead, &outcome)
            }
            Err(err) => {
                // Deliberate inconsistency: the committed lead stays even
                // when the provider query fails.
                warn!(lead = %lead.id.0, error = %err, "provider notification failed");
                IntakeReceipt {
                    postal_code: lead.postal_code.clone(),
                    zone_name: lead.zone.name.clone(),
                    country_name: lead.zone.country_name.clone(),
                    providers_notified: 0,
                    message: "Lead created, but provider notification failed.".to_string(),
                    lead,
                }
            }
        };

        Ok(receipt)
    }

    /// Current status snapshot for one lead, for API reads.
    pub fn lead_view(&self, id: &LeadId) -> Result<LeadStatusView, IntakeError> {
        let lead = self
            .store
            .fetch_lead(id)
            .map_err(IntakeError::Storage)?
            .ok_or_else(|| IntakeError::LeadNotFound(id.0.clone()))?;
        let dispatches = self
            .store
            .dispatches_for_lead(id)
            .map_err(IntakeError::Storage)?;

        Ok(LeadStatusView {
            lead_id: lead.id.clone(),
            status: lead.status.label(),
            zone_name: lead.zone.name.clone(),
            postal_code: lead.postal_code.clone(),
            providers_notified: dispatches.len(),
            created_at: lead.created_at,
        })
    }

    fn receipt_for(&self, lead: Lead, outcome: &NotificationOutcome) -> IntakeReceipt {
        let message = match outcome.providers_notified {
            0 => format!(
                "Lead created; no providers are currently available in {}.",
                lead.zone.name
            ),
            1 => "Lead created and 1 provider notified.".to_string(),
            n => format!("Lead created and {n} providers notified."),
        };
        IntakeReceipt {
            postal_code: lead.postal_code.clone(),
            zone_name: lead.zone.name.clone(),
            country_name: lead.zone.country_name.clone(),
            providers_notified: outcome.providers_notified,
            message,
            lead,
        }
    }
}

/// Composite result returned to the form boundary: the created lead enriched
/// with display names, plus the notification summary.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeReceipt {
    pub lead: Lead,
    pub postal_code: String,
    pub zone_name: String,
    pub country_name: String,
    pub providers_notified: usize,
    pub message: String,
}

/// Sanitized status view exposed for lead reads.
#[derive(Debug, Clone, Serialize)]
pub struct LeadStatusView {
    pub lead_id: LeadId,
    pub status: &'static str,
    pub zone_name: String,
    pub postal_code: String,
    pub providers_notified: usize,
    pub created_at: DateTime<Utc>,
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("no service zone covers postal code '{postal_code}'")]
    ZoneNotFound { postal_code: String },
    #[error(transparent)]
    Validation(#[from] SubmissionError),
    #[error("failed to create lead: {0}")]
    Creation(StoreError),
    #[error("lead '{0}' not found")]
    LeadNotFound(String),
    #[error("storage failure: {0}")]
    Storage(StoreError),
}
