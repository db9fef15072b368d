use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for geographic service zones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub String);

/// Identifier wrapper for customer leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

/// Identifier wrapper for registered provider businesses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(pub String);

/// Identifier wrapper for service categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

/// A geographic service area defined by the postal codes it covers,
/// scoped to one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub country_code: String,
    pub country_name: String,
    pub postal_codes: Vec<String>,
    /// Regional sub-labels (state/region names) used for display only.
    pub region_labels: Vec<String>,
}

impl Zone {
    pub fn covers(&self, postal_code: &str) -> bool {
        self.postal_codes.iter().any(|code| code == postal_code)
    }
}

/// A service category a lead can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Overall disposition of a lead, distinct from per-provider dispatch status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    Pending,
    Sent,
    Accepted,
    Declined,
}

impl LeadStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Sent => "sent",
            LeadStatus::Accepted => "accepted",
            LeadStatus::Declined => "declined",
        }
    }
}

/// Operating status of a provider. Only active providers receive leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderStatus {
    Active,
    Paused,
    Disabled,
}

impl ProviderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProviderStatus::Active => "active",
            ProviderStatus::Paused => "paused",
            ProviderStatus::Disabled => "disabled",
        }
    }
}

/// Per-provider exposure status for a dispatched lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStatus {
    Sent,
    Accepted,
    Declined,
}

impl DispatchStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DispatchStatus::Sent => "sent",
            DispatchStatus::Accepted => "accepted",
            DispatchStatus::Declined => "declined",
        }
    }
}

/// Notification recipient attached to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub name: String,
    pub email: String,
}

/// A business registered to receive leads within its associated zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub status: ProviderStatus,
    pub zones: Vec<ZoneId>,
    pub users: Vec<ProviderUser>,
}

/// A customer's service request. The zone reference is set at creation and
/// immutable afterwards; leads are never hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub service_details: String,
    pub postal_code: String,
    pub zone: Zone,
    pub categories: Vec<Category>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Association recording that one provider was notified about one lead.
/// Unique per (lead, provider) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDispatch {
    pub lead_id: LeadId,
    pub provider_id: ProviderId,
    pub status: DispatchStatus,
    pub created_at: DateTime<Utc>,
}

/// Action kinds recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    CreateLead,
}

impl AuditAction {
    pub const fn label(self) -> &'static str {
        match self {
            AuditAction::CreateLead => "CREATE_LEAD",
        }
    }
}

/// Entity kinds an audit entry can document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEntityKind {
    Lead,
}

impl AuditEntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            AuditEntityKind::Lead => "LEAD",
        }
    }
}

/// Append-only record of a significant state-changing action, written in the
/// same transaction as the change it documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub action: AuditAction,
    pub entity_kind: AuditEntityKind,
    pub entity_id: String,
    pub metadata: BTreeMap<String, String>,
    pub recorded_at: DateTime<Utc>,
}

/// Validated lead fields plus the resolved zone, ready for the storage
/// transaction.
#[derive(Debug, Clone)]
pub struct LeadDraft {
    pub id: LeadId,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub service_details: String,
    pub postal_code: String,
    pub zone_id: ZoneId,
    pub categories: Vec<CategoryId>,
}

/// Audit metadata accompanying a lead-creation transaction. The entity id is
/// taken from the lead the transaction creates.
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub action: AuditAction,
    pub entity_kind: AuditEntityKind,
    pub metadata: BTreeMap<String, String>,
}

/// Fields accepted at the intake form boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_details: String,
    pub postal_code: String,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

impl LeadSubmission {
    /// Boundary validation: every text field must be non-empty once trimmed,
    /// and the email must at least look like an address.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        let required: [(&'static str, &str); 5] = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("service_details", &self.service_details),
            ("postal_code", &self.postal_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(SubmissionError::MissingField { field });
            }
        }
        if !self.email.contains('@') {
            return Err(SubmissionError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// Rejection raised by boundary validation of a submission.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}
