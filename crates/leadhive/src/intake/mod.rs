//! Lead intake and distribution workflow.
//!
//! Three collaborators behind trait seams: a zone directory resolving postal
//! codes, a transactional lead repository writing the lead and its audit-log
//! entry together, and a provider notifier fanning emails out to every
//! matched provider user while tolerating individual send failures.

pub mod domain;
pub mod notify;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    AuditAction, AuditEntityKind, AuditLogEntry, Category, CategoryId, DispatchStatus, Lead,
    LeadDispatch, LeadId, LeadStatus, LeadSubmission, Provider, ProviderId, ProviderStatus,
    ProviderUser, SubmissionError, Zone, ZoneId,
};
pub use notify::{
    render_new_lead_email, FailedSend, LeadMailer, LeadNotification, MailCategory, MailError,
    NotificationOutcome, NEW_LEAD_SUBJECT_KEY,
};
pub use router::intake_router;
pub use service::{IntakeError, IntakeReceipt, LeadIntakeService, LeadStatusView};
pub use store::{
    InMemoryLeadStore, LeadRepository, ProviderDirectory, StoreError, ZoneDirectory,
};
