use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    AuditDraft, AuditLogEntry, Category, CategoryId, DispatchStatus, Lead, LeadDispatch,
    LeadDraft, LeadId, LeadStatus, Provider, ProviderId, ProviderStatus, Zone, ZoneId,
};

/// Zone lookup seam. Read-only from the intake flow; zones are managed by
/// administrative seeding.
pub trait ZoneDirectory: Send + Sync {
    /// Find the zone covering `postal_code` within `country_code`. The store
    /// enforces that at most one zone covers a postal code per country.
    fn zone_for_postal_code(
        &self,
        country_code: &str,
        postal_code: &str,
    ) -> Result<Option<Zone>, StoreError>;
}

/// Transactional lead/audit/dispatch storage seam.
pub trait LeadRepository: Send + Sync {
    /// Atomically insert the lead row and its audit-log entry. Either both
    /// commit or neither does; an unknown category id aborts the whole
    /// transaction with no partial state.
    fn create_lead(&self, draft: LeadDraft, audit: AuditDraft) -> Result<Lead, StoreError>;

    fn fetch_lead(&self, id: &LeadId) -> Result<Option<Lead>, StoreError>;

    /// Move a lead from `Pending` to `Sent` once at least one provider has
    /// been dispatched to.
    fn mark_lead_sent(&self, id: &LeadId) -> Result<(), StoreError>;

    /// Record that a provider was exposed to a lead. Unique per
    /// (lead, provider); returns `false` when the pair was already recorded,
    /// which is a no-op rather than an error.
    fn record_dispatch(
        &self,
        lead_id: &LeadId,
        provider_id: &ProviderId,
    ) -> Result<bool, StoreError>;

    fn dispatches_for_lead(&self, lead_id: &LeadId) -> Result<Vec<LeadDispatch>, StoreError>;
}

/// Provider matching seam. Read-only from the intake flow.
pub trait ProviderDirectory: Send + Sync {
    /// All providers whose status is active and whose zone set includes
    /// `zone`, users included.
    fn active_providers_in_zone(&self, zone: &ZoneId) -> Result<Vec<Provider>, StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown category id '{0}'")]
    UnknownCategory(String),
    #[error("unknown zone id '{0}'")]
    UnknownZone(String),
    #[error("unknown lead id '{0}'")]
    UnknownLead(String),
    #[error("postal code {postal_code} in {country_code} is already covered by zone '{zone}'")]
    PostalCodeConflict {
        postal_code: String,
        country_code: String,
        zone: String,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Default)]
struct StoreInner {
    zones: Vec<Zone>,
    categories: HashMap<CategoryId, Category>,
    providers: Vec<Provider>,
    leads: HashMap<LeadId, Lead>,
    dispatches: Vec<LeadDispatch>,
    audit_log: Vec<AuditLogEntry>,
}

/// In-memory store backing the intake workflow. One mutex guards all tables,
/// so `create_lead` observes and commits lead + audit rows atomically.
#[derive(Default, Clone)]
pub struct InMemoryLeadStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryLeadStore {
    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    /// Seed a zone, rejecting postal codes already covered by another zone
    /// in the same country.
    pub fn add_zone(&self, zone: Zone) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for existing in &inner.zones {
            if !existing.country_code.eq_ignore_ascii_case(&zone.country_code) {
                continue;
            }
            for code in &zone.postal_codes {
                if existing.covers(code) {
                    return Err(StoreError::PostalCodeConflict {
                        postal_code: code.clone(),
                        country_code: existing.country_code.clone(),
                        zone: existing.name.clone(),
                    });
                }
            }
        }
        inner.zones.push(zone);
        Ok(())
    }

    pub fn add_category(&self, category: Category) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.categories.insert(category.id.clone(), category);
        Ok(())
    }

    pub fn add_provider(&self, provider: Provider) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.providers.push(provider);
        Ok(())
    }

    pub fn lead_count(&self) -> usize {
        self.lock().map(|inner| inner.leads.len()).unwrap_or(0)
    }

    pub fn dispatch_count(&self) -> usize {
        self.lock().map(|inner| inner.dispatches.len()).unwrap_or(0)
    }

    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.lock()
            .map(|inner| inner.audit_log.clone())
            .unwrap_or_default()
    }
}

impl ZoneDirectory for InMemoryLeadStore {
    fn zone_for_postal_code(
        &self,
        country_code: &str,
        postal_code: &str,
    ) -> Result<Option<Zone>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .zones
            .iter()
            .find(|zone| {
                zone.country_code.eq_ignore_ascii_case(country_code) && zone.covers(postal_code)
            })
            .cloned())
    }
}

impl LeadRepository for InMemoryLeadStore {
    fn create_lead(&self, draft: LeadDraft, audit: AuditDraft) -> Result<Lead, StoreError> {
        let mut inner = self.lock()?;

        // Referential integrity first: nothing is written if any category
        // or the zone reference is dangling.
        let mut categories = Vec::with_capacity(draft.categories.len());
        for category_id in &draft.categories {
            let category = inner
                .categories
                .get(category_id)
                .ok_or_else(|| StoreError::UnknownCategory(category_id.0.clone()))?;
            categories.push(category.clone());
        }
        let zone = inner
            .zones
            .iter()
            .find(|zone| zone.id == draft.zone_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownZone(draft.zone_id.0.clone()))?;

        let now = Utc::now();
        let lead = Lead {
            id: draft.id,
            customer_name: draft.customer_name,
            email: draft.email,
            phone: draft.phone,
            service_details: draft.service_details,
            postal_code: draft.postal_code,
            zone,
            categories,
            status: LeadStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        inner.audit_log.push(AuditLogEntry {
            action: audit.action,
            entity_kind: audit.entity_kind,
            entity_id: lead.id.0.clone(),
            metadata: audit.metadata,
            recorded_at: now,
        });
        inner.leads.insert(lead.id.clone(), lead.clone());

        Ok(lead)
    }

    fn fetch_lead(&self, id: &LeadId) -> Result<Option<Lead>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.leads.get(id).cloned())
    }

    fn mark_lead_sent(&self, id: &LeadId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let lead = inner
            .leads
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownLead(id.0.clone()))?;
        if lead.status == LeadStatus::Pending {
            lead.status = LeadStatus::Sent;
            lead.updated_at = Utc::now();
        }
        Ok(())
    }

    fn record_dispatch(
        &self,
        lead_id: &LeadId,
        provider_id: &ProviderId,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        if !inner.leads.contains_key(lead_id) {
            return Err(StoreError::UnknownLead(lead_id.0.clone()));
        }
        let already = inner
            .dispatches
            .iter()
            .any(|dispatch| &dispatch.lead_id == lead_id && &dispatch.provider_id == provider_id);
        if already {
            return Ok(false);
        }
        inner.dispatches.push(LeadDispatch {
            lead_id: lead_id.clone(),
            provider_id: provider_id.clone(),
            status: DispatchStatus::Sent,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    fn dispatches_for_lead(&self, lead_id: &LeadId) -> Result<Vec<LeadDispatch>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .dispatches
            .iter()
            .filter(|dispatch| &dispatch.lead_id == lead_id)
            .cloned()
            .collect())
    }
}

impl ProviderDirectory for InMemoryLeadStore {
    fn active_providers_in_zone(&self, zone: &ZoneId) -> Result<Vec<Provider>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .providers
            .iter()
            .filter(|provider| {
                provider.status == ProviderStatus::Active && provider.zones.contains(zone)
            })
            .cloned()
            .collect())
    }
}
