use futures::future::BoxFuture;
use leadhive::config::IntakeConfig;
use leadhive::error::AppError;
use leadhive::intake::{
    Category, CategoryId, InMemoryLeadStore, LeadMailer, LeadNotification, MailError, Provider,
    ProviderId, ProviderStatus, ProviderUser, Zone, ZoneId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the transactional email provider: logs every send and always
/// succeeds. Real delivery lives outside this service.
#[derive(Default, Clone)]
pub(crate) struct LoggingMailer;

impl LeadMailer for LoggingMailer {
    fn send(&self, message: LeadNotification) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async move {
            info!(
                recipient = %message.recipient_email,
                subject = %message.subject,
                category = message.category.label(),
                "lead notification dispatched"
            );
            Ok(())
        })
    }
}

/// Seed the in-memory store with sample zones, categories, and providers for
/// the configured country. Production deployments replace this with an
/// administrative seeding pipeline.
pub(crate) fn seeded_store(intake: &IntakeConfig) -> Result<Arc<InMemoryLeadStore>, AppError> {
    let store = InMemoryLeadStore::default();

    let zones = [
        (
            "zone-oslo",
            "Oslo",
            vec!["0150", "0151", "0152", "0160", "0161"],
            vec!["Oslo"],
        ),
        (
            "zone-bergen",
            "Bergen",
            vec!["5003", "5004", "5006"],
            vec!["Vestland"],
        ),
        (
            "zone-trondheim",
            "Trondheim",
            vec!["7010", "7011", "7012"],
            vec!["Trøndelag"],
        ),
    ];
    for (id, name, postal_codes, regions) in zones {
        store.add_zone(Zone {
            id: ZoneId(id.to_string()),
            name: name.to_string(),
            country_code: intake.country_code.clone(),
            country_name: intake.country_name.clone(),
            postal_codes: postal_codes.into_iter().map(str::to_string).collect(),
            region_labels: regions.into_iter().map(str::to_string).collect(),
        })?;
    }

    let categories = [
        ("cat-photo", "Photography"),
        ("cat-drone", "Drone footage"),
        ("cat-staging", "Virtual staging"),
    ];
    for (id, name) in categories {
        store.add_category(Category {
            id: CategoryId(id.to_string()),
            name: name.to_string(),
        })?;
    }

    store.add_provider(Provider {
        id: ProviderId("prov-nordlys".to_string()),
        name: "Nordlys Foto AS".to_string(),
        status: ProviderStatus::Active,
        zones: vec![ZoneId("zone-oslo".to_string())],
        users: vec![
            ProviderUser {
                name: "Anna Berg".to_string(),
                email: "anna@nordlysfoto.no".to_string(),
            },
            ProviderUser {
                name: "Bjorn Dahl".to_string(),
                email: "bjorn@nordlysfoto.no".to_string(),
            },
        ],
    })?;
    store.add_provider(Provider {
        id: ProviderId("prov-vista".to_string()),
        name: "Vista Eiendomsfoto".to_string(),
        status: ProviderStatus::Active,
        zones: vec![
            ZoneId("zone-oslo".to_string()),
            ZoneId("zone-bergen".to_string()),
        ],
        users: vec![ProviderUser {
            name: "Kari Holm".to_string(),
            email: "kari@vistafoto.no".to_string(),
        }],
    })?;
    store.add_provider(Provider {
        id: ProviderId("prov-fjell".to_string()),
        name: "Fjellfoto Trøndelag".to_string(),
        status: ProviderStatus::Paused,
        zones: vec![ZoneId("zone-trondheim".to_string())],
        users: vec![ProviderUser {
            name: "Ola Strand".to_string(),
            email: "ola@fjellfoto.no".to_string(),
        }],
    })?;

    Ok(Arc::new(store))
}
