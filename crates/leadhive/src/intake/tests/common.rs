use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::BoxFuture;

use crate::config::IntakeConfig;
use crate::intake::domain::{
    Category, CategoryId, Lead, LeadId, LeadStatus, LeadSubmission, Provider, ProviderId,
    ProviderStatus, ProviderUser, Zone, ZoneId,
};
use crate::intake::notify::{LeadMailer, LeadNotification, MailError};
use crate::intake::service::LeadIntakeService;
use crate::intake::store::InMemoryLeadStore;

pub(super) fn oslo_zone() -> Zone {
    Zone {
        id: ZoneId("zone-oslo".to_string()),
        name: "Oslo".to_string(),
        country_code: "NO".to_string(),
        country_name: "Norway".to_string(),
        postal_codes: vec![
            "0150".to_string(),
            "0151".to_string(),
            "0152".to_string(),
        ],
        region_labels: vec!["Oslo".to_string()],
    }
}

pub(super) fn bergen_zone() -> Zone {
    Zone {
        id: ZoneId("zone-bergen".to_string()),
        name: "Bergen".to_string(),
        country_code: "NO".to_string(),
        country_name: "Norway".to_string(),
        postal_codes: vec!["5003".to_string(), "5004".to_string()],
        region_labels: vec!["Vestland".to_string()],
    }
}

pub(super) fn photo_category() -> Category {
    Category {
        id: CategoryId("cat-photo".to_string()),
        name: "Photography".to_string(),
    }
}

fn providers() -> Vec<Provider> {
    vec![
        Provider {
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
        },
        Provider {
            id: ProviderId("prov-vista".to_string()),
            name: "Vista Eiendomsfoto".to_string(),
            status: ProviderStatus::Active,
            zones: vec![ZoneId("zone-oslo".to_string())],
            users: vec![ProviderUser {
                name: "Kari Holm".to_string(),
                email: "kari@vistafoto.no".to_string(),
            }],
        },
        Provider {
            id: ProviderId("prov-paused".to_string()),
            name: "Pauseknappen AS".to_string(),
            status: ProviderStatus::Paused,
            zones: vec![ZoneId("zone-oslo".to_string())],
            users: vec![ProviderUser {
                name: "Ole Vik".to_string(),
                email: "ole@pauseknappen.no".to_string(),
            }],
        },
        Provider {
            id: ProviderId("prov-bergen".to_string()),
            name: "Bergen Bilde".to_string(),
            status: ProviderStatus::Paused,
            zones: vec![ZoneId("zone-bergen".to_string())],
            users: vec![ProviderUser {
                name: "Silje Aas".to_string(),
                email: "silje@bergenbilde.no".to_string(),
            }],
        },
    ]
}

pub(super) fn seeded_store() -> Arc<InMemoryLeadStore> {
    let store = InMemoryLeadStore::default();
    store.add_zone(oslo_zone()).expect("seed oslo");
    store.add_zone(bergen_zone()).expect("seed bergen");
    store.add_category(photo_category()).expect("seed category");
    for provider in providers() {
        store.add_provider(provider).expect("seed provider");
    }
    Arc::new(store)
}

pub(super) fn submission() -> LeadSubmission {
    LeadSubmission {
        name: "Ola Nordmann".to_string(),
        email: "ola@example.com".to_string(),
        phone: "+47 912 34 567".to_string(),
        service_details: "Interior photos for a 3-room apartment listing".to_string(),
        postal_code: "0151".to_string(),
        categories: vec![CategoryId("cat-photo".to_string())],
    }
}

pub(super) fn sample_lead(zone: &Zone) -> Lead {
    let now = Utc::now();
    Lead {
        id: LeadId("lead-sample".to_string()),
        customer_name: "Kåre <Tester>".to_string(),
        email: "kare@example.com".to_string(),
        phone: "+47 900 00 000".to_string(),
        service_details: "Drone footage & stills".to_string(),
        postal_code: "0150".to_string(),
        zone: zone.clone(),
        categories: vec![photo_category()],
        status: LeadStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn intake_config() -> IntakeConfig {
    IntakeConfig {
        country_code: "NO".to_string(),
        country_name: "Norway".to_string(),
    }
}

/// Mailer double that records every send and can simulate per-recipient
/// transport failures.
#[derive(Default, Clone)]
pub(super) struct RecordingMailer {
    sent: Arc<Mutex<Vec<LeadNotification>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingMailer {
    pub(super) fn fail_for(&self, email: &str) {
        self.failing
            .lock()
            .expect("mailer mutex poisoned")
            .insert(email.to_string());
    }

    pub(super) fn sent(&self) -> Vec<LeadNotification> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl LeadMailer for RecordingMailer {
    fn send(&self, message: LeadNotification) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async move {
            let failing = self
                .failing
                .lock()
                .expect("mailer mutex poisoned")
                .contains(&message.recipient_email);
            if failing {
                return Err(MailError::Transport(format!(
                    "simulated outage for {}",
                    message.recipient_email
                )));
            }
            self.sent
                .lock()
                .expect("mailer mutex poisoned")
                .push(message);
            Ok(())
        })
    }
}

pub(super) fn build_service() -> (
    Arc<LeadIntakeService<InMemoryLeadStore, RecordingMailer>>,
    Arc<InMemoryLeadStore>,
    Arc<RecordingMailer>,
) {
    let store = seeded_store();
    let mailer = Arc::new(RecordingMailer::default());
    let service = Arc::new(LeadIntakeService::new(
        store.clone(),
        mailer.clone(),
        intake_config(),
    ));
    (service, store, mailer)
}
