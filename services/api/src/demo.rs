use crate::infra::{seeded_store, LoggingMailer};
use clap::Args;
use leadhive::config::AppConfig;
use leadhive::error::AppError;
use leadhive::intake::{CategoryId, LeadIntakeService, LeadRepository, LeadSubmission};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Postal code for the demo submission (defaults to an Oslo code)
    #[arg(long)]
    pub(crate) postal_code: Option<String>,
    /// Free-text service details for the demo submission
    #[arg(long)]
    pub(crate) details: Option<String>,
}

/// End-to-end intake round trip against seeded sample data, for stakeholder
/// demos and local smoke checks.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = seeded_store(&config.intake)?;
    let mailer = Arc::new(LoggingMailer);
    let service = LeadIntakeService::new(store.clone(), mailer, config.intake.clone());

    let submission = LeadSubmission {
        name: "Ola Nordmann".to_string(),
        email: "ola@example.com".to_string(),
        phone: "+47 912 34 567".to_string(),
        service_details: args
            .details
            .unwrap_or_else(|| "Interior and exterior photos for a new listing".to_string()),
        postal_code: args.postal_code.unwrap_or_else(|| "0150".to_string()),
        categories: vec![CategoryId("cat-photo".to_string())],
    };

    println!("LeadHive intake demo");
    println!(
        "Submitting lead for postal code {} ({})",
        submission.postal_code, config.intake.country_name
    );

    match service.submit(submission).await {
        Ok(receipt) => {
            println!("{}", receipt.message);
            println!(
                "Lead {} -> zone {} ({}), status {}",
                receipt.lead.id.0,
                receipt.zone_name,
                receipt.country_name,
                receipt.lead.status.label()
            );

            let dispatches = store.dispatches_for_lead(&receipt.lead.id)?;
            for dispatch in dispatches {
                println!(
                    "  dispatched to provider {} (status {})",
                    dispatch.provider_id.0,
                    dispatch.status.label()
                );
            }

            println!("Audit trail:");
            for entry in store.audit_entries() {
                let metadata: Vec<String> = entry
                    .metadata
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect();
                println!(
                    "  {} {} {} [{}]",
                    entry.action.label(),
                    entry.entity_kind.label(),
                    entry.entity_id,
                    metadata.join(", ")
                );
            }
        }
        Err(err) => println!("Intake failed: {err}"),
    }

    Ok(())
}
