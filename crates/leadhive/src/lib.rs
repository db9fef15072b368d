//! Lead intake and distribution core for the LeadHive marketing platform.
//!
//! A customer submits a service request with a postal code. The intake
//! workflow resolves the postal code to a geographic service zone, records
//! the lead together with an audit-log entry in one storage transaction,
//! matches the zone's active providers, and fans a notification out to every
//! provider user while tolerating individual send failures.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
