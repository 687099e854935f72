//! fhir-sync-client: Patient sync over a pluggable transport
//!
//! Requests and replies are `fhir-record` binary encodings. The network
//! transport itself lives outside this crate behind the [`Transport`] trait;
//! [`LoopbackTransport`] serves the same methods in-process.

pub mod config;
mod controller;
mod error;
pub mod transport;

pub use config::ClientConfig;
pub use controller::PatientController;
pub use error::ClientError;
pub use transport::{LoopbackTransport, Transport, methods};
