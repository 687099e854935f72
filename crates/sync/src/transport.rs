//! Transport seam and an in-process loopback implementation

use std::collections::HashMap;
use std::sync::Mutex;

use fhir_record::{Record, types};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Method names understood by the sync service
pub mod methods {
    pub const GET_PATIENT: &str = "GetPatient";
    pub const UPSERT_PATIENT: &str = "UpsertPatient";
    pub const DELETE_PATIENT: &str = "DeletePatient";
}

/// Carries encoded requests to the sync service and returns encoded replies.
///
/// A missing resource is reported as `ClientError::NotFound`.
pub trait Transport {
    fn connect(config: &ClientConfig) -> Result<Self, ClientError>
    where
        Self: Sized;

    fn call(&self, method: &str, request: &[u8]) -> Result<Vec<u8>, ClientError>;
}

/// Serves the sync methods from an in-memory patient map
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    patients: Mutex<HashMap<String, Vec<u8>>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored patients
    pub fn len(&self) -> usize {
        self.patients.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn store(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, ClientError> {
        self.patients
            .lock()
            .map_err(|_| ClientError::Transport("patient store lock poisoned".to_string()))
    }

    fn get(&self, request: &[u8]) -> Result<Vec<u8>, ClientError> {
        let id = requested_id(request)?;
        self.store()?
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Patient/{}", id)))
    }

    fn upsert(&self, request: &[u8]) -> Result<Vec<u8>, ClientError> {
        let mut patient = Record::from_bytes(types::PATIENT, request)?;

        let existing = patient
            .message("id")
            .and_then(|id| id.string("value"))
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                patient.message_mut("id")?.set_scalar("value", id.as_str())?;
                id
            }
        };

        let bytes = patient.to_bytes();
        self.store()?.insert(id, bytes.clone());
        Ok(bytes)
    }

    fn delete(&self, request: &[u8]) -> Result<Vec<u8>, ClientError> {
        let id = requested_id(request)?;
        match self.store()?.remove(&id) {
            Some(_) => Ok(Vec::new()),
            None => Err(ClientError::NotFound(format!("Patient/{}", id))),
        }
    }
}

impl Transport for LoopbackTransport {
    fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        // Fail on an unreadable CA file the same way a network transport would
        config.root_certificates()?;
        tracing::debug!(
            address = %config.address,
            secure = config.secure,
            "Using loopback transport"
        );
        Ok(Self::new())
    }

    fn call(&self, method: &str, request: &[u8]) -> Result<Vec<u8>, ClientError> {
        match method {
            methods::GET_PATIENT => self.get(request),
            methods::UPSERT_PATIENT => self.upsert(request),
            methods::DELETE_PATIENT => self.delete(request),
            other => Err(ClientError::Transport(format!("Unknown method: {}", other))),
        }
    }
}

fn requested_id(request: &[u8]) -> Result<String, ClientError> {
    let reference = Record::from_bytes(types::PATIENT_REF, request)?;
    match reference.string("id") {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ClientError::Transport("PatientRef.id is required".to_string())),
    }
}
