//! Patient operations against the sync service

use fhir_record::{Record, RecordError, types};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::{Transport, methods};

/// Reads and writes Patient records through a [`Transport`]
#[derive(Debug)]
pub struct PatientController<T> {
    transport: T,
}

impl<T: Transport> PatientController<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Connect a transport using the given configuration
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        tracing::info!(
            address = %config.address,
            secure = config.secure,
            "Connecting to fhir-sync"
        );
        Ok(Self::new(T::connect(config)?))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GetPatient: fetch a patient by id
    pub fn get_patient(&self, patient_id: &str) -> Result<Record, ClientError> {
        let request = patient_ref(patient_id)?;
        let response = self.call(methods::GET_PATIENT, &request)?;
        Ok(Record::from_bytes(types::PATIENT, &response)?)
    }

    /// UpsertPatient: store a patient and return the stored version
    pub fn upsert_patient(&self, patient: &Record) -> Result<Record, ClientError> {
        if patient.type_name() != types::PATIENT {
            return Err(RecordError::TypeMismatch {
                expected: types::PATIENT.to_string(),
                found: patient.type_name().to_string(),
            }
            .into());
        }
        let response = self.call(methods::UPSERT_PATIENT, patient)?;
        let stored = Record::from_bytes(types::PATIENT, &response)?;

        let patient_id = stored
            .message("id")
            .and_then(|id| id.string("value"))
            .unwrap_or("unknown");
        tracing::info!(patient_id, "Patient upserted");
        Ok(stored)
    }

    /// DeletePatient: remove a patient by id
    pub fn delete_patient(&self, patient_id: &str) -> Result<(), ClientError> {
        let request = patient_ref(patient_id)?;
        self.call(methods::DELETE_PATIENT, &request)?;
        tracing::info!(patient_id = %patient_id, "Patient deleted");
        Ok(())
    }

    fn call(&self, method: &str, request: &Record) -> Result<Vec<u8>, ClientError> {
        let bytes = request.to_bytes();
        tracing::debug!(method, request_bytes = bytes.len(), "Calling fhir-sync");

        match self.transport.call(method, &bytes) {
            Ok(response) => {
                tracing::debug!(method, response_bytes = response.len(), "fhir-sync replied");
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(method, error = %e, "fhir-sync call failed");
                Err(e)
            }
        }
    }
}

fn patient_ref(patient_id: &str) -> Result<Record, RecordError> {
    let mut reference = Record::of_type(types::PATIENT_REF)?;
    reference.set_scalar("id", patient_id)?;
    Ok(reference)
}
