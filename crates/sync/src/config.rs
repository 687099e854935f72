//! Client configuration

use std::path::PathBuf;

use crate::error::ClientError;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub address: String,
    pub secure: bool,
    pub cert_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "localhost:50051".to_string(),
            secure: false,
            cert_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            address: lookup("FHIR_SYNC_ADDRESS").unwrap_or(defaults.address),
            secure: lookup("FHIR_SYNC_SECURE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.secure),
            cert_path: lookup("FHIR_SYNC_CERT_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// PEM root certificates for a secure channel.
    ///
    /// `None` for insecure channels, or secure channels relying on the
    /// platform's roots.
    pub fn root_certificates(&self) -> Result<Option<Vec<u8>>, ClientError> {
        if !self.secure {
            return Ok(None);
        }
        match &self.cert_path {
            Some(path) => std::fs::read(path).map(Some).map_err(|e| {
                ClientError::Config(format!(
                    "Failed to read CA certificate {}: {}",
                    path.display(),
                    e
                ))
            }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.address, "localhost:50051");
        assert_eq!(config.root_certificates().unwrap(), None);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("FHIR_SYNC_ADDRESS", "my.grpc.server:443"),
            ("FHIR_SYNC_SECURE", "True"),
            ("FHIR_SYNC_CERT_PATH", "path/to/ca.crt"),
        ]));
        assert_eq!(config.address, "my.grpc.server:443");
        assert!(config.secure);
        assert_eq!(config.cert_path, Some(PathBuf::from("path/to/ca.crt")));
    }

    #[test]
    fn test_missing_certificate() {
        let config = ClientConfig {
            secure: true,
            cert_path: Some(PathBuf::from("/nonexistent/ca.crt")),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.root_certificates(),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_reads_certificate() {
        let path = std::env::temp_dir().join(format!("fhir-sync-ca-{}.crt", std::process::id()));
        std::fs::write(&path, b"-----BEGIN CERTIFICATE-----\n").unwrap();

        let config = ClientConfig {
            secure: true,
            cert_path: Some(path.clone()),
            ..ClientConfig::default()
        };
        let certs = config.root_certificates().unwrap().unwrap();
        assert!(certs.starts_with(b"-----BEGIN"));

        std::fs::remove_file(path).unwrap();
    }
}
