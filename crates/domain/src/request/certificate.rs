//! Client certificate configuration for mutual TLS

use serde::{Deserialize, Serialize};

/// Client certificate attached to a request or a suite step.
///
/// Either a PEM pair (`cert_path` + `key_path`) or a PKCS#12 bundle
/// (`pfx_path`) is used. Paths are passed through to the HTTP client or the
/// test engine untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClientCertificate {
    /// PEM certificate file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_path: Option<String>,
    /// PEM private key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
    /// PKCS#12 bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfx_path: Option<String>,
    /// Passphrase for an encrypted key or bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    /// Hosts the certificate applies to; empty means every host.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
}

impl ClientCertificate {
    /// Creates a certificate from PEM files.
    #[must_use]
    pub fn from_pem_files(cert_path: impl Into<String>, key_path: impl Into<String>) -> Self {
        Self {
            cert_path: Some(cert_path.into()),
            key_path: Some(key_path.into()),
            ..Self::default()
        }
    }

    /// Creates a certificate from a PKCS#12 bundle.
    #[must_use]
    pub fn from_pkcs12(path: impl Into<String>, passphrase: Option<String>) -> Self {
        Self {
            pfx_path: Some(path.into()),
            passphrase,
            ..Self::default()
        }
    }

    /// Returns true when a PEM pair is configured.
    #[must_use]
    pub const fn has_pem_pair(&self) -> bool {
        self.cert_path.is_some() && self.key_path.is_some()
    }

    /// Returns true when either a PEM pair or a bundle is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.has_pem_pair() || self.pfx_path.is_some()
    }

    /// Returns true if the certificate should be presented to `host`.
    #[must_use]
    pub fn applies_to(&self, host: &str) -> bool {
        if self.domains.is_empty() {
            return true;
        }
        let host = host.to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            let domain = domain.to_ascii_lowercase();
            match domain.strip_prefix("*.") {
                Some(suffix) => host.ends_with(&format!(".{suffix}")),
                None => domain == host,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_pair() {
        let cert = ClientCertificate::from_pem_files("client.crt", "client.key");
        assert!(cert.has_pem_pair());
        assert!(cert.is_configured());
        assert!(!ClientCertificate::default().is_configured());
    }

    #[test]
    fn test_applies_to_domains() {
        let mut cert = ClientCertificate::from_pkcs12("client.p12", None);
        assert!(cert.applies_to("api.example.com"));

        cert.domains = vec!["*.example.com".to_string(), "localhost".to_string()];
        assert!(cert.applies_to("api.example.com"));
        assert!(cert.applies_to("LOCALHOST"));
        assert!(!cert.applies_to("example.com"));
        assert!(!cert.applies_to("example.org"));
    }
}
