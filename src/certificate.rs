use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey};
use rsa::pkcs8::LineEnding;
use rsa::RsaPublicKey;
use x509_parser::oid_registry::{
    OID_X509_COMMON_NAME, OID_X509_COUNTRY_NAME, OID_X509_LOCALITY_NAME,
    OID_X509_ORGANIZATIONAL_UNIT, OID_X509_ORGANIZATION_NAME, OID_X509_STATE_OR_PROVINCE_NAME,
};
use x509_parser::prelude::*;

use crate::common::{IngestError, IngestResult};

/// Public key and subject common name extracted from a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    /// The embedded public key, re-encoded as PKCS#1 PEM.
    pub public_key: String,
    pub common_name: String,
}

/// Parses a PEM-encoded X.509 certificate and extracts its public key and
/// subject common name. This is a pure extraction step: expiry, issuer
/// trust and chains are not validated.
pub fn parse_certificate(pem: &str) -> IngestResult<ParsedCertificate> {
    let (_, document) = parse_x509_pem(pem.as_bytes())
        .map_err(|e| IngestError::Parse(format!("failed to decode certificate PEM: {e}")))?;
    let certificate = document
        .parse_x509()
        .map_err(|e| IngestError::Parse(format!("failed to parse certificate: {e}")))?;

    let public_key = reencode_public_key(&certificate)?;
    let common_name = extract_common_name(&subject_lines(certificate.subject()))?;

    Ok(ParsedCertificate {
        public_key,
        common_name,
    })
}

/// Extracts the common name from a subject distinguished-name string, one
/// `ATTR=value` pair per line. The `CN=` prefix is stripped from the
/// returned value.
pub fn extract_common_name(subject: &str) -> IngestResult<String> {
    subject
        .lines()
        .find_map(|line| line.strip_prefix("CN="))
        .map(str::to_owned)
        .ok_or_else(|| {
            IngestError::Parse("no CN attribute in the certificate subject".to_string())
        })
}

/// Validates the certificate's embedded key through the RSA decoder and
/// re-exports it in the fixed PKCS#1 PEM encoding. For RSA certificates
/// the SPKI bit string payload is exactly the PKCS#1 key structure.
fn reencode_public_key(certificate: &X509Certificate<'_>) -> IngestResult<String> {
    let spki = certificate.public_key();
    let key = RsaPublicKey::from_pkcs1_der(spki.subject_public_key.data.as_ref())
        .map_err(|e| IngestError::Parse(format!("unsupported public key in certificate: {e}")))?;
    key.to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| IngestError::Parse(format!("failed to re-encode public key: {e}")))
}

fn subject_lines(name: &X509Name<'_>) -> String {
    let mut lines = Vec::new();
    for attribute in name.iter_attributes() {
        let oid = attribute.attr_type();
        let abbrev = if *oid == OID_X509_COMMON_NAME {
            "CN".to_string()
        } else if *oid == OID_X509_COUNTRY_NAME {
            "C".to_string()
        } else if *oid == OID_X509_STATE_OR_PROVINCE_NAME {
            "ST".to_string()
        } else if *oid == OID_X509_LOCALITY_NAME {
            "L".to_string()
        } else if *oid == OID_X509_ORGANIZATION_NAME {
            "O".to_string()
        } else if *oid == OID_X509_ORGANIZATIONAL_UNIT {
            "OU".to_string()
        } else {
            oid.to_id_string()
        };
        if let Ok(value) = attribute.as_str() {
            lines.push(format!("{abbrev}={value}"));
        }
    }
    lines.join("\n")
}
