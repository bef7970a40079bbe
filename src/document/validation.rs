//! Local document validation.
//!
//! Checks that do not depend on the service tier live here and run before
//! anything touches the network. Tier-dependent rules are enforced by the
//! reconciler once the `sku_name` has been parsed.

use base64::{engine::general_purpose, Engine as _};
use regex::Regex;

use crate::document::ServiceDocument;
use crate::error::ValidationError;

/// Service names become DNS labels, so the control plane restricts them to
/// letters, digits and inner hyphens, at most 50 characters.
const SERVICE_NAME_PATTERN: &str = "^[a-zA-Z](?:[a-zA-Z0-9-]{0,48}[a-zA-Z0-9])?$";

/// Loose shape check for publisher addresses. The control plane does its
/// own stricter validation; this only catches obvious typos early.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

const PUBLISHER_NAME_MAX_LEN: usize = 100;
const CERTIFICATE_MAX_COUNT: usize = 10;

/// Validates everything about a document that can be checked without
/// knowing the service tier.
pub fn validate(document: &ServiceDocument) -> Result<(), ValidationError> {
    if !matches_pattern(SERVICE_NAME_PATTERN, &document.name)? {
        return Err(ValidationError::ServiceName(document.name.clone()));
    }
    if document.location.trim().is_empty() {
        return Err(ValidationError::LocationMissing);
    }
    if document.publisher_name.is_empty()
        || document.publisher_name.len() > PUBLISHER_NAME_MAX_LEN
    {
        return Err(ValidationError::PublisherName);
    }
    if !matches_pattern(EMAIL_PATTERN, &document.publisher_email)? {
        return Err(ValidationError::PublisherEmail(
            document.publisher_email.clone(),
        ));
    }
    if document.certificate.len() > CERTIFICATE_MAX_COUNT {
        return Err(ValidationError::CertificateCount(document.certificate.len()));
    }
    for (index, certificate) in document.certificate.iter().enumerate() {
        if general_purpose::STANDARD
            .decode(&certificate.encoded_certificate)
            .is_err()
        {
            return Err(ValidationError::CertificateEncoding { index });
        }
    }
    Ok(())
}

fn matches_pattern(pattern: &str, value: &str) -> Result<bool, ValidationError> {
    let re =
        Regex::new(pattern).map_err(|e| ValidationError::Pattern(e.to_string()))?;
    Ok(re.is_match(value))
}
