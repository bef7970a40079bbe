//! CA certificate expansion and flattening.

use chrono::SecondsFormat;

use crate::api::models;
use crate::document::Certificate;

/// Builds the wire certificate list.
///
/// The password is always sent, even when empty: cer payloads carry no
/// password and the control plane accepts the empty string for them.
pub(crate) fn expand(certificates: &[Certificate]) -> Vec<models::CertificateConfiguration> {
    certificates
        .iter()
        .map(|certificate| models::CertificateConfiguration {
            encoded_certificate: Some(certificate.encoded_certificate.clone()),
            certificate_password: Some(certificate.certificate_password.clone()),
            store_name: certificate.store_name,
            certificate: None,
        })
        .collect()
}

/// Rebuilds the document certificate list from the wire.
///
/// The control plane never returns payloads or passwords, so both are
/// carried forward from the prior document by position. Positions hold
/// because applies always send the full list in document order.
pub(crate) fn flatten(
    certificates: &[models::CertificateConfiguration],
    prior: Option<&[Certificate]>,
) -> Vec<Certificate> {
    certificates
        .iter()
        .enumerate()
        .map(|(index, wire)| {
            let carried = prior.and_then(|list| list.get(index));
            let information = wire.certificate.as_ref();
            Certificate {
                encoded_certificate: carried
                    .map(|c| c.encoded_certificate.clone())
                    .unwrap_or_default(),
                certificate_password: carried
                    .map(|c| c.certificate_password.clone())
                    .unwrap_or_default(),
                store_name: wire.store_name,
                expiry: information
                    .and_then(|info| info.expiry)
                    .map(|expiry| expiry.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .unwrap_or_default(),
                subject: information.map(|info| info.subject.clone()).unwrap_or_default(),
                thumbprint: information
                    .map(|info| info.thumbprint.clone())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StoreName;
    use chrono::{TimeZone, Utc};

    #[test]
    fn expand_always_sends_a_password() {
        let certificates = vec![Certificate {
            encoded_certificate: "AAAA".to_string(),
            store_name: StoreName::Root,
            ..Certificate::default()
        }];
        let wire = expand(&certificates);
        assert_eq!(wire[0].encoded_certificate.as_deref(), Some("AAAA"));
        assert_eq!(wire[0].certificate_password.as_deref(), Some(""));
        assert_eq!(wire[0].store_name, StoreName::Root);
    }

    #[test]
    fn flatten_carries_payloads_forward_by_position() {
        let prior = vec![
            Certificate {
                encoded_certificate: "AAAA".to_string(),
                certificate_password: "first".to_string(),
                store_name: StoreName::CertificateAuthority,
                ..Certificate::default()
            },
            Certificate {
                encoded_certificate: "BBBB".to_string(),
                store_name: StoreName::Root,
                ..Certificate::default()
            },
        ];
        let wire = vec![
            models::CertificateConfiguration {
                store_name: StoreName::CertificateAuthority,
                ..models::CertificateConfiguration::default()
            },
            models::CertificateConfiguration {
                store_name: StoreName::Root,
                ..models::CertificateConfiguration::default()
            },
        ];
        let flattened = flatten(&wire, Some(&prior));
        assert_eq!(flattened[0].encoded_certificate, "AAAA");
        assert_eq!(flattened[0].certificate_password, "first");
        assert_eq!(flattened[1].encoded_certificate, "BBBB");
        assert_eq!(flattened[1].certificate_password, "");
    }

    #[test]
    fn flatten_without_a_prior_document_leaves_payloads_empty() {
        let wire = vec![models::CertificateConfiguration {
            store_name: StoreName::Root,
            ..models::CertificateConfiguration::default()
        }];
        let flattened = flatten(&wire, None);
        assert_eq!(flattened[0].encoded_certificate, "");
        assert_eq!(flattened[0].certificate_password, "");
    }

    #[test]
    fn flatten_formats_expiry_as_rfc3339_seconds() {
        let wire = vec![models::CertificateConfiguration {
            store_name: StoreName::Root,
            certificate: Some(models::CertificateInformation {
                expiry: Some(Utc.with_ymd_and_hms(2027, 3, 14, 9, 26, 53).unwrap()),
                thumbprint: "THUMB".to_string(),
                subject: "CN=example".to_string(),
            }),
            ..models::CertificateConfiguration::default()
        }];
        let flattened = flatten(&wire, None);
        assert_eq!(flattened[0].expiry, "2027-03-14T09:26:53Z");
        assert_eq!(flattened[0].thumbprint, "THUMB");
        assert_eq!(flattened[0].subject, "CN=example");
    }
}
