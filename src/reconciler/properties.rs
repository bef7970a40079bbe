//! Gateway custom properties codec.
//!
//! TLS, SSL, cipher suite and HTTP/2 toggles ride in one flat string map on
//! the wire, keyed by well-known property names. Booleans are written
//! lowercase; on the way back a missing or unparsable value reads as
//! `false`. The frontend SSL 3.0, Triple DES and cipher suite keys are
//! gated: tiers without cipher configuration reject them even as `false`,
//! so those keys are omitted entirely there.

use std::collections::BTreeMap;

use crate::document::{ProtocolSettings, SecuritySettings};
use crate::error::ValidationError;
use crate::tier::TierCapabilities;

const BACKEND_PROTOCOL_SSL30: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Backend.Protocols.Ssl30";
const BACKEND_PROTOCOL_TLS10: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Backend.Protocols.Tls10";
const BACKEND_PROTOCOL_TLS11: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Backend.Protocols.Tls11";
const FRONTEND_PROTOCOL_SSL30: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Protocols.Ssl30";
const FRONTEND_PROTOCOL_TLS10: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Protocols.Tls10";
const FRONTEND_PROTOCOL_TLS11: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Protocols.Tls11";
const TRIPLE_DES_CIPHERS: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TripleDes168";
const HTTP2_PROTOCOL: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Protocols.Server.Http2";

const TLS_ECDHE_ECDSA_WITH_AES256_CBC_SHA: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA";
const TLS_ECDHE_ECDSA_WITH_AES128_CBC_SHA: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA";
const TLS_ECDHE_RSA_WITH_AES256_CBC_SHA: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA";
const TLS_ECDHE_RSA_WITH_AES128_CBC_SHA: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA";
const TLS_RSA_WITH_AES128_GCM_SHA256: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_RSA_WITH_AES_128_GCM_SHA256";
const TLS_RSA_WITH_AES256_CBC_SHA256: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_RSA_WITH_AES_256_CBC_SHA256";
const TLS_RSA_WITH_AES128_CBC_SHA256: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_RSA_WITH_AES_128_CBC_SHA256";
const TLS_RSA_WITH_AES256_CBC_SHA: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_RSA_WITH_AES_256_CBC_SHA";
const TLS_RSA_WITH_AES128_CBC_SHA: &str =
    "Microsoft.WindowsAzure.ApiManagement.Gateway.Security.Ciphers.TLS_RSA_WITH_AES_128_CBC_SHA";

type FlagAccessor = fn(&SecuritySettings) -> bool;

/// Cipher suite toggles: wire key, document field and accessor.
const CIPHER_SUITES: [(&str, &str, FlagAccessor); 9] = [
    (
        TLS_ECDHE_ECDSA_WITH_AES256_CBC_SHA,
        "tls_ecdhe_ecdsa_with_aes256_cbc_sha_ciphers_enabled",
        |s| s.tls_ecdhe_ecdsa_with_aes256_cbc_sha_ciphers_enabled,
    ),
    (
        TLS_ECDHE_ECDSA_WITH_AES128_CBC_SHA,
        "tls_ecdhe_ecdsa_with_aes128_cbc_sha_ciphers_enabled",
        |s| s.tls_ecdhe_ecdsa_with_aes128_cbc_sha_ciphers_enabled,
    ),
    (
        TLS_ECDHE_RSA_WITH_AES256_CBC_SHA,
        "tls_ecdhe_rsa_with_aes256_cbc_sha_ciphers_enabled",
        |s| s.tls_ecdhe_rsa_with_aes256_cbc_sha_ciphers_enabled,
    ),
    (
        TLS_ECDHE_RSA_WITH_AES128_CBC_SHA,
        "tls_ecdhe_rsa_with_aes128_cbc_sha_ciphers_enabled",
        |s| s.tls_ecdhe_rsa_with_aes128_cbc_sha_ciphers_enabled,
    ),
    (
        TLS_RSA_WITH_AES128_GCM_SHA256,
        "tls_rsa_with_aes128_gcm_sha256_ciphers_enabled",
        |s| s.tls_rsa_with_aes128_gcm_sha256_ciphers_enabled,
    ),
    (
        TLS_RSA_WITH_AES256_CBC_SHA256,
        "tls_rsa_with_aes256_cbc_sha256_ciphers_enabled",
        |s| s.tls_rsa_with_aes256_cbc_sha256_ciphers_enabled,
    ),
    (
        TLS_RSA_WITH_AES128_CBC_SHA256,
        "tls_rsa_with_aes128_cbc_sha256_ciphers_enabled",
        |s| s.tls_rsa_with_aes128_cbc_sha256_ciphers_enabled,
    ),
    (
        TLS_RSA_WITH_AES256_CBC_SHA,
        "tls_rsa_with_aes256_cbc_sha_ciphers_enabled",
        |s| s.tls_rsa_with_aes256_cbc_sha_ciphers_enabled,
    ),
    (
        TLS_RSA_WITH_AES128_CBC_SHA,
        "tls_rsa_with_aes128_cbc_sha_ciphers_enabled",
        |s| s.tls_rsa_with_aes128_cbc_sha_ciphers_enabled,
    ),
];

/// Rejects gated toggles on tiers that cannot configure them. Violations
/// are collected so a document can be fixed in one pass.
pub(crate) fn check_gated_toggles(
    security: Option<&SecuritySettings>,
    capabilities: TierCapabilities,
) -> Result<(), ValidationError> {
    if capabilities.cipher_configuration {
        return Ok(());
    }
    let settings = security.copied().unwrap_or_default();
    let mut violations = Vec::new();
    if settings.enable_frontend_ssl30 {
        violations.push("enable_frontend_ssl30");
    }
    if settings.triple_des_ciphers_enabled {
        violations.push("triple_des_ciphers_enabled");
    }
    for (_, field, enabled) in CIPHER_SUITES {
        if enabled(&settings) {
            violations.push(field);
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::CiphersNotSupportedOnConsumption(violations))
    }
}

/// Builds the wire custom-properties map.
///
/// The protocol keys are always written, defaults included, so clearing a
/// toggle in the document clears it remotely. The HTTP/2 key only appears
/// when the document carries a `protocols` block.
pub(crate) fn expand(
    security: Option<&SecuritySettings>,
    protocols: Option<&ProtocolSettings>,
    capabilities: TierCapabilities,
) -> BTreeMap<String, String> {
    let settings = security.copied().unwrap_or_default();
    let mut properties = BTreeMap::new();
    insert_flag(&mut properties, BACKEND_PROTOCOL_SSL30, settings.enable_backend_ssl30);
    insert_flag(&mut properties, BACKEND_PROTOCOL_TLS10, settings.enable_backend_tls10);
    insert_flag(&mut properties, BACKEND_PROTOCOL_TLS11, settings.enable_backend_tls11);
    insert_flag(&mut properties, FRONTEND_PROTOCOL_TLS10, settings.enable_frontend_tls10);
    insert_flag(&mut properties, FRONTEND_PROTOCOL_TLS11, settings.enable_frontend_tls11);
    if capabilities.cipher_configuration {
        insert_flag(
            &mut properties,
            FRONTEND_PROTOCOL_SSL30,
            settings.enable_frontend_ssl30,
        );
        insert_flag(
            &mut properties,
            TRIPLE_DES_CIPHERS,
            settings.triple_des_ciphers_enabled,
        );
        for (key, _, enabled) in CIPHER_SUITES {
            insert_flag(&mut properties, key, enabled(&settings));
        }
    }
    if let Some(protocols) = protocols {
        insert_flag(&mut properties, HTTP2_PROTOCOL, protocols.enable_http2);
    }
    properties
}

/// Rebuilds the security block from the wire map.
///
/// Gated keys are ignored on tiers without cipher configuration even when
/// the platform echoes them back.
pub(crate) fn flatten_security(
    properties: &BTreeMap<String, String>,
    capabilities: TierCapabilities,
) -> SecuritySettings {
    let mut settings = SecuritySettings {
        enable_backend_ssl30: parse_flag(properties, BACKEND_PROTOCOL_SSL30),
        enable_backend_tls10: parse_flag(properties, BACKEND_PROTOCOL_TLS10),
        enable_backend_tls11: parse_flag(properties, BACKEND_PROTOCOL_TLS11),
        enable_frontend_tls10: parse_flag(properties, FRONTEND_PROTOCOL_TLS10),
        enable_frontend_tls11: parse_flag(properties, FRONTEND_PROTOCOL_TLS11),
        ..SecuritySettings::default()
    };
    if capabilities.cipher_configuration {
        settings.enable_frontend_ssl30 = parse_flag(properties, FRONTEND_PROTOCOL_SSL30);
        settings.triple_des_ciphers_enabled = parse_flag(properties, TRIPLE_DES_CIPHERS);
        settings.tls_ecdhe_ecdsa_with_aes256_cbc_sha_ciphers_enabled =
            parse_flag(properties, TLS_ECDHE_ECDSA_WITH_AES256_CBC_SHA);
        settings.tls_ecdhe_ecdsa_with_aes128_cbc_sha_ciphers_enabled =
            parse_flag(properties, TLS_ECDHE_ECDSA_WITH_AES128_CBC_SHA);
        settings.tls_ecdhe_rsa_with_aes256_cbc_sha_ciphers_enabled =
            parse_flag(properties, TLS_ECDHE_RSA_WITH_AES256_CBC_SHA);
        settings.tls_ecdhe_rsa_with_aes128_cbc_sha_ciphers_enabled =
            parse_flag(properties, TLS_ECDHE_RSA_WITH_AES128_CBC_SHA);
        settings.tls_rsa_with_aes128_gcm_sha256_ciphers_enabled =
            parse_flag(properties, TLS_RSA_WITH_AES128_GCM_SHA256);
        settings.tls_rsa_with_aes256_cbc_sha256_ciphers_enabled =
            parse_flag(properties, TLS_RSA_WITH_AES256_CBC_SHA256);
        settings.tls_rsa_with_aes128_cbc_sha256_ciphers_enabled =
            parse_flag(properties, TLS_RSA_WITH_AES128_CBC_SHA256);
        settings.tls_rsa_with_aes256_cbc_sha_ciphers_enabled =
            parse_flag(properties, TLS_RSA_WITH_AES256_CBC_SHA);
        settings.tls_rsa_with_aes128_cbc_sha_ciphers_enabled =
            parse_flag(properties, TLS_RSA_WITH_AES128_CBC_SHA);
    }
    settings
}

pub(crate) fn flatten_protocols(properties: &BTreeMap<String, String>) -> ProtocolSettings {
    ProtocolSettings {
        enable_http2: parse_flag(properties, HTTP2_PROTOCOL),
    }
}

fn insert_flag(properties: &mut BTreeMap<String, String>, key: &str, value: bool) {
    properties.insert(key.to_string(), value.to_string());
}

/// Reads one boolean property. `1`, `t` and `true` in any case count as
/// set; anything else, including a missing key, reads as `false`.
fn parse_flag(properties: &BTreeMap<String, String>, key: &str) -> bool {
    properties.get(key).is_some_and(|value| {
        matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "t" | "true")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::SkuTier;

    fn dedicated() -> TierCapabilities {
        SkuTier::Premium.capabilities()
    }

    fn consumption() -> TierCapabilities {
        SkuTier::Consumption.capabilities()
    }

    #[test]
    fn expand_writes_lowercase_booleans() {
        let security = SecuritySettings {
            enable_backend_tls11: true,
            ..SecuritySettings::default()
        };
        let properties = expand(Some(&security), None, dedicated());
        assert_eq!(
            properties.get(BACKEND_PROTOCOL_TLS11).map(String::as_str),
            Some("true")
        );
        assert_eq!(
            properties.get(BACKEND_PROTOCOL_SSL30).map(String::as_str),
            Some("false")
        );
    }

    #[test]
    fn dedicated_tiers_emit_the_full_key_set() {
        let properties = expand(None, None, dedicated());
        assert_eq!(properties.len(), 16);
        assert!(properties.contains_key(TRIPLE_DES_CIPHERS));
        assert!(properties.contains_key(TLS_RSA_WITH_AES128_CBC_SHA));
    }

    #[test]
    fn consumption_omits_every_gated_key() {
        let properties = expand(None, None, consumption());
        assert_eq!(properties.len(), 5);
        assert!(!properties.contains_key(FRONTEND_PROTOCOL_SSL30));
        assert!(!properties.contains_key(TRIPLE_DES_CIPHERS));
        assert!(properties.keys().all(|key| !key.contains("Ciphers")));
    }

    #[test]
    fn http2_key_needs_a_protocols_block() {
        let without = expand(None, None, dedicated());
        assert!(!without.contains_key(HTTP2_PROTOCOL));

        let protocols = ProtocolSettings { enable_http2: true };
        let with = expand(None, Some(&protocols), dedicated());
        assert_eq!(with.get(HTTP2_PROTOCOL).map(String::as_str), Some("true"));
    }

    #[test]
    fn gated_toggles_are_rejected_together_on_consumption() {
        let security = SecuritySettings {
            enable_frontend_ssl30: true,
            triple_des_ciphers_enabled: true,
            tls_rsa_with_aes256_cbc_sha_ciphers_enabled: true,
            ..SecuritySettings::default()
        };
        let violations = match check_gated_toggles(Some(&security), consumption()) {
            Err(ValidationError::CiphersNotSupportedOnConsumption(fields)) => fields,
            other => panic!("expected a gated toggle error, got {other:?}"),
        };
        assert_eq!(
            violations,
            vec![
                "enable_frontend_ssl30",
                "triple_des_ciphers_enabled",
                "tls_rsa_with_aes256_cbc_sha_ciphers_enabled",
            ]
        );
    }

    #[test]
    fn gated_toggles_pass_on_cipher_capable_tiers() {
        let security = SecuritySettings {
            enable_frontend_ssl30: true,
            triple_des_ciphers_enabled: true,
            ..SecuritySettings::default()
        };
        assert_eq!(check_gated_toggles(Some(&security), dedicated()), Ok(()));
        assert_eq!(check_gated_toggles(None, consumption()), Ok(()));
    }

    #[test]
    fn parse_flag_is_tolerant() {
        let mut properties = BTreeMap::new();
        for (key, value) in [
            ("a", "true"),
            ("b", "True"),
            ("c", "1"),
            ("d", "t"),
            ("e", "false"),
            ("f", "0"),
            ("g", "banana"),
            ("h", " TRUE "),
        ] {
            properties.insert(key.to_string(), value.to_string());
        }
        for key in ["a", "b", "c", "d", "h"] {
            assert!(parse_flag(&properties, key), "{key} should parse as set");
        }
        for key in ["e", "f", "g", "missing"] {
            assert!(!parse_flag(&properties, key), "{key} should parse as unset");
        }
    }

    #[test]
    fn security_settings_survive_a_round_trip() {
        let security = SecuritySettings {
            enable_backend_tls10: true,
            enable_frontend_ssl30: true,
            triple_des_ciphers_enabled: true,
            tls_ecdhe_rsa_with_aes128_cbc_sha_ciphers_enabled: true,
            tls_rsa_with_aes128_gcm_sha256_ciphers_enabled: true,
            ..SecuritySettings::default()
        };
        let properties = expand(Some(&security), None, dedicated());
        assert_eq!(flatten_security(&properties, dedicated()), security);
    }

    #[test]
    fn consumption_reads_ignore_echoed_gated_keys() {
        let mut properties = expand(None, None, consumption());
        properties.insert(TRIPLE_DES_CIPHERS.to_string(), "true".to_string());
        properties.insert(FRONTEND_PROTOCOL_SSL30.to_string(), "true".to_string());
        let settings = flatten_security(&properties, consumption());
        assert!(!settings.triple_des_ciphers_enabled);
        assert!(!settings.enable_frontend_ssl30);
    }
}
