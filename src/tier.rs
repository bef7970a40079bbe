//! # Service Tiers
//!
//! The tier and unit count of a service travel on the wire as a single
//! `{Tier}_{Capacity}` string (for example `Developer_1`). This module
//! parses and formats that encoding and records which features each tier
//! supports, so tier gating lives in one table instead of being scattered
//! through the reconcile flow.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offering tier of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SkuTier {
    Developer,
    Basic,
    Standard,
    Premium,
    Consumption,
    Isolated,
}

impl SkuTier {
    /// Canonical wire spelling of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Developer => "Developer",
            Self::Basic => "Basic",
            Self::Standard => "Standard",
            Self::Premium => "Premium",
            Self::Consumption => "Consumption",
            Self::Isolated => "Isolated",
        }
    }

    /// Feature set available on the tier.
    #[must_use]
    pub const fn capabilities(self) -> TierCapabilities {
        TierCapabilities {
            cipher_configuration: !matches!(self, Self::Consumption),
            portal_settings: !matches!(self, Self::Consumption),
            availability_zones: matches!(self, Self::Premium),
            client_certificate_toggle: matches!(self, Self::Consumption),
        }
    }
}

impl fmt::Display for SkuTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a tier can and cannot do.
///
/// Consumption is the serverless offering. It has no dedicated gateway
/// units, so cipher tuning, developer portal settings and tenant access do
/// not exist for it, while the client certificate toggle exists only there
/// (dedicated tiers configure client certificates per hostname instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCapabilities {
    /// Frontend SSL 3.0, Triple DES and the named cipher suite toggles.
    pub cipher_configuration: bool,
    /// Developer portal sign-in/sign-up settings and tenant access keys.
    pub portal_settings: bool,
    /// Availability zone placement.
    pub availability_zones: bool,
    /// The service-wide `client_certificate_enabled` toggle.
    pub client_certificate_toggle: bool,
}

/// A `sku_name` that does not follow the `{Tier}_{Capacity}` encoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("`sku_name` {0:?} is invalid: expected `{{tier}}_{{capacity}}`, e.g. `Developer_1`")]
pub struct InvalidSkuName(pub String);

/// Parsed `sku_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sku {
    pub tier: SkuTier,
    pub capacity: u32,
}

impl FromStr for Sku {
    type Err = InvalidSkuName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSkuName(s.to_string());
        let (tier, capacity) = s.split_once('_').ok_or_else(invalid)?;
        let tier = match tier {
            "Developer" => SkuTier::Developer,
            "Basic" => SkuTier::Basic,
            "Standard" => SkuTier::Standard,
            "Premium" => SkuTier::Premium,
            "Consumption" => SkuTier::Consumption,
            "Isolated" => SkuTier::Isolated,
            _ => return Err(invalid()),
        };
        let capacity = capacity.parse().ok().ok_or_else(invalid)?;
        Ok(Self { tier, capacity })
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.tier, self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_sku_names() {
        let cases = [
            ("Developer_1", SkuTier::Developer, 1),
            ("Basic_2", SkuTier::Basic, 2),
            ("Standard_4", SkuTier::Standard, 4),
            ("Premium_12", SkuTier::Premium, 12),
            ("Consumption_0", SkuTier::Consumption, 0),
            ("Isolated_1", SkuTier::Isolated, 1),
        ];
        for (input, tier, capacity) in cases {
            let sku: Sku = input.parse().unwrap_or_else(|e| panic!("{input}: {e}"));
            assert_eq!(sku.tier, tier, "tier of {input}");
            assert_eq!(sku.capacity, capacity, "capacity of {input}");
        }
    }

    #[test]
    fn rejects_malformed_sku_names() {
        let cases = [
            "",
            "Developer",
            "Developer_",
            "_1",
            "developer_1",
            "Developer_one",
            "Developer_1_1",
            "Ultra_1",
            "Developer_-1",
        ];
        for input in cases {
            assert!(
                input.parse::<Sku>().is_err(),
                "sku_name '{input}' should be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for input in ["Developer_1", "Premium_3", "Consumption_0"] {
            let sku: Sku = input.parse().unwrap();
            assert_eq!(sku.to_string(), input);
        }
    }

    #[test]
    fn consumption_has_no_cipher_or_portal_support() {
        let capabilities = SkuTier::Consumption.capabilities();
        assert!(!capabilities.cipher_configuration);
        assert!(!capabilities.portal_settings);
        assert!(!capabilities.availability_zones);
        assert!(capabilities.client_certificate_toggle);
    }

    #[test]
    fn only_premium_supports_zones() {
        for tier in [
            SkuTier::Developer,
            SkuTier::Basic,
            SkuTier::Standard,
            SkuTier::Consumption,
            SkuTier::Isolated,
        ] {
            assert!(!tier.capabilities().availability_zones, "{tier}");
        }
        assert!(SkuTier::Premium.capabilities().availability_zones);
    }
}
