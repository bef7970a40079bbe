//! # Resource Identifiers
//!
//! Typed forms of the control plane's structured resource paths. Segment
//! casing in ids returned by the control plane varies across API versions,
//! so parsing compares segment names case-insensitively while formatting
//! always emits the canonical casing.

use std::fmt;

use thiserror::Error;

/// Failure to parse a structured resource path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} id {id:?} is invalid: {reason}")]
pub struct ParseError {
    kind: &'static str,
    id: String,
    reason: &'static str,
}

impl ParseError {
    fn new(kind: &'static str, id: &str, reason: &'static str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            reason,
        }
    }
}

/// Identifier of an API Management service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub service_name: String,
}

impl ServiceId {
    #[must_use]
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            service_name: service_name.into(),
        }
    }

    /// Parse a full resource path, e.g.
    /// `/subscriptions/{sub}/resourceGroups/{group}/providers/Microsoft.ApiManagement/service/{name}`.
    pub fn parse(id: &str) -> Result<Self, ParseError> {
        const KIND: &str = "service";
        let segments = path_segments(id);
        if segments.len() != 8 {
            return Err(ParseError::new(KIND, id, "expected 8 path segments"));
        }
        expect_segment(KIND, id, segments[0], "subscriptions")?;
        expect_segment(KIND, id, segments[2], "resourceGroups")?;
        expect_segment(KIND, id, segments[4], "providers")?;
        expect_segment(KIND, id, segments[5], "Microsoft.ApiManagement")?;
        expect_segment(KIND, id, segments[6], "service")?;
        Ok(Self::new(segments[1], segments[3], segments[7]))
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.ApiManagement/service/{}",
            self.subscription_id, self.resource_group, self.service_name
        )
    }
}

/// Identifier of a user assigned managed identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserAssignedIdentityId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl UserAssignedIdentityId {
    /// Parse a full resource path, e.g.
    /// `/subscriptions/{sub}/resourceGroups/{group}/providers/Microsoft.ManagedIdentity/userAssignedIdentities/{name}`.
    pub fn parse(id: &str) -> Result<Self, ParseError> {
        const KIND: &str = "user assigned identity";
        let segments = path_segments(id);
        if segments.len() != 8 {
            return Err(ParseError::new(KIND, id, "expected 8 path segments"));
        }
        expect_segment(KIND, id, segments[0], "subscriptions")?;
        expect_segment(KIND, id, segments[2], "resourceGroups")?;
        expect_segment(KIND, id, segments[4], "providers")?;
        expect_segment(KIND, id, segments[5], "Microsoft.ManagedIdentity")?;
        expect_segment(KIND, id, segments[6], "userAssignedIdentities")?;
        Ok(Self {
            subscription_id: segments[1].to_string(),
            resource_group: segments[3].to_string(),
            name: segments[7].to_string(),
        })
    }
}

impl fmt::Display for UserAssignedIdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.ManagedIdentity/userAssignedIdentities/{}",
            self.subscription_id, self.resource_group, self.name
        )
    }
}

/// Identifier of a soft-deleted service remnant. These live under the
/// subscription, keyed by the region the service was deployed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeletedServiceId {
    pub subscription_id: String,
    pub location: String,
    pub service_name: String,
}

impl DeletedServiceId {
    #[must_use]
    pub fn new(
        subscription_id: impl Into<String>,
        location: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            location: location.into(),
            service_name: service_name.into(),
        }
    }
}

impl fmt::Display for DeletedServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/providers/Microsoft.ApiManagement/locations/{}/deletedservices/{}",
            self.subscription_id, self.location, self.service_name
        )
    }
}

/// Canonical region spelling: display names like `West Europe` and
/// programmatic names like `westeurope` refer to the same region.
#[must_use]
pub fn normalize_location(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn path_segments(id: &str) -> Vec<&str> {
    id.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn expect_segment(
    kind: &'static str,
    id: &str,
    actual: &str,
    expected: &'static str,
) -> Result<(), ParseError> {
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(ParseError::new(kind, id, expected))
    }
}
