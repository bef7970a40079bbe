//! # Error Types
//!
//! Errors split along one line: [`ValidationError`] covers everything that
//! can be decided from the document alone and is always raised before the
//! first control-plane call; [`Error`] wraps validation plus the remote
//! failures that can only happen once requests start flowing.

use thiserror::Error;

use crate::api::ApiError;
use crate::document::{IdentityType, VirtualNetworkType};
use crate::id::ParseError;
use crate::tier::InvalidSkuName;

/// Top-level reconciler error.
#[derive(Debug, Error)]
pub enum Error {
    /// The document failed local validation. No remote call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A control-plane request failed.
    #[error("{operation} for {resource} failed: {source}")]
    Api {
        operation: &'static str,
        resource: String,
        #[source]
        source: ApiError,
    },

    /// A service with this id is already live but no prior document tracks
    /// it. Overwriting it could silently adopt somebody else's resource.
    #[error("service {resource} already exists and must be imported before it can be managed")]
    AlreadyExists { resource: String },

    /// Waiting on a long-running operation outlived the caller's deadline.
    #[error("{operation} for {resource} did not reach a terminal state before the deadline")]
    DeadlineExceeded {
        operation: &'static str,
        resource: String,
    },

    /// The service disappeared between mutating it and reading it back.
    #[error("service {resource} was not found after it was reconciled")]
    Vanished { resource: String },

    /// The control plane returned a user assigned identity reference that
    /// could not be parsed.
    #[error("reading identity of {resource}: {source}")]
    Identity {
        resource: String,
        #[source]
        source: ParseError,
    },
}

impl Error {
    /// True when the underlying failure is the resource not existing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { source, .. } if source.is_not_found())
    }
}

/// A problem with the document itself, detected before any remote call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Service names become the first label of the default gateway hostname,
    /// so the control plane restricts them to DNS-compatible characters.
    #[error("`name` {0:?} is invalid: 1-50 letters, digits and hyphens, starting with a letter and ending with a letter or digit")]
    ServiceName(String),

    #[error("`location` must not be empty")]
    LocationMissing,

    #[error("`publisher_name` must be between 1 and 100 characters")]
    PublisherName,

    #[error("`publisher_email` {0:?} is not a valid email address")]
    PublisherEmail(String),

    #[error(transparent)]
    Sku(#[from] InvalidSkuName),

    #[error("`certificate` supports a maximum of 10 blocks, got {0}")]
    CertificateCount(usize),

    #[error("`certificate.{index}.encoded_certificate` is not valid base64")]
    CertificateEncoding { index: usize },

    #[error("`identity_ids` must contain at least one id when `type` includes `UserAssigned`")]
    IdentityIdsMissing,

    #[error("`identity_ids` cannot be set when `type` is `{0}`")]
    IdentityIdsNotAllowed(IdentityType),

    #[error("`virtual_network_configuration` is required when `virtual_network_type` is `{0}`")]
    VirtualNetworkConfigurationMissing(VirtualNetworkType),

    #[error("`virtual_network_configuration` must be set for every `additional_location` when it is set on the service")]
    AdditionalLocationSubnetMissing,

    #[error("`virtual_network_configuration` cannot be set on an `additional_location` unless it is also set on the service")]
    AdditionalLocationSubnetNotAllowed,

    #[error("`client_certificate_enabled` is only supported on the Consumption tier")]
    ClientCertificateTier,

    #[error("`gateway_disabled` requires at least one `additional_location`")]
    GatewayDisabledWithoutLocations,

    #[error("`zones` is only supported on the Premium tier")]
    ZonesTier,

    #[error("`{0}` is not supported on the Consumption tier")]
    BlockNotSupportedOnConsumption(&'static str),

    /// Every offending toggle is listed, not just the first one found.
    #[error("`security` toggles not supported on the Consumption tier: {}", .0.join(", "))]
    CiphersNotSupportedOnConsumption(Vec<&'static str>),

    #[error("either `xml_content` or `xml_link` must be set when the `policy` block is defined")]
    PolicyContentMissing,

    /// A validation pattern failed to compile. Never expected at runtime.
    #[error("validation pattern could not be compiled: {0}")]
    Pattern(String),
}
