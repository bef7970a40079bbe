//! Wire types for the Azure Resource Manager API Management surface.
//!
//! These structs mirror the JSON bodies of api-version `2020-12-01` exactly;
//! everything here is camelCase on the wire and optional fields are omitted
//! rather than sent as `null`. Translation between these types and
//! [`ServiceDocument`](crate::document::ServiceDocument) lives in the
//! reconciler, not here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{IdentityType, StoreName, VirtualNetworkType};
use crate::tier::SkuTier;

// ============================================================================
// Service resource
// ============================================================================

/// An API Management service, the top level ARM resource.
///
/// `id` and `name` are response-only; requests address the service through
/// the URL instead.
///
/// API Reference: https://learn.microsoft.com/en-us/rest/api/apimanagement/api-management-service/create-or-update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    pub sku: ServiceSku,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ManagedIdentity>,
    /// Availability zones of the primary region. Premium only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
    pub properties: ServiceProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

/// Tier and unit count of a service or one of its regional deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSku {
    pub name: SkuTier,
    pub capacity: u32,
}

/// Managed identity block of a service.
///
/// `principalId` and `tenantId` are assigned by the platform and only appear
/// in responses. The values of `userAssignedIdentities` are empty objects in
/// requests; responses fill them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedIdentity {
    #[serde(rename = "type")]
    pub identity_type: IdentityType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub principal_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_assigned_identities: BTreeMap<String, UserAssignedIdentityValue>,
}

/// Response-only metadata of one user assigned identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentityValue {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub principal_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
}

/// Properties bag of the service resource.
///
/// The URL fields and the IP address lists are response-only and may be
/// `null` for tiers or states where the endpoint does not exist, hence the
/// `Option` wrappers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProperties {
    pub publisher_name: String,
    pub publisher_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_sender_email: Option<String>,
    /// Gateway feature flags, keyed by well-known property names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certificates: Vec<CertificateConfiguration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostname_configurations: Vec<HostnameConfiguration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_locations: Vec<AdditionalLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_type: Option<VirtualNetworkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_configuration: Option<VirtualNetworkConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version_constraint: Option<ApiVersionConstraint>,
    /// Only meaningful on the Consumption tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_client_certificate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_gateway: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_regional_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_portal_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_url: Option<String>,
    #[serde(
        rename = "publicIPAddresses",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_addresses: Option<Vec<String>>,
    #[serde(
        rename = "privateIPAddresses",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub private_ip_addresses: Option<Vec<String>>,
}

/// A CA certificate installed on the gateway.
///
/// `encodedCertificate` and `certificatePassword` are write-only; responses
/// return the parsed metadata under `certificate` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_password: Option<String>,
    pub store_name: StoreName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateInformation>,
}

/// Response-only metadata of an uploaded certificate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumbprint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,
}

/// One hostname bound to one service endpoint.
///
/// `type` is kept as a plain string so responses carrying endpoint kinds
/// introduced after this api-version still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostnameConfiguration {
    #[serde(rename = "type")]
    pub hostname_type: String,
    pub host_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ssl_binding: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negotiate_client_certificate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateInformation>,
}

/// A regional deployment of the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalLocation {
    pub location: String,
    pub sku: ServiceSku,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_configuration: Option<VirtualNetworkConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_regional_url: Option<String>,
    #[serde(
        rename = "publicIPAddresses",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_addresses: Option<Vec<String>>,
    #[serde(
        rename = "privateIPAddresses",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub private_ip_addresses: Option<Vec<String>>,
}

/// Subnet attachment of the service or a regional deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_resource_id: Option<String>,
}

/// Oldest management API version the service accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersionConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_api_version: Option<String>,
}

// ============================================================================
// Developer portal settings
// ============================================================================

/// Sign-in settings of the developer portal.
///
/// API Reference: https://learn.microsoft.com/en-us/rest/api/apimanagement/sign-in-settings/create-or-update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInSettingsResource {
    pub properties: SignInProperties,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInProperties {
    #[serde(default)]
    pub enabled: bool,
}

/// Sign-up settings of the developer portal.
///
/// API Reference: https://learn.microsoft.com/en-us/rest/api/apimanagement/sign-up-settings/create-or-update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpSettingsResource {
    pub properties: SignUpProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpProperties {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<TermsOfServiceContract>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsOfServiceContract {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub consent_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// ============================================================================
// Policy
// ============================================================================

/// The service-scoped policy document.
///
/// API Reference: https://learn.microsoft.com/en-us/rest/api/apimanagement/policy/create-or-update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResource {
    pub properties: PolicyProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyProperties {
    #[serde(default)]
    pub format: PolicyFormat,
    /// Policy XML, or a URL the control plane fetches it from when `format`
    /// is one of the link variants.
    pub value: String,
}

/// Encoding of the `value` field of a policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyFormat {
    /// Non-escaped XML document.
    #[default]
    #[serde(rename = "rawxml")]
    RawXml,
    /// URL of a non-escaped XML document.
    #[serde(rename = "rawxml-link")]
    RawXmlLink,
    /// XML document with policy expressions XML-escaped.
    #[serde(rename = "xml")]
    Xml,
    /// URL of an escaped XML document.
    #[serde(rename = "xml-link")]
    XmlLink,
}

// ============================================================================
// Tenant access
// ============================================================================

/// Update body for the tenant management API toggle, sent as a PATCH.
///
/// API Reference: https://learn.microsoft.com/en-us/rest/api/apimanagement/tenant-access/update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantAccessUpdate {
    pub properties: TenantAccessUpdateProperties,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantAccessUpdateProperties {
    pub enabled: bool,
}

/// Access keys of the tenant management API.
///
/// API Reference: https://learn.microsoft.com/en-us/rest/api/apimanagement/tenant-access/list-secrets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantAccessSecrets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_key: Option<String>,
}

// ============================================================================
// Soft delete
// ============================================================================

/// A soft-deleted service awaiting purge, addressed by location and name.
///
/// API Reference: https://learn.microsoft.com/en-us/rest/api/apimanagement/deleted-services/get-by-name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletedService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: DeletedServiceProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedServiceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_purge_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// ============================================================================
// Errors and long-running operations
// ============================================================================

/// Standard ARM error envelope.
///
/// API Reference: https://learn.microsoft.com/en-us/rest/api/apimanagement/api-management-service/create-or-update#errorresponse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Body of an `Azure-AsyncOperation` status endpoint.
///
/// API Reference: https://learn.microsoft.com/en-us/azure/azure-resource-manager/management/async-operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}
