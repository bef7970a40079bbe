//! # Service Documents
//!
//! The declarative document describing one API Management service. Documents
//! are authored as YAML, validated locally and reconciled against the control
//! plane; reads rebuild the same shape from the live service so a stored
//! document can be compared field by field with a fresh one.
//!
//! Field names, nesting and list-versus-object encoding are a compatibility
//! surface: existing documents must keep parsing as this crate evolves.
//! Fields marked `Computed` are filled in on reads and ignored on input.

pub mod validation;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declarative description of a single API Management service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceDocument {
    /// Service name. Also the first label of the default gateway hostname,
    /// so it must be globally unique.
    pub name: String,
    /// Resource group that owns the service.
    pub resource_group_name: String,
    /// Primary region. Display names (`West Europe`) and programmatic names
    /// (`westeurope`) are both accepted.
    pub location: String,
    /// Display name of the API publisher.
    pub publisher_name: String,
    /// Contact address of the API publisher.
    pub publisher_email: String,
    /// Tier and unit count, written as `{tier}_{capacity}`, e.g. `Developer_1`.
    pub sku_name: String,

    /// Managed identity attached to the service. Omitting the block detaches
    /// every identity on the next apply.
    #[serde(default)]
    pub identity: Option<Identity>,
    /// Address platform notifications are sent from.
    #[serde(default)]
    pub notification_sender_email: String,
    /// How the service attaches to a virtual network.
    #[serde(default)]
    pub virtual_network_type: VirtualNetworkType,
    /// Subnet attachment, required whenever `virtual_network_type` is not
    /// `None`.
    #[serde(default)]
    pub virtual_network_configuration: Option<VirtualNetworkConfiguration>,
    /// Secondary regions the service is also deployed into.
    #[serde(default)]
    pub additional_location: Vec<AdditionalLocation>,
    /// CA certificates installed on the gateway, at most ten.
    #[serde(default)]
    pub certificate: Vec<Certificate>,
    /// Require client certificates on gateway requests. Consumption only;
    /// dedicated tiers configure this per hostname instead.
    #[serde(default)]
    pub client_certificate_enabled: bool,
    /// Take the primary region's gateway out of rotation. Requires at least
    /// one `additional_location` to keep serving traffic.
    #[serde(default)]
    pub gateway_disabled: bool,
    /// Oldest management API version the service accepts, e.g. `2019-12-01`.
    #[serde(default)]
    pub min_api_version: String,
    /// Availability zones for the primary region. Premium only.
    #[serde(default)]
    pub zones: Vec<String>,
    /// TLS, SSL and cipher suite toggles.
    #[serde(default)]
    pub security: Option<SecuritySettings>,
    /// Gateway protocol toggles.
    #[serde(default)]
    pub protocols: Option<ProtocolSettings>,
    /// Custom hostnames bound to the service endpoints.
    #[serde(default)]
    pub hostname_configuration: Option<HostnameConfiguration>,
    /// Service-scoped policy document.
    #[serde(default)]
    pub policy: Option<Policy>,
    /// Developer portal sign-in settings. Not available on Consumption.
    #[serde(default)]
    pub sign_in: Option<SignInSettings>,
    /// Developer portal sign-up settings. Not available on Consumption.
    #[serde(default)]
    pub sign_up: Option<SignUpSettings>,
    /// Management API access keys. Not available on Consumption.
    #[serde(default)]
    pub tenant_access: Option<TenantAccess>,
    /// Free-form resource tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Default gateway endpoint. Computed.
    #[serde(default)]
    pub gateway_url: String,
    /// Gateway endpoint of the primary region. Computed.
    #[serde(default)]
    pub gateway_regional_url: String,
    /// Management API endpoint. Computed.
    #[serde(default)]
    pub management_api_url: String,
    /// Legacy publisher portal endpoint. Computed.
    #[serde(default)]
    pub portal_url: String,
    /// Developer portal endpoint. Computed.
    #[serde(default)]
    pub developer_portal_url: String,
    /// Git configuration endpoint. Computed.
    #[serde(default)]
    pub scm_url: String,
    /// Public IPs of the service in the primary region. Computed.
    #[serde(default)]
    pub public_ip_addresses: Vec<String>,
    /// Private IPs of the service, populated for internal virtual network
    /// deployments. Computed.
    #[serde(default)]
    pub private_ip_addresses: Vec<String>,
}

/// Kind of managed identity attached to a service.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum IdentityType {
    #[default]
    None,
    SystemAssigned,
    UserAssigned,
    #[serde(rename = "SystemAssigned, UserAssigned")]
    SystemAssignedUserAssigned,
}

impl IdentityType {
    /// Canonical wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::SystemAssigned => "SystemAssigned",
            Self::UserAssigned => "UserAssigned",
            Self::SystemAssignedUserAssigned => "SystemAssigned, UserAssigned",
        }
    }

    /// True when the kind carries user assigned identities.
    #[must_use]
    pub const fn includes_user_assigned(self) -> bool {
        matches!(self, Self::UserAssigned | Self::SystemAssignedUserAssigned)
    }

    /// True when the kind carries a system assigned identity.
    #[must_use]
    pub const fn includes_system_assigned(self) -> bool {
        matches!(self, Self::SystemAssigned | Self::SystemAssignedUserAssigned)
    }
}

impl fmt::Display for IdentityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Managed identity attached to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Identity {
    /// Kind of managed identity.
    #[serde(rename = "type", default)]
    pub identity_type: IdentityType,
    /// User assigned identity ids. Required when `type` includes
    /// `UserAssigned`, forbidden otherwise.
    #[serde(default)]
    pub identity_ids: BTreeSet<String>,
    /// Object id of the system assigned identity. Computed.
    #[serde(default)]
    pub principal_id: String,
    /// Tenant hosting the system assigned identity. Computed.
    #[serde(default)]
    pub tenant_id: String,
}

/// How a service attaches to a virtual network.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum VirtualNetworkType {
    /// Not attached to any virtual network.
    #[default]
    None,
    /// Deployed inside a subnet but reachable from the public internet.
    External,
    /// Reachable only from inside the virtual network.
    Internal,
}

impl VirtualNetworkType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::External => "External",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for VirtualNetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subnet attachment for the service or one of its regional deployments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VirtualNetworkConfiguration {
    /// Resource id of the subnet delegated to the service.
    pub subnet_id: String,
}

/// Secondary region the service is deployed into. Regional deployments
/// share the tier and capacity of the service itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AdditionalLocation {
    /// Region name.
    pub location: String,
    /// Subnet of the regional gateway. Must be present exactly when the
    /// service itself has a `virtual_network_configuration`.
    #[serde(default)]
    pub virtual_network_configuration: Option<VirtualNetworkConfiguration>,
    /// Gateway endpoint of this region. Computed.
    #[serde(default)]
    pub gateway_regional_url: String,
    /// Public IPs of the regional gateway. Computed.
    #[serde(default)]
    pub public_ip_addresses: Vec<String>,
    /// Private IPs of the regional gateway. Computed.
    #[serde(default)]
    pub private_ip_addresses: Vec<String>,
}

/// Certificate store a CA certificate is installed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum StoreName {
    CertificateAuthority,
    Root,
}

impl Default for StoreName {
    fn default() -> Self {
        Self::CertificateAuthority
    }
}

/// CA certificate installed on the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Certificate {
    /// Base64-encoded pfx or cer payload. The control plane never returns
    /// it; reads carry it forward from the prior document.
    #[serde(default)]
    pub encoded_certificate: String,
    /// Password protecting the payload, empty for cer certificates. Carried
    /// forward like `encoded_certificate`.
    #[serde(default)]
    pub certificate_password: String,
    /// Store the certificate is installed into.
    pub store_name: StoreName,
    /// Expiry reported by the control plane, RFC 3339. Computed.
    #[serde(default)]
    pub expiry: String,
    /// Subject reported by the control plane. Computed.
    #[serde(default)]
    pub subject: String,
    /// Thumbprint reported by the control plane. Computed.
    #[serde(default)]
    pub thumbprint: String,
}

/// TLS, SSL and cipher suite toggles for gateway connections.
///
/// Frontend toggles govern client-to-gateway traffic, backend toggles govern
/// gateway-to-backend traffic. Frontend SSL 3.0, Triple DES and the named
/// cipher suites cannot be configured on the Consumption tier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default)]
pub struct SecuritySettings {
    pub enable_backend_ssl30: bool,
    pub enable_backend_tls10: bool,
    pub enable_backend_tls11: bool,
    pub enable_frontend_ssl30: bool,
    pub enable_frontend_tls10: bool,
    pub enable_frontend_tls11: bool,
    /// Replaces the retired `enable_triple_des_ciphers` name, which is still
    /// accepted on input. Supplying both spellings is a parse error.
    #[serde(alias = "enable_triple_des_ciphers")]
    pub triple_des_ciphers_enabled: bool,
    pub tls_ecdhe_ecdsa_with_aes256_cbc_sha_ciphers_enabled: bool,
    pub tls_ecdhe_ecdsa_with_aes128_cbc_sha_ciphers_enabled: bool,
    pub tls_ecdhe_rsa_with_aes256_cbc_sha_ciphers_enabled: bool,
    pub tls_ecdhe_rsa_with_aes128_cbc_sha_ciphers_enabled: bool,
    pub tls_rsa_with_aes128_gcm_sha256_ciphers_enabled: bool,
    pub tls_rsa_with_aes256_cbc_sha256_ciphers_enabled: bool,
    pub tls_rsa_with_aes128_cbc_sha256_ciphers_enabled: bool,
    pub tls_rsa_with_aes256_cbc_sha_ciphers_enabled: bool,
    pub tls_rsa_with_aes128_cbc_sha_ciphers_enabled: bool,
}

/// Gateway protocol toggles.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default)]
pub struct ProtocolSettings {
    /// Accept HTTP/2 on client connections.
    pub enable_http2: bool,
}

/// Custom hostnames bound to the service endpoints, one list per endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HostnameConfiguration {
    pub management: Vec<HostnameBinding>,
    pub portal: Vec<HostnameBinding>,
    pub developer_portal: Vec<HostnameBinding>,
    pub proxy: Vec<ProxyHostnameBinding>,
    pub scm: Vec<HostnameBinding>,
}

/// A custom hostname bound to one service endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HostnameBinding {
    /// Fully qualified hostname.
    pub host_name: String,
    /// Base64-encoded pfx served for this hostname. The control plane never
    /// returns it; reads carry it forward from the prior document.
    pub certificate: String,
    /// Password for the pfx. Carried forward like `certificate`.
    pub certificate_password: String,
    /// Key vault secret id supplying the certificate, as an alternative to
    /// an inline `certificate`.
    pub key_vault_id: String,
    /// Request a client certificate during the TLS handshake.
    pub negotiate_client_certificate: bool,
    /// Certificate expiry reported by the control plane, RFC 3339. Computed.
    pub expiry: String,
    /// Certificate subject reported by the control plane. Computed.
    pub subject: String,
    /// Certificate thumbprint reported by the control plane. Computed.
    pub thumbprint: String,
}

/// Gateway hostname binding. The gateway additionally picks a certificate
/// for clients that do not send SNI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProxyHostnameBinding {
    #[serde(flatten)]
    pub binding: HostnameBinding,
    /// Serve this binding's certificate when the client does not send SNI.
    pub default_ssl_binding: bool,
}

/// Service-scoped policy document.
///
/// Exactly one of `xml_content` and `xml_link` must be set. When both are
/// set the inline content wins. The link is only a fetch instruction for
/// the control plane: reads return the fetched content as `xml_content`
/// and carry the link forward from the prior document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Policy {
    /// Inline policy XML.
    pub xml_content: String,
    /// URL the control plane fetches the policy XML from.
    pub xml_link: String,
}

/// Developer portal sign-in settings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default)]
pub struct SignInSettings {
    /// Require sign-in before the developer portal can be browsed.
    pub enabled: bool,
}

/// Developer portal sign-up settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SignUpSettings {
    /// Allow visitors to sign themselves up through the developer portal.
    pub enabled: bool,
    /// Terms of service presented during sign-up.
    pub terms_of_service: TermsOfService,
}

/// Terms of service presented during developer sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TermsOfService {
    /// Show the terms during sign-up.
    pub enabled: bool,
    /// Require the terms to be accepted before the account is created.
    pub consent_required: bool,
    /// The terms text itself.
    pub text: String,
}

/// Management API access for the tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TenantAccess {
    /// Expose the tenant management API and its access keys.
    pub enabled: bool,
    /// Identifier of the access contract. Computed.
    pub tenant_id: String,
    /// Primary access key. Computed.
    pub primary_key: String,
    /// Secondary access key. Computed.
    pub secondary_key: String,
}
