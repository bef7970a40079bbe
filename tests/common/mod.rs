//! In-memory control plane used by the reconciliation tests.
//!
//! Mimics the observable behaviour of the API Management surface: mutations
//! return pollable operations, write-only payloads are scrubbed from
//! responses, the platform injects the default gateway hostname entry and a
//! delete leaves a soft-deleted remnant behind. Tests can inject failures
//! per operation and inspect which calls a flow made, in order.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use api_management_controller::api::models::{
    CertificateInformation, DeletedService, DeletedServiceProperties, HostnameConfiguration,
    PolicyFormat, PolicyProperties, PolicyResource, ServiceResource, SignInSettingsResource,
    SignUpSettingsResource, TenantAccessSecrets, TenantAccessUpdate, UserAssignedIdentityValue,
};
use api_management_controller::api::{ApiError, ControlPlaneClient, Operation};
use api_management_controller::document::VirtualNetworkType;
use api_management_controller::id::{DeletedServiceId, ServiceId};

const GATEWAY_SUFFIX: &str = "azure-api.net";

/// XML the fake pretends to fetch when a policy is set through a link.
pub const LINKED_POLICY_XML: &str = "<policies>\n  <inbound />\n</policies>";

#[derive(Debug, Default)]
struct RemoteState {
    service: Option<ServiceResource>,
    sign_in: SignInSettingsResource,
    sign_up: SignUpSettingsResource,
    policy: Option<PolicyResource>,
    tenant_access_enabled: bool,
    /// Location and name of the soft-deleted remnant.
    deleted: Option<(String, String)>,
}

/// In-memory stand-in for the ARM control plane.
#[derive(Debug, Default)]
pub struct FakeControlPlane {
    state: Mutex<RemoteState>,
    failures: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
    waits_stall: AtomicBool,
}

impl FakeControlPlane {
    /// Make `operation` fail with an injected HTTP 500 until cleared.
    pub fn fail_on(&self, operation: &'static str) {
        self.failures
            .lock()
            .expect("failures lock poisoned")
            .insert(operation);
    }

    pub fn clear_failures(&self) {
        self.failures
            .lock()
            .expect("failures lock poisoned")
            .clear();
    }

    /// Make every subsequent wait block far beyond any test deadline.
    pub fn stall_waits(&self) {
        self.waits_stall.store(true, Ordering::SeqCst);
    }

    /// Operations invoked so far, in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// The stored service, as the control plane would return it.
    pub fn service(&self) -> Option<ServiceResource> {
        self.state().service.clone()
    }

    pub fn tenant_access_enabled(&self) -> bool {
        self.state().tenant_access_enabled
    }

    fn state(&self) -> MutexGuard<'_, RemoteState> {
        self.state.lock().expect("state lock poisoned")
    }

    fn enter(&self, operation: &'static str) -> Result<(), ApiError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(operation);
        if self
            .failures
            .lock()
            .expect("failures lock poisoned")
            .contains(operation)
        {
            return Err(ApiError::Status {
                operation,
                status: 500,
                code: "InternalServerError".to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ControlPlaneClient for FakeControlPlane {
    async fn create_or_update_service(
        &self,
        id: &ServiceId,
        service: &ServiceResource,
    ) -> Result<Operation, ApiError> {
        self.enter("service.create_or_update")?;
        self.state().service = Some(materialize(id, service));
        Ok(pending())
    }

    async fn get_service(&self, _id: &ServiceId) -> Result<Option<ServiceResource>, ApiError> {
        self.enter("service.get")?;
        Ok(self.state().service.clone())
    }

    async fn delete_service(&self, id: &ServiceId) -> Result<Operation, ApiError> {
        self.enter("service.delete")?;
        let mut state = self.state();
        let Some(service) = state.service.take() else {
            return Err(ApiError::NotFound {
                operation: "service.delete",
            });
        };
        state.deleted = Some((service.location.clone(), id.service_name.clone()));
        Ok(pending())
    }

    async fn wait(&self, _operation: &Operation) -> Result<(), ApiError> {
        self.enter("operation.poll")?;
        if self.waits_stall.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
        }
        Ok(())
    }

    async fn set_sign_in_settings(
        &self,
        _id: &ServiceId,
        settings: &SignInSettingsResource,
    ) -> Result<(), ApiError> {
        self.enter("signin.set")?;
        self.state().sign_in = settings.clone();
        Ok(())
    }

    async fn get_sign_in_settings(
        &self,
        _id: &ServiceId,
    ) -> Result<SignInSettingsResource, ApiError> {
        self.enter("signin.get")?;
        Ok(self.state().sign_in.clone())
    }

    async fn set_sign_up_settings(
        &self,
        _id: &ServiceId,
        settings: &SignUpSettingsResource,
    ) -> Result<(), ApiError> {
        self.enter("signup.set")?;
        self.state().sign_up = settings.clone();
        Ok(())
    }

    async fn get_sign_up_settings(
        &self,
        _id: &ServiceId,
    ) -> Result<SignUpSettingsResource, ApiError> {
        self.enter("signup.get")?;
        Ok(self.state().sign_up.clone())
    }

    async fn set_policy(
        &self,
        _id: &ServiceId,
        policy: &PolicyResource,
    ) -> Result<(), ApiError> {
        self.enter("policy.set")?;
        // Link formats are fetched by the platform; reads in rawxml form
        // then return the fetched content, never the link.
        let value = match policy.properties.format {
            PolicyFormat::RawXmlLink | PolicyFormat::XmlLink => LINKED_POLICY_XML.to_string(),
            PolicyFormat::RawXml | PolicyFormat::Xml => policy.properties.value.clone(),
        };
        self.state().policy = Some(PolicyResource {
            properties: PolicyProperties {
                format: PolicyFormat::RawXml,
                value,
            },
        });
        Ok(())
    }

    async fn get_policy(&self, _id: &ServiceId) -> Result<Option<PolicyResource>, ApiError> {
        self.enter("policy.get")?;
        Ok(self.state().policy.clone())
    }

    async fn delete_policy(&self, _id: &ServiceId) -> Result<(), ApiError> {
        self.enter("policy.delete")?;
        if self.state().policy.take().is_none() {
            return Err(ApiError::NotFound {
                operation: "policy.delete",
            });
        }
        Ok(())
    }

    async fn update_tenant_access(
        &self,
        _id: &ServiceId,
        update: &TenantAccessUpdate,
    ) -> Result<(), ApiError> {
        self.enter("tenant_access.update")?;
        self.state().tenant_access_enabled = update.properties.enabled;
        Ok(())
    }

    async fn get_tenant_access_secrets(
        &self,
        id: &ServiceId,
    ) -> Result<TenantAccessSecrets, ApiError> {
        self.enter("tenant_access.secrets")?;
        Ok(TenantAccessSecrets {
            id: Some(format!("{id}/tenant/access")),
            enabled: self.state().tenant_access_enabled,
            primary_key: Some("cHJpbWFyeS1rZXktbWF0ZXJpYWw=".to_string()),
            secondary_key: Some("c2Vjb25kYXJ5LWtleS1tYXRlcmlhbA==".to_string()),
        })
    }

    async fn get_deleted_service(
        &self,
        id: &DeletedServiceId,
    ) -> Result<Option<DeletedService>, ApiError> {
        self.enter("deleted_service.get")?;
        let state = self.state();
        let matches = state.deleted.as_ref().is_some_and(|(location, name)| {
            location.eq_ignore_ascii_case(&id.location) && *name == id.service_name
        });
        Ok(matches.then(|| DeletedService {
            id: Some(id.to_string()),
            name: Some(id.service_name.clone()),
            properties: DeletedServiceProperties {
                service_id: None,
                scheduled_purge_date: Some(
                    Utc.with_ymd_and_hms(2026, 9, 20, 0, 0, 0).unwrap(),
                ),
                deletion_date: Some(Utc.with_ymd_and_hms(2026, 8, 21, 0, 0, 0).unwrap()),
                location: Some(id.location.clone()),
            },
        }))
    }

    async fn purge_deleted_service(
        &self,
        id: &DeletedServiceId,
    ) -> Result<Operation, ApiError> {
        self.enter("deleted_service.purge")?;
        let mut state = self.state();
        let matches = state.deleted.as_ref().is_some_and(|(location, name)| {
            location.eq_ignore_ascii_case(&id.location) && *name == id.service_name
        });
        if !matches {
            return Err(ApiError::NotFound {
                operation: "deleted_service.purge",
            });
        }
        state.deleted = None;
        Ok(pending())
    }
}

fn pending() -> Operation {
    Operation {
        status_url: Some(
            "https://management.azure.com/operationresults/op-1?api-version=2020-12-01"
                .to_string(),
        ),
    }
}

/// Fills in everything the platform computes on a create or update and
/// scrubs the write-only payloads out of the stored definition.
fn materialize(id: &ServiceId, requested: &ServiceResource) -> ServiceResource {
    let mut service = requested.clone();
    let host = id.service_name.to_lowercase();
    service.id = Some(id.to_string());
    service.name = Some(id.service_name.clone());

    if let Some(identity) = service.identity.as_mut() {
        if identity.identity_type.includes_system_assigned() {
            identity.principal_id = "10000000-0000-4000-8000-000000000001".to_string();
            identity.tenant_id = "20000000-0000-4000-8000-000000000002".to_string();
        }
        for (index, value) in identity.user_assigned_identities.values_mut().enumerate() {
            *value = UserAssignedIdentityValue {
                principal_id: format!("30000000-0000-4000-8000-{:012}", index + 1),
                client_id: format!("40000000-0000-4000-8000-{:012}", index + 1),
            };
        }
    }

    let properties = &mut service.properties;
    properties.provisioning_state = Some("Succeeded".to_string());
    properties.gateway_url = Some(format!("https://{host}.{GATEWAY_SUFFIX}"));
    properties.gateway_regional_url = Some(format!(
        "https://{host}-{}-01.regional.{GATEWAY_SUFFIX}",
        service.location
    ));
    properties.management_api_url = Some(format!("https://{host}.management.{GATEWAY_SUFFIX}"));
    properties.portal_url = Some(format!("https://{host}.portal.{GATEWAY_SUFFIX}"));
    properties.developer_portal_url =
        Some(format!("https://{host}.developer.{GATEWAY_SUFFIX}"));
    properties.scm_url = Some(format!("https://{host}.scm.{GATEWAY_SUFFIX}"));
    properties.public_ip_addresses = Some(vec!["203.0.113.10".to_string()]);
    if properties.virtual_network_type == Some(VirtualNetworkType::Internal) {
        properties.private_ip_addresses = Some(vec!["10.1.0.4".to_string()]);
    }

    for (index, certificate) in properties.certificates.iter_mut().enumerate() {
        certificate.encoded_certificate = None;
        certificate.certificate_password = None;
        certificate.certificate = Some(certificate_information(index));
    }

    for (index, entry) in properties.hostname_configurations.iter_mut().enumerate() {
        let had_payload = entry.encoded_certificate.take().is_some();
        entry.certificate_password = None;
        if had_payload || entry.key_vault_id.is_some() {
            entry.certificate = Some(certificate_information(index));
        }
    }
    let default_is_primary = !properties
        .hostname_configurations
        .iter()
        .any(|entry| entry.default_ssl_binding == Some(true));
    properties.hostname_configurations.insert(
        0,
        HostnameConfiguration {
            hostname_type: "Proxy".to_string(),
            host_name: format!("{host}.{GATEWAY_SUFFIX}"),
            default_ssl_binding: Some(default_is_primary),
            negotiate_client_certificate: Some(false),
            ..HostnameConfiguration::default()
        },
    );

    for location in &mut properties.additional_locations {
        let region = location.location.to_lowercase().replace(' ', "");
        location.gateway_regional_url = Some(format!(
            "https://{host}-{region}-01.regional.{GATEWAY_SUFFIX}"
        ));
        location.public_ip_addresses = Some(vec!["203.0.113.11".to_string()]);
    }

    service
}

fn certificate_information(index: usize) -> CertificateInformation {
    CertificateInformation {
        expiry: Some(Utc.with_ymd_and_hms(2027, 3, 14, 9, 26, 53).unwrap()),
        thumbprint: format!("5C1E9B5D2A40C7F5B2E8D1A6F3C9074E1B5D2A{index:02}"),
        subject: "CN=gateway.example.com".to_string(),
    }
}
