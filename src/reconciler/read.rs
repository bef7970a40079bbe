//! Read reconstruction.
//!
//! Rebuilds a document from the live service so it can be compared field by
//! field with a desired one. Values the control plane never returns, such
//! as certificate payloads and policy links, are carried forward from the
//! prior document.

use tracing::debug;

use crate::api::ControlPlaneClient;
use crate::document::ServiceDocument;
use crate::error::Error;
use crate::id::{normalize_location, ServiceId};
use crate::tier::Sku;

use super::{
    access, api_error, certificates, hostname, identity, network, policy, portal,
    properties, Reconciler,
};

pub(crate) async fn run<C: ControlPlaneClient>(
    reconciler: &Reconciler<C>,
    id: &ServiceId,
    prior: Option<&ServiceDocument>,
) -> Result<Option<ServiceDocument>, Error> {
    let client = reconciler.client();
    let Some(service) = client
        .get_service(id)
        .await
        .map_err(api_error("service.get", id))?
    else {
        debug!("service not found: {}", id);
        return Ok(None);
    };

    let sku = Sku {
        tier: service.sku.name,
        capacity: service.sku.capacity,
    };
    let capabilities = sku.tier.capabilities();
    let remote = &service.properties;

    let mut document = ServiceDocument {
        name: id.service_name.clone(),
        resource_group_name: id.resource_group.clone(),
        location: normalize_location(&service.location),
        publisher_name: remote.publisher_name.clone(),
        publisher_email: remote.publisher_email.clone(),
        sku_name: sku.to_string(),
        identity: identity::flatten(service.identity.as_ref(), id)?,
        notification_sender_email: remote
            .notification_sender_email
            .clone()
            .unwrap_or_default(),
        virtual_network_type: remote.virtual_network_type.unwrap_or_default(),
        virtual_network_configuration: network::flatten_configuration(
            remote.virtual_network_configuration.as_ref(),
        ),
        additional_location: network::flatten_additional_locations(
            &remote.additional_locations,
        ),
        certificate: certificates::flatten(
            &remote.certificates,
            prior.map(|p| p.certificate.as_slice()),
        ),
        client_certificate_enabled: remote.enable_client_certificate.unwrap_or_default(),
        gateway_disabled: remote.disable_gateway.unwrap_or_default(),
        min_api_version: remote
            .api_version_constraint
            .as_ref()
            .and_then(|constraint| constraint.min_api_version.clone())
            .unwrap_or_default(),
        zones: service.zones.clone().unwrap_or_default(),
        security: Some(properties::flatten_security(
            &remote.custom_properties,
            capabilities,
        )),
        protocols: Some(properties::flatten_protocols(&remote.custom_properties)),
        hostname_configuration: hostname::flatten(
            &remote.hostname_configurations,
            &id.service_name,
            &reconciler.environment.gateway_host_name_suffix,
            prior.and_then(|p| p.hostname_configuration.as_ref()),
        ),
        tags: service.tags.clone().unwrap_or_default(),
        gateway_url: remote.gateway_url.clone().unwrap_or_default(),
        gateway_regional_url: remote.gateway_regional_url.clone().unwrap_or_default(),
        management_api_url: remote.management_api_url.clone().unwrap_or_default(),
        portal_url: remote.portal_url.clone().unwrap_or_default(),
        developer_portal_url: remote.developer_portal_url.clone().unwrap_or_default(),
        scm_url: remote.scm_url.clone().unwrap_or_default(),
        public_ip_addresses: remote.public_ip_addresses.clone().unwrap_or_default(),
        private_ip_addresses: remote.private_ip_addresses.clone().unwrap_or_default(),
        ..ServiceDocument::default()
    };

    // The portal and tenant endpoints do not exist on Consumption.
    if capabilities.portal_settings {
        let sign_in = client
            .get_sign_in_settings(id)
            .await
            .map_err(api_error("signin.get", id))?;
        document.sign_in = Some(portal::flatten_sign_in(&sign_in));

        let sign_up = client
            .get_sign_up_settings(id)
            .await
            .map_err(api_error("signup.get", id))?;
        document.sign_up = Some(portal::flatten_sign_up(&sign_up));

        let secrets = client
            .get_tenant_access_secrets(id)
            .await
            .map_err(api_error("tenant_access.secrets", id))?;
        document.tenant_access = Some(access::flatten(&secrets));
    }

    let policy_resource = client
        .get_policy(id)
        .await
        .map_err(api_error("policy.get", id))?;
    document.policy = policy::flatten(
        policy_resource.as_ref(),
        prior.and_then(|p| p.policy.as_ref()),
    );

    Ok(Some(document))
}
