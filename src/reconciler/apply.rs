//! Create and update orchestration.
//!
//! An apply validates the document, pushes the service definition, then
//! brings the service-scoped side resources in line and finally reads the
//! whole service back so the caller always receives a fully populated
//! document. Side resources are only touched when their block changed,
//! except the developer portal settings, which are cheap and written
//! unconditionally on tiers that have them.

use tokio::time::Instant;
use tracing::{debug, info};

use crate::api::{models, ControlPlaneClient};
use crate::document::{validation, ServiceDocument};
use crate::error::{Error, ValidationError};
use crate::id::{normalize_location, ServiceId};
use crate::tier::{Sku, SkuTier};

use super::{
    access, api_error, certificates, hostname, identity, network, policy, portal,
    properties, read, wait_with_deadline, Reconciler,
};

pub(crate) async fn run<C: ControlPlaneClient>(
    reconciler: &Reconciler<C>,
    desired: &ServiceDocument,
    prior: Option<&ServiceDocument>,
    deadline: Instant,
) -> Result<ServiceDocument, Error> {
    let sku = validate(desired)?;
    let service = build_service(desired, &sku)?;
    let id = reconciler.service_id(desired);
    let client = reconciler.client();

    if prior.is_none() {
        // Refuse to adopt a service this reconciler did not create.
        let existing = client
            .get_service(&id)
            .await
            .map_err(api_error("service.get", &id))?;
        if existing.is_some() {
            return Err(Error::AlreadyExists {
                resource: id.to_string(),
            });
        }
        info!("Creating API Management service: {}", id);
    } else {
        info!("Updating API Management service: {}", id);
    }

    let operation = client
        .create_or_update_service(&id, &service)
        .await
        .map_err(api_error("service.create_or_update", &id))?;
    wait_with_deadline(client, &operation, deadline, "service.create_or_update", &id)
        .await?;

    if sku.tier != SkuTier::Consumption {
        let sign_in = portal::expand_sign_in(desired.sign_in.as_ref());
        client
            .set_sign_in_settings(&id, &sign_in)
            .await
            .map_err(api_error("signin.set", &id))?;

        let sign_up = portal::expand_sign_up(desired.sign_up.as_ref());
        client
            .set_sign_up_settings(&id, &sign_up)
            .await
            .map_err(api_error("signup.set", &id))?;
    }

    if policy_changed(desired, prior) {
        sync_policy(client, &id, desired).await?;
    } else {
        debug!("policy unchanged, skipping sync");
    }

    if sku.tier != SkuTier::Consumption && tenant_access_changed(desired, prior) {
        let access_block = desired.tenant_access.clone().unwrap_or_default();
        let update = access::expand(&access_block);
        client
            .update_tenant_access(&id, &update)
            .await
            .map_err(api_error("tenant_access.update", &id))?;
    }

    match read::run(reconciler, &id, Some(desired)).await? {
        Some(document) => Ok(document),
        None => Err(Error::Vanished {
            resource: id.to_string(),
        }),
    }
}

/// Full document validation, including the rules that depend on the tier.
/// Nothing may touch the network before this passes.
fn validate(document: &ServiceDocument) -> Result<Sku, ValidationError> {
    validation::validate(document)?;
    let sku: Sku = document.sku_name.parse()?;
    let capabilities = sku.tier.capabilities();

    network::check_attachment(
        document.virtual_network_type,
        document.virtual_network_configuration.as_ref(),
    )?;
    if document.client_certificate_enabled && !capabilities.client_certificate_toggle {
        return Err(ValidationError::ClientCertificateTier);
    }
    if document.gateway_disabled && document.additional_location.is_empty() {
        return Err(ValidationError::GatewayDisabledWithoutLocations);
    }
    if !document.zones.is_empty() && !capabilities.availability_zones {
        return Err(ValidationError::ZonesTier);
    }
    if !capabilities.portal_settings {
        if document.sign_in.is_some() {
            return Err(ValidationError::BlockNotSupportedOnConsumption("sign_in"));
        }
        if document.sign_up.is_some() {
            return Err(ValidationError::BlockNotSupportedOnConsumption("sign_up"));
        }
        if document.tenant_access.is_some() {
            return Err(ValidationError::BlockNotSupportedOnConsumption(
                "tenant_access",
            ));
        }
    }
    properties::check_gated_toggles(document.security.as_ref(), capabilities)?;
    if let Some(policy) = document.policy.as_ref() {
        policy::expand(policy)?;
    }
    Ok(sku)
}

/// Expands the whole document into the service PUT body.
fn build_service(
    document: &ServiceDocument,
    sku: &Sku,
) -> Result<models::ServiceResource, ValidationError> {
    let capabilities = sku.tier.capabilities();
    let wire_sku = models::ServiceSku {
        name: sku.tier,
        capacity: sku.capacity,
    };
    let identity = identity::expand(document.identity.as_ref())?;
    let properties = models::ServiceProperties {
        publisher_name: document.publisher_name.clone(),
        publisher_email: document.publisher_email.clone(),
        notification_sender_email: (!document.notification_sender_email.is_empty())
            .then(|| document.notification_sender_email.clone()),
        custom_properties: properties::expand(
            document.security.as_ref(),
            document.protocols.as_ref(),
            capabilities,
        ),
        certificates: certificates::expand(&document.certificate),
        hostname_configurations: hostname::expand(document.hostname_configuration.as_ref()),
        additional_locations: network::expand_additional_locations(document, wire_sku)?,
        virtual_network_type: Some(document.virtual_network_type),
        virtual_network_configuration: network::expand_configuration(
            document.virtual_network_configuration.as_ref(),
        ),
        api_version_constraint: (!document.min_api_version.is_empty()).then(|| {
            models::ApiVersionConstraint {
                min_api_version: Some(document.min_api_version.clone()),
            }
        }),
        enable_client_certificate: (sku.tier == SkuTier::Consumption)
            .then_some(document.client_certificate_enabled),
        disable_gateway: Some(document.gateway_disabled),
        ..models::ServiceProperties::default()
    };
    Ok(models::ServiceResource {
        id: None,
        name: None,
        location: normalize_location(&document.location),
        sku: wire_sku,
        identity: Some(identity),
        zones: (!document.zones.is_empty()).then(|| document.zones.clone()),
        properties,
        tags: (!document.tags.is_empty()).then(|| document.tags.clone()),
    })
}

fn policy_changed(desired: &ServiceDocument, prior: Option<&ServiceDocument>) -> bool {
    match (desired.policy.as_ref(), prior) {
        (None, None) => false,
        (Some(_), None) => true,
        (Some(desired_policy), Some(prior_document)) => {
            policy::changed(desired_policy, prior_document.policy.as_ref())
        }
        (None, Some(prior_document)) => prior_document.policy.is_some(),
    }
}

fn tenant_access_changed(desired: &ServiceDocument, prior: Option<&ServiceDocument>) -> bool {
    let desired_state = desired.tenant_access.as_ref().map(|access| access.enabled);
    let prior_state = prior
        .and_then(|document| document.tenant_access.as_ref())
        .map(|access| access.enabled);
    desired_state != prior_state
}

/// The policy endpoint cannot update in place, so a change always deletes
/// the old document first, tolerating it not existing yet.
async fn sync_policy<C: ControlPlaneClient>(
    client: &C,
    id: &ServiceId,
    desired: &ServiceDocument,
) -> Result<(), Error> {
    match client.delete_policy(id).await {
        Ok(()) => {}
        Err(error) if error.is_not_found() => {}
        Err(source) => return Err(api_error("policy.delete", id)(source)),
    }
    if let Some(block) = desired.policy.as_ref() {
        let resource = policy::expand(block)?;
        client
            .set_policy(id, &resource)
            .await
            .map_err(api_error("policy.set", id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        Policy, SecuritySettings, SignInSettings, SignUpSettings, TenantAccess,
    };

    fn base_document(sku_name: &str) -> ServiceDocument {
        ServiceDocument {
            name: "example-apim".to_string(),
            resource_group_name: "platform-rg".to_string(),
            location: "westeurope".to_string(),
            publisher_name: "Example Corp".to_string(),
            publisher_email: "apis@example.com".to_string(),
            sku_name: sku_name.to_string(),
            ..ServiceDocument::default()
        }
    }

    #[test]
    fn validate_parses_the_sku() {
        let sku = validate(&base_document("Premium_3")).unwrap();
        assert_eq!(sku.tier, SkuTier::Premium);
        assert_eq!(sku.capacity, 3);
    }

    #[test]
    fn consumption_rejects_portal_blocks() {
        let mut document = base_document("Consumption_0");
        document.sign_in = Some(SignInSettings { enabled: true });
        assert_eq!(
            validate(&document),
            Err(ValidationError::BlockNotSupportedOnConsumption("sign_in"))
        );

        let mut document = base_document("Consumption_0");
        document.sign_up = Some(SignUpSettings::default());
        assert_eq!(
            validate(&document),
            Err(ValidationError::BlockNotSupportedOnConsumption("sign_up"))
        );

        let mut document = base_document("Consumption_0");
        document.tenant_access = Some(TenantAccess::default());
        assert_eq!(
            validate(&document),
            Err(ValidationError::BlockNotSupportedOnConsumption("tenant_access"))
        );
    }

    #[test]
    fn client_certificates_are_a_consumption_feature() {
        let mut document = base_document("Developer_1");
        document.client_certificate_enabled = true;
        assert_eq!(validate(&document), Err(ValidationError::ClientCertificateTier));

        let mut document = base_document("Consumption_0");
        document.client_certificate_enabled = true;
        assert!(validate(&document).is_ok());
    }

    #[test]
    fn disabling_the_gateway_needs_another_region() {
        let mut document = base_document("Premium_1");
        document.gateway_disabled = true;
        assert_eq!(
            validate(&document),
            Err(ValidationError::GatewayDisabledWithoutLocations)
        );
    }

    #[test]
    fn zones_are_a_premium_feature() {
        let mut document = base_document("Standard_1");
        document.zones = vec!["1".to_string()];
        assert_eq!(validate(&document), Err(ValidationError::ZonesTier));

        let mut document = base_document("Premium_1");
        document.zones = vec!["1".to_string(), "2".to_string()];
        assert!(validate(&document).is_ok());
    }

    #[test]
    fn gated_security_toggles_fail_validation_on_consumption() {
        let mut document = base_document("Consumption_0");
        document.security = Some(SecuritySettings {
            triple_des_ciphers_enabled: true,
            ..SecuritySettings::default()
        });
        assert!(matches!(
            validate(&document),
            Err(ValidationError::CiphersNotSupportedOnConsumption(_))
        ));
    }

    #[test]
    fn consumption_sends_the_client_certificate_toggle() {
        let mut document = base_document("Consumption_0");
        document.client_certificate_enabled = true;
        let sku = validate(&document).unwrap();
        let service = build_service(&document, &sku).unwrap();
        assert_eq!(service.properties.enable_client_certificate, Some(true));

        let document = base_document("Developer_1");
        let sku = validate(&document).unwrap();
        let service = build_service(&document, &sku).unwrap();
        assert_eq!(service.properties.enable_client_certificate, None);
    }

    #[test]
    fn build_normalizes_the_location() {
        let mut document = base_document("Developer_1");
        document.location = "West Europe".to_string();
        let service = build_service(&document, &validate(&document).unwrap()).unwrap();
        assert_eq!(service.location, "westeurope");
    }

    #[test]
    fn policy_change_detection_covers_creation_and_removal() {
        let mut with_policy = base_document("Developer_1");
        with_policy.policy = Some(Policy {
            xml_content: "<policies/>".to_string(),
            ..Policy::default()
        });
        let without_policy = base_document("Developer_1");

        assert!(policy_changed(&with_policy, None));
        assert!(!policy_changed(&without_policy, None));
        assert!(policy_changed(&without_policy, Some(&with_policy)));
        assert!(!policy_changed(&with_policy, Some(&with_policy)));
    }

    #[test]
    fn tenant_access_changes_on_toggle_or_block_presence() {
        let mut enabled = base_document("Developer_1");
        enabled.tenant_access = Some(TenantAccess {
            enabled: true,
            ..TenantAccess::default()
        });
        let absent = base_document("Developer_1");

        assert!(tenant_access_changed(&enabled, None));
        assert!(!tenant_access_changed(&absent, None));
        assert!(tenant_access_changed(&absent, Some(&enabled)));
        assert!(!tenant_access_changed(&enabled, Some(&enabled)));
    }
}
