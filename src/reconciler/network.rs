//! Virtual network and regional deployment expansion and flattening.

use crate::api::models;
use crate::document::{
    AdditionalLocation, ServiceDocument, VirtualNetworkConfiguration, VirtualNetworkType,
};
use crate::error::ValidationError;
use crate::id::normalize_location;

/// Checks that a subnet is supplied whenever the attachment kind needs one.
pub(crate) fn check_attachment(
    kind: VirtualNetworkType,
    configuration: Option<&VirtualNetworkConfiguration>,
) -> Result<(), ValidationError> {
    if kind != VirtualNetworkType::None && configuration.is_none() {
        return Err(ValidationError::VirtualNetworkConfigurationMissing(kind));
    }
    Ok(())
}

pub(crate) fn expand_configuration(
    configuration: Option<&VirtualNetworkConfiguration>,
) -> Option<models::VirtualNetworkConfiguration> {
    configuration.map(|config| models::VirtualNetworkConfiguration {
        subnet_resource_id: Some(config.subnet_id.clone()),
    })
}

pub(crate) fn flatten_configuration(
    configuration: Option<&models::VirtualNetworkConfiguration>,
) -> Option<VirtualNetworkConfiguration> {
    configuration.map(|config| VirtualNetworkConfiguration {
        subnet_id: config.subnet_resource_id.clone().unwrap_or_default(),
    })
}

/// Builds the wire list of regional deployments.
///
/// Regional deployments inherit the tier and capacity of the service, and
/// each must carry a subnet exactly when the service itself does.
pub(crate) fn expand_additional_locations(
    document: &ServiceDocument,
    sku: models::ServiceSku,
) -> Result<Vec<models::AdditionalLocation>, ValidationError> {
    let parent = document.virtual_network_configuration.as_ref();
    let mut locations = Vec::with_capacity(document.additional_location.len());
    for entry in &document.additional_location {
        match (parent, entry.virtual_network_configuration.as_ref()) {
            (Some(_), None) => {
                return Err(ValidationError::AdditionalLocationSubnetMissing)
            }
            (None, Some(_)) => {
                return Err(ValidationError::AdditionalLocationSubnetNotAllowed)
            }
            _ => {}
        }
        locations.push(models::AdditionalLocation {
            location: normalize_location(&entry.location),
            sku,
            virtual_network_configuration: expand_configuration(
                entry.virtual_network_configuration.as_ref(),
            ),
            gateway_regional_url: None,
            public_ip_addresses: None,
            private_ip_addresses: None,
        });
    }
    Ok(locations)
}

pub(crate) fn flatten_additional_locations(
    locations: &[models::AdditionalLocation],
) -> Vec<AdditionalLocation> {
    locations
        .iter()
        .map(|entry| AdditionalLocation {
            location: normalize_location(&entry.location),
            virtual_network_configuration: flatten_configuration(
                entry.virtual_network_configuration.as_ref(),
            ),
            gateway_regional_url: entry.gateway_regional_url.clone().unwrap_or_default(),
            public_ip_addresses: entry.public_ip_addresses.clone().unwrap_or_default(),
            private_ip_addresses: entry.private_ip_addresses.clone().unwrap_or_default(),
        })
        .collect()
}
