//! Tenant management API access.

use crate::api::models;
use crate::document::TenantAccess;

pub(crate) fn expand(access: &TenantAccess) -> models::TenantAccessUpdate {
    models::TenantAccessUpdate {
        properties: models::TenantAccessUpdateProperties {
            enabled: access.enabled,
        },
    }
}

/// Rebuilds the document block from the listSecrets response. The keys are
/// only returned by that call, never by reads of the service itself.
pub(crate) fn flatten(secrets: &models::TenantAccessSecrets) -> TenantAccess {
    TenantAccess {
        enabled: secrets.enabled,
        tenant_id: secrets.id.clone().unwrap_or_default(),
        primary_key: secrets.primary_key.clone().unwrap_or_default(),
        secondary_key: secrets.secondary_key.clone().unwrap_or_default(),
    }
}
