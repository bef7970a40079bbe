//! Managed identity expansion and flattening.

use std::collections::BTreeSet;

use crate::api::models;
use crate::document::{Identity, IdentityType};
use crate::error::{Error, ValidationError};
use crate::id::{ServiceId, UserAssignedIdentityId};

/// Builds the wire identity block.
///
/// A document without an `identity` block expands to an explicit `None`
/// identity, so an apply detaches whatever identities were attached before.
pub(crate) fn expand(
    identity: Option<&Identity>,
) -> Result<models::ManagedIdentity, ValidationError> {
    let Some(identity) = identity else {
        return Ok(models::ManagedIdentity {
            identity_type: IdentityType::None,
            ..models::ManagedIdentity::default()
        });
    };
    if identity.identity_type.includes_user_assigned() {
        if identity.identity_ids.is_empty() {
            return Err(ValidationError::IdentityIdsMissing);
        }
    } else if !identity.identity_ids.is_empty() {
        return Err(ValidationError::IdentityIdsNotAllowed(identity.identity_type));
    }
    let user_assigned_identities = identity
        .identity_ids
        .iter()
        .map(|id| (id.clone(), models::UserAssignedIdentityValue::default()))
        .collect();
    Ok(models::ManagedIdentity {
        identity_type: identity.identity_type,
        user_assigned_identities,
        ..models::ManagedIdentity::default()
    })
}

/// Rebuilds the document identity block from the wire.
///
/// The platform echoes user assigned identity ids in whatever casing it
/// stores; they are reparsed here so documents always carry the canonical
/// spelling. A wire identity of kind `None` flattens to no block at all.
pub(crate) fn flatten(
    identity: Option<&models::ManagedIdentity>,
    id: &ServiceId,
) -> Result<Option<Identity>, Error> {
    let Some(identity) = identity else {
        return Ok(None);
    };
    if identity.identity_type == IdentityType::None {
        return Ok(None);
    }
    let mut identity_ids = BTreeSet::new();
    for raw in identity.user_assigned_identities.keys() {
        let parsed = UserAssignedIdentityId::parse(raw).map_err(|source| Error::Identity {
            resource: id.to_string(),
            source,
        })?;
        identity_ids.insert(parsed.to_string());
    }
    Ok(Some(Identity {
        identity_type: identity.identity_type,
        identity_ids,
        principal_id: identity.principal_id.clone(),
        tenant_id: identity.tenant_id.clone(),
    }))
}
