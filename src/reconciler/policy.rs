//! Service policy expansion and flattening.

use crate::api::models;
use crate::document::Policy;
use crate::error::ValidationError;

/// Builds the wire policy body.
///
/// Inline content wins when both sources are set; a block naming neither
/// is rejected.
pub(crate) fn expand(policy: &Policy) -> Result<models::PolicyResource, ValidationError> {
    let (format, value) = if !policy.xml_content.is_empty() {
        (models::PolicyFormat::RawXml, policy.xml_content.clone())
    } else if !policy.xml_link.is_empty() {
        (models::PolicyFormat::XmlLink, policy.xml_link.clone())
    } else {
        return Err(ValidationError::PolicyContentMissing);
    };
    Ok(models::PolicyResource {
        properties: models::PolicyProperties { format, value },
    })
}

/// Rebuilds the document policy block from the wire.
///
/// Reads fetch the policy in `rawxml` form, so the value is inline content
/// by the time it lands here even when a link produced it; the link itself
/// is write-only and carried forward from the prior document. An empty
/// value flattens to no block.
pub(crate) fn flatten(
    resource: Option<&models::PolicyResource>,
    prior: Option<&Policy>,
) -> Option<Policy> {
    let value = resource
        .map(|r| r.properties.value.clone())
        .unwrap_or_default();
    if value.is_empty() {
        return None;
    }
    Some(Policy {
        xml_content: value,
        xml_link: prior.map(|p| p.xml_link.clone()).unwrap_or_default(),
    })
}

/// True when the desired policy differs from what a read reconstructed.
///
/// A block naming only a link cannot be compared on content, because the
/// read holds the fetched content while the document holds the link; the
/// carried link is compared instead.
pub(crate) fn changed(desired: &Policy, current: Option<&Policy>) -> bool {
    let Some(current) = current else {
        return true;
    };
    if !desired.xml_link.is_empty() && desired.xml_content.is_empty() {
        desired.xml_link != current.xml_link
    } else {
        desired.xml_content != current.xml_content
    }
}
