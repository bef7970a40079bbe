//! Delete and purge orchestration.
//!
//! Deleting a service only soft-deletes it; the name stays reserved until
//! the remnant is purged. When the environment asks for purging, the
//! soft-deleted remnant is looked up at the subscription scope and removed
//! so the name can be reused right away.

use tokio::time::Instant;
use tracing::{debug, info};

use crate::api::ControlPlaneClient;
use crate::document::ServiceDocument;
use crate::error::Error;
use crate::id::{normalize_location, DeletedServiceId};

use super::{api_error, wait_with_deadline, Reconciler};

pub(crate) async fn run<C: ControlPlaneClient>(
    reconciler: &Reconciler<C>,
    document: &ServiceDocument,
    deadline: Instant,
) -> Result<(), Error> {
    let id = reconciler.service_id(document);
    let client = reconciler.client();

    info!("Deleting API Management service: {}", id);
    match client.delete_service(&id).await {
        Ok(operation) => {
            wait_with_deadline(client, &operation, deadline, "service.delete", &id)
                .await?;
        }
        Err(error) if error.is_not_found() => {
            debug!("service already gone: {}", id);
        }
        Err(source) => return Err(api_error("service.delete", &id)(source)),
    }

    if !reconciler.environment.purge_soft_delete_on_destroy {
        return Ok(());
    }

    let deleted_id = DeletedServiceId::new(
        reconciler.environment.subscription_id.clone(),
        normalize_location(&document.location),
        document.name.clone(),
    );
    let remnant = client
        .get_deleted_service(&deleted_id)
        .await
        .map_err(api_error("deleted_service.get", &deleted_id))?;
    match remnant {
        Some(_) => {
            info!("Purging soft-deleted service: {}", deleted_id);
            let operation = client
                .purge_deleted_service(&deleted_id)
                .await
                .map_err(api_error("deleted_service.purge", &deleted_id))?;
            wait_with_deadline(
                client,
                &operation,
                deadline,
                "deleted_service.purge",
                &deleted_id,
            )
            .await?;
        }
        None => debug!("no soft-deleted remnant to purge: {}", deleted_id),
    }
    Ok(())
}
