//! # Service Reconciler
//!
//! Drives declared service documents to the control plane and back.
//!
//! The three entry points map onto the lifecycle of a service:
//! [`Reconciler::apply`] converges the remote service onto a desired
//! document, [`Reconciler::read`] rebuilds a document from the live service
//! and [`Reconciler::delete`] removes it. Translation between documents and
//! wire bodies lives in the per-block codec modules; each owns one document
//! block together with its reverse mapping so the two directions cannot
//! drift apart.

mod access;
mod apply;
mod certificates;
mod delete;
mod hostname;
mod identity;
mod network;
mod policy;
mod portal;
mod properties;
mod read;

use tokio::time::Instant;

use crate::api::{ApiError, ControlPlaneClient, Operation};
use crate::config::Environment;
use crate::document::{ServiceDocument, VirtualNetworkType};
use crate::error::Error;
use crate::id::ServiceId;

/// Reconciles service documents against one subscription.
#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
    environment: Environment,
}

impl<C: ControlPlaneClient> Reconciler<C> {
    pub fn new(client: C, environment: Environment) -> Self {
        Self {
            client,
            environment,
        }
    }

    /// The control plane client this reconciler drives.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// ARM identity of the service a document describes.
    #[must_use]
    pub fn service_id(&self, document: &ServiceDocument) -> ServiceId {
        ServiceId::new(
            &self.environment.subscription_id,
            &document.resource_group_name,
            &document.name,
        )
    }

    /// Converges the remote service onto `desired` and returns the fully
    /// populated document read back from the control plane.
    ///
    /// `prior` is the document from the previous successful reconcile, or
    /// `None` on first creation. Write-only fields the control plane never
    /// returns are carried over from it, and a `None` prior makes creation
    /// refuse to overwrite a service that already exists.
    ///
    /// # Errors
    /// Returns a [`ValidationError`](crate::error::ValidationError) before
    /// any network traffic when the document is invalid, and an [`Error`]
    /// when a control plane call fails or `deadline` passes.
    pub async fn apply(
        &self,
        desired: &ServiceDocument,
        prior: Option<&ServiceDocument>,
        deadline: Instant,
    ) -> Result<ServiceDocument, Error> {
        apply::run(self, desired, prior, deadline).await
    }

    /// Rebuilds a document from the live service, or `None` when the
    /// service does not exist.
    ///
    /// # Errors
    /// Returns an [`Error`] when a control plane call fails.
    pub async fn read(
        &self,
        id: &ServiceId,
        prior: Option<&ServiceDocument>,
    ) -> Result<Option<ServiceDocument>, Error> {
        read::run(self, id, prior).await
    }

    /// Deletes the service, then purges the soft-deleted remnant when the
    /// environment asks for it. Both steps tolerate the resource already
    /// being gone.
    ///
    /// # Errors
    /// Returns an [`Error`] when a control plane call fails or `deadline`
    /// passes.
    pub async fn delete(
        &self,
        document: &ServiceDocument,
        deadline: Instant,
    ) -> Result<(), Error> {
        delete::run(self, document, deadline).await
    }
}

/// True when the change from `prior` to `desired` cannot be applied in
/// place and the service has to be deleted and recreated.
///
/// Attaching a service to a virtual network for the first time works in
/// place. Every other change of attachment kind, and any change or removal
/// of the subnet, forces a rebuild.
#[must_use]
pub fn requires_replacement(prior: &ServiceDocument, desired: &ServiceDocument) -> bool {
    if prior.virtual_network_type != desired.virtual_network_type
        && prior.virtual_network_type != VirtualNetworkType::None
    {
        return true;
    }
    match (
        &prior.virtual_network_configuration,
        &desired.virtual_network_configuration,
    ) {
        (Some(prior_config), Some(desired_config)) => prior_config != desired_config,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Wraps an [`ApiError`] with the operation and resource it concerns.
pub(crate) fn api_error(
    operation: &'static str,
    resource: impl ToString,
) -> impl FnOnce(ApiError) -> Error {
    let resource = resource.to_string();
    move |source| Error::Api {
        operation,
        resource,
        source,
    }
}

/// Polls an operation to completion, converting a missed deadline into
/// [`Error::DeadlineExceeded`].
pub(crate) async fn wait_with_deadline<C: ControlPlaneClient>(
    client: &C,
    operation: &Operation,
    deadline: Instant,
    name: &'static str,
    resource: impl ToString,
) -> Result<(), Error> {
    let resource = resource.to_string();
    match tokio::time::timeout_at(deadline, client.wait(operation)).await {
        Ok(result) => result.map_err(|source| Error::Api {
            operation: name,
            resource,
            source,
        }),
        Err(_elapsed) => Err(Error::DeadlineExceeded {
            operation: name,
            resource,
        }),
    }
}
