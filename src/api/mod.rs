//! # Control Plane Interface
//!
//! Abstract interface to the Azure Resource Manager control plane.
//!
//! The reconciler only ever talks to [`ControlPlaneClient`], so orchestration
//! logic can be exercised against an in-memory fake while [`rest::ArmClient`]
//! carries real traffic. Methods map one-to-one onto ARM calls and stay free
//! of document semantics; translating between documents and wire types is the
//! reconciler's job.

pub mod models;
pub mod rest;

use async_trait::async_trait;

use crate::id::{DeletedServiceId, ServiceId};

/// Handle to a long-running ARM operation.
///
/// Mutating calls return one of these; pass it to
/// [`ControlPlaneClient::wait`] to block until the operation settles. ARM
/// announces the status endpoint in the `Azure-AsyncOperation` or `Location`
/// response header; when neither is present the call already completed
/// synchronously.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    pub status_url: Option<String>,
}

impl Operation {
    /// An operation that already completed synchronously.
    #[must_use]
    pub const fn completed() -> Self {
        Self { status_url: None }
    }
}

/// Error raised by a control plane call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The control plane rejected the call.
    #[error("{operation} returned HTTP {status} ({code}): {message}")]
    Status {
        operation: &'static str,
        status: u16,
        code: String,
        message: String,
    },
    /// The addressed resource does not exist.
    #[error("{operation}: resource not found")]
    NotFound { operation: &'static str },
    /// A long-running operation settled in a terminal failure state.
    #[error("operation ended as {status}: {message}")]
    OperationFailed { status: String, message: String },
    /// The response body did not decode as the expected shape.
    #[error("{operation}: failed to decode response")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The request never produced a response.
    #[error("{operation}: request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// True when the error means the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Status { status, .. } => *status == 404,
            _ => false,
        }
    }
}

/// Client for the API Management surface of the ARM control plane.
///
/// Reads return `Ok(None)` when the resource does not exist; deletes of a
/// missing resource surface [`ApiError::NotFound`] and leave tolerating it
/// to the caller.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Create a service or replace its full definition.
    async fn create_or_update_service(
        &self,
        id: &ServiceId,
        service: &models::ServiceResource,
    ) -> Result<Operation, ApiError>;

    /// Fetch a service.
    async fn get_service(
        &self,
        id: &ServiceId,
    ) -> Result<Option<models::ServiceResource>, ApiError>;

    /// Soft-delete a service.
    async fn delete_service(&self, id: &ServiceId) -> Result<Operation, ApiError>;

    /// Poll an operation until it settles, failing when it ends in a
    /// terminal non-success state.
    async fn wait(&self, operation: &Operation) -> Result<(), ApiError>;

    /// Replace the developer portal sign-in settings.
    async fn set_sign_in_settings(
        &self,
        id: &ServiceId,
        settings: &models::SignInSettingsResource,
    ) -> Result<(), ApiError>;

    /// Fetch the developer portal sign-in settings.
    async fn get_sign_in_settings(
        &self,
        id: &ServiceId,
    ) -> Result<models::SignInSettingsResource, ApiError>;

    /// Replace the developer portal sign-up settings.
    async fn set_sign_up_settings(
        &self,
        id: &ServiceId,
        settings: &models::SignUpSettingsResource,
    ) -> Result<(), ApiError>;

    /// Fetch the developer portal sign-up settings.
    async fn get_sign_up_settings(
        &self,
        id: &ServiceId,
    ) -> Result<models::SignUpSettingsResource, ApiError>;

    /// Replace the service-scoped policy.
    async fn set_policy(
        &self,
        id: &ServiceId,
        policy: &models::PolicyResource,
    ) -> Result<(), ApiError>;

    /// Fetch the service-scoped policy in `rawxml` form.
    async fn get_policy(
        &self,
        id: &ServiceId,
    ) -> Result<Option<models::PolicyResource>, ApiError>;

    /// Delete the service-scoped policy.
    async fn delete_policy(&self, id: &ServiceId) -> Result<(), ApiError>;

    /// Toggle the tenant management API.
    async fn update_tenant_access(
        &self,
        id: &ServiceId,
        update: &models::TenantAccessUpdate,
    ) -> Result<(), ApiError>;

    /// Fetch the tenant management API state and its access keys.
    async fn get_tenant_access_secrets(
        &self,
        id: &ServiceId,
    ) -> Result<models::TenantAccessSecrets, ApiError>;

    /// Fetch a soft-deleted service.
    async fn get_deleted_service(
        &self,
        id: &DeletedServiceId,
    ) -> Result<Option<models::DeletedService>, ApiError>;

    /// Purge a soft-deleted service so its name can be reused.
    async fn purge_deleted_service(
        &self,
        id: &DeletedServiceId,
    ) -> Result<Operation, ApiError>;
}
