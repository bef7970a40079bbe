//! # ARM REST Client
//!
//! reqwest-based [`ControlPlaneClient`] speaking to Azure Resource Manager.
//!
//! Every call is pinned to one api-version and authenticated with a bearer
//! token taken from the environment. Mutating calls come back with an
//! `Azure-AsyncOperation` or `Location` header naming a status endpoint;
//! [`ArmClient::wait`] polls that endpoint with capped backoff until the
//! operation settles.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{IF_MATCH, LOCATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::api::{models, ApiError, ControlPlaneClient, Operation};
use crate::config::Environment;
use crate::id::{DeletedServiceId, ServiceId};

/// Api-version sent with every call.
const API_VERSION: &str = "2020-12-01";

/// Seconds between polls of a long-running operation. The last entry repeats
/// once the ramp is exhausted.
const POLL_BACKOFF_SECS: [u64; 6] = [1, 2, 4, 8, 16, 30];

/// Poll budget per operation, roughly an hour at the capped interval.
const MAX_POLLS: u32 = 120;

/// REST client for the API Management control plane surface.
pub struct ArmClient {
    http: Client,
    endpoint: String,
    credential: String,
}

impl fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ArmClient {
    /// Create a client from the process environment.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be initialized.
    pub fn new(environment: &Environment) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            endpoint: environment.arm_endpoint.trim_end_matches('/').to_string(),
            credential: environment.credential.clone(),
        })
    }

    fn service_url(&self, id: &ServiceId) -> String {
        format!("{}{}", self.endpoint, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.credential)
            .query(&[("api-version", API_VERSION)])
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { operation, source })
    }

    async fn error_from(operation: &'static str, response: Response) -> ApiError {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return ApiError::NotFound { operation };
        }
        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<models::ErrorResponse>(&body) {
            Ok(envelope) => envelope.error,
            // Not every gateway error carries the ARM envelope.
            Err(_parse) => models::ErrorDetail {
                code: String::new(),
                message: body,
            },
        };
        ApiError::Status {
            operation,
            status: status.as_u16(),
            code: detail.code,
            message: detail.message,
        }
    }

    /// Extracts the status endpoint a mutating call announced, if any.
    fn operation_from(response: &Response) -> Operation {
        let status_url = response
            .headers()
            .get("azure-asyncoperation")
            .or_else(|| response.headers().get(LOCATION))
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Operation { status_url }
    }

    fn backoff_secs(poll: u32) -> u64 {
        let index = usize::min(poll as usize, POLL_BACKOFF_SECS.len() - 1);
        POLL_BACKOFF_SECS[index]
    }
}

#[async_trait]
impl ControlPlaneClient for ArmClient {
    async fn create_or_update_service(
        &self,
        id: &ServiceId,
        service: &models::ServiceResource,
    ) -> Result<Operation, ApiError> {
        const OPERATION: &str = "service.create_or_update";
        let url = self.service_url(id);
        debug!("PUT {}", url);
        let response = self
            .send(OPERATION, self.request(Method::PUT, &url).json(service))
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(Self::operation_from(&response))
    }

    async fn get_service(
        &self,
        id: &ServiceId,
    ) -> Result<Option<models::ServiceResource>, ApiError> {
        const OPERATION: &str = "service.get";
        let url = self.service_url(id);
        debug!("GET {}", url);
        let response = self.send(OPERATION, self.request(Method::GET, &url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(Some(Self::decode(OPERATION, response).await?))
    }

    async fn delete_service(&self, id: &ServiceId) -> Result<Operation, ApiError> {
        const OPERATION: &str = "service.delete";
        let url = self.service_url(id);
        debug!("DELETE {}", url);
        let response = self
            .send(OPERATION, self.request(Method::DELETE, &url))
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(Self::operation_from(&response))
    }

    async fn wait(&self, operation: &Operation) -> Result<(), ApiError> {
        const OPERATION: &str = "operation.poll";
        let Some(url) = operation.status_url.as_deref() else {
            return Ok(());
        };
        for poll in 0..MAX_POLLS {
            tokio::time::sleep(Duration::from_secs(Self::backoff_secs(poll))).await;
            let response = self
                .send(OPERATION, self.http.get(url).bearer_auth(&self.credential))
                .await?;
            let code = response.status();
            if code == StatusCode::ACCEPTED {
                // Location-style polling answers 202 until the work is done.
                continue;
            }
            if !code.is_success() {
                return Err(Self::error_from(OPERATION, response).await);
            }
            let body = response.text().await.unwrap_or_default();
            let status: models::OperationStatus =
                serde_json::from_str(&body).unwrap_or_default();
            match status.status.as_str() {
                "Succeeded" => return Ok(()),
                "Failed" | "Canceled" => {
                    return Err(ApiError::OperationFailed {
                        status: status.status.clone(),
                        message: status.error.map(|e| e.message).unwrap_or_default(),
                    });
                }
                // Location-style polling carries no status body; any other
                // success code means the operation finished.
                "" => return Ok(()),
                other => trace!("operation still running: {}", other),
            }
        }
        Err(ApiError::OperationFailed {
            status: "TimedOut".to_string(),
            message: format!("operation did not settle after {MAX_POLLS} polls"),
        })
    }

    async fn set_sign_in_settings(
        &self,
        id: &ServiceId,
        settings: &models::SignInSettingsResource,
    ) -> Result<(), ApiError> {
        const OPERATION: &str = "signin.set";
        let url = format!("{}/portalsettings/signin", self.service_url(id));
        debug!("PUT {}", url);
        let response = self
            .send(OPERATION, self.request(Method::PUT, &url).json(settings))
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(())
    }

    async fn get_sign_in_settings(
        &self,
        id: &ServiceId,
    ) -> Result<models::SignInSettingsResource, ApiError> {
        const OPERATION: &str = "signin.get";
        let url = format!("{}/portalsettings/signin", self.service_url(id));
        debug!("GET {}", url);
        let response = self.send(OPERATION, self.request(Method::GET, &url)).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Self::decode(OPERATION, response).await
    }

    async fn set_sign_up_settings(
        &self,
        id: &ServiceId,
        settings: &models::SignUpSettingsResource,
    ) -> Result<(), ApiError> {
        const OPERATION: &str = "signup.set";
        let url = format!("{}/portalsettings/signup", self.service_url(id));
        debug!("PUT {}", url);
        let response = self
            .send(OPERATION, self.request(Method::PUT, &url).json(settings))
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(())
    }

    async fn get_sign_up_settings(
        &self,
        id: &ServiceId,
    ) -> Result<models::SignUpSettingsResource, ApiError> {
        const OPERATION: &str = "signup.get";
        let url = format!("{}/portalsettings/signup", self.service_url(id));
        debug!("GET {}", url);
        let response = self.send(OPERATION, self.request(Method::GET, &url)).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Self::decode(OPERATION, response).await
    }

    async fn set_policy(
        &self,
        id: &ServiceId,
        policy: &models::PolicyResource,
    ) -> Result<(), ApiError> {
        const OPERATION: &str = "policy.set";
        let url = format!("{}/policies/policy", self.service_url(id));
        debug!("PUT {}", url);
        let response = self
            .send(OPERATION, self.request(Method::PUT, &url).json(policy))
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(())
    }

    async fn get_policy(
        &self,
        id: &ServiceId,
    ) -> Result<Option<models::PolicyResource>, ApiError> {
        const OPERATION: &str = "policy.get";
        let url = format!("{}/policies/policy", self.service_url(id));
        debug!("GET {}", url);
        let response = self
            .send(
                OPERATION,
                self.request(Method::GET, &url)
                    .query(&[("format", "rawxml")]),
            )
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(Some(Self::decode(OPERATION, response).await?))
    }

    async fn delete_policy(&self, id: &ServiceId) -> Result<(), ApiError> {
        const OPERATION: &str = "policy.delete";
        let url = format!("{}/policies/policy", self.service_url(id));
        debug!("DELETE {}", url);
        let response = self
            .send(
                OPERATION,
                self.request(Method::DELETE, &url).header(IF_MATCH, "*"),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(())
    }

    async fn update_tenant_access(
        &self,
        id: &ServiceId,
        update: &models::TenantAccessUpdate,
    ) -> Result<(), ApiError> {
        const OPERATION: &str = "tenant_access.update";
        let url = format!("{}/tenant/access", self.service_url(id));
        debug!("PATCH {}", url);
        let response = self
            .send(
                OPERATION,
                self.request(Method::PATCH, &url)
                    .header(IF_MATCH, "*")
                    .json(update),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(())
    }

    async fn get_tenant_access_secrets(
        &self,
        id: &ServiceId,
    ) -> Result<models::TenantAccessSecrets, ApiError> {
        const OPERATION: &str = "tenant_access.secrets";
        let url = format!("{}/tenant/access/listSecrets", self.service_url(id));
        debug!("POST {}", url);
        let response = self
            .send(OPERATION, self.request(Method::POST, &url))
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Self::decode(OPERATION, response).await
    }

    async fn get_deleted_service(
        &self,
        id: &DeletedServiceId,
    ) -> Result<Option<models::DeletedService>, ApiError> {
        const OPERATION: &str = "deleted_service.get";
        let url = format!("{}{}", self.endpoint, id);
        debug!("GET {}", url);
        let response = self.send(OPERATION, self.request(Method::GET, &url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(Some(Self::decode(OPERATION, response).await?))
    }

    async fn purge_deleted_service(
        &self,
        id: &DeletedServiceId,
    ) -> Result<Operation, ApiError> {
        const OPERATION: &str = "deleted_service.purge";
        let url = format!("{}{}", self.endpoint, id);
        debug!("DELETE {}", url);
        let response = self
            .send(OPERATION, self.request(Method::DELETE, &url))
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(OPERATION, response).await);
        }
        Ok(Self::operation_from(&response))
    }
}
