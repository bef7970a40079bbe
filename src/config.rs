//! # Environment Configuration
//!
//! Control-plane connection settings and reconcile behaviour loaded from
//! environment variables.

/// Connection and behaviour settings for one subscription.
///
/// All settings except the subscription id and credential have sensible
/// defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Base URL of the Resource Manager endpoint
    /// Sovereign clouds use a different endpoint than the public cloud
    pub arm_endpoint: String,
    /// Subscription that owns the managed services
    pub subscription_id: String,
    /// Bearer token presented to the Resource Manager
    pub credential: String,
    /// DNS suffix of the default gateway hostname stamped on every service
    /// Reads use it to recognize and drop the platform-injected entry
    pub gateway_host_name_suffix: String,
    /// Purge the soft-deleted remnant after deleting a service
    /// When false the name stays reserved until the platform expires it
    pub purge_soft_delete_on_destroy: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            arm_endpoint: "https://management.azure.com".to_string(),
            subscription_id: String::new(),
            credential: String::new(),
            gateway_host_name_suffix: "azure-api.net".to_string(),
            purge_soft_delete_on_destroy: true,
        }
    }
}

impl Environment {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            arm_endpoint: env_var_or_default_str("ARM_ENDPOINT", "https://management.azure.com"),
            subscription_id: env_var_or_default_str("ARM_SUBSCRIPTION_ID", ""),
            credential: env_var_or_default_str("ARM_ACCESS_TOKEN", ""),
            gateway_host_name_suffix: env_var_or_default_str(
                "APIM_GATEWAY_HOST_NAME_SUFFIX",
                "azure-api.net",
            ),
            purge_soft_delete_on_destroy: env_var_or_default_bool(
                "APIM_PURGE_SOFT_DELETE_ON_DESTROY",
                true,
            ),
        }
    }
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| {
            let v_lower = v.to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
