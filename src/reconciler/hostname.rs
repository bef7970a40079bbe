//! Custom hostname expansion and flattening.

use chrono::SecondsFormat;
use tracing::debug;

use crate::api::models;
use crate::document::{HostnameBinding, HostnameConfiguration, ProxyHostnameBinding};

/// Service endpoints a hostname can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Management,
    Portal,
    DeveloperPortal,
    Proxy,
    Scm,
}

impl Endpoint {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Management => "Management",
            Self::Portal => "Portal",
            Self::DeveloperPortal => "DeveloperPortal",
            Self::Proxy => "Proxy",
            Self::Scm => "Scm",
        }
    }

    /// Parses a wire endpoint name, `None` for kinds this crate does not
    /// manage.
    fn parse(value: &str) -> Option<Self> {
        [
            Self::Management,
            Self::Portal,
            Self::DeveloperPortal,
            Self::Proxy,
            Self::Scm,
        ]
        .into_iter()
        .find(|endpoint| endpoint.as_str().eq_ignore_ascii_case(value))
    }
}

/// Builds the wire hostname list.
///
/// An absent block expands to an empty list; the control plane then keeps
/// only the default gateway hostname.
pub(crate) fn expand(
    configuration: Option<&HostnameConfiguration>,
) -> Vec<models::HostnameConfiguration> {
    let Some(configuration) = configuration else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    for binding in &configuration.management {
        entries.push(expand_binding(Endpoint::Management, binding, None));
    }
    for binding in &configuration.portal {
        entries.push(expand_binding(Endpoint::Portal, binding, None));
    }
    for binding in &configuration.developer_portal {
        entries.push(expand_binding(Endpoint::DeveloperPortal, binding, None));
    }
    for binding in &configuration.proxy {
        entries.push(expand_binding(
            Endpoint::Proxy,
            &binding.binding,
            Some(binding.default_ssl_binding),
        ));
    }
    for binding in &configuration.scm {
        entries.push(expand_binding(Endpoint::Scm, binding, None));
    }
    entries
}

fn expand_binding(
    endpoint: Endpoint,
    binding: &HostnameBinding,
    default_ssl_binding: Option<bool>,
) -> models::HostnameConfiguration {
    models::HostnameConfiguration {
        hostname_type: endpoint.as_str().to_string(),
        host_name: binding.host_name.clone(),
        key_vault_id: (!binding.key_vault_id.is_empty()).then(|| binding.key_vault_id.clone()),
        encoded_certificate: (!binding.certificate.is_empty())
            .then(|| binding.certificate.clone()),
        certificate_password: (!binding.certificate_password.is_empty())
            .then(|| binding.certificate_password.clone()),
        default_ssl_binding,
        negotiate_client_certificate: Some(binding.negotiate_client_certificate),
        certificate: None,
    }
}

/// Rebuilds the document hostname block from the wire.
///
/// The control plane adds a Proxy entry for the default gateway hostname;
/// that entry is dropped so documents only carry what their authors wrote.
/// Certificate payloads and passwords are write-only and come from the
/// prior block's binding with the same hostname. Endpoint kinds this crate
/// does not manage are skipped. Returns `None` when nothing is left.
pub(crate) fn flatten(
    entries: &[models::HostnameConfiguration],
    service_name: &str,
    gateway_host_name_suffix: &str,
    prior: Option<&HostnameConfiguration>,
) -> Option<HostnameConfiguration> {
    let default_host = format!(
        "{}.{}",
        service_name.to_lowercase(),
        gateway_host_name_suffix
    );
    let mut configuration = HostnameConfiguration::default();
    let mut kept = false;
    for entry in entries {
        let Some(endpoint) = Endpoint::parse(&entry.hostname_type) else {
            debug!("skipping unmanaged hostname type: {}", entry.hostname_type);
            continue;
        };
        if endpoint == Endpoint::Proxy && entry.host_name.eq_ignore_ascii_case(&default_host)
        {
            continue;
        }
        let carried =
            prior.and_then(|block| carried_binding(block, endpoint, &entry.host_name));
        let binding = flatten_binding(entry, carried);
        kept = true;
        match endpoint {
            Endpoint::Management => configuration.management.push(binding),
            Endpoint::Portal => configuration.portal.push(binding),
            Endpoint::DeveloperPortal => configuration.developer_portal.push(binding),
            Endpoint::Proxy => configuration.proxy.push(ProxyHostnameBinding {
                binding,
                default_ssl_binding: entry.default_ssl_binding.unwrap_or_default(),
            }),
            Endpoint::Scm => configuration.scm.push(binding),
        }
    }
    kept.then_some(configuration)
}

/// The prior binding for the same endpoint and hostname, if any.
fn carried_binding<'a>(
    block: &'a HostnameConfiguration,
    endpoint: Endpoint,
    host_name: &str,
) -> Option<&'a HostnameBinding> {
    let bindings: &[HostnameBinding] = match endpoint {
        Endpoint::Management => &block.management,
        Endpoint::Portal => &block.portal,
        Endpoint::DeveloperPortal => &block.developer_portal,
        Endpoint::Proxy => {
            return block
                .proxy
                .iter()
                .map(|proxy| &proxy.binding)
                .find(|binding| binding.host_name.eq_ignore_ascii_case(host_name));
        }
        Endpoint::Scm => &block.scm,
    };
    bindings
        .iter()
        .find(|binding| binding.host_name.eq_ignore_ascii_case(host_name))
}

fn flatten_binding(
    entry: &models::HostnameConfiguration,
    carried: Option<&HostnameBinding>,
) -> HostnameBinding {
    let information = entry.certificate.as_ref();
    HostnameBinding {
        host_name: entry.host_name.clone(),
        certificate: carried.map(|b| b.certificate.clone()).unwrap_or_default(),
        certificate_password: carried
            .map(|b| b.certificate_password.clone())
            .unwrap_or_default(),
        key_vault_id: entry.key_vault_id.clone().unwrap_or_default(),
        negotiate_client_certificate: entry.negotiate_client_certificate.unwrap_or_default(),
        expiry: information
            .and_then(|info| info.expiry)
            .map(|expiry| expiry.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
        subject: information.map(|info| info.subject.clone()).unwrap_or_default(),
        thumbprint: information
            .map(|info| info.thumbprint.clone())
            .unwrap_or_default(),
    }
}
