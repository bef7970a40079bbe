//! Developer portal sign-in and sign-up settings.

use crate::api::models;
use crate::document::{SignInSettings, SignUpSettings, TermsOfService};

/// An absent block writes the platform default back, disabling the
/// sign-in requirement.
pub(crate) fn expand_sign_in(
    settings: Option<&SignInSettings>,
) -> models::SignInSettingsResource {
    models::SignInSettingsResource {
        properties: models::SignInProperties {
            enabled: settings.is_some_and(|s| s.enabled),
        },
    }
}

pub(crate) fn flatten_sign_in(resource: &models::SignInSettingsResource) -> SignInSettings {
    SignInSettings {
        enabled: resource.properties.enabled,
    }
}

/// An absent block writes the platform defaults back, disabling sign-up
/// and its terms of service.
pub(crate) fn expand_sign_up(
    settings: Option<&SignUpSettings>,
) -> models::SignUpSettingsResource {
    let default = SignUpSettings::default();
    let settings = settings.unwrap_or(&default);
    let terms = &settings.terms_of_service;
    models::SignUpSettingsResource {
        properties: models::SignUpProperties {
            enabled: settings.enabled,
            terms_of_service: Some(models::TermsOfServiceContract {
                enabled: terms.enabled,
                consent_required: terms.consent_required,
                text: (!terms.text.is_empty()).then(|| terms.text.clone()),
            }),
        },
    }
}

pub(crate) fn flatten_sign_up(resource: &models::SignUpSettingsResource) -> SignUpSettings {
    let terms = resource
        .properties
        .terms_of_service
        .clone()
        .unwrap_or_default();
    SignUpSettings {
        enabled: resource.properties.enabled,
        terms_of_service: TermsOfService {
            enabled: terms.enabled,
            consent_required: terms.consent_required,
            text: terms.text.unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_blocks_expand_to_disabled_settings() {
        assert!(!expand_sign_in(None).properties.enabled);

        let sign_up = expand_sign_up(None);
        assert!(!sign_up.properties.enabled);
        let terms = sign_up.properties.terms_of_service.unwrap();
        assert!(!terms.enabled);
        assert!(!terms.consent_required);
        assert_eq!(terms.text, None);
    }

    #[test]
    fn empty_terms_text_is_not_sent() {
        let settings = SignUpSettings {
            enabled: true,
            terms_of_service: TermsOfService {
                enabled: true,
                consent_required: true,
                text: String::new(),
            },
        };
        let wire = expand_sign_up(Some(&settings));
        assert_eq!(wire.properties.terms_of_service.unwrap().text, None);
    }

    #[test]
    fn sign_up_settings_survive_a_round_trip() {
        let settings = SignUpSettings {
            enabled: true,
            terms_of_service: TermsOfService {
                enabled: true,
                consent_required: false,
                text: "terms apply".to_string(),
            },
        };
        let wire = expand_sign_up(Some(&settings));
        assert_eq!(flatten_sign_up(&wire), settings);
    }

    #[test]
    fn sign_in_settings_survive_a_round_trip() {
        let settings = SignInSettings { enabled: true };
        let wire = expand_sign_in(Some(&settings));
        assert_eq!(flatten_sign_in(&wire), settings);
    }
}
