//! Baseline claim-to-authentication conversion.
//!
//! [`DefaultExtractor`] follows the standard resource-server conventions
//! (`user_name`, `client_id`, `scope`, `authorities`, `aud`) and never fails.
//! [`crate::ClaimNormalizer`] composes with it instead of replacing it.

use std::collections::{BTreeMap, BTreeSet};

use crate::authentication::{AuthenticationResult, OAuth2Request, UserAuthentication, authority_list};
use crate::claims::{self, ClaimSet};
use crate::error::ClaimError;

/// Converts a decoded claim set into an [`AuthenticationResult`].
pub trait AuthenticationExtractor: Send + Sync {
    fn extract_authentication(&self, claims: &ClaimSet) -> Result<AuthenticationResult, ClaimError>;

    /// Name used in logs and `Debug` output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Claim names read by [`DefaultExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorSettings {
    pub username_claim: String,
    pub client_id_claim: String,
    // Copy `grant_type` into the request parameters.
    pub include_grant_type: bool,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            username_claim: "user_name".to_string(),
            client_id_claim: "client_id".to_string(),
            include_grant_type: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultExtractor {
    settings: ExtractorSettings,
}

impl DefaultExtractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    fn extract_user(&self, claims: &ClaimSet) -> Option<UserAuthentication> {
        let principal = claims.get_str(&self.settings.username_claim)?;
        let authorities = claims
            .get(claims::AUTHORITIES)
            .map(|v| authority_list(claims::authority_values(v)))
            .unwrap_or_default();

        Some(UserAuthentication::new(principal, authorities))
    }
}

impl AuthenticationExtractor for DefaultExtractor {
    fn extract_authentication(&self, claims: &ClaimSet) -> Result<AuthenticationResult, ClaimError> {
        let user = self.extract_user(claims);

        let client_id = claims.get_str(&self.settings.client_id_claim).map(String::from);

        let mut request_parameters = BTreeMap::new();
        if let Some(client_id) = &client_id {
            request_parameters.insert(self.settings.client_id_claim.clone(), client_id.clone());
        }
        if self.settings.include_grant_type {
            if let Some(grant_type) = claims.get_str(claims::GRANT_TYPE) {
                request_parameters.insert(claims::GRANT_TYPE.to_string(), grant_type.to_string());
            }
        }

        let resource_ids: BTreeSet<String> = claims
            .get(claims::AUDIENCE)
            .map(claims::string_values)
            .unwrap_or_default()
            .into_iter()
            .collect();

        // Client authorities only matter when there is no end-user.
        let authorities = match (&user, claims.get(claims::AUTHORITIES)) {
            (None, Some(value)) => authority_list(claims::authority_values(value)),
            _ => Vec::new(),
        };

        let request = OAuth2Request {
            request_parameters,
            client_id: client_id.unwrap_or_default(),
            authorities,
            approved: true,
            scope: extract_scope(claims),
            resource_ids,
        };

        Ok(AuthenticationResult::new(request, user))
    }
}

/// `scope` is either space-delimited or an array.
fn extract_scope(claims: &ClaimSet) -> BTreeSet<String> {
    match claims.get(claims::SCOPE) {
        Some(serde_json::Value::String(s)) => s.split_whitespace().map(String::from).collect(),
        Some(other) => claims::string_values(other).into_iter().collect(),
        None => BTreeSet::new(),
    }
}
