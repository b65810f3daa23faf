//! Claim normalization.
//!
//! The identity provider does not put roles where the resource server looks
//! for them, so the audience and role claims are re-read here and laid over
//! the baseline authentication:
//! - `aud`         -> audience (resource ids)
//! - `authorities` -> granted authorities of both the request and the user
//!
//! Roles must already be flattened into `authorities` upstream; nested
//! `resource_access.<client>.roles` is not traversed.
//!
//! Both claims are required. A missing key fails with
//! [`ClaimError::MissingClaim`]; a key that is present but empty is fine.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::authentication::{
    Authority, AuthenticationResult, OAuth2Request, UserAuthentication, authority_list,
};
use crate::claims::{self, ClaimSet};
use crate::converter::{TokenConverter, TokenConverterConfigurer};
use crate::error::ClaimError;
use crate::extractor::{AuthenticationExtractor, DefaultExtractor};

/// Client applications the token was issued to.
pub fn extract_audience(claims: &ClaimSet) -> Result<BTreeSet<String>, ClaimError> {
    let value = required(claims, claims::AUDIENCE)?;
    Ok(claims::string_values(value).into_iter().collect())
}

/// Roles granted to the principal, duplicates removed and names kept verbatim.
pub fn extract_authorities(claims: &ClaimSet) -> Result<Vec<Authority>, ClaimError> {
    let value = required(claims, claims::AUTHORITIES)?;
    Ok(authority_list(claims::authority_values(value)))
}

/// Lay the normalized audience and authorities over `baseline`.
///
/// Returns a new value; `baseline` is only read.
pub fn build_authentication(
    claims: &ClaimSet,
    baseline: &AuthenticationResult,
) -> Result<AuthenticationResult, ClaimError> {
    let audience = extract_audience(claims)?;
    let authorities = extract_authorities(claims)?;

    Ok(assemble(audience, authorities, baseline))
}

fn required<'a>(claims: &'a ClaimSet, name: &'static str) -> Result<&'a serde_json::Value, ClaimError> {
    claims.get(name).ok_or_else(|| {
        debug!(claim = name, "required claim missing");
        ClaimError::MissingClaim(name)
    })
}

fn assemble(
    audience: BTreeSet<String>,
    authorities: Vec<Authority>,
    baseline: &AuthenticationResult,
) -> AuthenticationResult {
    let base = baseline.request();

    let request = OAuth2Request {
        request_parameters: base.request_parameters.clone(),
        client_id: base.client_id.clone(),
        authorities: authorities.clone(),
        approved: true,
        scope: base.scope.clone(),
        resource_ids: audience,
    };

    let user = UserAuthentication::new(baseline.principal(), authorities);

    debug!(
        audience = request.resource_ids.len(),
        authorities = user.authorities.len(),
        "normalized token claims"
    );

    AuthenticationResult::new(request, Some(user))
}

/// [`AuthenticationExtractor`] that runs a baseline extractor and then
/// normalizes audience and authorities.
#[derive(Clone)]
pub struct ClaimNormalizer {
    baseline: Arc<dyn AuthenticationExtractor>,
}

impl ClaimNormalizer {
    pub fn new(baseline: Arc<dyn AuthenticationExtractor>) -> Self {
        info!(baseline = baseline.name(), "initialized ClaimNormalizer");
        Self { baseline }
    }

    pub fn baseline(&self) -> &Arc<dyn AuthenticationExtractor> {
        &self.baseline
    }
}

impl Default for ClaimNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(DefaultExtractor::default()))
    }
}

impl fmt::Debug for ClaimNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimNormalizer")
            .field("baseline", &self.baseline.name())
            .finish()
    }
}

impl AuthenticationExtractor for ClaimNormalizer {
    fn extract_authentication(&self, claims: &ClaimSet) -> Result<AuthenticationResult, ClaimError> {
        // Reject before touching the baseline.
        let audience = extract_audience(claims)?;
        let authorities = extract_authorities(claims)?;

        let baseline = self.baseline.extract_authentication(claims)?;

        Ok(assemble(audience, authorities, &baseline))
    }
}

impl TokenConverterConfigurer for ClaimNormalizer {
    fn configure(&self, converter: &mut TokenConverter) {
        converter.set_extractor(Arc::new(self.clone()));
        info!("configured TokenConverter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn claims(value: serde_json::Value) -> ClaimSet {
        ClaimSet::try_from(value).unwrap()
    }

    fn baseline_for(token: &ClaimSet) -> AuthenticationResult {
        DefaultExtractor::default().extract_authentication(token).unwrap()
    }

    #[derive(Default)]
    struct CountingExtractor {
        calls: AtomicUsize,
    }

    impl AuthenticationExtractor for CountingExtractor {
        fn extract_authentication(
            &self,
            claims: &ClaimSet,
        ) -> Result<AuthenticationResult, ClaimError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DefaultExtractor::default().extract_authentication(claims)
        }
    }

    #[test]
    fn audience_accepts_single_string() {
        let audience = extract_audience(&claims(json!({ "aud": "app1" }))).unwrap();
        assert_eq!(audience, BTreeSet::from(["app1".to_string()]));
    }

    #[test]
    fn null_audience_is_present_but_empty() {
        let audience = extract_audience(&claims(json!({ "aud": null }))).unwrap();
        assert!(audience.is_empty());
    }

    #[test]
    fn authorities_keep_names_verbatim() {
        let authorities =
            extract_authorities(&claims(json!({ "authorities": ["admin", "ROLE_USER"] }))).unwrap();

        assert_eq!(authorities, vec![Authority::from("ROLE_USER"), Authority::from("admin")]);
    }

    #[test]
    fn nested_roles_are_not_read() {
        let token = claims(json!({
            "aud": ["app1"],
            "resource_access": { "app1": { "roles": ["ROLE_ADMIN"] } },
        }));

        assert_eq!(
            extract_authorities(&token),
            Err(ClaimError::MissingClaim("authorities"))
        );
    }

    #[test]
    fn build_replaces_authorities_and_audience() {
        let token = claims(json!({
            "user_name": "alice",
            "client_id": "web",
            "scope": "read",
            "aud": ["app1", "app2"],
            "authorities": ["ROLE_ADMIN"],
        }));
        let baseline = baseline_for(&token);

        let auth = build_authentication(&token, &baseline).unwrap();

        assert_eq!(auth.principal(), "alice");
        assert_eq!(auth.client_id(), "web");
        assert_eq!(auth.scope(), baseline.scope());
        assert_eq!(auth.request_parameters(), baseline.request_parameters());
        assert_eq!(auth.request().authorities, vec![Authority::from("ROLE_ADMIN")]);
        assert_eq!(auth.authorities(), &[Authority::from("ROLE_ADMIN")]);
        assert!(auth.request().approved);

        let user = auth.user_authentication().unwrap();
        assert_eq!(user.credentials, "N/A");
    }

    #[test]
    fn client_only_baseline_keeps_client_as_principal() {
        let token = claims(json!({
            "client_id": "batch",
            "aud": ["app1"],
            "authorities": ["ROLE_CLIENT"],
        }));

        let auth = build_authentication(&token, &baseline_for(&token)).unwrap();

        assert_eq!(auth.principal(), "batch");
        assert!(!auth.is_client_only());
    }

    #[test]
    fn missing_claim_short_circuits_baseline() {
        let counting = Arc::new(CountingExtractor::default());
        let normalizer = ClaimNormalizer::new(counting.clone());

        let err = normalizer
            .extract_authentication(&claims(json!({ "authorities": [] })))
            .unwrap_err();

        assert_eq!(err, ClaimError::MissingClaim("aud"));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);

        normalizer
            .extract_authentication(&claims(json!({ "aud": [], "authorities": [] })))
            .unwrap();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn configure_installs_normalizer() {
        let mut converter = TokenConverter::new();
        let token = claims(json!({ "user_name": "alice" }));

        // default conversion does not require aud/authorities
        assert!(converter.extract_authentication(&token).is_ok());

        let normalizer = ClaimNormalizer::default();
        normalizer.configure(&mut converter);
        normalizer.configure(&mut converter);

        assert_eq!(converter.extractor().name(), std::any::type_name::<ClaimNormalizer>());
        assert_eq!(
            converter.extract_authentication(&token).unwrap_err(),
            ClaimError::MissingClaim("aud")
        );
    }
}
