/*
 * Responsibility
 * - 認証済みリクエストを表す型 (AuthenticationResult) と、その構成要素
 *   - OAuth2Request: client / scope / audience / request parameters
 *   - UserAuthentication: principal / credentials / authorities
 * - 下流の認可チェックが読むのはこの型だけ
 */
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Credentials are not meaningful once the token has been accepted.
pub const CREDENTIALS_PLACEHOLDER: &str = "N/A";

/// A granted role or permission, used verbatim by access checks.
///
/// No prefix is added: callers that rely on a `ROLE_` convention must
/// already carry it in the token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Authority {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Authority {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Build a duplicate-free authority list (sorted, so output is deterministic).
pub fn authority_list<I, S>(names: I) -> Vec<Authority>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(Authority::new)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The client side of an authenticated request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OAuth2Request {
    pub request_parameters: BTreeMap<String, String>,
    pub client_id: String,
    pub authorities: Vec<Authority>,
    pub approved: bool,
    pub scope: BTreeSet<String>,
    /// Audience of the token (client applications it was issued to).
    pub resource_ids: BTreeSet<String>,
}

/// The end-user side of an authenticated request.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAuthentication {
    pub principal: String,
    pub credentials: String,
    pub authorities: Vec<Authority>,
}

impl UserAuthentication {
    pub fn new(principal: impl Into<String>, authorities: Vec<Authority>) -> Self {
        Self {
            principal: principal.into(),
            credentials: CREDENTIALS_PLACEHOLDER.to_string(),
            authorities,
        }
    }
}

impl fmt::Debug for UserAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print credentials
        f.debug_struct("UserAuthentication")
            .field("principal", &self.principal)
            .field("authorities", &self.authorities)
            .finish()
    }
}

/// Authenticated request produced once per incoming token.
///
/// Read-only: every normalization step builds a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    request: OAuth2Request,
    user: Option<UserAuthentication>,
}

impl AuthenticationResult {
    pub fn new(request: OAuth2Request, user: Option<UserAuthentication>) -> Self {
        Self { request, user }
    }

    pub fn request(&self) -> &OAuth2Request {
        &self.request
    }

    pub fn user_authentication(&self) -> Option<&UserAuthentication> {
        self.user.as_ref()
    }

    /// `true` when the token carries no end-user (client credentials grant).
    pub fn is_client_only(&self) -> bool {
        self.user.is_none()
    }

    /// The user principal, or the client id for client-only tokens.
    pub fn principal(&self) -> &str {
        match &self.user {
            Some(user) => &user.principal,
            None => &self.request.client_id,
        }
    }

    pub fn authorities(&self) -> &[Authority] {
        match &self.user {
            Some(user) => &user.authorities,
            None => &self.request.authorities,
        }
    }

    pub fn audience(&self) -> &BTreeSet<String> {
        &self.request.resource_ids
    }

    pub fn client_id(&self) -> &str {
        &self.request.client_id
    }

    pub fn scope(&self) -> &BTreeSet<String> {
        &self.request.scope
    }

    pub fn request_parameters(&self) -> &BTreeMap<String, String> {
        &self.request.request_parameters
    }

    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities().iter().any(|a| a.as_str() == name)
    }
}

// Flattened view for downstream consumers; credentials are never emitted.
impl Serialize for AuthenticationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AuthenticationResult", 7)?;
        state.serialize_field("principal", self.principal())?;
        state.serialize_field("client_only", &self.is_client_only())?;
        state.serialize_field("authorities", self.authorities())?;
        state.serialize_field("audience", self.audience())?;
        state.serialize_field("client_id", self.client_id())?;
        state.serialize_field("scope", self.scope())?;
        state.serialize_field("request_parameters", self.request_parameters())?;
        state.end()
    }
}
