//! Read the payload of a compact JWT without verifying it.
//!
//! Signature, issuer and expiry checks belong to the token-introspection layer
//! in front of this crate. This is only for inspecting tokens that were already
//! accepted (CLI, tests).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use tracing::debug;

use crate::claims::ClaimSet;
use crate::error::ClaimSetError;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a compact JWS (expected header.payload.signature)")]
    Malformed,
    #[error("invalid token header: {0}")]
    Header(#[from] jsonwebtoken::errors::Error),
    #[error("invalid base64url payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Claims(#[from] ClaimSetError),
}

pub fn decode_claims(token: &str) -> Result<ClaimSet, TokenError> {
    let token = token.trim();

    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let header = jsonwebtoken::decode_header(token)?;
    debug!(alg = ?header.alg, typ = ?header.typ, "decoding unverified token payload");

    // Some issuers keep the padding.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;

    Ok(ClaimSet::from_slice(&bytes)?)
}
