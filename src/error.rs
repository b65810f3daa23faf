/*
 * Responsibility
 * - claim 抽出 / ClaimSet 構築で共通に使うエラー型
 * - token decode / config のエラーはそれぞれのモジュール側に置く
 */
use thiserror::Error;

/// Failure while normalizing a claim set.
///
/// The token-introspection layer is expected to treat this as an invalid token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("expected element {0} not found in token")]
    MissingClaim(&'static str),
}

#[derive(Debug, Error)]
pub enum ClaimSetError {
    #[error("claim set must be a JSON object")]
    NotAnObject,

    #[error("invalid claim set json: {0}")]
    Json(#[from] serde_json::Error),
}
