/*
 * Responsibility
 * - token introspection が使う claim -> AuthenticationResult 変換の差し込み口
 * - 起動時に一度だけ TokenConverterConfigurer::configure で戦略を差し替える
 * - Clone 前提で持つ (内部は Arc)
 */
use std::fmt;
use std::sync::Arc;

use crate::authentication::AuthenticationResult;
use crate::claims::ClaimSet;
use crate::error::ClaimError;
use crate::extractor::{AuthenticationExtractor, DefaultExtractor};

/// Holds the extraction strategy used for every incoming token.
#[derive(Clone)]
pub struct TokenConverter {
    extractor: Arc<dyn AuthenticationExtractor>,
}

impl TokenConverter {
    /// Starts with the standard [`DefaultExtractor`].
    pub fn new() -> Self {
        Self::with_extractor(Arc::new(DefaultExtractor::default()))
    }

    pub fn with_extractor(extractor: Arc<dyn AuthenticationExtractor>) -> Self {
        Self { extractor }
    }

    pub fn set_extractor(&mut self, extractor: Arc<dyn AuthenticationExtractor>) {
        self.extractor = extractor;
    }

    pub fn extractor(&self) -> &Arc<dyn AuthenticationExtractor> {
        &self.extractor
    }

    pub fn extract_authentication(&self, claims: &ClaimSet) -> Result<AuthenticationResult, ClaimError> {
        self.extractor.extract_authentication(claims)
    }
}

impl Default for TokenConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TokenConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConverter")
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

/// Startup hook that installs a strategy on a [`TokenConverter`].
///
/// Called once from the composition root; calling it again is harmless.
pub trait TokenConverterConfigurer {
    fn configure(&self, converter: &mut TokenConverter);
}
