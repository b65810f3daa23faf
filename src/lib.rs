//! Normalizes OAuth2/JWT access-token claims into the authentication model a
//! resource server checks against.
//!
//! ```
//! use claims_normalizer::{ClaimNormalizer, ClaimSet, TokenConverter, TokenConverterConfigurer};
//!
//! let mut converter = TokenConverter::new();
//! ClaimNormalizer::default().configure(&mut converter);
//!
//! let claims: ClaimSet = r#"{
//!     "user_name": "alice",
//!     "aud": ["app1", "app1", "app2"],
//!     "authorities": ["ROLE_ADMIN", "ROLE_USER"]
//! }"#
//! .parse()
//! .unwrap();
//!
//! let auth = converter.extract_authentication(&claims).unwrap();
//! assert_eq!(auth.principal(), "alice");
//! assert_eq!(auth.audience().len(), 2);
//! assert!(auth.has_authority("ROLE_ADMIN"));
//! ```

pub mod authentication;
pub mod claims;
pub mod config;
pub mod converter;
pub mod error;
pub mod extractor;
pub mod normalizer;
pub mod token;

pub use authentication::{Authority, AuthenticationResult, OAuth2Request, UserAuthentication};
pub use claims::ClaimSet;
pub use converter::{TokenConverter, TokenConverterConfigurer};
pub use error::{ClaimError, ClaimSetError};
pub use extractor::{AuthenticationExtractor, DefaultExtractor, ExtractorSettings};
pub use normalizer::{ClaimNormalizer, build_authentication, extract_audience, extract_authorities};
