//! OAuth 1.0a authentication: credentials, parameter codec, and the
//! signature engine.
//!
//! The byte-for-byte canonicalization rules implemented here are
//! security-sensitive: a single mis-encoded byte produces a signature the
//! service rejects. The golden vectors from OAuth Core 1.0a Appendix A live
//! in the `signer` tests and pin the exact output.

pub mod credentials;
pub mod percent;
pub mod signer;

pub use credentials::{AccessToken, Consumer, RequestToken, Token};
pub use signer::{Authorizer, OAuthSigner};
