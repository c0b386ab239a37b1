//! Driven port signing entity tags for `ETag`/`If-Match`.

use crate::domain::ResourceTag;

use super::define_port_error;

define_port_error! {
    /// Errors raised by resource signers.
    pub enum SignatureError {
        /// The presented tag was not produced by this signer or is malformed.
        Invalid { message: String } => "resource signature is invalid: {message}",
        Signing { message: String } => "resource could not be signed: {message}",
    }
}

/// Produces and checks signed resource tags.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceSigner: Send + Sync {
    fn sign(&self, tag: &ResourceTag) -> Result<String, SignatureError>;

    fn verify(&self, signed: &str) -> Result<ResourceTag, SignatureError>;
}

/// Unsigned signer for handler tests: the "signature" is the JSON form.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureResourceSigner;

impl ResourceSigner for FixtureResourceSigner {
    fn sign(&self, tag: &ResourceTag) -> Result<String, SignatureError> {
        serde_json::to_string(tag).map_err(|err| SignatureError::signing(err.to_string()))
    }

    fn verify(&self, signed: &str) -> Result<ResourceTag, SignatureError> {
        serde_json::from_str(signed).map_err(|err| SignatureError::invalid(err.to_string()))
    }
}
