//! Selection of the protocol variant negotiated for a response.
//!
//! The server names the variant it speaks as a `Content-Type` parameter, e.g.
//! `multipart/mixed; boundary="graphql"; subscriptionSpec=1.0`. Unrecognized
//! tokens are rejected, never defaulted to a known variant.
//!
//! # Examples
//!
//! ```
//! use graphql_multipart::protocol::{select_parser, ProtocolSpec};
//!
//! assert_eq!(select_parser("deferSpec=20220824"), Some(&ProtocolSpec::DEFER));
//! assert_eq!(select_parser("deferSpec=20230101"), None);
//! ```

use super::headers::MultipartContentType;
use super::spec::ProtocolSpec;
use crate::error::{MultipartError, Result};

static BUILTIN: [ProtocolSpec; 2] = [ProtocolSpec::DEFER, ProtocolSpec::SUBSCRIPTION];

/// Look up a built-in protocol variant by its negotiation token.
pub fn select_parser(token: &str) -> Option<&'static ProtocolSpec> {
    BUILTIN.iter().find(|spec| spec.token() == token)
}

/// Set of protocol variants a client accepts.
///
/// Starts with the built-in defer and subscription variants; more can be
/// registered without touching the parsing algorithm.
#[derive(Debug, Clone)]
pub struct SpecificationRegistry {
    specs: Vec<ProtocolSpec>,
}

impl SpecificationRegistry {
    /// A registry without any variant.
    pub fn empty() -> Self {
        SpecificationRegistry { specs: Vec::new() }
    }

    /// Add `spec`, replacing and returning a variant with the same token.
    pub fn register(&mut self, spec: ProtocolSpec) -> Option<ProtocolSpec> {
        match self.specs.iter_mut().find(|s| s.token() == spec.token()) {
            Some(existing) => Some(std::mem::replace(existing, spec)),
            None => {
                self.specs.push(spec);
                None
            }
        }
    }

    /// Variant registered for `token`.
    pub fn lookup(&self, token: &str) -> Option<&ProtocolSpec> {
        self.specs.iter().find(|spec| spec.token() == token)
    }

    /// Variant named by the parameters of a negotiated content type.
    ///
    /// The first parameter matching a registered token wins.
    ///
    /// # Errors
    ///
    /// [`MultipartError::UnsupportedSpecification`] when no parameter matches.
    pub fn select(&self, content_type: &MultipartContentType) -> Result<&ProtocolSpec> {
        let spec = content_type
            .protocol_tokens()
            .find_map(|token| self.lookup(&token));

        match spec {
            Some(spec) => {
                tracing::debug!(token = spec.token(), "selected multipart specification");
                Ok(spec)
            }
            None => Err(MultipartError::UnsupportedSpecification(
                content_type.to_string(),
            )),
        }
    }

    /// Registered variants, in registration order.
    pub fn specs(&self) -> &[ProtocolSpec] {
        &self.specs
    }
}

impl Default for SpecificationRegistry {
    fn default() -> Self {
        SpecificationRegistry {
            specs: BUILTIN.to_vec(),
        }
    }
}
