//! Certificate issuers.
//!
//! [`MkcertIssuer`] produces certificates browsers trust via a local CA;
//! [`OpensslIssuer`] is the self-signed fallback.

mod mkcert;
mod openssl;

pub use mkcert::MkcertIssuer;
pub use openssl::{OpensslIssuer, VALIDITY_DAYS};

use devhost_core::application::ports::CertificateIssuer;

/// Local CA first, then self-signed.
pub fn default_issuers() -> Vec<Box<dyn CertificateIssuer>> {
    vec![Box::new(MkcertIssuer), Box::new(OpensslIssuer)]
}
