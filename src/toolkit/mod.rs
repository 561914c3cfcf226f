pub mod native;

pub use native::NativeToolkit;

use std::path::Path;

use secrecy::SecretString;

use crate::error::ToolkitError;
use crate::request::CertificateRequestSpec;

/// One request-generation invocation.
///
/// # Fields
/// * `spec` - The snapshot being generated.
/// * `config_path` - The rendered request configuration, persisted for
///   exactly the duration of the call. Process-backed toolkits pass it to
///   the external tool; the native toolkit works from `spec` directly.
/// * `key_path` - Where the unencrypted private key is written.
/// * `csr_path` - Where the PKCS#10 request is written.
pub struct RequestJob<'a> {
    pub spec: &'a CertificateRequestSpec,
    pub config_path: &'a Path,
    pub key_path: &'a Path,
    pub csr_path: &'a Path,
}

/// Selects which part of a PKCS#12 bundle an extraction produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum P12Contents {
    /// Entity certificate only, no keys.
    CertificatesOnly,
    /// Private key only, unencrypted, no certificates.
    KeysOnly,
    /// All certificates and keys, unencrypted.
    Everything,
}

/// Capability interface over the underlying certificate machinery.
///
/// Represents an entity capable of generating key pairs and requests and of
/// transcoding certificate material between encodings. The production
/// implementation is [`NativeToolkit`]; tests substitute an in-memory fake.
/// Implementations must treat an absent password as "no password", never as
/// an empty passphrase handed through literally.
pub trait CertificateToolkit {
    /// Creates a new RSA key pair and a signed PKCS#10 request matching the
    /// job's configuration, writing both files.
    fn generate_request(&self, job: &RequestJob<'_>) -> Result<(), ToolkitError>;

    /// Derives a password-encrypted copy of the private key at `key_path`,
    /// writing it to `output`. The input file is left untouched.
    fn protect_key(
        &self,
        key_path: &Path,
        output: &Path,
        password: &SecretString,
    ) -> Result<(), ToolkitError>;

    /// Exports a PKCS#12 bundle from a certificate and its private key,
    /// protected by the optional export password.
    fn export_p12(
        &self,
        cert_path: &Path,
        key_path: &Path,
        output: &Path,
        password: Option<&SecretString>,
    ) -> Result<(), ToolkitError>;

    /// Extracts the selected contents of a PKCS#12 bundle to a PEM file,
    /// using the optional import password to open the bundle.
    fn extract_p12(
        &self,
        bundle_path: &Path,
        contents: P12Contents,
        output: &Path,
        password: Option<&SecretString>,
    ) -> Result<(), ToolkitError>;

    /// Re-encodes a certificate (PEM or DER on disk) to PEM form.
    fn reencode_pem(&self, cert_path: &Path, output: &Path) -> Result<(), ToolkitError>;
}
