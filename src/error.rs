//! use certify::error::CertifyError;

use std::path::PathBuf;

use thiserror::Error;

use crate::convert::ConversionKind;

pub type Result<T> = std::result::Result<T, CertifyError>;

/// Identifies which generation step a toolkit failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    /// Key-pair creation and request signing.
    RequestGeneration,
    /// Password-based encryption of the private key.
    KeyProtection,
}

impl std::fmt::Display for ToolStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolStage::RequestGeneration => write!(f, "request generation"),
            ToolStage::KeyProtection => write!(f, "key protection"),
        }
    }
}

/// Errors reported to the front end by the workflow engine.
///
/// Validation kinds are detected locally before any toolkit work runs;
/// toolkit kinds preserve the underlying diagnostic text. None of these are
/// fatal to the process and none are retried automatically.
#[derive(Debug, Error, Clone)]
pub enum CertifyError {
    /// The common name is mandatory and was empty.
    #[error("common name (CN) is required")]
    MissingCommonName,

    /// No conversion route was selected.
    #[error("no conversion type selected")]
    NoConversionSelected,

    /// A required input path was left empty.
    #[error("input file {slot} is required")]
    MissingInput { slot: u8 },

    /// An input path does not exist on disk.
    #[error("input file {slot} not found: {path}")]
    InputNotFound { slot: u8, path: PathBuf },

    /// The conversion token matched none of the known routes.
    #[error("unknown conversion type: {token}")]
    UnknownConversion { token: String },

    /// The certificate toolkit failed during generation.
    #[error("{stage} failed: {message}")]
    ToolInvocationError { stage: ToolStage, message: String },

    /// The certificate toolkit failed while executing a conversion route.
    #[error("conversion {route} failed: {message}")]
    ConversionFailed {
        route: ConversionKind,
        message: String,
    },

    /// The toolkit did not complete in time.
    ///
    /// Only produced by process-backed [`crate::toolkit::CertificateToolkit`]
    /// implementations; the native toolkit runs no child process.
    #[error("toolkit invocation timed out")]
    ToolInvocationTimeout,
}

/// Represents errors raised inside a [`crate::toolkit::CertificateToolkit`].
///
/// These carry the underlying library diagnostics; the engine wraps them
/// into [`CertifyError::ToolInvocationError`] or
/// [`CertifyError::ConversionFailed`] before they reach the front end.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// Error during data encoding.
    #[error("failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input material.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Error during key generation.
    #[error("key generation error: {0}")]
    KeyGenerationError(String),

    /// Error from RSA operations.
    #[error("RSA error: {0}")]
    RsaError(String),

    /// Error from PKCS#8 key encoding or encryption.
    #[error("PKCS#8 error: {0}")]
    Pkcs8Error(String),

    /// Error from the PKCS#12 keystore layer.
    #[error("PKCS#12 error: {0}")]
    Pkcs12Error(String),

    /// Filesystem error while reading or writing artifacts.
    #[error("i/o error: {0}")]
    IoError(String),
}

impl From<der::Error> for ToolkitError {
    fn from(err: der::Error) -> Self {
        ToolkitError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for ToolkitError {
    fn from(err: rsa::Error) -> Self {
        ToolkitError::RsaError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for ToolkitError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        ToolkitError::RsaError(err.to_string())
    }
}

impl From<pkcs8::Error> for ToolkitError {
    fn from(err: pkcs8::Error) -> Self {
        ToolkitError::Pkcs8Error(err.to_string())
    }
}

impl From<p12_keystore::error::Error> for ToolkitError {
    fn from(err: p12_keystore::error::Error) -> Self {
        ToolkitError::Pkcs12Error(err.to_string())
    }
}

impl From<pem::PemError> for ToolkitError {
    fn from(err: pem::PemError) -> Self {
        ToolkitError::DecodingError(err.to_string())
    }
}

impl From<std::io::Error> for ToolkitError {
    fn from(err: std::io::Error) -> Self {
        ToolkitError::IoError(err.to_string())
    }
}
