//! # Certify - CSR Generation and Certificate Conversion Engine
//!
//! Certify is the workflow engine behind an interactive certificate tool,
//! built entirely with rustcrypto libraries and a pure Rust PKCS#12
//! keystore, with no OpenSSL binary or bindings. It covers two independent
//! paths:
//!
//! - **Request generation**: free-form identity fields and an ordered SAN
//!   list become a 4096-bit RSA key pair plus a SHA-256-signed PKCS#10
//!   request, with optional password protection of the private key.
//! - **Format conversion**: a validated state machine over five routes
//!   between PEM, DER certificates and PKCS#12 bundles.
//!
//! The crate contains no UI. A front end (TUI, CLI, anything) supplies
//! trimmed field values, file paths and a conversion selector, and renders
//! the tagged success/failure results this crate returns.
//!
//! ## Building a request
//!
//! ```rust,no_run
//! use certify::request::{RequestForm, SubjectField, config, generate};
//! use certify::toolkit::NativeToolkit;
//!
//! # fn main() -> Result<(), certify::error::CertifyError> {
//! let mut form = RequestForm::new();
//! form.set_field(SubjectField::CommonName, "*.example.com");
//! form.set_field(SubjectField::Organization, "Example Corp");
//! form.add_san("example.com");
//! form.add_san("www.example.com");
//!
//! // Live preview: pure and deterministic, recompute on every change.
//! let preview = config::render_config(&form.snapshot());
//! println!("{preview}");
//!
//! let artifact = generate::generate(
//!     &form.snapshot(),
//!     std::path::Path::new("."),
//!     &NativeToolkit::new(),
//! )?;
//! println!("produced: {:?}", artifact.produced_paths());
//! # Ok(())
//! # }
//! ```
//!
//! ## Converting formats
//!
//! ```rust,no_run
//! use certify::convert::{ConversionJob, ConversionKind};
//! use certify::toolkit::NativeToolkit;
//!
//! # fn main() -> Result<(), certify::error::CertifyError> {
//! let mut job = ConversionJob {
//!     kind: Some(ConversionKind::CerKeyToP12),
//!     primary: "server.cer".to_string(),
//!     secondary: "server.key".to_string(),
//!     ..Default::default()
//! };
//! job.set_password("export-password");
//!
//! let produced = job.run(std::path::Path::new("."), &NativeToolkit::new())?;
//! println!("produced: {produced:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All validation failures ([`error::CertifyError::MissingCommonName`], the
//! conversion precondition kinds) are detected before any cryptographic
//! work runs. Toolkit failures preserve the underlying diagnostic and are
//! never retried; every failure returns the engine to an idle, reusable
//! state.
//!
//! ## Module Organization
//!
//! - [`request`]: identity model, config rendering, CSR/key generation
//! - [`convert`]: conversion routes, validation and dispatch
//! - [`toolkit`]: the toolkit capability trait and its native implementation
//! - [`error`]: error types and handling
//! - [`pem_utils`]: small PEM/DER helpers

pub mod convert;
pub mod error;
pub mod pem_utils;
pub mod request;
pub mod toolkit;
