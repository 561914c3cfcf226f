//! Conversion router: validates a requested conversion and dispatches it to
//! the toolkit with the correct invocation template.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use tracing::info;

use crate::error::{CertifyError, Result};
use crate::toolkit::{CertificateToolkit, P12Contents};

/// The five conversion routes.
///
/// A closed enumeration rather than free-form strings; the
/// [`CertifyError::UnknownConversion`] kind is only reachable through
/// [`ConversionKind::from_str`] on an unconstrained token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// Certificate + key into a PKCS#12 bundle.
    CerKeyToP12,
    /// PKCS#12 bundle split into certificate and key files.
    P12ToCerKey,
    /// Certificate re-encoded to PEM.
    CerToPem,
    /// All PKCS#12 contents extracted, unencrypted, to PEM.
    P12ToPem,
    /// PEM certificate + key into a PKCS#12 bundle.
    PemKeyToP12,
}

impl ConversionKind {
    pub const ALL: [ConversionKind; 5] = [
        ConversionKind::CerKeyToP12,
        ConversionKind::P12ToCerKey,
        ConversionKind::CerToPem,
        ConversionKind::P12ToPem,
        ConversionKind::PemKeyToP12,
    ];

    /// The selector token as presented by the front end.
    pub fn token(self) -> &'static str {
        match self {
            ConversionKind::CerKeyToP12 => "cer+key->p12",
            ConversionKind::P12ToCerKey => "p12->cer+key",
            ConversionKind::CerToPem => "cer->pem",
            ConversionKind::P12ToPem => "p12->pem",
            ConversionKind::PemKeyToP12 => "pem+key->p12",
        }
    }

    /// Routes bundling a key need a second input file.
    fn requires_secondary(self) -> bool {
        matches!(
            self,
            ConversionKind::CerKeyToP12 | ConversionKind::PemKeyToP12
        )
    }
}

impl std::fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ConversionKind {
    type Err = CertifyError;

    fn from_str(token: &str) -> Result<Self> {
        let normalized = token.trim().to_lowercase();
        ConversionKind::ALL
            .into_iter()
            .find(|kind| kind.token() == normalized)
            .ok_or_else(|| CertifyError::UnknownConversion {
                token: token.to_string(),
            })
    }
}

/// One conversion request from the front end.
///
/// Constructed on the convert action, validated, executed once and
/// discarded; a failed job is not retried automatically.
///
/// # Fields
/// * `kind` - The selected route, if any.
/// * `primary` - First input path as typed; required for every route.
/// * `secondary` - Second input path; required only for the two `+key`
///   routes.
/// * `output` - Output path override; empty means the route default.
/// * `password` - Export password for bundling routes, import password for
///   extraction routes. `None` means no password, not an empty passphrase.
#[derive(Debug, Default)]
pub struct ConversionJob {
    pub kind: Option<ConversionKind>,
    pub primary: String,
    pub secondary: String,
    pub output: String,
    pub password: Option<SecretString>,
}

struct Plan {
    kind: ConversionKind,
    primary: PathBuf,
    secondary: Option<PathBuf>,
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

impl ConversionJob {
    /// Sets the password, treating a blank value as absent.
    pub fn set_password(&mut self, value: &str) {
        let value = value.trim();
        self.password = if value.is_empty() {
            None
        } else {
            Some(SecretString::from(value.to_string()))
        };
    }

    /// Checks route preconditions without touching the toolkit.
    ///
    /// Relative input paths resolve against `base_dir`. Rejection kinds, in
    /// order: [`CertifyError::NoConversionSelected`],
    /// [`CertifyError::MissingInput`] / [`CertifyError::InputNotFound`] for
    /// slot 1, then the same pair for slot 2 on the routes that need a key
    /// input. Password correctness is not checked here; it is discovered at
    /// execution time.
    pub fn validate(&self, base_dir: &Path) -> Result<()> {
        self.plan(base_dir).map(|_| ())
    }

    fn plan(&self, base_dir: &Path) -> Result<Plan> {
        let kind = self.kind.ok_or(CertifyError::NoConversionSelected)?;

        if self.primary.is_empty() {
            return Err(CertifyError::MissingInput { slot: 1 });
        }
        let primary = resolve(base_dir, &self.primary);
        if !primary.exists() {
            return Err(CertifyError::InputNotFound {
                slot: 1,
                path: primary,
            });
        }

        let secondary = if kind.requires_secondary() {
            if self.secondary.is_empty() {
                return Err(CertifyError::MissingInput { slot: 2 });
            }
            let secondary = resolve(base_dir, &self.secondary);
            if !secondary.exists() {
                return Err(CertifyError::InputNotFound {
                    slot: 2,
                    path: secondary,
                });
            }
            Some(secondary)
        } else {
            None
        };

        Ok(Plan {
            kind,
            primary,
            secondary,
        })
    }

    /// Output path for the route, falling back to the route default when the
    /// caller left it blank.
    fn output_or(&self, base_dir: &Path, default: &str) -> PathBuf {
        if self.output.is_empty() {
            resolve(base_dir, default)
        } else {
            resolve(base_dir, &self.output)
        }
    }

    /// Validates the job and executes the selected route.
    ///
    /// Returns the produced file paths. Toolkit failures surface as
    /// [`CertifyError::ConversionFailed`] with the underlying diagnostic
    /// preserved; for `p12->cer+key` the certificate extraction runs first
    /// and is not rolled back if the key extraction fails.
    pub fn run(
        &self,
        base_dir: &Path,
        toolkit: &dyn CertificateToolkit,
    ) -> Result<Vec<PathBuf>> {
        let plan = self.plan(base_dir)?;
        let kind = plan.kind;
        let password = self.password.as_ref();
        let failed = |e: crate::error::ToolkitError| CertifyError::ConversionFailed {
            route: kind,
            message: e.to_string(),
        };

        let produced = match kind {
            ConversionKind::CerKeyToP12 => {
                let default = format!(
                    "{}.p12",
                    plan.primary
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "output".to_string())
                );
                let output = self.output_or(base_dir, &default);
                toolkit
                    .export_p12(
                        &plan.primary,
                        plan.secondary.as_deref().expect("validated"),
                        &output,
                        password,
                    )
                    .map_err(failed)?;
                vec![output]
            }
            ConversionKind::P12ToCerKey => {
                let cert_output = self.output_or(base_dir, "output.cer");
                let key_output = self
                    .output_or(base_dir, "output.key")
                    .with_extension("key");
                toolkit
                    .extract_p12(
                        &plan.primary,
                        P12Contents::CertificatesOnly,
                        &cert_output,
                        password,
                    )
                    .map_err(failed)?;
                toolkit
                    .extract_p12(&plan.primary, P12Contents::KeysOnly, &key_output, password)
                    .map_err(failed)?;
                vec![cert_output, key_output]
            }
            ConversionKind::CerToPem => {
                let output = self.output_or(base_dir, "output.pem");
                toolkit
                    .reencode_pem(&plan.primary, &output)
                    .map_err(failed)?;
                vec![output]
            }
            ConversionKind::P12ToPem => {
                let output = self.output_or(base_dir, "output.pem");
                toolkit
                    .extract_p12(&plan.primary, P12Contents::Everything, &output, password)
                    .map_err(failed)?;
                vec![output]
            }
            ConversionKind::PemKeyToP12 => {
                let output = self.output_or(base_dir, "output.p12");
                toolkit
                    .export_p12(
                        &plan.primary,
                        plan.secondary.as_deref().expect("validated"),
                        &output,
                        password,
                    )
                    .map_err(failed)?;
                vec![output]
            }
        };

        info!(route = %kind, produced = produced.len(), "conversion finished");
        Ok(produced)
    }
}
