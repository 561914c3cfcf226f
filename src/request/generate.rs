//! Drives key-pair generation and CSR signing for a request snapshot.

use std::io::Write;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::{CertifyError, Result, ToolStage};
use crate::request::{CertificateRequestSpec, config};
use crate::toolkit::{CertificateToolkit, RequestJob};

/// Filesystem artifacts produced by one generation run.
///
/// # Fields
/// * `csr_file` - The PKCS#10 request, PEM-encoded.
/// * `key_file` - The unencrypted private key. Retained even when a
///   protected copy is written.
/// * `protected_key_file` - The password-encrypted key copy, present only
///   when a protection password was supplied.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub csr_file: PathBuf,
    pub key_file: PathBuf,
    pub protected_key_file: Option<PathBuf>,
}

impl GeneratedArtifact {
    /// Paths to report back to the front end, in the order they were
    /// produced.
    pub fn produced_paths(&self) -> Vec<&Path> {
        let mut paths = vec![self.csr_file.as_path(), self.key_file.as_path()];
        if let Some(protected) = &self.protected_key_file {
            paths.push(protected.as_path());
        }
        paths
    }
}

/// Derives the filename stem for a common name and calendar year.
///
/// A leading wildcard marker (`*.`) becomes a literal `wildcard.` prefix,
/// then a 10-year validity window suffix is appended: `*.example.com` in
/// 2024 yields `wildcard.example.com-2024-2034`.
pub fn file_stem(common_name: &str, year: i32) -> String {
    let base = match common_name.strip_prefix("*.") {
        Some(rest) => format!("wildcard.{rest}"),
        None => common_name.to_string(),
    };
    format!("{base}-{year}-{}", year + 10)
}

/// Generates a key pair and certificate request under `base_dir`.
///
/// The rendered configuration lives in a scoped temporary file for exactly
/// the duration of this call; it is deleted on success, on generation
/// failure, and on protection failure. The unencrypted key is written to
/// `<stem>.key.nopasswd` and the request to `<stem>.csr`; when the spec
/// carries a non-empty password, an encrypted key copy is additionally
/// written to `<stem>.key`. A failure in the protection step does not roll
/// back the request and key already on disk.
///
/// # Errors
/// [`CertifyError::MissingCommonName`] before any toolkit work, or
/// [`CertifyError::ToolInvocationError`] tagged with the failing stage.
pub fn generate(
    spec: &CertificateRequestSpec,
    base_dir: &Path,
    toolkit: &dyn CertificateToolkit,
) -> Result<GeneratedArtifact> {
    config::validate(spec)?;

    let year = OffsetDateTime::now_utc().year();
    let stem = file_stem(&spec.subject.common_name, year);
    let key_file = base_dir.join(format!("{stem}.key.nopasswd"));
    let csr_file = base_dir.join(format!("{stem}.csr"));

    let generation_error = |message: String| CertifyError::ToolInvocationError {
        stage: ToolStage::RequestGeneration,
        message,
    };

    // Deleted on drop, covering every exit path below.
    let mut conf = NamedTempFile::new().map_err(|e| generation_error(e.to_string()))?;
    conf.write_all(config::render_config(spec).as_bytes())
        .map_err(|e| generation_error(e.to_string()))?;
    conf.flush().map_err(|e| generation_error(e.to_string()))?;
    debug!(config = %conf.path().display(), "request configuration rendered");

    let job = RequestJob {
        spec,
        config_path: conf.path(),
        key_path: &key_file,
        csr_path: &csr_file,
    };
    toolkit
        .generate_request(&job)
        .map_err(|e| generation_error(e.to_string()))?;
    info!(csr = %csr_file.display(), key = %key_file.display(), "certificate request generated");

    let mut protected_key_file = None;
    if let Some(password) = spec.password.as_ref().filter(|p| !p.expose_secret().is_empty()) {
        let protected = base_dir.join(format!("{stem}.key"));
        toolkit
            .protect_key(&key_file, &protected, password)
            .map_err(|e| CertifyError::ToolInvocationError {
                stage: ToolStage::KeyProtection,
                message: e.to_string(),
            })?;
        info!(key = %protected.display(), "protected key written");
        protected_key_file = Some(protected);
    }

    Ok(GeneratedArtifact {
        csr_file,
        key_file,
        protected_key_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_replaces_leading_wildcard() {
        assert_eq!(
            file_stem("*.example.com", 2024),
            "wildcard.example.com-2024-2034"
        );
    }

    #[test]
    fn stem_keeps_plain_names() {
        assert_eq!(file_stem("api.example.com", 2024), "api.example.com-2024-2034");
    }

    #[test]
    fn stem_only_rewrites_the_leading_marker() {
        assert_eq!(file_stem("a.*.b", 2024), "a.*.b-2024-2034");
    }
}
