//! Rendering of the request profile consumed by the toolkit.
//!
//! The profile is fixed: 4096-bit RSA key, no interactive prompts, SHA-256
//! digest, SANs carried in a request-extension section. Rendering is a pure
//! function of the spec so a front end can recompute the preview on every
//! keystroke without side effects.

use std::fmt::Write;

use crate::error::{CertifyError, Result};
use crate::request::CertificateRequestSpec;

/// Key size fixed by the request profile.
pub const KEY_BITS: usize = 4096;

/// Digest fixed by the request profile.
pub const DIGEST: &str = "sha256";

/// Serializes the spec into the INI-like request configuration.
///
/// Sections are `[req]`, `[dn]`, `[req_ext]`, `[alt_names]`. The `[dn]`
/// keys are always exactly `C, ST, L, O, OU, CN` in that order, empty-valued
/// when the attribute is unset; `[alt_names]` lists `DNS.<i> = <value>`
/// starting at 1 in insertion order. Output is byte-identical for identical
/// input.
pub fn render_config(spec: &CertificateRequestSpec) -> String {
    let dn = &spec.subject;
    let mut config = format!(
        "[req]\n\
         default_bits = {KEY_BITS}\n\
         prompt = no\n\
         default_md = {DIGEST}\n\
         req_extensions = req_ext\n\
         distinguished_name = dn\n\
         \n\
         [dn]\n\
         C={}\n\
         ST={}\n\
         L={}\n\
         O={}\n\
         OU={}\n\
         CN={}\n\
         \n\
         [req_ext]\n\
         subjectAltName = @alt_names\n\
         \n\
         [alt_names]\n",
        dn.country.as_deref().unwrap_or(""),
        dn.state.as_deref().unwrap_or(""),
        dn.locality.as_deref().unwrap_or(""),
        dn.organization.as_deref().unwrap_or(""),
        dn.organization_unit.as_deref().unwrap_or(""),
        dn.common_name,
    );
    for (i, san) in spec.sans.iter().enumerate() {
        // writing to a String cannot fail
        let _ = writeln!(config, "DNS.{} = {}", i + 1, san);
    }
    config
}

/// Checks the spec's single mandatory field.
///
/// # Errors
/// [`CertifyError::MissingCommonName`] when the common name is empty.
pub fn validate(spec: &CertificateRequestSpec) -> Result<()> {
    if spec.subject.common_name.is_empty() {
        return Err(CertifyError::MissingCommonName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{DistinguishedName, SanList};

    fn spec(cn: &str, org: Option<&str>, sans: &[&str]) -> CertificateRequestSpec {
        CertificateRequestSpec {
            subject: DistinguishedName {
                common_name: cn.to_string(),
                organization: org.map(str::to_string),
                ..Default::default()
            },
            sans: sans.iter().collect::<SanList>(),
            password: None,
        }
    }

    #[test]
    fn render_is_deterministic() {
        let spec = spec("test.local", Some("Acme"), &["a.test.local"]);
        assert_eq!(render_config(&spec), render_config(&spec));
    }

    #[test]
    fn renders_alt_names_in_insertion_order() {
        let spec = spec("test.local", Some("Acme"), &["a.test.local", "b.test.local"]);
        let config = render_config(&spec);
        let alt_names = config.split("[alt_names]\n").nth(1).unwrap();
        assert_eq!(alt_names, "DNS.1 = a.test.local\nDNS.2 = b.test.local\n");
    }

    #[test]
    fn renders_all_dn_keys_in_fixed_order() {
        let spec = spec("test.local", None, &[]);
        let config = render_config(&spec);
        assert!(config.contains("[dn]\nC=\nST=\nL=\nO=\nOU=\nCN=test.local\n"));
    }

    #[test]
    fn renders_fixed_profile() {
        let config = render_config(&spec("test.local", None, &[]));
        assert!(config.starts_with(
            "[req]\ndefault_bits = 4096\nprompt = no\ndefault_md = sha256\n"
        ));
        assert!(config.contains("subjectAltName = @alt_names"));
    }

    #[test]
    fn validate_requires_common_name() {
        assert!(matches!(
            validate(&spec("", Some("Acme"), &["a.test.local"])),
            Err(CertifyError::MissingCommonName)
        ));
        assert!(validate(&spec("test.local", None, &[])).is_ok());
    }
}
