//! Production toolkit built on the RustCrypto stack.
//!
//! Key-pair generation, PKCS#10 assembly and signing, PKCS#8 password
//! wrapping, and PKCS#12 keystore handling all happen in-process; no
//! external tool is spawned.

use std::fs;
use std::path::Path;

use const_oid::AssociatedOid;
use const_oid::db::{rfc4519, rfc5912};
use der::asn1::{BitString, Ia5String, Null, OctetString, PrintableStringRef, SetOfVec, Utf8StringRef};
use der::{Any, Decode, Encode, EncodePem};
use p12_keystore::{
    Certificate as BundleCertificate, KeyStore, KeyStoreEntry, PrivateKeyChain,
};
use pkcs8::LineEnding;
use rand_core::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::signature::{SignatureEncoding, Signer};
use rsa::{RsaPrivateKey, RsaPublicKey};
use secrecy::{ExposeSecret, SecretString};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use tracing::debug;
use x509_cert::attr::{Attribute, Attributes, AttributeTypeAndValue};
use x509_cert::ext::Extension;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};
use x509_cert::request::{CertReq, CertReqInfo, ExtensionReq, Version};
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::error::ToolkitError;
use crate::pem_utils;
use crate::request::{DistinguishedName, SanList, config};
use crate::toolkit::{CertificateToolkit, P12Contents, RequestJob};

/// Certificate toolkit backed by in-process cryptography.
#[derive(Debug, Clone)]
pub struct NativeToolkit {
    key_bits: usize,
}

impl NativeToolkit {
    /// Toolkit following the fixed request profile (4096-bit keys).
    pub fn new() -> Self {
        Self {
            key_bits: config::KEY_BITS,
        }
    }

    /// Toolkit generating keys of a non-default size. Useful where the
    /// profile's 4096-bit generation time is prohibitive.
    pub fn with_key_bits(key_bits: usize) -> Self {
        Self { key_bits }
    }
}

impl Default for NativeToolkit {
    fn default() -> Self {
        Self::new()
    }
}

fn passphrase(password: Option<&SecretString>) -> &str {
    password.map(|p| p.expose_secret()).unwrap_or("")
}

/// Builds the subject RDN sequence in `[dn]` attribute order.
///
/// One RDN per present attribute; values are encoded structurally, so
/// free-text values containing RFC 4514 separators survive intact. The
/// country attribute is a PrintableString per the X.520 profile, the rest
/// are UTF8Strings.
fn subject_name(dn: &DistinguishedName) -> Result<RdnSequence, ToolkitError> {
    let attributes = [
        (rfc4519::C, dn.country.as_deref()),
        (rfc4519::ST, dn.state.as_deref()),
        (rfc4519::L, dn.locality.as_deref()),
        (rfc4519::O, dn.organization.as_deref()),
        (rfc4519::OU, dn.organization_unit.as_deref()),
        (rfc4519::CN, Some(dn.common_name.as_str())),
    ];

    let mut rdns = Vec::new();
    for (oid, value) in attributes {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        let value = if oid == rfc4519::C {
            Any::encode_from(&PrintableStringRef::new(value)?)?
        } else {
            Any::encode_from(&Utf8StringRef::new(value)?)?
        };
        let atv = AttributeTypeAndValue { oid, value };
        rdns.push(RelativeDistinguishedName(SetOfVec::try_from(vec![atv])?));
    }
    Ok(RdnSequence(rdns))
}

/// Encodes the SAN list as a subjectAltName extension of DNS names.
fn san_extension(sans: &SanList) -> Result<Extension, ToolkitError> {
    let names = sans
        .iter()
        .map(|name| Ia5String::new(name).map(GeneralName::DnsName))
        .collect::<Result<Vec<_>, _>>()?;
    let san = SubjectAltName(names);
    Ok(Extension {
        extn_id: SubjectAltName::OID,
        critical: false,
        extn_value: OctetString::new(san.to_der()?)?,
    })
}

/// Reads certificate bytes that may be PEM or DER on disk, returning DER.
fn read_certificate_der(path: &Path) -> Result<Vec<u8>, ToolkitError> {
    let bytes = fs::read(path)?;
    let der = if bytes.trim_ascii_start().starts_with(b"-----BEGIN") {
        let text = String::from_utf8(bytes)
            .map_err(|e| ToolkitError::DecodingError(e.to_string()))?;
        pem_utils::pem_to_der(&text)?
    } else {
        bytes
    };
    x509_cert::Certificate::from_der(&der)?;
    Ok(der)
}

/// Reads a PEM private key, normalizing it to PKCS#8 DER.
///
/// PKCS#8 material passes through untouched regardless of key type; the
/// legacy PKCS#1 encoding is RSA by definition and gets rewrapped.
fn read_private_key_pkcs8(path: &Path) -> Result<Vec<u8>, ToolkitError> {
    let text = fs::read_to_string(path)?;
    let block = pem::parse(&text)?;
    match block.tag() {
        "PRIVATE KEY" => Ok(block.contents().to_vec()),
        "RSA PRIVATE KEY" => {
            let key = RsaPrivateKey::from_pkcs1_der(block.contents())?;
            Ok(key.to_pkcs8_der()?.as_bytes().to_vec())
        }
        "ENCRYPTED PRIVATE KEY" => Err(ToolkitError::InvalidInput(
            "encrypted private keys must be decrypted before bundling".to_string(),
        )),
        other => Err(ToolkitError::InvalidInput(format!(
            "unsupported private key PEM label: {other}"
        ))),
    }
}

impl CertificateToolkit for NativeToolkit {
    fn generate_request(&self, job: &RequestJob<'_>) -> Result<(), ToolkitError> {
        debug!(bits = self.key_bits, config = %job.config_path.display(), "generating key pair");
        let private = RsaPrivateKey::new(&mut OsRng, self.key_bits)
            .map_err(|e| ToolkitError::KeyGenerationError(e.to_string()))?;
        let key_pem = private.to_pkcs8_pem(LineEnding::LF)?;
        fs::write(job.key_path, key_pem.as_bytes())?;

        let public = RsaPublicKey::from(&private);
        let public_key = SubjectPublicKeyInfoOwned::from_key(public)
            .map_err(|e| ToolkitError::EncodingError(e.to_string()))?;

        let mut attributes = Attributes::default();
        if !job.spec.sans.is_empty() {
            let extension_req = ExtensionReq(vec![san_extension(&job.spec.sans)?]);
            attributes.insert(Attribute::try_from(extension_req)?)?;
        }

        let info = CertReqInfo {
            version: Version::V1,
            subject: subject_name(&job.spec.subject)?,
            public_key,
            attributes,
        };

        let signing_key: SigningKey<Sha256> = SigningKey::new(private);
        let signature = signing_key.sign(&info.to_der()?).to_vec();

        let request = CertReq {
            info,
            algorithm: AlgorithmIdentifierOwned {
                oid: rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(Any::encode_from(&Null)?),
            },
            signature: BitString::from_bytes(&signature)?,
        };
        fs::write(job.csr_path, request.to_pem(LineEnding::LF)?)?;
        Ok(())
    }

    fn protect_key(
        &self,
        key_path: &Path,
        output: &Path,
        password: &SecretString,
    ) -> Result<(), ToolkitError> {
        let private = RsaPrivateKey::read_pkcs8_pem_file(key_path)?;
        let pem = private.to_pkcs8_encrypted_pem(
            &mut OsRng,
            password.expose_secret().as_bytes(),
            LineEnding::LF,
        )?;
        fs::write(output, pem.as_bytes())?;
        Ok(())
    }

    fn export_p12(
        &self,
        cert_path: &Path,
        key_path: &Path,
        output: &Path,
        password: Option<&SecretString>,
    ) -> Result<(), ToolkitError> {
        let cert_der = read_certificate_der(cert_path)?;
        let key_der = read_private_key_pkcs8(key_path)?;

        let certificate = BundleCertificate::from_der(&cert_der)?;
        let key_id = Sha1::digest(&cert_der);
        let chain = PrivateKeyChain::new(
            key_der,
            key_id.as_slice(),
            vec![certificate],
        );

        let mut store = KeyStore::new();
        store.add_entry("certify", KeyStoreEntry::PrivateKeyChain(chain));
        let data = store.writer(passphrase(password)).write()?;
        fs::write(output, data)?;
        Ok(())
    }

    fn extract_p12(
        &self,
        bundle_path: &Path,
        contents: P12Contents,
        output: &Path,
        password: Option<&SecretString>,
    ) -> Result<(), ToolkitError> {
        let data = fs::read(bundle_path)?;
        let store = KeyStore::from_pkcs12(&data, passphrase(password))?;

        let mut out = String::new();
        match contents {
            P12Contents::CertificatesOnly => {
                if let Some((_, chain)) = store.private_key_chain() {
                    // entity certificate leads the chain
                    let cert = chain.chain().first().ok_or_else(|| {
                        ToolkitError::InvalidInput(
                            "bundle has no certificate for its key".to_string(),
                        )
                    })?;
                    out.push_str(&pem_utils::der_to_pem(cert.as_der(), "CERTIFICATE"));
                } else {
                    for (_, entry) in store.entries() {
                        if let KeyStoreEntry::Certificate(cert) = entry {
                            out.push_str(&pem_utils::der_to_pem(cert.as_der(), "CERTIFICATE"));
                        }
                    }
                }
                if out.is_empty() {
                    return Err(ToolkitError::InvalidInput(
                        "no certificates in bundle".to_string(),
                    ));
                }
            }
            P12Contents::KeysOnly => {
                let (_, chain) = store.private_key_chain().ok_or_else(|| {
                    ToolkitError::InvalidInput("no private key in bundle".to_string())
                })?;
                out.push_str(&pem_utils::der_to_pem(chain.key(), "PRIVATE KEY"));
            }
            P12Contents::Everything => {
                for (_, entry) in store.entries() {
                    match entry {
                        KeyStoreEntry::PrivateKeyChain(chain) => {
                            out.push_str(&pem_utils::der_to_pem(chain.key(), "PRIVATE KEY"));
                            for cert in chain.chain() {
                                out.push_str(&pem_utils::der_to_pem(
                                    cert.as_der(),
                                    "CERTIFICATE",
                                ));
                            }
                        }
                        KeyStoreEntry::Certificate(cert) => {
                            out.push_str(&pem_utils::der_to_pem(cert.as_der(), "CERTIFICATE"));
                        }
                        KeyStoreEntry::Secret(_) => {}
                    }
                }
                if out.is_empty() {
                    return Err(ToolkitError::InvalidInput("bundle is empty".to_string()));
                }
            }
        }

        fs::write(output, out)?;
        Ok(())
    }

    fn reencode_pem(&self, cert_path: &Path, output: &Path) -> Result<(), ToolkitError> {
        let der = read_certificate_der(cert_path)?;
        fs::write(output, pem_utils::der_to_pem(&der, "CERTIFICATE"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_name_keeps_dn_order_and_skips_absent() {
        let dn = DistinguishedName {
            common_name: "test.local".to_string(),
            country: Some("US".to_string()),
            organization: Some("Acme, Inc.".to_string()),
            ..Default::default()
        };
        let name = subject_name(&dn).unwrap();
        let oids: Vec<_> = name
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter().map(|atv| atv.oid))
            .collect();
        assert_eq!(oids, [rfc4519::C, rfc4519::O, rfc4519::CN]);
    }

    #[test]
    fn subject_name_survives_rfc4514_separators() {
        let dn = DistinguishedName {
            common_name: "test.local".to_string(),
            organization: Some("Acme, Inc.".to_string()),
            ..Default::default()
        };
        let name = subject_name(&dn).unwrap();
        let decoded = RdnSequence::from_der(&name.to_der().unwrap()).unwrap();
        let org = decoded.0[0].0.iter().next().unwrap();
        assert_eq!(
            org.value.decode_as::<String>().unwrap(),
            "Acme, Inc."
        );
    }

    #[test]
    fn san_extension_round_trips_in_order() {
        let sans: SanList = ["a.test.local", "b.test.local"].iter().collect();
        let extension = san_extension(&sans).unwrap();
        assert_eq!(extension.extn_id, SubjectAltName::OID);
        assert!(!extension.critical);

        let decoded = SubjectAltName::from_der(extension.extn_value.as_bytes()).unwrap();
        let names: Vec<_> = decoded
            .0
            .iter()
            .map(|name| match name {
                GeneralName::DnsName(dns) => dns.to_string(),
                other => panic!("unexpected general name: {other:?}"),
            })
            .collect();
        assert_eq!(names, ["a.test.local", "b.test.local"]);
    }
}
