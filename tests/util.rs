#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use certify::error::ToolkitError;
use certify::toolkit::{CertificateToolkit, P12Contents, RequestJob};
use secrecy::{ExposeSecret, SecretString};

pub fn workdir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

pub fn rsa_key(bits: usize) -> rsa::RsaPrivateKey {
    rsa::RsaPrivateKey::new(&mut rand_core::OsRng, bits).unwrap()
}

pub fn rsa_key_pem(key: &rsa::RsaPrivateKey) -> String {
    use rsa::pkcs8::{EncodePrivateKey, LineEnding};
    key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string()
}

/// Builds a minimal self-signed certificate for conversion fixtures,
/// returned as DER.
pub fn self_signed_certificate(private: &rsa::RsaPrivateKey, cn: &str) -> Vec<u8> {
    use std::str::FromStr;
    use std::time::{Duration, SystemTime};

    use der::asn1::{BitString, Null, UtcTime};
    use der::{Any, Encode};
    use rsa::pkcs1v15::SigningKey;
    use rsa::signature::{SignatureEncoding, Signer};
    use sha2::Sha256;
    use x509_cert::certificate::{CertificateInner, TbsCertificateInner};
    use x509_cert::name::RdnSequence;
    use x509_cert::serial_number::SerialNumber;
    use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
    use x509_cert::time::{Time, Validity};

    let name = RdnSequence::from_str(&format!("CN={cn}")).unwrap();
    let spki = SubjectPublicKeyInfoOwned::from_key(rsa::RsaPublicKey::from(private)).unwrap();
    let algorithm = AlgorithmIdentifierOwned {
        oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
        parameters: Some(Any::encode_from(&Null).unwrap()),
    };

    let now = SystemTime::now();
    let validity = Validity {
        not_before: Time::UtcTime(UtcTime::from_system_time(now).unwrap()),
        not_after: Time::UtcTime(
            UtcTime::from_system_time(now + Duration::from_secs(365 * 24 * 60 * 60)).unwrap(),
        ),
    };

    let tbs: TbsCertificateInner = TbsCertificateInner {
        version: x509_cert::Version::V3,
        serial_number: SerialNumber::new(&[1]).unwrap(),
        signature: algorithm.clone(),
        issuer: name.clone(),
        validity,
        subject: name,
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    };

    let signing_key: SigningKey<Sha256> = SigningKey::new(private.clone());
    let signature = signing_key.sign(&tbs.to_der().unwrap()).to_vec();

    let certificate = CertificateInner {
        tbs_certificate: tbs,
        signature_algorithm: algorithm,
        signature: BitString::from_bytes(&signature).unwrap(),
    };
    certificate.to_der().unwrap()
}

/// One recorded toolkit invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GenerateRequest {
        config: PathBuf,
        config_text: String,
        key: PathBuf,
        csr: PathBuf,
    },
    ProtectKey {
        input: PathBuf,
        output: PathBuf,
        password: String,
    },
    ExportP12 {
        cert: PathBuf,
        key: PathBuf,
        output: PathBuf,
        password: Option<String>,
    },
    ExtractP12 {
        bundle: PathBuf,
        contents: P12Contents,
        output: PathBuf,
        password: Option<String>,
    },
    ReencodePem {
        cert: PathBuf,
        output: PathBuf,
    },
}

/// In-memory toolkit fake: records every call, writes placeholder output
/// files on success, and can be told to fail individual operations.
#[derive(Debug, Default)]
pub struct RecordingToolkit {
    pub calls: Mutex<Vec<Call>>,
    pub fail_generate: bool,
    pub fail_protect: bool,
    pub fail_export: bool,
    /// Fails only the key-extraction step, leaving certificate extraction
    /// working.
    pub fail_extract_keys: bool,
}

impl RecordingToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected() -> ToolkitError {
        ToolkitError::InvalidInput("injected failure".to_string())
    }
}

fn secret(password: Option<&SecretString>) -> Option<String> {
    password.map(|p| p.expose_secret().to_string())
}

impl CertificateToolkit for RecordingToolkit {
    fn generate_request(&self, job: &RequestJob<'_>) -> Result<(), ToolkitError> {
        self.record(Call::GenerateRequest {
            config: job.config_path.to_path_buf(),
            config_text: fs::read_to_string(job.config_path).unwrap(),
            key: job.key_path.to_path_buf(),
            csr: job.csr_path.to_path_buf(),
        });
        if self.fail_generate {
            return Err(Self::injected());
        }
        fs::write(job.key_path, "fake key").unwrap();
        fs::write(job.csr_path, "fake csr").unwrap();
        Ok(())
    }

    fn protect_key(
        &self,
        key_path: &Path,
        output: &Path,
        password: &SecretString,
    ) -> Result<(), ToolkitError> {
        self.record(Call::ProtectKey {
            input: key_path.to_path_buf(),
            output: output.to_path_buf(),
            password: password.expose_secret().to_string(),
        });
        if self.fail_protect {
            return Err(Self::injected());
        }
        fs::write(output, "fake protected key").unwrap();
        Ok(())
    }

    fn export_p12(
        &self,
        cert_path: &Path,
        key_path: &Path,
        output: &Path,
        password: Option<&SecretString>,
    ) -> Result<(), ToolkitError> {
        self.record(Call::ExportP12 {
            cert: cert_path.to_path_buf(),
            key: key_path.to_path_buf(),
            output: output.to_path_buf(),
            password: secret(password),
        });
        if self.fail_export {
            return Err(Self::injected());
        }
        fs::write(output, "fake p12").unwrap();
        Ok(())
    }

    fn extract_p12(
        &self,
        bundle_path: &Path,
        contents: P12Contents,
        output: &Path,
        password: Option<&SecretString>,
    ) -> Result<(), ToolkitError> {
        self.record(Call::ExtractP12 {
            bundle: bundle_path.to_path_buf(),
            contents,
            output: output.to_path_buf(),
            password: secret(password),
        });
        if self.fail_extract_keys && contents == P12Contents::KeysOnly {
            return Err(Self::injected());
        }
        fs::write(output, "fake extracted").unwrap();
        Ok(())
    }

    fn reencode_pem(&self, cert_path: &Path, output: &Path) -> Result<(), ToolkitError> {
        self.record(Call::ReencodePem {
            cert: cert_path.to_path_buf(),
            output: output.to_path_buf(),
        });
        fs::write(output, "fake pem").unwrap();
        Ok(())
    }
}
