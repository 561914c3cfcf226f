pub mod config;
pub mod generate;

use bon::Builder;
use secrecy::SecretString;

/// Distinguished name parameters for a certificate request.
///
/// This struct represents the subject identity of the request.
///
/// # Fields
/// * `common_name` - The common name (CN). Mandatory; the only attribute
///   validated before a request can be built.
/// * `country` - The country (C).
/// * `state` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
#[derive(Clone, Debug, Builder, Default)]
pub struct DistinguishedName {
    pub common_name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
}

/// Selects a distinguished-name attribute on a [`RequestForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectField {
    Country,
    State,
    Locality,
    Organization,
    OrganizationUnit,
    CommonName,
}

/// Ordered Subject Alternative Name list.
///
/// Insertion order is presentation order and determines the `DNS.<i>` index
/// used when rendering. Duplicates are permitted. The list is created empty
/// per session and mutated only by append and remove-last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanList(Vec<String>);

impl SanList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims the value and appends it; empty values are ignored.
    pub fn push(&mut self, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.0.push(value.to_string());
        }
    }

    /// Removes the most recently added name. No-op on an empty list.
    pub fn remove_last(&mut self) {
        self.0.pop();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for SanList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut list = SanList::new();
        for value in iter {
            list.push(value.as_ref());
        }
        list
    }
}

/// Immutable snapshot of everything a generation run needs.
///
/// Built fresh from the current form values on every preview render and on
/// generate.
///
/// # Fields
/// * `subject` - The distinguished name of the request subject.
/// * `sans` - The ordered SAN list.
/// * `password` - Optional key-protection password. When set, generation
///   additionally writes a password-encrypted copy of the private key.
#[derive(Clone, Debug, Builder)]
pub struct CertificateRequestSpec {
    pub subject: DistinguishedName,
    #[builder(default)]
    pub sans: SanList,
    pub password: Option<SecretString>,
}

/// Mutable identity state driven by the front end.
///
/// The form is a pure data holder: it trims and stores what it is given and
/// performs no validation beyond that. After any mutation the front end is
/// expected to take a [`RequestForm::snapshot`] and re-render the preview
/// with [`config::render_config`]; mandatory-field checking happens in
/// [`config::validate`] when a request is actually built.
#[derive(Clone, Debug, Default)]
pub struct RequestForm {
    common_name: String,
    country: String,
    state: String,
    locality: String,
    organization: String,
    organization_unit: String,
    sans: SanList,
    password: Option<SecretString>,
}

impl RequestForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims the value and stores it under the selected attribute.
    pub fn set_field(&mut self, field: SubjectField, value: &str) {
        let value = value.trim().to_string();
        match field {
            SubjectField::Country => self.country = value,
            SubjectField::State => self.state = value,
            SubjectField::Locality => self.locality = value,
            SubjectField::Organization => self.organization = value,
            SubjectField::OrganizationUnit => self.organization_unit = value,
            SubjectField::CommonName => self.common_name = value,
        }
    }

    /// Appends a SAN if non-empty after trimming.
    pub fn add_san(&mut self, value: &str) {
        self.sans.push(value);
    }

    /// Removes the most recently added SAN. Never errors on an empty list.
    pub fn remove_last_san(&mut self) {
        self.sans.remove_last();
    }

    /// Sets the key-protection password. A blank value clears it.
    pub fn set_password(&mut self, value: &str) {
        let value = value.trim();
        self.password = if value.is_empty() {
            None
        } else {
            Some(SecretString::from(value.to_string()))
        };
    }

    pub fn sans(&self) -> &SanList {
        &self.sans
    }

    /// Builds an immutable [`CertificateRequestSpec`] from the current
    /// field values. Empty optional attributes become `None`.
    pub fn snapshot(&self) -> CertificateRequestSpec {
        fn opt(value: &str) -> Option<String> {
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }

        CertificateRequestSpec {
            subject: DistinguishedName {
                common_name: self.common_name.clone(),
                country: opt(&self.country),
                state: opt(&self.state),
                locality: opt(&self.locality),
                organization: opt(&self.organization),
                organization_unit: opt(&self.organization_unit),
            },
            sans: self.sans.clone(),
            password: self.password.clone(),
        }
    }
}
