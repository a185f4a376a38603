//! # Form validation
//!
//! Synchronous, field-level checks run before anything reaches the network.
//! Each form's `validate` either returns the request payload built from the
//! trimmed input or a [`ValidationErrors`] map of field name → message. Field
//! names are the wire names (`confirmPassword`, `aadhaarNumber`, …) so views
//! can look messages up by the same key they submit.
//!
//! Role-dependent rules are a single match on [`RoleDetails`]: doctors must
//! give a specialization and registration number, patients a 12-digit
//! Aadhaar number.

use std::collections::BTreeMap;

use crate::models::RoleDetails;
use crate::requests::{
    Credentials, DocumentFile, NewDocument, NewRelationship, PasswordReset, ProfileUpdate,
    Registration,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const AADHAAR_LEN: usize = 12;

#[derive(Clone, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// First message wins; later rules for the same field are skipped.
    fn add(&mut self, field: &'static str, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// `+` prefix optional, then digits, spaces and dashes.
fn is_valid_phone(phone: &str) -> bool {
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == '-')
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn check_email(email: &str, errors: &mut ValidationErrors) {
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Invalid email address");
    }
}

fn check_password(password: &str, field: &'static str, errors: &mut ValidationErrors) {
    if password.is_empty() {
        errors.add(field, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(field, "Password must be at least 6 characters");
    }
}

fn check_required(value: &str, field: &'static str, message: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Required fields per role.
fn check_role_details(details: &RoleDetails, errors: &mut ValidationErrors) {
    match details {
        RoleDetails::Doctor {
            specialization,
            registration_number,
        } => {
            check_required(
                specialization,
                "specialization",
                "Specialization is required for doctors",
                errors,
            );
            check_required(
                registration_number,
                "registrationNumber",
                "Registration number is required for doctors",
                errors,
            );
        }
        RoleDetails::Patient { aadhaar_number } => {
            let aadhaar = aadhaar_number.trim();
            if aadhaar.is_empty() {
                errors.add("aadhaarNumber", "Aadhaar number is required for patients");
            } else if aadhaar.len() != AADHAAR_LEN || !aadhaar.chars().all(|c| c.is_ascii_digit()) {
                errors.add("aadhaarNumber", "Aadhaar number must be 12 digits");
            }
        }
        RoleDetails::Admin => {}
    }
}

fn trimmed_details(details: &RoleDetails) -> RoleDetails {
    match details {
        RoleDetails::Doctor {
            specialization,
            registration_number,
        } => RoleDetails::Doctor {
            specialization: specialization.trim().to_string(),
            registration_number: registration_number.trim().to_string(),
        },
        RoleDetails::Patient { aadhaar_number } => RoleDetails::Patient {
            aadhaar_number: aadhaar_number.trim().to_string(),
        },
        RoleDetails::Admin => RoleDetails::Admin,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = self.email.trim();
        check_email(email, &mut errors);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result(|| Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    /// `None` until an account type is picked.
    pub details: Option<RoleDetails>,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = self.email.trim();
        check_email(email, &mut errors);
        check_password(&self.password, "password", &mut errors);
        if self.confirm_password.is_empty() {
            errors.add("confirmPassword", "Confirm Password is required");
        } else if self.confirm_password != self.password {
            errors.add("confirmPassword", "Passwords must match");
        }
        check_required(&self.name, "name", "Name is required", &mut errors);
        match &self.details {
            None => errors.add("userType", "User type is required"),
            Some(RoleDetails::Admin) => errors.add("userType", "Please select a valid user type"),
            Some(details) => check_role_details(details, &mut errors),
        }
        if !self.phone.trim().is_empty() && !is_valid_phone(self.phone.trim()) {
            errors.add("phone", "Invalid phone number");
        }

        errors.into_result(|| Registration {
            email: email.to_string(),
            password: self.password.clone(),
            name: self.name.trim().to_string(),
            phone: non_empty(&self.phone),
            address: non_empty(&self.address),
            details: self
                .details
                .as_ref()
                .map(trimmed_details)
                .unwrap_or(RoleDetails::Admin),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub details: RoleDetails,
}

impl ProfileForm {
    /// Seed the form from the current profile.
    pub fn from_profile(profile: &crate::models::UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            address: profile.address.clone().unwrap_or_default(),
            details: profile.details.clone(),
        }
    }

    pub fn validate(&self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_required(&self.name, "name", "Name is required", &mut errors);
        let email = self.email.trim();
        check_email(email, &mut errors);
        if !self.phone.trim().is_empty() && !is_valid_phone(self.phone.trim()) {
            errors.add("phone", "Invalid phone number");
        }
        check_role_details(&self.details, &mut errors);

        errors.into_result(|| ProfileUpdate {
            name: self.name.trim().to_string(),
            email: email.to_string(),
            phone: non_empty(&self.phone),
            address: non_empty(&self.address),
            details: trimmed_details(&self.details),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentForm {
    pub title: String,
    pub description: String,
    pub patient_id: String,
    pub doctor_id: String,
    /// Comma-separated, as typed.
    pub tags: String,
    pub is_private: bool,
    pub file: Option<DocumentFile>,
}

impl Default for DocumentForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            patient_id: String::new(),
            doctor_id: String::new(),
            tags: String::new(),
            is_private: true,
            file: None,
        }
    }
}

impl DocumentForm {
    pub fn validate(&self) -> Result<NewDocument, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_required(&self.title, "title", "Title is required", &mut errors);
        if self.file.is_none() {
            errors.add("file", "File is required");
        }
        check_required(&self.patient_id, "patientId", "Patient ID is required", &mut errors);
        check_required(&self.doctor_id, "doctorId", "Doctor ID is required", &mut errors);

        let Some(file) = self.file.clone().filter(|_| errors.is_empty()) else {
            return Err(errors);
        };
        Ok(NewDocument {
            file,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            patient_id: self.patient_id.trim().to_string(),
            doctor_id: self.doctor_id.trim().to_string(),
            tags: self
                .tags
                .split(',')
                .filter_map(non_empty)
                .collect(),
            is_private: self.is_private,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationshipForm {
    pub doctor_id: String,
    pub patient_id: String,
}

impl RelationshipForm {
    pub fn validate(&self) -> Result<NewRelationship, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_required(&self.doctor_id, "doctorId", "Doctor ID is required", &mut errors);
        check_required(&self.patient_id, "patientId", "Patient ID is required", &mut errors);
        errors.into_result(|| NewRelationship {
            doctor_id: self.doctor_id.trim().to_string(),
            patient_id: self.patient_id.trim().to_string(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordResetForm {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordResetForm {
    pub fn validate(&self) -> Result<PasswordReset, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_required(&self.token, "token", "Reset token is required", &mut errors);
        check_password(&self.new_password, "newPassword", &mut errors);
        if self.confirm_password != self.new_password {
            errors.add("confirmPassword", "Passwords must match");
        }
        errors.into_result(|| PasswordReset {
            token: self.token.trim().to_string(),
            new_password: self.new_password.clone(),
        })
    }
}
