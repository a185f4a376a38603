//! # Domain models mirrored from the records API
//!
//! Everything the state containers hold is defined here. The types are
//! `Serialize + Deserialize` and follow the server's camelCase wire format so
//! the gateway can decode responses straight into them.
//!
//! ## Types
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`Role`] | Account kind: doctor, patient or admin. |
//! | [`RoleDetails`] | Role-dependent profile fields, tagged on the wire by `userType`. |
//! | [`UserProfile`] | The signed-in user as returned by `/api/auth/me`. |
//! | [`AuthToken`] | A non-empty bearer token, sent as `x-auth-token`. |
//! | [`Session`] | Token plus profile; exists only while signed in. |
//! | [`Document`] | An uploaded medical document. |
//! | [`Relationship`] | A doctor/patient link and its status. |
//!
//! Record ids are server-assigned. Both `id` and Mongo-style `_id` are
//! accepted when decoding.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Admin => "admin",
        }
    }

    /// Parse the wire name of a role.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "doctor" => Some(Role::Doctor),
            "patient" => Some(Role::Patient),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile fields that only exist for a given role.
///
/// Serialised flat next to the other profile fields, with the role in
/// `userType`:
///
/// ```json
/// { "userType": "doctor", "specialization": "Cardiology", "registrationNumber": "MC-1" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "userType", rename_all = "lowercase")]
pub enum RoleDetails {
    Doctor {
        #[serde(default)]
        specialization: String,
        #[serde(default, rename = "registrationNumber")]
        registration_number: String,
    },
    Patient {
        #[serde(default, rename = "aadhaarNumber")]
        aadhaar_number: String,
    },
    Admin,
}

impl RoleDetails {
    /// Empty details for a role, used to seed forms.
    pub fn empty(role: Role) -> Self {
        match role {
            Role::Doctor => RoleDetails::Doctor {
                specialization: String::new(),
                registration_number: String::new(),
            },
            Role::Patient => RoleDetails::Patient {
                aadhaar_number: String::new(),
            },
            Role::Admin => RoleDetails::Admin,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleDetails::Doctor { .. } => Role::Doctor,
            RoleDetails::Patient { .. } => Role::Patient,
            RoleDetails::Admin => Role::Admin,
        }
    }
}

/// The signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserProfileWire")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub details: RoleDetails,
}

impl UserProfile {
    pub fn role(&self) -> Role {
        self.details.role()
    }
}

#[derive(Deserialize)]
struct UserProfileWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    name: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(flatten)]
    details: RoleDetails,
}

impl TryFrom<UserProfileWire> for UserProfile {
    type Error = String;

    fn try_from(wire: UserProfileWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: pick_id(wire.id, wire.mongo_id, "user")?,
            name: wire.name,
            email: wire.email,
            phone: wire.phone,
            address: wire.address,
            details: wire.details,
        })
    }
}

/// Servers may send `id`, `_id` or both (Mongoose virtuals), and either may
/// be null. `id` wins when both are set.
fn pick_id(id: Option<String>, mongo_id: Option<String>, what: &str) -> Result<String, String> {
    id.into_iter()
        .chain(mongo_id)
        .find(|s| !s.is_empty())
        .ok_or_else(|| format!("{what} has no id"))
}

/// Raised when a session would be built from an unusable token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session token is empty")]
    EmptyToken,
}

/// Bearer token issued by the server. Never empty.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AuthToken {
    type Error = SessionError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        AuthToken::new(raw)
    }
}

impl From<AuthToken> for String {
    fn from(token: AuthToken) -> Self {
        token.0
    }
}

// Tokens end up in logs through `Debug` on sessions; keep them out.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// An authenticated user and the token that proves it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    token: AuthToken,
    profile: UserProfile,
}

impl Session {
    pub fn new(token: AuthToken, profile: UserProfile) -> Self {
        Self { token, profile }
    }

    pub fn user_id(&self) -> &str {
        &self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Replace the profile, keeping the token.
    pub fn set_profile(&mut self, profile: UserProfile) {
        self.profile = profile;
    }
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

record_id!(
    /// Server-assigned document id.
    DocumentId
);
record_id!(
    /// Server-assigned relationship id.
    RelationshipId
);

/// A medical document stored by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DocumentWire")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Owning patient.
    pub patient_id: String,
    /// Owning doctor.
    pub doctor_id: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    patient_id: String,
    doctor_id: String,
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<DocumentWire> for Document {
    type Error = String;

    fn try_from(wire: DocumentWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DocumentId(pick_id(wire.id, wire.mongo_id, "document")?),
            title: wire.title,
            description: wire.description,
            patient_id: wire.patient_id,
            doctor_id: wire.doctor_id,
            file_url: wire.file_url,
            upload_date: wire.upload_date,
            is_private: wire.is_private,
            tags: wire.tags,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    #[default]
    Pending,
    Active,
    Rejected,
    Ended,
}

impl RelationshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Active => "active",
            RelationshipStatus::Rejected => "rejected",
            RelationshipStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link between a doctor and a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RelationshipWire")]
pub struct Relationship {
    pub id: RelationshipId,
    pub doctor_id: String,
    pub patient_id: String,
    #[serde(default)]
    pub status: RelationshipStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    doctor_id: String,
    patient_id: String,
    #[serde(default)]
    status: RelationshipStatus,
}

impl TryFrom<RelationshipWire> for Relationship {
    type Error = String;

    fn try_from(wire: RelationshipWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RelationshipId(pick_id(wire.id, wire.mongo_id, "relationship")?),
            doctor_id: wire.doctor_id,
            patient_id: wire.patient_id,
            status: wire.status,
        })
    }
}
