use std::fmt;

use serde::Deserialize;

/// Remote operations, used to pick a fallback error message and to label logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Register,
    CurrentUser,
    UpdateProfile,
    VerifyEmail,
    RequestPasswordReset,
    ResetPassword,
    ListDocuments,
    GetDocument,
    UploadDocument,
    UpdateDocument,
    DeleteDocument,
    ListRelationships,
    CreateRelationship,
    UpdateRelationship,
    DeleteRelationship,
}

impl Operation {
    /// Shown when the server gives no message of its own.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Login => "Login failed",
            Operation::Register => "Registration failed",
            Operation::CurrentUser => "Failed to load user",
            Operation::UpdateProfile => "Failed to update profile",
            Operation::VerifyEmail => "Email verification failed",
            Operation::RequestPasswordReset => "Failed to request password reset",
            Operation::ResetPassword => "Password reset failed",
            Operation::ListDocuments => "Failed to fetch documents",
            Operation::GetDocument => "Failed to fetch document",
            Operation::UploadDocument => "Upload failed",
            Operation::UpdateDocument => "Update failed",
            Operation::DeleteDocument => "Delete failed",
            Operation::ListRelationships => "Failed to fetch relationships",
            Operation::CreateRelationship => "Failed to create relationship",
            Operation::UpdateRelationship => "Failed to update relationship",
            Operation::DeleteRelationship => "Failed to delete relationship",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Login => "login",
            Operation::Register => "register",
            Operation::CurrentUser => "current_user",
            Operation::UpdateProfile => "update_profile",
            Operation::VerifyEmail => "verify_email",
            Operation::RequestPasswordReset => "request_password_reset",
            Operation::ResetPassword => "reset_password",
            Operation::ListDocuments => "list_documents",
            Operation::GetDocument => "get_document",
            Operation::UploadDocument => "upload_document",
            Operation::UpdateDocument => "update_document",
            Operation::DeleteDocument => "delete_document",
            Operation::ListRelationships => "list_relationships",
            Operation::CreateRelationship => "create_relationship",
            Operation::UpdateRelationship => "update_relationship",
            Operation::DeleteRelationship => "delete_relationship",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The request never got a response.
    Transport,
    /// A 2xx response whose body didn't match the expected shape.
    Decode,
}

/// A failed gateway call. `Display` is the user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    operation: Operation,
    kind: RequestErrorKind,
    message: String,
}

/// Error body shape: `{"message": "..."}`, or `{"msg": "..."}` from some
/// routes. `message` wins when both are present.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        [self.message, self.msg]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}

impl RequestError {
    pub fn new(operation: Operation, kind: RequestErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Build from a non-2xx response body, preferring the server's message.
    pub fn from_status(operation: Operation, status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| operation.fallback_message().to_string());
        Self::new(operation, RequestErrorKind::Status(status), message)
    }

    pub fn transport(operation: Operation) -> Self {
        Self::new(
            operation,
            RequestErrorKind::Transport,
            operation.fallback_message(),
        )
    }

    pub fn decode(operation: Operation) -> Self {
        Self::new(operation, RequestErrorKind::Decode, operation.fallback_message())
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn kind(&self) -> RequestErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            RequestErrorKind::Status(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == RequestErrorKind::Status(401)
    }
}
