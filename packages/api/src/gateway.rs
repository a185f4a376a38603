//! # HTTP gateway
//!
//! [`Gateway`] issues every call to the records API. It owns the
//! [`reqwest::Client`], the base URL and a [`TokenStore`]; the token is read
//! from the store at call time and sent as `x-auth-token` whenever one is
//! present, so a login or logout takes effect on the very next call.
//!
//! Non-2xx responses and transport failures become a [`RequestError`] whose
//! message is the server's `message` field or a per-operation fallback.
//! Nothing is retried.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use store::requests::{
    Credentials, DocumentPatch, NewDocument, NewRelationship, PasswordReset, ProfileUpdate,
    Registration, RelationshipUpdate,
};
use store::{
    AuthToken, ClientConfig, Document, DocumentId, Relationship, RelationshipId,
    RelationshipStatus, Session, TokenStore, UserProfile,
};

use crate::error::{Operation, RequestError};

pub const TOKEN_HEADER: &str = "x-auth-token";

/// `POST /api/auth/login` and `/register` response.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Clone, Debug)]
pub struct Gateway<T> {
    client: Client,
    base_url: String,
    tokens: T,
}

impl<T: TokenStore> Gateway<T> {
    pub fn new(config: &ClientConfig, tokens: T) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url().to_string(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    pub fn has_token(&self) -> bool {
        self.tokens.load().is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match self.tokens.load() {
            Some(token) => builder.header(TOKEN_HEADER, token.as_str()),
            None => builder,
        }
    }

    async fn execute(
        &self,
        op: Operation,
        builder: RequestBuilder,
    ) -> Result<Response, RequestError> {
        let response = builder.send().await.map_err(|e| {
            warn!("{op}: request failed: {e}");
            RequestError::transport(op)
        })?;
        let status = response.status();
        if status.is_success() {
            debug!("{op}: {status}");
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = RequestError::from_status(op, status.as_u16(), &body);
        warn!("{op}: {status}: {err}");
        Err(err)
    }

    async fn send<R: DeserializeOwned>(
        &self,
        op: Operation,
        builder: RequestBuilder,
    ) -> Result<R, RequestError> {
        let response = self.execute(op, builder).await?;
        response.json().await.map_err(|e| {
            warn!("{op}: unexpected response body: {e}");
            RequestError::decode(op)
        })
    }

    async fn authenticate(
        &self,
        op: Operation,
        builder: RequestBuilder,
    ) -> Result<Session, RequestError> {
        let AuthResponse { token, user } = self.send(op, builder).await?;
        let token = AuthToken::new(token).map_err(|e| {
            warn!("{op}: {e}");
            RequestError::decode(op)
        })?;
        Ok(Session::new(token, user))
    }

    /// The returned session's token is not persisted here; the caller decides.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, RequestError> {
        let op = Operation::Login;
        let builder = self.request(Method::POST, "/api/auth/login").json(credentials);
        self.authenticate(op, builder).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<Session, RequestError> {
        let op = Operation::Register;
        let builder = self
            .request(Method::POST, "/api/auth/register")
            .json(registration);
        self.authenticate(op, builder).await
    }

    /// `None` without a network call when no token is stored.
    pub async fn fetch_current_user(&self) -> Result<Option<UserProfile>, RequestError> {
        if !self.has_token() {
            return Ok(None);
        }
        self.current_user().await.map(Some)
    }

    pub(crate) async fn current_user(&self) -> Result<UserProfile, RequestError> {
        let builder = self.request(Method::GET, "/api/auth/me");
        self.send(Operation::CurrentUser, builder).await
    }

    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, RequestError> {
        let builder = self.request(Method::PUT, "/api/auth/profile").json(update);
        self.send(Operation::UpdateProfile, builder).await
    }

    pub async fn verify_email(&self, token: &str) -> Result<String, RequestError> {
        let builder = self
            .request(Method::POST, "/api/auth/verify-email")
            .json(&TokenBody { token });
        let body: MessageResponse = self.send(Operation::VerifyEmail, builder).await?;
        Ok(body.message)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<String, RequestError> {
        let builder = self
            .request(Method::POST, "/api/auth/forgot-password")
            .json(&EmailBody { email });
        let body: MessageResponse = self.send(Operation::RequestPasswordReset, builder).await?;
        Ok(body.message)
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<String, RequestError> {
        let builder = self
            .request(Method::POST, "/api/auth/reset-password")
            .json(reset);
        let body: MessageResponse = self.send(Operation::ResetPassword, builder).await?;
        Ok(body.message)
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, RequestError> {
        let builder = self.request(Method::GET, "/api/documents");
        self.send(Operation::ListDocuments, builder).await
    }

    pub async fn get_document(&self, id: &DocumentId) -> Result<Document, RequestError> {
        let builder = self.request(Method::GET, &format!("/api/documents/{id}"));
        self.send(Operation::GetDocument, builder).await
    }

    /// Multipart fields: `file`, `title`, `description`, `patientId`,
    /// `doctorId`, `tags` (comma-joined, omitted when empty), `isPrivate`.
    pub async fn upload_document(&self, doc: &NewDocument) -> Result<Document, RequestError> {
        let op = Operation::UploadDocument;
        let file = Part::bytes(doc.file.bytes.clone()).file_name(doc.file.name.clone());
        let file = match &doc.file.content_type {
            Some(content_type) => file.mime_str(content_type).map_err(|e| {
                warn!("{op}: bad content type {content_type:?}: {e}");
                RequestError::transport(op)
            })?,
            None => file,
        };

        let mut form = Form::new()
            .part("file", file)
            .text("title", doc.title.clone())
            .text("description", doc.description.clone())
            .text("patientId", doc.patient_id.clone())
            .text("doctorId", doc.doctor_id.clone());
        if !doc.tags.is_empty() {
            form = form.text("tags", doc.tags.join(","));
        }
        form = form.text("isPrivate", doc.is_private.to_string());

        let builder = self
            .request(Method::POST, "/api/documents/upload")
            .multipart(form);
        self.send(op, builder).await
    }

    pub async fn update_document(
        &self,
        id: &DocumentId,
        patch: &DocumentPatch,
    ) -> Result<Document, RequestError> {
        let builder = self
            .request(Method::PUT, &format!("/api/documents/{id}"))
            .json(patch);
        self.send(Operation::UpdateDocument, builder).await
    }

    pub async fn delete_document(&self, id: &DocumentId) -> Result<(), RequestError> {
        let builder = self.request(Method::DELETE, &format!("/api/documents/{id}"));
        self.execute(Operation::DeleteDocument, builder).await?;
        Ok(())
    }

    pub async fn list_relationships(&self) -> Result<Vec<Relationship>, RequestError> {
        let builder = self.request(Method::GET, "/api/relationships");
        self.send(Operation::ListRelationships, builder).await
    }

    pub async fn create_relationship(
        &self,
        relationship: &NewRelationship,
    ) -> Result<Relationship, RequestError> {
        let builder = self
            .request(Method::POST, "/api/relationships")
            .json(relationship);
        self.send(Operation::CreateRelationship, builder).await
    }

    pub async fn update_relationship(
        &self,
        id: &RelationshipId,
        status: RelationshipStatus,
    ) -> Result<Relationship, RequestError> {
        let builder = self
            .request(Method::PUT, &format!("/api/relationships/{id}"))
            .json(&RelationshipUpdate { status });
        self.send(Operation::UpdateRelationship, builder).await
    }

    pub async fn delete_relationship(&self, id: &RelationshipId) -> Result<(), RequestError> {
        let builder = self.request(Method::DELETE, &format!("/api/relationships/{id}"));
        self.execute(Operation::DeleteRelationship, builder).await?;
        Ok(())
    }
}
