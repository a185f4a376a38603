//! # Application context and action dispatcher
//!
//! [`AppContext`] bundles the [`Gateway`], the [`ClientConfig`] and the shared
//! [`AppState`]. The view layer receives one through a context provider and
//! calls its async operations; each one runs a gateway call through the
//! request lifecycle of the container that owns the result:
//!
//! 1. `issue` a ticket on the container and reduce `Requested`.
//! 2. Await the gateway call. No state borrow is held across the await.
//! 3. Reduce `Fulfilled` with the result, or `Rejected` with the message.
//!
//! The caller also gets the result back, so a form can navigate or reset on
//! success without reading state.
//!
//! ## Unauthorized responses
//!
//! A 401 on a call that carried a token means the server no longer accepts
//! it. After the owning container records the rejection, the stored token is
//! cleared and [`AppState::expire_session`] drops the session and all user
//! data. Controlled by `auth.clear_session_on_unauthorized`.
//!
//! ## Observers
//!
//! [`AppContext::subscribe`] registers a callback run after every state
//! change. Callbacks get a shared borrow of the state and must not call back
//! into the context.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use tracing::{debug, info};

use store::requests::{
    Credentials, DocumentPatch, NewDocument, NewRelationship, PasswordReset, ProfileUpdate,
    Registration,
};
use store::state::{AuthEvent, DocumentsEvent, ProfileEvent, RelationshipsEvent};
use store::{
    AppEvent, AppState, ClientConfig, Document, DocumentId, Lifecycle, Relationship,
    RelationshipId, RelationshipStatus, Session, Slice, Ticket, TokenStore, UserProfile,
};

use crate::error::RequestError;
use crate::gateway::Gateway;

type Observer = Box<dyn Fn(&AppState)>;

pub struct AppContext<T> {
    gateway: Gateway<T>,
    config: ClientConfig,
    state: Rc<RefCell<AppState>>,
    observers: Rc<RefCell<Vec<Observer>>>,
}

impl<T: Clone> Clone for AppContext<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
            observers: self.observers.clone(),
        }
    }
}

impl<T: TokenStore> AppContext<T> {
    pub fn new(config: ClientConfig, tokens: T) -> Self {
        Self {
            gateway: Gateway::new(&config, tokens),
            config,
            state: Rc::new(RefCell::new(AppState::default())),
            observers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self, observer: impl Fn(&AppState) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Whether a token is stored, i.e. whether a session can be restored.
    pub fn has_token(&self) -> bool {
        self.gateway.has_token()
    }

    fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let out = f(&mut self.state.borrow_mut());
        let state = self.state.borrow();
        for observer in self.observers.borrow().iter() {
            observer(&state);
        }
        out
    }

    /// Apply a synchronous event, e.g. one of the containers' setters.
    pub fn dispatch(&self, event: impl Into<AppEvent>) {
        let event = event.into();
        self.update(|state| state.reduce(event));
    }

    async fn run<R, E>(
        &self,
        slice: Slice,
        wrap: fn(Lifecycle<R>) -> E,
        call: impl Future<Output = Result<R, RequestError>>,
    ) -> Result<R, RequestError>
    where
        R: Clone,
        E: Into<AppEvent>,
    {
        let ticket = self.update(|state| {
            let ticket = state.issue(slice);
            state.reduce(wrap(Lifecycle::Requested(ticket)));
            ticket
        });
        debug!(?slice, generation = ticket.generation(), "requested");

        // The gateway reads the token on the call's first poll, right below.
        let sent = self.gateway.tokens().load();
        let mut pending = PendingCall {
            ctx: self,
            wrap,
            ticket,
            armed: true,
        };
        let result = call.await;
        pending.armed = false;

        match result {
            Ok(value) => {
                self.dispatch(wrap(Lifecycle::Fulfilled(ticket, value.clone())));
                Ok(value)
            }
            Err(err) => {
                self.dispatch(wrap(Lifecycle::Rejected(ticket, err.to_string())));
                // A 401 for a token that has since been replaced says nothing
                // about the current session.
                if err.is_unauthorized()
                    && sent.is_some()
                    && self.gateway.tokens().load() == sent
                    && self.config.auth.clear_session_on_unauthorized
                {
                    self.expire_session(&err);
                }
                Err(err)
            }
        }
    }

    fn expire_session(&self, err: &RequestError) {
        info!("{}: token rejected, signing out", err.operation());
        self.gateway.tokens().clear();
        self.update(|state| state.expire_session(err.message()));
    }

    /// Persist the token and seed the profile, unless the session was
    /// discarded while the request was in flight.
    fn adopt_session(&self, session: &Session) -> bool {
        let current = self.with_state(|s| s.auth.session().map(|s| s.token().clone()));
        if current.as_ref() != Some(session.token()) {
            debug!("session result discarded");
            return false;
        }
        self.gateway.tokens().save(session.token());
        self.dispatch(ProfileEvent::Set(session.profile().clone()));
        true
    }

    pub async fn login(&self, credentials: Credentials) -> Result<Session, RequestError> {
        let session = self
            .run(Slice::Auth, AuthEvent::Login, self.gateway.login(&credentials))
            .await?;
        if self.adopt_session(&session) {
            info!(user = session.user_id(), role = %session.role(), "logged in");
        }
        Ok(session)
    }

    pub async fn register(&self, registration: Registration) -> Result<Session, RequestError> {
        let session = self
            .run(
                Slice::Auth,
                AuthEvent::Register,
                self.gateway.register(&registration),
            )
            .await?;
        if self.adopt_session(&session) {
            info!(user = session.user_id(), role = %session.role(), "registered");
        }
        Ok(session)
    }

    /// Clear the stored token and reset every container. In-flight results
    /// are discarded.
    pub fn logout(&self) {
        self.gateway.tokens().clear();
        self.update(AppState::sign_out);
        info!("logged out");
    }

    /// Rebuild the session from the stored token, if there is one. A token
    /// the server rejects is cleared.
    pub async fn restore_session(&self) -> Result<Option<Session>, RequestError> {
        let Some(token) = self.gateway.tokens().load() else {
            return Ok(None);
        };
        let restore = async {
            let user = self.gateway.current_user().await?;
            Ok::<_, RequestError>(Session::new(token, user))
        };
        let session = self.run(Slice::Auth, AuthEvent::Restore, restore).await?;
        if self.adopt_session(&session) {
            info!(user = session.user_id(), "session restored");
        }
        Ok(Some(session))
    }

    /// Reload the profile container. `None` without a call when signed out.
    pub async fn fetch_current_user(&self) -> Result<Option<UserProfile>, RequestError> {
        if !self.gateway.has_token() {
            return Ok(None);
        }
        let user = self
            .run(
                Slice::Profile,
                ProfileEvent::Fetch,
                self.gateway.current_user(),
            )
            .await?;
        self.dispatch(AuthEvent::ProfileChanged(user.clone()));
        Ok(Some(user))
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, RequestError> {
        let user = self
            .run(
                Slice::Profile,
                ProfileEvent::Update,
                self.gateway.update_profile(&update),
            )
            .await?;
        self.dispatch(AuthEvent::ProfileChanged(user.clone()));
        Ok(user)
    }

    pub async fn verify_email(&self, token: &str) -> Result<String, RequestError> {
        self.run(
            Slice::Auth,
            AuthEvent::AccountAction,
            self.gateway.verify_email(token),
        )
        .await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<String, RequestError> {
        self.run(
            Slice::Auth,
            AuthEvent::AccountAction,
            self.gateway.request_password_reset(email),
        )
        .await
    }

    pub async fn reset_password(&self, reset: PasswordReset) -> Result<String, RequestError> {
        self.run(
            Slice::Auth,
            AuthEvent::AccountAction,
            self.gateway.reset_password(&reset),
        )
        .await
    }

    pub async fn fetch_documents(&self) -> Result<Vec<Document>, RequestError> {
        self.run(
            Slice::Documents,
            DocumentsEvent::Fetch,
            self.gateway.list_documents(),
        )
        .await
    }

    pub async fn fetch_document(&self, id: &DocumentId) -> Result<Document, RequestError> {
        self.run(
            Slice::Documents,
            DocumentsEvent::FetchOne,
            self.gateway.get_document(id),
        )
        .await
    }

    pub async fn upload_document(&self, doc: NewDocument) -> Result<Document, RequestError> {
        self.run(
            Slice::Documents,
            DocumentsEvent::Create,
            self.gateway.upload_document(&doc),
        )
        .await
    }

    pub async fn update_document(
        &self,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<Document, RequestError> {
        self.run(
            Slice::Documents,
            DocumentsEvent::Update,
            self.gateway.update_document(id, &patch),
        )
        .await
    }

    pub async fn delete_document(&self, id: DocumentId) -> Result<DocumentId, RequestError> {
        let call = async {
            self.gateway.delete_document(&id).await?;
            Ok::<_, RequestError>(id.clone())
        };
        self.run(Slice::Documents, DocumentsEvent::Delete, call).await
    }

    pub async fn fetch_relationships(&self) -> Result<Vec<Relationship>, RequestError> {
        self.run(
            Slice::Relationships,
            RelationshipsEvent::Fetch,
            self.gateway.list_relationships(),
        )
        .await
    }

    pub async fn create_relationship(
        &self,
        relationship: NewRelationship,
    ) -> Result<Relationship, RequestError> {
        self.run(
            Slice::Relationships,
            RelationshipsEvent::Create,
            self.gateway.create_relationship(&relationship),
        )
        .await
    }

    pub async fn update_relationship_status(
        &self,
        id: &RelationshipId,
        status: RelationshipStatus,
    ) -> Result<Relationship, RequestError> {
        self.run(
            Slice::Relationships,
            RelationshipsEvent::Update,
            self.gateway.update_relationship(id, status),
        )
        .await
    }

    pub async fn delete_relationship(
        &self,
        id: RelationshipId,
    ) -> Result<RelationshipId, RequestError> {
        let call = async {
            self.gateway.delete_relationship(&id).await?;
            Ok::<_, RequestError>(id.clone())
        };
        self.run(Slice::Relationships, RelationshipsEvent::Delete, call)
            .await
    }

    /// Discard results of requests in flight on `slice`; used when a view
    /// unmounts.
    pub fn cancel_pending(&self, slice: Slice) {
        self.update(|state| state.cancel_pending(slice));
    }
}

/// Settles a request whose future is dropped while the call is in flight,
/// e.g. when the component that spawned it unmounts.
struct PendingCall<'a, T: TokenStore, R, E: Into<AppEvent>> {
    ctx: &'a AppContext<T>,
    wrap: fn(Lifecycle<R>) -> E,
    ticket: Ticket,
    armed: bool,
}

impl<T: TokenStore, R, E: Into<AppEvent>> Drop for PendingCall<'_, T, R, E> {
    fn drop(&mut self) {
        if !self.armed || std::thread::panicking() {
            return;
        }
        debug!(generation = self.ticket.generation(), "call dropped before it returned");
        self.ctx.dispatch((self.wrap)(Lifecycle::Abandoned(self.ticket)));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{delete, get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use store::requests::DocumentFile;
    use store::{AuthToken, MemoryTokenStore, RequestStatus};
    use tokio::sync::Notify;

    use super::*;
    use crate::test_server::{document_json, patient_json, serve, token_header};

    const TOKEN: &str = "tok-123";

    /// Records API double. Accepts `secret1` as the only password and
    /// [`TOKEN`] as the only token.
    #[derive(Default)]
    struct MockApi {
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    type Api = Arc<MockApi>;

    fn authorized(api: &MockApi, headers: &HeaderMap) -> Result<(), Response> {
        let token = token_header(headers);
        api.seen_tokens.lock().unwrap().push(token.clone());
        match token.as_deref() {
            Some(TOKEN) => Ok(()),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Token is not valid"})),
            )
                .into_response()),
        }
    }

    async fn login(Json(body): Json<Value>) -> Response {
        if body["password"] == "secret1" {
            Json(json!({"token": TOKEN, "user": patient_json("Asha")})).into_response()
        } else {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Invalid credentials"})),
            )
                .into_response()
        }
    }

    async fn me(State(api): State<Api>, headers: HeaderMap) -> Response {
        if let Err(denied) = authorized(&api, &headers) {
            return denied;
        }
        Json(patient_json("Asha")).into_response()
    }

    async fn update_profile(
        State(api): State<Api>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        if let Err(denied) = authorized(&api, &headers) {
            return denied;
        }
        let mut user = patient_json("Asha");
        user["name"] = body["name"].clone();
        Json(user).into_response()
    }

    async fn list_documents(State(api): State<Api>, headers: HeaderMap) -> Response {
        if let Err(denied) = authorized(&api, &headers) {
            return denied;
        }
        Json(json!([
            document_json("d1", "Blood panel"),
            document_json("d2", "X-ray")
        ]))
        .into_response()
    }

    async fn upload(State(api): State<Api>, headers: HeaderMap) -> Response {
        if let Err(denied) = authorized(&api, &headers) {
            return denied;
        }
        Json(document_json("d3", "Scan")).into_response()
    }

    async fn delete_document(
        State(api): State<Api>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Response {
        if let Err(denied) = authorized(&api, &headers) {
            return denied;
        }
        if id == "missing" {
            return (StatusCode::NOT_FOUND, Json(json!({"message": "Document not found"})))
                .into_response();
        }
        Json(json!({"message": "Document removed"})).into_response()
    }

    async fn list_relationships(State(api): State<Api>, headers: HeaderMap) -> Response {
        if let Err(denied) = authorized(&api, &headers) {
            return denied;
        }
        Json(json!([{"_id": "r1", "doctorId": "d1", "patientId": "p1", "status": "pending"}]))
            .into_response()
    }

    async fn update_relationship(
        State(api): State<Api>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> Response {
        if let Err(denied) = authorized(&api, &headers) {
            return denied;
        }
        Json(json!({"id": id, "doctorId": "d1", "patientId": "p1", "status": body["status"]}))
            .into_response()
    }

    async fn forgot_password(Json(body): Json<Value>) -> Json<Value> {
        let email = body["email"].as_str().unwrap_or("");
        Json(json!({"message": format!("Reset link sent to {email}")}))
    }

    async fn setup(
        config: impl FnOnce(String) -> ClientConfig,
    ) -> (AppContext<MemoryTokenStore>, MemoryTokenStore, Api) {
        let api = Api::default();
        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/auth/profile", put(update_profile))
            .route("/api/auth/forgot-password", post(forgot_password))
            .route("/api/documents", get(list_documents))
            .route("/api/documents/upload", post(upload))
            .route("/api/documents/{id}", delete(delete_document))
            .route("/api/relationships", get(list_relationships))
            .route("/api/relationships/{id}", put(update_relationship))
            .with_state(api.clone());
        let base = serve(router).await;
        let tokens = MemoryTokenStore::new();
        let ctx = AppContext::new(config(base), tokens.clone());
        (ctx, tokens, api)
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "asha@example.com".to_string(),
            password: password.to_string(),
        }
    }

    fn new_document() -> NewDocument {
        NewDocument {
            file: DocumentFile {
                name: "scan.pdf".to_string(),
                content_type: None,
                bytes: vec![0; 4],
            },
            title: "Scan".to_string(),
            description: String::new(),
            patient_id: "p1".to_string(),
            doctor_id: "d1".to_string(),
            tags: Vec::new(),
            is_private: true,
        }
    }

    fn doc_ids(ctx: &AppContext<MemoryTokenStore>) -> Vec<String> {
        ctx.with_state(|s| {
            s.documents
                .records()
                .iter()
                .map(|d| d.id.to_string())
                .collect()
        })
    }

    #[tokio::test]
    async fn test_login_token_reaches_next_request() {
        let (ctx, tokens, api) = setup(ClientConfig::new).await;

        let session = ctx.login(credentials("secret1")).await.unwrap();
        assert_eq!(session.token().as_str(), TOKEN);
        assert_eq!(tokens.load().unwrap().as_str(), TOKEN);
        ctx.with_state(|s| {
            assert!(s.auth.is_authenticated());
            assert_eq!(s.auth.envelope().status(), RequestStatus::Fulfilled);
            assert_eq!(s.profile.user().map(|u| u.name.as_str()), Some("Asha"));
        });

        ctx.fetch_documents().await.unwrap();
        assert_eq!(
            api.seen_tokens.lock().unwrap().last().cloned().flatten().as_deref(),
            Some(TOKEN)
        );
        assert_eq!(doc_ids(&ctx), vec!["d1", "d2"]);
    }

    #[tokio::test]
    async fn test_failed_login_sets_error() {
        let (ctx, tokens, _) = setup(ClientConfig::new).await;

        let err = ctx.login(credentials("wrong")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(tokens.load().is_none());
        ctx.with_state(|s| {
            assert!(!s.auth.is_authenticated());
            assert_eq!(s.auth.envelope().status(), RequestStatus::Rejected);
            assert_eq!(s.auth.envelope().error(), Some("Invalid credentials"));
        });
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_and_token() {
        let (ctx, tokens, _) = setup(ClientConfig::new).await;
        ctx.login(credentials("secret1")).await.unwrap();
        ctx.fetch_documents().await.unwrap();

        // The server forgets the session.
        tokens.save(&AuthToken::new("revoked").unwrap());
        let err = ctx.fetch_relationships().await.unwrap_err();
        assert!(err.is_unauthorized());

        assert!(tokens.load().is_none());
        ctx.with_state(|s| {
            assert!(!s.auth.is_authenticated());
            assert_eq!(s.auth.envelope().error(), Some("Token is not valid"));
            assert!(s.documents.records().is_empty());
            assert!(s.profile.user().is_none());
            assert_eq!(s.relationships.envelope().status(), RequestStatus::Rejected);
            assert_eq!(s.relationships.envelope().error(), Some("Token is not valid"));
        });
    }

    #[tokio::test]
    async fn test_unauthorized_kept_when_disabled() {
        let (ctx, tokens, _) =
            setup(|base| ClientConfig::new(base).with_clear_on_unauthorized(false)).await;
        ctx.login(credentials("secret1")).await.unwrap();
        tokens.save(&AuthToken::new("revoked").unwrap());

        ctx.fetch_documents().await.unwrap_err();
        assert!(tokens.load().is_some());
        assert!(ctx.with_state(|s| s.auth.is_authenticated()));
    }

    #[tokio::test]
    async fn test_unauthorized_without_token_keeps_state() {
        let (ctx, _, api) = setup(ClientConfig::new).await;
        ctx.dispatch(DocumentsEvent::Add(Document {
            id: DocumentId::from("local"),
            title: "Draft".to_string(),
            description: String::new(),
            patient_id: "p1".to_string(),
            doctor_id: "d1".to_string(),
            file_url: None,
            upload_date: None,
            is_private: true,
            tags: Vec::new(),
        }));

        ctx.fetch_documents().await.unwrap_err();
        assert_eq!(api.seen_tokens.lock().unwrap().as_slice(), &[None]);
        assert_eq!(doc_ids(&ctx), vec!["local"]);
        assert_eq!(
            ctx.with_state(|s| s.auth.envelope().status()),
            RequestStatus::Idle
        );
    }

    #[tokio::test]
    async fn test_restore_session() {
        let (ctx, tokens, api) = setup(ClientConfig::new).await;
        assert_eq!(ctx.restore_session().await.unwrap(), None);
        assert!(api.seen_tokens.lock().unwrap().is_empty());

        tokens.save(&AuthToken::new(TOKEN).unwrap());
        let session = ctx.restore_session().await.unwrap().unwrap();
        assert_eq!(session.name(), "Asha");
        assert!(ctx.with_state(|s| s.auth.is_authenticated()));
    }

    #[tokio::test]
    async fn test_restore_with_stale_token_clears_it() {
        let (ctx, tokens, _) = setup(ClientConfig::new).await;
        tokens.save(&AuthToken::new("expired").unwrap());

        let err = ctx.restore_session().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(tokens.load().is_none());
        assert!(!ctx.has_token());
    }

    #[tokio::test]
    async fn test_logout_discards_in_flight_results() {
        let (ctx, tokens, _) = setup(ClientConfig::new).await;
        ctx.login(credentials("secret1")).await.unwrap();

        let fetch = ctx.fetch_documents();
        let logout = async { ctx.logout() };
        let (fetched, ()) = tokio::join!(fetch, logout);

        assert!(fetched.is_ok());
        assert!(tokens.load().is_none());
        ctx.with_state(|s| {
            assert!(s.auth.session().is_none());
            assert!(s.documents.records().is_empty());
            assert_eq!(s.documents.envelope().status(), RequestStatus::Idle);
        });
    }

    #[tokio::test]
    async fn test_upload_prepends_and_delete_removes() {
        let (ctx, _, _) = setup(ClientConfig::new).await;
        ctx.login(credentials("secret1")).await.unwrap();
        ctx.fetch_documents().await.unwrap();

        ctx.upload_document(new_document()).await.unwrap();
        assert_eq!(doc_ids(&ctx), vec!["d3", "d1", "d2"]);

        ctx.delete_document(DocumentId::from("d1")).await.unwrap();
        assert_eq!(doc_ids(&ctx), vec!["d3", "d2"]);

        let err = ctx
            .delete_document(DocumentId::from("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Document not found");
        assert_eq!(doc_ids(&ctx), vec!["d3", "d2"]);
        assert_eq!(
            ctx.with_state(|s| s.documents.envelope().error().map(str::to_string)),
            Some("Document not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_relationship_status_and_profile_update() {
        let (ctx, _, _) = setup(ClientConfig::new).await;
        ctx.login(credentials("secret1")).await.unwrap();
        ctx.fetch_relationships().await.unwrap();

        ctx.update_relationship_status(&RelationshipId::from("r1"), RelationshipStatus::Active)
            .await
            .unwrap();
        assert_eq!(
            ctx.with_state(|s| s.relationships.records()[0].status),
            RelationshipStatus::Active
        );

        let mut user = ctx.with_state(|s| s.profile.user().cloned()).unwrap();
        user.name = "Asha K".to_string();
        ctx.update_profile(ProfileUpdate {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: None,
            address: None,
            details: user.details.clone(),
        })
        .await
        .unwrap();
        ctx.with_state(|s| {
            assert_eq!(s.profile.user().unwrap().name, "Asha K");
            assert_eq!(s.auth.session().unwrap().name(), "Asha K");
        });
    }

    #[tokio::test]
    async fn test_account_action_notice() {
        let (ctx, _, _) = setup(ClientConfig::new).await;
        let message = ctx
            .request_password_reset("asha@example.com")
            .await
            .unwrap();
        assert_eq!(message, "Reset link sent to asha@example.com");
        assert_eq!(
            ctx.with_state(|s| s.auth.notice().map(str::to_string)),
            Some(message)
        );
    }

    #[tokio::test]
    async fn test_observers_see_each_transition() {
        let (ctx, _, _) = setup(ClientConfig::new).await;
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let seen = statuses.clone();
        ctx.subscribe(move |s| seen.borrow_mut().push(s.auth.envelope().status()));

        ctx.login(credentials("secret1")).await.unwrap();
        let statuses = statuses.borrow();
        assert_eq!(statuses.first(), Some(&RequestStatus::Pending));
        assert!(statuses.contains(&RequestStatus::Fulfilled));
    }

    /// Server whose first documents request blocks until `release` fires.
    struct Gated {
        calls: Mutex<u32>,
        arrived: Notify,
        release: Notify,
    }

    async fn gated_list(State(gate): State<Arc<Gated>>) -> Json<Value> {
        let call = {
            let mut calls = gate.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if call == 1 {
            gate.arrived.notify_one();
            gate.release.notified().await;
            Json(json!([document_json("old", "Old")]))
        } else {
            Json(json!([document_json("new", "New")]))
        }
    }

    async fn gated_context() -> (AppContext<MemoryTokenStore>, Arc<Gated>) {
        let gate = Arc::new(Gated {
            calls: Mutex::new(0),
            arrived: Notify::new(),
            release: Notify::new(),
        });
        let router = Router::new()
            .route("/api/documents", get(gated_list))
            .with_state(gate.clone());
        let base = serve(router).await;
        let ctx = AppContext::new(
            ClientConfig::new(base),
            MemoryTokenStore::with_token(AuthToken::new(TOKEN).unwrap()),
        );
        (ctx, gate)
    }

    #[tokio::test]
    async fn test_stale_fetch_does_not_overwrite_newer() {
        let (ctx, gate) = gated_context().await;

        let slow = ctx.fetch_documents();
        let fast = async {
            gate.arrived.notified().await;
            let fresh = ctx.fetch_documents().await.unwrap();
            gate.release.notify_one();
            fresh
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(slow.unwrap()[0].id.as_str(), "old");
        assert_eq!(fast[0].id.as_str(), "new");
        assert_eq!(doc_ids(&ctx), vec!["new"]);
        assert_eq!(
            ctx.with_state(|s| s.documents.envelope().status()),
            RequestStatus::Fulfilled
        );
    }

    #[tokio::test]
    async fn test_cancel_pending_drops_late_result() {
        let (ctx, gate) = gated_context().await;
        let idle_after_cancel = Cell::new(false);

        let fetch = ctx.fetch_documents();
        let unmount = async {
            gate.arrived.notified().await;
            ctx.cancel_pending(Slice::Documents);
            idle_after_cancel
                .set(ctx.with_state(|s| s.documents.envelope().status()) == RequestStatus::Idle);
            gate.release.notify_one();
        };
        let (fetched, ()) = tokio::join!(fetch, unmount);

        assert!(fetched.is_ok());
        assert!(idle_after_cancel.get());
        assert!(doc_ids(&ctx).is_empty());
        assert_eq!(
            ctx.with_state(|s| s.documents.envelope().status()),
            RequestStatus::Idle
        );
    }

    #[tokio::test]
    async fn test_dropped_call_settles_envelope() {
        let (ctx, gate) = gated_context().await;

        tokio::select! {
            _ = ctx.fetch_documents() => panic!("first call is held by the server"),
            _ = gate.arrived.notified() => {}
        }
        assert_eq!(
            ctx.with_state(|s| s.documents.envelope().status()),
            RequestStatus::Idle
        );

        gate.release.notify_one();
        ctx.fetch_documents().await.unwrap();
        assert_eq!(doc_ids(&ctx), vec!["new"]);
    }

    /// Holds a request carrying the `old` token, then answers 401.
    struct StaleToken {
        arrived: Notify,
        release: Notify,
    }

    async fn stale_list(State(gate): State<Arc<StaleToken>>, headers: HeaderMap) -> Response {
        if token_header(&headers).as_deref() == Some("old") {
            gate.arrived.notify_one();
            gate.release.notified().await;
            let body = Json(json!({"message": "Token is not valid"}));
            return (StatusCode::UNAUTHORIZED, body).into_response();
        }
        Json(json!([document_json("d1", "Blood panel")])).into_response()
    }

    #[tokio::test]
    async fn test_stale_unauthorized_keeps_new_session() {
        let gate = Arc::new(StaleToken {
            arrived: Notify::new(),
            release: Notify::new(),
        });
        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/documents", get(stale_list))
            .with_state(gate.clone());
        let base = serve(router).await;
        let tokens = MemoryTokenStore::with_token(AuthToken::new("old").unwrap());
        let ctx = AppContext::new(ClientConfig::new(base), tokens.clone());

        let stale = ctx.fetch_documents();
        let relogin = async {
            gate.arrived.notified().await;
            ctx.logout();
            ctx.login(credentials("secret1")).await.unwrap();
            gate.release.notify_one();
        };
        let (stale, ()) = tokio::join!(stale, relogin);

        assert!(stale.unwrap_err().is_unauthorized());
        assert_eq!(
            tokens.load().map(|t| t.as_str().to_string()).as_deref(),
            Some(TOKEN)
        );
        ctx.with_state(|s| {
            assert!(s.auth.is_authenticated());
            assert_eq!(s.auth.envelope().status(), RequestStatus::Fulfilled);
        });
    }
}
