//! # Application state containers
//!
//! [`AppState`] is the root of all client state, split into four slices the
//! same way the server splits its API:
//!
//! | Slice | Container | Holds |
//! |-------|-----------|-------|
//! | [`Slice::Auth`] | [`AuthState`] | The [`Session`](crate::Session) and account notices |
//! | [`Slice::Documents`] | [`DocumentsState`] | Document records, newest upload first |
//! | [`Slice::Relationships`] | [`RelationshipsState`] | Doctor/patient relationship records |
//! | [`Slice::Profile`] | [`ProfileState`] | The editable user profile |
//!
//! Each container is a reducer: [`AppState::reduce`] routes an [`AppEvent`] to
//! its slice, which updates its data and its request envelope. Containers
//! never perform I/O; the dispatcher in the `api` crate feeds them lifecycle
//! events as requests progress.

mod auth;
mod collection;
mod profile;

pub use auth::{AuthEvent, AuthState};
pub use collection::{Collection, CollectionEvent};
pub use profile::{ProfileEvent, ProfileState};

use crate::envelope::{Envelope, Ticket};
use crate::models::{Document, Relationship};

pub type DocumentsState = Collection<Document>;
pub type DocumentsEvent = CollectionEvent<Document>;
pub type RelationshipsState = Collection<Relationship>;
pub type RelationshipsEvent = CollectionEvent<Relationship>;

/// Names a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slice {
    Auth,
    Documents,
    Relationships,
    Profile,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Auth(AuthEvent),
    Documents(DocumentsEvent),
    Relationships(RelationshipsEvent),
    Profile(ProfileEvent),
}

impl From<AuthEvent> for AppEvent {
    fn from(event: AuthEvent) -> Self {
        AppEvent::Auth(event)
    }
}

impl From<DocumentsEvent> for AppEvent {
    fn from(event: DocumentsEvent) -> Self {
        AppEvent::Documents(event)
    }
}

impl From<RelationshipsEvent> for AppEvent {
    fn from(event: RelationshipsEvent) -> Self {
        AppEvent::Relationships(event)
    }
}

impl From<ProfileEvent> for AppEvent {
    fn from(event: ProfileEvent) -> Self {
        AppEvent::Profile(event)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub auth: AuthState,
    pub documents: DocumentsState,
    pub relationships: RelationshipsState,
    pub profile: ProfileState,
}

impl AppState {
    pub fn reduce(&mut self, event: impl Into<AppEvent>) {
        match event.into() {
            AppEvent::Auth(e) => self.auth.reduce(e),
            AppEvent::Documents(e) => self.documents.reduce(e),
            AppEvent::Relationships(e) => self.relationships.reduce(e),
            AppEvent::Profile(e) => self.profile.reduce(e),
        }
    }

    pub fn issue(&mut self, slice: Slice) -> Ticket {
        match slice {
            Slice::Auth => self.auth.issue(),
            Slice::Documents => self.documents.issue(),
            Slice::Relationships => self.relationships.issue(),
            Slice::Profile => self.profile.issue(),
        }
    }

    pub fn envelope(&self, slice: Slice) -> &Envelope {
        match slice {
            Slice::Auth => self.auth.envelope(),
            Slice::Documents => self.documents.envelope(),
            Slice::Relationships => self.relationships.envelope(),
            Slice::Profile => self.profile.envelope(),
        }
    }

    /// Drop the results of every request in flight on `slice`.
    pub fn cancel_pending(&mut self, slice: Slice) {
        match slice {
            Slice::Auth => self.auth.cancel_pending(),
            Slice::Documents => self.documents.cancel_pending(),
            Slice::Relationships => self.relationships.cancel_pending(),
            Slice::Profile => self.profile.cancel_pending(),
        }
    }

    /// Logout: every container back to its initial state.
    pub fn sign_out(&mut self) {
        self.auth.reduce(AuthEvent::Clear);
        self.documents.reset();
        self.relationships.reset();
        self.profile.reduce(ProfileEvent::Clear);
    }

    /// The server rejected the token. The session and all user data go away;
    /// errors already shown by a container stay visible.
    pub fn expire_session(&mut self, message: impl Into<String>) {
        self.auth.reduce(AuthEvent::Expired(message.into()));
        self.documents.invalidate();
        self.relationships.invalidate();
        self.profile.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Lifecycle, RequestStatus};
    use crate::models::{
        AuthToken, DocumentId, RelationshipId, RelationshipStatus, RoleDetails, Session,
        UserProfile,
    };

    fn doc(id: &str) -> Document {
        Document {
            id: DocumentId::from(id),
            title: format!("Report {id}"),
            description: String::new(),
            patient_id: "p1".to_string(),
            doctor_id: "d1".to_string(),
            file_url: None,
            upload_date: None,
            is_private: true,
            tags: Vec::new(),
        }
    }

    fn rel(id: &str) -> Relationship {
        Relationship {
            id: RelationshipId::from(id),
            doctor_id: "d1".to_string(),
            patient_id: "p1".to_string(),
            status: RelationshipStatus::Pending,
        }
    }

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            name: name.to_string(),
            email: "u1@example.com".to_string(),
            phone: None,
            address: None,
            details: RoleDetails::Patient {
                aadhaar_number: "123456789012".to_string(),
            },
        }
    }

    fn session(token: &str) -> Session {
        Session::new(AuthToken::new(token).unwrap(), profile("Asha"))
    }

    fn ids(state: &AppState) -> Vec<&str> {
        state.documents.records().iter().map(|d| d.id.as_str()).collect()
    }

    /// Run a full lifecycle for a documents request.
    fn documents_round(
        state: &mut AppState,
        wrap: fn(Lifecycle<Document>) -> DocumentsEvent,
        outcome: Result<Document, &str>,
    ) {
        let ticket = state.issue(Slice::Documents);
        state.reduce(wrap(Lifecycle::Requested(ticket)));
        match outcome {
            Ok(d) => state.reduce(wrap(Lifecycle::Fulfilled(ticket, d))),
            Err(m) => state.reduce(wrap(Lifecycle::Rejected(ticket, m.to_string()))),
        }
    }

    fn seeded() -> AppState {
        let mut state = AppState::default();
        let ticket = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Requested(ticket)));
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Fulfilled(
            ticket,
            vec![doc("d1"), doc("d2")],
        )));
        state
    }

    #[test]
    fn test_fetch_keeps_server_order() {
        let state = seeded();
        assert_eq!(ids(&state), vec!["d1", "d2"]);
        assert_eq!(state.documents.envelope().status(), RequestStatus::Fulfilled);
    }

    #[test]
    fn test_upload_prepends() {
        let mut state = seeded();
        documents_round(&mut state, DocumentsEvent::Create, Ok(doc("d3")));
        assert_eq!(ids(&state), vec!["d3", "d1", "d2"]);
    }

    #[test]
    fn test_delete_filters_by_id() {
        let mut state = seeded();
        let ticket = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Delete(Lifecycle::Requested(ticket)));
        state.reduce(DocumentsEvent::Delete(Lifecycle::Fulfilled(
            ticket,
            DocumentId::from("d1"),
        )));
        assert_eq!(ids(&state), vec!["d2"]);
    }

    #[test]
    fn test_pending_clears_error_in_every_container() {
        let mut state = AppState::default();
        state.reduce(AuthEvent::SetError("a".to_string()));
        state.reduce(DocumentsEvent::SetError("b".to_string()));
        state.reduce(RelationshipsEvent::SetError("c".to_string()));
        state.reduce(ProfileEvent::SetError("d".to_string()));

        let t = state.issue(Slice::Auth);
        state.reduce(AuthEvent::Login(Lifecycle::Requested(t)));
        let t = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Requested(t)));
        let t = state.issue(Slice::Relationships);
        state.reduce(RelationshipsEvent::Fetch(Lifecycle::Requested(t)));
        let t = state.issue(Slice::Profile);
        state.reduce(ProfileEvent::Update(Lifecycle::Requested(t)));

        for slice in [Slice::Auth, Slice::Documents, Slice::Relationships, Slice::Profile] {
            let envelope = state.envelope(slice);
            assert_eq!(envelope.status(), RequestStatus::Pending, "{slice:?}");
            assert_eq!(envelope.error(), None, "{slice:?}");
        }
    }

    #[test]
    fn test_rejected_leaves_records_untouched() {
        let mut state = seeded();
        let before = state.documents.records().to_vec();

        documents_round(&mut state, DocumentsEvent::Create, Err("Upload failed"));
        assert_eq!(state.documents.records(), before.as_slice());
        assert_eq!(state.documents.envelope().status(), RequestStatus::Rejected);
        assert_eq!(state.documents.envelope().error(), Some("Upload failed"));

        let mut state = AppState::default();
        state.reduce(RelationshipsEvent::Set(vec![rel("r1")]));
        let ticket = state.issue(Slice::Relationships);
        state.reduce(RelationshipsEvent::Delete(Lifecycle::Requested(ticket)));
        state.reduce(RelationshipsEvent::Delete(Lifecycle::Rejected(
            ticket,
            "Delete failed".to_string(),
        )));
        assert_eq!(state.relationships.records(), &[rel("r1")]);
        assert_eq!(state.relationships.envelope().error(), Some("Delete failed"));
    }

    #[test]
    fn test_rejected_login_keeps_existing_session() {
        let mut state = AppState::default();
        let t = state.issue(Slice::Auth);
        state.reduce(AuthEvent::Login(Lifecycle::Requested(t)));
        state.reduce(AuthEvent::Login(Lifecycle::Fulfilled(t, session("tok-1"))));

        let t = state.issue(Slice::Auth);
        state.reduce(AuthEvent::Login(Lifecycle::Requested(t)));
        state.reduce(AuthEvent::Login(Lifecycle::Rejected(
            t,
            "Invalid credentials".to_string(),
        )));

        assert_eq!(state.auth.session(), Some(&session("tok-1")));
        assert_eq!(state.auth.envelope().error(), Some("Invalid credentials"));
    }

    #[test]
    fn test_stale_fetch_does_not_clobber_newer_one() {
        let mut state = AppState::default();
        let slow = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Requested(slow)));
        let fast = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Requested(fast)));

        state.reduce(DocumentsEvent::Fetch(Lifecycle::Fulfilled(fast, vec![doc("new")])));
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Fulfilled(slow, vec![doc("old")])));

        assert_eq!(ids(&state), vec!["new"]);
    }

    #[test]
    fn test_concurrent_uploads_both_land() {
        let mut state = seeded();
        let a = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Create(Lifecycle::Requested(a)));
        let b = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Create(Lifecycle::Requested(b)));

        state.reduce(DocumentsEvent::Create(Lifecycle::Fulfilled(b, doc("b"))));
        state.reduce(DocumentsEvent::Create(Lifecycle::Fulfilled(a, doc("a"))));

        assert_eq!(ids(&state), vec!["a", "b", "d1", "d2"]);
    }

    #[test]
    fn test_cancel_pending_drops_late_result() {
        let mut state = AppState::default();
        let ticket = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Requested(ticket)));
        state.cancel_pending(Slice::Documents);
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Fulfilled(ticket, vec![doc("late")])));

        assert!(state.documents.records().is_empty());
        assert_eq!(state.documents.envelope().status(), RequestStatus::Idle);
    }

    #[test]
    fn test_sync_setters_reset_envelope() {
        let mut state = AppState::default();
        state.reduce(DocumentsEvent::SetError("oops".to_string()));
        state.reduce(DocumentsEvent::Add(doc("d1")));
        state.reduce(DocumentsEvent::Add(doc("d2")));
        assert_eq!(ids(&state), vec!["d1", "d2"]);
        assert_eq!(state.documents.envelope().error(), None);

        let mut renamed = doc("d2");
        renamed.title = "Renamed".to_string();
        state.reduce(DocumentsEvent::Patch(renamed));
        state.reduce(DocumentsEvent::Remove(DocumentId::from("d1")));
        assert_eq!(state.documents.records().len(), 1);
        assert_eq!(state.documents.records()[0].title, "Renamed");
    }

    #[test]
    fn test_relationship_update_patches_status() {
        let mut state = AppState::default();
        state.reduce(RelationshipsEvent::Set(vec![rel("r1"), rel("r2")]));

        let mut active = rel("r2");
        active.status = RelationshipStatus::Active;
        let ticket = state.issue(Slice::Relationships);
        state.reduce(RelationshipsEvent::Update(Lifecycle::Requested(ticket)));
        state.reduce(RelationshipsEvent::Update(Lifecycle::Fulfilled(ticket, active)));

        let statuses: Vec<_> = state.relationships.records().iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![RelationshipStatus::Pending, RelationshipStatus::Active]
        );
    }

    #[test]
    fn test_profile_change_updates_session() {
        let mut state = AppState::default();
        let t = state.issue(Slice::Auth);
        state.reduce(AuthEvent::Restore(Lifecycle::Requested(t)));
        state.reduce(AuthEvent::Restore(Lifecycle::Fulfilled(t, session("tok"))));

        state.reduce(AuthEvent::ProfileChanged(profile("Asha K")));
        let s = state.auth.session().unwrap();
        assert_eq!(s.name(), "Asha K");
        assert_eq!(s.token().as_str(), "tok");
    }

    #[test]
    fn test_sign_out_resets_everything() {
        let mut state = seeded();
        let t = state.issue(Slice::Auth);
        state.reduce(AuthEvent::Login(Lifecycle::Requested(t)));
        state.reduce(AuthEvent::Login(Lifecycle::Fulfilled(t, session("tok"))));
        state.reduce(ProfileEvent::Set(profile("Asha")));
        let in_flight = state.issue(Slice::Documents);
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Requested(in_flight)));

        state.sign_out();
        state.reduce(DocumentsEvent::Fetch(Lifecycle::Fulfilled(in_flight, vec![doc("x")])));

        assert!(state.auth.session().is_none());
        assert!(state.profile.user().is_none());
        assert!(state.documents.records().is_empty());
        assert_eq!(state.documents.envelope().status(), RequestStatus::Idle);
    }

    #[test]
    fn test_expire_session_keeps_visible_error() {
        let mut state = seeded();
        let t = state.issue(Slice::Auth);
        state.reduce(AuthEvent::Login(Lifecycle::Requested(t)));
        state.reduce(AuthEvent::Login(Lifecycle::Fulfilled(t, session("tok"))));
        state.reduce(DocumentsEvent::SetError("Token is not valid".to_string()));

        state.expire_session("Token is not valid");

        assert!(!state.auth.is_authenticated());
        assert_eq!(state.auth.envelope().error(), Some("Token is not valid"));
        assert!(state.documents.records().is_empty());
        assert_eq!(state.documents.envelope().error(), Some("Token is not valid"));
    }

    #[test]
    fn test_account_action_records_notice() {
        let mut state = AppState::default();
        let t = state.issue(Slice::Auth);
        state.reduce(AuthEvent::AccountAction(Lifecycle::Requested(t)));
        state.reduce(AuthEvent::AccountAction(Lifecycle::Fulfilled(
            t,
            "Reset link sent".to_string(),
        )));
        assert_eq!(state.auth.notice(), Some("Reset link sent"));
        assert!(state.auth.session().is_none());
    }
}
