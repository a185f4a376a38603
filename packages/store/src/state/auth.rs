//! Authentication container: the current [`Session`] and account notices.

use tracing::debug;

use crate::envelope::{Apply, Envelope, Lifecycle, RequestTracker, Ticket};
use crate::models::{Session, UserProfile};

#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    Login(Lifecycle<Session>),
    Register(Lifecycle<Session>),
    /// Rebuild the session from a stored token at boot.
    Restore(Lifecycle<Session>),
    /// Email verification and password reset; the payload is the server's
    /// confirmation message.
    AccountAction(Lifecycle<String>),
    /// The profile changed elsewhere; keep the session's copy in sync.
    ProfileChanged(UserProfile),
    SetError(String),
    /// Logout.
    Clear,
    /// The server rejected the token.
    Expired(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    session: Option<Session>,
    notice: Option<String>,
    requests: RequestTracker,
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Last confirmation message from an account action.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn envelope(&self) -> &Envelope {
        self.requests.envelope()
    }

    pub fn issue(&mut self) -> Ticket {
        self.requests.issue()
    }

    pub fn cancel_pending(&mut self) {
        self.requests.cancel();
    }

    pub fn reduce(&mut self, event: AuthEvent) {
        let session = &mut self.session;
        match event {
            AuthEvent::Login(event) | AuthEvent::Register(event) | AuthEvent::Restore(event) => {
                self.requests
                    .reduce(event, Apply::Replace, |s| *session = Some(s))
            }
            AuthEvent::AccountAction(event) => {
                if matches!(event, Lifecycle::Requested(_)) {
                    self.notice = None;
                }
                let notice = &mut self.notice;
                self.requests
                    .reduce(event, Apply::Merge, |message| *notice = Some(message))
            }
            AuthEvent::ProfileChanged(profile) => match session {
                Some(s) => s.set_profile(profile),
                None => debug!("profile changed without a session"),
            },
            AuthEvent::SetError(message) => self.requests.fail(message),
            AuthEvent::Clear => {
                *session = None;
                self.notice = None;
                self.requests.reset();
            }
            AuthEvent::Expired(message) => {
                *session = None;
                self.notice = None;
                self.requests.cancel();
                self.requests.fail(message);
            }
        }
    }
}
