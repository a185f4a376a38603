//! Profile container: the signed-in user's editable profile.

use crate::envelope::{Apply, Envelope, Lifecycle, RequestTracker, Ticket};
use crate::models::UserProfile;

#[derive(Clone, Debug, PartialEq)]
pub enum ProfileEvent {
    Set(UserProfile),
    Clear,
    SetError(String),
    Fetch(Lifecycle<UserProfile>),
    Update(Lifecycle<UserProfile>),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileState {
    user: Option<UserProfile>,
    requests: RequestTracker,
}

impl ProfileState {
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
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

    pub fn invalidate(&mut self) {
        self.requests.cancel();
        self.user = None;
    }

    pub fn reduce(&mut self, event: ProfileEvent) {
        let user = &mut self.user;
        match event {
            ProfileEvent::Set(profile) => {
                *user = Some(profile);
                self.requests.idle();
            }
            ProfileEvent::Clear => {
                *user = None;
                self.requests.reset();
            }
            ProfileEvent::SetError(message) => self.requests.fail(message),
            ProfileEvent::Fetch(event) => {
                self.requests
                    .reduce(event, Apply::Replace, |p| *user = Some(p))
            }
            ProfileEvent::Update(event) => {
                self.requests
                    .reduce(event, Apply::Merge, |p| *user = Some(p))
            }
        }
    }
}
