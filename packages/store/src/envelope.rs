//! # Request lifecycle tracking
//!
//! Every container owns one [`RequestTracker`]. It holds the container's
//! [`Envelope`] (status + error shown by the views) and decides which
//! lifecycle events are still allowed to touch the container.
//!
//! ## Tickets
//!
//! Before a request is sent the dispatcher asks the container for a
//! [`Ticket`]: the tracker's current epoch plus the next value of a monotonic
//! generation counter. All three lifecycle events of that request carry the
//! same ticket.
//!
//! | Check | Rule |
//! |-------|------|
//! | live | `ticket.epoch == epoch`. Cancelling bumps the epoch, so anything issued before is dropped. |
//! | latest | live and `ticket.generation` is the last one issued. Only the latest request may settle the envelope. |
//! | latest replace | live and the last *replace-style* request (fetch-all, session load). Only it may overwrite the container's data. |
//!
//! Merge-style results (create, patch, delete) are applied whenever they are
//! live; they commute, so fencing them would only lose acknowledged writes.

use tracing::debug;

/// Status of the latest request on a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// Status and error message shown by the views.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    status: RequestStatus,
    error: Option<String>,
}

impl Envelope {
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    fn set(&mut self, status: RequestStatus, error: Option<String>) {
        self.status = status;
        self.error = error;
    }
}

/// Identifies one dispatched request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One phase of a request's lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum Lifecycle<T> {
    Requested(Ticket),
    Fulfilled(Ticket, T),
    Rejected(Ticket, String),
    /// The caller stopped waiting (its future was dropped) before the call
    /// returned. Settles the envelope back to idle; no data changes.
    Abandoned(Ticket),
}

impl<T> Lifecycle<T> {
    pub fn ticket(&self) -> Ticket {
        match self {
            Lifecycle::Requested(t)
            | Lifecycle::Fulfilled(t, _)
            | Lifecycle::Rejected(t, _)
            | Lifecycle::Abandoned(t) => *t,
        }
    }
}

/// How a fulfilled result changes the container's data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Apply {
    /// Overwrites the data wholesale.
    Replace,
    /// Inserts, patches or removes single records.
    Merge,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestTracker {
    envelope: Envelope,
    epoch: u64,
    issued: u64,
    latest_replace: u64,
}

impl RequestTracker {
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Allocate the ticket for a new request.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket {
            epoch: self.epoch,
            generation: self.issued,
        }
    }

    pub fn is_live(&self, ticket: Ticket) -> bool {
        ticket.epoch == self.epoch
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.is_live(ticket) && ticket.generation == self.issued
    }

    pub fn is_latest_replace(&self, ticket: Ticket) -> bool {
        self.is_live(ticket) && ticket.generation == self.latest_replace
    }

    /// Drop every in-flight request. A pending envelope goes back to idle;
    /// a settled one keeps its status and error.
    pub fn cancel(&mut self) {
        self.epoch += 1;
        if self.envelope.is_pending() {
            self.envelope.set(RequestStatus::Idle, None);
        }
    }

    /// Cancel in-flight requests and forget the last outcome.
    pub fn reset(&mut self) {
        self.cancel();
        self.envelope.set(RequestStatus::Idle, None);
    }

    /// Used by the synchronous setters.
    pub(crate) fn idle(&mut self) {
        self.envelope.set(RequestStatus::Idle, None);
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.envelope.set(RequestStatus::Rejected, Some(message));
    }

    /// Run one lifecycle event through the fence. `apply` is called with the
    /// fulfilled payload only when the result may touch the container's data.
    pub(crate) fn reduce<T>(&mut self, event: Lifecycle<T>, mode: Apply, apply: impl FnOnce(T)) {
        let ticket = event.ticket();
        if !self.is_live(ticket) {
            debug!(generation = ticket.generation, "dropping result of cancelled request");
            return;
        }
        match event {
            Lifecycle::Requested(ticket) => {
                if mode == Apply::Replace {
                    self.latest_replace = self.latest_replace.max(ticket.generation);
                }
                self.envelope.set(RequestStatus::Pending, None);
            }
            Lifecycle::Fulfilled(ticket, value) => {
                if mode == Apply::Merge || self.is_latest_replace(ticket) {
                    apply(value);
                } else {
                    debug!(generation = ticket.generation, "dropping stale replace result");
                }
                if self.is_latest(ticket) {
                    self.envelope.set(RequestStatus::Fulfilled, None);
                }
            }
            Lifecycle::Rejected(ticket, message) => {
                if self.is_latest(ticket) {
                    self.envelope.set(RequestStatus::Rejected, Some(message));
                }
            }
            Lifecycle::Abandoned(ticket) => {
                if self.is_latest(ticket) && self.envelope.is_pending() {
                    debug!(generation = ticket.generation, "request abandoned");
                    self.envelope.set(RequestStatus::Idle, None);
                }
            }
        }
    }
}
