//! Container for a server-owned list of records (documents, relationships).

use crate::envelope::{Apply, Envelope, Lifecycle, RequestTracker, Ticket};
use crate::records::{Record, RecordList};

/// Events reduced by a [`Collection`].
///
/// The first five are synchronous setters used by views that don't round-trip
/// through the dispatcher; they return the envelope to idle. The rest are
/// request lifecycles.
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionEvent<R: Record> {
    Set(Vec<R>),
    Add(R),
    Patch(R),
    Remove(R::Id),
    SetError(String),
    /// Fetch the whole list; replaces it in server order.
    Fetch(Lifecycle<Vec<R>>),
    /// Fetch one record; merged in place or appended.
    FetchOne(Lifecycle<R>),
    /// Create (upload) a record; prepended.
    Create(Lifecycle<R>),
    /// Update a record; patched by id.
    Update(Lifecycle<R>),
    /// Delete a record; filtered out by id.
    Delete(Lifecycle<R::Id>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Collection<R: Record> {
    records: RecordList<R>,
    requests: RequestTracker,
}

impl<R: Record> Default for Collection<R> {
    fn default() -> Self {
        Self {
            records: RecordList::default(),
            requests: RequestTracker::default(),
        }
    }
}

impl<R: Record> Collection<R> {
    pub fn records(&self) -> &[R] {
        self.records.as_slice()
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.records.get(id)
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

    /// Forget the records and cancel in-flight requests; a settled error stays
    /// visible.
    pub fn invalidate(&mut self) {
        self.requests.cancel();
        self.records.clear();
    }

    /// Back to the initial state. Tickets issued before stay dead.
    pub fn reset(&mut self) {
        self.requests.reset();
        self.records.clear();
    }

    pub fn reduce(&mut self, event: CollectionEvent<R>) {
        let records = &mut self.records;
        match event {
            CollectionEvent::Set(items) => {
                records.replace(items);
                self.requests.idle();
            }
            CollectionEvent::Add(record) => {
                records.append(record);
                self.requests.idle();
            }
            CollectionEvent::Patch(record) => {
                records.patch(record);
                self.requests.idle();
            }
            CollectionEvent::Remove(id) => {
                records.remove(&id);
                self.requests.idle();
            }
            CollectionEvent::SetError(message) => self.requests.fail(message),
            CollectionEvent::Fetch(event) => {
                self.requests
                    .reduce(event, Apply::Replace, |items| records.replace(items))
            }
            CollectionEvent::FetchOne(event) => {
                self.requests
                    .reduce(event, Apply::Merge, |record| records.append(record))
            }
            CollectionEvent::Create(event) => {
                self.requests
                    .reduce(event, Apply::Merge, |record| records.prepend(record))
            }
            CollectionEvent::Update(event) => self.requests.reduce(event, Apply::Merge, |record| {
                records.patch(record);
            }),
            CollectionEvent::Delete(event) => self.requests.reduce(event, Apply::Merge, |id| {
                records.remove(&id);
            }),
        }
    }
}
