pub mod config;
pub mod envelope;
pub mod models;
pub mod records;
pub mod requests;
pub mod state;
pub mod validation;

mod token;
pub use token::TokenStore;

mod memory;
pub use memory::MemoryTokenStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileTokenStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local_storage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local_storage::LocalStorageTokenStore;

pub use config::ClientConfig;
pub use envelope::{Envelope, Lifecycle, RequestStatus, Ticket};
pub use models::{
    AuthToken, Document, DocumentId, Relationship, RelationshipId, RelationshipStatus, Role,
    RoleDetails, Session, UserProfile,
};
pub use records::{Record, RecordList};
pub use state::{AppEvent, AppState, Slice};
pub use validation::ValidationErrors;
