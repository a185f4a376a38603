//! # API crate: client side of the hospital records REST API
//!
//! Everything between the views and the network. The views hold an
//! [`AppContext`]; every user action that needs the server is one of its async
//! methods, which runs the matching [`Gateway`] call and feeds the result into
//! the state containers from the `store` crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`gateway`] | One method per REST endpoint, `x-auth-token` header, multipart upload |
//! | [`context`] | The dispatcher: request lifecycles, unauthorized handling, state observers |
//! | [`error`] | [`RequestError`] and the per-operation fallback messages |
//!
//! ## Endpoints
//!
//! - **Auth**: `POST /api/auth/login`, `POST /api/auth/register`, `GET /api/auth/me`,
//!   `PUT /api/auth/profile`, `POST /api/auth/verify-email`,
//!   `POST /api/auth/forgot-password`, `POST /api/auth/reset-password`
//! - **Documents**: `GET /api/documents`, `GET|PUT|DELETE /api/documents/:id`,
//!   `POST /api/documents/upload`
//! - **Relationships**: `GET|POST /api/relationships`, `PUT|DELETE /api/relationships/:id`

pub mod context;
pub mod error;
pub mod gateway;

#[cfg(test)]
mod test_server;

pub use context::AppContext;
pub use error::{Operation, RequestError, RequestErrorKind};
pub use gateway::Gateway;
