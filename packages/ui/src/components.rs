//! Small presentation components shared by the views.

use dioxus::prelude::*;
use store::{Envelope, RelationshipStatus, RequestStatus, ValidationErrors};

/// Red banner for a request or form error.
#[component]
pub fn ErrorBanner(message: Option<String>) -> Element {
    rsx! {
        if let Some(message) = message {
            div {
                class: "error-banner",
                role: "alert",
                "{message}"
            }
        }
    }
}

/// Inline message under a form field.
#[component]
pub fn FieldError(errors: Option<ValidationErrors>, field: &'static str) -> Element {
    let message = errors
        .as_ref()
        .and_then(|e| e.get(field))
        .map(str::to_string);
    rsx! {
        if let Some(message) = message {
            p { class: "field-error", "{message}" }
        }
    }
}

/// Loading line or error banner for a container's envelope.
#[component]
pub fn EnvelopeStatus(
    envelope: Envelope,
    #[props(default = "Loading...".to_string())] loading: String,
) -> Element {
    match envelope.status() {
        RequestStatus::Pending => rsx! {
            p { class: "loading", "{loading}" }
        },
        RequestStatus::Rejected => rsx! {
            ErrorBanner { message: envelope.error().map(str::to_string) }
        },
        RequestStatus::Idle | RequestStatus::Fulfilled => rsx! {},
    }
}

#[component]
pub fn StatusBadge(status: RelationshipStatus) -> Element {
    rsx! {
        span {
            class: "status-badge status-{status}",
            "{status}"
        }
    }
}
