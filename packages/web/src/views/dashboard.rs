//! Landing page after sign-in: counts and the latest uploads.

use dioxus::prelude::*;
use store::{RelationshipStatus, Slice};
use ui::{use_app, use_cancel_on_drop, use_session, EnvelopeStatus};

use crate::Route;

const RECENT: usize = 5;

#[component]
pub fn Dashboard() -> Element {
    let app = use_app();
    let session = use_session();
    use_cancel_on_drop(Slice::Documents);
    use_cancel_on_drop(Slice::Relationships);

    let ctx = app.ctx().clone();
    let _ = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let _ = ctx.fetch_documents().await;
            let _ = ctx.fetch_relationships().await;
        }
    });

    let state = app.state();
    let state = state.read();
    let documents = state.documents.records();
    let active = state
        .relationships
        .records()
        .iter()
        .filter(|r| r.status == RelationshipStatus::Active)
        .count();
    let name = session.as_ref().map(|s| s.name().to_string()).unwrap_or_default();

    rsx! {
        h1 { "Welcome, {name}" }

        EnvelopeStatus { envelope: state.documents.envelope().clone() }
        EnvelopeStatus { envelope: state.relationships.envelope().clone() }

        div {
            class: "stats",
            div {
                class: "card",
                p { class: "muted", "Total Documents" }
                p { class: "stat", "{documents.len()}" }
            }
            div {
                class: "card",
                p { class: "muted", "Active Relationships" }
                p { class: "stat", "{active}" }
            }
        }

        div {
            class: "card",
            h2 { "Recent documents" }
            if documents.is_empty() {
                p { class: "muted", "Nothing uploaded yet." }
            }
            ul {
                for doc in documents.iter().take(RECENT) {
                    li {
                        key: "{doc.id}",
                        "{doc.title}"
                        if let Some(date) = doc.upload_date.map(|d| d.format("%Y-%m-%d")) {
                            span { class: "muted", " · {date}" }
                        }
                    }
                }
            }
            Link { to: Route::Documents {}, "All documents" }
        }
    }
}
