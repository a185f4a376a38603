//! Doctor-patient relationships: list, status changes and requests.

use dioxus::prelude::*;
use store::validation::RelationshipForm;
use store::{Relationship, RelationshipStatus, Role, Slice, ValidationErrors};
use ui::{use_app, use_cancel_on_drop, use_session, EnvelopeStatus, FieldError, StatusBadge};

#[component]
pub fn Relationships() -> Element {
    let app = use_app();
    let session = use_session();
    use_cancel_on_drop(Slice::Relationships);

    let ctx = app.ctx().clone();
    let _ = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let _ = ctx.fetch_relationships().await;
        }
    });

    let mut initial = RelationshipForm::default();
    if let Some(session) = &session {
        match session.role() {
            Role::Doctor => initial.doctor_id = session.user_id().to_string(),
            Role::Patient => initial.patient_id = session.user_id().to_string(),
            Role::Admin => {}
        }
    }

    let state = app.state();
    let state = state.read();
    let envelope = state.relationships.envelope().clone();
    let relationships = state.relationships.records().to_vec();

    rsx! {
        h1 { "Relationships" }

        EnvelopeStatus { envelope }

        RequestForm { initial }

        if relationships.is_empty() {
            p { class: "muted", "No relationships yet." }
        }
        div {
            class: "grid",
            for relationship in relationships {
                RelationshipCard { key: "{relationship.id}", relationship }
            }
        }
    }
}

#[component]
fn RelationshipCard(relationship: Relationship) -> Element {
    let app = use_app();
    let id = relationship.id.clone();

    let set_status = {
        let app = app.clone();
        let id = id.clone();
        move |status: RelationshipStatus| {
            let app = app.clone();
            let id = id.clone();
            spawn(async move {
                let _ = app.ctx().update_relationship_status(&id, status).await;
            });
        }
    };
    let accept = set_status.clone();
    let reject = set_status.clone();
    let end = set_status;

    let handle_delete = move |_| {
        let app = app.clone();
        let id = id.clone();
        spawn(async move {
            let _ = app.ctx().delete_relationship(id).await;
        });
    };

    let pending = relationship.status == RelationshipStatus::Pending;

    rsx! {
        div {
            class: "card",
            p { "Doctor: {relationship.doctor_id}" }
            p { "Patient: {relationship.patient_id}" }
            StatusBadge { status: relationship.status }
            div {
                class: "card-actions",
                if pending {
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| accept(RelationshipStatus::Active),
                        "Accept"
                    }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| reject(RelationshipStatus::Rejected),
                        "Reject"
                    }
                }
                if relationship.status == RelationshipStatus::Active {
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| end(RelationshipStatus::Ended),
                        "End"
                    }
                }
                button {
                    class: "btn btn-danger",
                    onclick: handle_delete,
                    "Delete"
                }
            }
        }
    }
}

#[component]
fn RequestForm(initial: RelationshipForm) -> Element {
    let app = use_app();
    let mut form = use_signal(move || initial);
    let mut errors = use_signal(|| Option::<ValidationErrors>::None);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let request = match form.read().validate() {
            Ok(request) => request,
            Err(e) => {
                errors.set(Some(e));
                return;
            }
        };
        errors.set(None);
        let app = app.clone();
        spawn(async move {
            let _ = app.ctx().create_relationship(request).await;
        });
    };

    rsx! {
        form {
            onsubmit: handle_submit,
            class: "form card",
            h2 { "New relationship" }

            input {
                r#type: "text",
                placeholder: "Doctor ID",
                value: form.read().doctor_id.clone(),
                oninput: move |evt: FormEvent| form.write().doctor_id = evt.value(),
            }
            FieldError { errors: errors(), field: "doctorId" }

            input {
                r#type: "text",
                placeholder: "Patient ID",
                value: form.read().patient_id.clone(),
                oninput: move |evt: FormEvent| form.write().patient_id = evt.value(),
            }
            FieldError { errors: errors(), field: "patientId" }

            button { class: "btn btn-primary", r#type: "submit", "Send request" }
        }
    }
}
