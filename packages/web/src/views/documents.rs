//! Document list and upload form.

use dioxus::prelude::*;
use store::requests::{DocumentFile, DocumentPatch};
use store::validation::DocumentForm;
use store::{Document, Role, Slice, ValidationErrors};
use ui::{use_app, use_cancel_on_drop, use_session, EnvelopeStatus, FieldError};

#[component]
pub fn Documents() -> Element {
    let app = use_app();
    let session = use_session();
    let mut show_upload = use_signal(|| false);
    use_cancel_on_drop(Slice::Documents);

    let ctx = app.ctx().clone();
    let _ = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let _ = ctx.fetch_documents().await;
        }
    });

    // Prefill the owner field that belongs to the signed-in user
    let mut initial = DocumentForm::default();
    if let Some(session) = &session {
        match session.role() {
            Role::Doctor => initial.doctor_id = session.user_id().to_string(),
            Role::Patient => initial.patient_id = session.user_id().to_string(),
            Role::Admin => {}
        }
    }

    let state = app.state();
    let state = state.read();
    let envelope = state.documents.envelope().clone();
    let documents = state.documents.records().to_vec();

    rsx! {
        div {
            class: "page-header",
            h1 { "Documents" }
            button {
                class: "btn btn-primary",
                onclick: move |_| show_upload.toggle(),
                if show_upload() { "Close" } else { "Upload Document" }
            }
        }

        EnvelopeStatus { envelope }

        if show_upload() {
            UploadForm {
                initial,
                on_done: move |_| show_upload.set(false),
            }
        }

        div {
            class: "grid",
            for doc in documents {
                DocumentCard { key: "{doc.id}", doc }
            }
        }
    }
}

#[component]
fn DocumentCard(doc: Document) -> Element {
    let app = use_app();
    let mut confirming = use_signal(|| false);
    let uploaded = doc
        .upload_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let tags = doc.tags.join(", ");

    let id = doc.id.clone();
    let delete_app = app.clone();
    let handle_delete = move |_| {
        let app = delete_app.clone();
        let id = id.clone();
        spawn(async move {
            let _ = app.ctx().delete_document(id).await;
        });
    };

    let id = doc.id.clone();
    let make_private = !doc.is_private;
    let handle_privacy = move |_| {
        let app = app.clone();
        let id = id.clone();
        spawn(async move {
            let patch = DocumentPatch {
                is_private: Some(make_private),
                ..DocumentPatch::default()
            };
            let _ = app.ctx().update_document(&id, patch).await;
        });
    };

    rsx! {
        div {
            class: "card",
            h3 { "{doc.title}" }
            if !doc.description.is_empty() {
                p { class: "muted", "{doc.description}" }
            }
            p { class: "caption", "Uploaded: {uploaded}" }
            if !tags.is_empty() {
                p { class: "caption", "Tags: {tags}" }
            }
            div {
                class: "card-actions",
                if let Some(url) = doc.file_url.clone() {
                    a { href: "{url}", target: "_blank", "View" }
                }
                button {
                    class: "btn btn-secondary",
                    onclick: handle_privacy,
                    if doc.is_private { "Make shared" } else { "Make private" }
                }
                if confirming() {
                    button {
                        class: "btn btn-danger",
                        onclick: handle_delete,
                        "Confirm delete"
                    }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| confirming.set(false),
                        "Keep"
                    }
                } else {
                    button {
                        class: "btn btn-danger",
                        onclick: move |_| confirming.set(true),
                        "Delete"
                    }
                }
            }
        }
    }
}

#[component]
fn UploadForm(initial: DocumentForm, on_done: EventHandler<()>) -> Element {
    let app = use_app();
    let mut form = use_signal(move || initial);
    let mut errors = use_signal(|| Option::<ValidationErrors>::None);

    let handle_file = move |evt: FormEvent| async move {
        let Some(file) = evt.files().into_iter().next() else {
            form.write().file = None;
            return;
        };
        match file.read_bytes().await {
            Ok(bytes) => {
                form.write().file = Some(DocumentFile {
                    name: file.name(),
                    content_type: file.content_type(),
                    bytes: bytes.to_vec(),
                });
            }
            Err(e) => tracing::error!("Failed to read {}: {}", file.name(), e),
        }
    };

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let doc = match form.read().validate() {
            Ok(doc) => doc,
            Err(e) => {
                errors.set(Some(e));
                return;
            }
        };
        errors.set(None);
        let app = app.clone();
        spawn(async move {
            if app.ctx().upload_document(doc).await.is_ok() {
                on_done.call(());
            }
        });
    };

    let file_label = form
        .read()
        .file
        .as_ref()
        .map(|f| f.name.clone())
        .unwrap_or_else(|| "Choose File".to_string());

    rsx! {
        form {
            onsubmit: handle_submit,
            class: "form card",
            h2 { "Upload New Document" }

            input {
                r#type: "text",
                placeholder: "Title",
                value: form.read().title.clone(),
                oninput: move |evt: FormEvent| form.write().title = evt.value(),
            }
            FieldError { errors: errors(), field: "title" }

            textarea {
                placeholder: "Description",
                rows: 3,
                value: form.read().description.clone(),
                oninput: move |evt: FormEvent| form.write().description = evt.value(),
            }

            input {
                r#type: "text",
                placeholder: "Patient ID",
                value: form.read().patient_id.clone(),
                oninput: move |evt: FormEvent| form.write().patient_id = evt.value(),
            }
            FieldError { errors: errors(), field: "patientId" }

            input {
                r#type: "text",
                placeholder: "Doctor ID",
                value: form.read().doctor_id.clone(),
                oninput: move |evt: FormEvent| form.write().doctor_id = evt.value(),
            }
            FieldError { errors: errors(), field: "doctorId" }

            input {
                r#type: "text",
                placeholder: "Tags, comma separated",
                value: form.read().tags.clone(),
                oninput: move |evt: FormEvent| form.write().tags = evt.value(),
            }

            label {
                input {
                    r#type: "checkbox",
                    checked: form.read().is_private,
                    onchange: move |evt: FormEvent| form.write().is_private = evt.checked(),
                }
                " Private"
            }

            label {
                class: "file-picker",
                input {
                    r#type: "file",
                    accept: "image/*,.pdf",
                    onchange: handle_file,
                }
                "{file_label}"
            }
            FieldError { errors: errors(), field: "file" }

            button { class: "btn btn-primary", r#type: "submit", "Upload" }
        }
    }
}
