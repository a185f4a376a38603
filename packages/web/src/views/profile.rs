//! Profile page: read-only summary with an inline edit form.

use dioxus::prelude::*;
use store::validation::ProfileForm;
use store::{RoleDetails, Slice, UserProfile, ValidationErrors};
use ui::{use_app, use_cancel_on_drop, EnvelopeStatus, FieldError};

#[component]
pub fn Profile() -> Element {
    let app = use_app();
    let mut editing = use_signal(|| false);
    use_cancel_on_drop(Slice::Profile);

    let ctx = app.ctx().clone();
    let _ = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let _ = ctx.fetch_current_user().await;
        }
    });

    let state = app.state();
    let state = state.read();
    let envelope = state.profile.envelope().clone();
    let user = state
        .profile
        .user()
        .or_else(|| state.auth.session().map(|s| s.profile()))
        .cloned();

    let Some(user) = user else {
        return rsx! {
            h1 { "Profile" }
            EnvelopeStatus { envelope }
        };
    };

    rsx! {
        div {
            class: "page-header",
            h1 { "Profile" }
            button {
                class: "btn btn-secondary",
                onclick: move |_| editing.toggle(),
                if editing() { "Cancel Edit" } else { "Edit Profile" }
            }
        }

        EnvelopeStatus { envelope }

        if editing() {
            EditProfile {
                user,
                on_saved: move |_| editing.set(false),
            }
        } else {
            ProfileSummary { user }
        }
    }
}

#[component]
fn ProfileSummary(user: UserProfile) -> Element {
    let phone = user.phone.clone().unwrap_or_else(|| "-".to_string());
    let address = user.address.clone().unwrap_or_else(|| "-".to_string());

    rsx! {
        div {
            class: "card",
            h2 { "{user.name}" }
            p { class: "muted", "{user.role()}" }
            dl {
                dt { "Email" }
                dd { "{user.email}" }
                dt { "Phone" }
                dd { "{phone}" }
                dt { "Address" }
                dd { "{address}" }
                {match &user.details {
                    RoleDetails::Doctor { specialization, registration_number } => rsx! {
                        dt { "Specialization" }
                        dd { "{specialization}" }
                        dt { "Registration number" }
                        dd { "{registration_number}" }
                    },
                    RoleDetails::Patient { aadhaar_number } => rsx! {
                        dt { "Aadhaar number" }
                        dd { "{aadhaar_number}" }
                    },
                    RoleDetails::Admin => rsx! {},
                }}
            }
        }
    }
}

#[component]
fn EditProfile(user: UserProfile, on_saved: EventHandler<()>) -> Element {
    let app = use_app();
    let mut form = use_signal(move || ProfileForm::from_profile(&user));
    let mut errors = use_signal(|| Option::<ValidationErrors>::None);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let update = match form.read().validate() {
            Ok(update) => update,
            Err(e) => {
                errors.set(Some(e));
                return;
            }
        };
        errors.set(None);
        let app = app.clone();
        spawn(async move {
            if app.ctx().update_profile(update).await.is_ok() {
                on_saved.call(());
            }
        });
    };

    let details = form.read().details.clone();

    rsx! {
        form {
            onsubmit: handle_submit,
            class: "form card",
            h2 { "Personal Information" }

            input {
                r#type: "text",
                placeholder: "Full name",
                value: form.read().name.clone(),
                oninput: move |evt: FormEvent| form.write().name = evt.value(),
            }
            FieldError { errors: errors(), field: "name" }

            input {
                r#type: "email",
                placeholder: "Email",
                value: form.read().email.clone(),
                oninput: move |evt: FormEvent| form.write().email = evt.value(),
            }
            FieldError { errors: errors(), field: "email" }

            input {
                r#type: "tel",
                placeholder: "Phone",
                value: form.read().phone.clone(),
                oninput: move |evt: FormEvent| form.write().phone = evt.value(),
            }
            FieldError { errors: errors(), field: "phone" }

            textarea {
                placeholder: "Address",
                rows: 2,
                value: form.read().address.clone(),
                oninput: move |evt: FormEvent| form.write().address = evt.value(),
            }

            {match details {
                RoleDetails::Doctor { specialization, registration_number } => rsx! {
                    h2 { "Professional Information" }
                    input {
                        r#type: "text",
                        placeholder: "Specialization",
                        value: specialization,
                        oninput: move |evt: FormEvent| {
                            let mut form = form.write();
                            if let RoleDetails::Doctor { specialization, .. } = &mut form.details {
                                *specialization = evt.value();
                            }
                        },
                    }
                    FieldError { errors: errors(), field: "specialization" }
                    input {
                        r#type: "text",
                        placeholder: "Registration number",
                        value: registration_number,
                        oninput: move |evt: FormEvent| {
                            let mut form = form.write();
                            if let RoleDetails::Doctor { registration_number, .. } = &mut form.details {
                                *registration_number = evt.value();
                            }
                        },
                    }
                    FieldError { errors: errors(), field: "registrationNumber" }
                },
                RoleDetails::Patient { aadhaar_number } => rsx! {
                    h2 { "Medical Information" }
                    input {
                        r#type: "text",
                        placeholder: "Aadhaar number",
                        value: aadhaar_number,
                        oninput: move |evt: FormEvent| {
                            let mut form = form.write();
                            if let RoleDetails::Patient { aadhaar_number } = &mut form.details {
                                *aadhaar_number = evt.value();
                            }
                        },
                    }
                    FieldError { errors: errors(), field: "aadhaarNumber" }
                },
                RoleDetails::Admin => rsx! {},
            }}

            button { class: "btn btn-primary", r#type: "submit", "Save Changes" }
        }
    }
}
