//! Registration page view. The role picked decides which extra fields show.

use dioxus::prelude::*;
use store::validation::RegistrationForm;
use store::{Role, RoleDetails, ValidationErrors};
use ui::{use_app, use_session, ErrorBanner, FieldError};

use crate::Route;

#[component]
pub fn Register() -> Element {
    let app = use_app();
    let session = use_session();
    let nav = use_navigator();
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut phone = use_signal(String::new);
    let mut address = use_signal(String::new);
    let mut role = use_signal(|| Option::<Role>::None);
    let mut specialization = use_signal(String::new);
    let mut registration_number = use_signal(String::new);
    let mut aadhaar_number = use_signal(String::new);
    let mut errors = use_signal(|| Option::<ValidationErrors>::None);

    if session.is_some() {
        nav.replace(Route::Dashboard {});
    }

    let envelope = app.state().read().auth.envelope().clone();

    let handle_register = move |evt: FormEvent| {
        evt.prevent_default();
        let details = role().map(|r| match r {
            Role::Doctor => RoleDetails::Doctor {
                specialization: specialization(),
                registration_number: registration_number(),
            },
            Role::Patient => RoleDetails::Patient {
                aadhaar_number: aadhaar_number(),
            },
            Role::Admin => RoleDetails::Admin,
        });
        let form = RegistrationForm {
            email: email(),
            password: password(),
            confirm_password: confirm_password(),
            name: name(),
            phone: phone(),
            address: address(),
            details,
        };
        let registration = match form.validate() {
            Ok(registration) => registration,
            Err(e) => {
                errors.set(Some(e));
                return;
            }
        };
        errors.set(None);
        let app = app.clone();
        spawn(async move {
            if app.ctx().register(registration).await.is_ok() {
                nav.push(Route::Dashboard {});
            }
        });
    };

    rsx! {
        div {
            class: "page narrow",

            h1 { "Create Account" }

            form {
                onsubmit: handle_register,
                class: "form",

                ErrorBanner { message: envelope.error().map(str::to_string) }

                input {
                    r#type: "text",
                    placeholder: "Full name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
                FieldError { errors: errors(), field: "name" }

                input {
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                FieldError { errors: errors(), field: "email" }

                input {
                    r#type: "password",
                    placeholder: "Password (min 6 characters)",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                FieldError { errors: errors(), field: "password" }

                input {
                    r#type: "password",
                    placeholder: "Confirm password",
                    value: confirm_password(),
                    oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                }
                FieldError { errors: errors(), field: "confirmPassword" }

                input {
                    r#type: "tel",
                    placeholder: "Phone (optional)",
                    value: phone(),
                    oninput: move |evt: FormEvent| phone.set(evt.value()),
                }
                FieldError { errors: errors(), field: "phone" }

                textarea {
                    placeholder: "Address (optional)",
                    value: address(),
                    oninput: move |evt: FormEvent| address.set(evt.value()),
                }

                select {
                    value: role().map(|r| r.as_str()).unwrap_or(""),
                    onchange: move |evt: FormEvent| role.set(Role::parse(&evt.value())),
                    option { value: "", "I am a..." }
                    option { value: "doctor", "Doctor" }
                    option { value: "patient", "Patient" }
                }
                FieldError { errors: errors(), field: "userType" }

                if role() == Some(Role::Doctor) {
                    input {
                        r#type: "text",
                        placeholder: "Specialization",
                        value: specialization(),
                        oninput: move |evt: FormEvent| specialization.set(evt.value()),
                    }
                    FieldError { errors: errors(), field: "specialization" }

                    input {
                        r#type: "text",
                        placeholder: "Medical registration number",
                        value: registration_number(),
                        oninput: move |evt: FormEvent| registration_number.set(evt.value()),
                    }
                    FieldError { errors: errors(), field: "registrationNumber" }
                }

                if role() == Some(Role::Patient) {
                    input {
                        r#type: "text",
                        inputmode: "numeric",
                        placeholder: "Aadhaar number (12 digits)",
                        value: aadhaar_number(),
                        oninput: move |evt: FormEvent| aadhaar_number.set(evt.value()),
                    }
                    FieldError { errors: errors(), field: "aadhaarNumber" }
                }

                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: envelope.is_pending(),
                    if envelope.is_pending() { "Creating account..." } else { "Sign up" }
                }
            }

            p {
                class: "muted",
                "Already have an account? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
