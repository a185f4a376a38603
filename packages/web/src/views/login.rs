//! Login page view with email/password form.

use dioxus::prelude::*;
use store::validation::LoginForm;
use store::ValidationErrors;
use ui::{use_app, use_session, ErrorBanner, FieldError};

use crate::Route;

/// Login page component.
#[component]
pub fn Login() -> Element {
    let app = use_app();
    let session = use_session();
    let nav = use_navigator();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut errors = use_signal(|| Option::<ValidationErrors>::None);

    // If already logged in, go to the dashboard
    if session.is_some() {
        nav.replace(Route::Dashboard {});
    }

    let envelope = app.state().read().auth.envelope().clone();

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let form = LoginForm {
            email: email(),
            password: password(),
        };
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(e) => {
                errors.set(Some(e));
                return;
            }
        };
        errors.set(None);
        let app = app.clone();
        spawn(async move {
            if app.ctx().login(credentials).await.is_ok() {
                nav.push(Route::Dashboard {});
            }
        });
    };

    rsx! {
        div {
            class: "page narrow",

            h1 { "Sign in" }
            p { class: "muted", "Hospital records portal" }

            form {
                onsubmit: handle_login,
                class: "form",

                ErrorBanner { message: envelope.error().map(str::to_string) }

                input {
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                FieldError { errors: errors(), field: "email" }

                input {
                    r#type: "password",
                    placeholder: "Password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                FieldError { errors: errors(), field: "password" }

                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: envelope.is_pending(),
                    if envelope.is_pending() { "Signing in..." } else { "Sign in" }
                }
            }

            p {
                class: "muted",
                "No account yet? "
                Link { to: Route::Register {}, "Create one" }
            }
            p {
                class: "muted",
                Link { to: Route::ForgotPassword {}, "Forgot your password?" }
            }
        }
    }
}
