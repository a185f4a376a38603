//! Password reset and email verification pages.

use dioxus::prelude::*;
use store::validation::PasswordResetForm;
use store::ValidationErrors;
use ui::{use_app, EnvelopeStatus, FieldError};

use crate::Route;

#[component]
pub fn ForgotPassword() -> Element {
    let app = use_app();
    let mut email = use_signal(String::new);
    let mut sent = use_signal(|| Option::<String>::None);

    let envelope = app.state().read().auth.envelope().clone();

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let address = email().trim().to_string();
        if address.is_empty() {
            return;
        }
        let app = app.clone();
        spawn(async move {
            if let Ok(message) = app.ctx().request_password_reset(&address).await {
                sent.set(Some(message));
            }
        });
    };

    rsx! {
        div {
            class: "page narrow",
            h1 { "Reset your password" }

            if let Some(message) = sent() {
                p { class: "notice", "{message}" }
            } else {
                form {
                    onsubmit: handle_submit,
                    class: "form",
                    EnvelopeStatus { envelope, loading: "Sending..." }
                    input {
                        r#type: "email",
                        placeholder: "Email",
                        value: email(),
                        oninput: move |evt: FormEvent| email.set(evt.value()),
                    }
                    button { class: "btn btn-primary", r#type: "submit", "Send reset link" }
                }
            }

            Link { to: Route::Login {}, "Back to sign in" }
        }
    }
}

#[component]
pub fn ResetPassword(token: String) -> Element {
    let app = use_app();
    let mut new_password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut errors = use_signal(|| Option::<ValidationErrors>::None);
    let mut done = use_signal(|| Option::<String>::None);

    let envelope = app.state().read().auth.envelope().clone();

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let form = PasswordResetForm {
            token: token.clone(),
            new_password: new_password(),
            confirm_password: confirm_password(),
        };
        let reset = match form.validate() {
            Ok(reset) => reset,
            Err(e) => {
                errors.set(Some(e));
                return;
            }
        };
        errors.set(None);
        let app = app.clone();
        spawn(async move {
            if let Ok(message) = app.ctx().reset_password(reset).await {
                done.set(Some(message));
            }
        });
    };

    rsx! {
        div {
            class: "page narrow",
            h1 { "Choose a new password" }

            if let Some(message) = done() {
                p { class: "notice", "{message}" }
                Link { to: Route::Login {}, "Sign in" }
            } else {
                form {
                    onsubmit: handle_submit,
                    class: "form",
                    EnvelopeStatus { envelope, loading: "Saving..." }
                    FieldError { errors: errors(), field: "token" }
                    input {
                        r#type: "password",
                        placeholder: "New password",
                        value: new_password(),
                        oninput: move |evt: FormEvent| new_password.set(evt.value()),
                    }
                    FieldError { errors: errors(), field: "newPassword" }
                    input {
                        r#type: "password",
                        placeholder: "Confirm new password",
                        value: confirm_password(),
                        oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                    }
                    FieldError { errors: errors(), field: "confirmPassword" }
                    button { class: "btn btn-primary", r#type: "submit", "Reset password" }
                }
            }
        }
    }
}

/// Confirms the address as soon as the page opens.
#[component]
pub fn VerifyEmail(token: String) -> Element {
    let app = use_app();
    let mut outcome = use_signal(|| Option::<Result<String, String>>::None);

    let ctx = app.ctx().clone();
    let _ = use_resource(move || {
        let ctx = ctx.clone();
        let token = token.clone();
        async move {
            let result = ctx.verify_email(&token).await.map_err(|e| e.to_string());
            outcome.set(Some(result));
        }
    });

    rsx! {
        div {
            class: "page narrow",
            h1 { "Email verification" }
            {match outcome() {
                None => rsx! { p { class: "loading", "Verifying..." } },
                Some(Ok(message)) => rsx! { p { class: "notice", "{message}" } },
                Some(Err(message)) => rsx! { p { class: "error-banner", "{message}" } },
            }}
            Link { to: Route::Login {}, "Continue to sign in" }
        }
    }
}
