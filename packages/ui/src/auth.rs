//! Session hooks and controls.

use dioxus::prelude::*;
use store::{Session, Slice};

use crate::app::use_app;

/// The current session, if any. Re-renders the caller on login and logout.
pub fn use_session() -> Option<Session> {
    use_app().state().read().auth.session().cloned()
}

/// Discard results of requests on `slice` still in flight when the calling
/// component unmounts.
pub fn use_cancel_on_drop(slice: Slice) {
    let app = use_app();
    use_drop(move || app.ctx().cancel_pending(slice));
}

/// Button to log out the current user. The route guard takes care of
/// leaving protected pages.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let app = use_app();

    let onclick = move |_| app.ctx().logout();

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
