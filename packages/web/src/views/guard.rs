//! Route guard for the signed-in part of the app.

use dioxus::prelude::*;
use ui::{use_app, use_session, Navbar};

use crate::Route;

/// Layout for protected routes. Signed-out users are sent to the login page;
/// a stored token holds the page on a loading line until restore settles.
#[component]
pub fn SessionGuard() -> Element {
    let app = use_app();
    let session = use_session();
    let nav = use_navigator();

    if session.is_none() {
        // A stored token may still turn into a session while booting
        if app.ctx().has_token() && app.is_booting() {
            return rsx! {
                p { class: "loading", "Loading..." }
            };
        }
        nav.replace(Route::Login {});
        return rsx! {};
    }

    rsx! {
        Navbar {
            Link { to: Route::Dashboard {}, "Dashboard" }
            Link { to: Route::Documents {}, "Documents" }
            Link { to: Route::Relationships {}, "Relationships" }
            Link { to: Route::Profile {}, "Profile" }
        }
        main {
            class: "page",
            Outlet::<Route> {}
        }
    }
}
