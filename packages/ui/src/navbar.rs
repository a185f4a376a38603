use dioxus::prelude::*;

use crate::auth::{use_session, LogoutButton};

#[component]
pub fn Navbar(children: Element) -> Element {
    let session = use_session();

    rsx! {
        nav {
            class: "navbar",
            div { class: "navbar-links", {children} }
            if let Some(session) = session {
                div {
                    class: "navbar-user",
                    span { "{session.name()} ({session.role()})" }
                    LogoutButton { class: "btn btn-secondary" }
                }
            }
        }
    }
}
