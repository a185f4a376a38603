use dioxus::prelude::*;

use store::ClientConfig;
use ui::AppProvider;
use views::{
    Dashboard, Documents, ForgotPassword, Login, NotFound, Profile, Register, Relationships,
    ResetPassword, SessionGuard, VerifyEmail,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},
    #[route("/forgot-password")]
    ForgotPassword {},
    #[route("/reset-password/:token")]
    ResetPassword { token: String },
    #[route("/verify-email/:token")]
    VerifyEmail { token: String },
    #[layout(SessionGuard)]
        #[route("/")]
        Root {},
        #[route("/dashboard")]
        Dashboard {},
        #[route("/documents")]
        Documents {},
        #[route("/relationships")]
        Relationships {},
        #[route("/profile")]
        Profile {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

fn load_config() -> ClientConfig {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = std::path::Path::new(ClientConfig::filename());
        match ClientConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load {}: {}", path.display(), e);
                ClientConfig::default().with_env()
            }
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        ClientConfig::default()
    }
}

#[component]
fn App() -> Element {
    let config = use_hook(load_config);

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AppProvider {
            config,
            Router::<Route> {}
        }
    }
}

/// Redirect `/` to `/dashboard`
#[component]
fn Root() -> Element {
    let nav = use_navigator();
    nav.replace(Route::Dashboard {});
    rsx! {}
}
