//! Application context for the UI.
//!
//! [`AppProvider`] builds the single [`AppContext`] for the app (gateway,
//! platform token store, config, shared state) and hands it to every view
//! through Dioxus context. State changes inside the context are mirrored into
//! a `Signal<AppState>`, so components re-render when a container they read
//! changes.

use api::AppContext;
use dioxus::prelude::*;
use store::{AppState, ClientConfig};

use crate::tokens::{make_token_store, PlatformTokenStore};

pub type Context = AppContext<PlatformTokenStore>;

#[derive(Clone)]
pub struct AppHandle {
    ctx: Context,
    state: Signal<AppState>,
    booting: Signal<bool>,
}

impl AppHandle {
    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    /// Reading the signal subscribes the calling component.
    pub fn state(&self) -> Signal<AppState> {
        self.state
    }

    /// True until the stored token (if any) has been checked with the server.
    pub fn is_booting(&self) -> bool {
        (self.booting)()
    }
}

pub fn use_app() -> AppHandle {
    use_context::<AppHandle>()
}

/// Wrap the router with this component.
#[component]
pub fn AppProvider(config: ClientConfig, children: Element) -> Element {
    let state = use_signal(AppState::default);
    let mut booting = use_signal(|| true);

    let handle = use_context_provider(|| {
        let ctx = AppContext::new(config.clone(), make_token_store(&config));
        ctx.subscribe(move |s| {
            let mut state = state;
            state.set(s.clone());
        });
        AppHandle {
            ctx,
            state,
            booting,
        }
    });

    // Restore the session from the stored token on mount
    let ctx = handle.ctx.clone();
    let _ = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            if let Err(e) = ctx.restore_session().await {
                tracing::warn!("Failed to restore session: {}", e);
            }
            booting.set(false);
        }
    });

    rsx! {
        {children}
    }
}
