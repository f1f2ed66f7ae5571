use dioxus::prelude::*;
use dioxus_router::{Outlet, Routable, use_navigator, use_route};

use crate::context::use_session;
use crate::views::{DashboardView, LoginView, SubjectQuizView};

#[derive(Clone, Routable, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[redirect("/", || Route::Dashboard {})]
    #[route("/login", LoginView)] Login {},
    #[layout(Protected)]
        #[route("/dashboard", DashboardView)] Dashboard {},
        #[route("/subject/:subject_id", SubjectQuizView)] Subject { subject_id: u64 },
}

impl Route {
    /// Where a visit to `self` should go instead, given the sign-in state.
    #[must_use]
    pub fn guard(&self, signed_in: bool) -> Option<Route> {
        match (self, signed_in) {
            (Route::Login {}, true) => Some(Route::Dashboard {}),
            (Route::Dashboard {} | Route::Subject { .. }, false) => Some(Route::Login {}),
            _ => None,
        }
    }
}

/// Layout for routes that need a session.
#[component]
fn Protected() -> Element {
    let session = use_session();
    let navigator = use_navigator();
    let route = use_route::<Route>();
    let signed_in = session.0.read().is_some();

    use_effect(move || {
        let signed_in = session.0.read().is_some();
        if let Some(target) = route.guard(signed_in) {
            navigator.replace(target);
        }
    });

    if signed_in {
        rsx! { Outlet::<Route> {} }
    } else {
        rsx! { div { class: "splash", p { "Redirecting to sign in..." } } }
    }
}
