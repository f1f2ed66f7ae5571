use dioxus::prelude::*;
use dioxus_router::Router;

use crate::context::{AppContext, SessionState};
use crate::routes::Route;

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context_provider(|| SessionState(Signal::new(None)));

    // Resolve the stored session once before any route renders, so guarded
    // routes never see a signed-out flash.
    let resolved = use_resource(move || {
        let gate = ctx.gate();
        let mut session = session;
        async move {
            let access = gate.resolve().await;
            session.set(access.session().cloned());
        }
    });
    let ready = resolved.finished();

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "MCQ Generator" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                if ready {
                    Router::<Route> {}
                } else {
                    div { class: "splash", p { "Loading..." } }
                }
            }
        }
    }
}
