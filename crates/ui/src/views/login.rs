use dioxus::prelude::*;
use dioxus_router::use_navigator;
use services::Credentials;

use crate::context::{AppContext, use_session};
use crate::routes::Route;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let session = use_session();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let error = use_signal(|| None::<String>);
    let pending = use_signal(|| false);

    use_effect(move || {
        let signed_in = session.0.read().is_some();
        if let Some(target) = (Route::Login {}).guard(signed_in) {
            navigator.replace(target);
        }
    });

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if pending() {
            return;
        }
        let gate = ctx.gate();
        let credentials = Credentials::new(email(), password());
        let mut error = error;
        let mut pending = pending;
        let mut session = session;
        spawn(async move {
            pending.set(true);
            match gate.sign_in(credentials).await {
                Ok(signed_in) => {
                    error.set(None);
                    session.set(Some(signed_in));
                    navigator.replace(Route::Dashboard {});
                }
                Err(err) => error.set(Some(err.user_message())),
            }
            pending.set(false);
        });
    };

    rsx! {
        div { class: "page login-page",
            div { class: "login-card",
                h1 { "MCQ Generator" }
                p { class: "login-subtitle", "Sign in to practice your subjects." }

                form { class: "login-form", onsubmit: on_submit,
                    label { r#for: "login-email", "E-mail" }
                    input {
                        id: "login-email",
                        r#type: "email",
                        placeholder: "you@example.com",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                    label { r#for: "login-password", "Password" }
                    input {
                        id: "login-password",
                        r#type: "password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }
                    if let Some(message) = error() {
                        p { class: "form-error", "{message}" }
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: pending(),
                        if pending() { "Signing in..." } else { "Sign in" }
                    }
                }
            }
        }
    }
}
