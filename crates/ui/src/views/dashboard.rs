use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::{AppContext, use_session};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{SubjectCardVm, map_subject_cards};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let session = use_session();
    let catalog = ctx.catalog();

    let mut adding = use_signal(|| false);
    let mut new_name = use_signal(String::new);
    let error = use_signal(|| None::<String>);
    let creating = use_signal(|| false);

    let resource = use_resource(move || {
        let catalog = catalog.clone();
        let current = session.current();
        async move {
            let Some(current) = current else {
                return Err(ViewError::Unknown);
            };
            let subjects = catalog.list_subjects(&current).await;
            Ok(map_subject_cards(&subjects))
        }
    });
    let state = view_state_from_resource(&resource);
    let email = session
        .current()
        .map(|s| s.email().to_owned())
        .unwrap_or_default();

    let create = {
        let catalog = ctx.catalog();
        use_callback(move |name: String| {
            let Some(current) = session.current() else {
                return;
            };
            let mut creating = creating;
            if *creating.peek() {
                return;
            }
            creating.set(true);
            let catalog = catalog.clone();
            let mut error = error;
            let mut resource = resource;
            spawn(async move {
                match catalog.create_subject(&current, &name).await {
                    Ok(_) => {
                        error.set(None);
                        new_name.set(String::new());
                        adding.set(false);
                        resource.restart();
                    }
                    Err(err) => error.set(Some(err.user_message())),
                }
                creating.set(false);
            });
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<DashboardTestHandles>() {
                handles.register(create, creating);
            }
        }
    }

    let on_add = move |evt: FormEvent| {
        evt.prevent_default();
        create.call(new_name());
    };

    let on_sign_out = {
        let gate = ctx.gate();
        move |_: MouseEvent| {
            let gate = gate.clone();
            let mut session = session;
            let mut error = error;
            spawn(async move {
                match gate.sign_out().await {
                    Ok(()) => {
                        session.set(None);
                        navigator.replace(Route::Login {});
                    }
                    Err(err) => error.set(Some(err.user_message())),
                }
            });
        }
    };

    rsx! {
        div { class: "page dashboard-page",
            nav { class: "topbar",
                h1 { class: "topbar__title", "MCQ Generator" }
                div { class: "topbar__user",
                    span { class: "topbar__email", "{email}" }
                    button { class: "btn btn-ghost", onclick: on_sign_out, "Sign out" }
                }
            }

            main { class: "content",
                div { class: "section-header",
                    h2 { "Select a Subject" }
                    if !adding() {
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| adding.set(true),
                            "Add Subject"
                        }
                    }
                }

                if adding() {
                    form { class: "add-subject", onsubmit: on_add,
                        input {
                            r#type: "text",
                            placeholder: "Enter subject name",
                            value: "{new_name}",
                            oninput: move |evt| new_name.set(evt.value()),
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: creating(),
                            if creating() { "Adding..." } else { "Add" }
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| {
                                adding.set(false);
                                new_name.set(String::new());
                            },
                            "Cancel"
                        }
                    }
                }

                if let Some(message) = error() {
                    p { class: "form-error", "{message}" }
                }

                match state {
                    ViewState::Idle => rsx! {
                        p { "Idle" }
                    },
                    ViewState::Loading => rsx! {
                        p { "Loading subjects..." }
                    },
                    ViewState::Ready(cards) => rsx! {
                        if cards.is_empty() {
                            p { class: "empty-state", "No subjects yet. Add one to get started." }
                        } else {
                            ul { class: "subject-grid",
                                for card in cards {
                                    SubjectCard { key: "{card.id}", card }
                                }
                            }
                        }
                    },
                    ViewState::Error(err) => rsx! {
                        p { "{err.message()}" }
                    },
                }
            }
        }
    }
}

#[component]
fn SubjectCard(card: SubjectCardVm) -> Element {
    rsx! {
        li { class: "subject-card",
            Link { class: "subject-card__link", to: Route::Subject { subject_id: card.id.value() },
                span { class: "subject-card__avatar", "{card.avatar}" }
                h3 { class: "subject-card__name", "{card.name}" }
                p { class: "subject-card__cta", "Click to start practice" }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct DashboardTestHandles {
    create: Rc<RefCell<Option<Callback<String>>>>,
    creating: Rc<RefCell<Option<Signal<bool>>>>,
}

#[cfg(test)]
impl DashboardTestHandles {
    pub(crate) fn register(&self, create: Callback<String>, creating: Signal<bool>) {
        *self.create.borrow_mut() = Some(create);
        *self.creating.borrow_mut() = Some(creating);
    }

    pub(crate) fn create(&self) -> Callback<String> {
        (*self.create.borrow()).expect("dashboard create registered")
    }

    pub(crate) fn creating(&self) -> Signal<bool> {
        (*self.creating.borrow()).expect("dashboard creating registered")
    }
}
