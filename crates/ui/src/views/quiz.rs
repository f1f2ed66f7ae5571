use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::SubjectId;
use services::{QUESTION_COUNT_CHOICES, QuizPhase};

use crate::context::{AppContext, use_session};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{OptionVm, QuizVm, open_quiz};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

/// Quiz actions that suspend while the service works.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum QuizIntent {
    Select(String),
    Advance,
    Generate,
}

#[component]
pub fn SubjectQuizView(subject_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_session();
    let quiz = ctx.quiz();
    let generation_enabled = quiz.generation_enabled();
    let subject_id = SubjectId::new(subject_id);

    let vm = use_signal(|| None::<QuizVm>);
    let error = use_signal(|| None::<ViewError>);
    let pending = use_signal(|| false);
    let mut count = use_signal(|| QUESTION_COUNT_CHOICES[0]);

    let quiz_for_resource = quiz.clone();
    let resource = use_resource(move || {
        let quiz = quiz_for_resource.clone();
        let current = session.current();
        let mut vm = vm;
        let mut error = error;
        async move {
            let current = current.ok_or(ViewError::Unknown)?;
            let opened = open_quiz(&quiz, &current, subject_id).await?;
            vm.set(Some(opened));
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    let dispatch = use_callback(move |intent: QuizIntent| {
        let quiz = quiz.clone();
        let mut vm = vm;
        let mut error = error;
        let mut pending = pending;
        let Some(current) = session.current() else {
            return;
        };
        if *pending.peek() {
            return;
        }
        // Work on a copy so the current card stays on screen until the call settles.
        let Some(mut working) = vm.peek().as_ref().cloned() else {
            error.set(Some(ViewError::Unknown));
            return;
        };
        pending.set(true);

        spawn(async move {
            let result = match intent {
                QuizIntent::Select(option) => working.select(&quiz, &current, &option).await,
                QuizIntent::Advance => working.advance(&quiz, &current).await,
                QuizIntent::Generate => working
                    .generate(&quiz, &current, count())
                    .await
                    .map(|_| ()),
            };

            // Services leave the run untouched on failure, so the copy is always current.
            vm.set(Some(working));
            error.set(result.err());
            pending.set(false);
        });
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(dispatch, vm, pending, error);
            }
        }
    }

    let on_practice_again = move |_: MouseEvent| {
        let mut resource = resource;
        let mut error = error;
        error.set(None);
        resource.restart();
    };

    let guard = vm.read();
    let generate_disabled = pending()
        || !generation_enabled
        || guard.as_ref().is_some_and(|vm| !vm.can_generate());
    let title = guard
        .as_ref()
        .map(|vm| vm.subject_name().to_owned())
        .unwrap_or_default();

    let body = match state {
        ViewState::Idle => rsx! {
            p { "Idle" }
        },
        ViewState::Loading => rsx! {
            p { "Loading questions..." }
        },
        ViewState::Error(err) => rsx! {
            div { class: "quiz-error",
                p { "{err.message()}" }
                Link { to: Route::Dashboard {}, "Back to Dashboard" }
            }
        },
        ViewState::Ready(()) => match guard.as_ref() {
            None => rsx! {
                p { "Loading questions..." }
            },
            Some(run) => run_body(run, pending(), generate_disabled, dispatch, on_practice_again),
        },
    };
    drop(guard);

    rsx! {
        div { class: "page quiz-page",
            header { class: "quiz-header",
                Link { class: "back-link", to: Route::Dashboard {}, "← Back to Dashboard" }
                h2 { class: "quiz-title", "{title}" }
                div { class: "quiz-generate",
                    select {
                        class: "quiz-count",
                        value: "{count}",
                        disabled: pending(),
                        onchange: move |evt| {
                            if let Ok(value) = evt.value().parse::<usize>() {
                                count.set(value);
                            }
                        },
                        for choice in QUESTION_COUNT_CHOICES {
                            option { key: "{choice}", value: "{choice}", "{choice} questions" }
                        }
                    }
                    button {
                        class: "btn btn-primary",
                        disabled: generate_disabled,
                        onclick: move |_| dispatch.call(QuizIntent::Generate),
                        if pending() { "Generating..." } else { "Generate Question" }
                    }
                }
            }

            if !generation_enabled {
                p { class: "quiz-notice", "AI generation is not configured." }
            }

            if let Some(err) = error() {
                div { class: "quiz-error", "{err.message()}" }
            }

            {body}
        }
    }
}

fn run_body(
    run: &QuizVm,
    pending: bool,
    generate_disabled: bool,
    dispatch: Callback<QuizIntent>,
    on_practice_again: impl FnMut(MouseEvent) + 'static,
) -> Element {
    match run.phase() {
        QuizPhase::NoQuestions => rsx! {
            p { class: "empty-state", "No questions available for this subject." }
        },
        QuizPhase::InProgress => rsx! {
            QuestionCard {
                progress: run.progress_label(),
                score: run.score_label(),
                text: run.question_text().unwrap_or_default().to_owned(),
                options: run.options(),
                can_select: run.can_select() && !pending,
                explanation: run.explanation().map(str::to_owned),
                next_label: run.next_label(),
                on_intent: dispatch,
            }
        },
        QuizPhase::Completed => rsx! {
            div { class: "quiz-complete",
                h3 { "Quiz complete" }
                p { class: "quiz-complete__score", "{run.completion_label()}" }
                if let Some(lifetime) = run.lifetime_label() {
                    p { class: "quiz-complete__lifetime", "{lifetime}" }
                }
                div { class: "quiz-complete__actions",
                    button {
                        class: "btn btn-primary",
                        onclick: on_practice_again,
                        "Practice again"
                    }
                    button {
                        class: "btn btn-secondary",
                        disabled: generate_disabled,
                        onclick: move |_| dispatch.call(QuizIntent::Generate),
                        "Generate more"
                    }
                }
            }
        },
    }
}

#[component]
fn QuestionCard(
    progress: String,
    score: String,
    text: String,
    options: Vec<OptionVm>,
    can_select: bool,
    explanation: Option<String>,
    next_label: Option<&'static str>,
    on_intent: Callback<QuizIntent>,
) -> Element {
    rsx! {
        div { class: "quiz-card",
            div { class: "quiz-card__meta",
                span { "{progress}" }
                span { "{score}" }
            }
            p { class: "quiz-card__question", "{text}" }
            div { class: "quiz-card__options",
                for option in options {
                    OptionButton {
                        key: "{option.label}",
                        option: option.clone(),
                        enabled: can_select,
                        on_intent,
                    }
                }
            }
            if let Some(explanation) = explanation {
                div { class: "quiz-explanation",
                    h4 { "Explanation" }
                    p { "{explanation}" }
                }
            }
            if let Some(label) = next_label {
                button {
                    class: "btn btn-primary quiz-next",
                    onclick: move |_| on_intent.call(QuizIntent::Advance),
                    "{label}"
                }
            }
        }
    }
}

#[component]
fn OptionButton(option: OptionVm, enabled: bool, on_intent: Callback<QuizIntent>) -> Element {
    let label = option.label.clone();
    rsx! {
        button {
            class: "{option.state.class()}",
            disabled: !enabled,
            onclick: move |_| on_intent.call(QuizIntent::Select(label.clone())),
            span { class: "quiz-option__label", "{option.label}" }
            if let Some(marker) = option.state.marker() {
                span { class: "quiz-option__marker", "{marker}" }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<QuizVm>>>>>,
    pending: Rc<RefCell<Option<Signal<bool>>>>,
    error: Rc<RefCell<Option<Signal<Option<ViewError>>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<QuizIntent>,
        vm: Signal<Option<QuizVm>>,
        pending: Signal<bool>,
        error: Signal<Option<ViewError>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
        *self.pending.borrow_mut() = Some(pending);
        *self.error.borrow_mut() = Some(error);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<QuizVm>> {
        (*self.vm.borrow()).expect("quiz vm registered")
    }

    pub(crate) fn pending(&self) -> Signal<bool> {
        (*self.pending.borrow()).expect("quiz pending registered")
    }

    pub(crate) fn error(&self) -> Signal<Option<ViewError>> {
        (*self.error.borrow()).expect("quiz error registered")
    }
}
