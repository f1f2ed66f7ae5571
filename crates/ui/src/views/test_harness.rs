use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{QuestionContent, Session, Subject, SubjectName, UserId};
use quiz_core::time::fixed_now;
use services::{
    AppServices, CatalogService, Clock, LocalAuthProvider, QuestionGenerator, QuizService,
    SessionGate,
};
use storage::repository::Storage;

use super::dashboard::DashboardTestHandles;
use super::quiz::QuizTestHandles;
use crate::context::{SessionState, UiApp, build_app_context};
use crate::views::{DashboardView, LoginView, SubjectQuizView};

struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn gate(&self) -> Arc<SessionGate> {
        self.services.gate()
    }

    fn catalog(&self) -> Arc<CatalogService> {
        self.services.catalog()
    }

    fn quiz(&self) -> Arc<QuizService> {
        self.services.quiz()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Login,
    Dashboard,
    Quiz(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    session: Option<Session>,
    handles: ViewHandles,
}

/// Callbacks and signals the views register when a test provides them.
#[derive(Clone, Default)]
pub struct ViewHandles {
    pub quiz: QuizTestHandles,
    pub dashboard: DashboardTestHandles,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    use_context_provider(|| SessionState(Signal::new(props.session.clone())));
    use_context_provider(|| props.handles.quiz.clone());
    use_context_provider(|| props.handles.dashboard.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::Quiz(subject_id) => rsx! { SubjectQuizView { subject_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and let pending resources settle.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..3 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Seed data shared by a harness and its test.
pub struct Fixture {
    pub storage: Storage,
    pub session: Session,
    services: AppServices,
}

impl Fixture {
    pub fn new() -> Self {
        let storage = Storage::in_memory();
        let clock = Clock::fixed(fixed_now());
        let auth = Arc::new(LocalAuthProvider::new(clock, Arc::clone(&storage.users)));
        let services = AppServices::from_parts(
            storage.clone(),
            clock,
            auth,
            QuestionGenerator::disabled(),
            false,
        );
        let session = Session::new(UserId::generate(), "ada@example.com", fixed_now());
        Self {
            storage,
            session,
            services,
        }
    }

    pub async fn subject(&self, name: &str) -> Subject {
        self.storage
            .subjects
            .insert_subject(
                self.session.user_id(),
                &SubjectName::new(name).expect("subject name"),
                fixed_now(),
            )
            .await
            .expect("insert subject")
    }

    pub async fn questions(&self, subject: &Subject, texts: &[&str]) {
        let contents: Vec<QuestionContent> = texts
            .iter()
            .map(|text| {
                QuestionContent::new(
                    (*text).to_string(),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    "b".into(),
                    "Because b.".into(),
                )
                .expect("question content")
            })
            .collect();
        self.storage
            .questions
            .insert_questions(self.session.user_id(), subject.id(), &contents, fixed_now())
            .await
            .expect("insert questions");
    }

    pub fn harness(&self, view: ViewKind, signed_in: bool) -> ViewHarness {
        self.harness_with_handles(view, signed_in, ViewHandles::default())
    }

    pub fn harness_with_handles(
        &self,
        view: ViewKind,
        signed_in: bool,
        handles: ViewHandles,
    ) -> ViewHarness {
        let app = Arc::new(TestApp {
            services: self.services.clone(),
        });
        let dom = VirtualDom::new_with_props(
            ViewRouterHarness,
            ViewHarnessProps {
                app,
                view,
                session: signed_in.then(|| self.session.clone()),
                handles,
            },
        );
        ViewHarness { dom }
    }
}
