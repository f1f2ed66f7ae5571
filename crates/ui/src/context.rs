use std::sync::Arc;

use dioxus::prelude::*;
use quiz_core::model::Session;
use services::{CatalogService, QuizService, SessionGate};

pub trait UiApp: Send + Sync {
    fn gate(&self) -> Arc<SessionGate>;
    fn catalog(&self) -> Arc<CatalogService>;
    fn quiz(&self) -> Arc<QuizService>;
}

#[derive(Clone)]
pub struct AppContext {
    gate: Arc<SessionGate>,
    catalog: Arc<CatalogService>,
    quiz: Arc<QuizService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            gate: app.gate(),
            catalog: app.catalog(),
            quiz: app.quiz(),
        }
    }

    #[must_use]
    pub fn gate(&self) -> Arc<SessionGate> {
        Arc::clone(&self.gate)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

/// The signed-in session shared by every route. `None` means signed out.
#[derive(Clone, Copy, PartialEq)]
pub struct SessionState(pub Signal<Option<Session>>);

impl SessionState {
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.0.read().clone()
    }

    pub fn set(&mut self, session: Option<Session>) {
        self.0.set(session);
    }
}

#[must_use]
pub fn use_session() -> SessionState {
    use_context::<SessionState>()
}
