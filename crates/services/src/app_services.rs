use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::auth::{AuthProvider, LocalAuthProvider, RemoteAuthConfig, RemoteAuthProvider, SessionGate};
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::generation::QuestionGenerator;
use crate::quiz::QuizService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    gate: Arc<SessionGate>,
    catalog: Arc<CatalogService>,
    quiz: Arc<QuizService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Auth is remote when `QUIZ_AUTH_URL` and `QUIZ_AUTH_ANON_KEY` are set and
    /// local otherwise. Generation settings come from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        shuffle: bool,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let auth: Arc<dyn AuthProvider> = match RemoteAuthConfig::from_env() {
            Some(config) => {
                tracing::info!(base_url = %config.base_url, "using remote auth");
                Arc::new(RemoteAuthProvider::new(clock, Some(config)))
            }
            None => {
                tracing::info!("using local auth");
                Arc::new(LocalAuthProvider::new(clock, Arc::clone(&storage.users)))
            }
        };
        Ok(Self::from_parts(
            storage,
            clock,
            auth,
            QuestionGenerator::from_env(),
            shuffle,
        ))
    }

    /// Wire services from explicit parts.
    #[must_use]
    pub fn from_parts(
        storage: Storage,
        clock: Clock,
        auth: Arc<dyn AuthProvider>,
        generator: QuestionGenerator,
        shuffle: bool,
    ) -> Self {
        let gate = Arc::new(SessionGate::new(auth));
        let catalog = Arc::new(CatalogService::new(clock, Arc::clone(&storage.subjects)));
        let quiz = Arc::new(
            QuizService::new(
                clock,
                Arc::clone(&storage.subjects),
                Arc::clone(&storage.questions),
                Arc::clone(&storage.answers),
                generator,
            )
            .with_shuffle(shuffle),
        );
        Self {
            gate,
            catalog,
            quiz,
        }
    }

    /// In-memory services with local auth, for tests and demos.
    #[must_use]
    pub fn in_memory(clock: Clock, generator: QuestionGenerator) -> Self {
        let storage = Storage::in_memory();
        let auth = Arc::new(LocalAuthProvider::new(clock, Arc::clone(&storage.users)));
        Self::from_parts(storage, clock, auth, generator, false)
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
