use std::sync::Arc;

use quiz_core::model::{Session, Subject, SubjectId, SubjectName};
use storage::repository::SubjectRepository;

use crate::Clock;
use crate::error::CatalogError;

/// Lists and creates the signed-in user's subjects.
#[derive(Clone)]
pub struct CatalogService {
    clock: Clock,
    subjects: Arc<dyn SubjectRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(clock: Clock, subjects: Arc<dyn SubjectRepository>) -> Self {
        Self { clock, subjects }
    }

    /// Subjects owned by the session's user, sorted by name.
    ///
    /// Storage failures are logged and yield an empty list.
    pub async fn list_subjects(&self, session: &Session) -> Vec<Subject> {
        match self.subjects.list_subjects(session.user_id()).await {
            Ok(subjects) => subjects,
            Err(err) => {
                tracing::error!(error = %err, user_id = %session.user_id(), "failed to list subjects");
                Vec::new()
            }
        }
    }

    /// Create a subject. Names are trimmed; duplicates are allowed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidName` for blank or overlong names.
    /// Returns `CatalogError::Storage` if persistence fails.
    pub async fn create_subject(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Subject, CatalogError> {
        let name = SubjectName::new(name)?;
        let subject = self
            .subjects
            .insert_subject(session.user_id(), &name, self.clock.now())
            .await
            .inspect_err(|err| tracing::error!(error = %err, "failed to create subject"))?;
        tracing::debug!(subject_id = %subject.id(), "created subject");
        Ok(subject)
    }

    /// Fetch one of the session user's subjects.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn get_subject(
        &self,
        session: &Session,
        id: SubjectId,
    ) -> Result<Option<Subject>, CatalogError> {
        Ok(self.subjects.get_subject(session.user_id(), id).await?)
    }
}
