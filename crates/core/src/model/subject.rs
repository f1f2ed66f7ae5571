use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{SubjectId, UserId};

pub const MAX_SUBJECT_NAME_CHARS: usize = 120;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,

    #[error("subject name is longer than {max} characters")]
    NameTooLong { max: usize },
}

/// Validated subject name: trimmed, non-empty, bounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectName(String);

impl SubjectName {
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyName` when the trimmed name is empty and
    /// `SubjectError::NameTooLong` past [`MAX_SUBJECT_NAME_CHARS`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SubjectError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SubjectError::EmptyName);
        }
        if trimmed.chars().count() > MAX_SUBJECT_NAME_CHARS {
            return Err(SubjectError::NameTooLong {
                max: MAX_SUBJECT_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A user-defined topic that groups generated questions.
///
/// Subjects are created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    id: SubjectId,
    name: SubjectName,
    owner: UserId,
    created_at: DateTime<Utc>,
}

impl Subject {
    #[must_use]
    pub fn new(id: SubjectId, name: SubjectName, owner: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            owner,
            created_at,
        }
    }

    /// Rehydrate a subject from storage, re-checking the name.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if the stored name no longer validates.
    pub fn from_persisted(
        id: SubjectId,
        name: String,
        owner: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SubjectError> {
        Ok(Self::new(id, SubjectName::new(name)?, owner, created_at))
    }

    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
