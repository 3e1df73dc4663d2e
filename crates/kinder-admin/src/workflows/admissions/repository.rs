use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    ApplicationId, Guardian, GuardianId, Student, StudentApplication, StudentId,
};

/// Entity stored behind a `Repository`, keyed by its own identifier.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + std::fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;
}

impl Record for StudentApplication {
    type Id = ApplicationId;

    fn id(&self) -> &ApplicationId {
        &self.id
    }
}

impl Record for Student {
    type Id = StudentId;

    fn id(&self) -> &StudentId {
        &self.id
    }
}

impl Record for Guardian {
    type Id = GuardianId;

    fn id(&self) -> &GuardianId {
        &self.id
    }
}

/// Storage abstraction so the decision engine can run against fakes or a real backend.
pub trait Repository<T: Record>: Send + Sync {
    fn get(&self, id: &T::Id) -> Result<Option<T>, RepositoryError>;
    fn list(&self) -> Result<Vec<T>, RepositoryError>;
    fn add(&self, record: T) -> Result<T, RepositoryError>;
    fn remove(&self, id: &T::Id) -> Result<Option<T>, RepositoryError>;
}

/// The three collections touched by an admission decision.
pub trait SchoolRecords: Send + Sync {
    type Applications: Repository<StudentApplication>;
    type Students: Repository<Student>;
    type Guardians: Repository<Guardian>;

    fn applications(&self) -> &Self::Applications;
    fn students(&self) -> &Self::Students;
    fn guardians(&self) -> &Self::Guardians;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store preserving insertion order.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    records: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T: Record> InMemoryRepository<T> {
    pub fn seeded(records: impl IntoIterator<Item = T>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records.into_iter().collect())),
        }
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl<T: Record> Repository<T> for InMemoryRepository<T> {
    fn get(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|record| record.id() == id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn add(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|existing| existing.id() == record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn remove(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        let mut guard = self.lock()?;
        let position = guard.iter().position(|record| record.id() == id);
        Ok(position.map(|index| guard.remove(index)))
    }
}

/// In-memory bundle used by the HTTP service and the tests.
#[derive(Debug, Default, Clone)]
pub struct InMemorySchoolRecords {
    pub applications: InMemoryRepository<StudentApplication>,
    pub students: InMemoryRepository<Student>,
    pub guardians: InMemoryRepository<Guardian>,
}

impl SchoolRecords for InMemorySchoolRecords {
    type Applications = InMemoryRepository<StudentApplication>;
    type Students = InMemoryRepository<Student>;
    type Guardians = InMemoryRepository<Guardian>;

    fn applications(&self) -> &Self::Applications {
        &self.applications
    }

    fn students(&self) -> &Self::Students {
        &self.students
    }

    fn guardians(&self) -> &Self::Guardians {
        &self.guardians
    }
}
