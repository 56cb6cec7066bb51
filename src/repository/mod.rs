mod memory;
mod persistent;

pub use memory::MemoryTodoRepository;
pub use persistent::SledTodoRepository;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Todo, TodoId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0:#}")]
    Backend(#[from] anyhow::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Access to the todo collection. Handlers only ever see this trait, the
/// concrete store is picked once at startup.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos in insertion order.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;
    /// `Ok(None)` when no todo has this id.
    async fn find(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;
    /// Persists a new, not yet completed todo and returns it with its id.
    async fn create(&self, task: String) -> Result<Todo, StoreError>;
    /// `Ok(None)` when no todo has this id.
    async fn set_completed(&self, id: TodoId, completed: bool)
        -> Result<Option<Todo>, StoreError>;
    /// Returns the removed todo, `Ok(None)` when no todo has this id.
    async fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;
}

/// Stand-in for a store that could not be opened at startup. Keeps the
/// service answering, every call fails with the original reason.
#[derive(Debug, Clone)]
pub struct UnavailableRepository {
    reason: String,
}
impl UnavailableRepository {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl TodoRepository for UnavailableRepository {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        self.fail()
    }
    async fn find(&self, _id: TodoId) -> Result<Option<Todo>, StoreError> {
        self.fail()
    }
    async fn create(&self, _task: String) -> Result<Todo, StoreError> {
        self.fail()
    }
    async fn set_completed(
        &self,
        _id: TodoId,
        _completed: bool,
    ) -> Result<Option<Todo>, StoreError> {
        self.fail()
    }
    async fn delete(&self, _id: TodoId) -> Result<Option<Todo>, StoreError> {
        self.fail()
    }
}
