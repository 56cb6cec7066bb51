use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{Todo, TodoId};

use super::{StoreError, TodoRepository};

/// Non-persistent store, gone with the process.
#[derive(Debug, Default)]
pub struct MemoryTodoRepository {
    next_id: AtomicU64,
    todos: RwLock<BTreeMap<TodoId, Todo>>,
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.todos.read().await.values().cloned().collect())
    }

    async fn find(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.read().await.get(&id).cloned())
    }

    async fn create(&self, task: String) -> Result<Todo, StoreError> {
        let id = TodoId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let todo = Todo::new(id, task);
        self.todos.write().await.insert(id, todo.clone());
        Ok(todo)
    }

    async fn set_completed(
        &self,
        id: TodoId,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        Ok(todos.get_mut(&id).map(|todo| {
            todo.completed = completed;
            todo.clone()
        }))
    }

    async fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.write().await.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let repo = MemoryTodoRepository::default();
        let first = repo.create("one".to_string()).await.unwrap();
        let second = repo.create("two".to_string()).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(repo.find(first.id).await.unwrap(), Some(first.clone()));

        let done = repo.set_completed(second.id, true).await.unwrap().unwrap();
        assert!(done.completed);
        assert_eq!(repo.list().await.unwrap(), vec![first.clone(), done]);

        assert!(repo.delete(first.id).await.unwrap().is_some());
        assert!(repo.delete(first.id).await.unwrap().is_none());
        assert!(repo.set_completed(first.id, false).await.unwrap().is_none());
        assert!(repo.find(first.id).await.unwrap().is_none());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
