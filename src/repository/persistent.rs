use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::{
    db::driver::{Collection, Db},
    models::{Todo, TodoId},
};

use super::{StoreError, TodoRepository};

const COLLECTION: &str = "todos";

/// Todos stored as documents in the `todos` tree, keyed by id.
#[derive(Debug)]
pub struct SledTodoRepository {
    db: Db,
    todos: Collection,
}
impl SledTodoRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = Db::open(path).with_context(|| format!("failed to open store at {}", path.display()))?;
        Self::with_db(db)
    }
    pub fn temporary() -> Result<Self> {
        Self::with_db(Db::temporary()?)
    }

    fn with_db(db: Db) -> Result<Self> {
        let todos = db.collection(COLLECTION)?;
        Ok(Self { db, todos })
    }
}

#[async_trait]
impl TodoRepository for SledTodoRepository {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let todos = self
            .todos
            .iter::<Todo>()
            .collect::<Result<Vec<_>>>()
            .context("read todos")?;
        Ok(todos)
    }

    async fn find(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let todo = self.todos.get(id.to_key()).context("read todo")?;
        Ok(todo)
    }

    async fn create(&self, task: String) -> Result<Todo, StoreError> {
        let id = TodoId::new(self.db.next_id()?);
        let todo = Todo::new(id, task);
        self.todos
            .insert(id.to_key(), &todo)
            .context("insert todo")?;
        Ok(todo)
    }

    async fn set_completed(
        &self,
        id: TodoId,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError> {
        let updated = self.todos.update(id.to_key(), |mut todo: Todo| {
            todo.completed = completed;
            todo
        })?;
        Ok(updated)
    }

    async fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let removed = self.todos.remove(id.to_key())?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() -> Result<()> {
        let repo = SledTodoRepository::temporary()?;
        let first = repo.create("first".to_string()).await?;
        let second = repo.create("second".to_string()).await?;
        assert!(second.id > first.id);
        assert!(!first.completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() -> Result<()> {
        let repo = SledTodoRepository::temporary()?;
        // enough todos for the decimal ids to stop sorting like numbers
        let mut created = Vec::new();
        for n in 0..12 {
            created.push(repo.create(format!("task {}", n)).await?);
        }
        assert_eq!(repo.list().await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_completed_keeps_task() -> Result<()> {
        let repo = SledTodoRepository::temporary()?;
        let todo = repo.create("buy milk".to_string()).await?;
        let updated = repo.set_completed(todo.id, true).await?.unwrap();
        assert!(updated.completed);
        assert_eq!(updated.task, "buy milk");
        assert_eq!(repo.list().await?, vec![updated]);
        Ok(())
    }

    #[tokio::test]
    async fn test_find() -> Result<()> {
        let repo = SledTodoRepository::temporary()?;
        let todo = repo.create("look me up".to_string()).await?;
        assert_eq!(repo.find(todo.id).await?, Some(todo.clone()));
        repo.delete(todo.id).await?;
        assert!(repo.find(todo.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_id() -> Result<()> {
        let repo = SledTodoRepository::temporary()?;
        assert!(repo.set_completed(TodoId::new(99), true).await?.is_none());
        assert!(repo.delete(TodoId::new(99)).await?.is_none());
        assert!(repo.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_once() -> Result<()> {
        let repo = SledTodoRepository::temporary()?;
        let todo = repo.create("gone".to_string()).await?;
        assert_eq!(repo.delete(todo.id).await?, Some(todo.clone()));
        assert!(repo.delete(todo.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_ids_survive_reopen() -> Result<()> {
        let path = std::env::temp_dir().join(format!(
            "todo_repo_{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_nanos()
        ));
        let first = {
            let repo = SledTodoRepository::open(&path)?;
            repo.create("before restart".to_string()).await?
        };
        let repo = SledTodoRepository::open(&path)?;
        let second = repo.create("after restart".to_string()).await?;
        assert!(second.id > first.id);
        assert_eq!(repo.list().await?, vec![first, second]);
        drop(repo);
        std::fs::remove_dir_all(path)?;
        Ok(())
    }
}
