use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewTodo, Todo, TodoPatch};
use crate::database::StoreError;

/// Task store seam. Every operation that names a record also names its
/// owner; the owner id is part of the lookup filter, never a post-hoc
/// check, so a non-owner can never observe another user's record.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All tasks owned by `owner`, newest-created first.
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Todo>, StoreError>;

    async fn find_one_by_id_and_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Todo>, StoreError>;

    async fn insert(&self, owner: Uuid, new: NewTodo) -> Result<Todo, StoreError>;

    /// Merge `patch` into the task, returning the updated row, or `None`
    /// when no task matches (absent or owned by someone else).
    async fn update_by_id_and_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError>;

    /// Returns `false` when no task matched (absent or owned by someone else).
    async fn delete_by_id_and_owner(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError>;

    /// Liveness probe for the health endpoint.
    async fn health(&self) -> Result<(), StoreError>;
}

pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT * FROM todos WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn find_one_by_id_and_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Todo>, StoreError> {
        let todo =
            sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;

        Ok(todo)
    }

    async fn insert(&self, owner: Uuid, new: NewTodo) -> Result<Todo, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (owner_id, title, description, completed)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.completed)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn update_by_id_and_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        // Single-statement merge; per-row atomicity is the only concurrency
        // control here (last write wins).
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                completed = COALESCE($5, completed),
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.completed)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn delete_by_id_and_owner(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
