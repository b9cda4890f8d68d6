use async_trait::async_trait;

use super::cache::{apply, reconcile_inserted, CachedTodo, Change, TEMP_ID_PREFIX};
use super::ClientError;

/// Network seam for the pipeline. The HTTP implementation lives in
/// `client::http`; tests script this trait directly.
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn list(&self) -> Result<Vec<CachedTodo>, ClientError>;

    async fn create(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<CachedTodo, ClientError>;

    async fn set_completed(&self, id: &str, completed: bool) -> Result<CachedTodo, ClientError>;

    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

/// User-visible outcome of a mutation, the CLI's equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

/// Optimistic mutation pipeline over a cached task list.
///
/// Every mutation follows the same protocol: snapshot the cache, apply the
/// speculative change synchronously, issue the network call, then either
/// reconcile with the server's answer or restore the snapshot and record a
/// failure notice. The cache therefore never shows unconfirmed state
/// outside the round-trip window, and that state is always reversible.
///
/// A superseding mutation simply overwrites pending optimistic state;
/// in-flight calls are not cancelled, so a slow stale response can still
/// reconcile against newer state. Accepted limitation for this scope.
pub struct MutationPipeline<A: TodoApi> {
    api: A,
    cache: Vec<CachedTodo>,
    notices: Vec<Notice>,
    temp_seq: u64,
}

impl<A: TodoApi> MutationPipeline<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: Vec::new(),
            notices: Vec::new(),
            temp_seq: 0,
        }
    }

    /// The current cached view of the list.
    pub fn todos(&self) -> &[CachedTodo] {
        &self.cache
    }

    /// Drain accumulated notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replace the cache with the server's authoritative list.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.cache = self.api.list().await?;
        Ok(())
    }

    /// Create a task. Returns whether the server accepted it.
    pub async fn add(&mut self, title: &str, description: Option<&str>) -> bool {
        let snapshot = self.cache.clone();
        let temp_id = self.next_temp_id();

        self.cache = apply(
            &self.cache,
            &Change::Insert {
                temp_id: temp_id.clone(),
                title: title.to_string(),
                description: description.map(str::to_string),
            },
        );

        match self.api.create(title, description).await {
            Ok(created) => {
                self.cache = reconcile_inserted(&self.cache, &temp_id, &created);
                self.notices
                    .push(Notice::Success("Todo added successfully".to_string()));
                true
            }
            Err(e) => {
                self.cache = snapshot;
                self.notices
                    .push(Notice::Failure(format!("Failed to add todo: {}", e)));
                false
            }
        }
    }

    /// Set a task's completion flag. Returns whether the server accepted it.
    pub async fn toggle(&mut self, id: &str, completed: bool) -> bool {
        let snapshot = self.cache.clone();

        self.cache = apply(
            &self.cache,
            &Change::Toggle {
                id: id.to_string(),
                completed,
            },
        );

        match self.api.set_completed(id, completed).await {
            Ok(_) => {
                self.notices
                    .push(Notice::Success("Todo updated successfully".to_string()));
                true
            }
            Err(e) => {
                self.cache = snapshot;
                self.notices
                    .push(Notice::Failure(format!("Failed to update todo: {}", e)));
                false
            }
        }
    }

    /// Delete a task. Returns whether the server accepted it.
    pub async fn remove(&mut self, id: &str) -> bool {
        let snapshot = self.cache.clone();

        self.cache = apply(
            &self.cache,
            &Change::Remove { id: id.to_string() },
        );

        match self.api.delete(id).await {
            Ok(()) => {
                self.notices
                    .push(Notice::Success("Todo deleted successfully".to_string()));
                true
            }
            Err(e) => {
                self.cache = snapshot;
                self.notices
                    .push(Notice::Failure(format!("Failed to delete todo: {}", e)));
                false
            }
        }
    }

    fn next_temp_id(&mut self) -> String {
        self.temp_seq += 1;
        format!("{}{}", TEMP_ID_PREFIX, self.temp_seq)
    }
}
