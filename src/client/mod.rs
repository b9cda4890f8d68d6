//! Client-side mirror of the task API. Mutations update a cached list
//! speculatively before the server answers and roll back when it refuses.

pub mod cache;
pub mod http;
pub mod mutation;

use thiserror::Error;

pub use cache::{apply, reconcile_inserted, CachedTodo, Change, TEMP_ID_PREFIX};
pub use http::HttpTodoApi;
pub use mutation::{MutationPipeline, Notice, TodoApi};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Decode(String),
}
