use std::sync::Arc;

use crate::database::{TodoStore, UserStore};
use crate::provider::IdentityProvider;

/// Shared application state: the store and provider seams, injected at
/// startup so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub provider: Arc<dyn IdentityProvider>,
}
