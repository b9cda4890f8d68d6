pub mod auth;
pub mod identity;
pub mod response;

pub use auth::{session_auth, SessionUser};
pub use identity::{resolve_identity, CurrentUser};
pub use response::{ApiResponse, ApiResult};
