use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /api/auth/whoami - Current authenticated user details
pub async fn whoami(Extension(user): Extension<CurrentUser>) -> ApiResult<CurrentUser> {
    Ok(ApiResponse::success(user))
}
