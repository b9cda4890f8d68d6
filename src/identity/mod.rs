use thiserror::Error;
use tracing::{info, warn};

use crate::database::models::{NewUser, User};
use crate::database::{StoreError, UserStore};
use crate::provider::ProviderProfile;

/// How a sign-in resolved to a principal. Tagged so callers (and tests)
/// can tell which lookup path was taken.
#[derive(Debug)]
pub enum SignInOutcome {
    /// No match by identity or email; a fresh User was persisted.
    Created(User),
    /// Matched an existing User by email; the provider credential was
    /// attached to it instead of creating a duplicate.
    Linked(User),
    /// Matched by (provider, subject); nothing was written.
    Found(User),
}

impl SignInOutcome {
    pub fn user(&self) -> &User {
        match self {
            SignInOutcome::Created(user)
            | SignInOutcome::Linked(user)
            | SignInOutcome::Found(user) => user,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            SignInOutcome::Created(user)
            | SignInOutcome::Linked(user)
            | SignInOutcome::Found(user) => user,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignInOutcome::Created(_) => "created",
            SignInOutcome::Linked(_) => "linked",
            SignInOutcome::Found(_) => "found",
        }
    }
}

#[derive(Debug, Error)]
pub enum SignInError {
    /// The provider profile is unusable; sign-in is blocked before any
    /// store access.
    #[error("provider profile missing required field: {0}")]
    MissingField(&'static str),

    /// Any store fault blocks sign-in (fails closed).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Translate a verified provider profile into a persisted User,
/// idempotently. Lookup order: (provider, subject) first, then email for
/// account linking, then create.
pub async fn resolve_sign_in(
    users: &dyn UserStore,
    profile: &ProviderProfile,
) -> Result<SignInOutcome, SignInError> {
    if profile.subject.is_empty() {
        warn!("Sign-in blocked: provider profile has no subject id");
        return Err(SignInError::MissingField("subject"));
    }
    if profile.email.is_empty() {
        warn!("Sign-in blocked: provider profile has no email");
        return Err(SignInError::MissingField("email"));
    }

    if let Some(user) = users
        .find_by_identity(&profile.provider, &profile.subject)
        .await?
    {
        return Ok(SignInOutcome::Found(user));
    }

    if let Some(user) = users.find_by_email(&profile.email).await? {
        users
            .link_identity(user.id, &profile.provider, &profile.subject)
            .await?;
        info!(
            "Linked {} identity to existing user {}",
            profile.provider, user.id
        );
        return Ok(SignInOutcome::Linked(user));
    }

    let user = users.insert(new_user_from_profile(profile)).await?;
    info!("Created user {} on first sign-in", user.id);

    Ok(SignInOutcome::Created(user))
}

fn new_user_from_profile(profile: &ProviderProfile) -> NewUser {
    NewUser {
        email: profile.email.clone(),
        first_name: profile
            .given_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        last_name: profile
            .family_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        display_name: profile
            .full_name
            .clone()
            .unwrap_or_else(|| "Unknown User".to_string()),
        avatar: profile.picture.clone(),
        provider: profile.provider.clone(),
        subject: profile.subject.clone(),
    }
}
