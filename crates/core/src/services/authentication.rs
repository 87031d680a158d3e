//! Registration and login.

use tracing::{debug, info};

use super::{ServiceError, ServiceResult, UserView};
use crate::auth::{hash_password, verify_password};
use crate::domain::{User, UserId};
use crate::repository::PodcastRepository;

/// First free user id at or after the number of stored users. Loaded data
/// need not number its users from 0.
fn next_user_id(repo: &dyn PodcastRepository) -> ServiceResult<UserId> {
    let mut id = repo.get_user_count()? as UserId;
    while repo.get_user_by_id(id)?.is_some() {
        id += 1;
    }
    Ok(id)
}

/// Register a new user under the first free id.
pub fn add_user(
    repo: &dyn PodcastRepository,
    user_name: &str,
    password: &str,
) -> ServiceResult<User> {
    if repo.get_user(user_name)?.is_some() {
        return Err(ServiceError::NameNotUnique(user_name.trim().to_lowercase()));
    }

    let password_hash = hash_password(password)?;
    let id = next_user_id(repo)?;
    let user = User::new(id, user_name, &password_hash)?;
    repo.add_user(&user)?;

    // add_user is a no-op when the id or name was taken in the meantime
    match repo.get_user_by_id(id)? {
        Some(stored) if stored.username() == user.username() => {}
        _ => return Err(ServiceError::NameNotUnique(user.username().to_string())),
    }

    info!(user_id = id, username = user.username(), "User registered");
    Ok(user)
}

pub fn get_user(repo: &dyn PodcastRepository, user_name: &str) -> ServiceResult<UserView> {
    let user = repo
        .get_user(user_name)?
        .ok_or_else(|| ServiceError::UnknownUser(user_name.to_string()))?;
    Ok(UserView {
        user_name: user.username().to_string(),
    })
}

/// Fails with [`ServiceError::Authentication`] for an unknown user as well
/// as a wrong password.
pub fn authenticate_user(
    repo: &dyn PodcastRepository,
    user_name: &str,
    password: &str,
) -> ServiceResult<()> {
    let Some(user) = repo.get_user(user_name)? else {
        debug!(username = user_name, "Login for unknown user");
        return Err(ServiceError::Authentication);
    };
    // a stored value that is not a hash never matches
    if verify_password(password, user.password()).unwrap_or(false) {
        Ok(())
    } else {
        Err(ServiceError::Authentication)
    }
}
