use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use thiserror::Error;

use crate::models::{AuthState, ProfileUpdate, User};
use crate::storage::{Storage, StorageError, keys};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Email already registered")]
    EmailAlreadyRegistered,
    #[error("Not logged in, run `moodsync login` first")]
    NotAuthenticated,
    #[error("Password hashing failed: {0}")]
    HashError(String),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

/// Local account registry and session state.
///
/// Users live under `users`, the session under `auth`, and each account's
/// password hash under `password_{email}`.
pub struct Auth<'a> {
    storage: &'a Storage,
    state: AuthState,
}

impl<'a> Auth<'a> {
    /// Load the persisted session; a missing or malformed one means logged out
    pub fn load(storage: &'a Storage) -> Result<Self, AuthError> {
        let state = match storage.get_json::<AuthState>(keys::AUTH) {
            Ok(state) => state.unwrap_or_default(),
            Err(StorageError::MalformedValue { source, .. }) => {
                log::warn!("discarding malformed session ({})", source);
                AuthState::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Auth { storage, state })
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        if self.state.is_authenticated { self.state.user.as_ref() } else { None }
    }

    /// The logged-in user, or `NotAuthenticated`
    pub fn require_user(&self) -> Result<&User, AuthError> {
        self.current_user().ok_or(AuthError::NotAuthenticated)
    }

    /// Create an account and log into it.
    ///
    /// Fails without touching stored users when `email` is already taken.
    pub fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        let mut users = self.users()?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let hash = hash_password(password)?;
        let user = User::new(email.to_string(), name.to_string());
        users.push(user.clone());

        self.storage.set_json(keys::USERS, &users)?;
        self.storage.set_item(&keys::password(email), &hash)?;
        log::info!("registered {}", email);

        self.set_state(AuthState { user: Some(user.clone()), is_authenticated: true })?;
        Ok(user)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users()?
            .into_iter()
            .find(|u| u.email == email)
            .ok_or(AuthError::UserNotFound)?;

        let stored = self
            .storage
            .get_item(&keys::password(email))?
            .ok_or(AuthError::InvalidPassword)?;
        verify_password(password, &stored)?;

        self.set_state(AuthState { user: Some(user.clone()), is_authenticated: true })?;
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.set_state(AuthState::default())
    }

    /// Merge `update` into the logged-in user's record and session.
    /// A no-op while logged out.
    pub fn update_profile(&mut self, update: &ProfileUpdate) -> Result<(), AuthError> {
        let Some(mut current) = self.current_user().cloned() else {
            return Ok(());
        };
        let old_email = current.email.clone();

        if let Some(ref email) = update.email {
            if *email != old_email && self.users()?.iter().any(|u| u.email == *email) {
                return Err(AuthError::EmailAlreadyRegistered);
            }
        }

        update.apply_to(&mut current);

        let mut users = self.users()?;
        for u in users.iter_mut().filter(|u| u.id == current.id) {
            *u = current.clone();
        }
        self.storage.set_json(keys::USERS, &users)?;

        // The password marker is keyed by email, so it moves with it
        if current.email != old_email {
            if let Some(hash) = self.storage.get_item(&keys::password(&old_email))? {
                self.storage.set_item(&keys::password(&current.email), &hash)?;
                self.storage.remove_item(&keys::password(&old_email))?;
            }
        }

        self.set_state(AuthState { user: Some(current), is_authenticated: true })
    }

    /// Registered users; a malformed list reads as empty and is replaced by
    /// the next registration
    pub fn users(&self) -> Result<Vec<User>, AuthError> {
        match self.storage.get_json::<Vec<User>>(keys::USERS) {
            Ok(users) => Ok(users.unwrap_or_default()),
            Err(StorageError::MalformedValue { source, .. }) => {
                log::warn!("discarding malformed user list ({})", source);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_state(&mut self, state: AuthState) -> Result<(), AuthError> {
        self.storage.set_json(keys::AUTH, &state)?;
        self.state = state;
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|_| AuthError::InvalidPassword)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidPassword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_logs_in_and_hashes_password() {
        let storage = Storage::in_memory().unwrap();
        let mut auth = Auth::load(&storage).unwrap();
        assert!(auth.current_user().is_none());

        let user = auth.register("sam@example.com", "hunter2", "Sam").unwrap();
        assert_eq!(auth.require_user().unwrap().id, user.id);

        let marker = storage.get_item("password_sam@example.com").unwrap().unwrap();
        assert_ne!(marker, "hunter2");
        assert!(marker.starts_with("$argon2"));

        // Session survives a reload
        let reloaded = Auth::load(&storage).unwrap();
        assert_eq!(reloaded.current_user().map(|u| u.email.as_str()), Some("sam@example.com"));
    }

    #[test]
    fn duplicate_registration_leaves_users_untouched() {
        let storage = Storage::in_memory().unwrap();
        let mut auth = Auth::load(&storage).unwrap();
        auth.register("sam@example.com", "hunter2", "Sam").unwrap();
        let before = storage.get_item(keys::USERS).unwrap();

        let err = auth.register("sam@example.com", "other", "Impostor").unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyRegistered));
        assert_eq!(storage.get_item(keys::USERS).unwrap(), before);
        assert_eq!(auth.users().unwrap().len(), 1);
    }

    #[test]
    fn login_distinguishes_unknown_user_and_bad_password() {
        let storage = Storage::in_memory().unwrap();
        let mut auth = Auth::load(&storage).unwrap();
        auth.register("sam@example.com", "hunter2", "Sam").unwrap();
        auth.logout().unwrap();
        assert!(matches!(auth.require_user(), Err(AuthError::NotAuthenticated)));

        assert!(matches!(auth.login("nobody@example.com", "x"), Err(AuthError::UserNotFound)));
        assert!(matches!(auth.login("sam@example.com", "wrong"), Err(AuthError::InvalidPassword)));
        assert!(auth.current_user().is_none());

        let user = auth.login("sam@example.com", "hunter2").unwrap();
        assert_eq!(user.name, "Sam");
    }

    #[test]
    fn profile_update_moves_password_with_email() {
        let storage = Storage::in_memory().unwrap();
        let mut auth = Auth::load(&storage).unwrap();
        auth.register("old@example.com", "pw", "Old").unwrap();

        let update = ProfileUpdate {
            name: Some("New".to_string()),
            email: Some("new@example.com".to_string()),
            profile_pic: None,
        };
        auth.update_profile(&update).unwrap();
        assert_eq!(auth.require_user().unwrap().name, "New");
        assert_eq!(auth.users().unwrap()[0].email, "new@example.com");

        auth.logout().unwrap();
        assert!(auth.login("new@example.com", "pw").is_ok());
        assert!(storage.get_item("password_old@example.com").unwrap().is_none());
    }

    #[test]
    fn profile_update_while_logged_out_is_a_no_op() {
        let storage = Storage::in_memory().unwrap();
        let mut auth = Auth::load(&storage).unwrap();
        auth.update_profile(&ProfileUpdate { name: Some("x".into()), ..Default::default() }).unwrap();
        assert!(auth.users().unwrap().is_empty());
        assert!(storage.get_item(keys::AUTH).unwrap().is_none());
    }

    #[test]
    fn malformed_user_list_does_not_block_registration() {
        let storage = Storage::in_memory().unwrap();
        storage.set_item(keys::USERS, "[{\"id\": 3").unwrap();
        let mut auth = Auth::load(&storage).unwrap();

        assert!(auth.users().unwrap().is_empty());
        assert!(matches!(auth.login("sam@example.com", "pw"), Err(AuthError::UserNotFound)));

        auth.register("sam@example.com", "pw", "Sam").unwrap();
        auth.logout().unwrap();
        assert_eq!(auth.login("sam@example.com", "pw").unwrap().name, "Sam");
        assert_eq!(auth.users().unwrap().len(), 1);
    }
}
