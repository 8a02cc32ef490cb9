use std::collections::HashMap;
use std::sync::RwLock;

use almoner_core::{DomainError, DomainResult, UserId};
use almoner_directory::{User, UserDirectory};

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a user.
    pub fn put(&self, user: User) -> DomainResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| DomainError::storage("directory lock poisoned"))?;
        users.insert(user.id_typed(), user);
        Ok(())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn lookup(&self, id: UserId) -> DomainResult<User> {
        let users = self
            .users
            .read()
            .map_err(|_| DomainError::storage("directory lock poisoned"))?;
        users
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    fn lookup_by_email(&self, email: &str) -> DomainResult<User> {
        let users = self
            .users
            .read()
            .map_err(|_| DomainError::storage("directory lock poisoned"))?;
        users
            .values()
            .find(|u| u.email().eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| DomainError::not_found("user", email.to_string()))
    }
}
