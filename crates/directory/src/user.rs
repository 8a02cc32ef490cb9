use serde::{Deserialize, Serialize};

use almoner_core::{DomainError, DomainResult, Entity, UserId};

/// Actor identity attached to every ledger movement.
///
/// This is a read-only snapshot of a directory entry. Account lifecycle
/// (registration, passwords, tokens) is outside this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
}

impl User {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("user name cannot be empty"));
        }
        if !email.contains('@') {
            return Err(DomainError::validation("user email must contain '@'"));
        }
        Ok(Self { id, name, email })
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
