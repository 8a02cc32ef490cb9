//! User directory domain module.
//!
//! Supplies actor identity for ledger movements. Use cases receive the
//! actor explicitly as a parameter; nothing in this core resolves identity
//! from ambient request state.

use std::sync::Arc;

use almoner_core::{DomainResult, UserId};

pub mod user;

pub use user::User;

/// Directory lookup boundary.
pub trait UserDirectory {
    /// Resolve a user by id, or fail with a not-found error.
    fn lookup(&self, id: UserId) -> DomainResult<User>;

    /// Resolve a user by email, or fail with a not-found error.
    fn lookup_by_email(&self, email: &str) -> DomainResult<User>;
}

impl<D: UserDirectory + ?Sized> UserDirectory for Arc<D> {
    fn lookup(&self, id: UserId) -> DomainResult<User> {
        (**self).lookup(id)
    }

    fn lookup_by_email(&self, email: &str) -> DomainResult<User> {
        (**self).lookup_by_email(email)
    }
}
