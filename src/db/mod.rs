//! Persistence layer: store interfaces and their backends.
//!
//! The auth core only talks to [`CredentialStore`]; the todo routes only talk
//! to [`TodoStore`]. Both backends implement both traits.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TODOS: &str = "todos";
    /// Counter documents (integer id allocation)
    pub const COUNTERS: &str = "counters";
}

/// Persisted user records and the per-user revocation field.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user.
    ///
    /// Fails with `DuplicateIdentity` if the email (or external id) is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Overwrite the revocation token of the user with this email.
    ///
    /// Returns the number of rows whose stored value changed.
    async fn update_revocation_token(&self, email: &str, token: &str) -> Result<u64, AppError>;

    /// Same as [`CredentialStore::update_revocation_token`], keyed by external id.
    async fn update_revocation_token_by_external_id(
        &self,
        external_id: &str,
        token: &str,
    ) -> Result<u64, AppError>;
}

/// Todo items.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All items, ordered by id.
    async fn list(&self) -> Result<Vec<Todo>, AppError>;

    async fn get(&self, id: u64) -> Result<Option<Todo>, AppError>;

    async fn create(&self, new_todo: NewTodo) -> Result<Todo, AppError>;

    /// Apply a patch; `None` if no item has this id.
    async fn update(&self, id: u64, patch: TodoPatch) -> Result<Option<Todo>, AppError>;

    /// Returns `false` if no item has this id.
    async fn delete(&self, id: u64) -> Result<bool, AppError>;
}

/// Run a store call under a deadline; expiry surfaces as a store error.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Store(format!(
            "store call timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_passes_through_result() {
        let value = bounded(Duration::from_secs(1), async { Ok::<_, AppError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn bounded_times_out_slow_calls() {
        let result = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AppError>(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
