// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (document id = URL-encoded email)
//! - Todos (document id = integer id, allocated from a counter document)

use crate::db::{collections, CredentialStore, TodoStore};
use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User};
use async_trait::async_trait;
use firestore::errors::{BackoffError, FirestoreError};
use serde::{Deserialize, Serialize};

/// Counter document holding the last allocated todo id.
const TODO_COUNTER_ID: &str = "todos";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Counter {
    value: u64,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to connect to Firestore Emulator: {}", e)))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client; every operation fails with a store error.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Store("Database not connected (offline mode)".to_string()))
    }

    fn user_doc_id(email: &str) -> String {
        urlencoding::encode(email).into_owned()
    }

    async fn put_todo(&self, todo: &Todo) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TODOS)
            .document_id(todo.id.to_string())
            .object(todo)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }

    /// Store `token` on the user unless it is already the stored value.
    ///
    /// Only the `revocation_token` field is written, and only while the
    /// document still exists.
    async fn replace_token(&self, user: Option<User>, token: &str) -> Result<u64, AppError> {
        let Some(mut user) = user else {
            return Ok(0);
        };
        if user.revocation_token == token {
            return Ok(0);
        }
        user.revocation_token = token.to_string();

        let result: Result<User, _> = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(User::{revocation_token}))
            .in_col(collections::USERS)
            .precondition(firestore::FirestoreWritePrecondition::Exists(true))
            .document_id(Self::user_doc_id(&user.email))
            .object(&user)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(1),
            Err(FirestoreError::DataNotFoundError(_)) => Ok(0),
            Err(e) => Err(AppError::Store(e.to_string())),
        }
    }
}

#[async_trait]
impl CredentialStore for FirestoreDb {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&Self::user_doc_id(email))
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("external_provider_id").eq(external_id)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        // TODO: reserve external ids in their own collection so this check
        // joins the insert below instead of preceding it.
        if let Some(external_id) = &new_user.external_provider_id {
            if self.find_by_external_id(external_id).await?.is_some() {
                return Err(AppError::DuplicateIdentity);
            }
        }

        let user = new_user.into_user(uuid::Uuid::new_v4().to_string());
        let result: Result<User, _> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(Self::user_doc_id(&user.email))
            .object(&user)
            .execute()
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(user_id = %user.id, "Created user document");
                Ok(user)
            }
            Err(FirestoreError::DataConflictError(_)) => {
                Err(AppError::DuplicateIdentity)
            }
            Err(e) => Err(AppError::Store(e.to_string())),
        }
    }

    async fn update_revocation_token(&self, email: &str, token: &str) -> Result<u64, AppError> {
        let user = self.find_by_email(email).await?;
        self.replace_token(user, token).await
    }

    async fn update_revocation_token_by_external_id(
        &self,
        external_id: &str,
        token: &str,
    ) -> Result<u64, AppError> {
        let user = self.find_by_external_id(external_id).await?;
        self.replace_token(user, token).await
    }
}

#[async_trait]
impl TodoStore for FirestoreDb {
    async fn list(&self) -> Result<Vec<Todo>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TODOS)
            .order_by([("id", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn get(&self, id: u64) -> Result<Option<Todo>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TODOS)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    /// Allocate the next id and write the item in one transaction.
    ///
    /// The counter is read inside the transaction, so a concurrent create
    /// aborts this commit and the whole allocation is retried.
    async fn create(&self, new_todo: NewTodo) -> Result<Todo, AppError> {
        let client = self.get_client()?;

        let todo = client
            .run_transaction(|db, transaction| {
                let new_todo = new_todo.clone();
                Box::pin(async move {
                    let counter: Option<Counter> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::COUNTERS)
                        .obj()
                        .one(TODO_COUNTER_ID)
                        .await?;

                    let next = Counter {
                        value: counter.unwrap_or_default().value + 1,
                    };
                    let todo = Todo {
                        id: next.value,
                        title: new_todo.title,
                        desc: new_todo.desc,
                        done: false,
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::COUNTERS)
                        .document_id(TODO_COUNTER_ID)
                        .object(&next)
                        .add_to_transaction(transaction)?;

                    db.fluent()
                        .update()
                        .in_col(collections::TODOS)
                        .precondition(firestore::FirestoreWritePrecondition::Exists(false))
                        .document_id(todo.id.to_string())
                        .object(&todo)
                        .add_to_transaction(transaction)?;

                    Ok::<Todo, BackoffError<FirestoreError>>(todo)
                })
            })
            .await
            .map_err(|e| AppError::Store(format!("Todo create transaction failed: {}", e)))?;

        tracing::debug!(todo_id = todo.id, "Created todo document");
        Ok(todo)
    }

    async fn update(&self, id: u64, patch: TodoPatch) -> Result<Option<Todo>, AppError> {
        let Some(mut todo) = TodoStore::get(self, id).await? else {
            return Ok(None);
        };
        todo.apply(patch);
        self.put_todo(&todo).await?;
        Ok(Some(todo))
    }

    async fn delete(&self, id: u64) -> Result<bool, AppError> {
        if TodoStore::get(self, id).await?.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TODOS)
            .document_id(id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(true)
    }
}
