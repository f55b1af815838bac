// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent maps.
//!
//! Used for local development and tests. Each map entry is the unit of
//! consistency, matching the single-row atomic writes of a relational store.

use crate::db::{CredentialStore, TodoStore};
use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory credential and todo store.
#[derive(Default)]
pub struct MemoryStore {
    /// Users keyed by email
    users: DashMap<String, User>,
    /// External provider id -> email
    external_ids: DashMap<String, String>,
    todos: DashMap<u64, Todo>,
    next_user_id: AtomicU64,
    next_todo_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of user records (test helper).
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn set_token(&self, email: &str, token: &str) -> u64 {
        match self.users.get_mut(email) {
            Some(mut user) if user.revocation_token != token => {
                user.revocation_token = token.to_string();
                1
            }
            _ => 0,
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(email).map(|u| u.clone()))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError> {
        let Some(email) = self.external_ids.get(external_id).map(|e| e.clone()) else {
            return Ok(None);
        };
        self.find_by_email(&email).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        if let Some(external_id) = &new_user.external_provider_id {
            if self.external_ids.contains_key(external_id) {
                return Err(AppError::DuplicateIdentity);
            }
        }

        let user = match self.users.entry(new_user.email.clone()) {
            Entry::Occupied(_) => return Err(AppError::DuplicateIdentity),
            Entry::Vacant(slot) => {
                let id = self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1;
                let user = new_user.into_user(id.to_string());
                slot.insert(user.clone());
                user
            }
        };

        if let Some(external_id) = &user.external_provider_id {
            self.external_ids
                .insert(external_id.clone(), user.email.clone());
        }

        Ok(user)
    }

    async fn update_revocation_token(&self, email: &str, token: &str) -> Result<u64, AppError> {
        Ok(self.set_token(email, token))
    }

    async fn update_revocation_token_by_external_id(
        &self,
        external_id: &str,
        token: &str,
    ) -> Result<u64, AppError> {
        let Some(email) = self.external_ids.get(external_id).map(|e| e.clone()) else {
            return Ok(0);
        };
        Ok(self.set_token(&email, token))
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>, AppError> {
        let mut todos: Vec<Todo> = self.todos.iter().map(|t| t.value().clone()).collect();
        todos.sort_by_key(|t| t.id);
        Ok(todos)
    }

    async fn get(&self, id: u64) -> Result<Option<Todo>, AppError> {
        Ok(self.todos.get(&id).map(|t| t.clone()))
    }

    async fn create(&self, new_todo: NewTodo) -> Result<Todo, AppError> {
        let id = self.next_todo_id.fetch_add(1, Ordering::SeqCst) + 1;
        let todo = Todo {
            id,
            title: new_todo.title,
            desc: new_todo.desc,
            done: false,
        };
        self.todos.insert(id, todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: u64, patch: TodoPatch) -> Result<Option<Todo>, AppError> {
        Ok(self.todos.get_mut(&id).map(|mut todo| {
            todo.apply(patch);
            todo.clone()
        }))
    }

    async fn delete(&self, id: u64) -> Result<bool, AppError> {
        Ok(self.todos.remove(&id).is_some())
    }
}
