// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo routes. Any signed-in caller may list, read, update and delete;
//! creating a todo is `ADMIN` only. The auth middleware is applied in
//! routes/mod.rs.

use crate::db::bounded;
use crate::error::{AppError, LogFailure, Result};
use crate::middleware::validate::parse_id;
use crate::middleware::{require_roles, ValidatedJson};
use crate::models::{NewTodo, Role, Todo, TodoPatch};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

const ADMIN_ROLES: &[Role] = &[Role::Admin];

pub fn routes() -> Router<Arc<AppState>> {
    let member_routes = Router::new()
        .route("/todo/get-all", get(get_all))
        .route("/todo/get/{id}", get(get_one))
        .route("/todo/update-todo/{id}", put(update_todo))
        .route("/todo/delete-todo/{id}", delete(delete_todo));

    let admin_routes = Router::new()
        .route("/todo/create-todo", post(create_todo))
        .route_layer(middleware::from_fn(require_roles(ADMIN_ROLES)));

    member_routes.merge(admin_routes)
}

// ─── Payloads ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(length(min = 3, max = 50, message = "title must be 3-50 characters"))]
    pub title: String,
    #[validate(length(max = 200, message = "description must be at most 200 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_update_not_empty"))]
pub struct UpdateTodoRequest {
    #[validate(length(min = 3, max = 50, message = "title must be 3-50 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 200, message = "description must be at most 200 characters"))]
    pub description: Option<String>,
    pub done: Option<bool>,
}

fn validate_update_not_empty(req: &UpdateTodoRequest) -> std::result::Result<(), ValidationError> {
    if req.title.is_none() && req.description.is_none() && req.done.is_none() {
        let mut err = ValidationError::new("empty_update");
        err.message = Some("at least one of title, description or done is required".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoResponse {
    pub message: String,
    pub todo: Todo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

// ─── Handlers ────────────────────────────────────────────────

/// List all todos, served from the cache when it is warm.
async fn get_all(State(state): State<Arc<AppState>>, uri: Uri) -> Result<Json<Vec<Todo>>> {
    if let Some(todos) = state.todo_cache.get_all() {
        tracing::debug!(count = todos.len(), "Serving todo list from cache");
        return Ok(Json(todos.as_ref().clone()));
    }

    let todos = bounded(state.config.store_timeout, state.todos.list())
        .await
        .log_failure("get_all", uri.path())?;

    Ok(Json(state.todo_cache.put_all(todos).as_ref().clone()))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<Json<Todo>> {
    let todo = load_todo(&state, &raw_id)
        .await
        .log_failure("get_one", uri.path())?;
    Ok(Json(todo))
}

async fn load_todo(state: &AppState, raw_id: &str) -> Result<Todo> {
    let id = parse_id(raw_id)?;
    bounded(state.config.store_timeout, state.todos.get(id))
        .await?
        .ok_or_else(|| not_found(id))
}

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("todo {} not found", id))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    ValidatedJson(body): ValidatedJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>)> {
    let new_todo = NewTodo {
        title: body.title,
        desc: body.description,
    };

    let todo = bounded(state.config.store_timeout, state.todos.create(new_todo))
        .await
        .log_failure("create_todo", uri.path())?;
    state.todo_cache.invalidate();

    tracing::info!(todo_id = todo.id, "Todo created");

    Ok((
        StatusCode::CREATED,
        Json(TodoResponse {
            message: "Todo created successfully".to_string(),
            todo,
        }),
    ))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    uri: Uri,
    ValidatedJson(body): ValidatedJson<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>> {
    let patch = TodoPatch {
        title: body.title,
        desc: body.description,
        done: body.done,
    };

    let todo = patch_todo(&state, &raw_id, patch)
        .await
        .log_failure("update_todo", uri.path())?;
    state.todo_cache.invalidate();

    Ok(Json(TodoResponse {
        message: "Todo updated successfully".to_string(),
        todo,
    }))
}

async fn patch_todo(state: &AppState, raw_id: &str, patch: TodoPatch) -> Result<Todo> {
    let id = parse_id(raw_id)?;
    bounded(state.config.store_timeout, state.todos.update(id, patch))
        .await?
        .ok_or_else(|| not_found(id))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<Json<DeleteResponse>> {
    let id = remove_todo(&state, &raw_id)
        .await
        .log_failure("delete_todo", uri.path())?;
    state.todo_cache.invalidate();

    tracing::info!(todo_id = id, "Todo deleted");

    Ok(Json(DeleteResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}

async fn remove_todo(state: &AppState, raw_id: &str) -> Result<u64> {
    let id = parse_id(raw_id)?;
    if !bounded(state.config.store_timeout, state.todos.delete(id)).await? {
        return Err(not_found(id));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_requires_a_field() {
        let empty = UpdateTodoRequest {
            title: None,
            description: None,
            done: None,
        };
        assert!(empty.validate().is_err());

        let done_only = UpdateTodoRequest {
            title: None,
            description: None,
            done: Some(true),
        };
        assert!(done_only.validate().is_ok());
    }

    #[test]
    fn test_update_title_length_checked_when_present() {
        let req = UpdateTodoRequest {
            title: Some("ab".to_string()),
            description: None,
            done: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_description_limit() {
        let req = CreateTodoRequest {
            title: "Buy milk".to_string(),
            description: Some("x".repeat(201)),
        };
        assert!(req.validate().is_err());
    }
}
