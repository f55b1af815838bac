// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo item model.

use serde::{Deserialize, Serialize};

/// A todo item, identified by a store-assigned integer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub done: bool,
}

/// Fields for a new todo.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub desc: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub done: Option<bool>,
}

impl Todo {
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(desc) = patch.desc {
            self.desc = Some(desc);
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
    }
}
