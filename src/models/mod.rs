// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod todo;
pub mod user;

pub use todo::{NewTodo, Todo, TodoPatch};
pub use user::{NewUser, Role, User};
