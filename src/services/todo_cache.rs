//! Read-through cache for the full todo list.
//!
//! A single key (`all`) holding the whole sequence; any write invalidates it.

use crate::models::Todo;
use dashmap::DashMap;
use std::sync::Arc;

const ALL: &str = "all";

/// Cache of the complete todo list, shared through application state.
#[derive(Default, Clone)]
pub struct TodoCache {
    entries: Arc<DashMap<&'static str, Arc<Vec<Todo>>>>,
}

impl TodoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_all(&self) -> Option<Arc<Vec<Todo>>> {
        self.entries.get(ALL).map(|entry| entry.value().clone())
    }

    pub fn put_all(&self, todos: Vec<Todo>) -> Arc<Vec<Todo>> {
        let todos = Arc::new(todos);
        self.entries.insert(ALL, todos.clone());
        todos
    }

    /// Drop the cached list; called after every create, update or delete.
    pub fn invalidate(&self) {
        self.entries.remove(ALL);
    }
}
