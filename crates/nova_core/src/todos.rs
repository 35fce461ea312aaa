use crate::clock::{Clock, IdSource, format_timestamp};
use crate::error::AppError;
use crate::model::{Category, CompletedTaskRecord, Tab, Todo};
use crate::stats::{Stats, compute_stats};
use crate::storage::{KeyValueStore, Storage, keys};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Ordered todo list plus the ledger of completions derived from it.
///
/// Every mutation writes the touched lists back through the given storage.
/// A ledger record exists exactly for the todos that exist and are completed.
#[derive(Debug, Default, Clone)]
pub struct TodoStore {
    todos: Vec<Todo>,
    completed: Vec<CompletedTaskRecord>,
    ids: IdSource,
}

impl TodoStore {
    pub fn load<S: KeyValueStore, C: Clock + ?Sized>(
        storage: &mut Storage<S>,
        clock: &C,
    ) -> Result<Self, AppError> {
        let todos = load_todos(storage, clock)?;
        let completed = storage.load(keys::COMPLETED, Vec::new());
        let ids = IdSource::seeded(todos.iter().map(|todo| todo.id));

        Ok(Self {
            todos,
            completed,
            ids,
        })
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn completed(&self) -> &[CompletedTaskRecord] {
        &self.completed
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Appends a todo. Blank text is ignored and yields `None`.
    pub fn add<S: KeyValueStore, C: Clock + ?Sized>(
        &mut self,
        storage: &mut Storage<S>,
        clock: &C,
        text: &str,
        deadline: Option<&str>,
        category: Category,
    ) -> Result<Option<Todo>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let now = clock.now();
        let todo = Todo {
            id: self.ids.next_id(now),
            text: trimmed.to_string(),
            deadline: deadline
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            category,
            completed: false,
            created_at: format_timestamp(now)?,
        };

        self.todos.push(todo.clone());
        storage.save(keys::TODOS, &self.todos);

        Ok(Some(todo))
    }

    /// Flips completion and keeps the ledger in step. Returns the new
    /// completion state, or `None` for an unknown id.
    pub fn toggle<S: KeyValueStore, C: Clock + ?Sized>(
        &mut self,
        storage: &mut Storage<S>,
        clock: &C,
        id: i64,
    ) -> Result<Option<bool>, AppError> {
        let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == id) else {
            return Ok(None);
        };

        let completed_at = if todo.completed {
            None
        } else {
            Some(clock.timestamp()?)
        };

        todo.completed = !todo.completed;
        let text = todo.text.clone();
        let completed = todo.completed;

        self.completed.retain(|record| record.id != id);
        if let Some(completed_at) = completed_at {
            self.completed.push(CompletedTaskRecord {
                id,
                text,
                completed_at,
            });
        }

        storage.save(keys::COMPLETED, &self.completed);
        storage.save(keys::TODOS, &self.todos);

        Ok(Some(completed))
    }

    /// Removes a todo together with its ledger record.
    pub fn delete<S: KeyValueStore>(&mut self, storage: &mut Storage<S>, id: i64) -> Option<Todo> {
        let index = self.todos.iter().position(|todo| todo.id == id)?;
        let removed = self.todos.remove(index);
        self.completed.retain(|record| record.id != id);

        storage.save(keys::TODOS, &self.todos);
        storage.save(keys::COMPLETED, &self.completed);

        Some(removed)
    }

    pub fn filter(&self, tab: &Tab) -> Vec<&Todo> {
        self.todos.iter().filter(|todo| tab.includes(todo)).collect()
    }

    pub fn stats(&self, now: OffsetDateTime) -> Stats {
        compute_stats(&self.completed, now)
    }
}

/// Reads the current todo list, falling back to migrating the legacy list.
/// The legacy key is only ever read. Records are parsed one by one; a record
/// that does not parse is skipped, the rest survive.
fn load_todos<S: KeyValueStore, C: Clock + ?Sized>(
    storage: &mut Storage<S>,
    clock: &C,
) -> Result<Vec<Todo>, AppError> {
    if let Some(records) = storage.try_load::<Vec<Value>>(keys::TODOS) {
        return Ok(parse_records(records, keys::TODOS));
    }

    let Some(legacy) = storage.try_load::<Vec<Value>>(keys::LEGACY_TODOS) else {
        return Ok(Vec::new());
    };

    let created_at = clock.timestamp()?;
    let upgraded: Vec<Value> = legacy
        .into_iter()
        .map(|record| match record {
            Value::Object(mut fields) => {
                fields.insert("completed".to_string(), Value::Bool(false));
                fields.insert("createdAt".to_string(), Value::String(created_at.clone()));
                Value::Object(fields)
            }
            other => other,
        })
        .collect();

    let offered = upgraded.len();
    let todos = parse_records(upgraded, keys::LEGACY_TODOS);
    if todos.is_empty() && offered > 0 {
        return Ok(todos);
    }

    info!(count = todos.len(), "migrated legacy todo list");
    storage.save(keys::TODOS, &todos);
    Ok(todos)
}

fn parse_records(records: Vec<Value>, key: &str) -> Vec<Todo> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Todo>(record) {
            Ok(todo) => Some(todo),
            Err(err) => {
                warn!(key, index, error = %err, "skipping malformed todo");
                None
            }
        })
        .collect()
}
