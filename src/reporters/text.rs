//! Plain text reporter

use super::{DATE_FORMAT, NO_HISTORY_MESSAGE, NO_TODOS_MESSAGE};
use crate::models::{ReconciliationEvent, ScannedTodo, TodoStatus};

/// Render history as one block per revision:
///
/// ```text
/// [01234567] 2023-11-14 22:13:20
/// Author: Ada (ada@example.com)
/// Subject: Initial commit
/// Changes:
///   + fix bug
/// ```
pub fn render_history(events: &[ReconciliationEvent]) -> String {
    if events.is_empty() {
        return format!("{NO_HISTORY_MESSAGE}\n");
    }

    let mut out = String::new();
    for event in events {
        let rev = &event.revision;
        out.push_str(&format!("[{}] {}\n", rev.short_id(), rev.timestamp.format(DATE_FORMAT)));
        out.push_str(&format!("Author: {} ({})\n", rev.author, rev.email));
        out.push_str(&format!("Subject: {}\n", rev.message));
        out.push_str("Changes:\n");
        for item in &event.todos {
            let marker = match item.status {
                TodoStatus::Added => '+',
                TodoStatus::Removed => '-',
            };
            out.push_str(&format!("  {} {}\n", marker, item.todo));
        }
        out.push('\n');
    }
    out
}

pub fn render_scan(todos: &[ScannedTodo]) -> String {
    if todos.is_empty() {
        return format!("{NO_TODOS_MESSAGE}\n");
    }

    let mut out = String::new();
    for todo in todos {
        out.push_str(&format!("File: {}\n", todo.file));
        out.push_str(&format!("Path: {}\n", todo.path.display()));
        out.push_str(&format!("Line: {}\n", todo.line));
        out.push_str(&format!("TODO: {}\n", todo.todo));
        out.push_str(&format!("Context: {}\n", todo.context));
        out.push_str(&format!("Scope: {}\n", todo.scope));
        out.push_str(&format!("Modified: {}\n", format_modified(todo)));
        out.push('\n');
    }
    out
}

pub(super) fn format_modified(todo: &ScannedTodo) -> String {
    todo.modified
        .map(|m| m.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
