//! Markdown reporter
//!
//! History renders as one `## Commit` section per revision; scan results as
//! a nested bullet list per TODO.

use super::text::format_modified;
use super::{DATE_FORMAT, NO_HISTORY_MESSAGE, NO_TODOS_MESSAGE};
use crate::models::{ReconciliationEvent, ScannedTodo, TodoStatus};

pub fn render_history(events: &[ReconciliationEvent]) -> String {
    if events.is_empty() {
        return format!("_{NO_HISTORY_MESSAGE}_\n");
    }

    let mut out = String::new();
    for event in events {
        let rev = &event.revision;
        out.push_str(&format!("## Commit {}\n", rev.short_id()));
        out.push_str(&format!("**Author:** {} ({})\n", rev.author, rev.email));
        out.push_str(&format!("**Date:** {}\n", rev.timestamp.format(DATE_FORMAT)));
        out.push_str(&format!("**Subject:** {}\n", rev.message));
        out.push_str("\n**Changes:**\n");
        for item in &event.todos {
            let status = match item.status {
                TodoStatus::Added => "✅ Added",
                TodoStatus::Removed => "❌ Removed",
            };
            out.push_str(&format!("- {}: {}\n", status, item.todo));
        }
        out.push('\n');
    }
    out
}

pub fn render_scan(todos: &[ScannedTodo]) -> String {
    if todos.is_empty() {
        return format!("_{NO_TODOS_MESSAGE}_\n");
    }

    let mut out = String::from("# TODOs\n\n");
    for todo in todos {
        out.push_str(&format!("- **File:** {}\n", todo.file));
        out.push_str(&format!("  - Path: {}\n", todo.path.display()));
        out.push_str(&format!("  - Line: {}\n", todo.line));
        out.push_str(&format!("  - TODO: {}\n", todo.todo));
        out.push_str(&format!("  - Context: {}\n", todo.context));
        out.push_str(&format!("  - Scope: {}\n", todo.scope));
        out.push_str(&format!("  - Modified: {}\n\n", format_modified(todo)));
    }
    out
}
