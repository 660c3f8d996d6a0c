//! Tab-separated reporter for scan results
//!
//! One header row, then one row per TODO. Tabs and newlines inside values
//! are replaced with spaces so every record stays on one line.

use super::text::format_modified;
use crate::models::ScannedTodo;

const HEADER: [&str; 7] = ["file", "path", "line", "todo", "context", "scope", "modified"];

pub fn render_scan(todos: &[ScannedTodo]) -> String {
    let mut out = HEADER.join("\t");
    out.push('\n');

    for todo in todos {
        let row = [
            clean(&todo.file),
            clean(&todo.path.display().to_string()),
            todo.line.to_string(),
            clean(&todo.todo),
            clean(&todo.context),
            clean(&todo.scope),
            format_modified(todo),
        ];
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

fn clean(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}
