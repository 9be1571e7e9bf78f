// src/output.rs

//! Formatting collaborator for the printed surface.
//!
//! Process output lines are printed as `<id>: <line>` when the handle has a
//! non-empty id, wrapped at the handle's `wrap_columns`. Status lines from
//! `check()`/`stop()` go through [`print_status`]. Everything here writes to
//! the standard output channel; diagnostics belong to `tracing`, not this
//! module.

use crate::types::ProcessState;

/// Wrap `text` at `columns`, breaking on whitespace where possible.
///
/// A word longer than `columns` is hard-split. Returns at least one chunk;
/// an empty input produces a single empty chunk so blank lines survive.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    if text.chars().count() <= columns {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split(' ') {
        let word_len = word.chars().count();

        if word_len > columns {
            // Hard-split an overlong word.
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let mut piece = String::new();
            let mut piece_len = 0usize;
            for ch in word.chars() {
                if piece_len == columns {
                    chunks.push(std::mem::take(&mut piece));
                    piece_len = 0;
                }
                piece.push(ch);
                piece_len += 1;
            }
            current = piece;
            current_len = piece_len;
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed > columns {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Render one raw output line as the chunks that will be printed:
/// id prefix (when non-empty) on every chunk, wrapped at `columns`.
pub fn format_line(id: &str, line: &str, columns: usize) -> Vec<String> {
    let prefix = if id.is_empty() {
        String::new()
    } else {
        format!("{id}: ")
    };

    let body_width = columns.saturating_sub(prefix.chars().count()).max(1);
    wrap_text(line, body_width)
        .into_iter()
        .map(|chunk| format!("{prefix}{chunk}"))
        .collect()
}

/// Print a batch of drained lines under the handle's print policy.
pub fn print_lines(id: &str, lines: &[String], columns: usize) {
    for line in lines {
        for chunk in format_line(id, line, columns) {
            println!("{chunk}");
        }
    }
}

/// Print one human-readable status line for the handle's current state.
pub fn print_status(id: &str, state: ProcessState, exit_code: Option<i32>) {
    let label = if id.is_empty() { "process" } else { id };
    match state {
        ProcessState::Created => println!("{label}: not yet started"),
        ProcessState::Running => println!("{label}: still running"),
        ProcessState::Exited => match exit_code {
            Some(code) => println!("{label}: finished with exit code {code}"),
            None => println!("{label}: finished"),
        },
    }
}
