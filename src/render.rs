//! Terminal Rendering
//!
//! Plain-text views of the shell and its active panel, printed by the
//! interactive binary after every change.

use std::fmt::Write;

use crate::entries::{Entry, EntryList, Field};
use crate::panel::FormPanel;
use crate::shell::{AppShell, APP_SUBTITLE, APP_TITLE};

/// How entry dates are shown in the table
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Comments longer than this are cut in the table
pub const COMMENT_WIDTH: usize = 40;

/// Shown instead of the table when a category has no entries
pub const EMPTY_MESSAGE: &str = "No entries yet. Submit your first entry above!";

const DATE_COL: usize = 12;
const LINK_COL: usize = 48;

/// Whole screen: heading, tabs, then the active panel
pub fn render_shell(shell: &AppShell) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", APP_TITLE);
    let _ = writeln!(out, "{}", APP_SUBTITLE);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", render_tabs(shell));
    let _ = writeln!(out);
    out.push_str(&render_panel(shell.panel()));
    out
}

/// Tab strip; the active tab is bracketed
pub fn render_tabs(shell: &AppShell) -> String {
    shell
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, category)| {
            if *category == shell.active() {
                format!("[{}. {}]", i + 1, category.title())
            } else {
                format!(" {}. {} ", i + 1, category.title())
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Form, error banner and entry table of one panel
pub fn render_panel(panel: &FormPanel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", panel.title());

    for field in Field::all() {
        let value = panel.fields().get(*field);
        let shown = if value.is_empty() { "-" } else { value };
        let _ = writeln!(out, "  {}: {}", field.label(), shown);
        if let Some(message) = panel.field_errors().get(*field) {
            let _ = writeln!(out, "    ! {}", message);
        }
    }

    if panel.is_submitting() {
        let _ = writeln!(out, "  Submitting...");
    }
    let _ = writeln!(out);

    if let Some(error) = panel.error() {
        let _ = writeln!(out, "Error: {}", error);
        let _ = writeln!(out);
    }

    if panel.is_loading() {
        let _ = writeln!(out, "Loading entries...");
    } else {
        out.push_str(&render_table(panel.entries()));
    }
    out
}

/// Date / Referral Link / Comment table, or the empty message
pub fn render_table(entries: &EntryList) -> String {
    if entries.is_empty() {
        return format!("{}\n", EMPTY_MESSAGE);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<date$} {:<link$} {}",
        "Date",
        "Referral Link",
        "Comment",
        date = DATE_COL,
        link = LINK_COL
    );
    let _ = writeln!(out, "{}", "-".repeat(DATE_COL + LINK_COL + COMMENT_WIDTH + 2));
    for entry in entries {
        let _ = writeln!(out, "{}", render_row(entry));
    }
    out
}

fn render_row(entry: &Entry) -> String {
    format!(
        "{:<date$} {:<link$} {}",
        entry.date.format(DISPLAY_DATE_FORMAT).to_string(),
        entry.referral_link,
        comment_preview(&entry.comment, COMMENT_WIDTH),
        date = DATE_COL,
        link = LINK_COL
    )
}

/// First line of a comment, cut to `max` characters.
///
/// Ends with an ellipsis whenever anything was left out, including later
/// lines of a short multi-line comment.
pub fn comment_preview(comment: &str, max: usize) -> String {
    let mut lines = comment.lines();
    let first = lines.next().unwrap_or("");
    if lines.next().is_none() {
        return truncate(first, max);
    }

    let kept: String = first.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// Cut `text` to at most `max` characters, ending with an ellipsis when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
