//! Plain-text rendering of [`AppViewModel`] for the terminal.

use std::fmt::Write;

use courier_core::{AppViewModel, CatalogView, UploadResult, UploadStatusView};

pub fn render_catalog(view: &AppViewModel) -> String {
    let mut out = String::new();
    match &view.catalog {
        CatalogView::NotRequested => out.push_str("Catalog not requested.\n"),
        CatalogView::Loading => out.push_str("Loading available actions...\n"),
        CatalogView::Failed { reason } => {
            let _ = writeln!(out, "Could not load available actions: {reason}");
        }
        CatalogView::Loaded { count: 0 } => out.push_str("The server offers no actions.\n"),
        CatalogView::Loaded { .. } => {
            for row in &view.operations {
                let mark = if row.selected { '*' } else { ' ' };
                let _ = writeln!(out, "{mark} {:<20} {}", row.id, row.title);
                if !row.description.is_empty() {
                    let _ = writeln!(out, "  {:<20} {}", "", row.description);
                }
            }
        }
    }
    out
}

pub fn render_status(view: &AppViewModel) -> String {
    let mut out = String::new();
    if view.files.is_empty() {
        out.push_str("Files: none\n");
    } else {
        let _ = writeln!(out, "Files ({}):", view.files.len());
        for row in &view.files {
            let _ = writeln!(out, "  {}", row.name);
        }
    }
    if view.selected_actions.is_empty() {
        out.push_str("Actions: none\n");
    } else {
        let _ = writeln!(out, "Actions: {}", view.selected_actions.join(", "));
    }
    match view.upload {
        UploadStatusView::Idle if view.can_submit => out.push_str("Ready to submit.\n"),
        UploadStatusView::Idle => out.push_str("Idle.\n"),
        UploadStatusView::InFlight {
            request_id,
            received_bytes,
        } => {
            let _ = writeln!(
                out,
                "Request {request_id} in progress, {} received.",
                format_bytes(received_bytes)
            );
        }
    }
    if let Some(result) = &view.last_result {
        let _ = writeln!(out, "Last result: {}", render_result(result));
    }
    out
}

/// One line describing what happened to the last add.
pub fn render_add_report(view: &AppViewModel) -> Option<String> {
    let report = view.last_add.as_ref()?;
    let mut line = format!("Added {} file(s).", report.added.len());
    if !report.skipped.is_empty() {
        let _ = write!(line, " Skipped duplicates: {}.", report.skipped.join(", "));
    }
    Some(line)
}

pub fn render_result(result: &UploadResult) -> String {
    match result {
        UploadResult::Delivered {
            filename,
            byte_len,
            location,
        } => format!("saved {filename} ({}) to {location}", format_bytes(*byte_len)),
        UploadResult::Failed { reason } => format!("failed: {reason}"),
        UploadResult::Cancelled => "cancelled".to_string(),
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
