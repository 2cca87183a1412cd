//! Presentation of menu options
//!
//! Options are stored in the order the server sent them. Sorting happens
//! only here, at display time.

use crate::backend::{Document, MenuOption};

/// Options sorted by ordinal; ties keep their received order
pub fn display_order(options: &[MenuOption]) -> Vec<&MenuOption> {
    let mut sorted: Vec<&MenuOption> = options.iter().collect();
    sorted.sort_by_key(|option| option.ordinal);
    sorted
}

pub fn option_label(option: &MenuOption) -> String {
    format!("{}. {}", option.ordinal, option.title)
}

/// Find the option a user typed, by ordinal
pub fn find_by_ordinal<'a>(options: &'a [MenuOption], input: &str) -> Option<&'a MenuOption> {
    let ordinal: i64 = input.trim().parse().ok()?;
    options.iter().find(|option| option.ordinal == ordinal)
}

#[allow(clippy::cast_precision_loss)] // display only
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

pub fn document_label(document: &Document) -> String {
    format!("{} ({}, {})", document.title, document.file_name, format_size(document.file_size))
}

/// Render options one per line in display order, with their documents
pub fn render_menu(options: &[MenuOption]) -> String {
    let mut out = String::new();
    for option in display_order(options) {
        out.push_str(&format!("  {}\n", option_label(option)));
        for document in &option.documents {
            out.push_str(&format!("     - {}\n", document_label(document)));
        }
    }
    out
}
