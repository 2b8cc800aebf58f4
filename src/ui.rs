//! Selector screen rendering
//!
//! Layout, top to bottom: key hint line, menu title, blank line, one row per
//! catalog entry. A row reads `{cursor}{checkbox} {label}` where the cursor
//! is `>` on the active row and the checkbox is `[*]` or `[ ]`.

use crate::catalog::{Catalog, InstalledStatus, INSTALLED_MARKER};
use crate::selector::SelectionState;
use crate::theme::Styles;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

/// Everything one frame of the selector needs
pub struct SelectorView<'a> {
    pub catalog: &'a Catalog,
    pub installed: &'a InstalledStatus,
    pub state: &'a SelectionState,
    pub hint: String,
}

/// Plain text of one row, without styling
pub fn row_text(view: &SelectorView<'_>, index: usize) -> Option<String> {
    let entry = view.catalog.get(index)?;
    let cursor = if index == view.state.cursor() { ">" } else { " " };
    let mark = if view.state.is_selected(index) { "[*]" } else { "[ ]" };
    let label = view
        .catalog
        .format_label(entry, view.installed.is_installed(index));
    Some(format!("{}{} {}", cursor, mark, label))
}

fn row_item<'a>(view: &SelectorView<'_>, index: usize) -> Option<ListItem<'a>> {
    let entry = view.catalog.get(index)?;
    let selected = view.state.is_selected(index);
    let cursor = if index == view.state.cursor() { ">" } else { " " };

    let (mark, mark_style) = if selected {
        ("[*]", Styles::checked())
    } else {
        ("[ ]", Styles::text())
    };

    let label = view
        .catalog
        .format_label(entry, view.installed.is_installed(index));
    let label_style = if entry.is_control() {
        Styles::text_muted()
    } else {
        Styles::text()
    };

    let mut spans = vec![
        Span::styled(cursor.to_string(), Styles::text()),
        Span::styled(mark.to_string(), mark_style),
        Span::raw(" "),
    ];
    match label.strip_suffix(INSTALLED_MARKER) {
        Some(padded) => {
            spans.push(Span::styled(padded.to_string(), label_style));
            spans.push(Span::styled(INSTALLED_MARKER.to_string(), Styles::installed()));
        }
        None => spans.push(Span::styled(label, label_style)),
    }

    Some(ListItem::new(Line::from(spans)))
}

/// Render the full selector screen
pub fn render_selector(f: &mut Frame, view: &SelectorView<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Hint
            Constraint::Length(1), // Title
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Rows
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(view.hint.as_str()).style(Styles::nav_hint()),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(view.catalog.title()).style(Styles::title()),
        chunks[1],
    );

    let items: Vec<ListItem> = (0..view.catalog.len())
        .filter_map(|index| row_item(view, index))
        .collect();

    // Selecting the cursor row keeps it scrolled into view on short terminals
    let mut list_state = ListState::default().with_selected(Some(view.state.cursor()));
    let list = List::new(items).highlight_style(Styles::cursor_row());
    f.render_stateful_widget(list, chunks[3], &mut list_state);
}
