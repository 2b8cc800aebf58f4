//! Property-based tests for server-setup
//!
//! Uses proptest for the selector and catalog invariants:
//! - Cursor stays in bounds, flags stay one per row
//! - Toggling is an involution and only touches the current row
//! - The label column has the same width on every row

use proptest::prelude::*;
use server_setup::catalog::{format_label, BundleEntry, Catalog, INSTALLED_MARKER};
use server_setup::selector::{SelectionState, SelectorEvent, SelectorStatus};
use unicode_width::UnicodeWidthStr;

// =============================================================================
// Selector Properties
// =============================================================================

fn event_strategy() -> impl Strategy<Value = SelectorEvent> {
    prop_oneof![
        Just(SelectorEvent::MoveUp),
        Just(SelectorEvent::MoveDown),
        Just(SelectorEvent::ToggleCurrent),
        Just(SelectorEvent::Ignored),
    ]
}

proptest! {
    /// Fresh state: cursor 0, every flag false
    #[test]
    fn initial_state_is_clear(rows in 1usize..50) {
        let state = SelectionState::new(rows);
        prop_assert_eq!(state.cursor(), 0);
        prop_assert_eq!(state.len(), rows);
        prop_assert!(state.selected().iter().all(|f| !f));
    }

    /// Any event sequence keeps the cursor in bounds and the flag count fixed
    #[test]
    fn cursor_stays_in_bounds(
        rows in 1usize..30,
        events in prop::collection::vec(event_strategy(), 0..200),
    ) {
        let mut state = SelectionState::new(rows);
        for event in events {
            prop_assert_eq!(state.apply(event), SelectorStatus::Running);
            prop_assert!(state.cursor() < rows);
            prop_assert_eq!(state.len(), rows);
        }
    }

    /// Double toggle restores the row; other rows never change
    #[test]
    fn toggle_is_local_and_involutive(
        rows in 1usize..30,
        moves in 0usize..40,
        prior in prop::collection::vec(event_strategy(), 0..60),
    ) {
        let mut state = SelectionState::new(rows);
        for event in prior {
            state.apply(event);
        }
        for _ in 0..moves {
            state.apply(SelectorEvent::MoveDown);
        }
        let before = state.selected().to_vec();
        let cursor = state.cursor();

        state.apply(SelectorEvent::ToggleCurrent);
        for (i, flag) in state.selected().iter().enumerate() {
            if i == cursor {
                prop_assert_eq!(*flag, !before[i]);
            } else {
                prop_assert_eq!(*flag, before[i]);
            }
        }

        state.apply(SelectorEvent::ToggleCurrent);
        prop_assert_eq!(state.selected(), before.as_slice());
    }

    /// Confirm returns exactly one flag per row, equal to the toggled state
    #[test]
    fn confirm_returns_accumulated_flags(
        rows in 1usize..30,
        events in prop::collection::vec(event_strategy(), 0..100),
    ) {
        let mut state = SelectionState::new(rows);
        for event in events {
            state.apply(event);
        }
        let expected = state.selected().to_vec();
        prop_assert_eq!(state.apply(SelectorEvent::Confirm), SelectorStatus::Confirmed);
        let selection = state.into_selection();
        prop_assert_eq!(selection.len(), rows);
        prop_assert_eq!(selection, expected);
    }
}

// =============================================================================
// Catalog Properties
// =============================================================================

fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    prop::collection::vec(("[A-Za-z][A-Za-z0-9 ]{0,30}", any::<bool>()), 1..12).prop_map(|rows| {
        let entries = rows
            .into_iter()
            .map(|(label, control)| {
                if control {
                    BundleEntry::exit(label)
                } else {
                    BundleEntry::install(label, &["pkg"])
                }
            })
            .collect();
        Catalog::new("Generated", entries).unwrap()
    })
}

proptest! {
    /// Every row's label column is padded to the same width
    #[test]
    fn label_column_width_is_constant(catalog in catalog_strategy(), installed in any::<bool>()) {
        let width = catalog.label_width();
        for entry in catalog.entries() {
            let plain = format_label(entry, false, width);
            prop_assert_eq!(plain.width(), width);

            let text = catalog.format_label(entry, installed);
            let column = text.strip_suffix(INSTALLED_MARKER).unwrap_or(text.as_str());
            prop_assert_eq!(column.width(), width);
        }
    }

    /// Control rows never carry the installed marker
    #[test]
    fn control_rows_have_no_marker(catalog in catalog_strategy()) {
        for entry in catalog.entries().iter().filter(|e| e.is_control()) {
            prop_assert!(!catalog.format_label(entry, true).contains(INSTALLED_MARKER));
        }
    }
}
