// src/app/navigation_helpers.rs
use ratatui::widgets::ListState;

pub fn list_next(state: &mut ListState, list_len: usize) {
    if list_len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if i + 1 >= list_len => 0,
        Some(i) => i + 1,
        None => 0,
    };
    state.select(Some(i));
}

pub fn list_previous(state: &mut ListState, list_len: usize) {
    if list_len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(0) | None => list_len - 1,
        Some(i) => i.min(list_len) - 1,
    };
    state.select(Some(i));
}
