// mapty-tui/src/app.rs
mod actions;
mod input;
mod navigation_helpers;
pub mod state;
mod viewport;

pub use state::{ActiveModal, App, FormField, Pane};
