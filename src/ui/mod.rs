//! GUI panels and application state.

pub mod admin_panel;
pub mod app;
pub mod components;
pub mod form_panel;
pub mod login_panel;

pub use app::App;
