pub mod admin;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod registration;
pub mod session;
pub mod ui;

pub use error::{AppError, Result};
