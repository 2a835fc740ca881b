//! Data models for panelists and expertise domains.

pub mod domain;
pub mod panelist;

pub use domain::{Domain, Domains};
pub use panelist::{MAX_PHOTO_BYTES, NewPanelist, Panelist, Photo};
