//! # Domain Models
//!
//! Pure configuration types with a single dependency (`serde`).
//! Keep it lean: no I/O, networking, or heavy logic. Just data and defaults.

pub mod config;
