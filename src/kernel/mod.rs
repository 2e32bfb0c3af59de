//! Headless find/replace core.

pub mod services;
