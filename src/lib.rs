//! Terminal client for the `/apps/news` backend.
//!
//! The reader shows news articles by category, supports free-text search,
//! one-shot fetches from an alternate source, an optional auto-refresh timer
//! and two admin tools (source lookup and bulk import). Preferences persist
//! through a small key-value store.

pub mod api;
pub mod app;
pub mod article;
pub mod config;
pub mod render;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod ui;
pub mod util;
