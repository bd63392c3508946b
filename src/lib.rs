//! HappyScroll Verdict - child-safety verdicts for YouTube videos
//!
//! Combines a transcript analysis and a thumbnail moderation into one cached
//! verdict, behind a daily request quota.

pub mod api;
pub mod cache;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod verdict;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
