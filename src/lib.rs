//! SkillSwap platform functions.
//!
//! Event-triggered backend for a peer skill-exchange platform: a
//! timezone-aware reminder scheduler for recurring video sessions, plus
//! the webhook glue around it (activity logging, conversation summaries,
//! meeting/room creation, video API token issuance).

pub mod config;
pub mod error;
pub mod mailer;
pub mod reminder;
pub mod scheduler;
pub mod server;
pub mod services;
pub mod state;
pub mod store;
pub mod types;
pub mod video;
