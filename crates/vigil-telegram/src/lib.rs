//! Telegram integration for Vigil.
//!
//! - [`TelegramClient`] talks to the Bot API and doubles as the
//!   [`Notifier`](vigil_core::notify::Notifier) used by the watchdog.
//! - [`ApiClient`] relays chat commands to the Vigil HTTP API.
//! - [`Bot`] turns incoming updates (webhook or long polling) into API calls
//!   and chat replies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod api_client;
pub mod bot;
pub mod client;
pub mod commands;
pub mod error;
pub mod types;

pub use api_client::{ApiClient, ApiReply, CheckinApi};
pub use bot::{Bot, PollConfig, UpdateSource};
pub use client::{TelegramClient, TelegramConfig};
pub use commands::Command;
pub use error::{Error, Result};
