//! burnish: a thin client/server pairing that forwards user-selected text
//! to a chat-completion API and presents the rewritten result.
//!
//! The server half is an axum endpoint wrapping one completion call with a
//! fixed system instruction and a best-effort audit log. The client half is
//! one shared [`client::EnhanceClient`] consumed by every surface: the REPL
//! playground, the one-shot `enhance` command, and the file-replacement
//! flow.

pub mod audit;
pub mod banner;
pub mod client;
pub mod commands;
pub mod config;
pub mod consts;
pub mod editor;
pub mod enhancer;
pub mod presentation;
pub mod prompts;
pub mod server;
pub mod spinner;
