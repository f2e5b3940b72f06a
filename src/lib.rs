// wellbeing-relay library - crisis-aware proxy to an llm chat api
//
// stateless: every request carries the full conversation history, the
// server keeps nothing between requests.

pub mod cli;
mod core;
mod error;
pub mod logging;
mod server;

pub use crate::core::*;
pub use error::{Error, ErrorResponse};
pub use server::{Server, parse_history, router};
