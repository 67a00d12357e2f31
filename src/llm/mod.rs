//! Completion endpoint client and reply parsing.

pub mod client;
pub mod json;
pub mod reply;

pub use client::{CompletionClient, HttpCompletionClient, Prompt};
pub use json::extract_json_object;
pub use reply::{StructuredReply, clamp_rating, parse_structured_reply};
