//! Structured commit replies: `{subject, body, rating}`.

use serde::Deserialize;
use tracing::debug;

use crate::commit::message::{CommitMessage, split_message};
use crate::error::CompletionError;

use super::json::extract_json_object;

/// Lowest rating the model may assign.
pub const MIN_RATING: u8 = 1;
/// Highest rating the model may assign.
pub const MAX_RATING: u8 = 10;

/// A validated structured reply.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredReply {
    pub message: CommitMessage,
    /// Model's significance rating, always within `MIN_RATING..=MAX_RATING`.
    pub rating: u8,
}

/// Wire schema of the object the model is asked to return.
#[derive(Debug, Deserialize)]
struct ReplySchema {
    subject: String,
    #[serde(default)]
    body: Option<String>,
    rating: f64,
}

/// Parse model output into a [`StructuredReply`].
///
/// The first JSON object in the text is deserialized against the reply
/// schema, then validated: the subject must be non-blank, only its first
/// line is kept (capped at 72 characters) and the rating is clamped into
/// `[1, 10]`. Further subject lines are moved to the top of the body.
pub fn parse_structured_reply(text: &str) -> Result<StructuredReply, CompletionError> {
    let candidate = extract_json_object(text).ok_or_else(|| CompletionError::Schema {
        reason: "no JSON object found in reply".to_string(),
        raw: text.to_string(),
    })?;

    let schema: ReplySchema =
        serde_json::from_str(&candidate).map_err(|e| CompletionError::Schema {
            reason: e.to_string(),
            raw: text.to_string(),
        })?;

    let subject = schema.subject.trim();
    if subject.is_empty() {
        return Err(CompletionError::Schema {
            reason: "subject is empty".to_string(),
            raw: text.to_string(),
        });
    }

    if !schema.rating.is_finite() {
        return Err(CompletionError::Schema {
            reason: "rating is not a finite number".to_string(),
            raw: text.to_string(),
        });
    }

    let rating = clamp_rating(schema.rating);
    if f64::from(rating) != schema.rating {
        debug!("Adjusted model rating {} to {}", schema.rating, rating);
    }

    // A subject spanning several lines keeps its first line; the rest
    // leads the body.
    let CommitMessage {
        subject,
        body: overflow,
    } = split_message(subject);
    let body = [overflow.as_str(), schema.body.as_deref().unwrap_or_default().trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(StructuredReply {
        message: CommitMessage { subject, body },
        rating,
    })
}

/// Round and clamp a raw rating into `[MIN_RATING, MAX_RATING]`.
pub fn clamp_rating(raw: f64) -> u8 {
    raw.round()
        .clamp(f64::from(MIN_RATING), f64::from(MAX_RATING)) as u8
}
