//! Shape validation for status payloads and verdict formatting.

use serde_json::Value;

use crate::error::PollError;

/// Review verdict for a homework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Reviewing,
    Rejected,
}

impl Verdict {
    /// Look up a verdict by the status key the API uses.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable sentence sent to the chat.
    pub fn sentence(&self) -> &'static str {
        match self {
            Self::Approved => "The work has been reviewed: the reviewer liked everything. Hooray!",
            Self::Reviewing => "The work has been taken for review.",
            Self::Rejected => "The work has been reviewed: the reviewer has comments.",
        }
    }
}

/// A status payload that passed shape validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    /// Homework items, newest first, exactly as returned.
    pub homeworks: Vec<Value>,
    /// Server clock, used as the next cursor.
    pub current_date: i64,
}

/// Check that a payload has the documented shape.
///
/// An empty `homeworks` list is valid and means nothing changed.
pub fn validate_response(raw: &Value) -> Result<RemoteResponse, PollError> {
    let map = raw.as_object().ok_or(PollError::NotAMapping)?;

    let homeworks = map
        .get("homeworks")
        .ok_or(PollError::MissingKey("homeworks"))?;

    let current_date = map.get("current_date").ok_or(PollError::MissingCursorKey)?;
    let current_date = current_date
        .as_i64()
        .ok_or_else(|| PollError::CursorNotInteger(current_date.to_string()))?;

    let homeworks = homeworks
        .as_array()
        .ok_or(PollError::HomeworksNotASequence)?
        .clone();

    Ok(RemoteResponse {
        homeworks,
        current_date,
    })
}

/// Build the notification text for one homework item.
pub fn extract_notification(item: &Value) -> Result<String, PollError> {
    let name = item
        .get("homework_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(PollError::MissingField("homework_name"))?;

    let verdict = match item.get("status") {
        Some(Value::String(status)) => {
            Verdict::from_key(status).ok_or_else(|| PollError::UnknownStatus(status.clone()))?
        }
        Some(other) => return Err(PollError::UnknownStatus(other.to_string())),
        None => return Err(PollError::UnknownStatus("<absent>".to_string())),
    };

    Ok(format!(
        "Status changed for \"{}\": {}",
        name,
        verdict.sentence()
    ))
}
