//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use claimwatch_core::{ClaimError, ClaimLinks, ClaimRecord, PollOutcome, PollState};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one state transition.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateOutput {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOutput>,
    #[serde(serialize_with = "serialize_datetime")]
    pub at: DateTime<Utc>,
}

/// A claim record with its shopper link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutput {
    pub token: String,
    pub claimed_status: &'static str,
    pub amount_minor: u64,
    pub amount: String,
    pub url: String,
    pub call_to_action: &'static str,
}

/// A lookup failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
    links: ClaimLinks,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self::with_links(pretty, ClaimLinks::default())
    }

    /// Creates a formatter that renders links against `links`.
    pub fn with_links(pretty: bool, links: ClaimLinks) -> Self {
        Self { pretty, links }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats one state transition.
    pub fn format_state(&self, state: &PollState, at: DateTime<Utc>) -> Result<String> {
        self.format(&self.state_to_output(state, at))
    }

    /// Formats the final outcome of a poll.
    pub fn format_outcome(&self, outcome: &PollOutcome, at: DateTime<Utc>) -> Result<String> {
        self.format(&self.state_to_output(&PollState::from(outcome.clone()), at))
    }

    /// Formats a record with its link.
    pub fn format_record(&self, record: &ClaimRecord) -> Result<String> {
        self.format(&self.record_to_output(record))
    }

    fn state_to_output(&self, state: &PollState, at: DateTime<Utc>) -> StateOutput {
        let mut output = StateOutput {
            state: state.label(),
            attempt: None,
            attempts: None,
            record: None,
            error: None,
            at,
        };

        match state {
            PollState::Loading { attempt } => output.attempt = Some(*attempt),
            PollState::Found(record) => output.record = Some(self.record_to_output(record)),
            PollState::Exhausted { attempts } => output.attempts = Some(*attempts),
            PollState::Cancelled => {}
            PollState::Failed(err) => output.error = Some(error_to_output(err)),
        }

        output
    }

    fn record_to_output(&self, record: &ClaimRecord) -> RecordOutput {
        RecordOutput {
            token: record.token.clone(),
            claimed_status: record.claimed_status.as_str(),
            amount_minor: record.claimed_amount.minor(),
            amount: record.claimed_amount.major_display(),
            url: self.links.url_for(record).to_string(),
            call_to_action: ClaimLinks::call_to_action(record),
        }
    }
}

fn error_to_output(err: &ClaimError) -> ErrorOutput {
    let (kind, status) = match err {
        ClaimError::Transport(_) => ("transport", None),
        ClaimError::Timeout(_) => ("timeout", None),
        ClaimError::Status { status, .. } => ("status", Some(*status)),
        ClaimError::MalformedBody(_) => ("malformedBody", None),
    };
    ErrorOutput {
        kind,
        status,
        message: err.to_string(),
    }
}
