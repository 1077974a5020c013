use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AppointmentDetails, AppointmentRecord, AppointmentRequest, BookingReceipt};

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Collecting,
    Reconciling(AppointmentDetails),
    Booking {
        details: AppointmentDetails,
        start: DateTime<Utc>,
    },
    Notifying {
        details: AppointmentDetails,
        receipt: BookingReceipt,
    },
    Done(AppointmentRecord),
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Collecting => "collecting",
            Phase::Reconciling(_) => "reconciling",
            Phase::Booking { .. } => "booking",
            Phase::Notifying { .. } => "notifying",
            Phase::Done(_) => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Phase::Done(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn as_line(&self) -> String {
        let speaker = if self.role == "user" { "User" } else { "Assistant" };
        format!("{speaker}: {}", self.content)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    pub transcript: Vec<ConversationMessage>,
    pub request: AppointmentRequest,
    pub phase: Phase,
    // identical requests are not re-submitted
    pub rejected: Option<AppointmentDetails>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            request: AppointmentRequest::default(),
            phase: Phase::Collecting,
            rejected: None,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.transcript.push(ConversationMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript.push(ConversationMessage::assistant(content));
    }

    pub fn transcript_lines(&self) -> Vec<String> {
        self.transcript.iter().map(ConversationMessage::as_line).collect()
    }

    pub fn record(&self) -> Option<&AppointmentRecord> {
        match &self.phase {
            Phase::Done(record) => Some(record),
            _ => None,
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
