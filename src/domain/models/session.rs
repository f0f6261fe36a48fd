//! Chat session state.
//!
//! A session is the explicit context every pipeline call receives: the
//! connected wallet, the message thread, and whatever intent is waiting
//! for the user's decision. Sessions never share state with each other.

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chain::BundleReceipt;
use super::intent::SwarmIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A toast-style message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Where the session is in the review/submit flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum PendingState {
    Idle,
    AwaitingConfirmation(SwarmIntent),
    Submitted(BundleReceipt),
    Failed(Notice),
}

impl PendingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingConfirmation(_) => "awaiting_confirmation",
            Self::Submitted(_) => "submitted",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub wallet: Option<Address>,
    pub messages: Vec<ChatMessage>,
    pub pending: PendingState,
    /// Notices raised as a side effect of another command
    #[serde(default)]
    pub notices: Vec<Notice>,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(wallet: Option<Address>) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet,
            messages: Vec::new(),
            pending: PendingState::Idle,
            notices: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn pending_intent(&self) -> Option<&SwarmIntent> {
        match &self.pending {
            PendingState::AwaitingConfirmation(intent) => Some(intent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = ChatSession::new(None);
        assert_eq!(session.pending, PendingState::Idle);
        assert!(session.pending_intent().is_none());
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = ChatSession::new(None);
        let b = ChatSession::new(None);
        a.push(Role::User, "hello");
        assert_ne!(a.id, b.id);
        assert_eq!(a.messages.len(), 1);
        assert!(b.messages.is_empty());
    }
}
