use serde::{Serialize, Serializer};
use std::fmt;

use crate::model::entity::EntityId;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    EntityNotFound,
    InvalidEnumValue,
    EmptyPatch,
    InvalidDate,
    RemoteUnavailable,
    RemoteRejected,
    MalformedPayload,
    PageBudgetExhausted,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::EntityNotFound => "E2001",
            Self::InvalidEnumValue => "E2005",
            Self::EmptyPatch => "E2006",
            Self::InvalidDate => "E2007",
            Self::RemoteUnavailable => "E4001",
            Self::RemoteRejected => "E4002",
            Self::MalformedPayload => "E4003",
            Self::PageBudgetExhausted => "E4004",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::EntityNotFound => "Entity not found",
            Self::InvalidEnumValue => "Invalid status/priority value",
            Self::EmptyPatch => "No fields to change",
            Self::InvalidDate => "Invalid due date",
            Self::RemoteUnavailable => "Remote unavailable",
            Self::RemoteRejected => "Remote rejected the request",
            Self::MalformedPayload => "Malformed remote payload",
            Self::PageBudgetExhausted => "Page budget exhausted",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .worklist/config.toml and retry."),
            Self::InvalidEnumValue => Some(
                "Project status: active|on_hold|completed. Work item status: pending|in_progress|completed. Priority: high|medium|low.",
            ),
            Self::EmptyPatch => Some("Pass at least one field to change."),
            Self::InvalidDate => Some("Use YYYY-MM-DD."),
            Self::RemoteUnavailable => Some("Check connectivity and retry; nothing was changed."),
            Self::PageBudgetExhausted => {
                Some("Raise [fetch] max_pages in .worklist/config.toml.")
            }
            Self::EntityNotFound
            | Self::RemoteRejected
            | Self::MalformedPayload
            | Self::InternalUnexpected => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Failure reported by the remote collaborator.
///
/// These are the only errors the controller handles. They are caught at the
/// mutation boundary, rolled back, and surfaced as notifications.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("remote rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("entity {0} not found")]
    NotFound(EntityId),
    #[error("malformed remote payload: {0}")]
    Decode(String),
    #[error("page budget of {pages} exhausted before the collection ended")]
    PageBudgetExhausted { pages: u32 },
}

impl RemoteError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::RemoteUnavailable,
            Self::Rejected { .. } => ErrorCode::RemoteRejected,
            Self::NotFound(_) => ErrorCode::EntityNotFound,
            Self::Decode(_) => ErrorCode::MalformedPayload,
            Self::PageBudgetExhausted { .. } => ErrorCode::PageBudgetExhausted,
        }
    }
}
