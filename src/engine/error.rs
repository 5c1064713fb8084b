use crate::model::{format_hhmm, Minute, RoomId, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    NotFound(RoomId),
    InvalidInput(String),
    InvalidRange { start: Minute, end: Minute },
    ConflictWithReservation { span: Span, user: String },
    ConflictWithClass { span: Span, label: String },
    LimitExceeded(&'static str),
    Storage(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "room not found: {id}"),
            EngineError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            EngineError::InvalidRange { start, end } => write!(
                f,
                "end must be after start ({} >= {})",
                format_hhmm(*start),
                format_hhmm(*end)
            ),
            EngineError::ConflictWithReservation { span, user } => {
                write!(f, "conflicts with reservation {span} by {user}")
            }
            EngineError::ConflictWithClass { span, label } => {
                write!(f, "conflicts with class {span} ({label})")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
