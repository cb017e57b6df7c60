pub mod channel;
pub mod time;
pub mod types;

pub use channel::{ChannelMessage, ClientMessage};
pub use types::{
    Coverage, DeleteOutcome, EventNames, LogEvent, LogsPage, StatsSummary, ValidationResult,
    ValidationStatus,
};
