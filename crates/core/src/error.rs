use std::fmt;

use thiserror::Error;

/// Record field handled by one marshalling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Domain,
    EventName,
    TimeZone,
    Level,
    Tag,
    JsonStr,
}

impl RecordField {
    pub fn name(&self) -> &'static str {
        match self {
            RecordField::Domain => "domain",
            RecordField::EventName => "eventName",
            RecordField::TimeZone => "tz",
            RecordField::Level => "level",
            RecordField::Tag => "tag",
            RecordField::JsonStr => "jsonStr",
        }
    }

    fn code_base(&self) -> i32 {
        match self {
            RecordField::Domain => 10,
            RecordField::EventName => 20,
            RecordField::TimeZone => 30,
            RecordField::Level => 40,
            RecordField::Tag => 50,
            RecordField::JsonStr => 60,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SysEventError {
    #[error("sys event service is unavailable")]
    ServiceUnavailable,

    #[error("malformed payload at offset {offset}: {reason}")]
    MalformedPayload { offset: usize, reason: &'static str },

    #[error("{field} is {len} bytes, exceeds the {max} byte bound")]
    FieldTooLong {
        field: RecordField,
        len: usize,
        max: usize,
    },

    #[error("failed to allocate {field}")]
    AllocationFailure { field: RecordField },

    #[error("{field} contains an interior nul byte")]
    InteriorNul { field: RecordField },

    #[error("invalid rule: {reason}")]
    RuleConversion { reason: String },

    #[error("listener not found")]
    NotFound,
}

impl SysEventError {
    /// Non-zero result code reported across the record boundary.
    ///
    /// Marshalling failures encode the failing field, so `-11` is an
    /// over-long domain and `-62` a payload that could not be allocated.
    pub fn code(&self) -> i32 {
        match self {
            SysEventError::ServiceUnavailable => -1,
            SysEventError::MalformedPayload { .. } => -2,
            SysEventError::RuleConversion { .. } => -3,
            SysEventError::NotFound => -4,
            SysEventError::FieldTooLong { field, .. } => -(field.code_base() + 1),
            SysEventError::AllocationFailure { field } => -(field.code_base() + 2),
            SysEventError::InteriorNul { field } => -(field.code_base() + 3),
        }
    }
}

pub type Result<T> = std::result::Result<T, SysEventError>;
