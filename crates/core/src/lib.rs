//! Sysevent Core Library
//!
//! Event-record core of the system event subsystem: the flat JSON payload
//! codec, marshalling of records into fixed-capacity cross-boundary records,
//! and the client-side subscription registry and query executor.

pub mod error;
pub mod events;
pub mod json;
pub mod loopback;
pub mod marshal;
pub mod registry;
pub mod rules;

// Re-export commonly used items at crate root
pub use error::{RecordField, Result, SysEventError};
pub use events::{EventRecord, EventRecordBuilder, EventType};
pub use json::{FlatJsonParser, KeyValue, ValueKind, print_identity};
pub use loopback::{LoopbackConfig, LoopbackService, SwappableLocator};
pub use marshal::{
    CrossBoundaryRecord, convert_record, convert_records, delete_record, delete_records,
    init_record,
};
pub use registry::{
    ListenerIdentity, QueryCallback, QueryExecutor, ServiceLocator, SubscribeCallback,
    SubscriptionRegistry, SysEventService,
};
pub use rules::{ListenerRule, QueryArg, QueryRule, RuleType};
