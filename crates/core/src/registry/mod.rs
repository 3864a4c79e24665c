//! Client side of the event service: live subscriptions and one-shot queries.

pub mod callback;
pub mod proxy;
pub mod query;
pub mod service;
pub mod subscription;

pub use callback::*;
pub use proxy::*;
pub use query::*;
pub use service::*;
pub use subscription::*;
