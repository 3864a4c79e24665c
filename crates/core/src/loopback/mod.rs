//! In-process stand-in for the remote event service.

pub mod locator;
pub mod service;

pub use locator::*;
pub use service::*;
