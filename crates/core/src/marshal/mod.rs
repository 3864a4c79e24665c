//! Conversion of [`EventRecord`](crate::events::EventRecord) into the
//! fixed-capacity [`CrossBoundaryRecord`].

pub mod convertor;
pub mod record;

pub use convertor::*;
pub use record::*;
