//! Flat JSON codec for event payloads.
//!
//! Only the top level is decoded into key/value pairs. Nested arrays and
//! objects are kept verbatim as opaque value text.

pub mod char_filter;
pub mod parser;

pub use char_filter::*;
pub use parser::*;
