pub mod builder;
pub mod record;

pub use builder::*;
pub use record::*;
