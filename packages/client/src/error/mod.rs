pub mod classification;
pub mod conversions;
pub mod types;

pub use types::{BindTarget, DialError, DialTarget, Result};
