//! Fluent dial builder
//!
//! [`BindDev`] collects the dial parameters; the `connect*` methods in
//! [`execution`] run the dial.

pub mod core;
pub mod execution;

pub use self::core::BindDev;
