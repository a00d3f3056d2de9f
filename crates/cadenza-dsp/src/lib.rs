//! Stream effects. Each effect owns exactly one delegate [`Reader`] and
//! overrides only the operations whose meaning it changes.
//!
//! [`Reader`]: cadenza_core::Reader

mod converter;
pub use converter::ConverterReader;

mod echo;
pub use echo::{EchoParams, EchoReader};
